use chrono::TimeZone;
use storage::MemoryBackend;

use super::*;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0)
        .single()
        .expect("timestamp")
}

async fn memory_store() -> (ReadinessStore<MemoryBackend>, MemoryBackend) {
    let backend = MemoryBackend::new();
    let store = ReadinessStore::open(PersistenceAdapter::new(backend.clone())).await;
    (store, backend)
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("evidence-pack").chain(args.iter().copied()))
        .expect("parse args")
}

#[test]
fn parses_status_aliases() {
    let cli = parse(&["status", "fw1", "in-progress"]);
    assert!(matches!(
        cli.command,
        Command::Status { ref id, status: ControlStatus::InProgress } if id == "fw1"
    ));

    let cli = parse(&["--database-url", "sqlite::memory:", "status", "pm2", "done"]);
    assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
}

#[test]
fn rejects_unknown_status_value() {
    let args = ["evidence-pack", "status", "fw1", "finished"];
    assert!(Cli::try_parse_from(args).is_err());
}

#[tokio::test]
async fn unknown_control_maps_to_not_found_exit_code() {
    let (mut store, _) = memory_store().await;
    let err = execute(
        Command::Status {
            id: "zz9".into(),
            status: ControlStatus::Done,
        },
        &mut store,
        &Settings::default(),
        fixed_now(),
    )
    .await
    .expect_err("unknown control");
    assert_eq!(exit_code_for(&err), 2);
    assert_eq!(store.snapshot(), &readiness::ControlCatalog::defaults());
}

#[tokio::test]
async fn failed_reset_maps_to_storage_exit_code() {
    let (mut store, backend) = memory_store().await;
    backend.set_unavailable(true);
    let err = execute(Command::Reset, &mut store, &Settings::default(), fixed_now())
        .await
        .expect_err("reset fails");
    assert_eq!(exit_code_for(&err), 3);
}

#[test]
fn other_errors_map_to_generic_exit_code() {
    assert_eq!(exit_code_for(&anyhow::anyhow!("disk full")), 1);
}

#[tokio::test]
async fn commands_update_store() {
    let (mut store, _) = memory_store().await;
    let settings = Settings::default();
    execute(
        Command::Company {
            name: Some("Acme Construction Ltd".into()),
            email: None,
        },
        &mut store,
        &settings,
        fixed_now(),
    )
    .await
    .expect("company");
    execute(
        Command::Notes {
            id: "sc1".into(),
            notes: "router admin password rotated".into(),
        },
        &mut store,
        &settings,
        fixed_now(),
    )
    .await
    .expect("notes");

    assert_eq!(store.company().name, "Acme Construction Ltd");
    assert_eq!(
        store.control("sc1").expect("sc1").notes,
        "router admin password rotated"
    );
}

#[tokio::test]
async fn overview_lists_every_control_with_markers() {
    let (mut store, _) = memory_store().await;
    store
        .set_control_status("fw1", ControlStatus::Done)
        .await
        .expect("status");
    store
        .set_control_notes("fw1", "rules.pdf")
        .await
        .expect("notes");

    let overview = render_overview(&store);
    assert!(overview.starts_with("Company: -\nContact: -\nReadiness: 1/10 controls complete (10%)\n"));
    assert!(overview.contains("1 done / 0 in progress / 9 not started"));
    assert!(overview.contains("[✓] fw1  Firewalls: Boundary firewall configured and rules documented\n         notes: rules.pdf\n"));
    assert!(overview.contains("[ ] pm2  Patch Management:"));
}

#[tokio::test]
async fn export_writes_named_pack_file() {
    let (mut store, _) = memory_store().await;
    store
        .set_company(Some("Acme Construction Ltd".into()), None)
        .await;
    let temp = tempfile::tempdir().expect("tempdir");
    let out_dir = temp.path().join("packs");

    let path = write_export(store.snapshot(), &out_dir, fixed_now()).expect("export");
    assert_eq!(
        path,
        out_dir.join("ce-evidence-pack-acme-construction-ltd.json")
    );

    let raw = fs::read_to_string(&path).expect("read pack");
    let export: shared::export::StructuredExport = serde_json::from_str(&raw).expect("decode");
    assert_eq!(export.exported_at, "2026-10-19T08:30:00.000Z");
    assert_eq!(export.readiness_summary, "0/10 controls complete (0%)");
    assert!(export.controls.iter().all(|c| c.notes == "—"));
}

#[tokio::test]
async fn run_opens_plain_path_in_missing_directory() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db_path = temp.path().join("nested").join("pack.db");
    let settings = Settings {
        database_url: db_path.to_string_lossy().into_owned(),
        ..Settings::default()
    };

    run(Command::Status { id: "fw1".into(), status: ControlStatus::Done }, &settings)
        .await
        .expect("first run");
    assert!(db_path.exists());

    let backend = SqliteBackend::new(&normalize_database_url(&settings.database_url))
        .await
        .expect("reopen");
    let store = ReadinessStore::open(PersistenceAdapter::new(backend)).await;
    assert_eq!(store.metrics().done, 1);
}
