use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use readiness::{
    build_early_access_link, build_handoff_link, build_handoff_message, build_snapshot_export,
    export_filename, render_export_json, ReadinessStore,
};
use shared::{
    domain::{ControlState, ControlStatus, ReadinessSnapshot},
    error::{ErrorCode, ReadinessError},
};
use storage::{KeyValueBackend, PersistenceAdapter, SqliteBackend};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_database_url, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "evidence-pack",
    about = "Track Cyber Essentials readiness and export an evidence pack"
)]
struct Cli {
    /// Overrides the configured SQLite database.
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print company details, readiness and every control.
    Show,
    /// Update company details.
    Company {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Set a control's status (not-started, in-progress, done).
    Status { id: String, status: ControlStatus },
    /// Replace a control's evidence notes. Pass "" to clear them.
    Notes { id: String, notes: String },
    /// Print the readiness summary.
    Metrics,
    /// Write the JSON evidence pack.
    Export {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Print the pack instead of writing a file.
        #[arg(long)]
        stdout: bool,
    },
    /// Print the assessor handoff mail link.
    Handoff {
        /// Print the plain message instead of the link.
        #[arg(long)]
        message: bool,
    },
    /// Print the early-access mail link.
    EarlyAccess,
    /// Delete all saved progress.
    Reset,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = load_settings();
    let mut settings = loaded.settings;
    if let Some(database_url) = cli.database_url.clone() {
        settings.database_url = database_url;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(error) = loaded.file_error {
        warn!(%error, "ignoring unreadable config file");
    }

    match run(cli.command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn run(command: Command, settings: &Settings) -> Result<()> {
    let database_url = normalize_database_url(&settings.database_url);
    let backend = SqliteBackend::new(&database_url)
        .await
        .with_context(|| format!("failed to open progress store at '{database_url}'"))?;
    backend
        .health_check()
        .await
        .with_context(|| format!("progress store at '{database_url}' is not responding"))?;
    info!(%database_url, "opened progress store");

    let mut store = ReadinessStore::open(PersistenceAdapter::new(backend)).await;
    execute(command, &mut store, settings, Utc::now()).await
}

async fn execute<B: KeyValueBackend>(
    command: Command,
    store: &mut ReadinessStore<B>,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        Command::Show => print!("{}", render_overview(store)),
        Command::Company { name, email } => {
            store.set_company(name, email).await;
            warn_if_unsaved(store);
            println!("company: {} <{}>", store.company().name, store.company().email);
        }
        Command::Status { id, status } => {
            store.set_control_status(&id, status).await?;
            warn_if_unsaved(store);
            println!("{id}: {status}");
        }
        Command::Notes { id, notes } => {
            store.set_control_notes(&id, notes).await?;
            warn_if_unsaved(store);
            println!("{id}: notes updated");
        }
        Command::Metrics => println!("{}", store.metrics().summary()),
        Command::Export { out_dir, stdout } => {
            if stdout {
                let export = build_snapshot_export(store.snapshot(), now);
                println!("{}", render_export_json(&export)?);
            } else {
                let path = write_export(store.snapshot(), &out_dir, now)?;
                println!("wrote {}", path.display());
            }
        }
        Command::Handoff { message } => {
            if message {
                println!("{}", build_handoff_message(store.snapshot()));
            } else {
                println!("{}", build_handoff_link(store.snapshot()));
            }
        }
        Command::EarlyAccess => println!(
            "{}",
            build_early_access_link(&settings.early_access_address, store.company())
        ),
        Command::Reset => {
            store.reset().await?;
            println!("saved progress cleared");
        }
    }
    Ok(())
}

fn warn_if_unsaved<B: KeyValueBackend>(store: &ReadinessStore<B>) {
    if !store.last_persist_succeeded() {
        eprintln!("warning: progress could not be saved and will be lost when this session ends");
    }
}

fn render_control(control: &ControlState) -> String {
    let mut line = format!(
        "{} {:<4} {}: {}",
        control.status.marker(),
        control.id,
        control.area,
        control.label
    );
    if !control.notes.is_empty() {
        line.push_str("\n         notes: ");
        line.push_str(&control.notes);
    }
    line
}

fn render_overview<B: KeyValueBackend>(store: &ReadinessStore<B>) -> String {
    let company = store.company();
    let breakdown = store.status_breakdown();
    let mut out = String::new();
    out.push_str(&format!(
        "Company: {}\n",
        if company.name.is_empty() { "-" } else { company.name.as_str() }
    ));
    out.push_str(&format!(
        "Contact: {}\n",
        if company.email.is_empty() { "-" } else { company.email.as_str() }
    ));
    out.push_str(&format!("Readiness: {}\n", store.metrics().summary()));
    out.push_str(&format!(
        "{} done / {} in progress / {} not started\n\n",
        breakdown.count(ControlStatus::Done),
        breakdown.count(ControlStatus::InProgress),
        breakdown.count(ControlStatus::NotStarted)
    ));
    for control in store.controls() {
        out.push_str(&render_control(control));
        out.push('\n');
    }
    out
}

fn write_export(
    snapshot: &ReadinessSnapshot,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let export = build_snapshot_export(snapshot, now);
    let json = render_export_json(&export).context("failed to render evidence pack")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory '{}'", out_dir.display()))?;
    let path = out_dir.join(export_filename(&snapshot.company.name));
    fs::write(&path, json)
        .with_context(|| format!("failed to write evidence pack to '{}'", path.display()))?;
    Ok(path)
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ReadinessError>().map(ReadinessError::code) {
        Some(ErrorCode::NotFound) => 2,
        Some(ErrorCode::Storage) => 3,
        None => 1,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
