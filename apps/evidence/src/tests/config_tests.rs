use std::collections::HashMap;

use super::*;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let temp = tempfile::tempdir().expect("tempdir");
    let loaded = load_settings_from(&temp.path().join("missing.toml"), env_from(&[]));
    assert!(loaded.file_error.is_none());
    let settings = loaded.settings;
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.early_access_address, "rob@leanspace.co");
}

#[test]
fn file_values_override_defaults() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("evidence-pack.toml");
    fs::write(
        &path,
        "database_url = \"sqlite://./pack.db\"\nlog_level = \"debug\"\n",
    )
    .expect("write config");

    let settings = load_settings_from(&path, env_from(&[])).settings;
    assert_eq!(settings.database_url, "sqlite://./pack.db");
    assert_eq!(settings.log_level, "debug");
    assert_eq!(
        settings.early_access_address,
        Settings::default().early_access_address
    );
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("evidence-pack.toml");
    fs::write(&path, "database_url = \"sqlite://./file.db\"\n").expect("write config");

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("EVIDENCE_DATABASE_URL", "sqlite://./plain.db"),
            ("APP__DATABASE_URL", "sqlite://./app.db"),
            ("APP__EARLY_ACCESS_ADDRESS", "hello@example.org"),
        ]),
    )
    .settings;
    assert_eq!(settings.database_url, "sqlite://./app.db");
    assert_eq!(settings.early_access_address, "hello@example.org");
}

#[test]
fn malformed_file_is_ignored_and_reported() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("evidence-pack.toml");
    fs::write(&path, "database_url = [").expect("write config");

    let loaded = load_settings_from(&path, env_from(&[("APP__LOG_LEVEL", "info")]));
    assert_eq!(loaded.settings.database_url, Settings::default().database_url);
    assert_eq!(loaded.settings.log_level, "info");

    let error = loaded.file_error.expect("parse error reported");
    assert!(error.contains("evidence-pack.toml"), "{error}");
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite:./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(normalize_database_url("  "), Settings::default().database_url);
}
