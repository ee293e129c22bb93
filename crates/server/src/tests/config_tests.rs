use super::{load_settings_from, normalize_database_url, prepare_database_url, Settings};

use std::{collections::HashMap, fs};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn empty_database_url_falls_back_to_default() {
    assert_eq!(
        normalize_database_url("   "),
        Settings::default().database_url
    );
}

#[test]
fn keeps_memory_url_untouched() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
}

#[test]
fn keeps_windows_absolute_path_with_single_sqlite_colon() {
    assert_eq!(
        normalize_database_url("sqlite:C:\\Users\\alice\\test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
}

#[test]
fn normalizes_windows_plain_path_with_single_sqlite_colon() {
    assert_eq!(
        normalize_database_url("C:\\Users\\alice\\test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
}

#[test]
fn converts_sqlite_double_slash_windows_path() {
    assert_eq!(
        normalize_database_url("sqlite://C:/Users/alice/test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
}

#[test]
fn creates_parent_dir_for_relative_sqlite_url() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("data").join("test.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(temp_root.path().join("data").exists());
}

#[test]
fn defaults_apply_without_file_or_env() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(&temp_root.path().join("missing.toml"), env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn settings_file_then_env_overrides() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let path = temp_root.path().join("server.toml");
    fs::write(
        &path,
        "bind_addr = \"127.0.0.1:7000\"\ndatabase_url = \"./file.db\"\nmax_body_bytes = 1024\n",
    )
    .expect("write settings");

    let from_file = load_settings_from(&path, env_from(&[]));
    assert_eq!(from_file.server_bind, "127.0.0.1:7000");
    assert_eq!(from_file.database_url, "./file.db");
    assert_eq!(from_file.max_body_bytes, 1024);

    let overridden = load_settings_from(
        &path,
        env_from(&[
            ("DATABASE_URL", "./env.db"),
            ("APP__DATABASE_URL", "./app.db"),
            ("APP__MAX_BODY_BYTES", "2048"),
        ]),
    );
    assert_eq!(overridden.server_bind, "127.0.0.1:7000");
    assert_eq!(overridden.database_url, "./app.db");
    assert_eq!(overridden.max_body_bytes, 2048);
}

#[test]
fn port_binds_all_interfaces_unless_bind_is_explicit() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let missing = temp_root.path().join("missing.toml");

    let from_port = load_settings_from(&missing, env_from(&[("PORT", "8080")]));
    assert_eq!(from_port.server_bind, "0.0.0.0:8080");

    let explicit = load_settings_from(
        &missing,
        env_from(&[("PORT", "8080"), ("SERVER_BIND", "127.0.0.1:9000")]),
    );
    assert_eq!(explicit.server_bind, "127.0.0.1:9000");

    let garbage = load_settings_from(&missing, env_from(&[("PORT", "eighty")]));
    assert_eq!(garbage.server_bind, Settings::default().server_bind);
}

#[test]
fn malformed_settings_file_is_ignored() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let path = temp_root.path().join("server.toml");
    fs::write(&path, "bind_addr = [not toml").expect("write settings");

    let settings = load_settings_from(&path, env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn prepared_database_url_creates_openable_sqlite_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("survey.db");

    let prepared = prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare");
    let storage = storage::Storage::new(&prepared).await.expect("open sqlite");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );
}
