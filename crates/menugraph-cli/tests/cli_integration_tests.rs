//! End-to-end tests of the `menugraph` binary against a scratch database

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Run the CLI inside `dir` against `dir/store.db`
fn run(dir: &Path, args: &[&str]) -> Output {
    let db = dir.join("store.db");
    Command::new(env!("CARGO_BIN_EXE_menugraph"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .args(["--db", db.to_str().unwrap()])
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn refreshed_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let payload = fixture("catalog.json");
    let output = run(dir.path(), &["refresh", payload.to_str().unwrap()]);
    assert_success(&output);
    assert!(stdout(&output).contains("Catalog refreshed: 3 dishes"));
    dir
}

#[test]
fn test_refresh_then_status() {
    // GIVEN a refreshed catalog
    let dir = refreshed_dir();

    // WHEN status is requested by a new process
    let output = run(dir.path(), &["status"]);

    // THEN it reads the persisted catalog
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("needs_refresh: no"));
    assert!(out.contains("categories: drinks, pizza"));
    assert!(out.contains("dishes: 3"));
    assert!(out.contains("cheese_borders: 1"));
    assert!(!out.contains("last_update: never"));
}

#[test]
fn test_status_on_empty_store() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["status"]);

    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("needs_refresh: yes"));
    assert!(out.contains("last_update: never"));
    assert!(out.contains("objects: 0"));
}

#[test]
fn test_second_refresh_is_skipped_unless_forced() {
    // GIVEN a fresh catalog
    let dir = refreshed_dir();
    let payload = fixture("catalog.json");

    // WHEN refreshed again without --force
    let skipped = run(dir.path(), &["refresh", payload.to_str().unwrap()]);

    // THEN the source is not consulted
    assert_success(&skipped);
    assert!(stdout(&skipped).contains("Catalog is fresh"));

    // AND a forced refresh reinstalls the same payload
    let forced = run(dir.path(), &["refresh", payload.to_str().unwrap(), "--force"]);
    assert_success(&forced);
    assert!(stdout(&forced).contains("Catalog refreshed: 3 dishes"));
}

#[test]
fn test_dishes_lists_category_in_order() {
    let dir = refreshed_dir();

    let output = run(dir.path(), &["dishes", "pizza"]);

    assert_success(&output);
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec!["d-pepperoni\tPepperoni\t520 ₽", "d-margherita\tMargherita\t450 ₽"]
    );
}

#[test]
fn test_currency_suffix_comes_from_config() {
    // GIVEN a config file with a different currency
    let dir = refreshed_dir();
    let config = dir.path().join("menugraph.toml");
    std::fs::write(&config, "[catalog]\ncurrency_suffix = \"EUR\"\n").unwrap();

    // WHEN dishes are listed with that config
    let output = run(
        dir.path(),
        &["dishes", "drinks", "--config", config.to_str().unwrap()],
    );

    // THEN prices carry the configured suffix
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "d-cola\tCola\t120.5 EUR");
}

#[test]
fn test_snapshot_prints_dish_json() {
    let dir = refreshed_dir();

    let output = run(dir.path(), &["snapshot", "d-margherita"]);

    assert_success(&output);
    let dish: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(dish["name"], "Margherita");
    assert_eq!(dish["variants"].as_array().unwrap().len(), 2);
    assert_eq!(dish["variants"][0]["doughs"].as_array().unwrap().len(), 2);
    // references to cheese borders are not part of the copy
    assert!(dish["variants"][0]["cheese_border_id"].is_null());
}

#[test]
fn test_delete_removes_dish_durably() {
    // GIVEN a refreshed catalog
    let dir = refreshed_dir();

    // WHEN Margherita is deleted
    let output = run(dir.path(), &["delete", "d-margherita"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Deleted dish 'd-margherita'"));

    // THEN later processes no longer see it
    let listing = run(dir.path(), &["dishes", "pizza"]);
    assert_success(&listing);
    assert!(!stdout(&listing).contains("Margherita"));
    assert!(stdout(&listing).contains("Pepperoni"));

    let status = run(dir.path(), &["status"]);
    assert!(stdout(&status).contains("cheese_borders: 1"));
}

#[test]
fn test_forced_refresh_restores_deleted_dish() {
    // GIVEN a catalog with Margherita deleted
    let dir = refreshed_dir();
    let payload = fixture("catalog.json");
    assert_success(&run(dir.path(), &["delete", "d-margherita"]));

    // WHEN the unchanged payload is refreshed with --force
    let forced = run(dir.path(), &["refresh", payload.to_str().unwrap(), "--force"]);

    // THEN the dish is back
    assert_success(&forced);
    assert!(stdout(&forced).contains("Catalog refreshed: 3 dishes"));
    let listing = run(dir.path(), &["dishes", "pizza"]);
    assert!(stdout(&listing).contains("Margherita"));
}

#[test]
fn test_unknown_dish_fails_with_code() {
    let dir = refreshed_dir();

    let output = run(dir.path(), &["delete", "d-missing"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_NOT_FOUND"), "stderr: {}", stderr);
}

#[test]
fn test_missing_payload_leaves_catalog_untouched() {
    // GIVEN a refreshed catalog
    let dir = refreshed_dir();
    let before = stdout(&run(dir.path(), &["status"]));

    // WHEN a forced refresh points at a missing file
    let output = run(dir.path(), &["refresh", "absent.json", "--force"]);

    // THEN it fails with a refresh error and the catalog is unchanged
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_REFRESH_FAILURE"), "stderr: {}", stderr);
    assert_eq!(stdout(&run(dir.path(), &["status"])), before);

    let conn = rusqlite::Connection::open(dir.path().join("store.db")).unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM objects WHERE kind = 'Dish'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 3);
}
