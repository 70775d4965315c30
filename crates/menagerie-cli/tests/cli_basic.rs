//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_menagerie-cli"))
        .args(args)
        .env("MENAGERIE_DATA_DIR", data_dir)
        .env_remove("MENAGERIE_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("{args:?} printed non-JSON: {e}\n{stdout}"))
}

#[test]
fn test_habit_create_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let created = run_json(
        dir.path(),
        &["habit", "create", "Meditate", "--cadence", "3600", "--color", "#336699"],
    );
    assert_eq!(created["name"], "Meditate");
    assert_eq!(created["cadence"], 3600);
    assert_eq!(created["health"], 100.0);
    assert_eq!(created["isDead"], false);
    assert_eq!(created["cadenceLabel"], "1h");
    assert_eq!(created["animal"], "CluckingChicken");
    assert_eq!(created["entries"].as_array().unwrap().len(), 1);

    let listed = run_json(dir.path(), &["habit", "list", "--json"]);
    let habits = listed.as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["id"], created["id"]);

    let (code, stdout, _) = run_cli(dir.path(), &["habit", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Meditate"));
}

#[test]
fn test_habit_complete_by_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let created = run_json(dir.path(), &["habit", "create", "Floss"]);
    let id = created["id"].as_str().unwrap();

    let completed = run_json(dir.path(), &["habit", "complete", &id[..8]]);
    assert_eq!(completed["id"], created["id"]);
    assert_eq!(completed["entries"].as_array().unwrap().len(), 2);
}

#[test]
fn test_habit_update_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let created = run_json(dir.path(), &["habit", "create", "Run"]);
    let id = created["id"].as_str().unwrap();

    let updated = run_json(dir.path(), &["habit", "update", id, "--name", "Run 5k"]);
    assert_eq!(updated["updated"], true);
    let shown = run_json(dir.path(), &["habit", "show", id]);
    assert_eq!(shown["name"], "Run 5k");

    let deleted = run_json(dir.path(), &["habit", "delete", id]);
    assert_eq!(deleted["deleted"], true);
    let deleted = run_json(dir.path(), &["habit", "delete", id]);
    assert_eq!(deleted["deleted"], false);

    let listed = run_json(dir.path(), &["habit", "list", "--json"]);
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn test_habit_create_rejects_invalid_input() {
    let dir = tempfile::tempdir().unwrap();

    let (code, _, stderr) = run_cli(dir.path(), &["habit", "create", "Blink", "--cadence", "5"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (code, _, _) = run_cli(dir.path(), &["habit", "create", "   "]);
    assert_eq!(code, 1);

    let (code, _, _) = run_cli(dir.path(), &["habit", "create", "Paint", "--color", "blue"]);
    assert_eq!(code, 1);

    let (code, _, stderr) = run_cli(dir.path(), &["habit", "create", "Paint", "--animal", "Dragon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown animal"));

    let listed = run_json(dir.path(), &["habit", "list", "--json"]);
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn test_habit_complete_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(
        dir.path(),
        &["habit", "complete", "00000000-0000-4000-8000-000000000000"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("habit not found"));
}

#[test]
fn test_habit_tick_on_fresh_habits_reports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["habit", "create", "Water plants"]);
    let events = run_json(dir.path(), &["habit", "tick"]);
    assert!(events.as_array().unwrap().is_empty());
}

#[test]
fn test_config_get_and_set() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "health.policy"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "halving");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "tick.interval_secs", "5"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "tick.interval_secs"]);
    assert_eq!(stdout.trim(), "5");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "tick.interval_secs", "30"]);
    assert_eq!(code, 1);

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_list() {
    let dir = tempfile::tempdir().unwrap();
    let config = run_json(dir.path(), &["config", "list"]);
    assert_eq!(config["tick"]["interval_secs"], 10);
    assert_eq!(config["defaults"]["cadence_secs"], 86400);
}

#[test]
fn test_watch_stops_after_duration() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["watch", "--duration-secs", "1"]);
    assert_eq!(code, 0, "watch failed: {stderr}");
}
