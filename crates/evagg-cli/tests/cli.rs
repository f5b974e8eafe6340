//! End-to-end CLI behavior.

use assert_cmd::Command;
use predicates::prelude::*;

fn evagg() -> Command {
    Command::cargo_bin("evagg").unwrap()
}

#[test]
fn missing_registry_exits_nonzero() {
    evagg()
        .args(["run", "--sources", "/nonexistent/sources.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn sources_lists_enabled_entries() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("sources.yaml");
    std::fs::write(
        &registry,
        r#"
sites:
  - name: City Library
    url: https://library.example.org/events
    method: html
  - name: Dormant Feed
    url: https://dormant.example.org/feed.ics
    method: ical
    enabled: false
"#,
    )
    .unwrap();

    evagg()
        .args(["sources", "--sources"])
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("City Library"))
        .stdout(predicate::str::contains("Dormant Feed").not());

    evagg()
        .args(["sources", "--all", "--sources"])
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dormant Feed"));
}

#[test]
fn config_init_writes_default_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    evagg()
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("max_retries"));

    // A second init without --force refuses to clobber.
    evagg()
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn config_show_prints_settings() {
    evagg()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("retry_delay_secs"));
}
