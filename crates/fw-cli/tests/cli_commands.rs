#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable
//! Integration tests for the `fw` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn campus() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../worlds/campus.json")
}

fn fw() -> Command {
    let mut cmd = Command::cargo_bin("fw").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Write a script file into a fresh temp directory.
fn script(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.txt");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

// -- check -------------------------------------------------------------------

#[test]
fn check_valid_world() {
    fw().args(["check"])
        .arg(campus())
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"))
        .stdout(predicate::str::contains("6 locations, 7 items, 2 npcs"))
        .stdout(predicate::str::contains("reach location 501"));
}

#[test]
fn check_reports_dangling_destination() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(
        &path,
        r#"{ "locations": [
            { "id": 1, "name": "A", "brief_text": "a", "available_commands": { "go north": 7 } }
        ] }"#,
    )
    .unwrap();

    fw().arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("7"));
}

#[test]
fn check_missing_file_fails() {
    fw().args(["check", "/no/such/world.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// -- simulate ----------------------------------------------------------------

#[test]
fn simulate_matching_log_succeeds() {
    let (_dir, path) = script("expect: 1, 2, 1\ngo north\ngo south\n");
    fw().arg("simulate")
        .arg(campus())
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Location log: 1, 2, 1"))
        .stdout(predicate::str::contains("Location log OK"));
}

#[test]
fn simulate_mismatch_fails() {
    let (_dir, path) = script("expect: 1, 4\ngo north\n");
    fw().arg("simulate")
        .arg(campus())
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("MISMATCH"))
        .stderr(predicate::str::contains("expected location log"));
}

#[test]
fn simulate_transcript_shows_commands() {
    let (_dir, path) = script("go north\nlook\n");
    fw().arg("simulate")
        .arg(campus())
        .arg(&path)
        .arg("--transcript")
        .assert()
        .success()
        .stdout(predicate::str::contains("> go north"))
        .stdout(predicate::str::contains("St. George Street"));
}

#[test]
fn simulate_json_output() {
    let (_dir, path) = script("pick up tcard\ngo north\n");
    let output = fw()
        .arg("simulate")
        .arg(campus())
        .arg(&path)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "ongoing");
    assert_eq!(report["id_log"], serde_json::json!([1, 1, 2]));
    assert_eq!(report["events"][1]["kind"], "pickup");
    assert_eq!(report["events"][1]["affected_item"], "TCard");
}

#[test]
fn simulate_win_override() {
    let (_dir, path) = script("go north\ngo south\n");
    fw().arg("simulate")
        .arg(campus())
        .arg(&path)
        .args(["--win-location", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("won"))
        .stdout(predicate::str::contains("1 skipped"));
}

#[test]
fn simulate_rejects_bad_script() {
    let (_dir, path) = script("go north\nexpect: one\n");
    fw().arg("simulate")
        .arg(campus())
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("script line 2"));
}

#[test]
fn win_rules_conflict() {
    let (_dir, path) = script("look\n");
    fw().arg("simulate")
        .arg(campus())
        .arg(&path)
        .args(["--win-location", "2", "--win-missions", "1"])
        .assert()
        .failure();
}

// -- play --------------------------------------------------------------------

#[test]
fn play_reads_commands_from_stdin() {
    fw().arg("play")
        .arg(campus())
        .write_stdin("pick up tcard\ninventory\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dorm Room"))
        .stdout(predicate::str::contains("You pick up the TCard."))
        .stdout(predicate::str::contains("You are carrying: TCard."))
        .stdout(predicate::str::contains("Goodbye!"));
}

#[test]
fn play_reports_unknown_commands() {
    fw().arg("play")
        .arg(campus())
        .write_stdin("fly away\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("I don't understand \"fly away\"."));
}

#[test]
fn play_with_bad_start_fails() {
    fw().arg("play")
        .arg(campus())
        .args(["--start", "999"])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("start location 999"));
}

#[test]
fn zero_max_moves_flag_rejected() {
    fw().arg("play")
        .arg(campus())
        .args(["--max-moves", "0"])
        .write_stdin("quit\n")
        .assert()
        .failure();
}
