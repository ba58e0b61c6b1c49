mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::{row, write_roster};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_bid_roster")
}

/// Run inside `dir` with a clean roster environment so no ambient config leaks in.
fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .current_dir(dir)
        .env_remove("BID_CONFIG")
        .env_remove("BID_SOURCES")
        .env_remove("BID_SQLITE")
        .env("BID_BASE_DIR", dir)
        .env("BID_PATTERN", "*.csv.zip")
        .env("RUST_LOG", "off")
        .output()
        .expect("bid_roster should run")
}

fn seeded_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_roster(dir.path(), "a.csv.zip", &[row("ANA SILVA", "ANINHA", "Lions", "2024-01-10", "2024-01-01")]);
    write_roster(dir.path(), "b.csv.zip", &[row("CARLOS SILVA", "", "Tigers", "2024-03-10", "2024-03-01")]);
    dir
}

#[test]
fn missing_command_prints_usage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_in(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: bid_roster"));
}

#[test]
fn teams_command_lists_one_team_per_line() {
    let dir = seeded_dir();
    let output = run_in(dir.path(), &["teams"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Lions\nTigers\n");
}

#[test]
fn search_command_emits_json() {
    let dir = seeded_dir();
    let output = run_in(dir.path(), &["search", "silva", "--team", "Tigers"]);

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("search should emit json");
    assert_eq!(payload["count"], 1);
    assert_eq!(payload["rows"][0]["full_name"], "CARLOS SILVA");
}

#[test]
fn search_command_rejects_out_of_range_limit() {
    let dir = seeded_dir();
    let output = run_in(dir.path(), &["search", "--limit", "5000"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn details_without_name_is_a_usage_error() {
    let dir = seeded_dir();
    let output = run_in(dir.path(), &["details"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("player's name"));
}

#[test]
fn details_csv_writes_bom_prefixed_rows() {
    let dir = seeded_dir();
    let output = run_in(dir.path(), &["details", "ana", "--csv"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.starts_with(&[0xEF, 0xBB, 0xBF]));
    let text = String::from_utf8_lossy(&output.stdout[3..]);
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn sources_command_reports_each_archive() {
    let dir = seeded_dir();
    let output = run_in(dir.path(), &["sources"]);

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("sources should emit json");
    assert_eq!(payload["backend"], "archives");
    assert_eq!(payload["records"], 2);
    assert_eq!(payload["sources"].as_array().map(Vec::len), Some(2));
}

#[test]
fn no_archives_fails_the_command() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_in(dir.path(), &["teams"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no source archives found"));
}
