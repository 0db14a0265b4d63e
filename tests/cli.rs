#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SNAPSHOT: &str = r#"{
  "employees": [{ "id": 42, "display_name": "Ana Pérez" }],
  "assignments": [
    { "id": 1, "employee_id": 42, "template_id": 1, "start_date": "2024-01-01", "end_date": "2024-01-10" },
    { "id": 2, "employee_id": 42, "template_id": 2, "start_date": "2024-01-05", "end_date": null }
  ],
  "templates": [
    {
      "id": 1, "alias": "Bureau", "cycle_length_days": 7,
      "days": [
        { "day_index": 1, "interval": { "id": 10, "alias": "Jour", "start_time": "09:00:00", "total_minutes": 540, "net_minutes": 480 } },
        { "day_index": 2, "interval": { "id": 10, "alias": "Jour", "start_time": "09:00:00", "total_minutes": 540, "net_minutes": 480 } }
      ]
    },
    {
      "id": 2, "alias": "Rotation", "cycle_length_days": 14,
      "days": [
        { "day_index": 0, "interval": { "id": 20, "alias": "Nuit", "start_time": "22:00:00", "total_minutes": 480, "net_minutes": 450 } }
      ]
    }
  ],
  "exceptions": []
}"#;

fn write_snapshot(dir: &Path) -> String {
    let path = dir.join("schedule.json");
    fs::write(&path, SNAPSHOT).unwrap();
    path.to_string_lossy().into_owned()
}

fn cli() -> Command {
    Command::cargo_bin("pointage-cli").unwrap()
}

#[test]
fn resolve_prints_one_line_per_day() {
    let dir = tempdir().unwrap();
    let data = write_snapshot(dir.path());
    cli()
        .args(["--data", data.as_str(), "resolve", "--employee", "42"])
        .args(["--start", "2024-01-01", "--end", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana Pérez"))
        .stdout(predicate::str::contains(
            "2024-01-01 Monday    scheduled_work 09:00-18:00 Jour",
        ))
        .stdout(predicate::str::contains(
            "2024-01-02 Tuesday   scheduled_work 09:00-18:00 Jour",
        ));
}

#[test]
fn resolve_uses_locale_and_writes_csv() {
    let dir = tempdir().unwrap();
    let data = write_snapshot(dir.path());
    let out = dir.path().join("days.csv");
    cli()
        .args(["--data", data.as_str(), "--locale", "fr", "resolve", "--employee", "42"])
        .args(["--start", "2024-01-05", "--end", "2024-01-05"])
        .args(["--out-csv", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("vendredi"))
        .stdout(predicate::str::contains("22:00-06:00+1 Nuit"));
    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.contains("2024-01-05,vendredi,scheduled_work,Nuit,2024-01-05 22:00,2024-01-06 06:00,450,20,"));
}

#[test]
fn inverted_range_fails() {
    let dir = tempdir().unwrap();
    let data = write_snapshot(dir.path());
    cli()
        .args(["--data", data.as_str(), "resolve", "--employee", "42"])
        .args(["--start", "2024-01-09", "--end", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date range"));
}

#[test]
fn check_reports_overlap_with_warning_code() {
    let dir = tempdir().unwrap();
    let data = write_snapshot(dir.path());
    cli()
        .args(["--data", data.as_str(), "check", "--employee", "42"])
        .args(["--start", "2024-01-04", "--end", "2024-01-06"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "2024-01-05 | overlap | kept assignment 2 over 1",
        ));
}

#[test]
fn day_index_follows_rotation_anchor() {
    let dir = tempdir().unwrap();
    let data = write_snapshot(dir.path());
    cli()
        .args(["--data", data.as_str(), "day-index", "--assignment", "2", "--date", "2024-01-20"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn imported_exceptions_are_persisted() {
    let dir = tempdir().unwrap();
    let data = write_snapshot(dir.path());
    let csv = dir.path().join("exceptions.csv");
    fs::write(
        &csv,
        "id,assignment_id,exception_date,day_index,valid_from,valid_until,interval_id,alias,start_time,total_minutes,net_minutes,active,remarks\n\
         7,1,2024-01-02,,,,30,Tarde,14:00,480,450,,\n",
    )
    .unwrap();
    cli()
        .args(["--data", data.as_str(), "import-exceptions", "--csv", csv.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 1 exception(s)"));

    cli()
        .args(["--data", data.as_str(), "resolve", "--employee", "42"])
        .args(["--start", "2024-01-02", "--end", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exception      14:00-22:00 Tarde #7"));
}

#[test]
fn week_of_resolves_monday_to_sunday() {
    let dir = tempdir().unwrap();
    let data = write_snapshot(dir.path());
    cli()
        .args(["--data", data.as_str(), "week", "--employee", "42", "--of", "2024-01-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "2024-01-01 Monday    scheduled_work 09:00-18:00 Jour",
        ))
        .stdout(predicate::str::contains("2024-01-05 Friday    scheduled_work 22:00-06:00+1 Nuit"))
        .stdout(predicate::str::contains("2024-01-07 Sunday    rest_day"))
        .stdout(predicate::str::contains("2023-12-31").not())
        .stdout(predicate::str::contains("2024-01-08").not());
}

#[test]
fn range_cap_is_opt_in() {
    let dir = tempdir().unwrap();
    let data = write_snapshot(dir.path());
    cli()
        .args(["--data", data.as_str(), "resolve", "--employee", "42"])
        .args(["--start", "2024-01-01", "--end", "2025-12-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-12-31 Wednesday"));
    cli()
        .args(["--data", data.as_str(), "--max-range-days", "7", "resolve", "--employee", "42"])
        .args(["--start", "2024-01-01", "--end", "2024-01-08"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the limit of 7 days"));
}
