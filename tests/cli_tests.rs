use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_cli_db, ronda, setup_test_db, temp_out};

/// Checkpoint #1, overnight shift #1 on 2026-03-10 and residents 7 and 8.
fn seed_patrol(db_path: &str) {
    init_cli_db(db_path);

    ronda()
        .args([
            "--db", db_path, "checkpoint", "add", "--name", "Piazza", "--lat", "45.4642", "--lon",
            "9.19", "--radius", "100", "--ttl", "60",
        ])
        .assert()
        .success()
        .stdout(contains("Checkpoint #1 'Piazza' created"))
        .stdout(contains("token:"));

    ronda()
        .args([
            "--db",
            db_path,
            "shift",
            "add",
            "--label",
            "Night round",
            "--start-date",
            "2026-03-10",
            "--start",
            "22:00",
            "--end",
            "04:00",
            "--checkpoint",
            "1",
        ])
        .assert()
        .success()
        .stdout(contains("Shift #1 'Night round' scheduled"))
        .stdout(contains("2026-03-11 04:00"));

    for resident in ["7", "8"] {
        ronda()
            .args([
                "--db", db_path, "roster", "assign", "--shift", "1", "--resident", resident,
            ])
            .assert()
            .success()
            .stdout(contains("1 occurrence(s)"));
    }
}

#[test]
fn test_init_creates_schema() {
    let db_path = setup_test_db("cli_init");

    ronda()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    ronda()
        .args(["--db", &db_path, "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("20261005_0002_fine_unique_guard"))
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_full_patrol_flow() {
    let db_path = setup_test_db("cli_full_flow");
    seed_patrol(&db_path);

    ronda()
        .args([
            "--db", &db_path, "policy", "set", "--kind", "late-arrival", "--amount", "20000",
            "--tolerance", "15",
        ])
        .assert()
        .success()
        .stdout(contains("late arrival policy: 20.000"));

    ronda()
        .args([
            "--db", &db_path, "policy", "set", "--kind", "absence", "--amount", "50000",
        ])
        .assert()
        .success();

    // resident 7 arrives 20 minutes late, resident 8 never shows up
    ronda()
        .args([
            "--db",
            &db_path,
            "checkin",
            "1",
            "--lat",
            "45.4642",
            "--lon",
            "9.19",
            "--method",
            "manual",
            "--at",
            "2026-03-10T22:20",
        ])
        .assert()
        .success()
        .stdout(contains("is PRESENT"));

    ronda()
        .args(["--db", &db_path, "roster", "list", "--shift", "1"])
        .assert()
        .success()
        .stdout(contains("PRESENT"))
        .stdout(contains("PENDING"))
        .stdout(contains("MANUAL"));

    ronda()
        .args(["--db", &db_path, "evaluate", "1", "--at", "2026-03-11T08:00"])
        .assert()
        .success()
        .stdout(contains("late arrival"))
        .stdout(contains("absence"))
        .stdout(contains("2 fine(s) created, total 70.000"))
        .stdout(contains("1 participant(s) marked ABSENT"));

    // second run creates nothing
    ronda()
        .args(["--db", &db_path, "evaluate", "1", "--at", "2026-03-11T09:00"])
        .assert()
        .success()
        .stdout(contains("0 fine(s) created"))
        .stdout(contains("already fined"));

    ronda()
        .args(["--db", &db_path, "fines", "list"])
        .assert()
        .success()
        .stdout(contains("LATE_ARRIVAL"))
        .stdout(contains("ABSENCE"))
        .stdout(contains("Unpaid in this list: 70.000"));

    ronda()
        .args(["--db", &db_path, "fines", "pay", "1"])
        .assert()
        .success()
        .stdout(contains("Fine #1 (20.000) paid"));

    ronda()
        .args(["--db", &db_path, "fines", "pay", "1"])
        .assert()
        .failure()
        .stderr(contains("already paid"));

    ronda()
        .args(["--db", &db_path, "fines", "list", "--status", "unpaid"])
        .assert()
        .success()
        .stdout(contains("ABSENCE"))
        .stdout(contains("LATE_ARRIVAL").not());

    ronda()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("check_in"))
        .stdout(contains("fine_created"))
        .stdout(contains("ledger_handoff"));
}

#[test]
fn test_check_in_outside_geofence_fails() {
    let db_path = setup_test_db("cli_geofence");
    seed_patrol(&db_path);

    ronda()
        .args([
            "--db",
            &db_path,
            "checkin",
            "1",
            "--lat",
            "45.4742",
            "--lon",
            "9.19",
            "--method",
            "manual",
            "--at",
            "2026-03-10T22:00",
        ])
        .assert()
        .failure()
        .stderr(contains("Out of geofence"));

    ronda()
        .args(["--db", &db_path, "roster", "list", "--shift", "1"])
        .assert()
        .success()
        .stdout(contains("PRESENT").not());
}

#[test]
fn test_token_check_in_requires_token() {
    let db_path = setup_test_db("cli_token_required");
    seed_patrol(&db_path);

    ronda()
        .args([
            "--db", &db_path, "checkin", "1", "--lat", "45.4642", "--lon", "9.19", "--method",
            "token",
        ])
        .assert()
        .failure()
        .stderr(contains("token is required"));

    ronda()
        .args([
            "--db", &db_path, "checkin", "1", "--lat", "45.4642", "--lon", "9.19", "--method",
            "token", "--token", "not-the-token",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid or expired checkpoint token"));
}

#[test]
fn test_export_fines_json_and_csv() {
    let db_path = setup_test_db("cli_export");
    seed_patrol(&db_path);

    ronda()
        .args(["--db", &db_path, "policy", "set", "--kind", "absence", "--amount", "50000"])
        .assert()
        .success();

    ronda()
        .args(["--db", &db_path, "evaluate", "--due", "--at", "2026-03-12T00:00"])
        .assert()
        .success()
        .stdout(contains("Evaluating shift #1"));

    let json_out = temp_out("cli_export_fines", "json");
    ronda()
        .args([
            "--db", &db_path, "fines", "export", "--format", "json", "--file", &json_out, "--force",
        ])
        .assert()
        .success()
        .stdout(contains("JSON export completed (2 fines)"));

    let json = fs::read_to_string(&json_out).expect("read json");
    assert!(json.contains("\"violation_kind\": \"ABSENCE\""));
    assert!(json.contains("\"amount\": 50000"));

    let csv_out = temp_out("cli_export_fines", "csv");
    ronda()
        .args([
            "--db", &db_path, "fines", "export", "--format", "csv", "--file", &csv_out, "--force",
        ])
        .assert()
        .success();

    let csv = fs::read_to_string(&csv_out).expect("read csv");
    assert!(csv.starts_with("id,neighborhood_id,resident_id,shift_id,participant_id"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn test_neighborhood_flag_scopes_commands() {
    let db_path = setup_test_db("cli_neighborhood");
    seed_patrol(&db_path);

    ronda()
        .args(["--db", &db_path, "--neighborhood", "2", "shift", "list"])
        .assert()
        .success()
        .stdout(contains("No shifts found"));

    ronda()
        .args(["--db", &db_path, "--neighborhood", "2", "evaluate", "1"])
        .assert()
        .failure()
        .stderr(contains("Shift not found: 1"));
}

#[test]
fn test_shift_cancel_and_invalid_input() {
    let db_path = setup_test_db("cli_shift_cancel");
    seed_patrol(&db_path);

    ronda()
        .args(["--db", &db_path, "shift", "cancel", "1"])
        .assert()
        .success()
        .stdout(contains("canceled"));

    ronda()
        .args(["--db", &db_path, "shift", "list", "--status", "canceled"])
        .assert()
        .success()
        .stdout(contains("CANCELED"));

    ronda()
        .args([
            "--db",
            &db_path,
            "shift",
            "add",
            "--label",
            "Bad",
            "--start-date",
            "2026-13-01",
            "--start",
            "22:00",
            "--end",
            "04:00",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid date format"));

    ronda()
        .args(["--db", &db_path, "evaluate"])
        .assert()
        .failure();
}

#[test]
fn test_backup_creates_copy() {
    let db_path = setup_test_db("cli_backup");
    seed_patrol(&db_path);

    let out = temp_out("cli_backup", "sqlite");
    ronda()
        .args(["--db", &db_path, "backup", "--file", &out, "--force"])
        .assert()
        .success()
        .stdout(contains("Backup created"));

    assert!(fs::metadata(&out).map(|m| m.len() > 0).unwrap_or(false));
}
