#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ronda::core::attendance::AttendanceRequest;
use ronda::core::checkpoint::{CheckpointLogic, NewCheckpoint};
use ronda::core::policy::PolicyLogic;
use ronda::core::roster::RosterLogic;
use ronda::core::shift::{NewShift, ShiftLogic};
use ronda::db::initialize::init_db;
use ronda::db::pool::DbPool;
use ronda::models::check_in_method::CheckInMethod;
use ronda::models::checkpoint::Checkpoint;
use ronda::models::participant::Participant;
use ronda::models::shift::Shift;
use ronda::models::violation_kind::ViolationKind;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Neighborhood used by every library-level test.
pub const NB: i64 = 1;

/// Checkpoint used by most tests: a square in the old town.
pub const CP_LAT: f64 = 45.4642;
pub const CP_LON: f64 = 9.1900;

pub fn ronda() -> Command {
    cargo_bin_cmd!("ronda")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_ronda.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_ronda_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fresh, migrated database opened through the library.
pub fn open_pool(name: &str) -> DbPool {
    let db_path = setup_test_db(name);
    let pool = DbPool::new(&db_path).expect("open db");
    init_db(&pool.conn).expect("init db");
    pool
}

/// Initialize a database through the CLI (schema only, no config file).
pub fn init_cli_db(db_path: &str) {
    ronda()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").expect("timestamp")
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
}

pub fn hm(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").expect("time")
}

/// Checkpoint whose token is issued at `issued_at` and lives `ttl` minutes.
pub fn seed_checkpoint_at(
    pool: &mut DbPool,
    radius: f64,
    issued_at: &str,
    ttl: i64,
) -> Checkpoint {
    CheckpointLogic::create(
        pool,
        NB,
        NewCheckpoint {
            name: "Piazza".to_string(),
            latitude: CP_LAT,
            longitude: CP_LON,
            radius_meters: radius,
        },
        ttl,
        ts(issued_at),
    )
    .expect("create checkpoint")
}

/// 100 m checkpoint with a token valid for the whole of 2026.
pub fn seed_checkpoint(pool: &mut DbPool) -> Checkpoint {
    seed_checkpoint_at(pool, 100.0, "2026-01-01T00:00", 365 * 24 * 60)
}

pub fn seed_shift(
    pool: &mut DbPool,
    start_date: &str,
    end_date: &str,
    start: &str,
    end: &str,
    checkpoint_id: Option<i64>,
) -> Shift {
    ShiftLogic::create(
        pool,
        NB,
        NewShift {
            label: "Night round".to_string(),
            start_date: date(start_date),
            end_date: date(end_date),
            start_time: hm(start),
            end_time: hm(end),
            checkpoint_id,
        },
    )
    .expect("create shift")
}

/// Overnight shift 22:00 → 04:00 on 2026-03-10 with one resident assigned.
pub fn seed_night(pool: &mut DbPool) -> (Checkpoint, Shift, Participant) {
    let cp = seed_checkpoint(pool);
    let shift = seed_shift(pool, "2026-03-10", "2026-03-11", "22:00", "04:00", Some(cp.id));
    let p = assign(pool, shift.id, 7);
    (cp, shift, p)
}

/// Assign `resident` to every occurrence and return the first participant row.
pub fn assign(pool: &mut DbPool, shift_id: i64, resident: i64) -> Participant {
    RosterLogic::assign(pool, NB, shift_id, resident, None).expect("assign");
    RosterLogic::list(pool, NB, shift_id)
        .expect("roster")
        .into_iter()
        .find(|p| p.resident_id == resident)
        .expect("participant")
}

pub fn set_policy(pool: &mut DbPool, kind: ViolationKind, amount: i64, tolerance: Option<i64>) {
    PolicyLogic::set(pool, NB, kind, amount, tolerance, true).expect("set policy");
}

pub fn token_request(p: &Participant, cp: &Checkpoint, at: &str) -> AttendanceRequest {
    AttendanceRequest {
        participant_id: p.id,
        latitude: CP_LAT,
        longitude: CP_LON,
        token: Some(cp.access_token.clone()),
        method: CheckInMethod::Token,
        checkpoint_id: None,
        at: ts(at),
    }
}
