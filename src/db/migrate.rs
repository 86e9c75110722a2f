//! Versioned schema migrations.
//!
//! Applied versions are recorded in the `log` table (operation
//! `migration_applied`, target = version id), which makes every run idempotent.

use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension};

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20261001_0001_patrol_schema",
        description: "Created shifts, checkpoints, participants, fine_policies and fines tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS checkpoints (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            neighborhood_id   INTEGER NOT NULL,
            name              TEXT NOT NULL,
            latitude          REAL NOT NULL CHECK(latitude BETWEEN -90 AND 90),
            longitude         REAL NOT NULL CHECK(longitude BETWEEN -180 AND 180),
            radius_meters     REAL NOT NULL CHECK(radius_meters > 0),
            access_token      TEXT NOT NULL,
            token_expires_at  TEXT NOT NULL,
            created_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS shifts (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            neighborhood_id  INTEGER NOT NULL,
            label            TEXT NOT NULL,
            start_date       TEXT NOT NULL,
            end_date         TEXT NOT NULL,
            start_time       TEXT NOT NULL,
            end_time         TEXT NOT NULL,
            status           TEXT NOT NULL DEFAULT 'ACTIVE'
                             CHECK(status IN ('ACTIVE','CLOSED','CANCELED')),
            checkpoint_id    INTEGER REFERENCES checkpoints(id),
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS participants (
            id                        INTEGER PRIMARY KEY AUTOINCREMENT,
            shift_id                  INTEGER NOT NULL REFERENCES shifts(id) ON DELETE CASCADE,
            resident_id               INTEGER NOT NULL,
            occurrence_date           TEXT NOT NULL,
            status                    TEXT NOT NULL DEFAULT 'PENDING'
                                      CHECK(status IN ('PENDING','PRESENT','ABSENT','EXCUSED')),
            check_in_at               TEXT,
            check_out_at              TEXT,
            check_in_lat              REAL,
            check_in_long             REAL,
            measured_distance_meters  REAL,
            check_in_method           TEXT CHECK(check_in_method IS NULL
                                                 OR check_in_method IN ('TOKEN','MANUAL')),
            checkpoint_id             INTEGER REFERENCES checkpoints(id),
            is_fined                  INTEGER NOT NULL DEFAULT 0,
            fine_amount               INTEGER,
            notes                     TEXT NOT NULL DEFAULT '',
            version                   INTEGER NOT NULL DEFAULT 0,
            UNIQUE(shift_id, resident_id, occurrence_date)
        );

        CREATE TABLE IF NOT EXISTS fine_policies (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            neighborhood_id    INTEGER NOT NULL,
            violation_kind     TEXT NOT NULL
                               CHECK(violation_kind IN ('ABSENCE','LATE_ARRIVAL','EARLY_DEPARTURE')),
            amount             INTEGER NOT NULL CHECK(amount >= 0),
            tolerance_minutes  INTEGER CHECK(tolerance_minutes IS NULL OR tolerance_minutes >= 0),
            is_active          INTEGER NOT NULL DEFAULT 1,
            updated_at         TEXT NOT NULL,
            UNIQUE(neighborhood_id, violation_kind)
        );

        CREATE TABLE IF NOT EXISTS fines (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            neighborhood_id  INTEGER NOT NULL,
            resident_id      INTEGER NOT NULL,
            shift_id         INTEGER NOT NULL REFERENCES shifts(id),
            participant_id   INTEGER NOT NULL REFERENCES participants(id),
            violation_kind   TEXT NOT NULL
                             CHECK(violation_kind IN ('ABSENCE','LATE_ARRIVAL','EARLY_DEPARTURE')),
            amount           INTEGER NOT NULL CHECK(amount > 0),
            status           TEXT NOT NULL DEFAULT 'UNPAID' CHECK(status IN ('UNPAID','PAID')),
            generated_at     TEXT NOT NULL,
            paid_at          TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_shifts_neighborhood ON shifts(neighborhood_id, start_date);
        CREATE INDEX IF NOT EXISTS idx_checkpoints_neighborhood ON checkpoints(neighborhood_id);
        CREATE INDEX IF NOT EXISTS idx_participants_shift ON participants(shift_id, occurrence_date);
        "#,
    },
    Migration {
        version: "20261005_0002_fine_unique_guard",
        description: "Added unique (shift_id, resident_id) index on fines",
        sql: r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uq_fines_shift_resident ON fines(shift_id, resident_id);
        CREATE INDEX IF NOT EXISTS idx_fines_neighborhood ON fines(neighborhood_id, generated_at);
        "#,
    },
];

/// Ensure that the `log` table exists; it also tracks applied migrations.
fn ensure_log_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )
}

fn is_applied(conn: &Connection, version: &str) -> rusqlite::Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;

    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;

    tx.commit()?;
    Ok(())
}

/// Public entry point: run all pending migrations, returns how many ran.
///
/// Invoked by db::init_db() and `ronda db --migrate`.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }

        apply(conn, m)?;
        success(format!("Migration applied: {}", m.version));
        applied += 1;
    }

    Ok(applied)
}

/// Versions known to this build, oldest first.
pub fn known_versions() -> Vec<&'static str> {
    MIGRATIONS.iter().map(|m| m.version).collect()
}
