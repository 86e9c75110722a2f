use crate::db::migrate::run_pending_migrations;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;

/// Tables every ronda database must contain once migrated.
const REQUIRED_TABLES: [&str; 6] = [
    "log",
    "shifts",
    "checkpoints",
    "participants",
    "fine_policies",
    "fines",
];

/// Bring the schema up to date and check the result.
/// Returns how many migrations were applied.
pub fn init_db(conn: &Connection) -> AppResult<usize> {
    let applied = run_pending_migrations(conn)?;

    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    for table in REQUIRED_TABLES {
        if !stmt.exists([table])? {
            return Err(AppError::Migration(format!("table '{table}' is missing")));
        }
    }

    Ok(applied)
}
