use crate::db::columns;
use crate::errors::{AppError, AppResult};
use crate::models::fine::{Fine, FineStatus};
use crate::models::violation_kind::ViolationKind;
use crate::utils::time::format_ts;
use chrono::NaiveDateTime;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};

const SELECT_FINE: &str = "SELECT id, neighborhood_id, resident_id, shift_id, participant_id,
        violation_kind, amount, status, generated_at, paid_at
     FROM fines";

/// Filter used by listings and the ledger polling interface.
#[derive(Debug, Clone, Default)]
pub struct FineFilter {
    pub shift_id: Option<i64>,
    pub status: Option<FineStatus>,
    pub since: Option<NaiveDateTime>,
}

pub fn map_row(row: &Row) -> rusqlite::Result<Fine> {
    Ok(Fine {
        id: row.get("id")?,
        neighborhood_id: row.get("neighborhood_id")?,
        resident_id: row.get("resident_id")?,
        shift_id: row.get("shift_id")?,
        participant_id: row.get("participant_id")?,
        violation_kind: columns::enumeration(row, "violation_kind", ViolationKind::from_db_str)?,
        amount: row.get("amount")?,
        status: columns::enumeration(row, "status", FineStatus::from_db_str)?,
        generated_at: columns::timestamp(row, "generated_at")?,
        paid_at: columns::opt_timestamp(row, "paid_at")?,
    })
}

pub fn exists_for(conn: &Connection, shift_id: i64, resident_id: i64) -> AppResult<bool> {
    let mut stmt =
        conn.prepare_cached("SELECT 1 FROM fines WHERE shift_id = ?1 AND resident_id = ?2")?;
    Ok(stmt.exists(params![shift_id, resident_id])?)
}

/// Insert a fine. `Ok(None)` when the (shift, resident) unique index rejected
/// it, i.e. a concurrent evaluation fined this resident first.
pub fn insert_fine(conn: &Connection, fine: &Fine) -> AppResult<Option<i64>> {
    let res = conn.execute(
        "INSERT INTO fines (neighborhood_id, resident_id, shift_id, participant_id,
                            violation_kind, amount, status, generated_at, paid_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            fine.neighborhood_id,
            fine.resident_id,
            fine.shift_id,
            fine.participant_id,
            fine.violation_kind.to_db_str(),
            fine.amount,
            fine.status.to_db_str(),
            format_ts(&fine.generated_at),
            fine.paid_at.as_ref().map(format_ts),
        ],
    );

    match res {
        Ok(_) => Ok(Some(conn.last_insert_rowid())),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            if exists_for(conn, fine.shift_id, fine.resident_id)? {
                Ok(None)
            } else {
                Err(AppError::Db(rusqlite::Error::SqliteFailure(e, None)))
            }
        }
        Err(e) => Err(e.into()),
    }
}

pub fn find_fine(conn: &Connection, neighborhood_id: i64, id: i64) -> AppResult<Option<Fine>> {
    let sql = format!("{SELECT_FINE} WHERE id = ?1 AND neighborhood_id = ?2");
    let fine = conn
        .query_row(&sql, params![id, neighborhood_id], map_row)
        .optional()?;
    Ok(fine)
}

pub fn list_fines(
    conn: &Connection,
    neighborhood_id: i64,
    filter: &FineFilter,
) -> AppResult<Vec<Fine>> {
    let sql = format!(
        "{SELECT_FINE}
         WHERE neighborhood_id = ?1
           AND (?2 IS NULL OR shift_id = ?2)
           AND (?3 IS NULL OR status = ?3)
           AND (?4 IS NULL OR generated_at >= ?4)
         ORDER BY generated_at ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            neighborhood_id,
            filter.shift_id,
            filter.status.map(|s| s.to_db_str()),
            filter.since.as_ref().map(format_ts),
        ],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// UNPAID → PAID. Returns false when the fine was not UNPAID.
pub fn mark_paid(conn: &Connection, id: i64, paid_at: &NaiveDateTime) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE fines SET status = 'PAID', paid_at = ?1 WHERE id = ?2 AND status = 'UNPAID'",
        params![format_ts(paid_at), id],
    )?;
    Ok(changed == 1)
}
