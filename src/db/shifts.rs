use crate::db::columns;
use crate::errors::{AppError, AppResult};
use crate::models::shift::{Shift, ShiftStatus};
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_SHIFT: &str = "SELECT id, neighborhood_id, label, start_date, end_date,
        start_time, end_time, status, checkpoint_id, created_at
     FROM shifts";

pub fn map_row(row: &Row) -> rusqlite::Result<Shift> {
    Ok(Shift {
        id: row.get("id")?,
        neighborhood_id: row.get("neighborhood_id")?,
        label: row.get("label")?,
        start_date: columns::date(row, "start_date")?,
        end_date: columns::date(row, "end_date")?,
        start_time: columns::time(row, "start_time")?,
        end_time: columns::time(row, "end_time")?,
        status: columns::enumeration(row, "status", ShiftStatus::from_db_str)?,
        checkpoint_id: row.get("checkpoint_id")?,
        created_at: row.get("created_at")?,
    })
}

/// Insert a new shift and return its id.
pub fn insert_shift(conn: &Connection, shift: &Shift) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO shifts (neighborhood_id, label, start_date, end_date,
                             start_time, end_time, status, checkpoint_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            shift.neighborhood_id,
            shift.label,
            shift.start_date.format("%Y-%m-%d").to_string(),
            shift.end_date.format("%Y-%m-%d").to_string(),
            shift.start_time.format("%H:%M").to_string(),
            shift.end_time.format("%H:%M").to_string(),
            shift.status.to_db_str(),
            shift.checkpoint_id,
            shift.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Load a shift scoped to a neighborhood.
pub fn find_shift(conn: &Connection, neighborhood_id: i64, id: i64) -> AppResult<Option<Shift>> {
    let sql = format!("{SELECT_SHIFT} WHERE id = ?1 AND neighborhood_id = ?2");
    let shift = conn
        .query_row(&sql, params![id, neighborhood_id], map_row)
        .optional()?;
    Ok(shift)
}

pub fn get_shift(conn: &Connection, neighborhood_id: i64, id: i64) -> AppResult<Shift> {
    find_shift(conn, neighborhood_id, id)?.ok_or(AppError::ShiftNotFound(id))
}

pub fn list_shifts(
    conn: &Connection,
    neighborhood_id: i64,
    status: Option<ShiftStatus>,
) -> AppResult<Vec<Shift>> {
    let sql = format!(
        "{SELECT_SHIFT}
         WHERE neighborhood_id = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY start_date ASC, start_time ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![neighborhood_id, status.map(|s| s.to_db_str())],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn update_status(conn: &Connection, id: i64, status: ShiftStatus) -> AppResult<()> {
    conn.execute(
        "UPDATE shifts SET status = ?1 WHERE id = ?2",
        params![status.to_db_str(), id],
    )?;
    Ok(())
}
