use crate::db::columns;
use crate::errors::{AppError, AppResult};
use crate::models::check_in_method::CheckInMethod;
use crate::models::participant::{Participant, ParticipantStatus};
use crate::utils::time::format_ts;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_PARTICIPANT: &str = "SELECT p.id, p.shift_id, p.resident_id, p.occurrence_date,
        p.status, p.check_in_at, p.check_out_at, p.check_in_lat, p.check_in_long,
        p.measured_distance_meters, p.check_in_method, p.checkpoint_id,
        p.is_fined, p.fine_amount, p.notes, p.version
     FROM participants p
     JOIN shifts s ON s.id = p.shift_id";

pub fn map_row(row: &Row) -> rusqlite::Result<Participant> {
    Ok(Participant {
        id: row.get("id")?,
        shift_id: row.get("shift_id")?,
        resident_id: row.get("resident_id")?,
        occurrence_date: columns::date(row, "occurrence_date")?,
        status: columns::enumeration(row, "status", ParticipantStatus::from_db_str)?,
        check_in_at: columns::opt_timestamp(row, "check_in_at")?,
        check_out_at: columns::opt_timestamp(row, "check_out_at")?,
        check_in_lat: row.get("check_in_lat")?,
        check_in_long: row.get("check_in_long")?,
        measured_distance_meters: row.get("measured_distance_meters")?,
        check_in_method: columns::opt_enumeration(
            row,
            "check_in_method",
            CheckInMethod::from_db_str,
        )?,
        checkpoint_id: row.get("checkpoint_id")?,
        is_fined: columns::flag(row, "is_fined")?,
        fine_amount: row.get("fine_amount")?,
        notes: row.get("notes")?,
        version: row.get("version")?,
    })
}

/// Assign a resident to one occurrence. Returns false when the row already existed.
pub fn insert_if_absent(
    conn: &Connection,
    shift_id: i64,
    resident_id: i64,
    occurrence_date: &NaiveDate,
) -> AppResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO participants (shift_id, resident_id, occurrence_date)
         VALUES (?1, ?2, ?3)",
        params![
            shift_id,
            resident_id,
            occurrence_date.format("%Y-%m-%d").to_string()
        ],
    )?;
    Ok(inserted == 1)
}

/// Load a participant, scoped to the neighborhood owning its shift.
pub fn find_participant(
    conn: &Connection,
    neighborhood_id: i64,
    id: i64,
) -> AppResult<Option<Participant>> {
    let sql = format!("{SELECT_PARTICIPANT} WHERE p.id = ?1 AND s.neighborhood_id = ?2");
    let p = conn
        .query_row(&sql, params![id, neighborhood_id], map_row)
        .optional()?;
    Ok(p)
}

pub fn get_participant(conn: &Connection, neighborhood_id: i64, id: i64) -> AppResult<Participant> {
    find_participant(conn, neighborhood_id, id)?.ok_or(AppError::ParticipantNotFound(id))
}

/// All participants of a shift, in occurrence order.
pub fn list_by_shift(conn: &Connection, shift_id: i64) -> AppResult<Vec<Participant>> {
    let sql = format!(
        "{SELECT_PARTICIPANT}
         WHERE p.shift_id = ?1
         ORDER BY p.occurrence_date ASC, p.resident_id ASC, p.id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([shift_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Persist verifier fields, guarded by the version read at the start of the
/// transaction. A stale version means another writer got there first.
pub fn update_attendance(conn: &Connection, p: &Participant) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE participants
         SET status = ?1, check_in_at = ?2, check_out_at = ?3,
             check_in_lat = ?4, check_in_long = ?5, measured_distance_meters = ?6,
             check_in_method = ?7, checkpoint_id = ?8, notes = ?9,
             version = version + 1
         WHERE id = ?10 AND version = ?11",
        params![
            p.status.to_db_str(),
            p.check_in_at.as_ref().map(format_ts),
            p.check_out_at.as_ref().map(format_ts),
            p.check_in_lat,
            p.check_in_long,
            p.measured_distance_meters,
            p.check_in_method.map(|m| m.to_db_str()),
            p.checkpoint_id,
            p.notes,
            p.id,
            p.version,
        ],
    )?;

    if changed == 0 {
        return Err(AppError::ConcurrentUpdate(p.id));
    }
    Ok(())
}

/// Mirror of the fine issued for this participant. Written by the engine only.
pub fn set_fine_mirror(conn: &Connection, id: i64, amount: i64) -> AppResult<()> {
    conn.execute(
        "UPDATE participants SET is_fined = 1, fine_amount = ?1 WHERE id = ?2",
        params![amount, id],
    )?;
    Ok(())
}

/// PENDING → ABSENT, only if nobody checked in meanwhile.
pub fn mark_absent(conn: &Connection, id: i64) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE participants SET status = 'ABSENT', version = version + 1
         WHERE id = ?1 AND status = 'PENDING'",
        [id],
    )?;
    Ok(changed == 1)
}
