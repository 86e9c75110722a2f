use crate::db::columns;
use crate::errors::{AppError, AppResult};
use crate::models::checkpoint::Checkpoint;
use crate::utils::time::format_ts;
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_CHECKPOINT: &str = "SELECT id, neighborhood_id, name, latitude, longitude,
        radius_meters, access_token, token_expires_at, created_at
     FROM checkpoints";

pub fn map_row(row: &Row) -> rusqlite::Result<Checkpoint> {
    Ok(Checkpoint {
        id: row.get("id")?,
        neighborhood_id: row.get("neighborhood_id")?,
        name: row.get("name")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        radius_meters: row.get("radius_meters")?,
        access_token: row.get("access_token")?,
        token_expires_at: columns::timestamp(row, "token_expires_at")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_checkpoint(conn: &Connection, cp: &Checkpoint) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO checkpoints (neighborhood_id, name, latitude, longitude, radius_meters,
                                  access_token, token_expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            cp.neighborhood_id,
            cp.name,
            cp.latitude,
            cp.longitude,
            cp.radius_meters,
            cp.access_token,
            format_ts(&cp.token_expires_at),
            cp.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_checkpoint(
    conn: &Connection,
    neighborhood_id: i64,
    id: i64,
) -> AppResult<Option<Checkpoint>> {
    let sql = format!("{SELECT_CHECKPOINT} WHERE id = ?1 AND neighborhood_id = ?2");
    let cp = conn
        .query_row(&sql, params![id, neighborhood_id], map_row)
        .optional()?;
    Ok(cp)
}

pub fn get_checkpoint(conn: &Connection, neighborhood_id: i64, id: i64) -> AppResult<Checkpoint> {
    find_checkpoint(conn, neighborhood_id, id)?.ok_or(AppError::CheckpointNotFound(id))
}

pub fn list_checkpoints(conn: &Connection, neighborhood_id: i64) -> AppResult<Vec<Checkpoint>> {
    let sql = format!("{SELECT_CHECKPOINT} WHERE neighborhood_id = ?1 ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([neighborhood_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Replace the token in place; the previous value stops matching at once.
pub fn update_token(
    conn: &Connection,
    id: i64,
    token: &str,
    expires_at: &NaiveDateTime,
) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE checkpoints SET access_token = ?1, token_expires_at = ?2 WHERE id = ?3",
        params![token, format_ts(expires_at), id],
    )?;
    if changed == 0 {
        return Err(AppError::CheckpointNotFound(id));
    }
    Ok(())
}
