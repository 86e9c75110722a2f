use crate::db::columns;
use crate::errors::AppResult;
use crate::models::fine_policy::FinePolicy;
use crate::models::violation_kind::ViolationKind;
use crate::utils::time::{format_ts, now};
use rusqlite::{Connection, Row, params};

pub fn map_row(row: &Row) -> rusqlite::Result<FinePolicy> {
    Ok(FinePolicy {
        id: row.get("id")?,
        neighborhood_id: row.get("neighborhood_id")?,
        violation_kind: columns::enumeration(row, "violation_kind", ViolationKind::from_db_str)?,
        amount: row.get("amount")?,
        tolerance_minutes: row.get("tolerance_minutes")?,
        is_active: columns::flag(row, "is_active")?,
    })
}

/// Insert or replace the policy for (neighborhood, kind).
pub fn upsert_policy(
    conn: &Connection,
    neighborhood_id: i64,
    kind: ViolationKind,
    amount: i64,
    tolerance_minutes: Option<i64>,
    is_active: bool,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO fine_policies
             (neighborhood_id, violation_kind, amount, tolerance_minutes, is_active, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(neighborhood_id, violation_kind) DO UPDATE SET
             amount = excluded.amount,
             tolerance_minutes = excluded.tolerance_minutes,
             is_active = excluded.is_active,
             updated_at = excluded.updated_at",
        params![
            neighborhood_id,
            kind.to_db_str(),
            amount,
            tolerance_minutes,
            is_active as i64,
            format_ts(&now()),
        ],
    )?;
    Ok(())
}

pub fn list_policies(conn: &Connection, neighborhood_id: i64) -> AppResult<Vec<FinePolicy>> {
    let mut stmt = conn.prepare(
        "SELECT id, neighborhood_id, violation_kind, amount, tolerance_minutes, is_active
         FROM fine_policies
         WHERE neighborhood_id = ?1
         ORDER BY violation_kind ASC",
    )?;
    let rows = stmt.query_map([neighborhood_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_active_policies(conn: &Connection, neighborhood_id: i64) -> AppResult<Vec<FinePolicy>> {
    Ok(list_policies(conn, neighborhood_id)?
        .into_iter()
        .filter(|p| p.is_active)
        .collect())
}
