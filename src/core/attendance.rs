//! Attendance verification: token + geofence check, then the roster write.
//!
//! Every attempt is one IMMEDIATE transaction (read, validate, write) and the
//! participant row is updated with a version guard, so duplicate taps on the
//! same participant serialize instead of double-applying.

use crate::core::calculator::geofence::{haversine_meters, validate_coordinates, within_radius};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{checkpoints, participants, shifts};
use crate::errors::{AppError, AppResult};
use crate::models::check_in_method::CheckInMethod;
use crate::models::checkpoint::Checkpoint;
use crate::models::participant::{Participant, ParticipantStatus};
use crate::models::shift::{Shift, ShiftStatus};
use crate::utils::time::format_ts;
use chrono::NaiveDateTime;
use rusqlite::Connection;

/// One check-in or check-out attempt.
#[derive(Debug, Clone)]
pub struct AttendanceRequest {
    pub participant_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub token: Option<String>,
    pub method: CheckInMethod,
    /// Explicit checkpoint; falls back to the shift's, then to the
    /// neighborhood's only checkpoint.
    pub checkpoint_id: Option<i64>,
    pub at: NaiveDateTime,
}

pub struct AttendanceVerifier;

impl AttendanceVerifier {
    /// PENDING → PRESENT on a valid attempt. Repeating it on a PRESENT
    /// participant refreshes the telemetry but keeps the first `check_in_at`.
    pub fn check_in(
        pool: &mut DbPool,
        neighborhood_id: i64,
        req: &AttendanceRequest,
    ) -> AppResult<Participant> {
        validate_coordinates(req.latitude, req.longitude)?;

        let tx = pool.immediate()?;
        let mut p = participants::get_participant(&tx, neighborhood_id, req.participant_id)?;
        let shift = shifts::get_shift(&tx, neighborhood_id, p.shift_id)?;
        ensure_shift_open(&shift)?;

        match p.status {
            ParticipantStatus::Pending | ParticipantStatus::Present => {}
            other => {
                return Err(AppError::validation(format!(
                    "participant #{} is {} and cannot check in",
                    p.id,
                    other.to_db_str()
                )));
            }
        }

        let cp = resolve_checkpoint(&tx, neighborhood_id, &shift, req.checkpoint_id)?;

        if req.method == CheckInMethod::Token {
            verify_token(&cp, req)?;
        }

        let distance = haversine_meters(req.latitude, req.longitude, cp.latitude, cp.longitude);
        if !within_radius(distance, cp.radius_meters) {
            return Err(AppError::OutOfGeofence {
                distance_meters: distance,
                radius_meters: cp.radius_meters,
            });
        }

        let first = p.status == ParticipantStatus::Pending;
        if first {
            p.status = ParticipantStatus::Present;
            p.check_in_at = Some(req.at);
        }
        p.check_in_lat = Some(req.latitude);
        p.check_in_long = Some(req.longitude);
        p.measured_distance_meters = Some(distance);
        p.check_in_method = Some(req.method);
        p.checkpoint_id = Some(cp.id);

        participants::update_attendance(&tx, &p)?;
        audit(
            &tx,
            "check_in",
            &format!("participant #{}", p.id),
            &format!(
                "{} at {} via {} ({:.1} m from {})",
                if first { "checked in" } else { "telemetry refreshed" },
                format_ts(&req.at),
                req.method.to_db_str(),
                distance,
                cp.name
            ),
        )?;
        tx.commit()?;

        p.version += 1;
        Ok(p)
    }

    /// Records `check_out_at` for a PRESENT participant. The token is still
    /// verified for TOKEN attempts; the geofence is not, the resident is leaving.
    pub fn check_out(
        pool: &mut DbPool,
        neighborhood_id: i64,
        req: &AttendanceRequest,
    ) -> AppResult<Participant> {
        validate_coordinates(req.latitude, req.longitude)?;

        let tx = pool.immediate()?;
        let mut p = participants::get_participant(&tx, neighborhood_id, req.participant_id)?;
        let shift = shifts::get_shift(&tx, neighborhood_id, p.shift_id)?;
        ensure_shift_open(&shift)?;

        if p.status != ParticipantStatus::Present {
            return Err(AppError::validation(format!(
                "participant #{} is {}, check in first",
                p.id,
                p.status.to_db_str()
            )));
        }

        if let Some(check_in_at) = p.check_in_at
            && req.at < check_in_at
        {
            return Err(AppError::validation(format!(
                "check-out {} is before check-in {}",
                format_ts(&req.at),
                format_ts(&check_in_at)
            )));
        }

        if req.method == CheckInMethod::Token {
            let cp = resolve_checkpoint(&tx, neighborhood_id, &shift, req.checkpoint_id)?;
            verify_token(&cp, req)?;
        }

        p.check_out_at = Some(req.at);

        participants::update_attendance(&tx, &p)?;
        audit(
            &tx,
            "check_out",
            &format!("participant #{}", p.id),
            &format!("checked out at {} via {}", format_ts(&req.at), req.method.to_db_str()),
        )?;
        tx.commit()?;

        p.version += 1;
        Ok(p)
    }
}

fn ensure_shift_open(shift: &Shift) -> AppResult<()> {
    if shift.status != ShiftStatus::Active {
        return Err(AppError::validation(format!(
            "shift #{} is {}",
            shift.id,
            shift.status.to_db_str()
        )));
    }
    Ok(())
}

fn verify_token(cp: &Checkpoint, req: &AttendanceRequest) -> AppResult<()> {
    let token = req
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::validation("a token is required for TOKEN check-ins"))?;

    if !cp.accepts_token(token, req.at) {
        return Err(AppError::InvalidOrExpiredToken);
    }
    Ok(())
}

/// Explicit checkpoint → shift default → the neighborhood's only checkpoint.
fn resolve_checkpoint(
    conn: &Connection,
    neighborhood_id: i64,
    shift: &Shift,
    requested: Option<i64>,
) -> AppResult<Checkpoint> {
    if let Some(id) = requested.or(shift.checkpoint_id) {
        return checkpoints::get_checkpoint(conn, neighborhood_id, id);
    }

    let mut all = checkpoints::list_checkpoints(conn, neighborhood_id)?;
    match all.len() {
        1 => Ok(all.remove(0)),
        0 => Err(AppError::validation(format!(
            "neighborhood {} has no checkpoint",
            neighborhood_id
        ))),
        n => Err(AppError::validation(format!(
            "shift #{} has no default checkpoint and the neighborhood has {} of them, pick one",
            shift.id, n
        ))),
    }
}
