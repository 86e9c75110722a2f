use crate::core::calculator::geofence::validate_coordinates;
use crate::db::checkpoints;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::checkpoint::Checkpoint;
use crate::utils::time::{format_ts, now};
use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewCheckpoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn expiry(issued_at: NaiveDateTime, ttl_minutes: i64) -> AppResult<NaiveDateTime> {
    if ttl_minutes <= 0 {
        return Err(AppError::validation(format!(
            "token lifetime must be positive, got {ttl_minutes} minutes"
        )));
    }
    Ok(issued_at + Duration::minutes(ttl_minutes))
}

/// Checkpoint registry: geofence definition and token rotation.
pub struct CheckpointLogic;

impl CheckpointLogic {
    /// Create a checkpoint and issue its first token.
    pub fn create(
        pool: &mut DbPool,
        neighborhood_id: i64,
        input: NewCheckpoint,
        ttl_minutes: i64,
        issued_at: NaiveDateTime,
    ) -> AppResult<Checkpoint> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("checkpoint name must not be empty"));
        }
        if !input.radius_meters.is_finite() || input.radius_meters <= 0.0 {
            return Err(AppError::validation(format!(
                "radius must be positive, got {}",
                input.radius_meters
            )));
        }
        validate_coordinates(input.latitude, input.longitude)?;

        let mut cp = Checkpoint {
            id: 0,
            neighborhood_id,
            name,
            latitude: input.latitude,
            longitude: input.longitude,
            radius_meters: input.radius_meters,
            access_token: new_token(),
            token_expires_at: expiry(issued_at, ttl_minutes)?,
            created_at: format_ts(&now()),
        };

        let tx = pool.immediate()?;
        cp.id = checkpoints::insert_checkpoint(&tx, &cp)?;
        audit(
            &tx,
            "checkpoint_add",
            &format!("checkpoint #{}", cp.id),
            &format!(
                "{} ({:.6}, {:.6}) r={} m",
                cp.name, cp.latitude, cp.longitude, cp.radius_meters
            ),
        )?;
        tx.commit()?;

        Ok(cp)
    }

    /// Issue a fresh token. The previous one stops working immediately.
    pub fn rotate(
        pool: &mut DbPool,
        neighborhood_id: i64,
        id: i64,
        ttl_minutes: i64,
        issued_at: NaiveDateTime,
    ) -> AppResult<Checkpoint> {
        let expires_at = expiry(issued_at, ttl_minutes)?;

        let tx = pool.immediate()?;
        let mut cp = checkpoints::get_checkpoint(&tx, neighborhood_id, id)?;

        cp.access_token = new_token();
        cp.token_expires_at = expires_at;

        checkpoints::update_token(&tx, id, &cp.access_token, &cp.token_expires_at)?;
        audit(
            &tx,
            "checkpoint_rotate",
            &format!("checkpoint #{}", id),
            &format!("token valid until {}", format_ts(&expires_at)),
        )?;
        tx.commit()?;

        Ok(cp)
    }

    pub fn get(pool: &mut DbPool, neighborhood_id: i64, id: i64) -> AppResult<Checkpoint> {
        checkpoints::get_checkpoint(&pool.conn, neighborhood_id, id)
    }

    pub fn list(pool: &mut DbPool, neighborhood_id: i64) -> AppResult<Vec<Checkpoint>> {
        checkpoints::list_checkpoints(&pool.conn, neighborhood_id)
    }
}
