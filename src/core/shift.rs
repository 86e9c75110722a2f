use crate::core::calculator::window::validate_bounds;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{checkpoints, shifts};
use crate::errors::{AppError, AppResult};
use crate::models::shift::{Shift, ShiftStatus};
use crate::utils::time::{format_ts, now};
use chrono::{NaiveDate, NaiveTime};

/// Input for a new shift.
#[derive(Debug, Clone)]
pub struct NewShift {
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub checkpoint_id: Option<i64>,
}

/// Schedule registry.
pub struct ShiftLogic;

impl ShiftLogic {
    pub fn create(pool: &mut DbPool, neighborhood_id: i64, input: NewShift) -> AppResult<Shift> {
        let label = input.label.trim().to_string();
        if label.is_empty() {
            return Err(AppError::validation("shift label must not be empty"));
        }

        validate_bounds(
            input.start_date,
            input.end_date,
            input.start_time,
            input.end_time,
        )?;

        let tx = pool.immediate()?;

        if let Some(cp_id) = input.checkpoint_id {
            // must exist in the same neighborhood
            checkpoints::get_checkpoint(&tx, neighborhood_id, cp_id)?;
        }

        let mut shift = Shift {
            id: 0,
            neighborhood_id,
            label,
            start_date: input.start_date,
            end_date: input.end_date,
            start_time: input.start_time,
            end_time: input.end_time,
            status: ShiftStatus::Active,
            checkpoint_id: input.checkpoint_id,
            created_at: format_ts(&now()),
        };

        shift.id = shifts::insert_shift(&tx, &shift)?;
        audit(
            &tx,
            "shift_add",
            &format!("shift #{}", shift.id),
            &format!("{} ({})", shift.label, shift.window_str()),
        )?;
        tx.commit()?;

        Ok(shift)
    }

    pub fn get(pool: &mut DbPool, neighborhood_id: i64, id: i64) -> AppResult<Shift> {
        shifts::get_shift(&pool.conn, neighborhood_id, id)
    }

    pub fn list(
        pool: &mut DbPool,
        neighborhood_id: i64,
        status: Option<ShiftStatus>,
    ) -> AppResult<Vec<Shift>> {
        shifts::list_shifts(&pool.conn, neighborhood_id, status)
    }

    /// ACTIVE → CANCELED. A canceled shift accepts no check-ins and is never fined.
    pub fn cancel(pool: &mut DbPool, neighborhood_id: i64, id: i64) -> AppResult<Shift> {
        let tx = pool.immediate()?;
        let mut shift = shifts::get_shift(&tx, neighborhood_id, id)?;

        if shift.status != ShiftStatus::Active {
            return Err(AppError::validation(format!(
                "only ACTIVE shifts can be canceled (shift #{} is {})",
                id,
                shift.status.to_db_str()
            )));
        }

        shifts::update_status(&tx, id, ShiftStatus::Canceled)?;
        audit(&tx, "shift_cancel", &format!("shift #{}", id), &shift.label)?;
        tx.commit()?;

        shift.status = ShiftStatus::Canceled;
        Ok(shift)
    }
}
