use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::policies;
use crate::errors::{AppError, AppResult};
use crate::models::fine_policy::FinePolicy;
use crate::models::violation_kind::ViolationKind;
use crate::utils::formatting::format_amount;

/// Per-neighborhood fine configuration.
pub struct PolicyLogic;

impl PolicyLogic {
    /// Create or replace the policy for `kind`; there is never more than one.
    pub fn set(
        pool: &mut DbPool,
        neighborhood_id: i64,
        kind: ViolationKind,
        amount: i64,
        tolerance_minutes: Option<i64>,
        is_active: bool,
    ) -> AppResult<FinePolicy> {
        if amount < 0 {
            return Err(AppError::validation(format!(
                "fine amount must not be negative, got {amount}"
            )));
        }
        if let Some(t) = tolerance_minutes
            && t < 0
        {
            return Err(AppError::validation(format!(
                "tolerance must not be negative, got {t} minutes"
            )));
        }

        let tx = pool.immediate()?;
        policies::upsert_policy(&tx, neighborhood_id, kind, amount, tolerance_minutes, is_active)?;
        audit(
            &tx,
            "policy_set",
            kind.to_db_str(),
            &format!(
                "amount {}, tolerance {}, {}",
                format_amount(amount),
                tolerance_minutes.map_or_else(|| "default".to_string(), |t| format!("{t} min")),
                if is_active { "active" } else { "inactive" }
            ),
        )?;

        let stored = policies::list_policies(&tx, neighborhood_id)?
            .into_iter()
            .find(|p| p.violation_kind == kind)
            .ok_or_else(|| AppError::Other(format!("policy {} not stored", kind.to_db_str())))?;
        tx.commit()?;

        Ok(stored)
    }

    pub fn list(pool: &mut DbPool, neighborhood_id: i64) -> AppResult<Vec<FinePolicy>> {
        policies::list_policies(&pool.conn, neighborhood_id)
    }
}
