//! Boundary towards the external ledger / wallet component.
//!
//! Fines are read-only records for the outside world: consumers poll with
//! `FineLedger::list` (optionally `since` a timestamp), and payments come back
//! through `FineLedger::mark_paid`, which hands the paid fine to a
//! `LedgerBridge`. Posting into a general ledger is not done here.

use crate::db::fines::{self, FineFilter};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::fine::{Fine, FineStatus};
use crate::utils::formatting::format_amount;
use chrono::NaiveDateTime;
use rusqlite::Connection;

/// Receives fines once they are marked paid.
pub trait LedgerBridge {
    fn post_paid_fine(&mut self, conn: &Connection, fine: &Fine) -> AppResult<()>;
}

/// Stand-in bridge: records the hand-off in the internal log only.
#[derive(Debug, Default)]
pub struct AuditLedgerBridge;

impl LedgerBridge for AuditLedgerBridge {
    fn post_paid_fine(&mut self, conn: &Connection, fine: &Fine) -> AppResult<()> {
        audit(
            conn,
            "ledger_handoff",
            &format!("fine #{}", fine.id),
            &format!(
                "resident {} paid {} ({})",
                fine.resident_id,
                format_amount(fine.amount),
                fine.violation_kind.to_db_str()
            ),
        )
    }
}

pub struct FineLedger;

impl FineLedger {
    pub fn list(pool: &mut DbPool, neighborhood_id: i64, filter: &FineFilter) -> AppResult<Vec<Fine>> {
        fines::list_fines(&pool.conn, neighborhood_id, filter)
    }

    pub fn get(pool: &mut DbPool, neighborhood_id: i64, id: i64) -> AppResult<Fine> {
        fines::find_fine(&pool.conn, neighborhood_id, id)?.ok_or(AppError::FineNotFound(id))
    }

    /// UNPAID → PAID, then hand the fine to the bridge. Both happen in one
    /// transaction: if the bridge fails the fine stays UNPAID.
    pub fn mark_paid<B: LedgerBridge>(
        pool: &mut DbPool,
        neighborhood_id: i64,
        id: i64,
        paid_at: NaiveDateTime,
        bridge: &mut B,
    ) -> AppResult<Fine> {
        let tx = pool.immediate()?;
        let mut fine = fines::find_fine(&tx, neighborhood_id, id)?.ok_or(AppError::FineNotFound(id))?;

        if fine.status == FineStatus::Paid || !fines::mark_paid(&tx, id, &paid_at)? {
            return Err(AppError::validation(format!("fine #{} is already paid", id)));
        }

        fine.status = FineStatus::Paid;
        fine.paid_at = Some(paid_at);

        audit(
            &tx,
            "fine_paid",
            &format!("fine #{}", id),
            &format!("{} marked paid", format_amount(fine.amount)),
        )?;
        bridge.post_paid_fine(&tx, &fine)?;
        tx.commit()?;

        Ok(fine)
    }
}
