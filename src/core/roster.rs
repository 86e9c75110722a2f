use crate::core::calculator::window::{is_occurrence, occurrence_dates};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{fines, participants, shifts};
use crate::errors::{AppError, AppResult};
use crate::models::participant::{Participant, ParticipantStatus};
use crate::models::shift::ShiftStatus;
use crate::utils::date::format_date;
use chrono::NaiveDate;

/// Result of an assignment: rows created vs rows that were already there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignSummary {
    pub created: usize,
    pub existing: usize,
}

/// Participant roster: who patrols which occurrence.
pub struct RosterLogic;

impl RosterLogic {
    /// Assign a resident to one occurrence, or to every occurrence when
    /// `occurrence` is None. Re-assigning is a no-op.
    pub fn assign(
        pool: &mut DbPool,
        neighborhood_id: i64,
        shift_id: i64,
        resident_id: i64,
        occurrence: Option<NaiveDate>,
    ) -> AppResult<AssignSummary> {
        let tx = pool.immediate()?;
        let shift = shifts::get_shift(&tx, neighborhood_id, shift_id)?;

        if shift.status == ShiftStatus::Canceled {
            return Err(AppError::validation(format!(
                "shift #{} is canceled",
                shift_id
            )));
        }

        let dates = match occurrence {
            Some(d) if is_occurrence(&shift, d) => vec![d],
            Some(d) => {
                return Err(AppError::validation(format!(
                    "{} is not an occurrence of shift #{}",
                    format_date(&d),
                    shift_id
                )));
            }
            None => occurrence_dates(&shift),
        };

        let mut summary = AssignSummary::default();
        for d in &dates {
            if participants::insert_if_absent(&tx, shift_id, resident_id, d)? {
                summary.created += 1;
            } else {
                summary.existing += 1;
            }
        }

        if summary.created > 0 {
            audit(
                &tx,
                "roster_assign",
                &format!("shift #{}", shift_id),
                &format!(
                    "resident {} assigned to {} occurrence(s)",
                    resident_id, summary.created
                ),
            )?;
        }
        tx.commit()?;

        Ok(summary)
    }

    /// PENDING → EXCUSED. Terminal, exempt from every fine, so refused once
    /// the shift left ACTIVE or the resident already has a fine for it.
    pub fn excuse(
        pool: &mut DbPool,
        neighborhood_id: i64,
        participant_id: i64,
        notes: Option<&str>,
    ) -> AppResult<Participant> {
        let tx = pool.immediate()?;
        let mut p = participants::get_participant(&tx, neighborhood_id, participant_id)?;

        if p.status != ParticipantStatus::Pending {
            return Err(AppError::validation(format!(
                "only PENDING participants can be excused (participant #{} is {})",
                participant_id,
                p.status.to_db_str()
            )));
        }

        let shift = shifts::get_shift(&tx, neighborhood_id, p.shift_id)?;
        if shift.status != ShiftStatus::Active {
            return Err(AppError::validation(format!(
                "shift #{} is {}, its roster is frozen",
                shift.id,
                shift.status.to_db_str()
            )));
        }

        // an excused participant never carries a fine
        if p.is_fined || fines::exists_for(&tx, p.shift_id, p.resident_id)? {
            return Err(AppError::validation(format!(
                "resident {} is already fined for shift #{}",
                p.resident_id, p.shift_id
            )));
        }

        p.status = ParticipantStatus::Excused;
        if let Some(n) = notes {
            p.notes = n.trim().to_string();
        }

        participants::update_attendance(&tx, &p)?;
        audit(
            &tx,
            "excuse",
            &format!("participant #{}", participant_id),
            if p.notes.is_empty() { "excused" } else { &p.notes },
        )?;
        tx.commit()?;

        p.version += 1;
        Ok(p)
    }

    pub fn get(pool: &mut DbPool, neighborhood_id: i64, participant_id: i64) -> AppResult<Participant> {
        participants::get_participant(&pool.conn, neighborhood_id, participant_id)
    }

    pub fn list(pool: &mut DbPool, neighborhood_id: i64, shift_id: i64) -> AppResult<Vec<Participant>> {
        // scope check: the shift must belong to this neighborhood
        shifts::get_shift(&pool.conn, neighborhood_id, shift_id)?;
        participants::list_by_shift(&pool.conn, shift_id)
    }
}
