//! Fine policy engine.
//!
//! `evaluate_shift` can be re-run any number of times on the same shift: each
//! participant is handled in its own IMMEDIATE transaction that checks for an
//! existing (shift, resident) fine before inserting, and the unique index on
//! `fines` catches whatever slips past the check. One participant failing
//! never stops the rest of the batch.

use crate::core::calculator::violation::{Violation, assess};
use crate::core::calculator::window::{last_window_end, window_for};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{fines, participants, policies, shifts};
use crate::errors::AppResult;
use crate::models::fine::{Fine, FineStatus};
use crate::models::fine_policy::PolicySet;
use crate::models::participant::{Participant, ParticipantStatus};
use crate::models::shift::{Shift, ShiftStatus};
use crate::utils::formatting::format_amount;
use chrono::NaiveDateTime;
use std::fmt;

/// A fine created by this invocation.
#[derive(Debug, Clone)]
pub struct FineOutcome {
    pub participant_id: i64,
    pub fine: Fine,
}

/// Why a participant produced no fine. None of these are errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// A fine for (shift, resident) was already there when we looked.
    AlreadyFined,
    /// Lost the insert race against a concurrent evaluation.
    DuplicateFineSkipped,
    Excused,
    NoViolation,
    /// The neighborhood has no active policy at all.
    NoActivePolicyForNeighborhood,
    /// Unexpected failure for this participant only.
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyFined => write!(f, "already fined"),
            SkipReason::DuplicateFineSkipped => write!(f, "fined by a concurrent evaluation"),
            SkipReason::Excused => write!(f, "excused"),
            SkipReason::NoViolation => write!(f, "no violation"),
            SkipReason::NoActivePolicyForNeighborhood => {
                write!(f, "no active fine policy for the neighborhood")
            }
            SkipReason::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedParticipant {
    pub participant_id: i64,
    pub resident_id: i64,
    pub reason: SkipReason,
}

/// Full result of one evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub shift_id: i64,
    pub fines: Vec<FineOutcome>,
    pub skipped: Vec<SkippedParticipant>,
    /// PENDING participants turned ABSENT by this run.
    pub marked_absent: usize,
}

impl EvaluationReport {
    fn empty(shift_id: i64) -> Self {
        Self {
            shift_id,
            fines: Vec::new(),
            skipped: Vec::new(),
            marked_absent: 0,
        }
    }

    pub fn total_amount(&self) -> i64 {
        self.fines.iter().map(|o| o.fine.amount).sum()
    }
}

/// A due shift whose evaluation aborted.
#[derive(Debug, Clone)]
pub struct ShiftFailure {
    pub shift_id: i64,
    pub error: String,
}

/// Result of `evaluate_due`.
#[derive(Debug, Clone, Default)]
pub struct DueRun {
    pub reports: Vec<EvaluationReport>,
    pub failed: Vec<ShiftFailure>,
}

impl DueRun {
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty() && self.failed.is_empty()
    }
}

pub struct FineEngine;

impl FineEngine {
    /// Fines created by this invocation (empty on a re-run).
    pub fn evaluate_shift(
        pool: &mut DbPool,
        neighborhood_id: i64,
        shift_id: i64,
        now: NaiveDateTime,
    ) -> AppResult<Vec<FineOutcome>> {
        Ok(Self::evaluate_shift_report(pool, neighborhood_id, shift_id, now)?.fines)
    }

    /// Same as `evaluate_shift`, also reporting skipped participants.
    ///
    /// A missing shift aborts with `ShiftNotFound`; everything else is
    /// handled per participant.
    pub fn evaluate_shift_report(
        pool: &mut DbPool,
        neighborhood_id: i64,
        shift_id: i64,
        now: NaiveDateTime,
    ) -> AppResult<EvaluationReport> {
        let shift = shifts::get_shift(&pool.conn, neighborhood_id, shift_id)?;
        let mut report = EvaluationReport::empty(shift_id);

        if shift.status == ShiftStatus::Canceled {
            return Ok(report);
        }

        let roster = participants::list_by_shift(&pool.conn, shift_id)?;
        let policy_set =
            PolicySet::from_policies(policies::list_active_policies(&pool.conn, neighborhood_id)?);

        for p in &roster {
            let outcome = if policy_set.is_empty() {
                Self::settle_without_policies(pool, &shift, p, now)
            } else {
                Self::evaluate_participant(pool, &shift, p, &policy_set, now)
            };

            match outcome {
                Ok(Evaluated {
                    fine,
                    marked_absent,
                }) => {
                    if marked_absent {
                        report.marked_absent += 1;
                    }
                    match fine {
                        Ok(o) => report.fines.push(o),
                        Err(reason) => report.skipped.push(SkippedParticipant {
                            participant_id: p.id,
                            resident_id: p.resident_id,
                            reason,
                        }),
                    }
                }
                Err(e) => report.skipped.push(SkippedParticipant {
                    participant_id: p.id,
                    resident_id: p.resident_id,
                    reason: SkipReason::Failed(e.to_string()),
                }),
            }
        }

        if shift.status == ShiftStatus::Active {
            shifts::update_status(&pool.conn, shift_id, ShiftStatus::Closed)?;
        }

        audit(
            &pool.conn,
            "evaluate",
            &format!("shift #{}", shift_id),
            &format!(
                "{} fine(s) created, total {}, {} skipped",
                report.fines.len(),
                format_amount(report.total_amount()),
                report.skipped.len()
            ),
        )?;

        Ok(report)
    }

    /// Scheduled-job entry point: evaluate every ACTIVE shift whose last
    /// window has ended by `now`. A shift that fails is recorded in
    /// `DueRun::failed` and the remaining shifts are still evaluated.
    pub fn evaluate_due(
        pool: &mut DbPool,
        neighborhood_id: i64,
        now: NaiveDateTime,
    ) -> AppResult<DueRun> {
        let active = shifts::list_shifts(&pool.conn, neighborhood_id, Some(ShiftStatus::Active))?;
        let due: Vec<i64> = active
            .into_iter()
            .filter(|s| last_window_end(s) <= now)
            .map(|s| s.id)
            .collect();

        let mut run = DueRun::default();
        for id in due {
            match Self::evaluate_shift_report(pool, neighborhood_id, id, now) {
                Ok(report) => run.reports.push(report),
                Err(e) => run.failed.push(ShiftFailure {
                    shift_id: id,
                    error: e.to_string(),
                }),
            }
        }
        Ok(run)
    }

    fn evaluate_participant(
        pool: &mut DbPool,
        shift: &Shift,
        snapshot: &Participant,
        policy_set: &PolicySet,
        now: NaiveDateTime,
    ) -> AppResult<Evaluated> {
        let window = window_for(shift, snapshot.occurrence_date);
        let tx = pool.immediate()?;

        // re-read inside the transaction, the verifier may have written since
        let mut p = participants::get_participant(&tx, shift.neighborhood_id, snapshot.id)?;
        let marked_absent = close_if_absent(&tx, &mut p, window.end, now)?;

        if fines::exists_for(&tx, shift.id, p.resident_id)? {
            tx.commit()?;
            return Ok(Evaluated::skipped(SkipReason::AlreadyFined, marked_absent));
        }

        if p.status == ParticipantStatus::Excused {
            tx.commit()?;
            return Ok(Evaluated::skipped(SkipReason::Excused, marked_absent));
        }

        let Some(Violation { kind, amount }) = assess(&p, &window, policy_set) else {
            tx.commit()?;
            return Ok(Evaluated::skipped(SkipReason::NoViolation, marked_absent));
        };

        let mut fine = Fine {
            id: 0,
            neighborhood_id: shift.neighborhood_id,
            resident_id: p.resident_id,
            shift_id: shift.id,
            participant_id: p.id,
            violation_kind: kind,
            amount,
            status: FineStatus::Unpaid,
            generated_at: now,
            paid_at: None,
        };

        let Some(id) = fines::insert_fine(&tx, &fine)? else {
            audit(
                &tx,
                "fine_skipped",
                &format!("participant #{}", p.id),
                "duplicate fine skipped",
            )?;
            tx.commit()?;
            return Ok(Evaluated::skipped(
                SkipReason::DuplicateFineSkipped,
                marked_absent,
            ));
        };
        fine.id = id;

        participants::set_fine_mirror(&tx, p.id, amount)?;
        audit(
            &tx,
            "fine_created",
            &format!("fine #{}", id),
            &format!(
                "resident {} fined {} for {} on shift #{}",
                p.resident_id,
                format_amount(amount),
                kind.label(),
                shift.id
            ),
        )?;
        tx.commit()?;

        Ok(Evaluated {
            fine: Ok(FineOutcome {
                participant_id: p.id,
                fine,
            }),
            marked_absent,
        })
    }

    /// No policies: nobody can be fined, but absences are still recorded.
    fn settle_without_policies(
        pool: &mut DbPool,
        shift: &Shift,
        snapshot: &Participant,
        now: NaiveDateTime,
    ) -> AppResult<Evaluated> {
        let window = window_for(shift, snapshot.occurrence_date);
        let tx = pool.immediate()?;
        let mut p = participants::get_participant(&tx, shift.neighborhood_id, snapshot.id)?;
        let marked_absent = close_if_absent(&tx, &mut p, window.end, now)?;
        let reason = if fines::exists_for(&tx, shift.id, p.resident_id)? {
            SkipReason::AlreadyFined
        } else {
            SkipReason::NoActivePolicyForNeighborhood
        };
        tx.commit()?;

        Ok(Evaluated::skipped(reason, marked_absent))
    }
}

struct Evaluated {
    fine: Result<FineOutcome, SkipReason>,
    marked_absent: bool,
}

impl Evaluated {
    fn skipped(reason: SkipReason, marked_absent: bool) -> Self {
        Self {
            fine: Err(reason),
            marked_absent,
        }
    }
}

/// PENDING → ABSENT once the occurrence window is over.
fn close_if_absent(
    conn: &rusqlite::Connection,
    p: &mut Participant,
    window_end: NaiveDateTime,
    now: NaiveDateTime,
) -> AppResult<bool> {
    if p.status != ParticipantStatus::Pending || now < window_end {
        return Ok(false);
    }

    let changed = participants::mark_absent(conn, p.id)?;
    if changed {
        p.status = ParticipantStatus::Absent;
        p.version += 1;
    }
    Ok(changed)
}
