//! Violation assessment for one participant against the neighborhood policies.
//!
//! ABSENT / PENDING → ABSENCE dominates everything else.
//! EXCUSED → never fined.
//! PRESENT → lateness and early departure are checked independently and the
//! larger amount wins; on a tie lateness wins.

use crate::core::calculator::window::Window;
use crate::models::fine_policy::{FinePolicy, PolicySet};
use crate::models::participant::{Participant, ParticipantStatus};
use crate::models::violation_kind::ViolationKind;
use crate::utils::time::minutes_between;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub amount: i64,
}

impl Violation {
    fn from_policy(policy: &FinePolicy) -> Self {
        Self {
            kind: policy.violation_kind,
            amount: policy.amount,
        }
    }
}

/// Arrived more than `tolerance` whole minutes after the expected start.
pub fn lateness(
    check_in_at: NaiveDateTime,
    expected_start: NaiveDateTime,
    policy: Option<&FinePolicy>,
) -> Option<Violation> {
    let policy = policy?;
    if check_in_at <= expected_start {
        return None;
    }
    (minutes_between(expected_start, check_in_at) > policy.tolerance())
        .then(|| Violation::from_policy(policy))
}

/// Left more than `tolerance` whole minutes before the expected end.
pub fn early_departure(
    check_out_at: Option<NaiveDateTime>,
    expected_end: NaiveDateTime,
    policy: Option<&FinePolicy>,
) -> Option<Violation> {
    let policy = policy?;
    let out = check_out_at?;
    if out >= expected_end {
        return None;
    }
    (minutes_between(out, expected_end) > policy.tolerance())
        .then(|| Violation::from_policy(policy))
}

/// Strictly larger amount wins, lateness on a tie.
pub fn resolve(late: Option<Violation>, early: Option<Violation>) -> Option<Violation> {
    match (late, early) {
        (Some(l), Some(e)) => {
            if e.amount > l.amount {
                Some(e)
            } else {
                Some(l)
            }
        }
        (l, e) => l.or(e),
    }
}

/// The violation to fine for, if any. Zero amounts never produce a fine.
pub fn assess(participant: &Participant, window: &Window, policies: &PolicySet) -> Option<Violation> {
    let candidate = match participant.status {
        ParticipantStatus::Excused => None,
        ParticipantStatus::Absent | ParticipantStatus::Pending => policies
            .get(ViolationKind::Absence)
            .map(Violation::from_policy),
        ParticipantStatus::Present => {
            let late = participant.check_in_at.and_then(|at| {
                lateness(at, window.start, policies.get(ViolationKind::LateArrival))
            });
            let early = early_departure(
                participant.check_out_at,
                window.end,
                policies.get(ViolationKind::EarlyDeparture),
            );
            resolve(late, early)
        }
    };

    candidate.filter(|v| v.amount > 0)
}
