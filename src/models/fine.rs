use super::violation_kind::ViolationKind;
use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FineStatus {
    Unpaid,
    Paid,
}

impl FineStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            FineStatus::Unpaid => "UNPAID",
            FineStatus::Paid => "PAID",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "UNPAID" => Some(FineStatus::Unpaid),
            "PAID" => Some(FineStatus::Paid),
            _ => None,
        }
    }
}

/// At most one per (shift_id, resident_id).
#[derive(Debug, Clone, Serialize)]
pub struct Fine {
    pub id: i64,
    pub neighborhood_id: i64,
    pub resident_id: i64,
    pub shift_id: i64,
    pub participant_id: i64,
    pub violation_kind: ViolationKind,
    pub amount: i64,
    pub status: FineStatus,
    pub generated_at: NaiveDateTime,
    pub paid_at: Option<NaiveDateTime>,
}
