use super::check_in_method::CheckInMethod;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    Pending,
    Present,
    Absent,
    Excused,
}

impl ParticipantStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Pending => "PENDING",
            ParticipantStatus::Present => "PRESENT",
            ParticipantStatus::Absent => "ABSENT",
            ParticipantStatus::Excused => "EXCUSED",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ParticipantStatus::Pending),
            "PRESENT" => Some(ParticipantStatus::Present),
            "ABSENT" => Some(ParticipantStatus::Absent),
            "EXCUSED" => Some(ParticipantStatus::Excused),
            _ => None,
        }
    }
}

/// One resident assigned to one calendar occurrence of a shift.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub id: i64,
    pub shift_id: i64,
    pub resident_id: i64,
    pub occurrence_date: NaiveDate,
    pub status: ParticipantStatus,
    pub check_in_at: Option<NaiveDateTime>,
    pub check_out_at: Option<NaiveDateTime>,
    pub check_in_lat: Option<f64>,
    pub check_in_long: Option<f64>,
    pub measured_distance_meters: Option<f64>,
    pub check_in_method: Option<CheckInMethod>,
    pub checkpoint_id: Option<i64>,
    pub is_fined: bool,          // mirror of fines row, written by the engine only
    pub fine_amount: Option<i64>, // mirror of fines.amount
    pub notes: String,
    pub version: i64, // optimistic lock, bumped on every verifier write
}
