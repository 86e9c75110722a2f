use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    Active,
    Closed,
    Canceled,
}

impl ShiftStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShiftStatus::Active => "ACTIVE",
            ShiftStatus::Closed => "CLOSED",
            ShiftStatus::Canceled => "CANCELED",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ShiftStatus::Active),
            "CLOSED" => Some(ShiftStatus::Closed),
            "CANCELED" => Some(ShiftStatus::Canceled),
            _ => None,
        }
    }
}

/// A patrol time window, repeated daily from `start_date` to `end_date`.
#[derive(Debug, Clone, Serialize)]
pub struct Shift {
    pub id: i64,
    pub neighborhood_id: i64,
    pub label: String,
    pub start_date: NaiveDate, // ⇔ shifts.start_date (TEXT "YYYY-MM-DD")
    pub end_date: NaiveDate,   // ⇔ shifts.end_date, may be start_date + 1 for overnight
    pub start_time: NaiveTime, // ⇔ shifts.start_time (TEXT "HH:MM")
    pub end_time: NaiveTime,   // ⇔ shifts.end_time (TEXT "HH:MM")
    pub status: ShiftStatus,
    pub checkpoint_id: Option<i64>, // default checkpoint used by the verifier
    pub created_at: String,
}

impl Shift {
    /// A shift whose end clock time is not after its start crosses midnight.
    pub fn is_overnight(&self) -> bool {
        self.end_time <= self.start_time
    }

    pub fn end_instant(&self) -> NaiveDateTime {
        self.end_date.and_time(self.end_time)
    }

    pub fn window_str(&self) -> String {
        format!(
            "{} {} → {} {}",
            self.start_date.format("%Y-%m-%d"),
            self.start_time.format("%H:%M"),
            self.end_date.format("%Y-%m-%d"),
            self.end_time.format("%H:%M")
        )
    }
}
