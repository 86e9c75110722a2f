use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    Absence,
    LateArrival,
    EarlyDeparture,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 3] = [
        ViolationKind::Absence,
        ViolationKind::LateArrival,
        ViolationKind::EarlyDeparture,
    ];

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ViolationKind::Absence => "ABSENCE",
            ViolationKind::LateArrival => "LATE_ARRIVAL",
            ViolationKind::EarlyDeparture => "EARLY_DEPARTURE",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "ABSENCE" => Some(ViolationKind::Absence),
            "LATE_ARRIVAL" => Some(ViolationKind::LateArrival),
            "EARLY_DEPARTURE" => Some(ViolationKind::EarlyDeparture),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViolationKind::Absence => "absence",
            ViolationKind::LateArrival => "late arrival",
            ViolationKind::EarlyDeparture => "early departure",
        }
    }
}
