use clap::ValueEnum;
use serde::Serialize;

/// How a resident proved presence at the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInMethod {
    /// Scanned the checkpoint's rotating token.
    Token,
    /// Recorded by an administrator, no token involved.
    Manual,
}

impl CheckInMethod {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CheckInMethod::Token => "TOKEN",
            CheckInMethod::Manual => "MANUAL",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "TOKEN" => Some(CheckInMethod::Token),
            "MANUAL" => Some(CheckInMethod::Manual),
            _ => None,
        }
    }

    /// Helper: convert a config/CLI code (any case)
    pub fn from_code(code: &str) -> Option<Self> {
        Self::from_db_str(&code.to_uppercase())
    }
}
