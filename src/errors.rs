//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError so that the verifier's
//! user-actionable failures and the infrastructure failures travel the same way.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Input validation
    // ---------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    // ---------------------------
    // Attendance verification
    // ---------------------------
    #[error("Out of geofence: {distance_meters:.1} m from checkpoint (radius {radius_meters:.1} m)")]
    OutOfGeofence {
        distance_meters: f64,
        radius_meters: f64,
    },

    #[error("Invalid or expired checkpoint token")]
    InvalidOrExpiredToken,

    #[error("Participant changed concurrently, retry: {0}")]
    ConcurrentUpdate(i64),

    // ---------------------------
    // Lookups
    // ---------------------------
    #[error("Participant not found: {0}")]
    ParticipantNotFound(i64),

    #[error("Shift not found: {0}")]
    ShiftNotFound(i64),

    #[error("Checkpoint not found: {0}")]
    CheckpointNotFound(i64),

    #[error("Fine not found: {0}")]
    FineNotFound(i64),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AppError::Validation(msg.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
