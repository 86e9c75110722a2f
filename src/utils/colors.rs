//! ANSI color helper utilities for terminal output.

use crate::models::fine::FineStatus;
use crate::models::participant::ParticipantStatus;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// PRESENT → green, ABSENT → red, EXCUSED → grey, PENDING → yellow.
pub fn color_for_participant(status: ParticipantStatus) -> &'static str {
    match status {
        ParticipantStatus::Present => GREEN,
        ParticipantStatus::Absent => RED,
        ParticipantStatus::Excused => GREY,
        ParticipantStatus::Pending => YELLOW,
    }
}

pub fn color_for_fine(status: FineStatus) -> &'static str {
    match status {
        FineStatus::Unpaid => RED,
        FineStatus::Paid => GREEN,
    }
}

/// Ritorna formattazione colorata di un valore opzionale ("--" in grigio).
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}--{RESET}")
    } else {
        value.to_string()
    }
}
