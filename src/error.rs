//! Error types.
//!
//! An unplaceable course is not an error: it ends up in
//! [`Schedule::unassigned`](crate::models::Schedule) with diagnostics.
//! Errors are reserved for input that must not be scheduled at all and
//! for internal defects that would otherwise yield an inconsistent schedule.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors that abort a scheduling run.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Static input failed validation; nothing was scheduled.
    #[error("Invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    /// Occupancy state and assignment set diverged.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl ScheduleError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        ScheduleError::InvariantViolation(message.into())
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
