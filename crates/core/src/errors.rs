use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Calendar backend unavailable: {0}")]
    UpstreamUnavailable(#[from] eyre::Report),

    #[error("Event creation failed: {0}")]
    EventCreationFailed(String),

    #[error("Slot no longer available: {0}")]
    SlotTaken(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SchedulerError {
    /// Shorthand for a caller-side validation failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        SchedulerError::InvalidRequest(message.into())
    }

    /// Shorthand for an upstream failure described by a plain message.
    pub fn upstream(message: impl std::fmt::Display) -> Self {
        SchedulerError::UpstreamUnavailable(eyre::eyre!("{}", message))
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
