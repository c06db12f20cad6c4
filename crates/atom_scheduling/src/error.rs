// --- File: crates/atom_scheduling/src/error.rs ---
use atom_common::{AtomError, HttpStatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("{0}")]
    Validation(String),

    #[error("Meeting scheduling is not configured: {0}")]
    NotConfigured(String),

    /// A missing-fields turn without the earlier user input or assistant reply.
    #[error("No prior user input or assistant output in the message history")]
    MissingContext,

    #[error("No primary calendar found for user {0}")]
    NoPrimaryCalendar(String),

    #[error("Could not understand the request: {0}")]
    Extraction(String),

    #[error("Calendar error: {0}")]
    Calendar(AtomError),

    #[error(transparent)]
    Store(#[from] AtomError),
}

impl SchedulingError {
    pub fn code(&self) -> &str {
        match self {
            SchedulingError::Validation(_) => "VALIDATION_ERROR",
            SchedulingError::NotConfigured(_) => "CONFIG_ERROR",
            SchedulingError::MissingContext => "SCHEDULING_CONTEXT_MISSING",
            SchedulingError::NoPrimaryCalendar(_) => "PRIMARY_CALENDAR_NOT_FOUND",
            SchedulingError::Extraction(_) => "MEETING_EXTRACTION_FAILED",
            SchedulingError::Calendar(e) | SchedulingError::Store(e) => e.code(),
        }
    }
}

impl HttpStatusCode for SchedulingError {
    fn status_code(&self) -> u16 {
        match self {
            SchedulingError::Validation(_) | SchedulingError::MissingContext => 400,
            SchedulingError::NotConfigured(_) => 500,
            SchedulingError::NoPrimaryCalendar(_) => 404,
            SchedulingError::Extraction(_) => 502,
            SchedulingError::Calendar(e) | SchedulingError::Store(e) => e.status_code(),
        }
    }
}

impl From<SchedulingError> for AtomError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Calendar(e) | SchedulingError::Store(e) => e,
            other => AtomError::coded(other.code(), other.to_string(), other.status_code()),
        }
    }
}
