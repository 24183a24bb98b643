use thiserror::Error;

/// Errors surfaced by the typing core.
///
/// Validation and `AlreadyRunning` are reported synchronously, before any background work
/// starts. Sink failures happen on the engine thread and end the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypingError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("a typing run is already active")]
    AlreadyRunning,

    #[error("keystroke sink failed: {reason}")]
    Sink { reason: String },

    #[error("typing thread failed: {reason}")]
    Worker { reason: String },
}

impl TypingError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        TypingError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn sink(err: anyhow::Error) -> Self {
        TypingError::Sink {
            reason: format!("{err:#}"),
        }
    }
}
