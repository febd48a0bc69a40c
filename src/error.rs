use thiserror::Error;

/// Failure taxonomy for the pipeline.
///
/// Repository and configuration errors are fatal and reported immediately.
/// Provider errors are fatal per invocation (no automatic retry) and always
/// name the backend and operation. Parse failures on the commit/PR path are
/// handled by defaulting and never reach this type; the review path turns
/// them into a `ValidationResult` with status `ERROR` instead.
#[derive(Debug, Error)]
pub enum SageError {
    /// Not a git repository, an unreadable file, or a missing branch.
    #[error("repository error: {0}")]
    Repository(String),

    /// Unknown provider id, missing credential, or missing template file.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure, non-2xx response, or malformed wire payload.
    #[error("{backend} error during {operation}: {detail}")]
    Provider {
        backend: &'static str,
        operation: &'static str,
        detail: String,
    },

    /// Response could not be decoded into the expected structured shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// An external collaborator (editor, `gh`) could not be invoked.
    #[error("external tool error: {0}")]
    Tool(String),
}

impl SageError {
    pub fn provider(
        backend: &'static str,
        operation: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        SageError::Provider {
            backend,
            operation,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SageError>;
