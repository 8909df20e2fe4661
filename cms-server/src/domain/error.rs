use thiserror::Error;

/// Caller-facing classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Raised by repositories on uniqueness clashes; the service reports it as a conflict.
    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation { .. } => ErrorKind::BadRequest,
            DomainError::Unauthorized => ErrorKind::Unauthorized,
            DomainError::Forbidden => ErrorKind::Forbidden,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) | DomainError::AlreadyExists(_) => ErrorKind::Conflict,
            DomainError::Unexpected(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn post_not_found(id: i64) -> Self {
        DomainError::NotFound(format!("post id: {id}"))
    }
}
