use revassign_directory::StoreError;

/// Machine-readable kind of a domain failure.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TeamExists,
    PrExists,
    PrMerged,
    NotAssigned,
    NoCandidate,
    NotFound,
    InvalidInput,
}

/// A rule violation reported to the caller as-is, never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
}

impl DomainError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }
}

/// Errors surfaced by the services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Infrastructure failure; the caller may retry.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// The domain code, if this is a domain failure.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Domain(e) => Some(e.code),
            Self::Store(_) => None,
        }
    }

    /// Interpret a store not-found result as a domain `NOT_FOUND`; anything
    /// else stays an infrastructure error.
    pub(crate) fn from_lookup(err: StoreError, message: &str) -> Self {
        if err.is_not_found() {
            Self::Domain(DomainError::not_found(message))
        } else {
            Self::Store(err)
        }
    }
}

/// Reject blank identifiers before they reach the store.
pub(crate) fn require_id(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}
