//! Error taxonomy of the session engine.
//!
//! Every failure is one of four kinds; the kind decides how far it travels:
//! validation and policy errors go back to the caller as a `*Result` event,
//! stale-state errors are logged and dropped, infrastructure errors become a
//! generic failure for the caller and never stop a tick loop.

use crate::server::events::ResultStatus;
use crate::store::StoreError;

/// How loudly a business-rule violation is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Malformed or missing command fields.
    #[error("{detail}")]
    Validation { detail: String },

    /// Business-rule violation (already queued, not invited, unknown target...).
    #[error("{detail}")]
    Policy { severity: Severity, detail: String },

    /// The session or room the command refers to no longer exists.
    #[error("Stale state: {detail}")]
    StaleState { detail: String },

    /// Persistence layer failure.
    #[error("Infrastructure failure: {detail}")]
    Infrastructure { detail: String },
}

impl EngineError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation { detail: detail.into() }
    }

    pub fn warning(detail: impl Into<String>) -> Self {
        Self::Policy { severity: Severity::Warning, detail: detail.into() }
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        Self::Policy { severity: Severity::Error, detail: detail.into() }
    }

    pub fn stale(detail: impl Into<String>) -> Self {
        Self::StaleState { detail: detail.into() }
    }

    pub fn infrastructure(detail: impl Into<String>) -> Self {
        Self::Infrastructure { detail: detail.into() }
    }

    /// Status reported to the caller for this error.
    pub fn status(&self) -> ResultStatus {
        match self {
            Self::Policy { severity: Severity::Warning, .. } => ResultStatus::Warning,
            _ => ResultStatus::Error,
        }
    }

    /// Text reported to the caller. Infrastructure details stay server-side.
    pub fn public_detail(&self) -> String {
        match self {
            Self::Infrastructure { .. } => "Internal server error".to_string(),
            Self::Validation { detail } | Self::Policy { detail, .. } | Self::StaleState { detail } => {
                detail.clone()
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleState { .. })
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        Self::infrastructure(err.to_string())
    }
}

/// A component actor stopped answering.
impl From<actix::MailboxError> for EngineError {
    fn from(err: actix::MailboxError) -> Self {
        Self::infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_maps_to_status() {
        assert_eq!(EngineError::warning("w").status(), ResultStatus::Warning);
        assert_eq!(EngineError::rejected("e").status(), ResultStatus::Error);
        assert_eq!(EngineError::validation("v").status(), ResultStatus::Error);
    }

    #[test]
    fn store_failures_are_hidden_from_callers() {
        let err: EngineError = StoreError::Unavailable("db down".into()).into();
        assert!(matches!(err, EngineError::Infrastructure { .. }));
        assert_eq!(err.public_detail(), "Internal server error");
    }
}
