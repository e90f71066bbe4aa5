use thiserror::Error;

use crate::domain::document::DocType;

/// Failures surfaced by the pricing and lifecycle engine.
///
/// `ValidationFailed` and `DocumentLocked` are recoverable: the caller can
/// re-submit against unchanged state. `InvalidTransition` and `NotFound`
/// abort the operation with no side effects.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{item_type} line items require `{field}`")]
    ValidationFailed { item_type: String, field: &'static str },
    #[error("document `{0}` is locked")]
    DocumentLocked(String),
    #[error("invalid {entity} status `{value}`")]
    InvalidTransition { entity: &'static str, value: String },
    #[error("operation requires {expected} document, got {actual}")]
    WrongDocType { expected: DocType, actual: DocType },
    #[error("{entity} `{id}` was not found")]
    NotFound { entity: &'static str, id: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    /// Whether the caller can retry with corrected input against the same,
    /// unmodified state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. } | Self::DocumentLocked(_))
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::document::DocType;

    use super::DomainError;

    #[test]
    fn validation_and_lock_errors_are_recoverable() {
        let validation =
            DomainError::ValidationFailed { item_type: "labor".to_string(), field: "hours" };
        let locked = DomainError::DocumentLocked("doc-1".to_string());
        let transition =
            DomainError::InvalidTransition { entity: "job", value: "paused".to_string() };
        let wrong_type =
            DomainError::WrongDocType { expected: DocType::Estimate, actual: DocType::Invoice };

        assert!(validation.is_recoverable());
        assert!(locked.is_recoverable());
        assert!(!transition.is_recoverable());
        assert!(!wrong_type.is_recoverable());
        assert!(!DomainError::not_found("document", "doc-9").is_recoverable());
    }

    #[test]
    fn messages_name_the_offending_field() {
        let error = DomainError::ValidationFailed { item_type: "part".to_string(), field: "cost" };
        assert_eq!(error.to_string(), "part line items require `cost`");
    }
}
