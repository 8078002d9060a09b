//! Error types for DOCKET operations

use crate::{DuplicateReport, EntityType, FeedbackStatus, FormId, FormStatus};
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed {
        entity_type: EntityType,
        reason: String,
    },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: Uuid,
        reason: String,
    },

    #[error("Concurrent modification lost for {entity_type:?} with id {id}")]
    Conflict { entity_type: EntityType, id: Uuid },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors, raised before anything is persisted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Constraint violation on {constraint}: {reason}")]
    ConstraintViolation { constraint: String, reason: String },
}

/// Form lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Operation {operation} illegal for form {form_id} in status {status}")]
    InvalidState {
        form_id: FormId,
        status: FormStatus,
        operation: String,
    },

    /// High-confidence collision. Non-fatal: the caller may inspect the
    /// report and resubmit with the duplicate override set.
    #[error("Submission collides with {} existing form(s)", report.matches.len())]
    DuplicateDetected { report: DuplicateReport },

    #[error("Content of approved form {form_id} is locked")]
    ContentLocked { form_id: FormId },
}

/// Feedback triage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TriageError {
    #[error("Severity {severity} outside the 1-5 scale")]
    InvalidSeverity { severity: u8 },

    #[error("Feedback {feedback_id} is terminal ({status}) and cannot be modified")]
    TerminalFeedback {
        feedback_id: Uuid,
        status: FeedbackStatus,
    },

    #[error("Feedback transition {from} -> {to} is not allowed")]
    IllegalTransition {
        from: FeedbackStatus,
        to: FeedbackStatus,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all DOCKET errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DocketError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Triage error: {0}")]
    Triage(#[from] TriageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for DOCKET operations.
pub type DocketResult<T> = Result<T, DocketError>;

// =============================================================================
// TESTS
// =============================================================================
