//! DOCKET Core - Entity Types
//!
//! Pure data structures with no business logic. All other crates depend on
//! this one: identity aliases, content hashing, lifecycle enums, entity
//! structs, the error taxonomy, engine configuration, and the collaborator
//! interfaces (notification sink, content store) consumed from the host.

mod config;
mod content;
mod entities;
mod enums;
mod error;
mod identity;
mod notify;

pub use config::{DocketConfig, TierThresholds};
pub use content::{ContentStore, MemoryContentStore};
pub use entities::{
    ContributorStats, DuplicateMatch, DuplicateReport, FeedbackReport, Form, FormDraft, FormField,
    FormFieldSpec, FormFeedback, Jurisdiction, JurisdictionDescriptor, ReviewChecklist, Reviewer,
    RevisionRequest, RewardLedgerEntry,
};
pub use enums::{
    ContributorTier, CourtType, EntityType, FeedbackPriority, FeedbackStatus,
    FeedbackStatusParseError, FeedbackType, FeedbackTypeParseError, FormFieldType, FormStatus,
    FormStatusParseError, MatchType, PriorityParseError, ReviewDecision, RewardType,
    TierParseError, UsageKind, VoteDirection,
};
pub use error::{
    ConfigError, DocketError, DocketResult, LifecycleError, StorageError, TriageError,
    ValidationError,
};
pub use identity::{
    compute_content_hash, format_content_hash, new_entity_id, ContentHash, ContributorId,
    EntityId, FeedbackId, FieldId, FormId, JurisdictionId, LedgerEntryId, ReviewerId,
    StorageHandle, Timestamp, UserId,
};
pub use notify::{NotificationEvent, NotificationSink, NotifyError, NullSink, RecordingSink};
