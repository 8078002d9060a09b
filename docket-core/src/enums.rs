//! Enum types for DOCKET entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// FORM LIFECYCLE
// ============================================================================

/// Status of a form in the review lifecycle.
///
/// The transition graph is a strict DAG:
///
/// ```text
/// Draft → Pending ──┬── UnderReview ──┬── Approved ── Archived
///                   │                 ├── Rejected (terminal)
///                   │                 └── NeedsRevision ──→ Pending
///                   ├── Approved / Rejected / NeedsRevision (direct decision)
/// ```
///
/// `Rejected` and `Archived` admit no outgoing transitions; a rejected form
/// can never become approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FormStatus {
    /// Contributor is still editing; not yet submitted
    Draft,
    /// Submitted and waiting for a reviewer
    #[default]
    Pending,
    /// A reviewer has picked the form up
    UnderReview,
    /// Accepted into the public registry; content is locked
    Approved,
    /// Declined; terminal
    Rejected,
    /// Sent back to the contributor with requested changes
    NeedsRevision,
    /// Superseded by a newer approved form; terminal
    Archived,
}

impl FormStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            FormStatus::Draft => "draft",
            FormStatus::Pending => "pending",
            FormStatus::UnderReview => "under_review",
            FormStatus::Approved => "approved",
            FormStatus::Rejected => "rejected",
            FormStatus::NeedsRevision => "needs_revision",
            FormStatus::Archived => "archived",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, FormStatusParseError> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(FormStatus::Draft),
            "pending" => Ok(FormStatus::Pending),
            "under_review" | "underreview" | "under-review" => Ok(FormStatus::UnderReview),
            "approved" => Ok(FormStatus::Approved),
            "rejected" => Ok(FormStatus::Rejected),
            "needs_revision" | "needsrevision" | "needs-revision" => Ok(FormStatus::NeedsRevision),
            "archived" => Ok(FormStatus::Archived),
            _ => Err(FormStatusParseError(s.to_string())),
        }
    }

    /// Check if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, FormStatus::Rejected | FormStatus::Archived)
    }

    /// Whether a form in this status may still be reviewed.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, FormStatus::Pending | FormStatus::UnderReview)
    }

    /// Whether the lifecycle DAG admits a direct edge to `next`.
    pub fn can_transition_to(&self, next: FormStatus) -> bool {
        use FormStatus::*;
        matches!(
            (self, next),
            (Draft, Pending)
                | (Pending, UnderReview)
                | (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, NeedsRevision)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (UnderReview, NeedsRevision)
                | (NeedsRevision, Pending)
                | (Approved, Archived)
        )
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for FormStatus {
    type Err = FormStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid form status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormStatusParseError(pub String);

impl fmt::Display for FormStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid form status: {}", self.0)
    }
}

impl std::error::Error for FormStatusParseError {}

/// Decision handed down by a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ReviewDecision {
    Approve,
    Reject,
    RequestRevision,
}

impl ReviewDecision {
    /// Target form status for this decision.
    pub fn resulting_status(&self) -> FormStatus {
        match self {
            ReviewDecision::Approve => FormStatus::Approved,
            ReviewDecision::Reject => FormStatus::Rejected,
            ReviewDecision::RequestRevision => FormStatus::NeedsRevision,
        }
    }
}

// ============================================================================
// FORM STRUCTURE
// ============================================================================

/// Input slot types for form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FormFieldType {
    Text,
    TextArea,
    Number,
    Date,
    Checkbox,
    Select,
    Signature,
}

/// Court classification within a jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum CourtType {
    District,
    Superior,
    Appellate,
    Supreme,
    Family,
    Probate,
    SmallClaims,
    Municipal,
}

/// How a duplicate candidate was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum MatchType {
    /// Byte-identical content (SHA-256 collision with a stored form)
    ContentHash,
    /// Same official form number within the same jurisdiction
    FormNumber,
    /// Normalized title similarity above the configured threshold
    TitleSimilarity,
}

// ============================================================================
// REWARDS
// ============================================================================

/// Contributor recognition tier. Monotone: a contributor never moves down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ContributorTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl ContributorTier {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ContributorTier::Bronze => "bronze",
            ContributorTier::Silver => "silver",
            ContributorTier::Gold => "gold",
            ContributorTier::Platinum => "platinum",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, TierParseError> {
        match s.to_lowercase().as_str() {
            "bronze" => Ok(ContributorTier::Bronze),
            "silver" => Ok(ContributorTier::Silver),
            "gold" => Ok(ContributorTier::Gold),
            "platinum" => Ok(ContributorTier::Platinum),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

impl fmt::Display for ContributorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// Error when parsing an invalid tier string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierParseError(pub String);

impl fmt::Display for TierParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid contributor tier: {}", self.0)
    }
}

impl std::error::Error for TierParseError {}

/// Kind of reward-ledger grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum RewardType {
    /// Free weeks earned by crossing a cumulative unique-page threshold
    PageMilestone,
    /// One-time grant on a contributor's first approved form
    WelcomeBonus,
    /// One-time grant for reaching the contribution-streak target
    StreakBonus,
    /// Manually granted by an administrator
    AdminGrant,
}

// ============================================================================
// FEEDBACK TRIAGE
// ============================================================================

/// Category of a defect report filed against a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FeedbackType {
    /// A field is wrong, missing, or mislabeled
    FieldError,
    /// The legal content itself is incorrect
    ContentIssue,
    /// Form is filed under the wrong jurisdiction
    JurisdictionWrong,
    /// Form has been superseded by a newer official version
    OutdatedForm,
    /// Improvement suggestion, not a defect
    Suggestion,
    /// Usage question
    Question,
}

impl FeedbackType {
    /// Critical types affect the legal validity of a filed document and
    /// drive the stricter priority table.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            FeedbackType::FieldError
                | FeedbackType::ContentIssue
                | FeedbackType::JurisdictionWrong
                | FeedbackType::OutdatedForm
        )
    }

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            FeedbackType::FieldError => "field_error",
            FeedbackType::ContentIssue => "content_issue",
            FeedbackType::JurisdictionWrong => "jurisdiction_wrong",
            FeedbackType::OutdatedForm => "outdated_form",
            FeedbackType::Suggestion => "suggestion",
            FeedbackType::Question => "question",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, FeedbackTypeParseError> {
        match s.to_lowercase().as_str() {
            "field_error" => Ok(FeedbackType::FieldError),
            "content_issue" => Ok(FeedbackType::ContentIssue),
            "jurisdiction_wrong" => Ok(FeedbackType::JurisdictionWrong),
            "outdated_form" => Ok(FeedbackType::OutdatedForm),
            "suggestion" => Ok(FeedbackType::Suggestion),
            "question" => Ok(FeedbackType::Question),
            _ => Err(FeedbackTypeParseError(s.to_string())),
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// Error when parsing an invalid feedback type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackTypeParseError(pub String);

impl fmt::Display for FeedbackTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid feedback type: {}", self.0)
    }
}

impl std::error::Error for FeedbackTypeParseError {}

/// Status of a feedback report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FeedbackStatus {
    /// Filed but not yet looked at
    #[default]
    Received,
    /// Prioritized and assigned to a reviewer
    Triaged,
    /// A reviewer is actively working the report
    InProgress,
    /// Fixed
    Resolved,
    /// Closed without action
    Closed,
    /// Acknowledged but will not be fixed
    WontFix,
    /// Duplicate of another report
    Duplicate,
}

impl FeedbackStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Received => "received",
            FeedbackStatus::Triaged => "triaged",
            FeedbackStatus::InProgress => "in_progress",
            FeedbackStatus::Resolved => "resolved",
            FeedbackStatus::Closed => "closed",
            FeedbackStatus::WontFix => "wont_fix",
            FeedbackStatus::Duplicate => "duplicate",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, FeedbackStatusParseError> {
        match s.to_lowercase().as_str() {
            "received" => Ok(FeedbackStatus::Received),
            "triaged" => Ok(FeedbackStatus::Triaged),
            "in_progress" | "inprogress" | "in-progress" => Ok(FeedbackStatus::InProgress),
            "resolved" => Ok(FeedbackStatus::Resolved),
            "closed" => Ok(FeedbackStatus::Closed),
            "wont_fix" | "wontfix" | "wont-fix" => Ok(FeedbackStatus::WontFix),
            "duplicate" => Ok(FeedbackStatus::Duplicate),
            _ => Err(FeedbackStatusParseError(s.to_string())),
        }
    }

    /// Check if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FeedbackStatus::Resolved
                | FeedbackStatus::Closed
                | FeedbackStatus::WontFix
                | FeedbackStatus::Duplicate
        )
    }

    /// Open states count toward a reviewer's current load.
    pub fn is_open(&self) -> bool {
        matches!(self, FeedbackStatus::Triaged | FeedbackStatus::InProgress)
    }

    /// Whether the triage workflow admits a direct edge to `next`.
    pub fn can_transition_to(&self, next: FeedbackStatus) -> bool {
        use FeedbackStatus::*;
        match (self, next) {
            (Received, Triaged) | (Triaged, InProgress) => true,
            (Received, n) | (Triaged, n) | (InProgress, n) => n.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for FeedbackStatus {
    type Err = FeedbackStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid feedback status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackStatusParseError(pub String);

impl fmt::Display for FeedbackStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid feedback status: {}", self.0)
    }
}

impl std::error::Error for FeedbackStatusParseError {}

/// Triage priority, ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FeedbackPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl FeedbackPriority {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            FeedbackPriority::Low => "low",
            FeedbackPriority::Normal => "normal",
            FeedbackPriority::High => "high",
            FeedbackPriority::Urgent => "urgent",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, PriorityParseError> {
        match s.to_lowercase().as_str() {
            "low" => Ok(FeedbackPriority::Low),
            "normal" => Ok(FeedbackPriority::Normal),
            "high" => Ok(FeedbackPriority::High),
            "urgent" => Ok(FeedbackPriority::Urgent),
            _ => Err(PriorityParseError(s.to_string())),
        }
    }

    /// Target first-response window in hours, by priority.
    pub fn response_target_hours(&self) -> i64 {
        match self {
            FeedbackPriority::Urgent => 4,
            FeedbackPriority::High => 24,
            FeedbackPriority::Normal => 72,
            FeedbackPriority::Low => 120,
        }
    }

    /// High and Urgent reports are auto-assigned at submission.
    pub fn requires_assignment(&self) -> bool {
        matches!(self, FeedbackPriority::High | FeedbackPriority::Urgent)
    }
}

impl fmt::Display for FeedbackPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// Error when parsing an invalid priority string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityParseError(pub String);

impl fmt::Display for PriorityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid feedback priority: {}", self.0)
    }
}

impl std::error::Error for PriorityParseError {}

/// Direction of a feedback vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum VoteDirection {
    Up,
    Down,
}

// ============================================================================
// DISCRIMINATORS
// ============================================================================

/// Entity type discriminator for error reporting and polymorphic references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    Form,
    FormField,
    Jurisdiction,
    ContributorStats,
    RewardLedgerEntry,
    FormFeedback,
    Reviewer,
}

/// Usage counter kinds on an approved form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum UsageKind {
    Download,
    View,
}
