//! Core entity structures

use crate::{
    ContentHash, ContributorId, ContributorTier, CourtType, FeedbackId, FeedbackPriority,
    FeedbackStatus, FeedbackType, FieldId, FormFieldType, FormId, FormStatus, JurisdictionId,
    LedgerEntryId, MatchType, ReviewerId, RewardType, Timestamp, UserId, new_entity_id,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// JURISDICTION
// ============================================================================

/// Canonical jurisdiction record.
///
/// The directory owns every node; `parent_id` is a lookup relation into the
/// same arena, never an owned edge, so the hierarchy cannot form a cyclic
/// object graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Jurisdiction {
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub jurisdiction_id: JurisdictionId,
    /// Normalized unique code, e.g. `CA-ALAMEDA-SUPERIOR`
    pub code: String,
    pub state: String,
    pub county: Option<String>,
    pub court_type: Option<CourtType>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<uuid::Uuid>))]
    pub parent_id: Option<JurisdictionId>,
    #[cfg_attr(feature = "openapi", schema(value_type = chrono::DateTime<chrono::Utc>))]
    pub created_at: Timestamp,
}

/// Raw jurisdiction descriptor supplied with a submission, before
/// normalization and deduplication by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct JurisdictionDescriptor {
    pub state: String,
    pub county: Option<String>,
    pub court_type: Option<CourtType>,
}

// ============================================================================
// FORM
// ============================================================================

/// A legal-document template tracked through review.
///
/// Created on submission with status `Pending`; mutated only by the
/// lifecycle manager. Once approved the content is locked and only usage
/// counters may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Form {
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub form_id: FormId,
    pub title: String,
    /// Official form number assigned by the issuing court, if any
    pub form_number: Option<String>,
    pub form_type: String,
    pub status: FormStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub contributor_id: ContributorId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<uuid::Uuid>))]
    pub reviewer_id: Option<ReviewerId>,
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub jurisdiction_id: JurisdictionId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "byte"))]
    pub content_hash: ContentHash,
    /// Optimistic concurrency token; bumped on every mutation
    pub version: i32,
    pub page_count: i32,
    pub review_score: Option<f32>,
    pub is_public: bool,
    pub download_count: i64,
    pub view_count: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = chrono::DateTime<chrono::Utc>))]
    pub submitted_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<chrono::DateTime<chrono::Utc>>))]
    pub reviewed_at: Option<Timestamp>,
    pub review_notes: Option<String>,
    pub revision_request: Option<RevisionRequest>,
    /// Set when an approved form is archived in favor of a replacement
    #[cfg_attr(feature = "openapi", schema(value_type = Option<uuid::Uuid>))]
    pub superseded_by: Option<FormId>,
}

impl Form {
    /// Create a new pending form from a validated draft.
    pub fn from_draft(draft: &FormDraft, contributor_id: ContributorId) -> Self {
        Self {
            form_id: new_entity_id(),
            title: draft.title.clone(),
            form_number: draft.form_number.clone(),
            form_type: draft.form_type.clone(),
            status: FormStatus::Pending,
            contributor_id,
            reviewer_id: None,
            jurisdiction_id: draft.jurisdiction_id,
            content_hash: draft.content_hash,
            version: 1,
            page_count: draft.page_count,
            review_score: None,
            is_public: false,
            download_count: 0,
            view_count: 0,
            submitted_at: Utc::now(),
            reviewed_at: None,
            review_notes: None,
            revision_request: None,
            superseded_by: None,
        }
    }

    /// Approved forms have locked content; only usage counters may change.
    pub fn is_content_locked(&self) -> bool {
        matches!(self.status, FormStatus::Approved | FormStatus::Archived)
    }
}

/// Submission payload for a new form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormDraft {
    pub title: String,
    pub form_number: Option<String>,
    pub form_type: String,
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub jurisdiction_id: JurisdictionId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "byte"))]
    pub content_hash: ContentHash,
    pub page_count: i32,
    pub fields: Vec<FormFieldSpec>,
}

/// Field description supplied with a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormFieldSpec {
    pub name: String,
    pub label: String,
    pub field_type: FormFieldType,
    pub required: bool,
    pub repeatable: bool,
    /// Validation regex applied by fill-in frontends, if any
    pub validation_pattern: Option<String>,
}

/// One input slot of a form. Ordered by `position`; lifecycle tied to the
/// parent form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormField {
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub field_id: FieldId,
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub form_id: FormId,
    pub name: String,
    pub label: String,
    pub field_type: FormFieldType,
    pub required: bool,
    pub repeatable: bool,
    pub position: i32,
    pub validation_pattern: Option<String>,
}

impl FormField {
    /// Materialize a field row from a draft spec at the given position.
    pub fn from_spec(form_id: FormId, spec: &FormFieldSpec, position: i32) -> Self {
        Self {
            field_id: new_entity_id(),
            form_id,
            name: spec.name.clone(),
            label: spec.label.clone(),
            field_type: spec.field_type,
            required: spec.required,
            repeatable: spec.repeatable,
            position,
            validation_pattern: spec.validation_pattern.clone(),
        }
    }
}

/// Structured revision request stored on a form sent back to its
/// contributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RevisionRequest {
    pub requested_changes: Vec<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<chrono::DateTime<chrono::Utc>>))]
    pub deadline: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = chrono::DateTime<chrono::Utc>))]
    pub requested_at: Timestamp,
}

/// Reviewer's structured checklist, recorded with every decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReviewChecklist {
    pub title_verified: bool,
    pub jurisdiction_verified: bool,
    pub fields_verified: bool,
    pub content_legible: bool,
    pub notes: Option<String>,
}

// ============================================================================
// DUPLICATE DETECTION
// ============================================================================

/// A single duplicate candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DuplicateMatch {
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub form_id: FormId,
    pub match_type: MatchType,
    /// 0-100; 100 means byte-identical content
    pub confidence: u8,
}

/// Outcome of duplicate detection for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DuplicateReport {
    pub is_duplicate: bool,
    /// Sorted by descending confidence, truncated to the top five
    pub matches: Vec<DuplicateMatch>,
}

impl DuplicateReport {
    /// Report with no matches at all.
    pub fn clean() -> Self {
        Self {
            is_duplicate: false,
            matches: Vec::new(),
        }
    }
}

// ============================================================================
// CONTRIBUTOR STATS & REWARDS
// ============================================================================

/// Per-contributor cumulative counters. One row per contributor,
/// upserted on first use and mutated only by the stats engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ContributorStats {
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub contributor_id: ContributorId,
    pub forms_submitted: i32,
    pub forms_approved: i32,
    pub forms_rejected: i32,
    pub forms_pending: i32,
    pub revision_requests: i32,
    /// Monotone non-decreasing; drives the page milestone
    pub unique_pages: i32,
    pub unique_forms: i32,
    pub free_weeks_earned: i32,
    pub free_weeks_used: i32,
    pub current_streak_days: i32,
    pub best_streak_days: i32,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<chrono::DateTime<chrono::Utc>>))]
    pub last_contribution_at: Option<Timestamp>,
    pub tier: ContributorTier,
    /// Running mean stored as sum + count to avoid float reconstruction drift
    pub score_sum: f64,
    pub score_count: i64,
    /// Row lock token for read-modify-write cycles
    pub row_version: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = chrono::DateTime<chrono::Utc>))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = chrono::DateTime<chrono::Utc>))]
    pub updated_at: Timestamp,
}

impl ContributorStats {
    /// Fresh row for a contributor's first interaction.
    pub fn new(contributor_id: ContributorId) -> Self {
        let now = Utc::now();
        Self {
            contributor_id,
            forms_submitted: 0,
            forms_approved: 0,
            forms_rejected: 0,
            forms_pending: 0,
            revision_requests: 0,
            unique_pages: 0,
            unique_forms: 0,
            free_weeks_earned: 0,
            free_weeks_used: 0,
            current_streak_days: 0,
            best_streak_days: 0,
            last_contribution_at: None,
            tier: ContributorTier::Bronze,
            score_sum: 0.0,
            score_count: 0,
            row_version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rolling average review score, if any score has been recorded.
    pub fn average_score(&self) -> Option<f64> {
        if self.score_count == 0 {
            None
        } else {
            Some(self.score_sum / self.score_count as f64)
        }
    }

    /// Free weeks currently available to spend.
    pub fn free_weeks_available(&self) -> i32 {
        self.free_weeks_earned - self.free_weeks_used
    }
}

/// Append-only reward-ledger entry. Only the activation/use/revocation
/// flags mutate after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RewardLedgerEntry {
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub entry_id: LedgerEntryId,
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub contributor_id: ContributorId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<uuid::Uuid>))]
    pub form_id: Option<FormId>,
    pub reward_type: RewardType,
    /// Free weeks granted by this entry
    pub weeks: i32,
    pub reason: String,
    /// Cumulative page threshold that triggered a milestone grant
    pub milestone_value: Option<i32>,
    #[cfg_attr(feature = "openapi", schema(value_type = chrono::DateTime<chrono::Utc>))]
    pub granted_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<chrono::DateTime<chrono::Utc>>))]
    pub expires_at: Option<Timestamp>,
    pub active: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<chrono::DateTime<chrono::Utc>>))]
    pub used_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<chrono::DateTime<chrono::Utc>>))]
    pub revoked_at: Option<Timestamp>,
}

impl RewardLedgerEntry {
    fn grant(
        contributor_id: ContributorId,
        form_id: Option<FormId>,
        reward_type: RewardType,
        weeks: i32,
        reason: String,
        milestone_value: Option<i32>,
        validity_days: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            entry_id: new_entity_id(),
            contributor_id,
            form_id,
            reward_type,
            weeks,
            reason,
            milestone_value,
            granted_at: now,
            expires_at: Some(now + chrono::Duration::days(validity_days)),
            active: true,
            used_at: None,
            revoked_at: None,
        }
    }

    /// Grant for crossing one or more cumulative page thresholds.
    pub fn page_milestone(
        contributor_id: ContributorId,
        form_id: FormId,
        weeks: i32,
        milestone_value: i32,
        validity_days: i64,
    ) -> Self {
        Self::grant(
            contributor_id,
            Some(form_id),
            RewardType::PageMilestone,
            weeks,
            format!("Reached {milestone_value} unique contributed pages"),
            Some(milestone_value),
            validity_days,
        )
    }

    /// One-time grant for a contributor's first approved form.
    pub fn welcome_bonus(
        contributor_id: ContributorId,
        form_id: FormId,
        weeks: i32,
        validity_days: i64,
    ) -> Self {
        Self::grant(
            contributor_id,
            Some(form_id),
            RewardType::WelcomeBonus,
            weeks,
            "First approved form".to_string(),
            None,
            validity_days,
        )
    }

    /// One-time grant for reaching the contribution-streak target.
    pub fn streak_bonus(
        contributor_id: ContributorId,
        weeks: i32,
        streak_days: i32,
        validity_days: i64,
    ) -> Self {
        Self::grant(
            contributor_id,
            None,
            RewardType::StreakBonus,
            weeks,
            format!("{streak_days}-day contribution streak"),
            None,
            validity_days,
        )
    }

    /// Usable right now: active, not spent, not past expiry.
    pub fn is_available(&self, now: Timestamp) -> bool {
        self.active
            && self.used_at.is_none()
            && self.revoked_at.is_none()
            && self.expires_at.map_or(true, |e| e > now)
    }
}

// ============================================================================
// FEEDBACK
// ============================================================================

/// A defect report filed by an end user against a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormFeedback {
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub feedback_id: FeedbackId,
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub form_id: FormId,
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub user_id: UserId,
    pub feedback_type: FeedbackType,
    /// 1 (cosmetic) through 5 (form unusable)
    pub severity: u8,
    pub priority: FeedbackPriority,
    pub status: FeedbackStatus,
    /// Field the report is about, when the defect is field-scoped
    pub field_name: Option<String>,
    pub description: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<uuid::Uuid>))]
    pub assigned_to: Option<ReviewerId>,
    pub upvotes: i32,
    pub downvotes: i32,
    /// Self-reported number of users hit by the defect
    pub users_affected: i32,
    /// Reports sharing form, type, and field; maintained by trend detection
    pub reports_affected: i32,
    /// Human-readable unique ticket, `PREFIX-YYYYMMDD-NNNN`
    pub ticket_number: String,
    #[cfg_attr(feature = "openapi", schema(value_type = chrono::DateTime<chrono::Utc>))]
    pub submitted_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<chrono::DateTime<chrono::Utc>>))]
    pub resolved_at: Option<Timestamp>,
    pub resolution_note: Option<String>,
}

/// Submission payload for a feedback report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedbackReport {
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub form_id: FormId,
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub user_id: UserId,
    pub feedback_type: FeedbackType,
    pub severity: u8,
    pub field_name: Option<String>,
    pub description: String,
    pub users_affected: Option<i32>,
}

// ============================================================================
// REVIEWERS
// ============================================================================

/// An assignable reviewer known to the triage engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Reviewer {
    #[cfg_attr(feature = "openapi", schema(value_type = uuid::Uuid))]
    pub reviewer_id: ReviewerId,
    pub name: String,
    pub active: bool,
    pub specialties: Vec<String>,
}
