//! DOCKET Storage - Storage Trait and In-Memory Implementation
//!
//! Defines the storage abstraction for DOCKET entities. Every public engine
//! operation maps to one short-lived logical transaction against this trait;
//! the contended read-then-write cycles (stats counters, daily ticket
//! sequence, least-loaded reviewer selection) are expressed as single trait
//! calls so a SQL-backed implementation can run them under a row lock or
//! conditional update, and the in-memory implementation runs them under one
//! write lock.

mod mock;

pub use mock::MockStorage;

use chrono::NaiveDate;
use docket_core::{
    ContentHash, ContributorId, ContributorStats, DocketResult, FeedbackId, FeedbackPriority,
    FeedbackStatus, FeedbackType, Form, FormField, FormFeedback, FormId, FormStatus, Jurisdiction,
    JurisdictionId, LedgerEntryId, Reviewer, ReviewerId, RevisionRequest, RewardLedgerEntry,
    RewardType, Timestamp, UsageKind,
};

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Update payload for forms. Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct FormUpdate {
    /// New lifecycle status
    pub status: Option<FormStatus>,
    /// Reviewer who handled the form
    pub reviewer_id: Option<ReviewerId>,
    /// Score attached to the review decision
    pub review_score: Option<f32>,
    /// Public visibility flag
    pub is_public: Option<bool>,
    /// Decision timestamp
    pub reviewed_at: Option<Timestamp>,
    /// Free-form reviewer notes
    pub review_notes: Option<String>,
    /// Structured revision request
    pub revision_request: Option<RevisionRequest>,
    /// Replacement form when archiving
    pub superseded_by: Option<FormId>,
    /// Replacement content hash (resubmission only)
    pub content_hash: Option<ContentHash>,
    /// Replacement page count (resubmission only)
    pub page_count: Option<i32>,
    /// Replacement title (resubmission only)
    pub title: Option<String>,
    /// Drop the stored revision request (resubmission only)
    pub clear_revision_request: bool,
    /// When set, the update fails with `Conflict` unless the stored row
    /// still carries this version. The version is bumped on success.
    pub expected_version: Option<i32>,
}

/// Update payload for feedback reports.
#[derive(Debug, Clone, Default)]
pub struct FeedbackUpdate {
    pub status: Option<FeedbackStatus>,
    pub priority: Option<FeedbackPriority>,
    pub assigned_to: Option<ReviewerId>,
    pub upvotes: Option<i32>,
    pub downvotes: Option<i32>,
    pub reports_affected: Option<i32>,
    pub resolved_at: Option<Timestamp>,
    pub resolution_note: Option<String>,
}

/// Flag-only update for ledger entries. Amounts never change after grant.
#[derive(Debug, Clone, Default)]
pub struct LedgerFlagUpdate {
    pub active: Option<bool>,
    pub used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

/// Entity counts for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageStatistics {
    pub forms: usize,
    pub form_fields: usize,
    pub jurisdictions: usize,
    pub contributor_stats: usize,
    pub ledger_entries: usize,
    pub feedback_reports: usize,
    pub reviewers: usize,
}

/// Mutator passed to [`StorageTrait::stats_upsert_with`]. Runs under the
/// stats row lock; returning an error discards the whole mutation.
pub type StatsMutator<'a> = &'a mut dyn FnMut(&mut ContributorStats) -> DocketResult<()>;

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for DOCKET entities.
///
/// `MockStorage` is the reference semantics for this contract; a SQL-backed
/// implementation must preserve the atomicity notes on each method.
pub trait StorageTrait: Send + Sync {
    // === Form Operations ===

    /// Insert a new form.
    fn form_insert(&self, form: &Form) -> DocketResult<()>;

    /// Get a form by ID.
    fn form_get(&self, id: FormId) -> DocketResult<Option<Form>>;

    /// Apply an update payload; bumps the row version. `Conflict` when
    /// `expected_version` is stale. Returns the updated row.
    fn form_update(&self, id: FormId, update: FormUpdate) -> DocketResult<Form>;

    /// Atomically bump a usage counter on an approved form.
    fn form_increment_usage(&self, id: FormId, kind: UsageKind) -> DocketResult<Form>;

    /// List forms by status.
    fn form_list_by_status(&self, status: FormStatus) -> DocketResult<Vec<Form>>;

    /// All forms whose stored content hash equals `hash`.
    fn form_find_by_content_hash(&self, hash: &ContentHash) -> DocketResult<Vec<Form>>;

    /// Duplicate-candidate set: same jurisdiction and form type, not rejected.
    fn form_find_candidates(
        &self,
        jurisdiction_id: JurisdictionId,
        form_type: &str,
    ) -> DocketResult<Vec<Form>>;

    /// Approved form carrying the given official number in a jurisdiction.
    fn form_find_by_number(
        &self,
        jurisdiction_id: JurisdictionId,
        form_number: &str,
    ) -> DocketResult<Option<Form>>;

    /// Insert one field row.
    fn field_insert(&self, field: &FormField) -> DocketResult<()>;

    /// Fields of a form, ordered by position.
    fn field_list_by_form(&self, form_id: FormId) -> DocketResult<Vec<FormField>>;

    /// Delete a form's field rows (resubmission replaces the field list).
    fn field_delete_by_form(&self, form_id: FormId) -> DocketResult<()>;

    // === Jurisdiction Operations ===

    /// Insert a new jurisdiction record.
    fn jurisdiction_insert(&self, jurisdiction: &Jurisdiction) -> DocketResult<()>;

    /// Get a jurisdiction by ID.
    fn jurisdiction_get(&self, id: JurisdictionId) -> DocketResult<Option<Jurisdiction>>;

    /// Look up by normalized unique code.
    fn jurisdiction_find_by_code(&self, code: &str) -> DocketResult<Option<Jurisdiction>>;

    /// All jurisdiction records.
    fn jurisdiction_list(&self) -> DocketResult<Vec<Jurisdiction>>;

    // === Contributor Stats Operations ===

    /// Get a contributor's stats row.
    fn stats_get(&self, contributor_id: ContributorId) -> DocketResult<Option<ContributorStats>>;

    /// Atomic read-modify-write on the stats row, creating it on first use.
    /// The mutator runs under the row lock; if it errors, nothing is
    /// persisted. On success `row_version` is bumped and `updated_at` set.
    fn stats_upsert_with(
        &self,
        contributor_id: ContributorId,
        mutator: StatsMutator<'_>,
    ) -> DocketResult<ContributorStats>;

    // === Reward Ledger Operations ===

    /// Append a ledger entry. Entries are immutable apart from their flags.
    fn ledger_append(&self, entry: &RewardLedgerEntry) -> DocketResult<()>;

    /// Get a ledger entry by ID.
    fn ledger_get(&self, id: LedgerEntryId) -> DocketResult<Option<RewardLedgerEntry>>;

    /// All entries for a contributor, oldest first.
    fn ledger_list_by_contributor(
        &self,
        contributor_id: ContributorId,
    ) -> DocketResult<Vec<RewardLedgerEntry>>;

    /// Whether the contributor already holds a grant of the given type.
    /// Gates the one-time welcome and streak bonuses.
    fn ledger_has_grant(
        &self,
        contributor_id: ContributorId,
        reward_type: RewardType,
    ) -> DocketResult<bool>;

    /// Flip activation/use/revocation flags.
    fn ledger_update_flags(
        &self,
        id: LedgerEntryId,
        update: LedgerFlagUpdate,
    ) -> DocketResult<RewardLedgerEntry>;

    /// Deactivate every active entry whose expiry has passed. Returns the
    /// number of entries swept.
    fn ledger_sweep_expired(&self, now: Timestamp) -> DocketResult<u32>;

    // === Feedback Operations ===

    /// Insert a new feedback report.
    fn feedback_insert(&self, feedback: &FormFeedback) -> DocketResult<()>;

    /// Get a feedback report by ID.
    fn feedback_get(&self, id: FeedbackId) -> DocketResult<Option<FormFeedback>>;

    /// Apply an update payload. Returns the updated row.
    fn feedback_update(&self, id: FeedbackId, update: FeedbackUpdate) -> DocketResult<FormFeedback>;

    /// Count reports with the same form, type, and (when given) field name.
    /// Trend detection compares this against the configured threshold.
    fn feedback_count_matching(
        &self,
        form_id: FormId,
        feedback_type: FeedbackType,
        field_name: Option<&str>,
    ) -> DocketResult<i32>;

    /// Open (triaged/in-progress) reports currently assigned to a reviewer.
    fn feedback_open_assigned_count(&self, reviewer_id: ReviewerId) -> DocketResult<i32>;

    /// Open reports assigned to a reviewer, oldest first.
    fn feedback_list_assigned(&self, reviewer_id: ReviewerId) -> DocketResult<Vec<FormFeedback>>;

    /// Atomic read-and-claim: pick the active reviewer with the fewest open
    /// assigned reports (ties broken by ascending reviewer ID), assign the
    /// report to them, and set its status to Triaged — all under one write
    /// lock, so concurrent triage operations cannot over-assign a reviewer.
    /// Returns `None` when no active reviewer exists.
    fn feedback_claim_least_loaded(&self, feedback_id: FeedbackId)
        -> DocketResult<Option<Reviewer>>;

    // === Reviewer Operations ===

    /// Insert or replace a reviewer record.
    fn reviewer_upsert(&self, reviewer: &Reviewer) -> DocketResult<()>;

    /// Get a reviewer by ID.
    fn reviewer_get(&self, id: ReviewerId) -> DocketResult<Option<Reviewer>>;

    /// All reviewers currently accepting assignments.
    fn reviewer_list_active(&self) -> DocketResult<Vec<Reviewer>>;

    // === Ticket Sequence ===

    /// Next value of the per-day ticket sequence, starting at 1. Atomic:
    /// two concurrent submissions on the same day never see the same value.
    fn next_ticket_seq(&self, date: NaiveDate) -> DocketResult<u32>;

    // === Diagnostics ===

    /// Entity counts for diagnostics and tests.
    fn statistics(&self) -> DocketResult<StorageStatistics>;
}
