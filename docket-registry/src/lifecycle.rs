//! Form lifecycle manager
//!
//! Owns every mutation of the form entity from submission to a terminal
//! decision. Counter updates ride in the same logical transaction as the
//! status change; the reward ledger is invoked synchronously on approval.
//! Notification delivery is fire-and-forget and never fails an operation.

use chrono::Utc;
use docket_core::{
    ContributorId, DocketConfig, DocketResult, EntityType, Form, FormDraft, FormField, FormId,
    FormStatus, LifecycleError, NotificationEvent, NotificationSink, ReviewChecklist,
    ReviewDecision, ReviewerId, RevisionRequest, StorageError, Timestamp, UsageKind,
    ValidationError,
};
use docket_rewards::{RewardGrant, RewardsEngine};
use docket_storage::{FormUpdate, StorageTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::duplicate::DuplicateDetector;

/// Reviewer decision with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReviewAction {
    Approve {
        score: f32,
    },
    Reject {
        reason: Option<String>,
    },
    RequestRevision {
        changes: Vec<String>,
        deadline: Option<Timestamp>,
    },
}

impl ReviewAction {
    pub fn decision(&self) -> ReviewDecision {
        match self {
            ReviewAction::Approve { .. } => ReviewDecision::Approve,
            ReviewAction::Reject { .. } => ReviewDecision::Reject,
            ReviewAction::RequestRevision { .. } => ReviewDecision::RequestRevision,
        }
    }
}

/// Result of a review operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub form: Form,
    pub decision: ReviewDecision,
    /// Reward side effects; present only on approval
    pub reward: Option<RewardGrant>,
}

pub struct FormLifecycle {
    storage: Arc<dyn StorageTrait>,
    rewards: Arc<RewardsEngine>,
    notifier: Arc<dyn NotificationSink>,
    detector: DuplicateDetector,
    config: DocketConfig,
}

impl FormLifecycle {
    pub fn new(
        storage: Arc<dyn StorageTrait>,
        rewards: Arc<RewardsEngine>,
        notifier: Arc<dyn NotificationSink>,
        config: DocketConfig,
    ) -> Self {
        let detector = DuplicateDetector::new(storage.clone(), config.clone());
        Self {
            storage,
            rewards,
            notifier,
            detector,
            config,
        }
    }

    /// Submit a new form. Fails with `DuplicateDetected` on a
    /// high-confidence collision; callers that have shown the report to the
    /// contributor may resubmit through [`Self::submit_overriding_duplicates`].
    pub fn submit(&self, draft: &FormDraft, contributor_id: ContributorId) -> DocketResult<Form> {
        self.submit_inner(draft, contributor_id, false)
    }

    /// Submit despite a duplicate report the caller has chosen to override.
    pub fn submit_overriding_duplicates(
        &self,
        draft: &FormDraft,
        contributor_id: ContributorId,
    ) -> DocketResult<Form> {
        self.submit_inner(draft, contributor_id, true)
    }

    fn submit_inner(
        &self,
        draft: &FormDraft,
        contributor_id: ContributorId,
        allow_duplicate: bool,
    ) -> DocketResult<Form> {
        validate_draft(draft, &self.config)?;

        if self.storage.jurisdiction_get(draft.jurisdiction_id)?.is_none() {
            return Err(StorageError::NotFound {
                entity_type: EntityType::Jurisdiction,
                id: draft.jurisdiction_id,
            }
            .into());
        }

        if !allow_duplicate {
            let report = self.detector.detect(draft, None)?;
            if report.is_duplicate {
                return Err(LifecycleError::DuplicateDetected { report }.into());
            }
        }

        let form = Form::from_draft(draft, contributor_id);
        self.storage.form_insert(&form)?;
        for (position, spec) in draft.fields.iter().enumerate() {
            let field = FormField::from_spec(form.form_id, spec, position as i32);
            self.storage.field_insert(&field)?;
        }

        self.rewards.on_submission(contributor_id, form.submitted_at)?;

        info!(form_id = %form.form_id, contributor_id = %contributor_id, "form submitted");
        self.emit(NotificationEvent::FormPendingReview {
            form_id: form.form_id,
            contributor_id,
        });
        Ok(form)
    }

    /// Claim a pending form for review.
    pub fn begin_review(&self, form_id: FormId, reviewer_id: ReviewerId) -> DocketResult<Form> {
        let form = self.get_form(form_id)?;
        if !form.status.can_transition_to(FormStatus::UnderReview) {
            return Err(LifecycleError::InvalidState {
                form_id,
                status: form.status,
                operation: "begin_review".to_string(),
            }
            .into());
        }
        self.storage.form_update(
            form_id,
            FormUpdate {
                status: Some(FormStatus::UnderReview),
                reviewer_id: Some(reviewer_id),
                expected_version: Some(form.version),
                ..FormUpdate::default()
            },
        )
    }

    /// Hand down a review decision. Fails with `NotFound` for an unknown
    /// form and `InvalidState` unless the form is pending or under review.
    pub fn review(
        &self,
        form_id: FormId,
        action: &ReviewAction,
        reviewer_id: ReviewerId,
        checklist: &ReviewChecklist,
    ) -> DocketResult<ReviewOutcome> {
        let form = self.get_form(form_id)?;
        let decision = action.decision();
        let target = decision.resulting_status();
        if !form.status.is_reviewable() || !form.status.can_transition_to(target) {
            return Err(LifecycleError::InvalidState {
                form_id,
                status: form.status,
                operation: "review".to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let mut update = FormUpdate {
            status: Some(target),
            reviewer_id: Some(reviewer_id),
            reviewed_at: Some(now),
            review_notes: checklist.notes.clone(),
            // A stale version means a concurrent decision won the race.
            expected_version: Some(form.version),
            ..FormUpdate::default()
        };

        match action {
            ReviewAction::Approve { score } => {
                validate_score(*score)?;
                update.review_score = Some(*score);
                update.is_public = Some(true);
            }
            ReviewAction::Reject { reason } => {
                if update.review_notes.is_none() {
                    update.review_notes = reason.clone();
                }
            }
            ReviewAction::RequestRevision { changes, deadline } => {
                if changes.is_empty() {
                    return Err(ValidationError::RequiredFieldMissing {
                        field: "requested_changes".to_string(),
                    }
                    .into());
                }
                update.revision_request = Some(RevisionRequest {
                    requested_changes: changes.clone(),
                    deadline: *deadline,
                    requested_at: now,
                });
            }
        }

        let updated = self.storage.form_update(form_id, update)?;

        let reward = match action {
            ReviewAction::Approve { score } => {
                match self.rewards.on_approval(
                    form.contributor_id,
                    form_id,
                    form.page_count,
                    Some(*score),
                ) {
                    Ok(grant) => Some(grant),
                    Err(err) => {
                        // The storage contract is per-entity, so the status
                        // flip is compensated by hand when the ledger step
                        // fails; a form must never read approved without
                        // its ledger check having run.
                        self.storage.form_update(
                            form_id,
                            FormUpdate {
                                status: Some(form.status),
                                is_public: Some(false),
                                ..FormUpdate::default()
                            },
                        )?;
                        return Err(err);
                    }
                }
            }
            ReviewAction::Reject { .. } => {
                self.rewards.on_rejection(form.contributor_id)?;
                None
            }
            ReviewAction::RequestRevision { .. } => {
                self.rewards.on_revision_request(form.contributor_id)?;
                None
            }
        };

        info!(
            form_id = %form_id,
            reviewer_id = %reviewer_id,
            decision = ?decision,
            "form reviewed"
        );
        self.emit(NotificationEvent::FormReviewed {
            form_id,
            contributor_id: form.contributor_id,
            decision,
            reward_granted: reward.as_ref().is_some_and(|g| g.granted),
        });

        Ok(ReviewOutcome {
            form: updated,
            decision,
            reward,
        })
    }

    /// Resubmit a revised draft for a form sent back with
    /// `NeedsRevision`. Same entity, new review cycle: the content is
    /// replaced, the version bumped, and duplicate detection re-run against
    /// everything except the form itself.
    pub fn resubmit(&self, form_id: FormId, draft: &FormDraft) -> DocketResult<Form> {
        validate_draft(draft, &self.config)?;
        let form = self.get_form(form_id)?;
        if !form.status.can_transition_to(FormStatus::Pending) {
            return Err(LifecycleError::InvalidState {
                form_id,
                status: form.status,
                operation: "resubmit".to_string(),
            }
            .into());
        }

        let report = self.detector.detect(draft, Some(form_id))?;
        if report.is_duplicate {
            return Err(LifecycleError::DuplicateDetected { report }.into());
        }

        let updated = self.storage.form_update(
            form_id,
            FormUpdate {
                status: Some(FormStatus::Pending),
                title: Some(draft.title.clone()),
                content_hash: Some(draft.content_hash),
                page_count: Some(draft.page_count),
                clear_revision_request: true,
                expected_version: Some(form.version),
                ..FormUpdate::default()
            },
        )?;

        self.storage.field_delete_by_form(form_id)?;
        for (position, spec) in draft.fields.iter().enumerate() {
            let field = FormField::from_spec(form_id, spec, position as i32);
            self.storage.field_insert(&field)?;
        }

        self.rewards
            .on_resubmission(form.contributor_id, updated.submitted_at.max(Utc::now()))?;

        info!(form_id = %form_id, "form resubmitted");
        self.emit(NotificationEvent::FormPendingReview {
            form_id,
            contributor_id: form.contributor_id,
        });
        Ok(updated)
    }

    /// Bump a usage counter. The only mutation allowed on an approved form.
    pub fn record_usage(&self, form_id: FormId, kind: UsageKind) -> DocketResult<Form> {
        let form = self.get_form(form_id)?;
        if form.status != FormStatus::Approved {
            return Err(LifecycleError::InvalidState {
                form_id,
                status: form.status,
                operation: "record_usage".to_string(),
            }
            .into());
        }
        self.storage.form_increment_usage(form_id, kind)
    }

    /// Archive an approved form in favor of an approved replacement.
    pub fn supersede(&self, form_id: FormId, replacement_id: FormId) -> DocketResult<Form> {
        let form = self.get_form(form_id)?;
        if !form.status.can_transition_to(FormStatus::Archived) {
            return Err(LifecycleError::InvalidState {
                form_id,
                status: form.status,
                operation: "supersede".to_string(),
            }
            .into());
        }
        let replacement = self.get_form(replacement_id)?;
        if replacement.status != FormStatus::Approved {
            return Err(LifecycleError::InvalidState {
                form_id: replacement_id,
                status: replacement.status,
                operation: "supersede".to_string(),
            }
            .into());
        }

        let updated = self.storage.form_update(
            form_id,
            FormUpdate {
                status: Some(FormStatus::Archived),
                superseded_by: Some(replacement_id),
                expected_version: Some(form.version),
                ..FormUpdate::default()
            },
        )?;
        info!(form_id = %form_id, replacement_id = %replacement_id, "form superseded");
        Ok(updated)
    }

    fn get_form(&self, form_id: FormId) -> DocketResult<Form> {
        self.storage.form_get(form_id)?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::Form,
                id: form_id,
            }
            .into()
        })
    }

    fn emit(&self, event: NotificationEvent) {
        if let Err(err) = self.notifier.notify(event) {
            warn!(error = %err, "notification dropped");
        }
    }
}

fn validate_draft(draft: &FormDraft, config: &DocketConfig) -> DocketResult<()> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "title".to_string(),
        }
        .into());
    }
    if draft.form_type.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "form_type".to_string(),
        }
        .into());
    }
    if draft.page_count <= 0 {
        return Err(ValidationError::InvalidValue {
            field: "page_count".to_string(),
            reason: "must be positive".to_string(),
        }
        .into());
    }
    if draft.fields.len() > config.max_fields_per_form {
        return Err(ValidationError::ConstraintViolation {
            constraint: "max_fields_per_form".to_string(),
            reason: format!(
                "{} fields exceeds the limit of {}",
                draft.fields.len(),
                config.max_fields_per_form
            ),
        }
        .into());
    }

    let mut names: HashSet<&str> = HashSet::new();
    for spec in &draft.fields {
        if spec.name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "fields.name".to_string(),
            }
            .into());
        }
        if !names.insert(spec.name.as_str()) {
            return Err(ValidationError::ConstraintViolation {
                constraint: "unique_field_names".to_string(),
                reason: format!("field {:?} appears twice", spec.name),
            }
            .into());
        }
        if let Some(pattern) = &spec.validation_pattern {
            if regex::Regex::new(pattern).is_err() {
                return Err(ValidationError::InvalidValue {
                    field: format!("fields.{}.validation_pattern", spec.name),
                    reason: "not a valid regular expression".to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

fn validate_score(score: f32) -> DocketResult<()> {
    if !(1.0..=5.0).contains(&score) {
        return Err(ValidationError::InvalidValue {
            field: "score".to_string(),
            reason: "must be in 1.0..=5.0".to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{
        compute_content_hash, new_entity_id, DocketError, FormFieldSpec, FormFieldType,
        Jurisdiction, RecordingSink, RewardType,
    };
    use docket_storage::MockStorage;

    struct Fixture {
        lifecycle: FormLifecycle,
        storage: Arc<MockStorage>,
        sink: Arc<RecordingSink>,
        jurisdiction_id: docket_core::JurisdictionId,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(MockStorage::new());
        let sink = Arc::new(RecordingSink::new());
        let config = DocketConfig::default();
        let rewards = Arc::new(RewardsEngine::new(storage.clone(), config.clone()));
        let lifecycle =
            FormLifecycle::new(storage.clone(), rewards, sink.clone(), config);

        let jurisdiction = Jurisdiction {
            jurisdiction_id: new_entity_id(),
            code: "CA-ALAMEDA-SUPERIOR".to_string(),
            state: "CA".to_string(),
            county: Some("Alameda".to_string()),
            court_type: None,
            parent_id: None,
            created_at: Utc::now(),
        };
        storage.jurisdiction_insert(&jurisdiction).unwrap();

        Fixture {
            lifecycle,
            storage,
            sink,
            jurisdiction_id: jurisdiction.jurisdiction_id,
        }
    }

    fn draft(fx: &Fixture, title: &str, content: &[u8]) -> FormDraft {
        FormDraft {
            title: title.to_string(),
            form_number: None,
            form_type: "motion".to_string(),
            jurisdiction_id: fx.jurisdiction_id,
            content_hash: compute_content_hash(content),
            page_count: 5,
            fields: vec![FormFieldSpec {
                name: "case_number".to_string(),
                label: "Case Number".to_string(),
                field_type: FormFieldType::Text,
                required: true,
                repeatable: false,
                validation_pattern: None,
            }],
        }
    }

    fn checklist() -> ReviewChecklist {
        ReviewChecklist {
            title_verified: true,
            jurisdiction_verified: true,
            fields_verified: true,
            content_legible: true,
            notes: None,
        }
    }

    #[test]
    fn test_submit_creates_pending_form_with_fields() {
        let fx = fixture();
        let contributor = new_entity_id();
        let form = fx
            .lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"v1"), contributor)
            .unwrap();
        assert_eq!(form.status, FormStatus::Pending);

        let fields = fx.storage.field_list_by_form(form.form_id).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "case_number");

        let stats = fx.storage.stats_get(contributor).unwrap().unwrap();
        assert_eq!(stats.forms_submitted, 1);
        assert_eq!(stats.forms_pending, 1);

        assert!(matches!(
            fx.sink.events().as_slice(),
            [NotificationEvent::FormPendingReview { .. }]
        ));
    }

    #[test]
    fn test_submit_rejects_unknown_jurisdiction() {
        let fx = fixture();
        let mut bad = draft(&fx, "Motion to Dismiss", b"v1");
        bad.jurisdiction_id = new_entity_id();
        let result = fx.lifecycle.submit(&bad, new_entity_id());
        assert!(matches!(
            result,
            Err(DocketError::Storage(StorageError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_second_identical_submission_is_blocked_then_overridable() {
        let fx = fixture();
        fx.lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"same"), new_entity_id())
            .unwrap();

        let result = fx
            .lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"same"), new_entity_id());
        let Err(DocketError::Lifecycle(LifecycleError::DuplicateDetected { report })) = result
        else {
            panic!("expected duplicate detection");
        };
        assert!(report.is_duplicate);
        assert_eq!(report.matches[0].confidence, 100);

        // The caller may override after showing the report.
        fx.lifecycle
            .submit_overriding_duplicates(
                &draft(&fx, "Motion to Dismiss", b"same"),
                new_entity_id(),
            )
            .unwrap();
    }

    #[test]
    fn test_approve_locks_content_and_grants_reward() {
        let fx = fixture();
        let contributor = new_entity_id();
        let form = fx
            .lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"v1"), contributor)
            .unwrap();

        let reviewer = new_entity_id();
        let outcome = fx
            .lifecycle
            .review(
                form.form_id,
                &ReviewAction::Approve { score: 4.5 },
                reviewer,
                &checklist(),
            )
            .unwrap();

        assert_eq!(outcome.form.status, FormStatus::Approved);
        assert!(outcome.form.is_public);
        assert!(outcome.form.is_content_locked());
        assert_eq!(outcome.form.reviewer_id, Some(reviewer));
        assert_eq!(outcome.form.review_score, Some(4.5));

        // First approval: welcome bonus only (5 pages, no milestone).
        let reward = outcome.reward.unwrap();
        assert!(reward.granted);
        assert_eq!(reward.entries.len(), 1);
        assert_eq!(reward.entries[0].reward_type, RewardType::WelcomeBonus);

        let stats = fx.storage.stats_get(contributor).unwrap().unwrap();
        assert_eq!(stats.forms_approved, 1);
        assert_eq!(stats.forms_pending, 0);
        assert_eq!(stats.unique_pages, 5);
    }

    #[test]
    fn test_begin_review_claims_pending_form() {
        let fx = fixture();
        let reviewer = new_entity_id();
        let form = fx
            .lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"v1"), new_entity_id())
            .unwrap();

        let claimed = fx.lifecycle.begin_review(form.form_id, reviewer).unwrap();
        assert_eq!(claimed.status, FormStatus::UnderReview);
        assert_eq!(claimed.reviewer_id, Some(reviewer));

        // A second claim loses: UnderReview has no edge back to itself.
        let result = fx.lifecycle.begin_review(form.form_id, new_entity_id());
        assert!(matches!(
            result,
            Err(DocketError::Lifecycle(LifecycleError::InvalidState { .. }))
        ));

        // The decision still lands from UnderReview.
        let outcome = fx
            .lifecycle
            .review(
                form.form_id,
                &ReviewAction::Approve { score: 4.0 },
                reviewer,
                &checklist(),
            )
            .unwrap();
        assert_eq!(outcome.form.status, FormStatus::Approved);
    }

    #[test]
    fn test_review_missing_form_is_not_found() {
        let fx = fixture();
        let result = fx.lifecycle.review(
            new_entity_id(),
            &ReviewAction::Approve { score: 4.0 },
            new_entity_id(),
            &checklist(),
        );
        assert!(matches!(
            result,
            Err(DocketError::Storage(StorageError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_rejected_form_cannot_be_approved() {
        let fx = fixture();
        let form = fx
            .lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"v1"), new_entity_id())
            .unwrap();
        fx.lifecycle
            .review(
                form.form_id,
                &ReviewAction::Reject { reason: None },
                new_entity_id(),
                &checklist(),
            )
            .unwrap();

        let result = fx.lifecycle.review(
            form.form_id,
            &ReviewAction::Approve { score: 5.0 },
            new_entity_id(),
            &checklist(),
        );
        assert!(matches!(
            result,
            Err(DocketError::Lifecycle(LifecycleError::InvalidState { .. }))
        ));
    }

    #[test]
    fn test_revision_roundtrip() {
        let fx = fixture();
        let contributor = new_entity_id();
        let form = fx
            .lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"v1"), contributor)
            .unwrap();

        let outcome = fx
            .lifecycle
            .review(
                form.form_id,
                &ReviewAction::RequestRevision {
                    changes: vec!["fix caption".to_string()],
                    deadline: None,
                },
                new_entity_id(),
                &checklist(),
            )
            .unwrap();
        assert_eq!(outcome.form.status, FormStatus::NeedsRevision);
        let revision = outcome.form.revision_request.unwrap();
        assert_eq!(revision.requested_changes, vec!["fix caption".to_string()]);

        let stats = fx.storage.stats_get(contributor).unwrap().unwrap();
        assert_eq!(stats.revision_requests, 1);
        assert_eq!(stats.forms_pending, 0);

        // Resubmission: same entity, new cycle, revision request cleared.
        let updated = fx
            .lifecycle
            .resubmit(form.form_id, &draft(&fx, "Motion to Dismiss", b"v2"))
            .unwrap();
        assert_eq!(updated.form_id, form.form_id);
        assert_eq!(updated.status, FormStatus::Pending);
        assert_eq!(updated.revision_request, None);
        assert_eq!(updated.content_hash, compute_content_hash(b"v2"));

        let stats = fx.storage.stats_get(contributor).unwrap().unwrap();
        assert_eq!(stats.forms_pending, 1);
        // Not a new submission.
        assert_eq!(stats.forms_submitted, 1);
    }

    #[test]
    fn test_revision_requires_changes() {
        let fx = fixture();
        let form = fx
            .lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"v1"), new_entity_id())
            .unwrap();
        let result = fx.lifecycle.review(
            form.form_id,
            &ReviewAction::RequestRevision {
                changes: vec![],
                deadline: None,
            },
            new_entity_id(),
            &checklist(),
        );
        assert!(matches!(result, Err(DocketError::Validation(_))));
    }

    #[test]
    fn test_usage_counters_only_on_approved_forms() {
        let fx = fixture();
        let form = fx
            .lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"v1"), new_entity_id())
            .unwrap();

        let result = fx.lifecycle.record_usage(form.form_id, UsageKind::Download);
        assert!(matches!(
            result,
            Err(DocketError::Lifecycle(LifecycleError::InvalidState { .. }))
        ));

        fx.lifecycle
            .review(
                form.form_id,
                &ReviewAction::Approve { score: 4.0 },
                new_entity_id(),
                &checklist(),
            )
            .unwrap();
        let updated = fx
            .lifecycle
            .record_usage(form.form_id, UsageKind::Download)
            .unwrap();
        assert_eq!(updated.download_count, 1);
    }

    #[test]
    fn test_supersede_archives_with_pointer() {
        let fx = fixture();
        let contributor = new_entity_id();
        let old = fx
            .lifecycle
            .submit(&draft(&fx, "Fee Waiver 2019", b"old"), contributor)
            .unwrap();
        let replacement_draft = draft(&fx, "Application for Waiver of Court Fees", b"new");
        fx.lifecycle
            .review(
                old.form_id,
                &ReviewAction::Approve { score: 4.0 },
                new_entity_id(),
                &checklist(),
            )
            .unwrap();

        let new = fx.lifecycle.submit(&replacement_draft, contributor).unwrap();
        // Replacement must itself be approved first.
        let premature = fx.lifecycle.supersede(old.form_id, new.form_id);
        assert!(matches!(
            premature,
            Err(DocketError::Lifecycle(LifecycleError::InvalidState { .. }))
        ));

        fx.lifecycle
            .review(
                new.form_id,
                &ReviewAction::Approve { score: 4.5 },
                new_entity_id(),
                &checklist(),
            )
            .unwrap();
        let archived = fx.lifecycle.supersede(old.form_id, new.form_id).unwrap();
        assert_eq!(archived.status, FormStatus::Archived);
        assert_eq!(archived.superseded_by, Some(new.form_id));
    }

    #[test]
    fn test_invalid_score_rejected_before_any_mutation() {
        let fx = fixture();
        let form = fx
            .lifecycle
            .submit(&draft(&fx, "Motion to Dismiss", b"v1"), new_entity_id())
            .unwrap();
        let result = fx.lifecycle.review(
            form.form_id,
            &ReviewAction::Approve { score: 9.0 },
            new_entity_id(),
            &checklist(),
        );
        assert!(matches!(result, Err(DocketError::Validation(_))));

        let stored = fx.storage.form_get(form.form_id).unwrap().unwrap();
        assert_eq!(stored.status, FormStatus::Pending);
        assert_eq!(stored.version, form.version);
    }

    #[test]
    fn test_draft_validation_rejects_duplicate_field_names() {
        let fx = fixture();
        let mut bad = draft(&fx, "Motion to Dismiss", b"v1");
        bad.fields.push(bad.fields[0].clone());
        let result = fx.lifecycle.submit(&bad, new_entity_id());
        assert!(matches!(result, Err(DocketError::Validation(_))));
    }

    #[test]
    fn test_draft_validation_rejects_bad_field_pattern() {
        let fx = fixture();
        let mut bad = draft(&fx, "Motion to Dismiss", b"v1");
        bad.fields[0].validation_pattern = Some("[unclosed".to_string());
        let result = fx.lifecycle.submit(&bad, new_entity_id());
        assert!(matches!(result, Err(DocketError::Validation(_))));
    }
}
