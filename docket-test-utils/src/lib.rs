//! DOCKET Test Utilities
//!
//! Centralized test infrastructure for the DOCKET workspace: a harness that
//! wires every engine over one in-memory store, plus fixture builders for
//! the common entities.

// Re-export the in-memory storage and its trait from the source crate
pub use docket_storage::{MockStorage, StorageTrait};

// Re-export core types for convenience
pub use docket_core::{
    compute_content_hash, new_entity_id, ContributorId, CourtType, DocketConfig, DocketError,
    DocketResult, FeedbackPriority, FeedbackReport, FeedbackStatus, FeedbackType, Form, FormDraft,
    FormFieldSpec, FormFieldType, FormId, FormStatus, Jurisdiction, JurisdictionDescriptor,
    JurisdictionId, NotificationEvent, RecordingSink, ReviewChecklist, Reviewer, ReviewerId,
    RewardType, UserId,
};

use docket_registry::{FormLifecycle, JurisdictionDirectory};
use docket_rewards::RewardsEngine;
use docket_triage::TriageEngine;
use std::sync::Arc;

/// Every engine wired over one shared `MockStorage` and recording sink.
pub struct TestHarness {
    pub storage: Arc<MockStorage>,
    pub sink: Arc<RecordingSink>,
    pub config: DocketConfig,
    pub directory: JurisdictionDirectory,
    pub lifecycle: FormLifecycle,
    pub rewards: Arc<RewardsEngine>,
    pub triage: TriageEngine,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(DocketConfig::default())
    }

    pub fn with_config(config: DocketConfig) -> Self {
        let storage = Arc::new(MockStorage::new());
        let sink = Arc::new(RecordingSink::new());
        let rewards = Arc::new(RewardsEngine::new(storage.clone(), config.clone()));
        let directory = JurisdictionDirectory::new(storage.clone());
        let lifecycle = FormLifecycle::new(
            storage.clone(),
            rewards.clone(),
            sink.clone(),
            config.clone(),
        );
        let triage = TriageEngine::new(storage.clone(), sink.clone(), config.clone());
        Self {
            storage,
            sink,
            config,
            directory,
            lifecycle,
            rewards,
            triage,
        }
    }

    /// Canonical Alameda County superior court, created on first call.
    pub fn alameda_superior(&self) -> Jurisdiction {
        self.directory
            .resolve_or_create(&JurisdictionDescriptor {
                state: "CA".to_string(),
                county: Some("Alameda".to_string()),
                court_type: Some(CourtType::Superior),
            })
            .expect("fixture jurisdiction resolves")
    }

    /// Register an active reviewer.
    pub fn add_reviewer(&self, name: &str) -> ReviewerId {
        let reviewer = Reviewer {
            reviewer_id: new_entity_id(),
            name: name.to_string(),
            active: true,
            specialties: vec![],
        };
        self.storage
            .reviewer_upsert(&reviewer)
            .expect("fixture reviewer inserts");
        reviewer.reviewer_id
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Draft with one text field, hashed from `content`.
pub fn sample_draft(jurisdiction_id: JurisdictionId, title: &str, content: &[u8]) -> FormDraft {
    FormDraft {
        title: title.to_string(),
        form_number: None,
        form_type: "motion".to_string(),
        jurisdiction_id,
        content_hash: compute_content_hash(content),
        page_count: 5,
        fields: vec![FormFieldSpec {
            name: "case_number".to_string(),
            label: "Case Number".to_string(),
            field_type: FormFieldType::Text,
            required: true,
            repeatable: false,
            validation_pattern: Some(r"^[A-Z]{2}-\d{6}$".to_string()),
        }],
    }
}

/// Feedback report against a form.
pub fn sample_report(
    form_id: FormId,
    feedback_type: FeedbackType,
    severity: u8,
) -> FeedbackReport {
    FeedbackReport {
        form_id,
        user_id: new_entity_id(),
        feedback_type,
        severity,
        field_name: None,
        description: "the notary block is missing".to_string(),
        users_affected: None,
    }
}

/// All-green reviewer checklist.
pub fn approve_checklist() -> ReviewChecklist {
    ReviewChecklist {
        title_verified: true,
        jurisdiction_verified: true,
        fields_verified: true,
        content_legible: true,
        notes: None,
    }
}
