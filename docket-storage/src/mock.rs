//! In-memory storage implementation
//!
//! Reference semantics for `StorageTrait`. Every map sits behind its own
//! `RwLock`; methods that touch more than one map take the locks in a fixed
//! order (feedback before reviewers) so they cannot deadlock.

use crate::{
    FeedbackUpdate, FormUpdate, LedgerFlagUpdate, StatsMutator, StorageStatistics, StorageTrait,
};
use chrono::{NaiveDate, Utc};
use docket_core::{
    ContentHash, ContributorId, ContributorStats, DocketError, DocketResult, EntityType,
    FeedbackId, FeedbackStatus, FeedbackType, Form, FormField, FormFeedback, FormId, FormStatus,
    Jurisdiction, JurisdictionId, LedgerEntryId, Reviewer, ReviewerId, RewardLedgerEntry,
    RewardType, StorageError, Timestamp, UsageKind,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory storage over `RwLock<HashMap>` maps.
#[derive(Debug, Default)]
pub struct MockStorage {
    forms: RwLock<HashMap<FormId, Form>>,
    fields: RwLock<HashMap<Uuid, FormField>>,
    jurisdictions: RwLock<HashMap<JurisdictionId, Jurisdiction>>,
    stats: RwLock<HashMap<ContributorId, ContributorStats>>,
    ledger: RwLock<HashMap<LedgerEntryId, RewardLedgerEntry>>,
    feedback: RwLock<HashMap<FeedbackId, FormFeedback>>,
    reviewers: RwLock<HashMap<ReviewerId, Reviewer>>,
    ticket_seqs: RwLock<HashMap<NaiveDate, u32>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> DocketResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| DocketError::Storage(StorageError::LockPoisoned))
}

fn write<T>(lock: &RwLock<T>) -> DocketResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| DocketError::Storage(StorageError::LockPoisoned))
}

fn not_found(entity_type: EntityType, id: Uuid) -> DocketError {
    DocketError::Storage(StorageError::NotFound { entity_type, id })
}

impl StorageTrait for MockStorage {
    // === Form Operations ===

    fn form_insert(&self, form: &Form) -> DocketResult<()> {
        let mut forms = write(&self.forms)?;
        if forms.contains_key(&form.form_id) {
            return Err(DocketError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Form,
                reason: "already exists".to_string(),
            }));
        }
        forms.insert(form.form_id, form.clone());
        Ok(())
    }

    fn form_get(&self, id: FormId) -> DocketResult<Option<Form>> {
        Ok(read(&self.forms)?.get(&id).cloned())
    }

    fn form_update(&self, id: FormId, update: FormUpdate) -> DocketResult<Form> {
        let mut forms = write(&self.forms)?;
        let form = forms
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Form, id))?;

        if let Some(expected) = update.expected_version {
            if form.version != expected {
                return Err(DocketError::Storage(StorageError::Conflict {
                    entity_type: EntityType::Form,
                    id,
                }));
            }
        }

        if let Some(status) = update.status {
            form.status = status;
        }
        if let Some(reviewer_id) = update.reviewer_id {
            form.reviewer_id = Some(reviewer_id);
        }
        if let Some(score) = update.review_score {
            form.review_score = Some(score);
        }
        if let Some(is_public) = update.is_public {
            form.is_public = is_public;
        }
        if let Some(reviewed_at) = update.reviewed_at {
            form.reviewed_at = Some(reviewed_at);
        }
        if let Some(notes) = update.review_notes {
            form.review_notes = Some(notes);
        }
        if let Some(revision) = update.revision_request {
            form.revision_request = Some(revision);
        }
        if let Some(superseded_by) = update.superseded_by {
            form.superseded_by = Some(superseded_by);
        }
        if let Some(content_hash) = update.content_hash {
            form.content_hash = content_hash;
        }
        if let Some(page_count) = update.page_count {
            form.page_count = page_count;
        }
        if let Some(title) = update.title {
            form.title = title;
        }
        if update.clear_revision_request {
            form.revision_request = None;
        }
        form.version += 1;

        Ok(form.clone())
    }

    fn form_increment_usage(&self, id: FormId, kind: UsageKind) -> DocketResult<Form> {
        let mut forms = write(&self.forms)?;
        let form = forms
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Form, id))?;
        match kind {
            UsageKind::Download => form.download_count += 1,
            UsageKind::View => form.view_count += 1,
        }
        Ok(form.clone())
    }

    fn form_list_by_status(&self, status: FormStatus) -> DocketResult<Vec<Form>> {
        Ok(read(&self.forms)?
            .values()
            .filter(|f| f.status == status)
            .cloned()
            .collect())
    }

    fn form_find_by_content_hash(&self, hash: &ContentHash) -> DocketResult<Vec<Form>> {
        Ok(read(&self.forms)?
            .values()
            .filter(|f| &f.content_hash == hash)
            .cloned()
            .collect())
    }

    fn form_find_candidates(
        &self,
        jurisdiction_id: JurisdictionId,
        form_type: &str,
    ) -> DocketResult<Vec<Form>> {
        Ok(read(&self.forms)?
            .values()
            .filter(|f| {
                f.jurisdiction_id == jurisdiction_id
                    && f.form_type == form_type
                    && f.status != FormStatus::Rejected
            })
            .cloned()
            .collect())
    }

    fn form_find_by_number(
        &self,
        jurisdiction_id: JurisdictionId,
        form_number: &str,
    ) -> DocketResult<Option<Form>> {
        Ok(read(&self.forms)?
            .values()
            .find(|f| {
                f.jurisdiction_id == jurisdiction_id
                    && f.status == FormStatus::Approved
                    && f.form_number.as_deref() == Some(form_number)
            })
            .cloned())
    }

    fn field_insert(&self, field: &FormField) -> DocketResult<()> {
        let mut fields = write(&self.fields)?;
        if fields.contains_key(&field.field_id) {
            return Err(DocketError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::FormField,
                reason: "already exists".to_string(),
            }));
        }
        fields.insert(field.field_id, field.clone());
        Ok(())
    }

    fn field_list_by_form(&self, form_id: FormId) -> DocketResult<Vec<FormField>> {
        let mut result: Vec<FormField> = read(&self.fields)?
            .values()
            .filter(|f| f.form_id == form_id)
            .cloned()
            .collect();
        result.sort_by_key(|f| f.position);
        Ok(result)
    }

    fn field_delete_by_form(&self, form_id: FormId) -> DocketResult<()> {
        write(&self.fields)?.retain(|_, f| f.form_id != form_id);
        Ok(())
    }

    // === Jurisdiction Operations ===

    fn jurisdiction_insert(&self, jurisdiction: &Jurisdiction) -> DocketResult<()> {
        let mut jurisdictions = write(&self.jurisdictions)?;
        if jurisdictions.contains_key(&jurisdiction.jurisdiction_id) {
            return Err(DocketError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Jurisdiction,
                reason: "already exists".to_string(),
            }));
        }
        if jurisdictions
            .values()
            .any(|j| j.code == jurisdiction.code)
        {
            return Err(DocketError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Jurisdiction,
                reason: format!("code {} already taken", jurisdiction.code),
            }));
        }
        jurisdictions.insert(jurisdiction.jurisdiction_id, jurisdiction.clone());
        Ok(())
    }

    fn jurisdiction_get(&self, id: JurisdictionId) -> DocketResult<Option<Jurisdiction>> {
        Ok(read(&self.jurisdictions)?.get(&id).cloned())
    }

    fn jurisdiction_find_by_code(&self, code: &str) -> DocketResult<Option<Jurisdiction>> {
        Ok(read(&self.jurisdictions)?
            .values()
            .find(|j| j.code == code)
            .cloned())
    }

    fn jurisdiction_list(&self) -> DocketResult<Vec<Jurisdiction>> {
        Ok(read(&self.jurisdictions)?.values().cloned().collect())
    }

    // === Contributor Stats Operations ===

    fn stats_get(&self, contributor_id: ContributorId) -> DocketResult<Option<ContributorStats>> {
        Ok(read(&self.stats)?.get(&contributor_id).cloned())
    }

    fn stats_upsert_with(
        &self,
        contributor_id: ContributorId,
        mutator: StatsMutator<'_>,
    ) -> DocketResult<ContributorStats> {
        let mut stats = write(&self.stats)?;
        let mut row = stats
            .get(&contributor_id)
            .cloned()
            .unwrap_or_else(|| ContributorStats::new(contributor_id));

        // Mutator failure discards the row copy; nothing is persisted.
        mutator(&mut row)?;

        row.row_version += 1;
        row.updated_at = Utc::now();
        stats.insert(contributor_id, row.clone());
        Ok(row)
    }

    // === Reward Ledger Operations ===

    fn ledger_append(&self, entry: &RewardLedgerEntry) -> DocketResult<()> {
        let mut ledger = write(&self.ledger)?;
        if ledger.contains_key(&entry.entry_id) {
            return Err(DocketError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::RewardLedgerEntry,
                reason: "already exists".to_string(),
            }));
        }
        ledger.insert(entry.entry_id, entry.clone());
        Ok(())
    }

    fn ledger_get(&self, id: LedgerEntryId) -> DocketResult<Option<RewardLedgerEntry>> {
        Ok(read(&self.ledger)?.get(&id).cloned())
    }

    fn ledger_list_by_contributor(
        &self,
        contributor_id: ContributorId,
    ) -> DocketResult<Vec<RewardLedgerEntry>> {
        let mut entries: Vec<RewardLedgerEntry> = read(&self.ledger)?
            .values()
            .filter(|e| e.contributor_id == contributor_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.granted_at);
        Ok(entries)
    }

    fn ledger_has_grant(
        &self,
        contributor_id: ContributorId,
        reward_type: RewardType,
    ) -> DocketResult<bool> {
        Ok(read(&self.ledger)?
            .values()
            .any(|e| e.contributor_id == contributor_id && e.reward_type == reward_type))
    }

    fn ledger_update_flags(
        &self,
        id: LedgerEntryId,
        update: LedgerFlagUpdate,
    ) -> DocketResult<RewardLedgerEntry> {
        let mut ledger = write(&self.ledger)?;
        let entry = ledger
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::RewardLedgerEntry, id))?;
        if let Some(active) = update.active {
            entry.active = active;
        }
        if let Some(used_at) = update.used_at {
            entry.used_at = Some(used_at);
        }
        if let Some(revoked_at) = update.revoked_at {
            entry.revoked_at = Some(revoked_at);
        }
        Ok(entry.clone())
    }

    fn ledger_sweep_expired(&self, now: Timestamp) -> DocketResult<u32> {
        let mut ledger = write(&self.ledger)?;
        let mut swept = 0;
        for entry in ledger.values_mut() {
            if entry.active && entry.expires_at.is_some_and(|e| e <= now) {
                entry.active = false;
                swept += 1;
            }
        }
        Ok(swept)
    }

    // === Feedback Operations ===

    fn feedback_insert(&self, feedback: &FormFeedback) -> DocketResult<()> {
        let mut reports = write(&self.feedback)?;
        if reports.contains_key(&feedback.feedback_id) {
            return Err(DocketError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::FormFeedback,
                reason: "already exists".to_string(),
            }));
        }
        if reports
            .values()
            .any(|f| f.ticket_number == feedback.ticket_number)
        {
            return Err(DocketError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::FormFeedback,
                reason: format!("ticket {} already taken", feedback.ticket_number),
            }));
        }
        reports.insert(feedback.feedback_id, feedback.clone());
        Ok(())
    }

    fn feedback_get(&self, id: FeedbackId) -> DocketResult<Option<FormFeedback>> {
        Ok(read(&self.feedback)?.get(&id).cloned())
    }

    fn feedback_update(&self, id: FeedbackId, update: FeedbackUpdate) -> DocketResult<FormFeedback> {
        let mut reports = write(&self.feedback)?;
        let feedback = reports
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::FormFeedback, id))?;
        if let Some(status) = update.status {
            feedback.status = status;
        }
        if let Some(priority) = update.priority {
            feedback.priority = priority;
        }
        if let Some(assigned_to) = update.assigned_to {
            feedback.assigned_to = Some(assigned_to);
        }
        if let Some(upvotes) = update.upvotes {
            feedback.upvotes = upvotes;
        }
        if let Some(downvotes) = update.downvotes {
            feedback.downvotes = downvotes;
        }
        if let Some(reports_affected) = update.reports_affected {
            feedback.reports_affected = reports_affected;
        }
        if let Some(resolved_at) = update.resolved_at {
            feedback.resolved_at = Some(resolved_at);
        }
        if let Some(note) = update.resolution_note {
            feedback.resolution_note = Some(note);
        }
        Ok(feedback.clone())
    }

    fn feedback_count_matching(
        &self,
        form_id: FormId,
        feedback_type: FeedbackType,
        field_name: Option<&str>,
    ) -> DocketResult<i32> {
        Ok(read(&self.feedback)?
            .values()
            .filter(|f| {
                f.form_id == form_id
                    && f.feedback_type == feedback_type
                    && match field_name {
                        Some(name) => f.field_name.as_deref() == Some(name),
                        None => true,
                    }
            })
            .count() as i32)
    }

    fn feedback_open_assigned_count(&self, reviewer_id: ReviewerId) -> DocketResult<i32> {
        Ok(read(&self.feedback)?
            .values()
            .filter(|f| f.assigned_to == Some(reviewer_id) && f.status.is_open())
            .count() as i32)
    }

    fn feedback_list_assigned(&self, reviewer_id: ReviewerId) -> DocketResult<Vec<FormFeedback>> {
        let mut result: Vec<FormFeedback> = read(&self.feedback)?
            .values()
            .filter(|f| f.assigned_to == Some(reviewer_id) && f.status.is_open())
            .cloned()
            .collect();
        result.sort_by_key(|f| f.submitted_at);
        Ok(result)
    }

    fn feedback_claim_least_loaded(
        &self,
        feedback_id: FeedbackId,
    ) -> DocketResult<Option<Reviewer>> {
        // Lock order: feedback before reviewers.
        let mut reports = write(&self.feedback)?;
        let reviewers = read(&self.reviewers)?;

        if !reports.contains_key(&feedback_id) {
            return Err(not_found(EntityType::FormFeedback, feedback_id));
        }

        let chosen = reviewers
            .values()
            .filter(|r| r.active)
            .map(|r| {
                let load = reports
                    .values()
                    .filter(|f| f.assigned_to == Some(r.reviewer_id) && f.status.is_open())
                    .count();
                (load, r.reviewer_id, r.clone())
            })
            .min_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)))
            .map(|(_, _, r)| r);

        if let Some(reviewer) = &chosen {
            let feedback = reports
                .get_mut(&feedback_id)
                .ok_or_else(|| not_found(EntityType::FormFeedback, feedback_id))?;
            feedback.assigned_to = Some(reviewer.reviewer_id);
            feedback.status = FeedbackStatus::Triaged;
        }

        Ok(chosen)
    }

    // === Reviewer Operations ===

    fn reviewer_upsert(&self, reviewer: &Reviewer) -> DocketResult<()> {
        write(&self.reviewers)?.insert(reviewer.reviewer_id, reviewer.clone());
        Ok(())
    }

    fn reviewer_get(&self, id: ReviewerId) -> DocketResult<Option<Reviewer>> {
        Ok(read(&self.reviewers)?.get(&id).cloned())
    }

    fn reviewer_list_active(&self) -> DocketResult<Vec<Reviewer>> {
        let mut result: Vec<Reviewer> = read(&self.reviewers)?
            .values()
            .filter(|r| r.active)
            .cloned()
            .collect();
        result.sort_by_key(|r| r.reviewer_id);
        Ok(result)
    }

    // === Ticket Sequence ===

    fn next_ticket_seq(&self, date: NaiveDate) -> DocketResult<u32> {
        let mut seqs = write(&self.ticket_seqs)?;
        let seq = seqs.entry(date).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    // === Diagnostics ===

    fn statistics(&self) -> DocketResult<StorageStatistics> {
        Ok(StorageStatistics {
            forms: read(&self.forms)?.len(),
            form_fields: read(&self.fields)?.len(),
            jurisdictions: read(&self.jurisdictions)?.len(),
            contributor_stats: read(&self.stats)?.len(),
            ledger_entries: read(&self.ledger)?.len(),
            feedback_reports: read(&self.feedback)?.len(),
            reviewers: read(&self.reviewers)?.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{
        compute_content_hash, new_entity_id, FeedbackPriority, FormDraft, ValidationError,
    };

    fn sample_form() -> Form {
        let draft = FormDraft {
            title: "Motion for Continuance".to_string(),
            form_number: None,
            form_type: "motion".to_string(),
            jurisdiction_id: new_entity_id(),
            content_hash: compute_content_hash(b"motion body"),
            page_count: 2,
            fields: vec![],
        };
        Form::from_draft(&draft, new_entity_id())
    }

    fn sample_feedback(form_id: FormId, ticket: &str) -> FormFeedback {
        FormFeedback {
            feedback_id: new_entity_id(),
            form_id,
            user_id: new_entity_id(),
            feedback_type: FeedbackType::FieldError,
            severity: 3,
            priority: FeedbackPriority::High,
            status: FeedbackStatus::Received,
            field_name: Some("signature".to_string()),
            description: "signature line missing".to_string(),
            assigned_to: None,
            upvotes: 0,
            downvotes: 0,
            users_affected: 1,
            reports_affected: 1,
            ticket_number: ticket.to_string(),
            submitted_at: Utc::now(),
            resolved_at: None,
            resolution_note: None,
        }
    }

    #[test]
    fn test_form_insert_and_get() {
        let storage = MockStorage::new();
        let form = sample_form();
        storage.form_insert(&form).unwrap();
        assert_eq!(storage.form_get(form.form_id).unwrap(), Some(form.clone()));
        assert!(storage.form_insert(&form).is_err());
    }

    #[test]
    fn test_form_update_version_conflict() {
        let storage = MockStorage::new();
        let form = sample_form();
        storage.form_insert(&form).unwrap();

        let updated = storage
            .form_update(
                form.form_id,
                FormUpdate {
                    status: Some(FormStatus::Approved),
                    expected_version: Some(1),
                    ..FormUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.version, 2);

        // Replaying with the stale version loses the race.
        let result = storage.form_update(
            form.form_id,
            FormUpdate {
                status: Some(FormStatus::Rejected),
                expected_version: Some(1),
                ..FormUpdate::default()
            },
        );
        assert!(matches!(
            result,
            Err(DocketError::Storage(StorageError::Conflict { .. }))
        ));
    }

    #[test]
    fn test_stats_mutator_error_discards_mutation() {
        let storage = MockStorage::new();
        let contributor = new_entity_id();

        storage
            .stats_upsert_with(contributor, &mut |stats| {
                stats.forms_submitted += 1;
                Ok(())
            })
            .unwrap();

        let result = storage.stats_upsert_with(contributor, &mut |stats| {
            stats.forms_submitted += 100;
            Err(ValidationError::ConstraintViolation {
                constraint: "test".to_string(),
                reason: "forced".to_string(),
            }
            .into())
        });
        assert!(result.is_err());

        let stats = storage.stats_get(contributor).unwrap().unwrap();
        assert_eq!(stats.forms_submitted, 1);
        assert_eq!(stats.row_version, 1);
    }

    #[test]
    fn test_ticket_sequence_is_per_day() {
        let storage = MockStorage::new();
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2026, 8, 8).unwrap();
        assert_eq!(storage.next_ticket_seq(today).unwrap(), 1);
        assert_eq!(storage.next_ticket_seq(today).unwrap(), 2);
        assert_eq!(storage.next_ticket_seq(tomorrow).unwrap(), 1);
        assert_eq!(storage.next_ticket_seq(today).unwrap(), 3);
    }

    #[test]
    fn test_claim_least_loaded_prefers_idle_reviewer() {
        let storage = MockStorage::new();
        let busy = Reviewer {
            reviewer_id: new_entity_id(),
            name: "busy".to_string(),
            active: true,
            specialties: vec![],
        };
        let idle = Reviewer {
            reviewer_id: new_entity_id(),
            name: "idle".to_string(),
            active: true,
            specialties: vec![],
        };
        storage.reviewer_upsert(&busy).unwrap();
        storage.reviewer_upsert(&idle).unwrap();

        let form_id = new_entity_id();
        let mut open = sample_feedback(form_id, "FB-20260807-0001");
        open.assigned_to = Some(busy.reviewer_id);
        open.status = FeedbackStatus::Triaged;
        storage.feedback_insert(&open).unwrap();

        let fresh = sample_feedback(form_id, "FB-20260807-0002");
        storage.feedback_insert(&fresh).unwrap();

        let claimed = storage
            .feedback_claim_least_loaded(fresh.feedback_id)
            .unwrap()
            .unwrap();
        assert_eq!(claimed.reviewer_id, idle.reviewer_id);

        let stored = storage.feedback_get(fresh.feedback_id).unwrap().unwrap();
        assert_eq!(stored.assigned_to, Some(idle.reviewer_id));
        assert_eq!(stored.status, FeedbackStatus::Triaged);
    }

    #[test]
    fn test_claim_least_loaded_tie_breaks_by_reviewer_id() {
        let storage = MockStorage::new();
        let mut ids = vec![new_entity_id(), new_entity_id(), new_entity_id()];
        ids.sort();
        for (i, id) in ids.iter().enumerate() {
            storage
                .reviewer_upsert(&Reviewer {
                    reviewer_id: *id,
                    name: format!("reviewer-{i}"),
                    active: true,
                    specialties: vec![],
                })
                .unwrap();
        }

        let fresh = sample_feedback(new_entity_id(), "FB-20260807-0001");
        storage.feedback_insert(&fresh).unwrap();
        let claimed = storage
            .feedback_claim_least_loaded(fresh.feedback_id)
            .unwrap()
            .unwrap();
        assert_eq!(claimed.reviewer_id, ids[0]);
    }

    #[test]
    fn test_claim_with_no_active_reviewers() {
        let storage = MockStorage::new();
        storage
            .reviewer_upsert(&Reviewer {
                reviewer_id: new_entity_id(),
                name: "retired".to_string(),
                active: false,
                specialties: vec![],
            })
            .unwrap();
        let fresh = sample_feedback(new_entity_id(), "FB-20260807-0001");
        storage.feedback_insert(&fresh).unwrap();
        assert!(storage
            .feedback_claim_least_loaded(fresh.feedback_id)
            .unwrap()
            .is_none());
        // The report stays unassigned.
        let stored = storage.feedback_get(fresh.feedback_id).unwrap().unwrap();
        assert_eq!(stored.assigned_to, None);
        assert_eq!(stored.status, FeedbackStatus::Received);
    }

    #[test]
    fn test_duplicate_ticket_number_rejected() {
        let storage = MockStorage::new();
        let form_id = new_entity_id();
        storage
            .feedback_insert(&sample_feedback(form_id, "FB-20260807-0001"))
            .unwrap();
        let result = storage.feedback_insert(&sample_feedback(form_id, "FB-20260807-0001"));
        assert!(matches!(
            result,
            Err(DocketError::Storage(StorageError::InsertFailed { .. }))
        ));
    }

    #[test]
    fn test_ledger_sweep_expired() {
        let storage = MockStorage::new();
        let contributor = new_entity_id();
        let fresh =
            RewardLedgerEntry::page_milestone(contributor, new_entity_id(), 1, 10, 365);
        let mut stale =
            RewardLedgerEntry::page_milestone(contributor, new_entity_id(), 1, 20, 365);
        stale.expires_at = Some(Utc::now() - chrono::Duration::days(1));
        storage.ledger_append(&fresh).unwrap();
        storage.ledger_append(&stale).unwrap();

        assert_eq!(storage.ledger_sweep_expired(Utc::now()).unwrap(), 1);
        assert!(storage.ledger_get(fresh.entry_id).unwrap().unwrap().active);
        assert!(!storage.ledger_get(stale.entry_id).unwrap().unwrap().active);
        // Second sweep finds nothing left.
        assert_eq!(storage.ledger_sweep_expired(Utc::now()).unwrap(), 0);
    }

    #[test]
    fn test_feedback_count_matching_scopes_by_field() {
        let storage = MockStorage::new();
        let form_id = new_entity_id();
        let mut a = sample_feedback(form_id, "FB-20260807-0001");
        a.field_name = Some("signature".to_string());
        let mut b = sample_feedback(form_id, "FB-20260807-0002");
        b.field_name = Some("date".to_string());
        storage.feedback_insert(&a).unwrap();
        storage.feedback_insert(&b).unwrap();

        assert_eq!(
            storage
                .feedback_count_matching(form_id, FeedbackType::FieldError, Some("signature"))
                .unwrap(),
            1
        );
        assert_eq!(
            storage
                .feedback_count_matching(form_id, FeedbackType::FieldError, None)
                .unwrap(),
            2
        );
        assert_eq!(
            storage
                .feedback_count_matching(form_id, FeedbackType::ContentIssue, None)
                .unwrap(),
            0
        );
    }
}
