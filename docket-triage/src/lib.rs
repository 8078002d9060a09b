//! DOCKET Triage - Feedback Prioritization and Assignment
//!
//! Accepts structured defect reports against forms, derives priority from
//! type and severity, detects trending issues, and load-balances high and
//! urgent reports across active reviewers. Ticket numbers come from the
//! storage layer's atomic per-day sequence; reviewer selection is a single
//! atomic read-and-claim. The engine itself never counts rows to number a
//! ticket and never picks a reviewer outside the claim call.

use chrono::Utc;
use docket_core::{
    DocketConfig, DocketResult, EntityType, FeedbackId, FeedbackPriority, FeedbackReport,
    FeedbackStatus, FeedbackType, FormFeedback, NotificationEvent, NotificationSink, ReviewerId,
    StorageError, Timestamp, TriageError, ValidationError, VoteDirection, new_entity_id,
};
use docket_storage::{FeedbackUpdate, StorageTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// OUTCOME TYPES
// ============================================================================

/// Receipt returned to the reporting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageReceipt {
    pub feedback_id: FeedbackId,
    pub ticket_number: String,
    pub priority: FeedbackPriority,
    pub estimated_response_hours: i64,
}

/// Updated counts after a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub upvotes: i32,
    pub downvotes: i32,
    pub impact_score: i32,
    pub priority: FeedbackPriority,
}

// ============================================================================
// PURE DERIVATIONS
// ============================================================================

/// Severity-derived priority.
///
/// Critical types (field errors, content issues, wrong jurisdiction,
/// outdated forms) affect filed documents and use the stricter table.
pub fn derive_priority(feedback_type: FeedbackType, severity: u8) -> FeedbackPriority {
    if feedback_type.is_critical() {
        match severity {
            s if s >= 4 => FeedbackPriority::Urgent,
            3 => FeedbackPriority::High,
            _ => FeedbackPriority::Normal,
        }
    } else {
        match severity {
            5 => FeedbackPriority::High,
            3 | 4 => FeedbackPriority::Normal,
            _ => FeedbackPriority::Low,
        }
    }
}

/// Community impact score: severity and net votes, scaled by reach.
/// The reach factor floors at 1 so vote volume alone can escalate a report
/// whose audience size is unknown.
pub fn impact_score(severity: u8, upvotes: i32, downvotes: i32, users_affected: i32) -> i32 {
    let base = i32::from(severity) * 20 + (upvotes - downvotes) * 5;
    let reach = (f64::from(users_affected) / 10.0).clamp(1.0, 3.0);
    (f64::from(base) * reach).round() as i32
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct TriageEngine {
    storage: Arc<dyn StorageTrait>,
    notifier: Arc<dyn NotificationSink>,
    config: DocketConfig,
}

impl TriageEngine {
    pub fn new(
        storage: Arc<dyn StorageTrait>,
        notifier: Arc<dyn NotificationSink>,
        config: DocketConfig,
    ) -> Self {
        Self {
            storage,
            notifier,
            config,
        }
    }

    /// File a report against a form. Fails with `NotFound` when the form
    /// does not exist and `InvalidSeverity` outside the 1-5 scale.
    pub fn submit(&self, report: &FeedbackReport) -> DocketResult<TriageReceipt> {
        if !(1..=5).contains(&report.severity) {
            return Err(TriageError::InvalidSeverity {
                severity: report.severity,
            }
            .into());
        }
        if report.description.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "description".to_string(),
            }
            .into());
        }
        if self.storage.form_get(report.form_id)?.is_none() {
            return Err(StorageError::NotFound {
                entity_type: EntityType::Form,
                id: report.form_id,
            }
            .into());
        }

        let mut priority = derive_priority(report.feedback_type, report.severity);

        // Trend detection counts this report along with the stored ones.
        let sibling_count = self.storage.feedback_count_matching(
            report.form_id,
            report.feedback_type,
            report.field_name.as_deref(),
        )?;
        let report_count = sibling_count + 1;
        let trending = report_count >= self.config.trend_report_threshold;
        if trending {
            priority = priority.max(FeedbackPriority::High);
        }

        let now = Utc::now();
        let ticket_number = self.allocate_ticket(now)?;
        let feedback = FormFeedback {
            feedback_id: new_entity_id(),
            form_id: report.form_id,
            user_id: report.user_id,
            feedback_type: report.feedback_type,
            severity: report.severity,
            priority,
            status: FeedbackStatus::Received,
            field_name: report.field_name.clone(),
            description: report.description.clone(),
            assigned_to: None,
            upvotes: 0,
            downvotes: 0,
            users_affected: report.users_affected.unwrap_or(1).max(1),
            reports_affected: report_count,
            ticket_number: ticket_number.clone(),
            submitted_at: now,
            resolved_at: None,
            resolution_note: None,
        };
        self.storage.feedback_insert(&feedback)?;
        info!(
            feedback_id = %feedback.feedback_id,
            ticket = %ticket_number,
            priority = %priority,
            "feedback received"
        );

        if trending {
            debug!(
                form_id = %report.form_id,
                report_count,
                "trending issue detected"
            );
            self.emit(NotificationEvent::TrendingIssue {
                form_id: report.form_id,
                feedback_type: report.feedback_type,
                field_name: report.field_name.clone(),
                report_count,
            });
        }

        if priority.requires_assignment() {
            self.assign(&feedback.feedback_id, priority, &ticket_number)?;
        }

        Ok(TriageReceipt {
            feedback_id: feedback.feedback_id,
            ticket_number,
            priority,
            estimated_response_hours: priority.response_target_hours(),
        })
    }

    /// Record a vote. Crossing the impact threshold escalates a Normal
    /// report to High and triggers assignment.
    pub fn vote(&self, feedback_id: FeedbackId, direction: VoteDirection) -> DocketResult<VoteOutcome> {
        let feedback = self.get_feedback(feedback_id)?;
        if feedback.status.is_terminal() {
            return Err(TriageError::TerminalFeedback {
                feedback_id,
                status: feedback.status,
            }
            .into());
        }

        let (upvotes, downvotes) = match direction {
            VoteDirection::Up => (feedback.upvotes + 1, feedback.downvotes),
            VoteDirection::Down => (feedback.upvotes, feedback.downvotes + 1),
        };
        let score = impact_score(feedback.severity, upvotes, downvotes, feedback.users_affected);

        let mut update = FeedbackUpdate {
            upvotes: Some(upvotes),
            downvotes: Some(downvotes),
            ..FeedbackUpdate::default()
        };
        let escalate = feedback.priority == FeedbackPriority::Normal
            && score >= self.config.impact_escalation_threshold;
        if escalate {
            update.priority = Some(FeedbackPriority::High);
        }
        let updated = self.storage.feedback_update(feedback_id, update)?;

        if escalate {
            info!(
                feedback_id = %feedback_id,
                score,
                "impact threshold crossed, escalating"
            );
            if updated.assigned_to.is_none() {
                self.assign(&feedback_id, FeedbackPriority::High, &updated.ticket_number)?;
            }
        }

        Ok(VoteOutcome {
            upvotes,
            downvotes,
            impact_score: score,
            priority: if escalate {
                FeedbackPriority::High
            } else {
                feedback.priority
            },
        })
    }

    /// Move a report through the triage workflow. Terminal states stamp the
    /// resolution time and note.
    pub fn update_status(
        &self,
        feedback_id: FeedbackId,
        new_status: FeedbackStatus,
        resolver_id: ReviewerId,
        note: Option<String>,
    ) -> DocketResult<FormFeedback> {
        let feedback = self.get_feedback(feedback_id)?;
        if feedback.status.is_terminal() {
            return Err(TriageError::TerminalFeedback {
                feedback_id,
                status: feedback.status,
            }
            .into());
        }
        if !feedback.status.can_transition_to(new_status) {
            return Err(TriageError::IllegalTransition {
                from: feedback.status,
                to: new_status,
            }
            .into());
        }

        let mut update = FeedbackUpdate {
            status: Some(new_status),
            ..FeedbackUpdate::default()
        };
        if feedback.assigned_to.is_none() {
            update.assigned_to = Some(resolver_id);
        }
        if new_status.is_terminal() {
            update.resolved_at = Some(Utc::now());
            update.resolution_note = note;
        }
        let updated = self.storage.feedback_update(feedback_id, update)?;
        info!(
            feedback_id = %feedback_id,
            from = %feedback.status,
            to = %new_status,
            "feedback status updated"
        );
        Ok(updated)
    }

    /// Open reports assigned to a reviewer, oldest first.
    pub fn queue_for(&self, reviewer_id: ReviewerId) -> DocketResult<Vec<FormFeedback>> {
        self.storage.feedback_list_assigned(reviewer_id)
    }

    /// Current open load of a reviewer.
    pub fn open_count(&self, reviewer_id: ReviewerId) -> DocketResult<i32> {
        self.storage.feedback_open_assigned_count(reviewer_id)
    }

    /// Date-scoped ticket number from the storage layer's atomic sequence.
    fn allocate_ticket(&self, now: Timestamp) -> DocketResult<String> {
        let date = now.date_naive();
        let seq = self.storage.next_ticket_seq(date)?;
        Ok(format!(
            "{}-{}-{seq:04}",
            self.config.ticket_prefix,
            date.format("%Y%m%d")
        ))
    }

    /// Atomic least-loaded claim. No active reviewer is not an error: the
    /// report simply stays in the received queue.
    fn assign(
        &self,
        feedback_id: &FeedbackId,
        priority: FeedbackPriority,
        ticket_number: &str,
    ) -> DocketResult<()> {
        match self.storage.feedback_claim_least_loaded(*feedback_id)? {
            Some(reviewer) => {
                info!(
                    feedback_id = %feedback_id,
                    reviewer_id = %reviewer.reviewer_id,
                    "feedback assigned"
                );
                self.emit(NotificationEvent::FeedbackAssigned {
                    feedback_id: *feedback_id,
                    reviewer_id: reviewer.reviewer_id,
                    priority,
                    ticket_number: ticket_number.to_string(),
                });
            }
            None => {
                debug!(feedback_id = %feedback_id, "no active reviewer to assign");
            }
        }
        Ok(())
    }

    fn get_feedback(&self, feedback_id: FeedbackId) -> DocketResult<FormFeedback> {
        self.storage.feedback_get(feedback_id)?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::FormFeedback,
                id: feedback_id,
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
