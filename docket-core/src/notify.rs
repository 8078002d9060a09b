//! Notification sink collaborator interface
//!
//! Outbound delivery (email, websockets, chat hooks) is owned by the host.
//! The engines emit fire-and-forget events through `NotificationSink`;
//! delivery failures are logged by the caller and never roll back the
//! operation that produced them.

use crate::{
    ContributorId, FeedbackId, FeedbackPriority, FeedbackType, FormId, ReviewDecision, ReviewerId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Events broadcast to the host's notification infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotificationEvent {
    /// A new form entered the review queue.
    FormPendingReview {
        form_id: FormId,
        contributor_id: ContributorId,
    },

    /// A reviewer handed down a decision.
    FormReviewed {
        form_id: FormId,
        contributor_id: ContributorId,
        decision: ReviewDecision,
        reward_granted: bool,
    },

    /// Trend detection found repeated reports of the same issue.
    TrendingIssue {
        form_id: FormId,
        feedback_type: FeedbackType,
        field_name: Option<String>,
        report_count: i32,
    },

    /// A feedback report was assigned to a reviewer.
    FeedbackAssigned {
        feedback_id: FeedbackId,
        reviewer_id: ReviewerId,
        priority: FeedbackPriority,
        ticket_number: String,
    },
}

/// Delivery failure reported by a sink. Swallowed and logged by the engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError(pub String);

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Notification delivery failed: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Fire-and-forget notification sink.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: NotificationEvent) -> Result<(), NotifyError>;
}

/// Sink that drops every event. Default for hosts without notifications.
#[derive(Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _event: NotificationEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Sink that records every event for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, event: NotificationEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .map_err(|_| NotifyError("recording sink poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;

    #[test]
    fn test_recording_sink_captures_events() {
        let sink = RecordingSink::new();
        let event = NotificationEvent::FormPendingReview {
            form_id: new_entity_id(),
            contributor_id: new_entity_id(),
        };
        sink.notify(event.clone()).unwrap();
        assert_eq!(sink.events(), vec![event]);
    }

    #[test]
    fn test_event_serde_tagging() {
        let event = NotificationEvent::TrendingIssue {
            form_id: new_entity_id(),
            feedback_type: FeedbackType::FieldError,
            field_name: Some("signature".to_string()),
            report_count: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TrendingIssue");
        assert_eq!(json["report_count"], 3);
    }
}
