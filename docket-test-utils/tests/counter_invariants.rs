//! Counter consistency under arbitrary operation sequences.

use docket_registry::ReviewAction;
use docket_test_utils::{
    approve_checklist, new_entity_id, sample_draft, FormStatus, StorageTrait, TestHarness,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Decision {
    Approve,
    Reject,
    Revise,
    Leave,
}

fn any_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![
        Just(Decision::Approve),
        Just(Decision::Reject),
        Just(Decision::Revise),
        Just(Decision::Leave),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// However a batch of submissions is decided, the counters add up:
    /// terminal and pending forms never exceed submissions, nothing goes
    /// negative, and every approval is reflected exactly once.
    #[test]
    fn counters_stay_consistent(decisions in prop::collection::vec(any_decision(), 1..12)) {
        let harness = TestHarness::new();
        let court = harness.alameda_superior();
        let contributor = new_entity_id();
        let reviewer = new_entity_id();

        let mut approved = 0;
        for (i, decision) in decisions.iter().enumerate() {
            // Distinct form types keep every submission out of the previous
            // submissions' duplicate-candidate sets.
            let mut draft = sample_draft(
                court.jurisdiction_id,
                &format!("Distinct Filing Number {i}"),
                format!("body-{i}").as_bytes(),
            );
            draft.form_type = format!("motion-{i}");
            let form = harness.lifecycle.submit(&draft, contributor).unwrap();

            match decision {
                Decision::Approve => {
                    harness
                        .lifecycle
                        .review(
                            form.form_id,
                            &ReviewAction::Approve { score: 4.0 },
                            reviewer,
                            &approve_checklist(),
                        )
                        .unwrap();
                    approved += 1;
                }
                Decision::Reject => {
                    harness
                        .lifecycle
                        .review(
                            form.form_id,
                            &ReviewAction::Reject { reason: None },
                            reviewer,
                            &approve_checklist(),
                        )
                        .unwrap();
                }
                Decision::Revise => {
                    harness
                        .lifecycle
                        .review(
                            form.form_id,
                            &ReviewAction::RequestRevision {
                                changes: vec!["tighten the caption".to_string()],
                                deadline: None,
                            },
                            reviewer,
                            &approve_checklist(),
                        )
                        .unwrap();
                }
                Decision::Leave => {}
            }

            let stats = harness.storage.stats_get(contributor).unwrap().unwrap();
            prop_assert!(stats.forms_pending >= 0);
            prop_assert!(
                stats.forms_approved + stats.forms_rejected + stats.forms_pending
                    <= stats.forms_submitted
            );
            prop_assert_eq!(stats.forms_approved, approved);
        }

        // Stored statuses agree with the counters.
        let stats = harness.storage.stats_get(contributor).unwrap().unwrap();
        let pending = harness
            .storage
            .form_list_by_status(FormStatus::Pending)
            .unwrap()
            .len() as i32;
        prop_assert_eq!(stats.forms_pending, pending);
        prop_assert_eq!(stats.forms_submitted, decisions.len() as i32);
    }
}
