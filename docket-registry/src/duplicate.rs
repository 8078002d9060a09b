//! Duplicate-submission detection
//!
//! Three checks, in priority order: exact content hash (confidence 100,
//! short-circuits everything else), normalized title similarity against the
//! candidate set, and official form number within the jurisdiction. The
//! submission is flagged a duplicate iff any match reaches the configured
//! confidence floor.

use docket_core::{
    DocketConfig, DocketResult, DuplicateMatch, DuplicateReport, FormDraft, FormId, MatchType,
};
use docket_storage::StorageTrait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct DuplicateDetector {
    storage: Arc<dyn StorageTrait>,
    config: DocketConfig,
}

impl DuplicateDetector {
    pub fn new(storage: Arc<dyn StorageTrait>, config: DocketConfig) -> Self {
        Self { storage, config }
    }

    /// Run duplicate detection for a draft. `exclude` skips one form ID,
    /// used when a revised form is resubmitted and must not match itself.
    pub fn detect(&self, draft: &FormDraft, exclude: Option<FormId>) -> DocketResult<DuplicateReport> {
        // Hash match wins outright; similarity is not computed once the
        // content is known to be byte-identical.
        let hash_hits: Vec<DuplicateMatch> = self
            .storage
            .form_find_by_content_hash(&draft.content_hash)?
            .into_iter()
            .filter(|f| Some(f.form_id) != exclude)
            .map(|f| DuplicateMatch {
                form_id: f.form_id,
                match_type: MatchType::ContentHash,
                confidence: 100,
            })
            .collect();
        if !hash_hits.is_empty() {
            debug!(hits = hash_hits.len(), "content hash collision");
            return Ok(self.finish(hash_hits));
        }

        let mut matches: Vec<DuplicateMatch> = Vec::new();

        let candidates = self
            .storage
            .form_find_candidates(draft.jurisdiction_id, &draft.form_type)?;
        debug!(candidates = candidates.len(), "scanning title candidates");
        let title = normalize_title(&draft.title);
        for candidate in &candidates {
            if Some(candidate.form_id) == exclude {
                continue;
            }
            let ratio = strsim::jaro_winkler(&title, &normalize_title(&candidate.title));
            if ratio >= self.config.title_similarity_threshold {
                matches.push(DuplicateMatch {
                    form_id: candidate.form_id,
                    match_type: MatchType::TitleSimilarity,
                    confidence: (ratio * 100.0).round() as u8,
                });
            }
        }

        if let Some(number) = &draft.form_number {
            if let Some(existing) = self
                .storage
                .form_find_by_number(draft.jurisdiction_id, number)?
            {
                if Some(existing.form_id) != exclude {
                    matches.push(DuplicateMatch {
                        form_id: existing.form_id,
                        match_type: MatchType::FormNumber,
                        confidence: 95,
                    });
                }
            }
        }

        Ok(self.finish(matches))
    }

    /// Dedupe by form (keeping the strongest match), sort by descending
    /// confidence (form ID ascending on ties, for determinism), truncate,
    /// and set the duplicate flag.
    fn finish(&self, matches: Vec<DuplicateMatch>) -> DuplicateReport {
        let mut best: HashMap<FormId, DuplicateMatch> = HashMap::new();
        for m in matches {
            match best.get(&m.form_id) {
                Some(existing) if existing.confidence >= m.confidence => {}
                _ => {
                    best.insert(m.form_id, m);
                }
            }
        }
        let mut matches: Vec<DuplicateMatch> = best.into_values().collect();
        matches.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then(a.form_id.cmp(&b.form_id))
        });
        matches.truncate(self.config.max_duplicate_matches);

        let is_duplicate = matches
            .iter()
            .any(|m| m.confidence >= self.config.duplicate_confidence_floor);
        DuplicateReport {
            is_duplicate,
            matches,
        }
    }
}

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{compute_content_hash, new_entity_id, Form, FormStatus, JurisdictionId};
    use docket_storage::{FormUpdate, MockStorage};

    fn draft(title: &str, jurisdiction_id: JurisdictionId, content: &[u8]) -> FormDraft {
        FormDraft {
            title: title.to_string(),
            form_number: None,
            form_type: "motion".to_string(),
            jurisdiction_id,
            content_hash: compute_content_hash(content),
            page_count: 3,
            fields: vec![],
        }
    }

    fn seed(storage: &MockStorage, draft: &FormDraft) -> Form {
        let form = Form::from_draft(draft, new_entity_id());
        storage.form_insert(&form).unwrap();
        form
    }

    fn detector(storage: Arc<MockStorage>) -> DuplicateDetector {
        DuplicateDetector::new(storage, DocketConfig::default())
    }

    #[test]
    fn test_identical_content_is_hash_match() {
        let storage = Arc::new(MockStorage::new());
        let jurisdiction = new_entity_id();
        let first = draft("Motion to Dismiss", jurisdiction, b"body");
        seed(&storage, &first);

        // Different title, same bytes: the hash check fires before any
        // similarity scan.
        let second = draft("Totally Different Title", jurisdiction, b"body");
        let report = detector(storage).detect(&second, None).unwrap();
        assert!(report.is_duplicate);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].match_type, MatchType::ContentHash);
        assert_eq!(report.matches[0].confidence, 100);
    }

    #[test]
    fn test_one_character_title_difference_matches() {
        let storage = Arc::new(MockStorage::new());
        let jurisdiction = new_entity_id();
        seed(
            &storage,
            &draft("Motion for Summary Judgement", jurisdiction, b"original"),
        );

        let report = detector(storage)
            .detect(
                &draft("Motion for Summary Judgment", jurisdiction, b"revised"),
                None,
            )
            .unwrap();
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].match_type, MatchType::TitleSimilarity);
        assert!(report.matches[0].confidence >= 85);
    }

    #[test]
    fn test_unrelated_title_is_clean() {
        let storage = Arc::new(MockStorage::new());
        let jurisdiction = new_entity_id();
        seed(
            &storage,
            &draft("Petition for Dissolution of Marriage", jurisdiction, b"a"),
        );

        let report = detector(storage)
            .detect(&draft("Notice of Appeal", jurisdiction, b"b"), None)
            .unwrap();
        assert!(!report.is_duplicate);
        assert!(report.matches.is_empty());
    }

    #[test]
    fn test_rejected_forms_are_not_candidates() {
        let storage = Arc::new(MockStorage::new());
        let jurisdiction = new_entity_id();
        let form = seed(&storage, &draft("Motion to Compel", jurisdiction, b"a"));
        storage
            .form_update(
                form.form_id,
                FormUpdate {
                    status: Some(FormStatus::Rejected),
                    ..FormUpdate::default()
                },
            )
            .unwrap();

        let report = detector(storage)
            .detect(&draft("Motion to Compel", jurisdiction, b"b"), None)
            .unwrap();
        assert!(report.matches.is_empty());
    }

    #[test]
    fn test_form_number_match_requires_approval() {
        let storage = Arc::new(MockStorage::new());
        let jurisdiction = new_entity_id();
        let mut existing = draft("Fee Waiver Request", jurisdiction, b"a");
        existing.form_number = Some("FW-001".to_string());
        let form = seed(&storage, &existing);

        let mut incoming = draft("Request re Fees", jurisdiction, b"b");
        incoming.form_number = Some("FW-001".to_string());

        let detector = detector(storage.clone());
        // Pending holder of the number does not trigger the check.
        let report = detector.detect(&incoming, None).unwrap();
        assert!(report
            .matches
            .iter()
            .all(|m| m.match_type != MatchType::FormNumber));

        storage
            .form_update(
                form.form_id,
                FormUpdate {
                    status: Some(FormStatus::Approved),
                    ..FormUpdate::default()
                },
            )
            .unwrap();
        let report = detector.detect(&incoming, None).unwrap();
        assert!(report.is_duplicate);
        assert_eq!(report.matches[0].match_type, MatchType::FormNumber);
        assert_eq!(report.matches[0].confidence, 95);
    }

    #[test]
    fn test_matches_sorted_and_truncated() {
        let storage = Arc::new(MockStorage::new());
        let jurisdiction = new_entity_id();
        for i in 0..8 {
            seed(
                &storage,
                &draft("Motion to Dismiss", jurisdiction, format!("body-{i}").as_bytes()),
            );
        }

        let report = detector(storage)
            .detect(&draft("Motion to Dismiss", jurisdiction, b"fresh"), None)
            .unwrap();
        assert!(report.is_duplicate);
        assert_eq!(report.matches.len(), 5);
        for pair in report.matches.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_exclude_skips_own_form_on_resubmission() {
        let storage = Arc::new(MockStorage::new());
        let jurisdiction = new_entity_id();
        let own = draft("Motion to Seal Records", jurisdiction, b"v1");
        let form = seed(&storage, &own);

        let revised = draft("Motion to Seal Records", jurisdiction, b"v2");
        let report = detector(storage)
            .detect(&revised, Some(form.form_id))
            .unwrap();
        assert!(!report.is_duplicate);
        assert!(report.matches.is_empty());
    }
}
