//! Jurisdiction directory
//!
//! Normalizes raw jurisdiction descriptors into canonical records and
//! dedupes them on the normalized code. All nodes live in the storage
//! arena; the parent/child hierarchy is a lookup relation on stored IDs,
//! so the state → county → court chain never forms a cyclic object graph.

use chrono::Utc;
use docket_core::{
    new_entity_id, CourtType, DocketResult, EntityType, Jurisdiction, JurisdictionDescriptor,
    JurisdictionId, StorageError, ValidationError,
};
use docket_storage::StorageTrait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9-]{2,64}$").expect("code pattern is valid"));

pub struct JurisdictionDirectory {
    storage: Arc<dyn StorageTrait>,
}

impl JurisdictionDirectory {
    pub fn new(storage: Arc<dyn StorageTrait>) -> Self {
        Self { storage }
    }

    /// Resolve a descriptor to its canonical record, creating the record
    /// (and any missing ancestors) on first sight. Returns the deepest
    /// node: court level if a court type was given, county level if only a
    /// county, otherwise the state node.
    pub fn resolve_or_create(
        &self,
        descriptor: &JurisdictionDescriptor,
    ) -> DocketResult<Jurisdiction> {
        let state_code = normalize_segment(&descriptor.state);
        validate_code(&state_code, "state")?;
        let state = self.get_or_insert(&state_code, descriptor, None, Level::State)?;

        let county_node = match &descriptor.county {
            Some(county) => {
                let code = format!("{state_code}-{}", normalize_segment(county));
                validate_code(&code, "county")?;
                Some(self.get_or_insert(&code, descriptor, Some(state.jurisdiction_id), Level::County)?)
            }
            None => None,
        };

        match descriptor.court_type {
            Some(court_type) => {
                let parent = county_node.as_ref().unwrap_or(&state);
                let code = format!("{}-{}", parent.code, court_segment(court_type));
                validate_code(&code, "court_type")?;
                self.get_or_insert(&code, descriptor, Some(parent.jurisdiction_id), Level::Court)
            }
            None => Ok(county_node.unwrap_or(state)),
        }
    }

    pub fn get(&self, id: JurisdictionId) -> DocketResult<Jurisdiction> {
        self.storage.jurisdiction_get(id)?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::Jurisdiction,
                id,
            }
            .into()
        })
    }

    pub fn find_by_code(&self, code: &str) -> DocketResult<Option<Jurisdiction>> {
        self.storage.jurisdiction_find_by_code(code)
    }

    /// Direct children of a node.
    pub fn children_of(&self, id: JurisdictionId) -> DocketResult<Vec<Jurisdiction>> {
        let mut children: Vec<Jurisdiction> = self
            .storage
            .jurisdiction_list()?
            .into_iter()
            .filter(|j| j.parent_id == Some(id))
            .collect();
        children.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(children)
    }

    /// Chain of ancestors from the node's parent up to the root. A visited
    /// set guards against malformed parent links in the stored data.
    pub fn ancestors_of(&self, id: JurisdictionId) -> DocketResult<Vec<Jurisdiction>> {
        let mut ancestors = Vec::new();
        let mut visited: HashSet<JurisdictionId> = HashSet::new();
        visited.insert(id);

        let mut current = self.get(id)?;
        while let Some(parent_id) = current.parent_id {
            if !visited.insert(parent_id) {
                return Err(ValidationError::ConstraintViolation {
                    constraint: "jurisdiction_hierarchy".to_string(),
                    reason: format!("cycle through {parent_id}"),
                }
                .into());
            }
            current = self.get(parent_id)?;
            ancestors.push(current.clone());
        }
        Ok(ancestors)
    }

    fn get_or_insert(
        &self,
        code: &str,
        descriptor: &JurisdictionDescriptor,
        parent_id: Option<JurisdictionId>,
        level: Level,
    ) -> DocketResult<Jurisdiction> {
        if let Some(existing) = self.storage.jurisdiction_find_by_code(code)? {
            return Ok(existing);
        }
        let jurisdiction = Jurisdiction {
            jurisdiction_id: new_entity_id(),
            code: code.to_string(),
            state: normalize_segment(&descriptor.state),
            county: match level {
                Level::State => None,
                Level::County | Level::Court => descriptor.county.clone(),
            },
            court_type: match level {
                Level::Court => descriptor.court_type,
                Level::State | Level::County => None,
            },
            parent_id,
            created_at: Utc::now(),
        };
        self.storage.jurisdiction_insert(&jurisdiction)?;
        info!(code = %jurisdiction.code, "jurisdiction created");
        Ok(jurisdiction)
    }
}

#[derive(Clone, Copy)]
enum Level {
    State,
    County,
    Court,
}

/// Uppercase, trimmed, inner whitespace runs collapsed to a single dash.
fn normalize_segment(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn court_segment(court_type: CourtType) -> &'static str {
    match court_type {
        CourtType::District => "DISTRICT",
        CourtType::Superior => "SUPERIOR",
        CourtType::Appellate => "APPELLATE",
        CourtType::Supreme => "SUPREME",
        CourtType::Family => "FAMILY",
        CourtType::Probate => "PROBATE",
        CourtType::SmallClaims => "SMALL-CLAIMS",
        CourtType::Municipal => "MUNICIPAL",
    }
}

fn validate_code(code: &str, field: &str) -> DocketResult<()> {
    if CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("normalized code {code:?} is not a valid jurisdiction code"),
        }
        .into())
    }
}
