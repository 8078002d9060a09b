//! Identity types for DOCKET entities

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Identifier of a form entity.
pub type FormId = Uuid;
/// Identifier of a form field row.
pub type FieldId = Uuid;
/// Identifier of a jurisdiction record.
pub type JurisdictionId = Uuid;
/// Identifier of a contributor account (owned by the host's user system).
pub type ContributorId = Uuid;
/// Identifier of a reviewer account (owned by the host's user system).
pub type ReviewerId = Uuid;
/// Identifier of an end user filing feedback.
pub type UserId = Uuid;
/// Identifier of a feedback report.
pub type FeedbackId = Uuid;
/// Identifier of a reward-ledger entry.
pub type LedgerEntryId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// SHA-256 content hash for deduplication and integrity verification.
pub type ContentHash = [u8; 32];

/// Opaque handle into the host's binary content store.
pub type StorageHandle = String;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Compute SHA-256 hash of content.
pub fn compute_content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Hex rendering of a content hash for logs and diagnostics.
pub fn format_content_hash(hash: &ContentHash) -> String {
    hex::encode(hash)
}
