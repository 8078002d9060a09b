//! Content store collaborator interface
//!
//! Binary form documents live in the host's blob store. The registry only
//! ever sees an opaque handle and the SHA-256 digest of the bytes.

use crate::{
    compute_content_hash, ContentHash, DocketError, DocketResult, StorageError, StorageHandle,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// Host-provided binary content store.
pub trait ContentStore: Send + Sync {
    /// Persist the bytes, returning an opaque retrieval handle.
    fn put(&self, bytes: &[u8]) -> DocketResult<StorageHandle>;

    /// Digest used for duplicate detection.
    fn digest(&self, bytes: &[u8]) -> ContentHash {
        compute_content_hash(bytes)
    }
}

/// In-memory content store keyed by content digest. Test/reference
/// implementation; content-addressed, so identical uploads share a handle.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    objects: RwLock<HashMap<StorageHandle, Vec<u8>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &str) -> Option<Vec<u8>> {
        self.objects.read().ok()?.get(handle).cloned()
    }
}

impl ContentStore for MemoryContentStore {
    fn put(&self, bytes: &[u8]) -> DocketResult<StorageHandle> {
        let handle = hex::encode(compute_content_hash(bytes));
        let mut objects = self
            .objects
            .write()
            .map_err(|_| DocketError::from(StorageError::LockPoisoned))?;
        objects.insert(handle.clone(), bytes.to_vec());
        Ok(handle)
    }
}
