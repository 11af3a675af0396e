//! Durable storage for the character list.
//!
//! The store only needs `load` and `save` of the whole list. Two flavors exist:
//! a key-value blob store holding the list as a JSON array (browser local
//! storage, a file, or memory), and a remote table (see the backend crate).

use crate::error::StoreSyncError;
use crate::models::Character;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Fixed key the character list is stored under in a blob store.
pub const CHARACTERS_KEY: &str = "storyteller.characters";

pub type SyncResult<T> = Result<T, StoreSyncError>;

#[async_trait]
pub trait CharacterPersistence: Send + Sync {
    /// Returns the stored list, or an empty list when nothing was stored yet.
    async fn load(&self) -> SyncResult<Vec<Character>>;
    async fn save(&self, characters: &[Character]) -> SyncResult<()>;
}

/// Key-value blob storage collaborator.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> SyncResult<Option<String>>;
    fn set(&self, key: &str, blob: String) -> SyncResult<()>;
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), blob.into());
        store
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> SyncResult<Option<String>> {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn set(&self, key: &str, blob: String) -> SyncResult<()> {
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), blob);
        Ok(())
    }
}

/// Persists the character list as a JSON array under [`CHARACTERS_KEY`].
pub struct BlobPersistence<S> {
    blobs: S,
    key: String,
}

impl<S: BlobStore> BlobPersistence<S> {
    pub fn new(blobs: S) -> Self {
        Self::with_key(blobs, CHARACTERS_KEY)
    }

    pub fn with_key(blobs: S, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
        }
    }

    pub fn blobs(&self) -> &S {
        &self.blobs
    }
}

#[async_trait]
impl<S: BlobStore> CharacterPersistence for BlobPersistence<S> {
    async fn load(&self) -> SyncResult<Vec<Character>> {
        match self.blobs.get(&self.key)? {
            None => Ok(Vec::new()),
            Some(blob) => {
                serde_json::from_str(&blob).map_err(|e| StoreSyncError::Corrupt(e.to_string()))
            }
        }
    }

    async fn save(&self, characters: &[Character]) -> SyncResult<()> {
        let blob = serde_json::to_string(characters)
            .map_err(|e| StoreSyncError::Write(e.to_string()))?;
        self.blobs.set(&self.key, blob)
    }
}
