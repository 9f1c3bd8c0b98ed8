//! Synchronization layer between the path index and the remote store.
//!
//! Single authority for deciding whether the in-memory index can answer a
//! navigation request or a network refresh is required, and for keeping the
//! index consistent across mutating operations. Mutations go remote-first:
//! the index is only touched after the store accepted the change, so it never
//! diverges from a successful remote state (stale relative to a failed one is
//! allowed).

use crate::error::ExplorerError;
use crate::index::{path, FileSystemIndex};
use crate::remote::ObjectStore;
use crate::types::{DirectoryContents, FileUpload, FolderNode, LoadState, ObjectEntry};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Owns the [`FileSystemIndex`] and mediates every interaction with the
/// remote store.
///
/// Constructed explicitly and handed to whatever composes the surface layer;
/// there is deliberately no process-wide instance. Navigation reads proceed
/// against last-known-good state while a remote call is in flight; no lock
/// is held across an await.
pub struct Explorer {
    store: Arc<dyn ObjectStore>,
    index: RwLock<FileSystemIndex>,
    state: RwLock<LoadState>,
    /// Directory keys confirmed by a scoped listing this session. Lets a
    /// directory confirmed empty be told apart from one never listed, so
    /// legitimately-empty directories are not refetched on every visit.
    listed: RwLock<HashSet<String>>,
    /// Serializes the initial full-listing fetch; a navigation arriving while
    /// one is in flight waits for its outcome instead of issuing a duplicate.
    load_guard: Mutex<()>,
    relist_after_mutation: bool,
}

impl Explorer {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            index: RwLock::new(FileSystemIndex::new()),
            state: RwLock::new(LoadState::Uninitialized),
            listed: RwLock::new(HashSet::new()),
            load_guard: Mutex::new(()),
            relist_after_mutation: false,
        }
    }

    /// Re-list the affected directory after each successful mutation
    /// (best-effort, for eventual consistency with the store).
    pub fn with_relist_after_mutation(mut self, enabled: bool) -> Self {
        self.relist_after_mutation = enabled;
        self
    }

    /// Current load state snapshot, for display.
    pub fn state(&self) -> LoadState {
        self.state.read().clone()
    }

    /// Number of objects currently cached.
    pub fn object_count(&self) -> usize {
        self.index.read().file_count()
    }

    /// Immediate contents of the directory at `path`.
    ///
    /// Triggers the initial full-listing load when nothing is cached yet.
    /// Once ready, answers from memory, except when the cache reports zero
    /// files at an unconfirmed path, where a scoped listing is fetched and
    /// merged in (tolerates an index built from an incomplete snapshot).
    pub async fn list_directory(&self, path: &str) -> Result<DirectoryContents, ExplorerError> {
        self.ensure_loaded().await?;

        let key = path::normalize(path);
        let cached = self.index.read().directory_contents(&key);
        if !cached.files.is_empty() || self.listed.read().contains(&key) {
            return Ok(cached);
        }

        debug!(path = %path::to_absolute(&key), "No files cached, fetching scoped listing");
        let entries = self.store.fetch_directory(&key).await?;
        self.merge(entries);
        self.listed.write().insert(key.clone());
        Ok(self.index.read().directory_contents(&key))
    }

    /// Directory skeleton of everything cached. Never touches the network;
    /// empty before the first load.
    pub fn folder_structure(&self) -> FolderNode {
        self.index.read().folder_structure()
    }

    /// Resolve a path to the cached entry for the stored object, loading the
    /// index first if needed.
    pub async fn resolve_entry(&self, path: &str) -> Result<ObjectEntry, ExplorerError> {
        self.ensure_loaded().await?;
        let key = path::normalize(path);
        self.index
            .read()
            .entry(&key)
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(key))
    }

    /// Upload files into `target` sequentially.
    ///
    /// Each file is stored remotely first, then inserted into the index with
    /// the entity tag the store assigned; the upload timestamp is stamped
    /// client-side until the next listing supplies the store's. The first
    /// remote failure aborts the batch and surfaces; entries already
    /// uploaded stay, since they match remote state.
    pub async fn upload_files(
        &self,
        files: Vec<FileUpload>,
        target: &str,
    ) -> Result<Vec<ObjectEntry>, ExplorerError> {
        self.ensure_loaded().await?;

        let dir = path::normalize(target);
        let mut uploaded = Vec::with_capacity(files.len());
        for file in files {
            let key = path::join(&dir, &file.name);
            let size = file.bytes.len() as u64;
            let entity_tag = self
                .store
                .put_object(&key, file.bytes, &file.content_type)
                .await?;
            let entry = ObjectEntry {
                path: key.clone(),
                size,
                uploaded_at: Utc::now(),
                entity_tag,
            };
            self.index.write().insert(&key, entry.clone());
            info!(path = %key, size, "Uploaded object");
            uploaded.push(entry);
        }
        self.relist_best_effort(&dir).await;
        Ok(uploaded)
    }

    /// Delete a stored object. The index is untouched on remote failure.
    pub async fn delete_entry(&self, entry: &ObjectEntry) -> Result<(), ExplorerError> {
        self.store.delete_object(&entry.path).await?;
        self.index.write().remove(&entry.path);
        info!(path = %entry.path, "Deleted object");
        self.relist_best_effort(&path::parent(&entry.path)).await;
        Ok(())
    }

    /// Move a stored object into the directory `dest_dir`, keeping its base
    /// name. Returns the entry at its new path.
    pub async fn move_entry(
        &self,
        entry: &ObjectEntry,
        dest_dir: &str,
    ) -> Result<ObjectEntry, ExplorerError> {
        let new_key = self.rekey_target(entry, dest_dir)?;
        self.store.move_object(&entry.path, &new_key).await?;

        let moved = ObjectEntry {
            path: new_key.clone(),
            ..entry.clone()
        };
        {
            let mut index = self.index.write();
            index.remove(&entry.path);
            index.insert(&new_key, moved.clone());
        }
        info!(from = %entry.path, to = %new_key, "Moved object");
        self.relist_best_effort(&path::parent(&entry.path)).await;
        self.relist_best_effort(&path::parent(&new_key)).await;
        Ok(moved)
    }

    /// Copy a stored object into the directory `dest_dir`, keeping its base
    /// name. Returns the entry at the new path; its entity tag is the
    /// source's until the next listing reports the copy's own.
    pub async fn copy_entry(
        &self,
        entry: &ObjectEntry,
        dest_dir: &str,
    ) -> Result<ObjectEntry, ExplorerError> {
        let new_key = self.rekey_target(entry, dest_dir)?;
        self.store.copy_object(&entry.path, &new_key).await?;

        let copied = ObjectEntry {
            path: new_key.clone(),
            ..entry.clone()
        };
        self.index.write().insert(&new_key, copied.clone());
        info!(from = %entry.path, to = %new_key, "Copied object");
        self.relist_best_effort(&path::parent(&new_key)).await;
        Ok(copied)
    }

    /// Download a stored object's bytes. No index effect.
    pub async fn download_entry(&self, entry: &ObjectEntry) -> Result<Vec<u8>, ExplorerError> {
        self.store.fetch_object(&entry.path).await
    }

    /// Discard everything and rebuild from a fresh full listing. The only
    /// recovery path after a failed initial load.
    pub async fn reload(&self) -> Result<(), ExplorerError> {
        let _guard = self.load_guard.lock().await;
        *self.index.write() = FileSystemIndex::new();
        self.listed.write().clear();
        *self.state.write() = LoadState::Uninitialized;
        self.load().await
    }

    async fn ensure_loaded(&self) -> Result<(), ExplorerError> {
        if let Some(result) = self.settled_state() {
            return result;
        }
        let _guard = self.load_guard.lock().await;
        // A concurrent caller may have finished the load while we waited.
        if let Some(result) = self.settled_state() {
            return result;
        }
        self.load().await
    }

    /// `Some` when the state machine already settled: Ready serves from
    /// cache, Error keeps failing until an explicit reload.
    fn settled_state(&self) -> Option<Result<(), ExplorerError>> {
        match &*self.state.read() {
            LoadState::Ready => Some(Ok(())),
            LoadState::Error(msg) => Some(Err(ExplorerError::Transport(msg.clone()))),
            LoadState::Uninitialized | LoadState::Loading => None,
        }
    }

    /// Full-listing fetch into a fresh index. Caller holds the load guard.
    async fn load(&self) -> Result<(), ExplorerError> {
        *self.state.write() = LoadState::Loading;
        match self.store.fetch_all_entries().await {
            Ok(entries) => {
                let mut index = FileSystemIndex::new();
                let count = entries.len();
                for mut entry in entries {
                    entry.path = path::normalize(&entry.path);
                    let key = entry.path.clone();
                    index.insert(&key, entry);
                }
                *self.index.write() = index;
                self.listed.write().clear();
                *self.state.write() = LoadState::Ready;
                info!(objects = count, "Index built from full listing");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Initial listing failed");
                *self.state.write() = LoadState::Error(err.to_string());
                Err(err)
            }
        }
    }

    fn merge(&self, entries: Vec<ObjectEntry>) {
        let mut index = self.index.write();
        for mut entry in entries {
            entry.path = path::normalize(&entry.path);
            let key = entry.path.clone();
            index.insert(&key, entry);
        }
    }

    fn rekey_target(
        &self,
        entry: &ObjectEntry,
        dest_dir: &str,
    ) -> Result<String, ExplorerError> {
        let name = path::basename(&entry.path).ok_or_else(|| {
            ExplorerError::IndexCorruption(format!("entry with empty path: '{}'", entry.path))
        })?;
        Ok(path::join(dest_dir, name))
    }

    async fn relist_best_effort(&self, dir: &str) {
        if !self.relist_after_mutation {
            return;
        }
        match self.store.fetch_directory(dir).await {
            Ok(entries) => {
                self.merge(entries);
                self.listed.write().insert(path::normalize(dir));
            }
            Err(err) => {
                warn!(dir = %path::to_absolute(dir), error = %err, "Post-mutation re-list failed");
            }
        }
    }
}
