//! Remote object store contract.
//!
//! The seam between the synchronization layer and the transport. The HTTP
//! client implements it for production; tests script it with in-memory
//! doubles. All paths crossing this boundary are normalized keys
//! (slash-separated, no leading slash).

pub mod http;

pub use http::HttpObjectStore;

use crate::error::ExplorerError;
use crate::types::ObjectEntry;
use async_trait::async_trait;

/// Async access to the remote object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Full listing of the store. Load-time source, and the fallback source
    /// for explicit re-lists.
    async fn fetch_all_entries(&self) -> Result<Vec<ObjectEntry>, ExplorerError>;

    /// Listing scoped to one path prefix; the on-demand refresh path.
    async fn fetch_directory(&self, path: &str) -> Result<Vec<ObjectEntry>, ExplorerError>;

    /// Download one object's bytes.
    async fn fetch_object(&self, path: &str) -> Result<Vec<u8>, ExplorerError>;

    /// Store an object; returns the entity tag the store assigned.
    ///
    /// Fails `Auth` when no credential is available.
    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ExplorerError>;

    /// Delete an object. Fails `NotFound` when the path is absent.
    async fn delete_object(&self, path: &str) -> Result<(), ExplorerError>;

    /// Move an object to a new key.
    async fn move_object(&self, path: &str, new_path: &str) -> Result<(), ExplorerError>;

    /// Copy an object to a new key.
    async fn copy_object(&self, path: &str, new_path: &str) -> Result<(), ExplorerError>;
}
