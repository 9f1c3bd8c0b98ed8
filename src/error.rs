//! Error types for the keytree API surface.

use thiserror::Error;

/// API-level error taxonomy.
///
/// Index operations themselves never fail on missing paths (they produce
/// empty results); every variant here originates at the remote boundary or
/// the configuration layer, except `IndexCorruption`, which is reserved for
/// defensive internal assertions.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Network or HTTP failure talking to the object store.
    #[error("transport error: {0}")]
    Transport(String),

    /// A mutating call was attempted without a usable credential.
    #[error("authentication required: {0}")]
    Auth(String),

    /// The operation targets a path absent from the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal invariant violation in the path index.
    #[error("index corruption: {0}")]
    IndexCorruption(String),

    /// Configuration load or validation failure.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ExplorerError {
    fn from(err: reqwest::Error) -> Self {
        ExplorerError::Transport(err.to_string())
    }
}
