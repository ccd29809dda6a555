//! Store errors

use thiserror::Error;

/// Errors reported by the store for recoverable misuse.
///
/// Failures inside reducers, effects or interceptors are programming errors
/// and are not represented here: they unwind out of `dispatch`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Effects and the dispatch loop need a tokio runtime to run on.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// The store was torn down and no longer accepts effects.
    #[error("store has been torn down")]
    TornDown,

    /// An action or state could not be serialized for printing.
    #[error("failed to serialize transition: {0}")]
    Serialize(#[from] serde_json::Error),
}
