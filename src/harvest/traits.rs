//! Stage abstraction and stage-level error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::StorageError;
use crate::traits::ApiError;

// ============================================================================
// Pipeline Trait
// ============================================================================

/// Generic pipeline stage that transforms Input → Output.
///
/// The collector is a stage from `()` to an
/// [`IdentifierBatch`](crate::storage::IdentifierBatch); the detail
/// harvester consumes that batch and produces a
/// [`HarvestReport`](crate::harvest::HarvestReport).
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a pipeline can be moved
/// onto any tokio worker.
#[async_trait]
pub trait HarvestStage: Send + Sync {
    /// Input type consumed by this stage
    type Input: Send + 'static;

    /// Output type produced by this stage
    type Output: Send + 'static;

    /// Error type for stage failures
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executes the stage.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the stage cannot complete. Stages may still have
    /// persisted partial output before returning an error.
    async fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;

    /// Returns a human-readable name for this stage.
    ///
    /// Used for logging and timing.
    fn stage_name(&self) -> &'static str;
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that end an identifier collection run.
#[derive(Error, Debug)]
pub enum CollectError {
    /// A page request failed; ids gathered before it were still persisted
    #[error("Collection aborted at page {page} after {collected} ids: {source}")]
    Aborted {
        page: u32,
        collected: usize,
        #[source]
        source: ApiError,
    },

    /// The identifier file could not be written
    #[error("Failed to persist opportunity ids: {0}")]
    Storage(#[from] StorageError),
}

/// Errors that stop the detail harvester. Per-opportunity fetch failures
/// never surface here; they are logged and skipped.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Identifier input missing or unreadable, or outputs not writable
    #[error(transparent)]
    Storage(#[from] StorageError),
}
