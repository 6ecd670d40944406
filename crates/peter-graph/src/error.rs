//! Error types for graph construction, persistence, and querying.

use std::path::PathBuf;

use peter_core::PaperId;
use peter_embeddings::EncoderError;
use thiserror::Error;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur during graph operations.
///
/// None of these are retried internally, and no partial results are returned:
/// a query either fully succeeds or fails with one of these.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Queried paper id has no edges in the citation graph.
    #[error("Paper not found in citation graph: {0}")]
    PaperNotFound(PaperId),

    /// One or more required persisted files are absent at load time.
    #[error("Missing graph files: {0:?}")]
    MissingGraphFiles(Vec<PathBuf>),

    /// A persisted file exists but its content fails structural validation.
    #[error("Invalid graph file {path}: {reason}")]
    Schema { path: PathBuf, reason: String },

    /// Out-of-range `k` or threshold argument, rejected at the call boundary.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Encoder(#[from] EncoderError),
}

/// Reject a zero result count. `usize` rules out negatives; zero is the
/// remaining degenerate value, never silently clamped.
pub(crate) fn validate_k(name: &'static str, k: usize) -> Result<()> {
    if k == 0 {
        return Err(GraphError::InvalidParameter {
            name,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Reject similarity thresholds outside `[0, 1]`.
pub(crate) fn validate_threshold(name: &'static str, threshold: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(GraphError::InvalidParameter {
            name,
            reason: format!("must be within [0, 1], got {threshold}"),
        });
    }
    Ok(())
}
