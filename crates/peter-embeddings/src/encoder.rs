//! Core encoder trait and error types.

use thiserror::Error;

/// Encoder error types.
#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Unknown encoder model: {0}")]
    UnknownModel(String),
}

/// Result type for encoder operations.
pub type EncoderResult<T> = Result<T, EncoderError>;

/// Maps text to a fixed-dimension vector.
///
/// Implementations must be deterministic for a fixed model name: vectors are
/// persisted alongside the model identifier, and query text embedded later
/// has to land in the same vector space. Vectors from different models are
/// not comparable.
pub trait Encoder: Send + Sync + std::fmt::Debug {
    /// Embed a single text string.
    fn embed(&self, text: &str) -> EncoderResult<Vec<f32>>;

    /// Embed multiple texts in a batch.
    fn embed_batch(&self, texts: &[&str]) -> EncoderResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Get the model identifier persisted with the vectors.
    fn model_name(&self) -> &str;
}
