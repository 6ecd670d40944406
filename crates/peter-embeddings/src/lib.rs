//! # PETER Embeddings
//!
//! The text-to-vector seam consumed by the retrieval graphs:
//! - The [`Encoder`] trait, identified by a persisted model name
//! - Cosine similarity utilities
//! - A deterministic [`HashEncoder`] usable without any ML model
//!
//! A graph stores the model name of the encoder that produced its vectors;
//! [`load_encoder`] re-instantiates that binding at load time so query text
//! is embedded into the same vector space as the indexed vectors.

mod encoder;
mod hash;
mod similarity;

use std::sync::Arc;

pub use encoder::{Encoder, EncoderError, EncoderResult};
pub use hash::HashEncoder;
pub use similarity::{cosine_similarity, normalize_l2};

/// Reconstruct an encoder from a persisted model identifier.
///
/// Fails with [`EncoderError::UnknownModel`] for model names this build does
/// not know how to construct.
pub fn load_encoder(model: &str) -> EncoderResult<Arc<dyn Encoder>> {
    if let Some(encoder) = HashEncoder::from_model_name(model) {
        return Ok(Arc::new(encoder));
    }
    Err(EncoderError::UnknownModel(model.to_string()))
}
