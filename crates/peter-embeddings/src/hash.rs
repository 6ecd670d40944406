//! Deterministic hash-based encoder.
//!
//! Hashes words into a fixed-dimension space using multiple hash functions.
//! Not semantically rich, but fast, fully offline, and stable across builds,
//! which makes it the built-in model the load-time factory can always
//! reconstruct. Real sentence encoders live behind the same [`Encoder`]
//! trait outside this crate.

use sha2::{Digest, Sha256};

use crate::encoder::{Encoder, EncoderError, EncoderResult};

const NUM_HASHES: u64 = 4;

/// Hash-based encoder with a stable, named vector space per dimension.
///
/// # Example
///
/// ```rust
/// use peter_embeddings::{Encoder, HashEncoder};
///
/// let encoder = HashEncoder::new(128);
/// let vec = encoder.embed("transformer language model").unwrap();
/// assert_eq!(vec.len(), 128);
/// assert_eq!(encoder.model_name(), "hash-v1-128");
/// ```
#[derive(Debug)]
pub struct HashEncoder {
    dimension: usize,
    model_name: String,
}

impl HashEncoder {
    /// Create a new hash encoder with the specified dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_name: format!("hash-v1-{dimension}"),
        }
    }

    /// Parse a `hash-v1-<dim>` model name back into an encoder.
    pub fn from_model_name(model: &str) -> Option<Self> {
        let dimension: usize = model.strip_prefix("hash-v1-")?.parse().ok()?;
        (dimension > 0).then(|| Self::new(dimension))
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.len() > 1)
            .map(|s| s.to_string())
            .collect()
    }

    // SHA-256 rather than the stdlib hasher: persisted vectors must match
    // query-time vectors across platforms and compiler versions.
    fn token_hash(&self, token: &str, seed: u64) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(seed.to_le_bytes());
        hasher.update(token.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }
}

impl Encoder for HashEncoder {
    fn embed(&self, text: &str) -> EncoderResult<Vec<f32>> {
        if text.is_empty() {
            return Err(EncoderError::EmptyInput);
        }

        let tokens = Self::tokenize(text);
        let mut vector = vec![0.0f32; self.dimension];
        if tokens.is_empty() {
            return Ok(vector);
        }

        for token in &tokens {
            for seed in 0..NUM_HASHES {
                let h = self.token_hash(token, seed);
                let idx = (h as usize) % self.dimension;
                let sign = if h & (1 << 63) == 0 { 1.0 } else { -1.0 };
                vector[idx] += sign;
            }
        }

        crate::similarity::normalize_l2(&mut vector);
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
