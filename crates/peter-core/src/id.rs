//! Stable paper identifiers derived from content.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex characters kept from the SHA-256 digest (16 bytes).
const ID_LEN: usize = 32;

/// Stable identifier for a paper, derived from its title and abstract.
///
/// The same title/abstract pair always produces the same id, so ids computed
/// during graph construction match ids computed later at query time without
/// any shared registry. The pair is unique per corpus, which makes the
/// truncated digest collision-free in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperId(String);

impl PaperId {
    /// Derive the id for a paper from its title and abstract.
    pub fn from_title_abstract(title: &str, abstract_: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update([0u8]);
        hasher.update(abstract_.as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..ID_LEN / 2]))
    }

    /// Wrap an id that was already derived elsewhere (e.g. read from disk).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
