//! Compressed on-disk snapshots.
//!
//! Subgraphs are persisted as zstd-compressed JSON. Decompression or
//! deserialization failures surface as [`GraphError::Schema`] naming the
//! offending file.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{GraphError, Result};

/// zstd level 3 keeps build time reasonable on large corpora.
const COMPRESSION_LEVEL: i32 = 3;

/// Serialize `value` to JSON and write it zstd-compressed to `path`.
pub(crate) fn write_compressed<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_vec(value)?;
    let compressed = zstd::encode_all(raw.as_slice(), COMPRESSION_LEVEL)?;
    fs::write(path, compressed)?;
    Ok(())
}

/// Read a zstd-compressed JSON file written by [`write_compressed`].
pub(crate) fn read_compressed<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let compressed = fs::read(path)?;
    let raw = zstd::decode_all(compressed.as_slice()).map_err(|e| GraphError::Schema {
        path: path.to_path_buf(),
        reason: format!("zstd decompression failed: {e}"),
    })?;
    serde_json::from_slice(&raw).map_err(|e| GraphError::Schema {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
