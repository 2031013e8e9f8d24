//! Source fingerprints for staleness detection.
//!
//! Every build records the SHA-256 of the catalog source in `manifest.json`.
//! Comparing that against the current source tells whether the generated
//! site is out of date without re-parsing anything. The hash is
//! content-based rather than mtime-based so it survives `git checkout`.

use crate::types::Manifest;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// SHA-256 of `bytes`, as a lowercase hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Freshness of an output directory relative to a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// `manifest.json` records the current source hash.
    UpToDate,
    /// `manifest.json` records a different hash.
    Stale { recorded: String },
    /// No readable `manifest.json` in the output directory.
    NeverBuilt,
}

/// Load `manifest.json` from an output directory.
///
/// Returns `None` if the file doesn't exist or can't be parsed.
pub fn load_manifest(output_dir: &Path) -> Option<Manifest> {
    let content = fs::read_to_string(output_dir.join("manifest.json")).ok()?;
    serde_json::from_str(&content).ok()
}

/// Compare the manifest in `output_dir` against `source_hash`.
pub fn freshness(output_dir: &Path, source_hash: &str) -> Freshness {
    match load_manifest(output_dir) {
        None => Freshness::NeverBuilt,
        Some(manifest) if manifest.source_hash == source_hash => Freshness::UpToDate,
        Some(manifest) => Freshness::Stale {
            recorded: manifest.source_hash,
        },
    }
}
