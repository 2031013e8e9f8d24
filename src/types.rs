//! Shared types serialized between the pipeline stages and to disk.
//!
//! The parser produces raw categories, the normalizer turns them into a
//! [`Catalog`], and the builder serializes the catalog to `catalog.json` and
//! a [`Manifest`] to `manifest.json`. Field order in these structs is the key
//! order in the emitted JSON, so reordering fields changes the output format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single catalog item: a named link with a free-text description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub url: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

/// Optional repository metadata extracted from an entry line.
///
/// A `Stats` record only exists when at least one field was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Star count from a trailing `(⭐ 1.2k)` style annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    /// `owner/repo` from a GitHub stars badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

/// A named group of entries, derived from a `##` heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    /// URL-safe identifier, unique within one catalog.
    pub slug: String,
    pub items: Vec<Entry>,
}

/// Aggregate counts for a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub total_categories: usize,
    pub total_entries: usize,
}

impl Totals {
    pub fn of(categories: &[Category]) -> Self {
        Self {
            total_categories: categories.len(),
            total_entries: categories.iter().map(|c| c.items.len()).sum(),
        }
    }
}

/// The validated catalog: ordered categories plus their totals.
///
/// Fields are private so the totals can never drift from the categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
    totals: Totals,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Self {
        let totals = Totals::of(&categories);
        Self { categories, totals }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }
}

/// How the console preview walks through categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    /// Print every previewed category in one go.
    #[default]
    List,
    /// Pause between categories when attached to a terminal.
    Step,
}

impl fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewMode::List => f.write_str("list"),
            PreviewMode::Step => f.write_str("step"),
        }
    }
}

impl FromStr for PreviewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(PreviewMode::List),
            "step" => Ok(PreviewMode::Step),
            other => Err(format!("unknown preview mode '{other}' (expected list or step)")),
        }
    }
}

/// Console preview configuration, recorded in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewSettings {
    /// Number of categories to preview; `0` disables the preview.
    pub limit: usize,
    pub mode: PreviewMode,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            limit: 5,
            mode: PreviewMode::List,
        }
    }
}

/// Build metadata written to `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// RFC 3339 UTC timestamp of the build.
    pub generated_at: String,
    pub source_path: String,
    /// Hex SHA-256 of the source document bytes.
    pub source_hash: String,
    pub totals: Totals,
    pub preview_settings: PreviewSettings,
}
