//! CLI output formatting for every subcommand.
//!
//! # Information-First Display
//!
//! Output leads with what the catalog contains (categories, entries, counts)
//! and shows file paths as secondary context after a `→`. Every `format_*`
//! function is pure and returns lines; the matching `print_*` wrapper writes
//! them to stdout. Diagnostics (malformed lines, skipped assets, requests)
//! go through `tracing` to stderr instead.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Catalog
//! 001 Web Frameworks (9 entries)
//! 002 HTTP Clients (2 entries)
//!
//! Index → site/index.html
//! Catalog → site/catalog.json
//! Manifest → site/manifest.json
//! Assets → 2 files
//! Built 2 categories, 11 entries
//! Skipped 1 malformed line (run with -v for details)
//! ```
//!
//! ## Check
//!
//! ```text
//! Parsed 2 categories, 11 entries
//! site/manifest.json is stale (built from 3f2a9c01d4e7, source is now 9b1e0f77aa20)
//! ```
//!
//! ## Search
//!
//! ```text
//! 001 HTTP Clients (1 match)
//!     001 requests → https://requests.readthedocs.io/
//!         HTTP for humans.
//! Found 1 entry in 1 category
//! ```

use crate::builder::BuildResult;
use crate::filter::FilteredCategory;
use crate::fingerprint::Freshness;
use crate::types::{Catalog, Totals};
use std::path::Path;

/// Width of descriptions in search results.
const DESCRIPTION_WIDTH: usize = 96;

/// Characters of a hash shown in status lines.
const SHORT_HASH: usize = 12;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 entry`, `2 entries`.
fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// `2 categories, 11 entries`.
fn totals_phrase(totals: Totals) -> String {
    format!(
        "{}, {}",
        plural(totals.total_categories, "category", "categories"),
        plural(totals.total_entries, "entry", "entries")
    )
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..SHORT_HASH).unwrap_or(hash)
}

fn malformed_line(count: usize) -> Option<String> {
    (count > 0).then(|| {
        format!(
            "Skipped {} (run with -v for details)",
            plural(count, "malformed line", "malformed lines")
        )
    })
}

// ============================================================================
// Catalog summary
// ============================================================================

/// One header line per category.
///
/// ```text
/// Catalog
/// 001 Web Frameworks (9 entries)
/// ```
pub fn format_catalog_summary(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec!["Catalog".to_string()];
    for (i, category) in catalog.categories().iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            category.title,
            plural(category.items.len(), "entry", "entries")
        ));
    }
    lines
}

// ============================================================================
// Build
// ============================================================================

/// Catalog summary, written files, totals, and the malformed-line count.
pub fn format_build_output(catalog: &Catalog, result: &BuildResult, malformed: usize) -> Vec<String> {
    let mut lines = format_catalog_summary(catalog);
    lines.push(String::new());
    lines.push(format!("Index \u{2192} {}", result.index_path.display()));
    lines.push(format!("Catalog \u{2192} {}", result.catalog_path.display()));
    lines.push(format!("Manifest \u{2192} {}", result.manifest_path.display()));
    lines.push(format!(
        "Assets \u{2192} {}",
        plural(result.asset_paths.len(), "file", "files")
    ));
    lines.push(format!("Built {}", totals_phrase(catalog.totals())));
    lines.extend(malformed_line(malformed));
    lines
}

pub fn print_build_output(catalog: &Catalog, result: &BuildResult, malformed: usize) {
    for line in format_build_output(catalog, result, malformed) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Parse totals plus the freshness of the output directory.
pub fn format_check_output(
    totals: Totals,
    malformed: usize,
    output_dir: &Path,
    freshness: &Freshness,
    source_hash: &str,
) -> Vec<String> {
    let mut lines = vec![format!("Parsed {}", totals_phrase(totals))];
    lines.extend(malformed_line(malformed));

    let manifest = output_dir.join(crate::builder::MANIFEST_FILE);
    lines.push(match freshness {
        Freshness::UpToDate => format!("{} is up to date", manifest.display()),
        Freshness::Stale { recorded } => format!(
            "{} is stale (built from {}, source is now {})",
            manifest.display(),
            short_hash(recorded),
            short_hash(source_hash)
        ),
        Freshness::NeverBuilt => format!(
            "{} not found; run a build first",
            manifest.display()
        ),
    });
    lines
}

pub fn print_check_output(
    totals: Totals,
    malformed: usize,
    output_dir: &Path,
    freshness: &Freshness,
    source_hash: &str,
) {
    for line in format_check_output(totals, malformed, output_dir, freshness, source_hash) {
        println!("{}", line);
    }
}

// ============================================================================
// Search
// ============================================================================

/// Matching entries grouped by category.
pub fn format_search_output(results: &[FilteredCategory<'_>], query: &str) -> Vec<String> {
    let found: usize = results.iter().map(|c| c.items.len()).sum();
    if found == 0 {
        return vec![format!("No entries match \"{}\"", query.trim())];
    }

    let mut lines = Vec::new();
    for (i, result) in results.iter().enumerate() {
        if result.items.is_empty() {
            continue;
        }
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            result.category.title,
            plural(result.items.len(), "match", "matches")
        ));
        for (j, entry) in result.items.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(j + 1),
                entry.name,
                entry.url
            ));
            if !entry.description.is_empty() {
                lines.push(format!(
                    "{}{}",
                    indent(2),
                    truncate_desc(&entry.description, DESCRIPTION_WIDTH)
                ));
            }
        }
    }
    let categories = results.iter().filter(|c| !c.items.is_empty()).count();
    lines.push(format!(
        "Found {} in {}",
        plural(found, "entry", "entries"),
        plural(categories, "category", "categories")
    ));
    lines
}

pub fn print_search_output(results: &[FilteredCategory<'_>], query: &str) {
    for line in format_search_output(results, query) {
        println!("{}", line);
    }
}

// ============================================================================
// Serve
// ============================================================================

pub fn format_serve_banner(output_dir: &Path, url: &str) -> Vec<String> {
    vec![
        format!("Serving {} at {}", output_dir.display(), url),
        "Press Ctrl+C to stop".to_string(),
    ]
}

pub fn print_serve_banner(output_dir: &Path, url: &str) {
    for line in format_serve_banner(output_dir, url) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
