//! # Awesome Viewer
//!
//! Turns a curated "awesome list" README into a searchable static site.
//! The Markdown document is the data source: `##` headings become categories
//! and `- [name](url) - description` list items become entries.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Parse      README.md  →  ParsedDocument   (Markdown → raw categories)
//! 2. Normalize  raw        →  Catalog          (dedupe, drop empties, slugs, totals)
//! 3. Build      Catalog    →  site/            (index.html, catalog.json, manifest.json)
//! ```
//!
//! Each stage is a plain function over in-memory data, so tests exercise the
//! parser and normalizer without touching the filesystem. Only the builder
//! writes, and it writes nothing unless the first two stages succeeded: a
//! source with no categories never produces a half-built site.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`parse`] | Stage 1: reads the source, extracts categories, entries and star counts |
//! | [`normalize`] | Stage 2: dedupes entries, applies the empty-category policy, assigns slugs |
//! | [`builder`] | Stage 3: renders `index.html` with Maud and writes the JSON artifacts atomically |
//! | [`types`] | Shared types serialized to disk (`Entry`, `Category`, `Manifest`) |
//! | [`slug`] | URL-safe, collision-free category identifiers |
//! | [`filter`] | Token filter shared with the page script; backs `search` |
//! | [`preview`] | Console preview after a build, list or step-by-step |
//! | [`fingerprint`] | Source hashing and staleness checks against `manifest.json` |
//! | [`serve`] | Local HTTP server for the built site |
//! | [`config`] | `viewer.toml` loading, validation, CLI overrides, and CSS generation |
//! | [`output`] | CLI output formatting for every subcommand |
//!
//! # Design Decisions
//!
//! ## Server-Rendered, Script-Enhanced
//!
//! Every entry is in the HTML. The page script only hides and shows what is
//! already there, and fills the focus panel from the catalog embedded in the
//! page. With scripts disabled the site is still a complete, linkable list.
//!
//! ## Content Hash in the Manifest
//!
//! `manifest.json` records the SHA-256 of the source, so `check` can tell
//! whether a deployed site matches the README without rebuilding it.

pub mod builder;
pub mod config;
pub mod filter;
pub mod fingerprint;
pub mod normalize;
pub mod output;
pub mod parse;
pub mod preview;
pub mod serve;
pub mod slug;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
