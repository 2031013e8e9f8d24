//! Catalog parsing.
//!
//! Stage 1 of the pipeline. Reads an awesome-list style Markdown document and
//! extracts its categories and entries. Only a narrow dialect is understood:
//!
//! ```text
//! # Awesome Things                          ← title, ignored
//! A curated list of things.                 ← intro prose, ignored
//!
//! ## Contents                               ← ignored section
//! - [Tools](#tools)
//!
//! ## Tools                                  ← category
//! - [Ripgrep](https://example.com/rg) - Fast grep. (⭐ 40k)
//! * [fd](https://example.com/fd) – Fast find.
//!     - [bat](https://example.com/bat): A cat clone.   ← nested, same category
//! - just some words                         ← malformed entry, skipped
//!
//! ### Sub-section                           ← still inside "Tools"
//! - [exa](https://example.com/exa) - ls replacement.
//!
//! ## Contributing                           ← ignored section
//! ```
//!
//! ## Rules
//!
//! - A level-2 heading opens a category. Its title is the heading's plain
//!   text: inline links, emphasis and code spans are reduced to their text.
//! - Headings listed in [`ParseOptions::ignored_sections`] (case-insensitive)
//!   and level-1 headings close the current category; lines up to the next
//!   category heading are skipped.
//! - Deeper headings are sub-sections of the current category.
//! - Fenced code blocks are never interpreted.
//! - A list item under a category that lacks the `[name](url) - description`
//!   shape is recorded as a [`MalformedLine`] and skipped. It never aborts
//!   the parse.
//!
//! ## Stats
//!
//! Repository metadata trailing an entry is lifted into [`Stats`] and removed
//! from the description:
//!
//! - `(⭐ 1.2k)`, `(★ 340)`, `(:star: 12)`, `(1,234 stars)` → star count
//! - `![stars](https://img.shields.io/github/stars/owner/repo)` → repository

use crate::types::{Entry, Stats};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("cannot read catalog source {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "no categories found in {0} (expected `## Heading` sections with `- [name](url) - description` entries)"
    )]
    NoCategories(String),
}

/// Section titles skipped by default: tables of contents and footers.
pub const DEFAULT_IGNORED_SECTIONS: &[&str] = &["Contents", "Resources", "Contributing", "License"];

/// Parser knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// `##` headings with these titles (case-insensitive) are not categories.
    pub ignored_sections: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            ignored_sections: DEFAULT_IGNORED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ParseOptions {
    fn is_ignored(&self, title: &str) -> bool {
        self.ignored_sections
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(title))
    }
}

/// The catalog document as read from disk.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub text: String,
}

impl SourceDocument {
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let text = fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    pub fn parse(&self, options: &ParseOptions) -> ParsedDocument {
        parse_catalog(&self.text, options)
    }
}

/// A category as found in the document, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCategory {
    pub title: String,
    /// 1-based line number of the heading.
    pub line: usize,
    pub items: Vec<Entry>,
}

/// A list item that looked like an entry but did not have the entry shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number.
    pub line: usize,
    /// Title of the category the line appeared under.
    pub category: String,
    pub text: String,
}

/// Parser output: categories in document order plus the skipped lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub categories: Vec<RawCategory>,
    pub malformed: Vec<MalformedLine>,
}

impl ParsedDocument {
    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+\S").expect("valid list item regex"));

static THEMATIC_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$").expect("valid break regex")
});

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*[-*+]\s+\[(?P<name>[^\]]+)\]\((?P<url>[^)\s]+)\)\s*[-–—:]\s*(?P<description>\S.*?)\s*$",
    )
    .expect("valid entry regex")
});

static STARS_BADGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[?!\[[^\]]*\]\(https?://img\.shields\.io/github/stars/(?P<repo>[\w.-]+/[\w.-]+)[^)]*\)(?:\]\([^)]*\))?",
    )
    .expect("valid badge regex")
});

static STARS_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\s*\((?:(?:⭐|★|:star:)\x{FE0F}?\s*(?P<icon>\d[\d,]*(?:\.\d+)?\s*[kKmM]?)|(?P<word>\d[\d,]*(?:\.\d+)?\s*[kKmM]?)\s+stars?)\)\s*$",
    )
    .expect("valid stars regex")
});

/// Where the parser currently is in the document.
#[derive(Clone, Copy)]
enum Section {
    /// Before the first category heading.
    Preamble,
    /// Inside the category at this index of the output.
    Category(usize),
    /// Inside an ignored section or after a level-1 heading.
    Skipped,
}

/// Parse catalog text into raw categories.
///
/// Never fails: lines that do not fit are skipped, and malformed entry lines
/// are reported in [`ParsedDocument::malformed`].
pub fn parse_catalog(text: &str, options: &ParseOptions) -> ParsedDocument {
    let mut doc = ParsedDocument::default();
    let mut section = Section::Preamble;
    let mut fence: Option<Fence> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        match (fence, Fence::scan(line)) {
            (None, Some(opening)) => {
                fence = Some(opening);
                continue;
            }
            (Some(open), Some(marker)) if open.closed_by(marker) => {
                fence = None;
                continue;
            }
            (Some(_), _) => continue,
            (None, None) => {}
        }

        if let Some((level, title)) = parse_heading(line) {
            section = match level {
                HeadingLevel::H1 if title.is_empty() => section,
                HeadingLevel::H1 => Section::Skipped,
                HeadingLevel::H2 if title.is_empty() || options.is_ignored(&title) => {
                    tracing::debug!(line = line_no, title = %title, "skipping section");
                    Section::Skipped
                }
                HeadingLevel::H2 => {
                    doc.categories.push(RawCategory {
                        title,
                        line: line_no,
                        items: Vec::new(),
                    });
                    Section::Category(doc.categories.len() - 1)
                }
                // Sub-sections keep whatever section we are in.
                _ => section,
            };
            continue;
        }

        let Section::Category(current) = section else {
            continue;
        };

        if !LIST_ITEM.is_match(line) || THEMATIC_BREAK.is_match(line) {
            continue;
        }

        let category = &mut doc.categories[current];
        match parse_entry(line) {
            Some(entry) => category.items.push(entry),
            None => {
                tracing::debug!(
                    line = line_no,
                    category = %category.title,
                    "skipping malformed entry: {}",
                    line.trim()
                );
                doc.malformed.push(MalformedLine {
                    line: line_no,
                    category: category.title.clone(),
                    text: line.trim().to_string(),
                });
            }
        }
    }

    doc
}

/// A fence line: its character, run length, and whether anything follows the run.
#[derive(Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
    bare: bool,
}

impl Fence {
    /// Recognize a line of at least three backticks or tildes.
    fn scan(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        if len < 3 {
            return None;
        }
        let bare = trimmed[len * marker.len_utf8()..].trim().is_empty();
        Some(Self { marker, len, bare })
    }

    /// A block closes on a bare run of the same character at least as long as its opener.
    fn closed_by(self, line: Fence) -> bool {
        line.marker == self.marker && line.len >= self.len && line.bare
    }
}

/// Parse an ATX heading line into its level and plain-text title.
fn parse_heading(line: &str) -> Option<(HeadingLevel, String)> {
    if !line.trim_start().starts_with('#') {
        return None;
    }

    let mut level = None;
    let mut title = String::new();
    for event in Parser::new(line) {
        match event {
            Event::Start(Tag::Heading { level: l, .. }) => level = Some(l),
            Event::Text(text) | Event::Code(text) if level.is_some() => title.push_str(&text),
            Event::End(TagEnd::Heading(_)) => break,
            _ => {}
        }
    }

    level.map(|l| (l, title.trim().to_string()))
}

/// Parse a single `- [name](url) - description` line.
fn parse_entry(line: &str) -> Option<Entry> {
    let caps = ENTRY.captures(line)?;
    let name = caps["name"].trim();
    let url = caps["url"].trim();
    if name.is_empty() {
        return None;
    }

    let (description, stats) = extract_stats(&caps["description"]);
    if description.is_empty() {
        return None;
    }
    Some(Entry {
        name: name.to_string(),
        url: url.to_string(),
        description,
        stats,
    })
}

/// Split trailing repository metadata off a description.
fn extract_stats(raw: &str) -> (String, Option<Stats>) {
    let repository = STARS_BADGE
        .captures(raw)
        .map(|caps| caps["repo"].to_string());
    let without_badges = STARS_BADGE.replace_all(raw, "");
    let mut description = without_badges.trim().to_string();

    let suffix = STARS_SUFFIX.captures(&description).and_then(|caps| {
        let count = caps
            .name("icon")
            .or_else(|| caps.name("word"))
            .and_then(|m| parse_star_count(m.as_str()))?;
        Some((caps.get(0)?.start(), count))
    });
    let mut stars = None;
    if let Some((start, count)) = suffix {
        stars = Some(count);
        description.truncate(start);
    }

    let stats = (stars.is_some() || repository.is_some()).then_some(Stats { stars, repository });
    (description.trim().to_string(), stats)
}

/// Parse `1,234`, `1.2k`, `3M` style counts.
fn parse_star_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let (number, multiplier) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1_000_000),
        _ => (cleaned.as_str(), 1),
    };

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    let mut value = whole.parse::<u64>().ok()?.checked_mul(multiplier)?;
    let mut scale = multiplier;
    for digit in fraction.chars() {
        scale /= 10;
        value = value.checked_add(u64::from(digit.to_digit(10)?) * scale)?;
    }
    Some(value)
}
