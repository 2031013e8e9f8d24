//! URL-safe identifiers for category titles.
//!
//! Every category gets a slug that is used as its anchor in `index.html`,
//! as its key in `catalog.json`, and by the `search --category` filter:
//!
//! - `Web Frameworks` → `web-frameworks`
//! - `C/C++ Bindings` → `c-c-bindings`
//! - `  --Testing--  ` → `testing`
//!
//! Slugs must be unique within a catalog. [`SlugAllocator`] hands them out in
//! document order: the first category keeps the bare slug, later collisions
//! get `-2`, `-3`, … so the same document always yields the same slugs.

use std::collections::HashSet;

/// Slug used when a title has no ASCII alphanumerics at all.
pub const FALLBACK_SLUG: &str = "category";

/// Lowercase `value`, collapse every run of non-alphanumeric characters into a
/// single `-`, and strip leading/trailing separators.
///
/// Only ASCII letters and digits survive, so the result is always URL-safe.
/// The result may be empty (e.g. an emoji-only title).
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Hands out unique slugs in allocation order.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    taken: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify `title` and disambiguate it against every slug allocated so far.
    pub fn allocate(&mut self, title: &str) -> String {
        let mut base = slugify(title);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }

        let slug = if self.taken.contains(&base) {
            (2..)
                .map(|n| format!("{base}-{n}"))
                .find(|candidate| !self.taken.contains(candidate))
                .unwrap_or_default()
        } else {
            base
        };

        self.taken.insert(slug.clone());
        slug
    }
}
