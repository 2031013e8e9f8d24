//! Catalog filtering.
//!
//! The same contract `static/app.js` implements in the browser, used by the
//! `search` subcommand:
//!
//! - The query splits on whitespace into tokens. An entry matches when every
//!   token occurs, case-insensitively, in its name, its description, or its
//!   category title.
//! - A selected category narrows the result further (logical AND).
//! - Categories without matching entries are left out. An empty category
//!   survives only while the query is empty, mirroring how the page shows
//!   everything until the user starts typing.
//!
//! [`FocusCursor`] is the prev/next stepping of the focus panel, clamped at
//! both ends.

use crate::types::{Catalog, Category, Entry};

/// What the user asked for: free-text query plus optional category slug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub category: Option<String>,
}

impl FilterState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    /// Lowercased, whitespace-separated query tokens.
    pub fn tokens(&self) -> Vec<String> {
        self.query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    fn selects(&self, category: &Category) -> bool {
        self.category
            .as_deref()
            .is_none_or(|slug| slug == category.slug)
    }
}

/// One category of a filter result with the entries that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredCategory<'a> {
    pub category: &'a Category,
    pub items: Vec<&'a Entry>,
}

/// True when every token occurs in the entry or its category title.
pub fn entry_matches(entry: &Entry, category: &Category, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let haystack = format!(
        "{} {} {}",
        entry.name, entry.description, category.title
    )
    .to_lowercase();
    tokens.iter().all(|t| haystack.contains(t.as_str()))
}

/// Apply `state` to the catalog, keeping catalog order.
pub fn filter_catalog<'a>(catalog: &'a Catalog, state: &FilterState) -> Vec<FilteredCategory<'a>> {
    let tokens = state.tokens();
    catalog
        .categories()
        .iter()
        .filter(|category| state.selects(category))
        .filter_map(|category| {
            let items: Vec<&Entry> = category
                .items
                .iter()
                .filter(|entry| entry_matches(entry, category, &tokens))
                .collect();
            let keep = !items.is_empty() || (tokens.is_empty() && category.items.is_empty());
            keep.then_some(FilteredCategory { category, items })
        })
        .collect()
}

/// Position of the focus panel within a filter result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusCursor {
    index: usize,
    len: usize,
}

impl FocusCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.len
    }

    /// Step forward; stays put on the last item.
    pub fn next(&mut self) -> usize {
        if self.has_next() {
            self.index += 1;
        }
        self.index
    }

    /// Step back; stays put on the first item.
    pub fn prev(&mut self) -> usize {
        if self.has_prev() {
            self.index -= 1;
        }
        self.index
    }

    pub fn current<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.index)
    }
}
