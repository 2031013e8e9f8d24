//! Catalog normalization.
//!
//! Stage 2 of the pipeline. Turns the parser's raw categories into a validated
//! [`Catalog`]:
//!
//! 1. Duplicate entries (same name and URL) inside a category are dropped;
//!    the first occurrence wins.
//! 2. Empty categories are dropped or kept according to [`EmptyCategories`].
//! 3. Each surviving category gets a unique slug (see [`crate::slug`]).
//! 4. Totals are computed from the final list.
//!
//! A catalog with no categories at all is a [`ParseError::NoCategories`]: the
//! source is either not a catalog or badly malformed.

use crate::parse::{ParseError, ParsedDocument};
use crate::slug::SlugAllocator;
use crate::types::{Catalog, Category, Entry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What to do with a category that ends up with zero entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyCategories {
    /// Leave them out of the catalog.
    #[default]
    Drop,
    /// Show them with a zero count.
    Keep,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub empty_categories: EmptyCategories,
}

/// Validate parsed categories and assemble the catalog.
///
/// `source_label` names the source in the error message.
pub fn normalize(
    parsed: ParsedDocument,
    options: &NormalizeOptions,
    source_label: &str,
) -> Result<Catalog, ParseError> {
    let mut slugs = SlugAllocator::new();
    let mut categories = Vec::with_capacity(parsed.categories.len());

    for raw in parsed.categories {
        let items = dedupe_entries(raw.items);
        if items.is_empty() && options.empty_categories == EmptyCategories::Drop {
            tracing::debug!(title = %raw.title, line = raw.line, "dropping empty category");
            continue;
        }
        let slug = slugs.allocate(&raw.title);
        categories.push(Category {
            title: raw.title,
            slug,
            items,
        });
    }

    if categories.is_empty() {
        return Err(ParseError::NoCategories(source_label.to_string()));
    }

    Ok(Catalog::new(categories))
}

fn dedupe_entries(entries: Vec<Entry>) -> Vec<Entry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| {
            let fresh = seen.insert((e.name.clone(), e.url.clone()));
            if !fresh {
                tracing::debug!(name = %e.name, url = %e.url, "dropping duplicate entry");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{ParseOptions, parse_catalog};
    use crate::types::Totals;

    fn catalog_from(text: &str, empty: EmptyCategories) -> Result<Catalog, ParseError> {
        let parsed = parse_catalog(text, &ParseOptions::default());
        normalize(
            parsed,
            &NormalizeOptions {
                empty_categories: empty,
            },
            "README.md",
        )
    }

    const TOOLS_AND_LIBRARIES: &str = "\
## Tools
- [Alpha](https://alpha.dev) - First tool.
- not a proper entry
- [Beta](https://beta.dev) - Second tool.

## Libraries
";

    #[test]
    fn drop_policy_removes_empty_categories() {
        let catalog = catalog_from(TOOLS_AND_LIBRARIES, EmptyCategories::Drop).unwrap();
        assert_eq!(catalog.categories().len(), 1);
        assert_eq!(catalog.categories()[0].title, "Tools");
        assert_eq!(catalog.categories()[0].items.len(), 2);
        assert_eq!(
            catalog.totals(),
            Totals {
                total_categories: 1,
                total_entries: 2
            }
        );
    }

    #[test]
    fn keep_policy_retains_empty_categories() {
        let catalog = catalog_from(TOOLS_AND_LIBRARIES, EmptyCategories::Keep).unwrap();
        let slugs: Vec<&str> = catalog.categories().iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["tools", "libraries"]);
        assert_eq!(
            catalog.totals(),
            Totals {
                total_categories: 2,
                total_entries: 2
            }
        );
    }

    #[test]
    fn default_policy_is_drop() {
        assert_eq!(NormalizeOptions::default().empty_categories, EmptyCategories::Drop);
    }

    #[test]
    fn no_headings_is_fatal() {
        let result = catalog_from("Just prose.\n- [A](https://a.dev) - a\n", EmptyCategories::Drop);
        assert!(matches!(result, Err(ParseError::NoCategories(ref s)) if s == "README.md"));
    }

    #[test]
    fn only_empty_categories_is_fatal_when_dropping() {
        let result = catalog_from("## Tools\n## Libraries\n", EmptyCategories::Drop);
        assert!(matches!(result, Err(ParseError::NoCategories(_))));
    }

    #[test]
    fn only_empty_categories_survive_when_keeping() {
        let catalog = catalog_from("## Tools\n## Libraries\n", EmptyCategories::Keep).unwrap();
        assert_eq!(catalog.totals().total_entries, 0);
        assert_eq!(catalog.totals().total_categories, 2);
    }

    #[test]
    fn duplicate_entries_removed_first_wins() {
        let catalog = catalog_from(
            "## Tools\n- [A](https://a.dev) - first\n- [A](https://a.dev) - second\n- [A](https://a.org) - other url\n",
            EmptyCategories::Drop,
        )
        .unwrap();
        let items = &catalog.categories()[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "first");
        assert_eq!(items[1].url, "https://a.org");
    }

    #[test]
    fn same_entry_in_two_categories_is_kept() {
        let catalog = catalog_from(
            "## One\n- [A](https://a.dev) - a\n## Two\n- [A](https://a.dev) - a\n",
            EmptyCategories::Drop,
        )
        .unwrap();
        assert_eq!(catalog.totals().total_entries, 2);
    }

    #[test]
    fn colliding_titles_get_unique_slugs() {
        let catalog = catalog_from(
            "## Web Tools\n- [A](https://a.dev) - a\n## Web-Tools\n- [B](https://b.dev) - b\n## web tools!\n- [C](https://c.dev) - c\n",
            EmptyCategories::Drop,
        )
        .unwrap();
        let slugs: Vec<&str> = catalog.categories().iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["web-tools", "web-tools-2", "web-tools-3"]);
    }

    #[test]
    fn dropped_categories_do_not_consume_slugs() {
        let catalog = catalog_from(
            "## Tools\n## Tools\n- [A](https://a.dev) - a\n",
            EmptyCategories::Drop,
        )
        .unwrap();
        assert_eq!(catalog.categories()[0].slug, "tools");
    }

    #[test]
    fn totals_match_category_contents() {
        let catalog = catalog_from(
            "## A\n- [1](https://1.dev) - 1\n- [2](https://2.dev) - 2\n## B\n- [3](https://3.dev) - 3\n",
            EmptyCategories::Drop,
        )
        .unwrap();
        let sum: usize = catalog.categories().iter().map(|c| c.items.len()).sum();
        assert_eq!(catalog.totals().total_entries, sum);
        assert_eq!(catalog.totals().total_categories, catalog.categories().len());
    }
}
