//! Shared test utilities for the awesome-viewer test suite.
//!
//! Provides fixture setup and lookup helpers over catalog data structures
//! (`Catalog`, `Category`, `Entry`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let catalog = fixture_catalog(tmp.path());
//!
//! let category = find_category(&catalog, "web-frameworks");
//! let entry = find_entry(category, "Django");
//! assert_eq!(entry.url, "https://www.djangoproject.com/");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::normalize::{NormalizeOptions, normalize};
use crate::parse::{ParseOptions, SourceDocument};
use crate::types::{Catalog, Category, Entry};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/catalog/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/catalog");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Parse and normalize `README.md` in `dir` with default options.
pub fn fixture_catalog(dir: &Path) -> Catalog {
    let doc = SourceDocument::load(&dir.join("README.md")).unwrap();
    normalize(
        doc.parse(&ParseOptions::default()),
        &NormalizeOptions::default(),
        "README.md",
    )
    .unwrap()
}

// =========================================================================
// Catalog lookups: panics with a clear message on miss
// =========================================================================

/// Find a category by slug. Panics if not found.
pub fn find_category<'a>(catalog: &'a Catalog, slug: &str) -> &'a Category {
    catalog.category(slug).unwrap_or_else(|| {
        panic!(
            "category '{slug}' not found. Available: {:?}",
            category_slugs(catalog)
        )
    })
}

/// Find an entry by name within a category. Panics if not found.
pub fn find_entry<'a>(category: &'a Category, name: &str) -> &'a Entry {
    category
        .items
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| {
            panic!(
                "entry '{name}' not found in '{}'. Available: {:?}",
                category.title,
                entry_names(category)
            )
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

pub fn category_slugs(catalog: &Catalog) -> Vec<&str> {
    catalog.categories().iter().map(|c| c.slug.as_str()).collect()
}

pub fn entry_names(category: &Category) -> Vec<&str> {
    category.items.iter().map(|e| e.name.as_str()).collect()
}

// =========================================================================
// Fixture-level tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::EmptyCategories;

    #[test]
    fn fixture_categories_in_source_order() {
        let tmp = setup_fixtures();
        let catalog = fixture_catalog(tmp.path());
        assert_eq!(
            category_slugs(&catalog),
            vec!["web-frameworks", "http-clients", "data-visualization"]
        );
        assert_eq!(catalog.totals().total_entries, 11);
    }

    #[test]
    fn fixture_subsections_stay_in_category() {
        let tmp = setup_fixtures();
        let catalog = fixture_catalog(tmp.path());
        let web = find_category(&catalog, "web-frameworks");
        assert_eq!(
            entry_names(web),
            vec!["Django", "Flask", "Pyramid", "FastAPI", "Sanic", "Starlette"]
        );
    }

    #[test]
    fn fixture_stats_extracted() {
        let tmp = setup_fixtures();
        let catalog = fixture_catalog(tmp.path());
        let web = find_category(&catalog, "web-frameworks");
        assert_eq!(
            find_entry(web, "Django").stats.as_ref().unwrap().stars,
            Some(81_200)
        );
        let fastapi = find_entry(web, "FastAPI");
        assert_eq!(
            fastapi.stats.as_ref().unwrap().repository.as_deref(),
            Some("fastapi/fastapi")
        );
        assert_eq!(fastapi.description, "A modern, fast, web framework for building APIs.");

        let http = find_category(&catalog, "http-clients");
        assert_eq!(
            find_entry(http, "requests").stats.as_ref().unwrap().stars,
            Some(52_300)
        );
    }

    #[test]
    fn fixture_reports_one_malformed_line() {
        let tmp = setup_fixtures();
        let doc = SourceDocument::load(&tmp.path().join("README.md")).unwrap();
        let parsed = doc.parse(&ParseOptions::default());
        assert_eq!(parsed.malformed.len(), 1);
        assert_eq!(parsed.malformed[0].category, "HTTP Clients");
    }

    #[test]
    fn fixture_keeps_empty_category_on_request() {
        let tmp = setup_fixtures();
        let doc = SourceDocument::load(&tmp.path().join("README.md")).unwrap();
        let catalog = normalize(
            doc.parse(&ParseOptions::default()),
            &NormalizeOptions {
                empty_categories: EmptyCategories::Keep,
            },
            "README.md",
        )
        .unwrap();
        assert!(find_category(&catalog, "machine-learning").items.is_empty());
        assert_eq!(catalog.totals().total_categories, 4);
    }
}
