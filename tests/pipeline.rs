//! End-to-end pipeline tests through the library API.
//!
//! Each test copies `fixtures/catalog/` into a temp directory, runs
//! parse → normalize → build, and inspects the written site.

use awesome_viewer::builder::{BuildSettings, SiteBuilder, SourceInfo};
use awesome_viewer::config::{self, SiteConfig};
use awesome_viewer::fingerprint::{self, Freshness};
use awesome_viewer::normalize::{NormalizeOptions, normalize};
use awesome_viewer::parse::{ParseError, ParseOptions, SourceDocument};
use awesome_viewer::types::{Catalog, Category, Manifest, Totals};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fixture_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/catalog");
    for entry in walkdir::WalkDir::new(&src) {
        let entry = entry.unwrap();
        let target = tmp.path().join(entry.path().strip_prefix(&src).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    tmp
}

fn load(dir: &Path) -> (SourceDocument, SiteConfig) {
    let doc = SourceDocument::load(&dir.join("README.md")).unwrap();
    let config = config::load_config(dir).unwrap();
    (doc, config)
}

fn catalog_for(doc: &SourceDocument, config: &SiteConfig) -> Catalog {
    normalize(
        doc.parse(&config.parse_options()),
        &config.normalize_options(),
        "README.md",
    )
    .unwrap()
}

fn build(dir: &Path) -> (Catalog, awesome_viewer::builder::BuildResult) {
    let (doc, config) = load(dir);
    let catalog = catalog_for(&doc, &config);
    let result = SiteBuilder::new(
        config.output_dir(dir),
        BuildSettings::from_config(&config, dir),
    )
    .build(&catalog, &SourceInfo::of(&doc))
    .unwrap();
    (catalog, result)
}

#[test]
fn fixture_builds_complete_site() {
    let tmp = fixture_dir();
    let (catalog, result) = build(tmp.path());

    let site = tmp.path().join("site");
    assert_eq!(result.index_path, site.join("index.html"));
    for name in ["index.html", "catalog.json", "manifest.json", "style.css", "app.js", "favicon.svg"] {
        assert!(site.join(name).is_file(), "{name} missing");
    }
    assert_eq!(
        catalog.totals(),
        Totals {
            total_categories: 3,
            total_entries: 11
        }
    );
}

#[test]
fn every_entry_is_linked_from_index() {
    let tmp = fixture_dir();
    let (catalog, result) = build(tmp.path());
    let html = fs::read_to_string(result.index_path).unwrap();

    assert!(html.contains("<title>Awesome Python</title>"));
    for category in catalog.categories() {
        assert!(html.contains(&category.title));
        for entry in &category.items {
            assert!(html.contains(&entry.name), "{} not rendered", entry.name);
            assert!(
                html.contains(&format!("href=\"{}\"", entry.url)),
                "{} not linked",
                entry.url
            );
        }
    }
    assert!(!html.contains("Python Weekly"));
    assert!(!html.contains("Not An Entry"));
}

#[test]
fn catalog_json_round_trips_to_catalog() {
    let tmp = fixture_dir();
    let (catalog, result) = build(tmp.path());
    let written: Vec<Category> =
        serde_json::from_str(&fs::read_to_string(result.catalog_path).unwrap()).unwrap();
    assert_eq!(Catalog::new(written), catalog);
}

#[test]
fn catalog_json_is_stable_across_builds() {
    let tmp = fixture_dir();
    let (_, first) = build(tmp.path());
    let before = fs::read(&first.catalog_path).unwrap();
    let (_, second) = build(tmp.path());
    assert_eq!(before, fs::read(&second.catalog_path).unwrap());
}

#[test]
fn manifest_reflects_source_and_config() {
    let tmp = fixture_dir();
    let (catalog, result) = build(tmp.path());
    let manifest: Manifest =
        serde_json::from_str(&fs::read_to_string(&result.manifest_path).unwrap()).unwrap();

    let source = fs::read(tmp.path().join("README.md")).unwrap();
    assert_eq!(manifest.source_hash, fingerprint::hash_bytes(&source));
    assert_eq!(manifest.totals, catalog.totals());
    assert_eq!(manifest.preview_settings.limit, 2);
    assert!(manifest.source_path.ends_with("README.md"));
}

#[test]
fn freshness_follows_source_edits() {
    let tmp = fixture_dir();
    let site = tmp.path().join("site");
    let readme = tmp.path().join("README.md");

    let hash = |path: &Path| fingerprint::hash_bytes(&fs::read(path).unwrap());
    assert_eq!(fingerprint::freshness(&site, &hash(&readme)), Freshness::NeverBuilt);

    build(tmp.path());
    assert_eq!(fingerprint::freshness(&site, &hash(&readme)), Freshness::UpToDate);

    let mut text = fs::read_to_string(&readme).unwrap();
    text.push_str("\n## Testing\n- [pytest](https://pytest.org/) - Testing framework.\n");
    fs::write(&readme, text).unwrap();
    assert!(matches!(
        fingerprint::freshness(&site, &hash(&readme)),
        Freshness::Stale { .. }
    ));
}

#[test]
fn empty_source_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("README.md"), "").unwrap();
    let doc = SourceDocument::load(&tmp.path().join("README.md")).unwrap();

    let result = normalize(
        doc.parse(&ParseOptions::default()),
        &NormalizeOptions::default(),
        "README.md",
    );
    assert!(matches!(result, Err(ParseError::NoCategories(_))));
    assert!(!tmp.path().join("site").exists());
}

#[test]
fn missing_source_is_read_error() {
    let tmp = TempDir::new().unwrap();
    let result = SourceDocument::load(&tmp.path().join("README.md"));
    assert!(matches!(result, Err(ParseError::Read { .. })));
}

#[test]
fn three_good_lines_and_one_bad() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("README.md"),
        "## Tools\n\
         - [A](https://a.dev) - Alpha.\n\
         - [B](https://b.dev) - Beta.\n\
         - broken line without a link\n\
         - [C](https://c.dev) - Gamma.\n",
    )
    .unwrap();
    let doc = SourceDocument::load(&tmp.path().join("README.md")).unwrap();
    let parsed = doc.parse(&ParseOptions::default());
    assert_eq!(parsed.malformed.len(), 1);
    let catalog = normalize(parsed, &NormalizeOptions::default(), "README.md").unwrap();
    assert_eq!(catalog.totals().total_entries, 3);
}
