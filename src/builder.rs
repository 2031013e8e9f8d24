//! Static site generation.
//!
//! Stage 3 of the pipeline. Takes a validated [`Catalog`] and writes the
//! browsable site:
//!
//! ```text
//! site/
//! ├── index.html      # every category and entry, rendered server-side
//! ├── catalog.json    # the catalog as a JSON array of categories
//! ├── manifest.json   # build provenance: source hash, totals, preview settings
//! ├── style.css       # embedded at compile time, written verbatim
//! ├── app.js          # client-side filter + focus panel, written verbatim
//! └── …               # files from `assets_dir`, if configured
//! ```
//!
//! ## Writes
//!
//! Every file goes to a temporary file in the destination directory and is
//! renamed into place, so an interrupted or failed build never leaves a
//! truncated `catalog.json` behind. Existing artifacts are overwritten.
//! `manifest.json` is written last: its presence with the current source hash
//! means the whole build completed.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating with
//! automatic escaping. The page works without JavaScript; `app.js` reads the
//! catalog from an embedded `application/json` script tag to filter it.

use crate::config::{self, ColorConfig, SiteConfig};
use crate::parse::SourceDocument;
use crate::types::{Catalog, Category, Entry, Manifest, PreviewSettings};
use chrono::{DateTime, SecondsFormat, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot copy assets from {}: {source}", .dir.display())]
    Assets {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/app.js");

pub const INDEX_FILE: &str = "index.html";
pub const CATALOG_FILE: &str = "catalog.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const STYLE_FILE: &str = "style.css";
pub const SCRIPT_FILE: &str = "app.js";

/// Generated files that user assets may not replace.
const RESERVED: &[&str] = &[INDEX_FILE, CATALOG_FILE, MANIFEST_FILE, STYLE_FILE, SCRIPT_FILE];

/// Presentation settings for one build.
#[derive(Debug, Clone, Default)]
pub struct BuildSettings {
    pub title: String,
    pub tagline: String,
    pub colors: ColorConfig,
    pub preview: PreviewSettings,
    pub assets_dir: Option<PathBuf>,
}

impl BuildSettings {
    /// Settings from a loaded config; relative paths resolve against `base`.
    pub fn from_config(config: &SiteConfig, base: &Path) -> Self {
        Self {
            title: config.title.clone(),
            tagline: config.tagline.clone(),
            colors: config.colors.clone(),
            preview: config.preview,
            assets_dir: config.assets_path(base),
        }
    }
}

/// Provenance of the catalog being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Source path as given by the user.
    pub path: String,
    /// Hex SHA-256 of the source bytes.
    pub hash: String,
}

impl SourceInfo {
    pub fn of(source: &SourceDocument) -> Self {
        Self {
            path: source.path.display().to_string(),
            hash: crate::fingerprint::hash_bytes(source.text.as_bytes()),
        }
    }
}

/// Paths written by [`SiteBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub index_path: PathBuf,
    pub catalog_path: PathBuf,
    pub manifest_path: PathBuf,
    /// `style.css`, `app.js`, then copied user assets.
    pub asset_paths: Vec<PathBuf>,
}

/// Renders a catalog into an output directory.
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    output_dir: PathBuf,
    settings: BuildSettings,
}

impl SiteBuilder {
    pub fn new(output_dir: impl Into<PathBuf>, settings: BuildSettings) -> Self {
        Self {
            output_dir: output_dir.into(),
            settings,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build the site, stamping the manifest with the current time.
    pub fn build(&self, catalog: &Catalog, source: &SourceInfo) -> Result<BuildResult, BuildError> {
        self.build_at(catalog, source, Utc::now())
    }

    /// Build the site with an explicit generation timestamp.
    pub fn build_at(
        &self,
        catalog: &Catalog,
        source: &SourceInfo,
        generated_at: DateTime<Utc>,
    ) -> Result<BuildResult, BuildError> {
        let out = &self.output_dir;
        fs::create_dir_all(out).map_err(|source| BuildError::Io {
            path: out.clone(),
            source,
        })?;

        let copied = match &self.settings.assets_dir {
            Some(dir) => copy_assets(dir, out)?,
            None => Vec::new(),
        };

        let catalog_path = out.join(CATALOG_FILE);
        let catalog_json = to_json_file(catalog.categories())?;
        write_atomic(&catalog_path, catalog_json.as_bytes())?;
        tracing::debug!(path = %catalog_path.display(), "wrote catalog");

        let index_path = out.join(INDEX_FILE);
        let embedded = embed_json(&serde_json::to_string(catalog.categories())?);
        let html = render_index(catalog, &self.settings, &embedded);
        write_atomic(&index_path, html.into_string().as_bytes())?;
        tracing::debug!(path = %index_path.display(), "wrote index");

        let style_path = out.join(STYLE_FILE);
        write_atomic(&style_path, CSS.as_bytes())?;
        let script_path = out.join(SCRIPT_FILE);
        write_atomic(&script_path, JS.as_bytes())?;
        let mut asset_paths = vec![style_path, script_path];
        asset_paths.extend(copied);

        let manifest_path = out.join(MANIFEST_FILE);
        let manifest = Manifest {
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            source_path: source.path.clone(),
            source_hash: source.hash.clone(),
            totals: catalog.totals(),
            preview_settings: self.settings.preview,
        };
        write_atomic(&manifest_path, to_json_file(&manifest)?.as_bytes())?;
        tracing::debug!(path = %manifest_path.display(), "wrote manifest");

        Ok(BuildResult {
            index_path,
            catalog_path,
            manifest_path,
            asset_paths,
        })
    }
}

/// Pretty JSON with a trailing newline.
fn to_json_file<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, BuildError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Make JSON safe to inline in a `<script>` element.
///
/// `<` can only occur inside JSON strings, where `\u003c` is equivalent, so
/// this cannot change the decoded value but prevents `</script>` breakouts.
fn embed_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

/// Write `contents` to `path` through a temp file in the same directory.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), BuildError> {
    let io_err = |source: std::io::Error| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(contents).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(io_err)?;
    }
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Copy every file below `src` into `dst`, preserving relative paths.
fn copy_assets(src: &Path, dst: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut copied = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|source| BuildError::Assets {
            dir: src.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        if rel
            .to_str()
            .is_some_and(|name| RESERVED.contains(&name))
        {
            tracing::warn!(asset = %rel.display(), "skipping asset that would replace a generated file");
            continue;
        }

        let target = dst.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| BuildError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let bytes = fs::read(entry.path()).map_err(|source| BuildError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        write_atomic(&target, &bytes)?;
        copied.push(target);
    }
    Ok(copied)
}

/// Compact star count: `950`, `1.2k`, `40k`, `3.3M`.
pub fn format_stars(stars: u64) -> String {
    fn compact(value: f64, suffix: &str) -> String {
        let text = format!("{value:.1}");
        let text = text.strip_suffix(".0").unwrap_or(&text);
        format!("{text}{suffix}")
    }
    match stars {
        0..=999 => stars.to_string(),
        1_000..=999_999 => compact(stars as f64 / 1_000.0, "k"),
        _ => compact(stars as f64 / 1_000_000.0, "M"),
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, color_css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="generator" content="awesome-viewer";
                title { (title) }
                link rel="stylesheet" href=(STYLE_FILE);
                style { (PreEscaped(color_css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the header: title, totals, and the filter controls.
fn site_header(catalog: &Catalog, settings: &BuildSettings) -> Markup {
    let totals = catalog.totals();
    html! {
        header.site-header {
            h1 { (settings.title) }
            @if !settings.tagline.is_empty() {
                p.tagline { (settings.tagline) }
            }
            p.totals {
                span id="total-entries" { (totals.total_entries) }
                " entries in "
                span id="total-categories" { (totals.total_categories) }
                " categories"
            }
            div.controls {
                input id="search" type="search" placeholder="Filter by name, category, or description…"
                    aria-label="Search entries" autocomplete="off";
                select id="category" aria-label="Category" {
                    option value="" { "All categories" }
                    @for category in catalog.categories() {
                        option value=(category.slug) {
                            (category.title) " (" (category.items.len()) ")"
                        }
                    }
                }
            }
            p.result-count id="result-count" aria-live="polite" {}
        }
    }
}

/// Renders the category table of contents.
fn render_toc(categories: &[Category]) -> Markup {
    html! {
        nav.toc aria-label="Categories" {
            ul {
                @for category in categories {
                    li {
                        a href={ "#" (category.slug) } { (category.title) }
                        " "
                        span.count { (category.items.len()) }
                    }
                }
            }
        }
    }
}

/// Renders one category section with all of its entries.
fn render_category(category: &Category) -> Markup {
    html! {
        section.category id=(category.slug) data-slug=(category.slug) {
            h2 {
                a.anchor href={ "#" (category.slug) } { (category.title) }
                " "
                span.count { (category.items.len()) }
            }
            @if category.items.is_empty() {
                p.empty { "No entries yet." }
            } @else {
                ul.entries {
                    @for entry in &category.items {
                        (render_entry(entry))
                    }
                }
            }
        }
    }
}

/// Renders a single entry: linked name, star count, description.
fn render_entry(entry: &Entry) -> Markup {
    let stars = entry.stats.as_ref().and_then(|s| s.stars);
    let repository = entry.stats.as_ref().and_then(|s| s.repository.as_deref());
    html! {
        li.entry {
            a.entry-name href=(entry.url) target="_blank" rel="noopener noreferrer" { (entry.name) }
            @if let Some(stars) = stars {
                " "
                span.stars title={ (stars) " stars" } { "★ " (format_stars(stars)) }
            }
            @if let Some(repo) = repository {
                " "
                a.repository href={ "https://github.com/" (repo) } target="_blank" rel="noopener noreferrer" { (repo) }
            }
            span.description { (entry.description) }
        }
    }
}

/// Renders the single-category focus panel; `app.js` fills it in.
fn focus_panel() -> Markup {
    html! {
        aside.focus-panel id="focus" aria-label="Category preview" hidden {
            div.focus-nav {
                button id="focus-prev" type="button" { "‹ Prev" }
                span id="focus-position" {}
                button id="focus-next" type="button" { "Next ›" }
            }
            h2 id="focus-title" {}
            ul.entries id="focus-items" {}
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders `index.html`.
///
/// `catalog_json` must already be safe for inlining (see [`embed_json`]).
fn render_index(catalog: &Catalog, settings: &BuildSettings, catalog_json: &str) -> Markup {
    let color_css = config::generate_color_css(&settings.colors);
    let content = html! {
        (site_header(catalog, settings))
        div.layout {
            (render_toc(catalog.categories()))
            main id="content" {
                @for category in catalog.categories() {
                    (render_category(category))
                }
                p.no-results id="no-results" hidden { "No entries match your search." }
            }
            (focus_panel())
        }
        script id="catalog-data" type="application/json" { (PreEscaped(catalog_json)) }
        script src=(SCRIPT_FILE) {}
    };

    base_document(&settings.title, &color_css, content)
}

// ============================================================================
// Tests
// ============================================================================
