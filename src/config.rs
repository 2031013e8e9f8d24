//! Viewer configuration.
//!
//! Handles loading, validating and merging `viewer.toml`. Stock defaults are
//! overridden by the user file, which is in turn overridden by CLI flags:
//!
//! ```text
//! stock defaults  →  viewer.toml  →  --output / --preview-limit / --port …
//! ```
//!
//! ## Config File Location
//!
//! `viewer.toml` is looked up next to the catalog source (so `README.md` and
//! its config travel together), or given explicitly with `--config`. Relative
//! paths inside it (`output`, `assets_dir`) resolve against the directory that
//! holds the file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Awesome Viewer"
//! tagline = "Search and browse the curated catalog."
//! output = "site"
//! # assets_dir = "assets"   # extra files copied into the output root
//!
//! [catalog]
//! empty_categories = "drop" # or "keep" (shown with a zero count)
//! ignored_sections = ["Contents", "Resources", "Contributing", "License"]
//!
//! [preview]
//! limit = 5                 # categories printed after a build (0 = none)
//! mode = "list"             # or "step" (pause between categories on a TTY)
//!
//! [serve]
//! port = 8000
//!
//! [colors.light]
//! background = "#f6f6f6"
//! text = "#222222"
//! text_muted = "#4b5563"
//! border = "#e2e8f0"
//! link = "#2563eb"
//!
//! [colors.dark]
//! background = "#0f172a"
//! text = "#e2e8f0"
//! text_muted = "#cbd5f5"
//! border = "#1e293b"
//! link = "#60a5fa"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::normalize::{EmptyCategories, NormalizeOptions};
use crate::parse::{DEFAULT_IGNORED_SECTIONS, ParseOptions};
use crate::types::{PreviewMode, PreviewSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up next to the catalog source.
pub const CONFIG_FILENAME: &str = "viewer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Viewer configuration loaded from `viewer.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Page title and heading of the generated site.
    pub title: String,
    /// One-line description under the heading.
    pub tagline: String,
    /// Output directory for the generated site.
    pub output: String,
    /// Directory whose files are copied verbatim into the output root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<String>,
    /// Parsing and normalization policy.
    pub catalog: CatalogConfig,
    /// Console preview printed after a build.
    pub preview: PreviewSettings,
    /// Local HTTP server settings.
    pub serve: ServeConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Awesome Viewer".to_string(),
            tagline: "Search and browse the curated catalog.".to_string(),
            output: "site".to_string(),
            assets_dir: None,
            catalog: CatalogConfig::default(),
            preview: PreviewSettings::default(),
            serve: ServeConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if self.output.trim().is_empty() {
            return Err(ConfigError::Validation("output must not be empty".into()));
        }
        if self.serve.port == 0 {
            return Err(ConfigError::Validation(
                "serve.port must be between 1 and 65535".into(),
            ));
        }
        if self
            .catalog
            .ignored_sections
            .iter()
            .any(|s| s.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "catalog.ignored_sections must not contain empty titles".into(),
            ));
        }
        self.colors.light.validate("light")?;
        self.colors.dark.validate("dark")?;
        Ok(())
    }

    /// Apply CLI flags on top of the loaded config, then re-validate.
    ///
    /// Runs before any file of the build is touched, so a bad flag never
    /// leaves partial output behind.
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<(), ConfigError> {
        if let Some(limit) = overrides.preview_limit {
            self.preview.limit = usize::try_from(limit).map_err(|_| {
                ConfigError::Validation(format!(
                    "--preview-limit must be zero or positive, got {limit}"
                ))
            })?;
        }
        if let Some(mode) = overrides.preview_mode {
            self.preview.mode = mode;
        }
        if let Some(port) = overrides.port {
            self.serve.port = port;
        }
        self.validate()
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            ignored_sections: self.catalog.ignored_sections.clone(),
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            empty_categories: self.catalog.empty_categories,
        }
    }

    /// Output directory, relative paths resolved against `base`.
    pub fn output_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.output)
    }

    /// Extra assets directory, relative paths resolved against `base`.
    pub fn assets_path(&self, base: &Path) -> Option<PathBuf> {
        self.assets_dir.as_ref().map(|dir| base.join(dir))
    }
}

/// Values given on the command line. `None` keeps the config value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Signed so a negative value can be reported instead of rejected by the parser.
    pub preview_limit: Option<i64>,
    pub preview_mode: Option<PreviewMode>,
    pub port: Option<u16>,
}

/// Parsing and normalization policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Whether categories without entries are dropped or shown with a zero count.
    pub empty_categories: EmptyCategories,
    /// `##` headings that are never categories (case-insensitive).
    pub ignored_sections: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            empty_categories: EmptyCategories::Drop,
            ignored_sections: DEFAULT_IGNORED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Local HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Descriptions, counts and secondary labels.
    pub text_muted: String,
    pub border: String,
    pub link: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#f6f6f6".to_string(),
            text: "#222222".to_string(),
            text_muted: "#4b5563".to_string(),
            border: "#e2e8f0".to_string(),
            link: "#2563eb".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0f172a".to_string(),
            text: "#e2e8f0".to_string(),
            text_muted: "#cbd5f5".to_string(),
            border: "#1e293b".to_string(),
            link: "#60a5fa".to_string(),
        }
    }
}

impl ColorScheme {
    fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("background", &self.background),
            ("text", &self.text),
            ("text_muted", &self.text_muted),
            ("border", &self.border),
            ("link", &self.link),
        ]
    }

    /// Values are inlined into a `<style>` block, so only colour syntax
    /// (`#hex`, names, `rgb(…)`/`hsl(…)` calls) is accepted.
    fn validate(&self, scheme: &str) -> Result<(), ConfigError> {
        for (field, value) in self.fields() {
            if !is_css_color(value) {
                return Err(ConfigError::Validation(format!(
                    "colors.{scheme}.{field} is not a CSS colour: {value:?}"
                )));
            }
        }
        Ok(())
    }
}

fn is_css_color(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | '-' | '/' | ' ')
        })
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(config_path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(config_path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `viewer.toml` from `dir`, falling back to stock defaults when absent.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    let overlay = if config_path.exists() {
        Some(load_raw_config(&config_path)?)
    } else {
        None
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Load an explicitly named config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Returns a fully-commented stock `viewer.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r###"# Awesome Viewer Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file next to the catalog README as viewer.toml, or pass it
# with --config. Relative paths resolve against this file's directory.
# Command-line flags override values set here.
# Unknown keys will cause an error.

# Page title and heading.
title = "Awesome Viewer"

# One-line description under the heading.
tagline = "Search and browse the curated catalog."

# Output directory for the generated site.
output = "site"

# Directory whose files are copied into the output root (favicon, fonts...).
# assets_dir = "assets"

# ---------------------------------------------------------------------------
# Catalog parsing
# ---------------------------------------------------------------------------
[catalog]
# What to do with categories that end up without entries:
# "drop" leaves them out, "keep" shows them with a zero count.
empty_categories = "drop"

# "##" headings that are never categories (case-insensitive).
ignored_sections = ["Contents", "Resources", "Contributing", "License"]

# ---------------------------------------------------------------------------
# Console preview after a build
# ---------------------------------------------------------------------------
[preview]
# Number of categories to print (0 disables the preview).
limit = 5

# "list" prints everything at once; "step" pauses between categories when
# attached to a terminal and falls back to "list" otherwise.
mode = "list"

# ---------------------------------------------------------------------------
# Local server
# ---------------------------------------------------------------------------
[serve]
port = 8000

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#f6f6f6"
text = "#222222"
text_muted = "#4b5563"    # Descriptions, counts
border = "#e2e8f0"
link = "#2563eb"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0f172a"
text = "#e2e8f0"
text_muted = "#cbd5f5"
border = "#1e293b"
link = "#60a5fa"
"###
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
    )
}
