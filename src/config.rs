//! Image configuration module.
//!
//! Handles loading, validating, and merging the `_image.toml` file. Stock
//! defaults are overridden by whatever the user's file sets; everything is
//! optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! source = "."              # Image sources, relative to the site source root
//! output = "generated"      # Generated images, relative to the site destination root
//! base_url = ""             # Prefix for generated URLs (e.g. "/blog")
//! markup = "picture"        # Responsive markup: "picture" or "picturefill"
//!
//! [presets.gallery]         # Used as `{% image gallery poster.jpg %}`
//! width = 400
//! height = 300
//!
//! [presets.gallery.attr]    # Default attributes, in this order
//! class = "gal-img"
//! data-selected = true      # Flag attribute
//!
//! [pictures.hero.attr]      # Responsive presets, used by picture directives
//! data-alt = "Hero"
//!
//! [pictures.hero.sources.default]
//! width = 1200
//!
//! [pictures.hero.sources.small]
//! width = 600
//! media = "(max-width: 600px)"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! quality = 90              # JPEG/AVIF encoding quality (1-100)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::attrs::AttributeSet;
use crate::markup::MarkupStyle;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;
use thiserror::Error;

/// Default config filename, looked up in the site source root.
pub const CONFIG_FILENAME: &str = "_image.toml";

/// Name of the source every picture preset must define.
pub const DEFAULT_SOURCE: &str = "default";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Image configuration loaded from `_image.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding source images, relative to the site source root.
    pub source: String,
    /// Directory for generated images, relative to the site destination root.
    pub output: String,
    /// Prefix joined onto every generated URL.
    pub base_url: String,
    /// Markup style for responsive (picture) directives.
    pub markup: MarkupStyle,
    /// Single-image presets, by name.
    pub presets: BTreeMap<String, Preset>,
    /// Responsive presets, by name.
    pub pictures: BTreeMap<String, PicturePreset>,
    /// Parallelism and encoding settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            output: "generated".to_string(),
            base_url: String::new(),
            markup: MarkupStyle::default(),
            presets: BTreeMap::new(),
            pictures: BTreeMap::new(),
            processing: ProcessingConfig::default(),
        }
    }
}

/// A named width/height/attribute bundle.
///
/// Either dimension may be omitted, meaning "derive from the aspect ratio".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "AttributeSet::is_empty")]
    pub attr: AttributeSet,
}

/// A responsive preset: shared attributes plus named sources in declared order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PicturePreset {
    #[serde(default, skip_serializing_if = "AttributeSet::is_empty")]
    pub attr: AttributeSet,
    pub sources: Ordered<PictureSource>,
}

/// One `<source>` of a responsive preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PictureSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Media query; ignored on the `default` source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

/// Parallel processing and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
    /// Lossy encoding quality for JPEG and AVIF output (1-100).
    pub quality: u32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_processes: None,
            quality: 90,
        }
    }
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.trim().is_empty() {
            return Err(ConfigError::Validation("output must not be empty".into()));
        }
        if !(1..=100).contains(&self.processing.quality) {
            return Err(ConfigError::Validation(
                "processing.quality must be 1-100".into(),
            ));
        }
        for (name, preset) in &self.presets {
            if preset.width == Some(0) || preset.height == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "presets.{name}: width and height must be non-zero"
                )));
            }
        }
        for (name, picture) in &self.pictures {
            if picture.sources.get(DEFAULT_SOURCE).is_none() {
                return Err(ConfigError::Validation(format!(
                    "pictures.{name}: a `{DEFAULT_SOURCE}` source is required"
                )));
            }
            for (source_name, source) in picture.sources.iter() {
                if source.width.is_none() && source.height.is_none() {
                    return Err(ConfigError::Validation(format!(
                        "pictures.{name}.sources.{source_name}: needs at least one of width and height"
                    )));
                }
                if source.width == Some(0) || source.height == Some(0) {
                    return Err(ConfigError::Validation(format!(
                        "pictures.{name}.sources.{source_name}: width and height must be non-zero"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Add the generated-output directory to the host's keep list.
///
/// Static site builders clean their destination directory before writing;
/// the host passes its keep list here once during setup so generated images
/// survive that cleanup. Returns `true` if the list changed.
pub fn register_keep_files(keep: &mut Vec<String>, config: &SiteConfig) -> bool {
    if keep.iter().any(|dir| *dir == config.output) {
        return false;
    }
    keep.push(config.output.clone());
    true
}

// =============================================================================
// Ordered tables
// =============================================================================

/// A string-keyed table that keeps the order entries were declared in.
///
/// Picture sources are emitted in declared order (or its reverse), so a
/// sorted map won't do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordered<V>(pub Vec<(String, V)>);

impl<V> Default for Ordered<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> Ordered<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Serialize> Serialize for Ordered<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Ordered<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> = Vec::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some(entry) => entry.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
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

/// Load config from the given file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `_image.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Tag Configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding source images, relative to the site source root.
source = "."

# Directory for generated images, relative to the site destination root.
# Mirrors the source directory structure. Add it to your site's keep list
# so it survives the destination cleanup between builds.
output = "generated"

# Prefix joined onto every generated URL, for sites served from a subpath.
base_url = ""

# Markup for responsive (picture) directives:
#   "picture"     -> <picture> with <source> elements in declared order
#   "picturefill" -> <span data-src> elements in reverse order, with a
#                    <noscript> fallback
markup = "picture"

# ---------------------------------------------------------------------------
# Presets
# ---------------------------------------------------------------------------
# Single-image presets, used as `gallery poster.jpg alt="..."`.
# Omit width or height to derive it from the source aspect ratio.
# Images are never upscaled.
#
# [presets.gallery]
# width = 400
# height = 300
#
# Default attributes, emitted in this order. Directive attributes override
# them. `true` makes a flag attribute.
# [presets.gallery.attr]
# class = "gal-img"
# data-selected = true

# ---------------------------------------------------------------------------
# Responsive presets
# ---------------------------------------------------------------------------
# Each needs a `default` source. Other sources take a media query.
#
# [pictures.hero.attr]
# data-alt = "Hero image"
#
# [pictures.hero.sources.default]
# width = 1200
#
# [pictures.hero.sources.small]
# width = 600
# media = "(max-width: 600px)"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# JPEG/AVIF encoding quality (1 = worst, 100 = best).
quality = 90

# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
