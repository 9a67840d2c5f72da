//! Tool configuration module.
//!
//! Handles loading, validating and merging `imgfit.toml`. Stock defaults are
//! overridden by the config file, which is in turn overridden by CLI flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! format = "auto"           # auto | png | gif | jpg | wbmp
//! crop = "auto"             # auto | autofill | cut
//! width = "auto"            # pixels or "auto"
//! height = "auto"           # pixels or "auto"
//! ratio = "auto"            # width/height, "16:9" or "auto"
//! quality = 100             # JPEG quality (0-100)
//!
//! [resample]
//! filter = "catmull-rom"    # nearest | triangle | catmull-rom | gaussian | lanczos3
//!
//! [canvas]
//! background = [0, 0, 0, 255]  # RGBA fill for letterbox bars
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse, so override just the values you want:
//!
//! ```toml
//! [defaults]
//! crop = "cut"
//! ratio = "1:1"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{MAX_CANVAS_EDGE, SizeOption};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "imgfit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `imgfit.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImgfitConfig {
    /// Resize request applied underneath CLI flags.
    pub defaults: SizeOption,
    /// Resampling filter settings.
    pub resample: ResampleConfig,
    /// Output canvas settings.
    pub canvas: CanvasConfig,
}

impl Default for ImgfitConfig {
    fn default() -> Self {
        Self {
            defaults: SizeOption::stock(),
            resample: ResampleConfig::default(),
            canvas: CanvasConfig::default(),
        }
    }
}

impl ImgfitConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.defaults;
        for (name, dim) in [("width", d.width), ("height", d.height), ("ratio", d.ratio)] {
            if dim.is_some_and(|v| !v.is_valid()) {
                return Err(ConfigError::Validation(format!(
                    "defaults.{name} must be \"auto\" or a positive number"
                )));
            }
        }
        for (name, dim) in [("width", d.width), ("height", d.height)] {
            if let Some(Err(e)) = dim.map(|v| v.within_edge(MAX_CANVAS_EDGE)) {
                return Err(ConfigError::Validation(format!("defaults.{name}: {e}")));
            }
        }
        if d.quality.is_some_and(|q| q.value() > 100) {
            return Err(ConfigError::Validation(
                "defaults.quality must be 0-100".into(),
            ));
        }
        Ok(())
    }
}

/// Resampling filter used for the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResampleConfig {
    pub filter: ResampleFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// RGBA fill for canvas areas the image does not cover.
    pub background: [u8; 4],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 255],
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ImgfitConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
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
/// Returns `Ok(None)` if the file does not exist.
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
) -> Result<ImgfitConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ImgfitConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<ImgfitConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `imgfit.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgfit configuration
# ====================
# Every option is optional. Values shown are the stock defaults.
# Command-line flags override anything set here.

# ---------------------------------------------------------------------------
# Resize request defaults
# ---------------------------------------------------------------------------
[defaults]
# Output encoding: "auto" keeps the source format.
# One of: auto, png, gif, jpg, wbmp
format = "auto"

# How the source is fitted into a canvas of a different shape:
#   auto     - stretch the whole image over the canvas
#   autofill - fit inside the canvas, pad the short axis (letterbox)
#   cut      - cover the canvas, crop the excess from the center
crop = "auto"

# Canvas size in pixels, or "auto" to derive from the ratio.
width = "auto"
height = "auto"

# Canvas aspect ratio (width / height). Accepts 1.5, "3:2" or "auto".
# "auto" uses the source image's ratio. Ignored when width and height
# are both given.
ratio = "auto"

# JPEG quality, 0-100. Other formats ignore it.
quality = 100

# ---------------------------------------------------------------------------
# Resampling
# ---------------------------------------------------------------------------
[resample]
# One of: nearest, triangle, catmull-rom, gaussian, lanczos3
filter = "catmull-rom"

# ---------------------------------------------------------------------------
# Output canvas
# ---------------------------------------------------------------------------
[canvas]
# RGBA color for areas the image does not cover (autofill bars).
background = [0, 0, 0, 255]
"##
}
