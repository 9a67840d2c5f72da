//! Parameter types for resize requests.
//!
//! These types describe *what* the caller asked for. The
//! [`calculations`](super::calculations) module turns them into geometry and
//! the [`backend`](super::backend) does the pixel work.
//!
//! ## Types
//!
//! - [`Dimension`]: `Auto` or a fixed positive number. Used for target width,
//!   height and aspect ratio.
//! - [`OutputFormat`]: encoding of the resized image (`Auto` keeps the source format).
//! - [`CropPolicy`]: how a source is reconciled with a differently-shaped canvas.
//! - [`Quality`]: JPEG quality (0–100, default 100). Clamped on construction.
//! - [`SizeOption`]: sparse request; every field optional.
//! - [`ResolvedOption`]: the same request with every gap filled.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected 'auto' or a positive number, got '{0}'")]
    Dimension(String),
    #[error("{value} exceeds the maximum edge of {max} pixels")]
    TooLarge { value: f64, max: u32 },
    #[error("unknown output format '{0}' (expected auto, png, gif, jpg or wbmp)")]
    Format(String),
    #[error("unknown crop policy '{0}' (expected auto, autofill or cut)")]
    Crop(String),
}

/// A size or ratio that is either derived automatically or fixed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "DimensionRepr", into = "DimensionRepr")]
pub enum Dimension {
    #[default]
    Auto,
    Fixed(f64),
}

impl Dimension {
    pub fn fixed(self) -> Option<f64> {
        match self {
            Dimension::Auto => None,
            Dimension::Fixed(v) => Some(v),
        }
    }

    /// Reject fixed values above `max`, for width and height inputs.
    pub fn within_edge(self, max: u32) -> Result<Self, ParseError> {
        match self {
            Dimension::Fixed(value) if value > f64::from(max) => {
                Err(ParseError::TooLarge { value, max })
            }
            _ => Ok(self),
        }
    }

    /// True for `Auto` and for finite, strictly positive fixed values.
    pub fn is_valid(self) -> bool {
        match self {
            Dimension::Auto => true,
            Dimension::Fixed(v) => v.is_finite() && v > 0.0,
        }
    }
}

/// Parses `auto`, a decimal (`400`, `1.5`) or a `W:H` pair (`16:9`), which
/// is read as the quotient.
impl FromStr for Dimension {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Dimension::Auto);
        }
        let err = || ParseError::Dimension(s.to_string());
        let value = match trimmed.split_once(':') {
            Some((w, h)) => {
                let w: f64 = w.trim().parse().map_err(|_| err())?;
                let h: f64 = h.trim().parse().map_err(|_| err())?;
                w / h
            }
            None => trimmed.parse().map_err(|_| err())?,
        };
        let dim = Dimension::Fixed(value);
        if dim.is_valid() { Ok(dim) } else { Err(err()) }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Auto => f.write_str("auto"),
            Dimension::Fixed(v) => write!(f, "{v}"),
        }
    }
}

/// On-disk form of a [`Dimension`]: a bare number or a keyword string.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<DimensionRepr> for Dimension {
    type Error = ParseError;

    fn try_from(repr: DimensionRepr) -> Result<Self, Self::Error> {
        match repr {
            // Range checks on numbers are left to config validation.
            DimensionRepr::Number(v) => Ok(Dimension::Fixed(v)),
            DimensionRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Dimension> for DimensionRepr {
    fn from(dim: Dimension) -> Self {
        match dim {
            Dimension::Auto => DimensionRepr::Text("auto".to_string()),
            Dimension::Fixed(v) => DimensionRepr::Number(v),
        }
    }
}

/// Encoding of an image. Doubles as the tag for the format a source was
/// decoded from, in which case it is never `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Auto,
    Gif,
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Wbmp,
}

impl OutputFormat {
    /// File extension used when saving, `None` for the unresolved `Auto`.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            OutputFormat::Auto => None,
            OutputFormat::Gif => Some("gif"),
            OutputFormat::Png => Some("png"),
            OutputFormat::Jpeg => Some("jpg"),
            OutputFormat::Wbmp => Some("wbmp"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(OutputFormat::Auto),
            "gif" => Ok(OutputFormat::Gif),
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "wbmp" => Ok(OutputFormat::Wbmp),
            _ => Err(ParseError::Format(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension().unwrap_or("auto"))
    }
}

/// Strategy for fitting a source into a canvas of a different aspect ratio.
///
/// - `Auto`: stretch the whole source over the whole canvas.
/// - `AutoFill`: scale the whole source to fit inside the canvas, padding
///   the short axis (letterbox).
/// - `Cut`: select the centered source region with the canvas ratio and
///   scale it over the whole canvas, discarding the excess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CropPolicy {
    #[default]
    Auto,
    AutoFill,
    Cut,
}

impl CropPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CropPolicy::Auto => "auto",
            CropPolicy::AutoFill => "autofill",
            CropPolicy::Cut => "cut",
        }
    }

    /// Lenient lookup: unrecognized names fall back to `Auto`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(policy = name, "unknown crop policy, using auto");
            CropPolicy::Auto
        })
    }
}

/// Strict parse used at the CLI edge.
impl FromStr for CropPolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(CropPolicy::Auto),
            "autofill" => Ok(CropPolicy::AutoFill),
            "cut" => Ok(CropPolicy::Cut),
            _ => Err(ParseError::Crop(s.to_string())),
        }
    }
}

impl From<String> for CropPolicy {
    fn from(name: String) -> Self {
        CropPolicy::from_name(&name)
    }
}

impl From<CropPolicy> for String {
    fn from(policy: CropPolicy) -> Self {
        policy.as_str().to_string()
    }
}

impl fmt::Display for CropPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality setting for lossy encoding (0-100). Only JPEG honours it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// A sparse resize request. `None` means "not specified"; the resolver fills
/// every gap with its default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

impl SizeOption {
    /// Every field set to its stock default.
    pub fn stock() -> Self {
        Self {
            format: Some(OutputFormat::Auto),
            crop: Some(CropPolicy::Auto),
            width: Some(Dimension::Auto),
            height: Some(Dimension::Auto),
            ratio: Some(Dimension::Auto),
            quality: Some(Quality::default()),
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(Dimension::Fixed(width));
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(Dimension::Fixed(height));
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = Some(Dimension::Fixed(ratio));
        self
    }

    pub fn with_crop(mut self, crop: CropPolicy) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Field-wise fallback: values set on `self` win, gaps come from `fallback`.
    pub fn or(self, fallback: &SizeOption) -> SizeOption {
        SizeOption {
            format: self.format.or(fallback.format),
            crop: self.crop.or(fallback.crop),
            width: self.width.or(fallback.width),
            height: self.height.or(fallback.height),
            ratio: self.ratio.or(fallback.ratio),
            quality: self.quality.or(fallback.quality),
        }
    }
}

/// A fully specified request. The ratio is always concrete; width and height
/// may still be `Auto`, in which case they are derived from the ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedOption {
    pub format: OutputFormat,
    pub crop: CropPolicy,
    pub width: Dimension,
    pub height: Dimension,
    pub ratio: f64,
    pub quality: Quality,
}

impl From<ResolvedOption> for SizeOption {
    fn from(resolved: ResolvedOption) -> Self {
        SizeOption {
            format: Some(resolved.format),
            crop: Some(resolved.crop),
            width: Some(resolved.width),
            height: Some(resolved.height),
            ratio: Some(Dimension::Fixed(resolved.ratio)),
            quality: Some(resolved.quality),
        }
    }
}
