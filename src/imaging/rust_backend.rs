//! Pure Rust raster backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, GIF, JPEG) | `image::load_from_memory_with_format` |
//! | Decode / encode (WBMP) | in-crate [`wbmp`](super::wbmp) codec |
//! | EXIF orientation | `kamadak-exif` via [`orientation`](super::orientation) |
//! | Resampling copy | `crop_imm` + `resize_exact` + `imageops::replace` |
//! | Encode → PNG | `PngEncoder` (fast compression) |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → GIF | `GifEncoder::encode_frame` |
//!
//! Decoding does not trust file extensions: the bytes are offered to each
//! decoder in [`DECODERS`] order until one accepts them.

use super::backend::{BackendError, Decoded, ImageBackend};
use super::calculations::{MAX_CANVAS_EDGE, PixelCopy};
use super::orientation::read_orientation;
use super::params::{OutputFormat, Quality};
use super::wbmp;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Frame, ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tracing::{debug, trace, warn};

type Decoder = fn(&[u8]) -> Result<DynamicImage, BackendError>;

/// Probe order. WBMP has no signature, so it runs after the formats that do
/// and relies on its exact-length check; JPEG goes last.
const DECODERS: &[(OutputFormat, Decoder)] = &[
    (OutputFormat::Png, decode_png as Decoder),
    (OutputFormat::Gif, decode_gif as Decoder),
    (OutputFormat::Wbmp, decode_wbmp as Decoder),
    (OutputFormat::Jpeg, decode_jpeg as Decoder),
];

fn decode_with(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, BackendError> {
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| BackendError::Decode(e.to_string()))
}

fn decode_png(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    decode_with(bytes, ImageFormat::Png)
}

fn decode_gif(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    decode_with(bytes, ImageFormat::Gif)
}

fn decode_wbmp(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    wbmp::decode(bytes).map_err(|e| BackendError::Decode(e.to_string()))
}

/// JPEG is the only branch that honours EXIF orientation.
fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    let img = decode_with(bytes, ImageFormat::Jpeg)?;
    Ok(match read_orientation(bytes) {
        Some(orientation) => {
            debug!(
                ?orientation,
                swaps_axes = orientation.swaps_axes(),
                "applying EXIF orientation"
            );
            orientation.apply(img)
        }
        None => img,
    })
}

/// Backend built on the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    filter: FilterType,
    background: Rgba<u8>,
}

impl RustBackend {
    /// Catmull-Rom resampling onto an opaque black canvas.
    pub fn new() -> Self {
        Self {
            filter: FilterType::CatmullRom,
            background: Rgba([0, 0, 0, 255]),
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Fill color for canvas areas the copy does not cover (letterbox bars).
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background = Rgba(rgba);
        self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_error(e: image::ImageError) -> BackendError {
    BackendError::Encode(e.to_string())
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn decode(&self, path: &Path) -> Result<Decoded<DynamicImage>, BackendError> {
        let bytes = fs::read(path)?;
        for &(format, decoder) in DECODERS {
            match decoder(&bytes) {
                Ok(image) => {
                    debug!(path = %path.display(), %format, "decoded");
                    return Ok(Decoded { image, format });
                }
                Err(e) => trace!(path = %path.display(), %format, error = %e, "decoder rejected"),
            }
        }
        Err(BackendError::Decode(format!(
            "no decoder accepted {}",
            path.display()
        )))
    }

    fn dimensions(&self, image: &DynamicImage) -> (u32, u32) {
        (image.width(), image.height())
    }

    fn resample(&self, image: &DynamicImage, canvas: (u32, u32), copy: &PixelCopy) -> DynamicImage {
        if canvas.0 > MAX_CANVAS_EDGE || canvas.1 > MAX_CANVAS_EDGE {
            warn!(?canvas, limit = MAX_CANVAS_EDGE, "canvas over limit, returning 1x1");
            return DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, self.background));
        }
        let mut out = RgbaImage::from_pixel(canvas.0, canvas.1, self.background);
        let PixelCopy {
            source: src,
            destination: dst,
        } = *copy;

        if src.is_empty() || dst.is_empty() {
            return DynamicImage::ImageRgba8(out);
        }

        let region = image.crop_imm(src.x, src.y, src.width, src.height);
        let scaled = region
            .resize_exact(dst.width, dst.height, self.filter)
            .to_rgba8();
        imageops::replace(&mut out, &scaled, i64::from(dst.x), i64::from(dst.y));
        DynamicImage::ImageRgba8(out)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: Quality,
        path: &Path,
    ) -> Result<(), BackendError> {
        let bytes = encode_to_vec(image, format, quality)?;
        // Written only once encoding succeeded, so a failure leaves no file
        fs::write(path, bytes)?;
        Ok(())
    }
}

fn encode_to_vec(
    image: &DynamicImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut bytes, CompressionType::Fast, PngFilter::Adaptive);
            image.write_with_encoder(encoder).map_err(encode_error)?;
        }
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.value());
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_error)?;
        }
        OutputFormat::Gif => GifEncoder::new(&mut bytes)
            .encode_frame(Frame::new(image.to_rgba8()))
            .map_err(encode_error)?,
        OutputFormat::Wbmp => wbmp::encode(image, &mut bytes)?,
        OutputFormat::Auto => {
            return Err(BackendError::Encode("output format is unresolved".into()));
        }
    }
    Ok(bytes)
}
