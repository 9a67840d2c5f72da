//! High-level image operations.
//!
//! These functions combine the pure calculations with backend execution:
//! decode, resolve the request, compute the copy, resample, optionally save.

use super::backend::{BackendError, Decoded, ImageBackend};
use super::calculations::{
    CopyRectanglePair, ImageDescriptor, MAX_CANVAS_EDGE, PixelCopy, compute_copy_rectangles,
    derive_output_descriptor, resolve, resolve_output_format,
};
use super::params::{OutputFormat, Quality, ResolvedOption, SizeOption};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Decode `path`, treating an empty path as undecodable.
fn decode_source<B: ImageBackend>(
    backend: &B,
    path: &Path,
) -> Result<Decoded<B::Image>, BackendError> {
    if path.as_os_str().is_empty() {
        return Err(BackendError::Decode("empty source path".to_string()));
    }
    backend.decode(path)
}

/// What [`get_image_info`] learned about a file.
///
/// An unreadable file is reported, not raised: `image` and `format` are
/// `None` and every number is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo<I> {
    pub image: Option<I>,
    pub format: Option<OutputFormat>,
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
}

impl<I> ImageInfo<I> {
    fn unreadable() -> Self {
        Self {
            image: None,
            format: None,
            width: 0,
            height: 0,
            ratio: 0.0,
        }
    }

    pub fn is_readable(&self) -> bool {
        self.image.is_some()
    }
}

/// Decode `path` and report its format and dimensions.
pub fn get_image_info<B: ImageBackend>(backend: &B, path: &Path) -> ImageInfo<B::Image> {
    let decoded = match decode_source(backend, path) {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "image unreadable");
            return ImageInfo::unreadable();
        }
    };

    let (width, height) = backend.dimensions(&decoded.image);
    let descriptor = ImageDescriptor::from_pixels(width, height);
    ImageInfo {
        image: Some(decoded.image),
        format: Some(decoded.format),
        width,
        height,
        ratio: descriptor.aspect_ratio,
    }
}

/// Result of a successful [`resize`].
#[derive(Debug, Clone)]
pub struct Resized<I> {
    pub image: I,
    /// Encoding of the output: the requested format, or the source's for `Auto`.
    pub format: OutputFormat,
    /// Canvas size in pixels.
    pub width: u32,
    pub height: u32,
    /// Real-valued output geometry before rounding.
    pub descriptor: ImageDescriptor,
    pub source: ImageDescriptor,
    pub option: ResolvedOption,
    pub copy: CopyRectanglePair,
    pub pixels: PixelCopy,
    /// The stem passed as `save`, if any.
    pub save_stem: Option<PathBuf>,
    /// Where the output was written, if a save was requested and succeeded.
    pub saved: Option<PathBuf>,
}

/// Resize the image at `path` according to `option`.
///
/// Fails only when the source cannot be decoded. Targets larger than
/// [`MAX_CANVAS_EDGE`] are scaled down with their ratio kept. When `save` is
/// given the result is also written to `{save}.{ext}`; a failed save is
/// logged and reported through [`Resized::saved`] being `None`.
pub fn resize<B: ImageBackend>(
    backend: &B,
    path: &Path,
    save: Option<&Path>,
    option: &SizeOption,
) -> Result<Resized<B::Image>, ResizeError> {
    let decoded = decode_source(backend, path).map_err(|source| ResizeError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let (src_w, src_h) = backend.dimensions(&decoded.image);
    let source = ImageDescriptor::from_pixels(src_w, src_h);
    let resolved = resolve(option, &source);
    let derived = derive_output_descriptor(&source, &resolved);
    let target = derived.fit_within(f64::from(MAX_CANVAS_EDGE));
    if target != derived {
        warn!(
            requested = ?(derived.width, derived.height),
            limit = MAX_CANVAS_EDGE,
            "output exceeds canvas limit, scaling down"
        );
    }
    let format = resolve_output_format(decoded.format, resolved.format);
    let copy = compute_copy_rectangles(&source, &target, resolved.crop);
    let canvas = target.canvas_size();
    let pixels = copy.to_pixels((src_w, src_h), canvas);

    debug!(
        source = ?(src_w, src_h),
        canvas = ?canvas,
        crop = %resolved.crop,
        ?pixels,
        "computed copy"
    );

    let image = backend.resample(&decoded.image, canvas, &pixels);
    let saved = save.and_then(|stem| save_image(backend, &image, format, resolved.quality, stem));

    Ok(Resized {
        image,
        format,
        width: canvas.0,
        height: canvas.1,
        descriptor: target,
        source,
        option: resolved,
        copy,
        pixels,
        save_stem: save.map(Path::to_path_buf),
        saved,
    })
}

/// `{stem}.{ext}`, appended rather than substituted so dots in the stem survive.
pub fn output_path(stem: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Encode `image` next to `stem`. Returns the written path, or `None` when
/// the format cannot be saved or the encoder fails. Never an error.
pub fn save_image<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    format: OutputFormat,
    quality: Quality,
    stem: &Path,
) -> Option<PathBuf> {
    let Some(ext) = format.extension() else {
        warn!(stem = %stem.display(), "output format unresolved, not saving");
        return None;
    };

    let path = output_path(stem, ext);
    match backend.encode(image, format, quality, &path) {
        Ok(()) => {
            info!(path = %path.display(), %format, "saved");
            Some(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "save failed");
            None
        }
    }
}
