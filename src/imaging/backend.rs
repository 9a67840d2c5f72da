//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait is everything the resize pipeline needs from a
//! raster library: decode (with orientation normalization), pixel dimensions,
//! one resampling copy, and encode. Geometry never lives here.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate plus the in-crate WBMP codec.

use super::calculations::PixelCopy;
use super::params::{OutputFormat, Quality};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// A decoded, upright image and the format it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<I> {
    pub image: I,
    /// Detected source format, never [`OutputFormat::Auto`].
    pub format: OutputFormat,
}

/// Trait for raster backends.
///
/// `Image` is the backend's native handle. Handles are owned values: decode
/// hands out the only copy, resample returns a new one.
pub trait ImageBackend: Sync {
    type Image;

    /// Decode a file, trying each known format in a fixed order.
    ///
    /// Orientation metadata is applied before returning, so the handle is
    /// already upright.
    fn decode(&self, path: &Path) -> Result<Decoded<Self::Image>, BackendError>;

    /// Pixel width and height.
    fn dimensions(&self, image: &Self::Image) -> (u32, u32);

    /// Create a blank `canvas`-sized image and copy `copy.source` of `image`
    /// into `copy.destination`, resampling as needed.
    fn resample(&self, image: &Self::Image, canvas: (u32, u32), copy: &PixelCopy) -> Self::Image;

    /// Encode `image` as `format` and write it to `path`.
    fn encode(
        &self,
        image: &Self::Image,
        format: OutputFormat,
        quality: Quality,
        path: &Path,
    ) -> Result<(), BackendError>;
}
