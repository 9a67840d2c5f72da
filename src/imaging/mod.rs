//! Image geometry and raster operations.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` (PNG, GIF, JPEG) + in-crate WBMP, probed in order |
//! | **Orientation** | `kamadak-exif` Orientation tag, JPEG only |
//! | **Resample** | `image::DynamicImage::resize_exact` into a blank canvas |
//! | **Encode** | `image` encoders + in-crate WBMP |
//!
//! The module is split into:
//! - **Parameters**: sparse and resolved resize requests
//! - **Calculations**: option resolution, output sizing, crop geometry (pure)
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: `get_image_info`, `resize`, `save_image`

pub mod backend;
mod calculations;
pub mod operations;
pub mod orientation;
mod params;
pub mod rust_backend;
pub mod wbmp;

pub use backend::{BackendError, Decoded, ImageBackend};
pub use calculations::{
    CopyRectanglePair, ImageDescriptor, MAX_CANVAS_EDGE, PixelCopy, PixelRect, Rect,
    compute_copy_rectangles, derive_output_descriptor, resolve, resolve_output_format,
};
pub use operations::{
    ImageInfo, ResizeError, Resized, get_image_info, output_path, resize, save_image,
};
pub use orientation::Orientation;
pub use params::{
    CropPolicy, Dimension, OutputFormat, ParseError, Quality, ResolvedOption, SizeOption,
};
pub use rust_backend::RustBackend;
