//! # imgfit
//!
//! Fit raster images to a requested width, height and aspect ratio, then
//! save them in a chosen format.
//!
//! # Pipeline
//!
//! ```text
//! 1. Decode     bytes → image       (content-probed: PNG, GIF, WBMP, JPEG)
//! 2. Orient     EXIF tag → upright  (JPEG only)
//! 3. Resolve    sparse options + source → concrete options
//! 4. Size       concrete options → output width/height
//! 5. Copy       crop policy → source and destination rectangles
//! 6. Resample   copy into a background-filled canvas
//! 7. Save       {stem}.{ext}        (optional, never fatal)
//! ```
//!
//! Steps 3 to 5 are pure functions over `f64` geometry
//! ([`imaging::resolve`], [`imaging::derive_output_descriptor`],
//! [`imaging::compute_copy_rectangles`]) and are rounded to pixels exactly
//! once, right before resampling. Targets are capped at
//! [`imaging::MAX_CANVAS_EDGE`] per side. Decoding and encoding sit behind the
//! [`imaging::ImageBackend`] trait, so the pipeline can be tested without
//! touching real pixels.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Option resolution, size derivation, crop geometry, backends, `resize` |
//! | [`config`] | `imgfit.toml` loading, merging onto stock defaults, validation |
//! | [`output`] | CLI text and JSON formatting |
//!
//! # Crop Policies
//!
//! | Policy | Source used | Output covered |
//! |--------|-------------|----------------|
//! | `auto` | all | all (distorted when ratios differ) |
//! | `autofill` | all | centered sub-rect, rest is background |
//! | `cut` | centered sub-rect | all |

pub mod config;
pub mod imaging;
pub mod output;
