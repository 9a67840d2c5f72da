//! Pure calculation functions for resize geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Everything works in `f64`; coordinates are rounded exactly once, in
//! [`CopyRectanglePair::to_pixels`], right before they reach the backend.

use super::params::{CropPolicy, Dimension, OutputFormat, ResolvedOption, SizeOption};
use serde::Serialize;

/// Longest canvas edge the pipeline will allocate. Larger targets are scaled
/// down uniformly by [`ImageDescriptor::fit_within`].
pub const MAX_CANVAS_EDGE: u32 = 16_384;

/// Width, height and aspect ratio of an image or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageDescriptor {
    pub width: f64,
    pub height: f64,
    /// `width / height`, or 0 when the height is zero.
    pub aspect_ratio: f64,
}

impl ImageDescriptor {
    pub fn new(width: f64, height: f64) -> Self {
        let aspect_ratio = if height == 0.0 { 0.0 } else { width / height };
        Self {
            width,
            height,
            aspect_ratio,
        }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// Scale down uniformly so neither side exceeds `max_edge`. The ratio is
    /// kept; descriptors already within bounds are returned unchanged.
    pub fn fit_within(self, max_edge: f64) -> Self {
        let longest = self.width.max(self.height);
        if longest <= max_edge || longest.is_nan() {
            return self;
        }
        let scale = max_edge / longest;
        Self::new(self.width * scale, self.height * scale)
    }

    /// Whole-pixel canvas size, never smaller than 1×1.
    pub fn canvas_size(&self) -> (u32, u32) {
        (to_canvas_edge(self.width), to_canvas_edge(self.height))
    }
}

fn to_canvas_edge(value: f64) -> u32 {
    if value.is_finite() {
        value.round().max(1.0) as u32
    } else {
        1
    }
}

/// Fill every gap in `raw` with its default.
///
/// An `Auto` ratio becomes the source's aspect ratio here, so the deriver can
/// always use it as the basis for a missing dimension.
///
/// ```
/// # use imgfit::imaging::{ImageDescriptor, SizeOption, resolve};
/// let source = ImageDescriptor::new(800.0, 400.0);
/// let resolved = resolve(&SizeOption::default(), &source);
/// assert_eq!(resolved.ratio, 2.0);
/// assert_eq!(resolved.quality.value(), 100);
/// ```
pub fn resolve(raw: &SizeOption, source: &ImageDescriptor) -> ResolvedOption {
    let filled = raw.or(&SizeOption::stock());
    let ratio = filled
        .ratio
        .and_then(Dimension::fixed)
        .unwrap_or(source.aspect_ratio);

    ResolvedOption {
        format: filled.format.unwrap_or_default(),
        crop: filled.crop.unwrap_or_default(),
        width: filled.width.unwrap_or_default(),
        height: filled.height.unwrap_or_default(),
        ratio,
        quality: filled.quality.unwrap_or_default(),
    }
}

/// Compute the output canvas from the source and a resolved request.
///
/// | width | height | outcome |
/// |---|---|---|
/// | fixed | fixed | both as given |
/// | fixed | auto | height = width / ratio |
/// | auto | fixed | width = ratio × height |
/// | auto | auto | width = source width, height = width / ratio |
///
/// The returned aspect ratio comes from the derived sides, so explicit
/// width and height take precedence over an explicit ratio.
pub fn derive_output_descriptor(
    source: &ImageDescriptor,
    resolved: &ResolvedOption,
) -> ImageDescriptor {
    let ratio = resolved.ratio;
    let (width, height) = match (resolved.width, resolved.height) {
        (Dimension::Fixed(w), Dimension::Fixed(h)) => (w, h),
        (Dimension::Fixed(w), Dimension::Auto) => (w, w / ratio),
        (Dimension::Auto, Dimension::Fixed(h)) => (ratio * h, h),
        (Dimension::Auto, Dimension::Auto) => (source.width, source.width / ratio),
    };
    ImageDescriptor::new(width, height)
}

/// `Auto` keeps the format the source was decoded from.
pub fn resolve_output_format(detected: OutputFormat, requested: OutputFormat) -> OutputFormat {
    match requested {
        OutputFormat::Auto => detected,
        other => other,
    }
}

/// Axis-aligned rectangle in real-valued pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// The rectangle covering the whole of `image`.
    pub fn full(image: &ImageDescriptor) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: image.width,
            height: image.height,
        }
    }

    /// Place a `width` × `height` rectangle at the center of `bounds`.
    fn centered(bounds: &ImageDescriptor, width: f64, height: f64) -> Self {
        Self {
            x: (bounds.width - width) / 2.0,
            y: (bounds.height - height) / 2.0,
            width,
            height,
        }
    }

    /// Round edges to whole pixels and clamp them into `bound_w` × `bound_h`.
    fn to_pixels(self, bound_w: u32, bound_h: u32) -> PixelRect {
        let (x0, x1) = (
            snap(self.x, bound_w),
            snap(self.x + self.width, bound_w),
        );
        let (y0, y1) = (
            snap(self.y, bound_h),
            snap(self.y + self.height, bound_h),
        );
        PixelRect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }
}

fn snap(edge: f64, bound: u32) -> u32 {
    if edge.is_nan() {
        return 0;
    }
    edge.round().clamp(0.0, bound as f64) as u32
}

/// Source and destination rectangles for a single resampling copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CopyRectanglePair {
    pub source: Rect,
    pub destination: Rect,
}

impl CopyRectanglePair {
    /// Integer form for the backend. `source_size` and `canvas_size` are the
    /// pixel bounds the two rectangles are clamped into.
    pub fn to_pixels(&self, source_size: (u32, u32), canvas_size: (u32, u32)) -> PixelCopy {
        PixelCopy {
            source: self.source.to_pixels(source_size.0, source_size.1),
            destination: self.destination.to_pixels(canvas_size.0, canvas_size.1),
        }
    }
}

/// Rectangle in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// What the backend's resampling copy receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelCopy {
    pub source: PixelRect,
    pub destination: PixelRect,
}

/// Compute the copy rectangles for `policy`.
///
/// Both descriptors must have positive sides; zero-sized inputs are a
/// precondition violation and produce meaningless (but bounded) output once
/// passed through [`CopyRectanglePair::to_pixels`].
pub fn compute_copy_rectangles(
    source: &ImageDescriptor,
    target: &ImageDescriptor,
    policy: CropPolicy,
) -> CopyRectanglePair {
    match policy {
        CropPolicy::Auto => copy_stretch(source, target),
        CropPolicy::AutoFill => copy_autofill(source, target),
        CropPolicy::Cut => copy_cut(source, target),
    }
}

fn copy_stretch(source: &ImageDescriptor, target: &ImageDescriptor) -> CopyRectanglePair {
    CopyRectanglePair {
        source: Rect::full(source),
        destination: Rect::full(target),
    }
}

/// Fit the whole source inside the target, padding the short axis evenly.
fn copy_autofill(source: &ImageDescriptor, target: &ImageDescriptor) -> CopyRectanglePair {
    let mut width = target.width;
    let mut height = width / source.aspect_ratio;

    if height > target.height {
        // Source is taller than the canvas: pillarbox instead
        height = target.height;
        width = height * source.aspect_ratio;
    }

    CopyRectanglePair {
        source: Rect::full(source),
        destination: Rect::centered(target, width, height),
    }
}

/// Take the centered source region with the target's ratio, stretch it over
/// the whole target.
fn copy_cut(source: &ImageDescriptor, target: &ImageDescriptor) -> CopyRectanglePair {
    let mut width = source.width;
    let mut height = width / target.aspect_ratio;

    if height > source.height {
        // Target is wider than the source: trim the sides instead
        height = source.height;
        width = height * target.aspect_ratio;
    }

    CopyRectanglePair {
        source: Rect::centered(source, width, height),
        destination: Rect::full(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn desc(width: f64, height: f64) -> ImageDescriptor {
        ImageDescriptor::new(width, height)
    }

    fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    // =========================================================================
    // ImageDescriptor
    // =========================================================================

    #[test]
    fn descriptor_ratio_is_width_over_height() {
        assert_eq!(desc(800.0, 400.0).aspect_ratio, 2.0);
        assert_eq!(desc(300.0, 600.0).aspect_ratio, 0.5);
    }

    #[test]
    fn descriptor_zero_height_has_zero_ratio() {
        assert_eq!(desc(800.0, 0.0).aspect_ratio, 0.0);
    }

    #[test]
    fn canvas_size_rounds_and_floors_at_one() {
        assert_eq!(desc(266.6, 99.5).canvas_size(), (267, 100));
        assert_eq!(desc(0.2, 0.0).canvas_size(), (1, 1));
        assert_eq!(desc(f64::INFINITY, 10.0).canvas_size(), (1, 10));
    }

    #[test]
    fn fit_within_scales_oversized_uniformly() {
        let fitted = desc(5e9, 2.5e9).fit_within(f64::from(MAX_CANVAS_EDGE));
        assert_relative_eq!(fitted.width, 16_384.0);
        assert_relative_eq!(fitted.height, 8_192.0);
        assert_relative_eq!(fitted.aspect_ratio, 2.0);
        assert_eq!(fitted.canvas_size(), (16_384, 8_192));
    }

    #[test]
    fn fit_within_leaves_small_descriptors_alone() {
        let d = desc(800.0, 400.0);
        assert_eq!(d.fit_within(f64::from(MAX_CANVAS_EDGE)), d);
        assert_eq!(desc(16_384.0, 1.0).fit_within(16_384.0), desc(16_384.0, 1.0));
    }

    // =========================================================================
    // resolve
    // =========================================================================

    #[test]
    fn resolve_fills_defaults() {
        let resolved = resolve(&SizeOption::default(), &desc(640.0, 480.0));
        assert_eq!(resolved.format, OutputFormat::Auto);
        assert_eq!(resolved.crop, CropPolicy::Auto);
        assert_eq!(resolved.width, Dimension::Auto);
        assert_eq!(resolved.height, Dimension::Auto);
        assert_relative_eq!(resolved.ratio, 4.0 / 3.0);
        assert_eq!(resolved.quality, Quality::new(100));
    }

    #[test]
    fn resolve_keeps_explicit_ratio() {
        let option = SizeOption::default().with_ratio(1.0);
        let resolved = resolve(&option, &desc(800.0, 400.0));
        assert_eq!(resolved.ratio, 1.0);
    }

    #[test]
    fn resolve_passes_values_through_unvalidated() {
        let option = SizeOption::default().with_width(-5.0);
        let resolved = resolve(&option, &desc(800.0, 400.0));
        assert_eq!(resolved.width, Dimension::Fixed(-5.0));
    }

    #[test]
    fn resolve_is_idempotent() {
        let source = desc(1024.0, 768.0);
        let option = SizeOption::default()
            .with_height(300.0)
            .with_crop(CropPolicy::Cut);
        let once = resolve(&option, &source);
        let twice = resolve(&SizeOption::from(once), &source);
        assert_eq!(once, twice);
    }

    // =========================================================================
    // derive_output_descriptor
    // =========================================================================

    fn derive(source: ImageDescriptor, option: SizeOption) -> ImageDescriptor {
        derive_output_descriptor(&source, &resolve(&option, &source))
    }

    #[test]
    fn derive_width_only_uses_source_ratio() {
        // 800x400 (2:1), width 400 → 400x200
        let out = derive(desc(800.0, 400.0), SizeOption::default().with_width(400.0));
        assert_eq!((out.width, out.height), (400.0, 200.0));
        assert_eq!(out.aspect_ratio, 2.0);
    }

    #[test]
    fn derive_height_only_uses_ratio() {
        let out = derive(
            desc(800.0, 400.0),
            SizeOption::default().with_height(90.0).with_ratio(16.0 / 9.0),
        );
        assert_relative_eq!(out.width, 160.0);
        assert_eq!(out.height, 90.0);
    }

    #[test]
    fn derive_nothing_keeps_source_width() {
        let out = derive(desc(800.0, 400.0), SizeOption::default().with_ratio(1.0));
        assert_eq!((out.width, out.height), (800.0, 800.0));
    }

    #[test]
    fn derive_all_auto_reproduces_source() {
        let out = derive(desc(640.0, 480.0), SizeOption::default());
        assert_eq!((out.width, out.height), (640.0, 480.0));
    }

    #[test]
    fn derive_explicit_sides_beat_explicit_ratio() {
        let out = derive(
            desc(800.0, 400.0),
            SizeOption::default()
                .with_width(300.0)
                .with_height(100.0)
                .with_ratio(1.0),
        );
        assert_eq!((out.width, out.height), (300.0, 100.0));
        assert_eq!(out.aspect_ratio, 3.0);
    }

    #[test]
    fn output_format_auto_keeps_detected() {
        assert_eq!(
            resolve_output_format(OutputFormat::Png, OutputFormat::Auto),
            OutputFormat::Png
        );
        assert_eq!(
            resolve_output_format(OutputFormat::Png, OutputFormat::Jpeg),
            OutputFormat::Jpeg
        );
    }

    // =========================================================================
    // compute_copy_rectangles
    // =========================================================================

    #[test]
    fn auto_stretches_full_to_full() {
        let copy = compute_copy_rectangles(
            &desc(800.0, 400.0),
            &desc(300.0, 300.0),
            CropPolicy::Auto,
        );
        assert_eq!(copy.source, rect(0.0, 0.0, 800.0, 400.0));
        assert_eq!(copy.destination, rect(0.0, 0.0, 300.0, 300.0));
    }

    #[test]
    fn autofill_wide_source_letterboxes() {
        // 800x400 into 300x300 → 300x150 band at y=75
        let copy = compute_copy_rectangles(
            &desc(800.0, 400.0),
            &desc(300.0, 300.0),
            CropPolicy::AutoFill,
        );
        assert_eq!(copy.source, rect(0.0, 0.0, 800.0, 400.0));
        assert_eq!(copy.destination, rect(0.0, 75.0, 300.0, 150.0));
    }

    #[test]
    fn autofill_tall_source_pillarboxes() {
        // 400x800 into 300x300 → 150x300 band at x=75
        let copy = compute_copy_rectangles(
            &desc(400.0, 800.0),
            &desc(300.0, 300.0),
            CropPolicy::AutoFill,
        );
        assert_eq!(copy.destination, rect(75.0, 0.0, 150.0, 300.0));
    }

    #[test]
    fn cut_wide_source_trims_sides() {
        // 800x400 into 300x300: 400x400 from x=200
        let copy = compute_copy_rectangles(
            &desc(800.0, 400.0),
            &desc(300.0, 300.0),
            CropPolicy::Cut,
        );
        assert_eq!(copy.source, rect(200.0, 0.0, 400.0, 400.0));
        assert_eq!(copy.destination, rect(0.0, 0.0, 300.0, 300.0));
    }

    #[test]
    fn cut_tall_source_trims_top_and_bottom() {
        // 400x800 into 200x100 (2:1): 400x200 from y=300
        let copy = compute_copy_rectangles(
            &desc(400.0, 800.0),
            &desc(200.0, 100.0),
            CropPolicy::Cut,
        );
        assert_eq!(copy.source, rect(0.0, 300.0, 400.0, 200.0));
    }

    #[test]
    fn boundary_equality_does_not_clamp() {
        // Candidate equals the bound exactly: both policies keep full rectangles
        let source = desc(600.0, 300.0);
        let target = desc(200.0, 100.0);
        for policy in [CropPolicy::AutoFill, CropPolicy::Cut] {
            let copy = compute_copy_rectangles(&source, &target, policy);
            assert_eq!(copy.source, Rect::full(&source));
            assert_eq!(copy.destination, Rect::full(&target));
        }
    }

    // =========================================================================
    // to_pixels
    // =========================================================================

    #[test]
    fn to_pixels_rounds_edges() {
        let copy = CopyRectanglePair {
            source: rect(0.4, 0.0, 99.2, 50.0),
            destination: rect(0.0, 74.5, 300.0, 150.0),
        };
        let px = copy.to_pixels((100, 50), (300, 300));
        assert_eq!(
            px.source,
            PixelRect {
                x: 0,
                y: 0,
                width: 100,
                height: 50
            }
        );
        assert_eq!(
            px.destination,
            PixelRect {
                x: 0,
                y: 75,
                width: 300,
                height: 150
            }
        );
    }

    #[test]
    fn to_pixels_clamps_to_bounds() {
        let copy = CopyRectanglePair {
            source: rect(-3.0, 10.0, 120.0, 90.0),
            destination: rect(0.0, 0.0, 10.0, 10.0),
        };
        let px = copy.to_pixels((100, 50), (10, 10));
        assert_eq!(
            px.source,
            PixelRect {
                x: 0,
                y: 10,
                width: 100,
                height: 40
            }
        );
    }

    #[test]
    fn to_pixels_nan_collapses_to_empty() {
        let copy = CopyRectanglePair {
            source: rect(f64::NAN, 0.0, f64::NAN, 10.0),
            destination: rect(0.0, 0.0, 10.0, 10.0),
        };
        assert!(copy.to_pixels((10, 10), (10, 10)).source.is_empty());
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn side_strategy() -> impl Strategy<Value = f64> {
        (1u32..=4000).prop_map(f64::from)
    }

    const EPS: f64 = 1e-9;

    proptest! {
        /// Property: with equal ratios all three policies agree.
        #[test]
        fn prop_policies_agree_on_matching_ratio(
            sw in side_strategy(),
            sh in side_strategy(),
            scale in 0.05f64..5.0,
        ) {
            let source = desc(sw, sh);
            let target = desc(sw * scale, sh * scale);
            let auto = compute_copy_rectangles(&source, &target, CropPolicy::Auto);
            for policy in [CropPolicy::AutoFill, CropPolicy::Cut] {
                let copy = compute_copy_rectangles(&source, &target, policy);
                for (a, b) in [(copy.source, auto.source), (copy.destination, auto.destination)] {
                    prop_assert!((a.x - b.x).abs() < 1e-6);
                    prop_assert!((a.y - b.y).abs() < 1e-6);
                    prop_assert!((a.width - b.width).abs() < 1e-6);
                    prop_assert!((a.height - b.height).abs() < 1e-6);
                }
            }
        }

        /// Property: AUTOFILL stays inside the canvas and pads at most one axis.
        #[test]
        fn prop_autofill_contained_single_axis_padding(
            sw in side_strategy(),
            sh in side_strategy(),
            tw in side_strategy(),
            th in side_strategy(),
        ) {
            let target = desc(tw, th);
            let dest = compute_copy_rectangles(&desc(sw, sh), &target, CropPolicy::AutoFill).destination;
            prop_assert!(dest.x >= -EPS && dest.y >= -EPS);
            prop_assert!(dest.x + dest.width <= tw + 1e-6);
            prop_assert!(dest.y + dest.height <= th + 1e-6);
            prop_assert!(dest.x.abs() < EPS || dest.y.abs() < EPS);
            // Source ratio is preserved in the destination
            prop_assert!((dest.width / dest.height - sw / sh).abs() < 1e-6 * (sw / sh).max(1.0));
        }

        /// Property: CUT selects a region inside the source with the target's ratio.
        #[test]
        fn prop_cut_contained_with_target_ratio(
            sw in side_strategy(),
            sh in side_strategy(),
            tw in side_strategy(),
            th in side_strategy(),
        ) {
            let target = desc(tw, th);
            let src = compute_copy_rectangles(&desc(sw, sh), &target, CropPolicy::Cut).source;
            prop_assert!(src.x >= -EPS && src.y >= -EPS);
            prop_assert!(src.x + src.width <= sw + 1e-6);
            prop_assert!(src.y + src.height <= sh + 1e-6);
            let ratio = src.width / src.height;
            prop_assert!((ratio - target.aspect_ratio).abs() < 1e-6 * target.aspect_ratio.max(1.0));
        }

        /// Property: resolving twice changes nothing.
        #[test]
        fn prop_resolve_idempotent(
            sw in side_strategy(),
            sh in side_strategy(),
            width in proptest::option::of(side_strategy()),
            height in proptest::option::of(side_strategy()),
            ratio in proptest::option::of(0.1f64..10.0),
        ) {
            let source = desc(sw, sh);
            let option = SizeOption {
                width: width.map(Dimension::Fixed),
                height: height.map(Dimension::Fixed),
                ratio: ratio.map(Dimension::Fixed),
                ..SizeOption::default()
            };
            let once = resolve(&option, &source);
            prop_assert_eq!(once, resolve(&SizeOption::from(once), &source));
        }

        /// Property: rounded rectangles never leave their canvases.
        #[test]
        fn prop_pixels_within_bounds(
            sw in 1u32..2000,
            sh in 1u32..2000,
            tw in 1u32..2000,
            th in 1u32..2000,
        ) {
            let source = ImageDescriptor::from_pixels(sw, sh);
            let target = ImageDescriptor::from_pixels(tw, th);
            for policy in [CropPolicy::Auto, CropPolicy::AutoFill, CropPolicy::Cut] {
                let px = compute_copy_rectangles(&source, &target, policy).to_pixels((sw, sh), (tw, th));
                prop_assert!(px.source.x + px.source.width <= sw);
                prop_assert!(px.source.y + px.source.height <= sh);
                prop_assert!(px.destination.x + px.destination.width <= tw);
                prop_assert!(px.destination.y + px.destination.height <= th);
            }
        }
    }
}
