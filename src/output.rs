//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! photo.jpg
//!     Format: jpg
//!     Size: 800x400 (ratio 2.000)
//! ```
//!
//! ## Resize
//!
//! ```text
//! photo.jpg → 300x300 png (autofill)
//!     Source: 800x400 at 0,0
//!     Destination: 300x150 at 0,75
//!     Saved: out/photo.png
//! ```
//!
//! The last line is omitted when no save was requested, and reads
//! `Save failed: <stem>` when the encoder could not write it.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. `--json` output
//! goes through the serializable `*Report` structs instead.

use crate::imaging::{
    CropPolicy, ImageDescriptor, ImageInfo, OutputFormat, PixelCopy, PixelRect, Resized,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

const INDENT: &str = "    ";

fn rect_line(label: &str, rect: &PixelRect) -> String {
    format!(
        "{INDENT}{label}: {}x{} at {},{}",
        rect.width, rect.height, rect.x, rect.y
    )
}

// ============================================================================
// Info
// ============================================================================

pub fn format_info<I>(path: &Path, info: &ImageInfo<I>) -> Vec<String> {
    let mut lines = vec![path.display().to_string()];
    match info.format {
        Some(format) => {
            lines.push(format!("{INDENT}Format: {format}"));
            lines.push(format!(
                "{INDENT}Size: {}x{} (ratio {:.3})",
                info.width, info.height, info.ratio
            ));
        }
        None => lines.push(format!("{INDENT}Unreadable: no decoder accepted the file")),
    }
    lines
}

pub fn print_info<I>(path: &Path, info: &ImageInfo<I>) {
    for line in format_info(path, info) {
        println!("{}", line);
    }
}

#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub path: PathBuf,
    pub format: Option<OutputFormat>,
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
}

pub fn info_report<I>(path: &Path, info: &ImageInfo<I>) -> InfoReport {
    InfoReport {
        path: path.to_path_buf(),
        format: info.format,
        width: info.width,
        height: info.height,
        ratio: info.ratio,
    }
}

// ============================================================================
// Resize
// ============================================================================

pub fn format_resize<I>(path: &Path, resized: &Resized<I>) -> Vec<String> {
    let mut lines = vec![format!(
        "{} → {}x{} {} ({})",
        path.display(),
        resized.width,
        resized.height,
        resized.format,
        resized.option.crop
    )];
    lines.push(rect_line("Source", &resized.pixels.source));
    lines.push(rect_line("Destination", &resized.pixels.destination));
    match (&resized.saved, &resized.save_stem) {
        (Some(saved), _) => lines.push(format!("{INDENT}Saved: {}", saved.display())),
        (None, Some(stem)) => lines.push(format!("{INDENT}Save failed: {}", stem.display())),
        (None, None) => {}
    }
    lines
}

pub fn print_resize<I>(path: &Path, resized: &Resized<I>) {
    for line in format_resize(path, resized) {
        println!("{}", line);
    }
}

#[derive(Debug, Serialize)]
pub struct ResizeReport {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub crop: CropPolicy,
    pub width: u32,
    pub height: u32,
    pub source: ImageDescriptor,
    pub output: ImageDescriptor,
    pub copy: PixelCopy,
    pub save_stem: Option<PathBuf>,
    pub saved: Option<PathBuf>,
}

pub fn resize_report<I>(path: &Path, resized: &Resized<I>) -> ResizeReport {
    ResizeReport {
        path: path.to_path_buf(),
        format: resized.format,
        crop: resized.option.crop,
        width: resized.width,
        height: resized.height,
        source: resized.source,
        output: resized.descriptor,
        copy: resized.pixels,
        save_stem: resized.save_stem.clone(),
        saved: resized.saved.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{
        Dimension, Quality, ResolvedOption, compute_copy_rectangles,
    };

    fn sample_resized(save_stem: Option<&str>, saved: Option<&str>) -> Resized<()> {
        let source = ImageDescriptor::new(800.0, 400.0);
        let target = ImageDescriptor::new(300.0, 300.0);
        let copy = compute_copy_rectangles(&source, &target, CropPolicy::AutoFill);
        Resized {
            image: (),
            format: OutputFormat::Png,
            width: 300,
            height: 300,
            descriptor: target,
            source,
            option: ResolvedOption {
                format: OutputFormat::Auto,
                crop: CropPolicy::AutoFill,
                width: Dimension::Fixed(300.0),
                height: Dimension::Fixed(300.0),
                ratio: 2.0,
                quality: Quality::default(),
            },
            copy,
            pixels: copy.to_pixels((800, 400), (300, 300)),
            save_stem: save_stem.map(PathBuf::from),
            saved: saved.map(PathBuf::from),
        }
    }

    #[test]
    fn info_readable() {
        let info = ImageInfo {
            image: Some(()),
            format: Some(OutputFormat::Jpeg),
            width: 800,
            height: 400,
            ratio: 2.0,
        };
        let lines = format_info(Path::new("photo.jpg"), &info);
        assert_eq!(
            lines,
            vec![
                "photo.jpg",
                "    Format: jpg",
                "    Size: 800x400 (ratio 2.000)",
            ]
        );
    }

    #[test]
    fn info_unreadable() {
        let info: ImageInfo<()> = ImageInfo {
            image: None,
            format: None,
            width: 0,
            height: 0,
            ratio: 0.0,
        };
        let lines = format_info(Path::new("broken.bin"), &info);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Unreadable"));
    }

    #[test]
    fn resize_lines_show_geometry() {
        let lines = format_resize(
            Path::new("photo.jpg"),
            &sample_resized(Some("out/photo"), Some("out/photo.png")),
        );
        assert_eq!(
            lines,
            vec![
                "photo.jpg → 300x300 png (autofill)",
                "    Source: 800x400 at 0,0",
                "    Destination: 300x150 at 0,75",
                "    Saved: out/photo.png",
            ]
        );
    }

    #[test]
    fn resize_without_save_request_has_no_save_line() {
        let lines = format_resize(Path::new("photo.jpg"), &sample_resized(None, None));
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| !l.contains("Save")));
    }

    #[test]
    fn resize_failed_save_names_the_stem() {
        let lines = format_resize(Path::new("photo.jpg"), &sample_resized(Some("out/photo"), None));
        assert_eq!(lines.last().map(String::as_str), Some("    Save failed: out/photo"));
    }

    #[test]
    fn resize_report_serializes() {
        let report = resize_report(Path::new("photo.jpg"), &sample_resized(None, None));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["format"], "png");
        assert_eq!(json["crop"], "autofill");
        assert_eq!(json["copy"]["destination"]["y"], 75);
        assert_eq!(json["saved"], serde_json::Value::Null);
        assert_eq!(json["save_stem"], serde_json::Value::Null);
    }
}
