//! EXIF orientation: read the tag, undo it on decoded pixels.
//!
//! Values follow the EXIF convention (1–8). Correction consumes the decoded
//! image and returns the upright one, so only one handle ever exists.

use exif::{In, Reader, Tag};
use image::DynamicImage;
use std::io::Cursor;

/// How the stored pixels must be transformed to appear upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// 1
    #[default]
    Normal,
    /// 2
    FlipHorizontal,
    /// 3
    Rotate180,
    /// 4
    FlipVertical,
    /// 5: mirror across the main diagonal
    Transpose,
    /// 6
    Rotate90Cw,
    /// 7: mirror across the anti-diagonal
    Transverse,
    /// 8
    Rotate90Ccw,
}

impl Orientation {
    /// Map an EXIF value; anything outside 1–8 is `None`.
    pub fn from_exif(value: u32) -> Option<Self> {
        Some(match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90Cw,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate90Ccw,
            _ => return None,
        })
    }

    /// Whether correcting swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90Cw
                | Orientation::Transverse
                | Orientation::Rotate90Ccw
        )
    }

    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::FlipHorizontal => img.fliph(),
            Orientation::Rotate180 => img.rotate180(),
            Orientation::FlipVertical => img.flipv(),
            Orientation::Transpose => img.flipv().rotate90(),
            Orientation::Rotate90Cw => img.rotate90(),
            Orientation::Transverse => img.fliph().rotate90(),
            Orientation::Rotate90Ccw => img.rotate270(),
        }
    }
}

/// Read the primary-IFD Orientation tag from an encoded file.
///
/// Returns `None` when there is no EXIF block, no tag, or an unknown value.
pub fn read_orientation(bytes: &[u8]) -> Option<Orientation> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let value = exif
        .get_field(Tag::Orientation, In::PRIMARY)?
        .value
        .get_uint(0)?;
    Orientation::from_exif(value)
}

/// Splice a minimal big-endian EXIF APP1 segment carrying `value` right
/// after the SOI marker of `jpeg`.
#[cfg(test)]
pub(crate) fn with_exif_orientation(jpeg: &[u8], value: u16) -> Vec<u8> {
    let [hi, lo] = value.to_be_bytes();
    let tiff: [u8; 26] = [
        b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, // header, IFD0 at 8
        0x00, 0x01, // one entry
        0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, hi, lo, 0x00, 0x00, // Orientation SHORT
        0x00, 0x00, 0x00, 0x00, // no next IFD
    ];
    let payload_len = (2 + 6 + tiff.len()) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + payload_len as usize + 2);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&payload_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}
