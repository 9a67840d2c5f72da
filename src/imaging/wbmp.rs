//! WBMP (Wireless Bitmap, type 0) codec.
//!
//! The `image` crate has no WBMP support, so this is a small hand-written
//! reader/writer for the only type in practical use.
//!
//! ## Layout
//!
//! ```text
//! 0x00                 type (0 = monochrome, no compression)
//! 0x00                 fixed header (no extension headers)
//! width                multi-byte integer
//! height               multi-byte integer
//! rows                 height × ceil(width / 8) bytes, MSB first, 1 = white
//! ```
//!
//! Multi-byte integers are big-endian groups of 7 bits; every byte except the
//! last has the continuation bit (0x80) set.
//!
//! The payload length must match the header exactly. WBMP has no magic
//! number, so this is what keeps arbitrary bytes from decoding as an image.

use image::{DynamicImage, GrayImage, Luma};
use std::io::{self, Write};
use thiserror::Error;

/// Longest multi-byte integer accepted (5 × 7 bits covers u32).
const MAX_INT_BYTES: usize = 5;

/// Luma at or above this encodes as a white bit.
const WHITE_THRESHOLD: u8 = 128;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WbmpError {
    #[error("unsupported WBMP type {0}")]
    UnsupportedType(u8),
    #[error("extension headers are not supported")]
    ExtensionHeaders,
    #[error("truncated header")]
    Truncated,
    #[error("dimension field overflows")]
    Overflow,
    #[error("zero-sized image")]
    Empty,
    #[error("payload is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },
}

fn read_int(bytes: &[u8], pos: &mut usize) -> Result<u32, WbmpError> {
    let mut value: u64 = 0;
    for _ in 0..MAX_INT_BYTES {
        let byte = *bytes.get(*pos).ok_or(WbmpError::Truncated)?;
        *pos += 1;
        value = (value << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return u32::try_from(value).map_err(|_| WbmpError::Overflow);
        }
    }
    Err(WbmpError::Overflow)
}

fn write_int(mut value: u32, out: &mut Vec<u8>) {
    let mut groups = [0u8; MAX_INT_BYTES];
    let mut n = 0;
    loop {
        groups[n] = (value & 0x7F) as u8;
        n += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}

fn row_bytes(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

/// Decode a type-0 WBMP into an 8-bit grayscale image (0 or 255).
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, WbmpError> {
    let mut pos = 0;
    let kind = *bytes.first().ok_or(WbmpError::Truncated)?;
    if kind != 0 {
        return Err(WbmpError::UnsupportedType(kind));
    }
    let fixed = *bytes.get(1).ok_or(WbmpError::Truncated)?;
    if fixed != 0 {
        return Err(WbmpError::ExtensionHeaders);
    }
    pos += 2;

    let width = read_int(bytes, &mut pos)?;
    let height = read_int(bytes, &mut pos)?;
    if width == 0 || height == 0 {
        return Err(WbmpError::Empty);
    }

    let stride = row_bytes(width);
    let expected = stride
        .checked_mul(height as usize)
        .ok_or(WbmpError::Overflow)?;
    let data = &bytes[pos..];
    if data.len() != expected {
        return Err(WbmpError::Length {
            expected,
            actual: data.len(),
        });
    }

    let img = GrayImage::from_fn(width, height, |x, y| {
        let byte = data[y as usize * stride + x as usize / 8];
        let bit = (byte >> (7 - (x % 8))) & 1;
        Luma([if bit == 1 { 255 } else { 0 }])
    });
    Ok(DynamicImage::ImageLuma8(img))
}

/// Encode `img` as type-0 WBMP, thresholding luma at 50%.
pub fn encode<W: Write>(img: &DynamicImage, mut writer: W) -> io::Result<()> {
    let luma = img.to_luma8();
    let (width, height) = luma.dimensions();
    let stride = row_bytes(width);

    let mut out = vec![0x00, 0x00];
    write_int(width, &mut out);
    write_int(height, &mut out);
    out.reserve(stride * height as usize);

    for row in luma.rows() {
        let mut packed = vec![0u8; stride];
        for (x, pixel) in row.enumerate() {
            if pixel.0[0] >= WHITE_THRESHOLD {
                packed[x / 8] |= 0x80 >> (x % 8);
            }
        }
        out.extend_from_slice(&packed);
    }

    writer.write_all(&out)?;
    writer.flush()
}
