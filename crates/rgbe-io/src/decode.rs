//! Whole-file decoding: header once, then every scanline top to bottom.
//!
//! Decoding is all-or-nothing. The first failing step ends the call and its
//! error is returned; no partial image is produced.

use crate::header::{Header, parse_header};
use crate::scanline::{ScanlineDecoder, ScanlineFault};
use crate::{HdrError, HdrResult};
use rgbe_pixel::{ToneMap, float_to_rgb9e5, rgbe_to_float};
use tracing::{debug, trace};

/// Decoded pixels: `width * height` RGBE quads, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Pixels per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Packed RGBE bytes, `width * height * 4` long.
    pub rgbe: Vec<u8>,
}

impl DecodedImage {
    /// Wraps an RGBE buffer, checking its length against the dimensions.
    pub fn new(width: usize, height: usize, rgbe: Vec<u8>) -> HdrResult<Self> {
        let expected = rgbe_len(width, height)?;
        if rgbe.len() != expected {
            return Err(HdrError::InvalidDimensions(format!(
                "{}x{} image needs {} RGBE bytes, got {}",
                width,
                height,
                expected,
                rgbe.len()
            )));
        }
        Ok(Self { width, height, rgbe })
    }

    /// RGBE quad at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.rgbe[i], self.rgbe[i + 1], self.rgbe[i + 2], self.rgbe[i + 3]])
    }

    /// Linear float triples.
    pub fn to_float(&self) -> Vec<f32> {
        rgbe_to_float(&self.rgbe)
    }

    /// RGB9_E5 words, via linear float.
    pub fn to_rgb9e5(&self) -> Vec<u32> {
        float_to_rgb9e5(&self.to_float())
    }

    /// Tone-mapped RGBA8.
    pub fn to_ldr(&self, tone: &ToneMap) -> Vec<u8> {
        tone.apply_rgbe(&self.rgbe)
    }

    /// Gives up the pixel buffer.
    pub fn into_rgbe(self) -> Vec<u8> {
        self.rgbe
    }
}

/// A decoded image together with its header.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrImage {
    /// Parsed header, including metadata fields.
    pub header: Header,
    /// Pixel data.
    pub image: DecodedImage,
}

/// Decodes a complete Radiance HDR file held in memory.
///
/// # Errors
///
/// [`HdrError::MalformedHeader`], [`HdrError::UnsupportedFormat`],
/// [`HdrError::ScanlineWidthMismatch`] as described on each variant, and
/// [`HdrError::Truncated`] when the body is shorter than the header claims.
///
/// # Example
///
/// ```rust
/// use rgbe_io::decode_hdr;
///
/// let mut file = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 2\n".to_vec();
/// file.extend_from_slice(&[10, 20, 30, 129, 1, 1, 1, 3]);
///
/// let image = decode_hdr(&file)?;
/// assert_eq!((image.width, image.height), (2, 1));
/// assert_eq!(image.rgbe, [10, 20, 30, 129, 10, 20, 30, 129]);
/// # Ok::<(), rgbe_io::HdrError>(())
/// ```
pub fn decode_hdr(bytes: &[u8]) -> HdrResult<DecodedImage> {
    decode_hdr_with_header(bytes).map(|hdr| hdr.image)
}

/// Like [`decode_hdr`], also returning the parsed header.
pub fn decode_hdr_with_header(bytes: &[u8]) -> HdrResult<HdrImage> {
    trace!(len = bytes.len(), "decode_hdr");
    let header = parse_header(bytes)?;
    let image = decode_body(&bytes[header.data_offset..], header.width, header.height)?;
    Ok(HdrImage { header, image })
}

/// Decodes `height` scanlines of `width` pixels from `body`.
pub fn decode_body(body: &[u8], width: usize, height: usize) -> HdrResult<DecodedImage> {
    if width == 0 || height == 0 {
        return Err(HdrError::InvalidDimensions(format!("{}x{} image", width, height)));
    }
    let total = rgbe_len(width, height)?;
    let row_len = width * 4;

    // Every scanline takes at least four bytes, so a short body fails before
    // anything is allocated for it.
    let max_rows = body.len() / 4;
    if height > max_rows {
        return Err(HdrError::Truncated { row: max_rows });
    }

    let mut rgbe = Vec::new();
    let mut decoder = ScanlineDecoder::new(width);
    let mut pos = 0usize;
    for row in 0..height {
        let start = rgbe.len();
        rgbe.try_reserve(row_len).map_err(|_| {
            HdrError::InvalidDimensions(format!("cannot allocate {} bytes for {}x{}", total, width, height))
        })?;
        rgbe.resize(start + row_len, 0);
        pos += decoder.decode(&body[pos..], &mut rgbe[start..]).map_err(|fault| match fault {
            ScanlineFault::Truncated => HdrError::Truncated { row },
            ScanlineFault::WidthMismatch { found } => HdrError::ScanlineWidthMismatch {
                row,
                expected: width,
                found,
            },
        })?;
    }

    debug!(width, height, consumed = pos, trailing = body.len() - pos, "decoded HDR body");
    Ok(DecodedImage { width, height, rgbe })
}

fn rgbe_len(width: usize, height: usize) -> HdrResult<usize> {
    width
        .checked_mul(height)
        .and_then(|p| p.checked_mul(4))
        .ok_or_else(|| HdrError::InvalidDimensions(format!("{}x{} overflows", width, height)))
}
