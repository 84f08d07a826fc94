//! RGBE <-> linear float conversion.
//!
//! RGBE stores three 8-bit mantissas sharing one 8-bit exponent:
//!
//! ```text
//! value = mantissa * 2^(E - 136)
//! ```
//!
//! where 136 is the exponent bias (128) plus the 8-bit mantissa
//! normalisation. `E = 0` encodes black.
//!
//! Encoding truncates toward zero, so a decode/encode round trip of a
//! normalised pixel (largest mantissa >= 128) is exact.

use crate::parallel::{check_destination, exp2i, map_pixels, pixel_count};

/// Exponent bias of the RGBE shared exponent.
pub const RGBE_EXPONENT_BIAS: i32 = 128;

/// Bias plus mantissa normalisation: `value = m * 2^(E - 136)`.
pub const RGBE_EXPONENT_OFFSET: i32 = RGBE_EXPONENT_BIAS + 8;

/// Bytes per RGBE pixel.
pub const RGBE_STRIDE: usize = 4;

/// Floats per linear pixel.
pub const FLOAT_STRIDE: usize = 3;

/// Scale applied to the mantissas of a pixel with exponent byte `e`.
#[inline]
pub(crate) fn rgbe_scale(e: u8) -> f64 {
    exp2i(e as i32 - RGBE_EXPONENT_OFFSET)
}

/// Decodes one RGBE pixel to linear RGB.
///
/// # Example
///
/// ```rust
/// use rgbe_pixel::rgbe::rgbe_to_rgb;
///
/// assert_eq!(rgbe_to_rgb([128, 64, 0, 129]), [1.0, 0.5, 0.0]);
/// ```
#[inline]
pub fn rgbe_to_rgb(rgbe: [u8; 4]) -> [f32; 3] {
    let s = rgbe_scale(rgbe[3]);
    [
        (rgbe[0] as f64 * s) as f32,
        (rgbe[1] as f64 * s) as f32,
        (rgbe[2] as f64 * s) as f32,
    ]
}

/// Encodes one linear RGB pixel to RGBE.
///
/// The shared exponent is `ceil(log2(max(r, g, b)))`; an exact power of two
/// (0.5 among them) takes the next exponent up so its mantissa stays below
/// 256. Mantissas are truncated toward zero. A non-positive or NaN maximum,
/// or one too small for the 8-bit exponent, encodes as black; values beyond
/// the largest exponent saturate.
///
/// # Example
///
/// ```rust
/// use rgbe_pixel::rgbe::rgb_to_rgbe;
///
/// assert_eq!(rgb_to_rgbe([0.5, 0.25, 0.0]), [128, 64, 0, 128]);
/// assert_eq!(rgb_to_rgbe([0.0, 0.0, 0.0]), [0, 0, 0, 0]);
/// ```
#[inline]
pub fn rgb_to_rgbe(rgb: [f32; 3]) -> [u8; 4] {
    let v = rgb[0].max(rgb[1]).max(rgb[2]);
    if !(v > 0.0) {
        return [0; 4];
    }
    let v = v as f64;

    let mut e = v.log2().ceil() as i32;
    if e < 127 && v / exp2i(e - 8) >= 256.0 {
        e += 1;
    }
    let e = e.min(127);
    if e + RGBE_EXPONENT_BIAS <= 0 {
        return [0; 4];
    }

    let s = exp2i(e - 8);
    let quantize = |c: f32| (c as f64 / s).floor().clamp(0.0, 255.0) as u8;
    [
        quantize(rgb[0]),
        quantize(rgb[1]),
        quantize(rgb[2]),
        (e + RGBE_EXPONENT_BIAS) as u8,
    ]
}

/// Converts a packed RGBE buffer to linear float triples.
///
/// # Panics
///
/// Panics if `rgbe.len()` is not a multiple of 4.
pub fn rgbe_to_float(rgbe: &[u8]) -> Vec<f32> {
    let pixels = pixel_count(rgbe.len(), RGBE_STRIDE, "RGBE");
    let mut out = vec![0.0f32; pixels * FLOAT_STRIDE];
    rgbe_to_float_into(rgbe, &mut out);
    out
}

/// Converts a packed RGBE buffer into a caller-supplied float buffer.
///
/// Returns `out` for chaining.
///
/// # Panics
///
/// Panics if `rgbe.len()` is not a multiple of 4 or `out` does not hold
/// exactly three floats per input pixel.
pub fn rgbe_to_float_into<'a>(rgbe: &[u8], out: &'a mut [f32]) -> &'a mut [f32] {
    let pixels = pixel_count(rgbe.len(), RGBE_STRIDE, "RGBE");
    check_destination(out.len(), pixels, FLOAT_STRIDE, "float");
    map_pixels(rgbe, RGBE_STRIDE, out, FLOAT_STRIDE, |i, o| {
        o.copy_from_slice(&rgbe_to_rgb([i[0], i[1], i[2], i[3]]));
    });
    out
}

/// Converts linear float triples to a packed RGBE buffer.
///
/// # Panics
///
/// Panics if `rgb.len()` is not a multiple of 3.
pub fn float_to_rgbe(rgb: &[f32]) -> Vec<u8> {
    let pixels = pixel_count(rgb.len(), FLOAT_STRIDE, "float");
    let mut out = vec![0u8; pixels * RGBE_STRIDE];
    float_to_rgbe_into(rgb, &mut out);
    out
}

/// Converts linear float triples into a caller-supplied RGBE buffer.
///
/// # Panics
///
/// Panics if `rgb.len()` is not a multiple of 3 or `out` does not hold
/// exactly four bytes per input pixel.
pub fn float_to_rgbe_into<'a>(rgb: &[f32], out: &'a mut [u8]) -> &'a mut [u8] {
    let pixels = pixel_count(rgb.len(), FLOAT_STRIDE, "float");
    check_destination(out.len(), pixels, RGBE_STRIDE, "RGBE");
    map_pixels(rgb, FLOAT_STRIDE, out, RGBE_STRIDE, |i, o| {
        o.copy_from_slice(&rgb_to_rgbe([i[0], i[1], i[2]]));
    });
    out
}
