//! RGB9_E5 <-> linear float conversion.
//!
//! Three 9-bit mantissas and a 5-bit shared exponent packed into a `u32`:
//!
//! ```text
//! bit  31       23 22       14 13        5 4    0
//!      [ R mant  ][ G mant   ][ B mant   ][ exp ]
//! ```
//!
//! Decoding is `mantissa * 2^(E - 24)` (exponent bias 16, nine mantissa
//! bits minus one). Inputs are clamped to `[0, 32768]` before packing, which
//! keeps the shared exponent inside its five bits.

use crate::parallel::{check_destination, exp2i, map_pixels, pixel_count};
use crate::rgbe::FLOAT_STRIDE;

/// Exponent bias of the shared exponent.
pub const RGB9E5_EXPONENT_BIAS: i32 = 16;

/// Bias plus mantissa normalisation: `value = m * 2^(E - 24)`.
pub const RGB9E5_EXPONENT_OFFSET: i32 = 24;

/// Largest encodable channel value; larger inputs are clamped to it.
pub const RGB9E5_MAX: f32 = 32768.0;

const MANTISSA_BITS: u32 = 9;
const MANTISSA_MASK: u32 = (1 << MANTISSA_BITS) - 1;
const EXPONENT_MASK: u32 = 0b11111;

/// Packs one linear RGB pixel.
///
/// Channels are clamped to `[0, RGB9E5_MAX]` (NaN becomes 0). When rounding
/// the largest channel would need a tenth mantissa bit, the exponent is
/// raised once and all channels re-rounded.
///
/// # Example
///
/// ```rust
/// use rgbe_pixel::rgb9e5::{pack_rgb9e5, unpack_rgb9e5};
///
/// let word = pack_rgb9e5([1.0, 0.5, 0.25]);
/// assert_eq!(unpack_rgb9e5(word), [1.0, 0.5, 0.25]);
/// ```
#[inline]
pub fn pack_rgb9e5(rgb: [f32; 3]) -> u32 {
    let clamp = |c: f32| if c > 0.0 { c.min(RGB9E5_MAX) as f64 } else { 0.0 };
    let (r, g, b) = (clamp(rgb[0]), clamp(rgb[1]), clamp(rgb[2]));
    let max_c = r.max(g).max(b);

    // log2(0) is -inf, which the floor of -16 absorbs.
    let mut exponent = (max_c.log2().floor() as i32).max(-RGB9E5_EXPONENT_BIAS) + RGB9E5_EXPONENT_BIAS;
    let mut denom = exp2i(exponent - RGB9E5_EXPONENT_OFFSET);

    if round_half_up(max_c / denom) > MANTISSA_MASK as f64 {
        denom *= 2.0;
        exponent += 1;
    }

    let quantize = |c: f64| round_half_up(c / denom) as u32 & MANTISSA_MASK;
    (quantize(r) << (MANTISSA_BITS * 2 + 5))
        | (quantize(g) << (MANTISSA_BITS + 5))
        | (quantize(b) << 5)
        | (exponent as u32 & EXPONENT_MASK)
}

/// Unpacks one RGB9_E5 word to linear RGB.
#[inline]
pub fn unpack_rgb9e5(word: u32) -> [f32; 3] {
    let r = (word >> (MANTISSA_BITS * 2 + 5)) & MANTISSA_MASK;
    let g = (word >> (MANTISSA_BITS + 5)) & MANTISSA_MASK;
    let b = (word >> 5) & MANTISSA_MASK;
    let s = exp2i((word & EXPONENT_MASK) as i32 - RGB9E5_EXPONENT_OFFSET);
    [
        (r as f64 * s) as f32,
        (g as f64 * s) as f32,
        (b as f64 * s) as f32,
    ]
}

#[inline]
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Packs linear float triples into RGB9_E5 words.
///
/// # Panics
///
/// Panics if `rgb.len()` is not a multiple of 3.
pub fn float_to_rgb9e5(rgb: &[f32]) -> Vec<u32> {
    let pixels = pixel_count(rgb.len(), FLOAT_STRIDE, "float");
    let mut out = vec![0u32; pixels];
    float_to_rgb9e5_into(rgb, &mut out);
    out
}

/// Packs linear float triples into a caller-supplied word buffer.
///
/// # Panics
///
/// Panics if `rgb.len()` is not a multiple of 3 or `out` does not hold
/// exactly one word per input pixel.
pub fn float_to_rgb9e5_into<'a>(rgb: &[f32], out: &'a mut [u32]) -> &'a mut [u32] {
    let pixels = pixel_count(rgb.len(), FLOAT_STRIDE, "float");
    check_destination(out.len(), pixels, 1, "RGB9_E5");
    map_pixels(rgb, FLOAT_STRIDE, out, 1, |i, o| {
        o[0] = pack_rgb9e5([i[0], i[1], i[2]]);
    });
    out
}

/// Unpacks RGB9_E5 words to linear float triples.
pub fn rgb9e5_to_float(words: &[u32]) -> Vec<f32> {
    let mut out = vec![0.0f32; words.len() * FLOAT_STRIDE];
    rgb9e5_to_float_into(words, &mut out);
    out
}

/// Unpacks RGB9_E5 words into a caller-supplied float buffer.
///
/// # Panics
///
/// Panics if `out` does not hold exactly three floats per word.
pub fn rgb9e5_to_float_into<'a>(words: &[u32], out: &'a mut [f32]) -> &'a mut [f32] {
    check_destination(out.len(), words.len(), FLOAT_STRIDE, "float");
    map_pixels(words, 1, out, FLOAT_STRIDE, |i, o| {
        o.copy_from_slice(&unpack_rgb9e5(i[0]));
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_word() {
        assert_eq!(unpack_rgb9e5(0), [0.0, 0.0, 0.0]);
        assert_eq!(pack_rgb9e5([0.0, 0.0, 0.0]), 0);
    }

    #[test]
    fn test_bit_layout() {
        let word = pack_rgb9e5([1.0, 0.5, 0.25]);
        assert_eq!(word, (256 << 23) | (128 << 14) | (64 << 5) | 16);
    }

    #[test]
    fn test_rounding_renormalises() {
        // 511.75 rounds to 512 at exponent 16; repacked at 17 as 256
        let word = pack_rgb9e5([2.0 - 1.0 / 1024.0, 0.0, 0.0]);
        assert_eq!(word & EXPONENT_MASK, 17);
        assert_eq!(unpack_rgb9e5(word), [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_clamps_to_max() {
        let word = pack_rgb9e5([1.0e9, f32::INFINITY, 1.0]);
        let [r, g, b] = unpack_rgb9e5(word);
        assert_eq!(r, RGB9E5_MAX);
        assert_eq!(g, RGB9E5_MAX);
        assert_eq!(b, 0.0);
        assert_eq!(word & EXPONENT_MASK, 31);
    }

    #[test]
    fn test_just_below_max_stays_in_range() {
        let word = pack_rgb9e5([32767.9, 0.0, 0.0]);
        assert_eq!(word & EXPONENT_MASK, 31);
        assert_eq!(unpack_rgb9e5(word)[0], RGB9E5_MAX);
    }

    #[test]
    fn test_negative_and_nan_are_zero() {
        assert_eq!(pack_rgb9e5([-1.0, f32::NAN, -0.0]), 0);
        let word = pack_rgb9e5([-3.0, 1.0, f32::NAN]);
        assert_eq!(unpack_rgb9e5(word), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_tiny_values_use_floor_exponent() {
        // 2^-20 sits below the smallest normalised exponent
        let v = (-20.0f32).exp2();
        let word = pack_rgb9e5([v, 0.0, 0.0]);
        assert_eq!(word & EXPONENT_MASK, 0);
        assert_eq!(unpack_rgb9e5(word)[0], v);
    }

    #[test]
    fn test_buffers() {
        let floats = [1.0, 0.5, 0.25, 0.0, 0.0, 0.0];
        let words = float_to_rgb9e5(&floats);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1], 0);
        assert_eq!(rgb9e5_to_float(&words), floats.to_vec());
    }
}
