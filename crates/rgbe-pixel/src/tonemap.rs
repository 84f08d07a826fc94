//! Exposure and gamma tone mapping to 8-bit display buffers.
//!
//! ```text
//! factor = 2^exposure / 2
//! out    = clamp(255 * (linear * factor)^(1 / gamma), 0, 255)
//! ```
//!
//! ## Parameters
//! - `exposure`: 1.0 is neutral (factor 1); each unit doubles brightness.
//! - `gamma`: 2.2 for a conventional display, 1.0 for linear output.
//!
//! Output is RGBA with alpha fixed at 255. Channels round to the nearest
//! integer, ties to even.
//!
//! There is no hidden state: a viewer that lets the user drag exposure or
//! gamma keeps the decoded buffer and calls [`ToneMap::apply_rgbe_into`] or
//! [`ToneMap::apply_float_into`] again with the same destination.

use crate::parallel::{check_destination, map_pixels, pixel_count};
use crate::rgbe::{FLOAT_STRIDE, RGBE_STRIDE, rgbe_scale};

/// Bytes per LDR pixel (RGBA).
pub const LDR_STRIDE: usize = 4;

/// Neutral exposure.
pub const DEFAULT_EXPOSURE: f32 = 1.0;

/// Conventional display gamma.
pub const DEFAULT_GAMMA: f32 = 2.2;

/// Exposure and gamma for LDR conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneMap {
    /// Exposure in stops; 1.0 leaves values unscaled.
    pub exposure: f32,
    /// Display gamma; the encoded value is `linear^(1/gamma)`.
    pub gamma: f32,
}

impl Default for ToneMap {
    fn default() -> Self {
        Self {
            exposure: DEFAULT_EXPOSURE,
            gamma: DEFAULT_GAMMA,
        }
    }
}

impl ToneMap {
    /// Creates a tone map with the given exposure and gamma.
    pub fn new(exposure: f32, gamma: f32) -> Self {
        Self { exposure, gamma }
    }

    /// Linear multiplier implied by `exposure`: `2^exposure / 2`.
    #[inline]
    pub fn exposure_factor(&self) -> f64 {
        (self.exposure as f64).exp2() / 2.0
    }

    /// Maps an exposure-scaled linear value to a display byte.
    #[inline]
    fn encode(&self, linear: f64) -> u8 {
        let v = if linear <= 0.0 {
            0.0
        } else {
            linear.powf(1.0 / self.gamma as f64)
        };
        // NaN falls through the clamp and casts to 0.
        (255.0 * v).clamp(0.0, 255.0).round_ties_even() as u8
    }

    /// Tone maps a packed RGBE buffer to RGBA8.
    ///
    /// # Panics
    ///
    /// Panics if `rgbe.len()` is not a multiple of 4.
    pub fn apply_rgbe(&self, rgbe: &[u8]) -> Vec<u8> {
        let pixels = pixel_count(rgbe.len(), RGBE_STRIDE, "RGBE");
        let mut out = vec![0u8; pixels * LDR_STRIDE];
        self.apply_rgbe_into(rgbe, &mut out);
        out
    }

    /// Tone maps a packed RGBE buffer into a caller-supplied RGBA8 buffer.
    ///
    /// # Panics
    ///
    /// Panics if `rgbe.len()` is not a multiple of 4 or `out` is not the
    /// same length as `rgbe`.
    pub fn apply_rgbe_into<'a>(&self, rgbe: &[u8], out: &'a mut [u8]) -> &'a mut [u8] {
        let pixels = pixel_count(rgbe.len(), RGBE_STRIDE, "RGBE");
        check_destination(out.len(), pixels, LDR_STRIDE, "LDR");
        let factor = self.exposure_factor();
        map_pixels(rgbe, RGBE_STRIDE, out, LDR_STRIDE, |i, o| {
            let s = factor * rgbe_scale(i[3]);
            o[0] = self.encode(i[0] as f64 * s);
            o[1] = self.encode(i[1] as f64 * s);
            o[2] = self.encode(i[2] as f64 * s);
            o[3] = 255;
        });
        out
    }

    /// Tone maps linear float triples to RGBA8.
    ///
    /// # Panics
    ///
    /// Panics if `rgb.len()` is not a multiple of 3.
    pub fn apply_float(&self, rgb: &[f32]) -> Vec<u8> {
        let pixels = pixel_count(rgb.len(), FLOAT_STRIDE, "float");
        let mut out = vec![0u8; pixels * LDR_STRIDE];
        self.apply_float_into(rgb, &mut out);
        out
    }

    /// Tone maps linear float triples into a caller-supplied RGBA8 buffer.
    ///
    /// # Panics
    ///
    /// Panics if `rgb.len()` is not a multiple of 3 or `out` does not hold
    /// four bytes per input pixel.
    pub fn apply_float_into<'a>(&self, rgb: &[f32], out: &'a mut [u8]) -> &'a mut [u8] {
        let pixels = pixel_count(rgb.len(), FLOAT_STRIDE, "float");
        check_destination(out.len(), pixels, LDR_STRIDE, "LDR");
        let factor = self.exposure_factor();
        map_pixels(rgb, FLOAT_STRIDE, out, LDR_STRIDE, |i, o| {
            o[0] = self.encode(i[0] as f64 * factor);
            o[1] = self.encode(i[1] as f64 * factor);
            o[2] = self.encode(i[2] as f64 * factor);
            o[3] = 255;
        });
        out
    }
}

/// Tone maps a packed RGBE buffer to RGBA8.
///
/// # Example
///
/// ```rust
/// use rgbe_pixel::tonemap::rgbe_to_ldr;
///
/// // 1.0 at neutral exposure and linear gamma is full white
/// let ldr = rgbe_to_ldr(&[128, 128, 128, 129], 1.0, 1.0);
/// assert_eq!(ldr, vec![255, 255, 255, 255]);
/// ```
pub fn rgbe_to_ldr(rgbe: &[u8], exposure: f32, gamma: f32) -> Vec<u8> {
    ToneMap::new(exposure, gamma).apply_rgbe(rgbe)
}

/// [`rgbe_to_ldr`] into a caller-supplied buffer.
pub fn rgbe_to_ldr_into<'a>(rgbe: &[u8], exposure: f32, gamma: f32, out: &'a mut [u8]) -> &'a mut [u8] {
    ToneMap::new(exposure, gamma).apply_rgbe_into(rgbe, out)
}

/// Tone maps linear float triples to RGBA8.
pub fn float_to_ldr(rgb: &[f32], exposure: f32, gamma: f32) -> Vec<u8> {
    ToneMap::new(exposure, gamma).apply_float(rgb)
}

/// [`float_to_ldr`] into a caller-supplied buffer.
pub fn float_to_ldr_into<'a>(rgb: &[f32], exposure: f32, gamma: f32, out: &'a mut [u8]) -> &'a mut [u8] {
    ToneMap::new(exposure, gamma).apply_float_into(rgb, out)
}

/// Exposure in stops that maps `peak` linear radiance to display white.
///
/// Inverse of [`ToneMap::exposure_factor`] for a single value; handy for
/// picking an initial exposure from an image's brightest pixel.
pub fn exposure_for_peak(peak: f32) -> f32 {
    if peak > 0.0 && peak.is_finite() {
        (1.0 - (peak as f64).log2()) as f32
    } else {
        DEFAULT_EXPOSURE
    }
}
