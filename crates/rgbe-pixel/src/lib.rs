//! # rgbe-pixel
//!
//! Pixel format conversions for high-dynamic-range interchange.
//!
//! Three HDR representations and one display representation:
//!
//! | Buffer | Element | Per pixel | Notes |
//! |--------|---------|-----------|-------|
//! | RGBE | `u8` | 4 | Radiance shared 8-bit exponent |
//! | RGB9_E5 | `u32` | 1 | 9-bit mantissas, 5-bit shared exponent |
//! | Float | `f32` | 3 | Linear radiance, unbounded |
//! | LDR | `u8` | 4 | Exposure/gamma applied RGBA, alpha 255 |
//!
//! # Conversions
//!
//! | From | To | Function |
//! |------|----|----------|
//! | RGBE | Float | [`rgbe_to_float`] |
//! | Float | RGBE | [`float_to_rgbe`] |
//! | Float | RGB9_E5 | [`float_to_rgb9e5`] |
//! | RGB9_E5 | Float | [`rgb9e5_to_float`] |
//! | RGBE | LDR | [`rgbe_to_ldr`] |
//! | Float | LDR | [`float_to_ldr`] |
//!
//! Every conversion has an `_into` twin writing into a caller-supplied
//! buffer of exactly the required size, so repeated calls reuse memory.
//! Buffers must be exact multiples of the pixel stride; violations panic.
//!
//! # Usage
//!
//! ```rust
//! use rgbe_pixel::{float_to_rgb9e5, rgb9e5_to_float, rgbe_to_float, ToneMap};
//!
//! let rgbe = [128u8, 64, 32, 129];
//! let linear = rgbe_to_float(&rgbe);
//! assert_eq!(linear, vec![1.0, 0.5, 0.25]);
//!
//! let packed = float_to_rgb9e5(&linear);
//! assert_eq!(rgb9e5_to_float(&packed), linear);
//!
//! let ldr = ToneMap::default().apply_rgbe(&rgbe);
//! assert_eq!(ldr[3], 255);
//! ```
//!
//! # Feature Flags
//!
//! - `rayon` - Stripe large conversions across the rayon pool (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod parallel;
pub mod rgb9e5;
pub mod rgbe;
pub mod tonemap;

pub use parallel::PAR_THRESHOLD;
pub use rgb9e5::{
    float_to_rgb9e5, float_to_rgb9e5_into, pack_rgb9e5, rgb9e5_to_float, rgb9e5_to_float_into,
    unpack_rgb9e5,
};
pub use rgbe::{float_to_rgbe, float_to_rgbe_into, rgb_to_rgbe, rgbe_to_float, rgbe_to_float_into, rgbe_to_rgb};
pub use tonemap::{ToneMap, float_to_ldr, float_to_ldr_into, rgbe_to_ldr, rgbe_to_ldr_into};
