//! # rgbe-io
//!
//! Radiance HDR (`.hdr`, `.pic`) decoding and encoding.
//!
//! Decoding turns a byte buffer into a packed RGBE image:
//!
//! ```text
//! bytes -> header -> scanline x height -> RGBE buffer
//! ```
//!
//! Both scanline encodings are read: the legacy flat form with
//! `(1, 1, 1, n)` repeat markers and the per-channel RLE form introduced by
//! Radiance 2. Only `FORMAT=32-bit_rle_rgbe` files are accepted.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rgbe_io::{read, ToneMap};
//!
//! let hdr = read("memorial.hdr")?;
//! println!("{}x{}", hdr.image.width, hdr.image.height);
//!
//! let linear = hdr.image.to_float();
//! let preview = hdr.image.to_ldr(&ToneMap::default());
//! ```
//!
//! # Modules
//!
//! - [`header`] - Header and resolution line parsing
//! - [`scanline`] - Flat and new-style RLE scanline decoders
//! - [`decode`] - Whole-file decoding
//! - [`encode`] - Radiance HDR writing
//!
//! Pixel conversions live in [`rgbe_pixel`], re-exported here.
//!
//! # Feature Flags
//!
//! - `rayon` - Parallel pixel conversion (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod decode;
pub mod encode;
pub mod header;
pub mod scanline;

pub use decode::{DecodedImage, HdrImage, decode_body, decode_hdr, decode_hdr_with_header};
pub use encode::{EncodeOptions, RleMode, encode_float_hdr, encode_hdr, write_hdr};
pub use error::{DecodeErrorKind, HdrError, HdrResult};
pub use header::{FORMAT_RGBE, Header, parse_header};
pub use rgbe_pixel::{self, ToneMap};

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::trace;

/// Reads and decodes a Radiance HDR file.
///
/// The whole file is read into memory first.
///
/// # Errors
///
/// [`HdrError::Io`] if the file cannot be read, otherwise as for
/// [`decode_hdr`].
pub fn read<P: AsRef<Path>>(path: P) -> HdrResult<HdrImage> {
    let path = path.as_ref();
    trace!(path = %path.display(), "rgbe_io::read");
    let bytes = fs::read(path)?;
    decode_hdr_with_header(&bytes)
}

/// Encodes and writes an image as a Radiance HDR file.
pub fn write<P: AsRef<Path>>(path: P, image: &DecodedImage, options: &EncodeOptions) -> HdrResult<()> {
    let path = path.as_ref();
    trace!(path = %path.display(), "rgbe_io::write");
    let mut writer = BufWriter::new(fs::File::create(path)?);
    write_hdr(&mut writer, image.width, image.height, &image.rgbe, options)?;
    writer.flush()?;
    Ok(())
}

/// Writes an [`HdrImage`], keeping its program identifier and header
/// fields. Fields from `options` come first.
pub fn write_with_header<P: AsRef<Path>>(path: P, hdr: &HdrImage, options: &EncodeOptions) -> HdrResult<()> {
    let mut options = options.clone();
    options.fields.extend(hdr.header.fields.iter().cloned());
    if let Some(program) = &hdr.header.program {
        options.program = program.clone();
    }
    write(path, &hdr.image, &options)
}
