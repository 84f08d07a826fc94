//! Error types for Radiance HDR decoding and encoding.

use std::io;
use thiserror::Error;

/// Radiance HDR error.
#[derive(Debug, Error)]
pub enum HdrError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Header terminator missing, or resolution line unparsable or non-positive.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// `FORMAT=` field missing or not `32-bit_rle_rgbe`.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// New-style scanline declares a width other than the header's.
    #[error("scanline {row}: RLE width {found} does not match image width {expected}")]
    ScanlineWidthMismatch {
        /// Zero-based scanline index, top row first.
        row: usize,
        /// Width from the resolution line.
        expected: usize,
        /// Width from the scanline signature.
        found: usize,
    },

    /// Pixel data ended before every scanline was decoded.
    #[error("pixel data truncated in scanline {row}")]
    Truncated {
        /// Zero-based scanline index being decoded.
        row: usize,
    },

    /// Buffer size or dimensions the format cannot hold.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Pixel data that cannot be written with the requested scanline encoding.
    #[error("encode error: {0}")]
    Encode(String),
}

/// Payload-free classification of [`HdrError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// See [`HdrError::Io`].
    Io,
    /// See [`HdrError::MalformedHeader`].
    MalformedHeader,
    /// See [`HdrError::UnsupportedFormat`].
    UnsupportedFormat,
    /// See [`HdrError::ScanlineWidthMismatch`].
    ScanlineWidthMismatch,
    /// See [`HdrError::Truncated`].
    Truncated,
    /// See [`HdrError::InvalidDimensions`].
    InvalidDimensions,
    /// See [`HdrError::Encode`].
    Encode,
}

impl HdrError {
    /// Kind of this error, without its details.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            HdrError::Io(_) => DecodeErrorKind::Io,
            HdrError::MalformedHeader(_) => DecodeErrorKind::MalformedHeader,
            HdrError::UnsupportedFormat(_) => DecodeErrorKind::UnsupportedFormat,
            HdrError::ScanlineWidthMismatch { .. } => DecodeErrorKind::ScanlineWidthMismatch,
            HdrError::Truncated { .. } => DecodeErrorKind::Truncated,
            HdrError::InvalidDimensions(_) => DecodeErrorKind::InvalidDimensions,
            HdrError::Encode(_) => DecodeErrorKind::Encode,
        }
    }
}

/// Result type for Radiance HDR operations.
pub type HdrResult<T> = Result<T, HdrError>;
