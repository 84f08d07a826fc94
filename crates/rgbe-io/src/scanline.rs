//! Scanline run-length decoding.
//!
//! Two mutually exclusive encodings, chosen per scanline by its first four
//! bytes:
//!
//! - **New-style**: signature `2, 2, hi, lo` with the high bit of `hi`
//!   clear and `hi << 8 | lo == width`. Then four channel planes (R, G, B,
//!   E), each a sequence of packets: a control byte `> 128` repeats the
//!   next byte `control - 128` times, otherwise `control` literal bytes
//!   follow.
//! - **Old-style / flat**: raw RGBE quads, where a `(1, 1, 1, n)` quad
//!   repeats the previous output pixel `n << shift` times. `shift` grows by
//!   8 for each consecutive marker and resets after a literal pixel.
//!
//! Both decoders bound their writes to the scanline width: runs that
//! overrun it are cut short, their input bytes still consumed.

use tracing::{trace, warn};

/// Largest width a new-style signature can carry.
pub const MAX_RLE_WIDTH: usize = 0x7fff;

/// Why a single scanline failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanlineFault {
    /// Input ended mid-scanline.
    Truncated,
    /// New-style signature width differs from the expected width.
    WidthMismatch {
        /// Width carried by the signature.
        found: usize,
    },
}

/// Encoding of one scanline, as told by its first four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanlineEncoding {
    /// Per-channel RLE with the declared width.
    NewRle {
        /// `hi << 8 | lo` from the signature.
        width: usize,
    },
    /// Raw quads with `(1, 1, 1, n)` repeat markers.
    Flat,
}

impl ScanlineEncoding {
    /// Classifies a scanline by its first four bytes.
    #[inline]
    pub fn detect(sig: [u8; 4]) -> Self {
        if sig[0] == 2 && sig[1] == 2 && sig[2] & 0x80 == 0 {
            ScanlineEncoding::NewRle {
                width: (sig[2] as usize) << 8 | sig[3] as usize,
            }
        } else {
            ScanlineEncoding::Flat
        }
    }
}

/// Packet decoder state.
#[derive(Debug, Clone, Copy)]
enum RunState {
    ReadControl,
    CopyLiteral { count: usize },
    RepeatRun { value: u8, count: usize },
}

/// Decodes one new-style channel plane into `out`.
///
/// Stops once `out.len()` bytes are written. Returns the number of input
/// bytes consumed.
pub fn decode_channel(input: &[u8], out: &mut [u8]) -> Result<usize, ScanlineFault> {
    let width = out.len();
    let mut pos = 0usize;
    let mut x = 0usize;
    let mut state = RunState::ReadControl;

    loop {
        state = match state {
            RunState::ReadControl => {
                if x >= width {
                    break;
                }
                let control = *input.get(pos).ok_or(ScanlineFault::Truncated)?;
                pos += 1;
                if control > 128 {
                    let value = *input.get(pos).ok_or(ScanlineFault::Truncated)?;
                    pos += 1;
                    RunState::RepeatRun {
                        value,
                        count: (control - 128) as usize,
                    }
                } else {
                    if control == 0 {
                        trace!(pos, "zero-length RLE packet");
                    }
                    RunState::CopyLiteral {
                        count: control as usize,
                    }
                }
            }
            RunState::RepeatRun { value, count } => {
                let n = clip_run(count, width - x);
                out[x..x + n].fill(value);
                x += n;
                RunState::ReadControl
            }
            RunState::CopyLiteral { count } => {
                let src = input
                    .get(pos..pos + count)
                    .ok_or(ScanlineFault::Truncated)?;
                let n = clip_run(count, width - x);
                out[x..x + n].copy_from_slice(&src[..n]);
                x += n;
                pos += count;
                RunState::ReadControl
            }
        };
    }

    Ok(pos)
}

/// Decodes one flat (old-style) scanline into `out`, 4 bytes per pixel.
///
/// `prev` is the pixel written just before this scanline; a repeat marker
/// at the start of the scanline copies it. Returns input bytes consumed.
pub fn decode_flat(input: &[u8], out: &mut [u8], prev: [u8; 4]) -> Result<usize, ScanlineFault> {
    let width = out.len() / 4;
    let mut pos = 0usize;
    let mut x = 0usize;
    let mut shift = 0u32;
    let mut last = prev;

    while x < width {
        let px = input.get(pos..pos + 4).ok_or(ScanlineFault::Truncated)?;
        pos += 4;

        if px[0] == 1 && px[1] == 1 && px[2] == 1 {
            let count = if shift < usize::BITS {
                (px[3] as usize) << shift
            } else {
                usize::MAX
            };
            let n = clip_run(count, width - x);
            for dst in out[x * 4..(x + n) * 4].chunks_exact_mut(4) {
                dst.copy_from_slice(&last);
            }
            x += n;
            shift = shift.saturating_add(8);
        } else {
            last = [px[0], px[1], px[2], px[3]];
            out[x * 4..x * 4 + 4].copy_from_slice(&last);
            x += 1;
            shift = 0;
        }
    }

    Ok(pos)
}

#[inline]
fn clip_run(count: usize, remaining: usize) -> usize {
    if count > remaining {
        warn!(count, remaining, "RLE run overruns scanline, truncating");
        remaining
    } else {
        count
    }
}

/// Decodes successive scanlines of a fixed width.
///
/// Holds the channel planes used by new-style decoding and the last pixel
/// written, which old-style repeat markers refer to.
#[derive(Debug, Clone)]
pub struct ScanlineDecoder {
    width: usize,
    planes: Vec<u8>,
    prev: [u8; 4],
}

impl ScanlineDecoder {
    /// Creates a decoder for scanlines of `width` pixels.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn new(width: usize) -> Self {
        assert!(width > 0, "scanline width must be positive");
        Self {
            width,
            planes: Vec::new(),
            prev: [0; 4],
        }
    }

    /// Pixels per scanline.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Decodes one scanline from the start of `input` into `out`
    /// (`width * 4` bytes). Returns input bytes consumed.
    pub fn decode(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize, ScanlineFault> {
        debug_assert_eq!(out.len(), self.width * 4);
        let sig: [u8; 4] = input
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or(ScanlineFault::Truncated)?;

        let consumed = match ScanlineEncoding::detect(sig) {
            ScanlineEncoding::NewRle { width } if width != self.width => {
                return Err(ScanlineFault::WidthMismatch { found: width });
            }
            ScanlineEncoding::NewRle { .. } => 4 + self.decode_planes(&input[4..], out)?,
            ScanlineEncoding::Flat => decode_flat(input, out, self.prev)?,
        };

        if let Some(last) = out.chunks_exact(4).last() {
            self.prev = [last[0], last[1], last[2], last[3]];
        }
        Ok(consumed)
    }

    fn decode_planes(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize, ScanlineFault> {
        // New-style widths fit in 15 bits, so the planes stay small.
        self.planes.resize(self.width * 4, 0);
        let mut pos = 0;
        for plane in self.planes.chunks_exact_mut(self.width) {
            pos += decode_channel(&input[pos..], plane)?;
        }

        let (r, rest) = self.planes.split_at(self.width);
        let (g, rest) = rest.split_at(self.width);
        let (b, e) = rest.split_at(self.width);
        for (x, px) in out.chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&[r[x], g[x], b[x], e[x]]);
        }
        Ok(pos)
    }
}
