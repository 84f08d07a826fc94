//! Per-pixel drivers shared by every conversion.
//!
//! Each conversion is a kernel mapping one input pixel to one output pixel.
//! The drivers here walk the input and output buffers in lockstep. With the
//! `rayon` feature, images of at least [`PAR_THRESHOLD`] pixels are striped
//! across the global pool; every task owns a disjoint run of output pixels,
//! so no synchronisation is needed and results match the sequential path
//! bit for bit.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Pixel count from which conversions go parallel.
pub const PAR_THRESHOLD: usize = 64 * 1024;

/// Pixels handed to one rayon task.
#[cfg(feature = "rayon")]
const PIXELS_PER_TASK: usize = 4096;

/// Number of whole pixels in `len` elements of stride `stride`.
///
/// # Panics
///
/// Panics if `len` is not a multiple of `stride`.
#[inline]
pub(crate) fn pixel_count(len: usize, stride: usize, what: &str) -> usize {
    assert!(
        len % stride == 0,
        "{what} buffer length {len} is not a multiple of the {stride}-element pixel stride"
    );
    len / stride
}

/// Checks that a caller-supplied destination holds exactly `pixels` pixels.
///
/// # Panics
///
/// Panics on a size mismatch.
#[inline]
pub(crate) fn check_destination(len: usize, pixels: usize, stride: usize, what: &str) {
    assert!(
        len == pixels * stride,
        "{what} destination holds {len} elements, expected {} ({pixels} pixels x {stride})",
        pixels * stride
    );
}

/// Applies `kernel` to each (input pixel, output pixel) pair.
///
/// `src` and `dst` must describe the same number of pixels at their
/// respective strides; callers check this with [`pixel_count`] and
/// [`check_destination`] first.
pub(crate) fn map_pixels<I, O, F>(
    src: &[I],
    src_stride: usize,
    dst: &mut [O],
    dst_stride: usize,
    kernel: F,
) where
    I: Sync,
    O: Send,
    F: Fn(&[I], &mut [O]) + Sync + Send,
{
    let pixels = src.len() / src_stride;
    debug_assert_eq!(pixels * dst_stride, dst.len());

    #[cfg(feature = "rayon")]
    {
        if pixels >= PAR_THRESHOLD {
            dst.par_chunks_mut(dst_stride * PIXELS_PER_TASK)
                .zip(src.par_chunks(src_stride * PIXELS_PER_TASK))
                .for_each(|(out, inp)| {
                    for (o, i) in out.chunks_exact_mut(dst_stride).zip(inp.chunks_exact(src_stride)) {
                        kernel(i, o);
                    }
                });
            return;
        }
    }

    for (o, i) in dst.chunks_exact_mut(dst_stride).zip(src.chunks_exact(src_stride)) {
        kernel(i, o);
    }
}

/// Exact `2^exp` for the exponent ranges the pixel formats use.
///
/// Computed in `f64` so subnormal `f32` results such as `2^-136` are exact.
#[inline]
pub(crate) fn exp2i(exp: i32) -> f64 {
    2.0_f64.powi(exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_pixels_sequential() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let mut dst = [0u16; 2];
        map_pixels(&src, 3, &mut dst, 1, |i, o| {
            o[0] = i.iter().map(|&v| v as u16).sum();
        });
        assert_eq!(dst, [6, 15]);
    }

    #[test]
    fn test_map_pixels_large_matches_sequential() {
        // Exercises the striped path when rayon is enabled.
        let pixels = PAR_THRESHOLD + 17;
        let src: Vec<u32> = (0..pixels as u32).collect();
        let mut dst = vec![0u32; pixels * 2];
        map_pixels(&src, 1, &mut dst, 2, |i, o| {
            o[0] = i[0];
            o[1] = i[0].wrapping_mul(3);
        });
        for (p, chunk) in dst.chunks_exact(2).enumerate() {
            assert_eq!(chunk[0], p as u32);
            assert_eq!(chunk[1], (p as u32).wrapping_mul(3));
        }
    }

    #[test]
    #[should_panic(expected = "not a multiple")]
    fn test_pixel_count_rejects_ragged() {
        pixel_count(7, 4, "RGBE");
    }

    #[test]
    fn test_exp2i_subnormal_exact() {
        assert_eq!(exp2i(-136) as f32, f32::from_bits(1 << 13));
        assert_eq!(exp2i(0), 1.0);
    }
}
