//! Cross-format properties of the pixel conversions.

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rgbe_pixel::{
    float_to_ldr, float_to_rgb9e5, float_to_rgbe, rgb9e5_to_float, rgbe_to_float, rgbe_to_ldr,
    ToneMap, PAR_THRESHOLD,
};

fn random_floats(len: usize, max: f32) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(0x9e37_79b9);
    (0..len).map(|_| rng.gen_range(0.0..=max)).collect()
}

#[test]
fn rgb9e5_roundtrip_within_mantissa_step() {
    let floats = random_floats(3 * 4096, 32000.0);
    let decoded = rgb9e5_to_float(&float_to_rgb9e5(&floats));

    for (src, dst) in floats.chunks_exact(3).zip(decoded.chunks_exact(3)) {
        let max_c = src[0].max(src[1]).max(src[2]);
        // One rounding step of the shared exponent is at most max/256.
        let tolerance = (max_c / 256.0).max((-24.0f32).exp2());
        for c in 0..3 {
            assert_abs_diff_eq!(src[c], dst[c], epsilon = tolerance);
        }
    }
}

#[test]
fn rgb9e5_roundtrip_small_magnitudes() {
    let floats = random_floats(3 * 512, 1.0e-3);
    let decoded = rgb9e5_to_float(&float_to_rgb9e5(&floats));
    for (src, dst) in floats.chunks_exact(3).zip(decoded.chunks_exact(3)) {
        let max_c = src[0].max(src[1]).max(src[2]);
        let tolerance = (max_c / 256.0).max((-24.0f32).exp2());
        for c in 0..3 {
            assert_abs_diff_eq!(src[c], dst[c], epsilon = tolerance);
        }
    }
}

#[test]
fn rgbe_roundtrip_mantissas_within_one() {
    // Normalised pixels: largest mantissa in [128, 255], exponent non-zero.
    let mut rng = StdRng::seed_from_u64(0x1234_5678);
    let rgbe: Vec<u8> = (0..2048)
        .flat_map(|_| {
            let bytes: [u8; 4] = rng.r#gen();
            let e = bytes[3].max(1).min(250);
            [bytes[0] | 0x80, bytes[1], bytes[2], e]
        })
        .collect();

    let back = float_to_rgbe(&rgbe_to_float(&rgbe));
    for (a, b) in rgbe.chunks_exact(4).zip(back.chunks_exact(4)) {
        assert_eq!(a[3], b[3], "exponent {:?} -> {:?}", a, b);
        for c in 0..3 {
            assert!((a[c] as i32 - b[c] as i32).abs() <= 1, "{:?} -> {:?}", a, b);
        }
    }
}

#[test]
fn exposure_is_monotonic() {
    let rgbe: Vec<u8> = (64u8..=255).flat_map(|m| [m, m / 2 + 1, 255 - m / 2, 128]).collect();
    let floats = rgbe_to_float(&rgbe);

    for gamma in [1.0f32, 2.2] {
        let mut prev_rgbe = rgbe_to_ldr(&rgbe, -2.0, gamma);
        let mut prev_float = float_to_ldr(&floats, -2.0, gamma);
        for step in 1..=6 {
            let exposure = -2.0 + step as f32;
            let cur_rgbe = rgbe_to_ldr(&rgbe, exposure, gamma);
            let cur_float = float_to_ldr(&floats, exposure, gamma);
            for (prev, cur) in [(&prev_rgbe, &cur_rgbe), (&prev_float, &cur_float)] {
                for (i, (&p, &c)) in prev.iter().zip(cur.iter()).enumerate() {
                    if i % 4 == 3 {
                        assert_eq!(c, 255);
                    } else if p != 0 {
                        assert!(c > p || c == 255, "channel {} went {} -> {}", i, p, c);
                    }
                }
            }
            prev_rgbe = cur_rgbe;
            prev_float = cur_float;
        }
    }
}

#[test]
fn linear_gamma_is_plain_scale() {
    let floats = random_floats(3 * 1000, 1.5);
    let ldr = float_to_ldr(&floats, 1.0, 1.0);
    for (i, (&f, px)) in floats.iter().zip(ldr.chunks_exact(4).flat_map(|p| &p[..3])).enumerate() {
        let expected = (255.0 * f as f64).clamp(0.0, 255.0).round_ties_even() as u8;
        assert_eq!(*px, expected, "index {}", i);
    }
}

#[test]
fn large_buffers_convert_like_small_ones() {
    // Crosses the parallel threshold; each pixel must match its scalar result.
    let pixels = PAR_THRESHOLD + 3;
    let floats = random_floats(pixels * 3, 100.0);

    let words = float_to_rgb9e5(&floats);
    let rgbe = float_to_rgbe(&floats);
    let ldr = ToneMap::default().apply_float(&floats);

    for (p, px) in floats.chunks_exact(3).enumerate().step_by(997) {
        let rgb = [px[0], px[1], px[2]];
        assert_eq!(words[p], rgbe_pixel::pack_rgb9e5(rgb));
        assert_eq!(&rgbe[p * 4..p * 4 + 4], &rgbe_pixel::rgb_to_rgbe(rgb));
        assert_eq!(&ldr[p * 4..p * 4 + 4], &ToneMap::default().apply_float(&px[..])[..]);
    }
}

#[test]
fn zero_word_decodes_to_black() {
    assert_eq!(rgb9e5_to_float(&[0]), vec![0.0, 0.0, 0.0]);
}
