//! Shared inputs for the rgbe-rs benchmarks.
//!
//! Run with: `cargo bench -p rgbe-bench`

/// Smooth gradient of linear radiance, `width * height * 3` floats.
pub fn gradient(width: usize, height: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let u = x as f32 / width as f32;
            let v = y as f32 / height as f32;
            out.extend_from_slice(&[u * 16.0, v * 4.0, (u * v) * 0.25]);
        }
    }
    out
}
