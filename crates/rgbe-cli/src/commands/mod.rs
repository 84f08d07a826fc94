//! CLI command implementations

pub mod encode;
pub mod info;
pub mod pack;
pub mod tonemap;

use anyhow::{Context, Result};
use rgbe_io::HdrImage;
use std::path::Path;

/// Load image from path
pub fn load_image(path: &Path) -> Result<HdrImage> {
    rgbe_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Per-channel statistics of linear float triples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    /// Smallest value per channel.
    pub min: [f32; 3],
    /// Largest value per channel.
    pub max: [f32; 3],
    /// Mean per channel.
    pub mean: [f64; 3],
}

/// Computes min/max/mean over RGB triples. `None` for an empty buffer.
pub fn channel_stats(rgb: &[f32]) -> Option<ChannelStats> {
    let pixels = rgb.len() / 3;
    if pixels == 0 {
        return None;
    }
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    let mut sum = [0.0f64; 3];
    for px in rgb.chunks_exact(3) {
        for c in 0..3 {
            min[c] = min[c].min(px[c]);
            max[c] = max[c].max(px[c]);
            sum[c] += px[c] as f64;
        }
    }
    Some(ChannelStats {
        min,
        max,
        mean: sum.map(|s| s / pixels as f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_channel_stats() {
        let stats = channel_stats(&[0.0, 1.0, 2.0, 4.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.min, [0.0, 1.0, 2.0]);
        assert_eq!(stats.max, [4.0, 3.0, 2.0]);
        assert_eq!(stats.mean, [2.0, 2.0, 2.0]);
        assert!(channel_stats(&[]).is_none());
    }
}
