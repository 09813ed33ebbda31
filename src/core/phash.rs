//! DCT hash: low-frequency cosine coefficients thresholded at their median.

use super::fingerprint::Fingerprint;
use super::raster::Raster;
use super::resample;

/// The transform runs on a grid this many times wider than the kept block.
const HIGHFREQ_FACTOR: u32 = 4;

pub(crate) fn compute(raster: &Raster, hash_size: u32) -> Fingerprint {
    let side = hash_size * HIGHFREQ_FACTOR;
    let resized = resample::resize_lanczos(raster, side, side);
    let samples: Vec<f64> = resized.as_raw().iter().map(|&p| f64::from(p)).collect();

    let stride = side as usize;
    let keep = hash_size as usize;
    let spectrum = resample::dct_2d(&samples, stride);
    let low: Vec<f64> = (0..keep)
        .flat_map(|row| spectrum[row * stride..row * stride + keep].iter().copied())
        .collect();

    let median = resample::median(&low);
    Fingerprint::from_bits(low.iter().map(|&c| c > median))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn pattern(width: u32, height: u32) -> Raster {
        Raster::new(GrayImage::from_fn(width, height, |x, y| {
            let v = ((x as f64 / 9.0).sin() + (y as f64 / 5.0).cos()) * 60.0 + 128.0;
            Luma([v as u8])
        }))
        .unwrap()
    }

    /// 8x8 cosine wave along one axis. With `hash_size` 2 the grid is the
    /// raster itself, so only the DC term and the first harmonic along
    /// that axis are non-zero.
    fn first_harmonic(vertical: bool) -> Raster {
        Raster::new(GrayImage::from_fn(8, 8, |x, y| {
            let n = if vertical { y } else { x };
            let wave = (std::f64::consts::PI * f64::from(2 * n + 1) / 16.0).cos();
            Luma([(128.0 + 100.0 * wave).round() as u8])
        }))
        .unwrap()
    }

    #[test]
    fn test_low_frequency_block_is_row_major_from_top_left() {
        // Block order: (v0, h0), (v0, h1), (v1, h0), (v1, h1).
        let horizontal: Vec<bool> = compute(&first_harmonic(false), 2).bits().collect();
        assert_eq!(horizontal, vec![true, true, false, false]);
        assert_eq!(compute(&first_harmonic(false), 2).to_hex(), "c");

        let vertical: Vec<bool> = compute(&first_harmonic(true), 2).bits().collect();
        assert_eq!(vertical, vec![true, false, true, false]);
    }

    #[test]
    fn test_length_is_grid_squared() {
        assert_eq!(compute(&pattern(120, 90), 16).len(), 256);
        assert_eq!(compute(&pattern(120, 90), 8).len(), 64);
    }

    #[test]
    fn test_median_split_is_roughly_even() {
        let fp = compute(&pattern(200, 150), 8);
        let ones = fp.count_ones();
        assert!((24..=40).contains(&ones), "{ones} bits set");
    }

    #[test]
    fn test_deterministic() {
        let raster = pattern(97, 61);
        assert_eq!(compute(&raster, 16), compute(&raster, 16));
    }
}
