//! Numeric helpers shared by the hash algorithms.

use super::raster::Raster;
use image::GrayImage;
use image::imageops::{self, FilterType};
use std::f64::consts::PI;

/// Per destination index, the source indices it covers and their normalized weights.
fn area_weights(src: u32, dst: u32) -> Vec<Vec<(u32, f64)>> {
    let scale = f64::from(src) / f64::from(dst);
    (0..dst)
        .map(|d| {
            let start = f64::from(d) * scale;
            let end = start + scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src);
            (first..last)
                .filter_map(|s| {
                    let covered = end.min(f64::from(s) + 1.0) - start.max(f64::from(s));
                    (covered > 1e-9).then_some((s, covered / scale))
                })
                .collect()
        })
        .collect()
}

/// Resize by averaging every source sample under each destination cell,
/// weighted by the covered area. Results are rounded back to 8 bits, halves
/// to even.
pub fn resize_area(raster: &Raster, width: u32, height: u32) -> GrayImage {
    let cols = area_weights(raster.width(), width);
    let rows = area_weights(raster.height(), height);

    GrayImage::from_fn(width, height, |x, y| {
        let mut sum = 0.0;
        for &(sy, wy) in &rows[y as usize] {
            for &(sx, wx) in &cols[x as usize] {
                sum += f64::from(raster.sample(sx, sy)) * wx * wy;
            }
        }
        image::Luma([sum.round_ties_even().clamp(0.0, 255.0) as u8])
    })
}

pub fn resize_lanczos(raster: &Raster, width: u32, height: u32) -> GrayImage {
    imageops::resize(raster.as_image(), width, height, FilterType::Lanczos3)
}

/// Unnormalized 2-D DCT-II of a `size` x `size` row-major block:
/// `X[k] = 2 * sum(x[n] * cos(pi * k * (2n + 1) / 2N))` along rows, then columns.
pub fn dct_2d(values: &[f64], size: usize) -> Vec<f64> {
    let cos_table: Vec<f64> = (0..size)
        .flat_map(|k| {
            (0..size).map(move |n| (PI * k as f64 * (2 * n + 1) as f64 / (2 * size) as f64).cos())
        })
        .collect();

    let mut rows = vec![0.0; size * size];
    for y in 0..size {
        for k in 0..size {
            let sum: f64 = (0..size)
                .map(|n| values[y * size + n] * cos_table[k * size + n])
                .sum();
            rows[y * size + k] = 2.0 * sum;
        }
    }

    let mut out = vec![0.0; size * size];
    for x in 0..size {
        for k in 0..size {
            let sum: f64 = (0..size)
                .map(|n| rows[n * size + x] * cos_table[k * size + n])
                .sum();
            out[k * size + x] = 2.0 * sum;
        }
    }
    out
}

/// One level of the orthonormal 2-D Haar transform, keeping only the
/// approximation band. `size` must be even.
pub fn haar_approximation(values: &[f64], size: usize) -> Vec<f64> {
    let half = size / 2;
    let mut out = Vec::with_capacity(half * half);
    for y in 0..half {
        for x in 0..half {
            let top = values[2 * y * size + 2 * x] + values[2 * y * size + 2 * x + 1];
            let bottom = values[(2 * y + 1) * size + 2 * x] + values[(2 * y + 1) * size + 2 * x + 1];
            out.push((top + bottom) / 2.0);
        }
    }
    out
}

/// Median with the two middle values averaged for even counts.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Raster {
        Raster::new(GrayImage::from_fn(width, height, |x, y| {
            image::Luma([((x * 7 + y * 3) % 256) as u8])
        }))
        .unwrap()
    }

    #[test]
    fn test_area_resize_constant_stays_constant() {
        let raster = Raster::new(GrayImage::from_pixel(37, 23, image::Luma([91]))).unwrap();
        let resized = resize_area(&raster, 9, 8);
        assert!(resized.pixels().all(|p| p[0] == 91));
    }

    #[test]
    fn test_area_resize_same_size_is_identity() {
        let raster = gradient(12, 10);
        let resized = resize_area(&raster, 12, 10);
        assert_eq!(resized.as_raw(), raster.as_image().as_raw());
    }

    #[test]
    fn test_area_resize_averages_blocks() {
        let raster = Raster::from_samples(4, 2, vec![0, 10, 100, 200, 20, 30, 100, 200]).unwrap();
        let resized = resize_area(&raster, 2, 1);
        assert_eq!(resized.get_pixel(0, 0)[0], 15);
        assert_eq!(resized.get_pixel(1, 0)[0], 150);
    }

    #[test]
    fn test_area_resize_rounds_halves_to_even() {
        let raster = Raster::from_samples(4, 1, vec![2, 3, 3, 4]).unwrap();
        let resized = resize_area(&raster, 2, 1);
        assert_eq!(resized.get_pixel(0, 0)[0], 2);
        assert_eq!(resized.get_pixel(1, 0)[0], 4);
    }

    #[test]
    fn test_area_resize_upscales_small_rasters() {
        let raster = Raster::from_samples(2, 1, vec![10, 50]).unwrap();
        let resized = resize_area(&raster, 4, 2);
        assert_eq!(resized.dimensions(), (4, 2));
        assert_eq!(resized.get_pixel(0, 1)[0], 10);
        assert_eq!(resized.get_pixel(3, 0)[0], 50);
    }

    #[test]
    fn test_dct_of_constant_block_is_dc_only() {
        let block = vec![3.0; 16];
        let spectrum = dct_2d(&block, 4);
        assert!((spectrum[0] - 4.0 * 4.0 * 3.0 * 4.0).abs() < 1e-9);
        assert!(spectrum[1..].iter().all(|c| c.abs() < 1e-9));
    }

    #[test]
    fn test_haar_approximation_sums_blocks() {
        let values = vec![1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 2.0, 2.0, 0.0, 0.0, 4.0, 4.0, 0.0, 0.0, 4.0, 4.0];
        assert_eq!(haar_approximation(&values, 4), vec![2.0, 4.0, 0.0, 8.0]);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }
}
