//! Wavelet hash: Haar approximation band thresholded at its median.

use super::fingerprint::Fingerprint;
use super::raster::Raster;
use super::resample;

/// Side of the square working grid: the largest power of two that fits the
/// raster's short side, but never smaller than the hash grid.
fn working_scale(raster: &Raster, hash_size: u32) -> u32 {
    let short_side = raster.width().min(raster.height());
    let fitting = 1u32 << (u32::BITS - 1 - short_side.leading_zeros());
    fitting.max(hash_size)
}

/// `hash_size` must be a power of two.
pub(crate) fn compute(raster: &Raster, hash_size: u32) -> Fingerprint {
    let scale = working_scale(raster, hash_size);
    let resized = resample::resize_lanczos(raster, scale, scale);
    let mut coeffs: Vec<f64> = resized
        .as_raw()
        .iter()
        .map(|&p| f64::from(p) / 255.0)
        .collect();

    // Zeroing the coarsest Haar approximation and reconstructing is the same
    // as removing the mean.
    let mean = coeffs.iter().sum::<f64>() / coeffs.len() as f64;
    coeffs.iter_mut().for_each(|c| *c -= mean);

    let mut side = scale as usize;
    for _ in hash_size.trailing_zeros()..scale.trailing_zeros() {
        coeffs = resample::haar_approximation(&coeffs, side);
        side /= 2;
    }

    let median = resample::median(&coeffs);
    Fingerprint::from_bits(coeffs.iter().map(|&c| c > median))
}
