//! Difference hash: sign of horizontal gradients on a tiny area-averaged grid.

use super::fingerprint::Fingerprint;
use super::raster::Raster;
use super::resample;

pub(crate) fn compute(raster: &Raster, hash_size: u32) -> Fingerprint {
    let grid = resample::resize_area(raster, hash_size + 1, hash_size);
    Fingerprint::from_bits((0..hash_size).flat_map(|y| {
        let grid = &grid;
        (1..=hash_size).map(move |x| grid.get_pixel(x, y)[0] > grid.get_pixel(x - 1, y)[0])
    }))
}
