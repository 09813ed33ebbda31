use super::fingerprint::Fingerprint;
use super::raster::Raster;
use super::{dhash, phash, whash};
use crate::error::HashError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted grid side. The DCT hash transforms a grid four times
/// this wide.
pub const MAX_HASH_SIZE: u32 = 64;

/// Perceptual hash algorithms. One is chosen per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum HashAlgorithm {
    /// Difference hash over horizontal gradients
    #[serde(rename = "dhash")]
    #[value(name = "dhash")]
    Difference,
    /// DCT-based perceptual hash
    #[serde(rename = "phash")]
    #[value(name = "phash")]
    Dct,
    /// Haar wavelet hash
    #[serde(rename = "whash")]
    #[value(name = "whash")]
    Wavelet,
}

impl HashAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Difference => "dhash",
            Self::Dct => "phash",
            Self::Wavelet => "whash",
        }
    }

    pub fn default_hash_size(self) -> u32 {
        match self {
            Self::Difference => 8,
            Self::Dct => 16,
            Self::Wavelet => 8,
        }
    }

    /// Maximum Hamming distance for two fingerprints to count as similar.
    pub fn default_threshold(self) -> u32 {
        match self {
            Self::Difference => 10,
            Self::Dct => 25,
            Self::Wavelet => 10,
        }
    }

    pub fn fingerprint_len(self, hash_size: u32) -> usize {
        let side = hash_size as usize;
        side * side
    }

    pub fn validate_hash_size(self, hash_size: u32) -> Result<(), HashError> {
        if hash_size == 0 {
            return Err(HashError::InvalidHashSize {
                algorithm: self.name(),
                hash_size,
                reason: "must be positive",
            });
        }
        if hash_size > MAX_HASH_SIZE {
            return Err(HashError::InvalidHashSize {
                algorithm: self.name(),
                hash_size,
                reason: "must be at most 64",
            });
        }
        if self == Self::Wavelet && !hash_size.is_power_of_two() {
            return Err(HashError::InvalidHashSize {
                algorithm: self.name(),
                hash_size,
                reason: "must be a power of two",
            });
        }
        Ok(())
    }

    pub fn compute(self, raster: &Raster, hash_size: u32) -> Result<Fingerprint, HashError> {
        self.validate_hash_size(hash_size)?;
        let fingerprint = match self {
            Self::Difference => dhash::compute(raster, hash_size),
            Self::Dct => phash::compute(raster, hash_size),
            Self::Wavelet => whash::compute(raster, hash_size),
        };
        debug_assert_eq!(fingerprint.len(), self.fingerprint_len(hash_size));
        Ok(fingerprint)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Algorithm and grid size, fixed for a whole run and shared by the image
/// and video paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HashSettings {
    pub algorithm: HashAlgorithm,
    pub hash_size: u32,
}

impl HashSettings {
    pub fn new(algorithm: HashAlgorithm, hash_size: Option<u32>) -> Result<Self, HashError> {
        let hash_size = hash_size.unwrap_or_else(|| algorithm.default_hash_size());
        algorithm.validate_hash_size(hash_size)?;
        Ok(Self {
            algorithm,
            hash_size,
        })
    }

    pub fn compute(&self, raster: &Raster) -> Result<Fingerprint, HashError> {
        self.algorithm.compute(raster, self.hash_size)
    }

    pub fn fingerprint_len(&self) -> usize {
        self.algorithm.fingerprint_len(self.hash_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::Difference,
        HashAlgorithm::Dct,
        HashAlgorithm::Wavelet,
    ];

    fn photo_like(width: u32, height: u32) -> Raster {
        Raster::new(GrayImage::from_fn(width, height, |x, y| {
            let cx = x as f64 - width as f64 / 3.0;
            let cy = y as f64 - height as f64 / 2.0;
            Luma([((cx * cx + cy * cy).sqrt() * 2.0 % 255.0) as u8])
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(HashAlgorithm::Difference.default_hash_size(), 8);
        assert_eq!(HashAlgorithm::Difference.default_threshold(), 10);
        assert_eq!(HashAlgorithm::Dct.default_hash_size(), 16);
        assert_eq!(HashAlgorithm::Dct.default_threshold(), 25);
        assert_eq!(HashAlgorithm::Wavelet.default_hash_size(), 8);
        assert_eq!(HashAlgorithm::Wavelet.default_threshold(), 10);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let raster = photo_like(123, 77);
        for algorithm in ALL {
            let size = algorithm.default_hash_size();
            assert_eq!(
                algorithm.compute(&raster, size).unwrap(),
                algorithm.compute(&raster, size).unwrap(),
                "{algorithm}"
            );
        }
    }

    #[test]
    fn test_length_matches_declared_length_for_any_raster() {
        for algorithm in ALL {
            for (w, h) in [(8, 8), (9, 8), (64, 64), (301, 199)] {
                let settings = HashSettings::new(algorithm, None).unwrap();
                let fp = settings.compute(&photo_like(w, h)).unwrap();
                assert_eq!(fp.len(), settings.fingerprint_len(), "{algorithm} {w}x{h}");
            }
        }
    }

    #[test]
    fn test_invalid_hash_sizes() {
        let raster = photo_like(32, 32);
        for algorithm in ALL {
            assert!(matches!(
                algorithm.compute(&raster, 0),
                Err(HashError::InvalidHashSize { .. })
            ));
        }
        assert!(HashSettings::new(HashAlgorithm::Wavelet, Some(12)).is_err());
        assert!(HashSettings::new(HashAlgorithm::Dct, Some(MAX_HASH_SIZE)).is_ok());
        assert!(HashSettings::new(HashAlgorithm::Difference, Some(12)).is_ok());
    }

    #[test]
    fn test_oversized_grids_are_rejected_before_hashing() {
        let raster = photo_like(16, 16);
        for algorithm in ALL {
            for size in [MAX_HASH_SIZE * 2, 1 << 30, u32::MAX] {
                assert!(matches!(
                    HashSettings::new(algorithm, Some(size)),
                    Err(HashError::InvalidHashSize { .. })
                ));
                assert!(algorithm.compute(&raster, size).is_err(), "{algorithm} {size}");
            }
        }
    }

    #[test]
    fn test_names_parse_from_cli_values() {
        for algorithm in ALL {
            assert_eq!(HashAlgorithm::from_str(algorithm.name(), false).unwrap(), algorithm);
        }
        assert_eq!(serde_json::to_string(&HashAlgorithm::Dct).unwrap(), "\"phash\"");
    }
}
