// Hashing and grouping core:
// - rasters and fingerprints
// - difference, DCT and wavelet hashes behind `HashAlgorithm`
// - majority-vote aggregation of video frames
// - leader clustering by Hamming distance

pub mod aggregate;
pub mod algorithm;
pub mod cluster;
mod dhash;
pub mod fingerprint;
mod phash;
pub mod raster;
pub mod resample;
mod whash;

pub use aggregate::majority_vote;
pub use algorithm::{HashAlgorithm, HashSettings};
pub use cluster::{Group, cluster};
pub use fingerprint::Fingerprint;
pub use raster::Raster;
