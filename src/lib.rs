//! Group images and animated media by perceptual similarity.
//!
//! Each file is reduced to a fixed-length fingerprint (difference, DCT or
//! wavelet hash; animated files merge their sampled frames by majority
//! vote), then fingerprints are grouped by greedy leader clustering under a
//! Hamming-distance threshold. Container video (mp4, mkv, ...) needs the
//! `video-ffmpeg` feature.

pub mod config;
pub mod core;
pub mod error;
pub mod report;
pub mod services;

pub use config::{PartialConfig, RunConfig};
pub use error::{Error, Result};
