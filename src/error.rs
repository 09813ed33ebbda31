use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("Fingerprint length mismatch: {left} vs {right} bits")]
    LengthMismatch { left: usize, right: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    #[error("Invalid hash size {hash_size} for {algorithm}: {reason}")]
    InvalidHashSize {
        algorithm: &'static str,
        hash_size: u32,
        reason: &'static str,
    },

    #[error("Raster has no samples")]
    EmptyRaster,

    #[error("Raster buffer holds {len} samples, expected {width}x{height}")]
    BufferSize { width: u32, height: u32, len: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Cannot aggregate zero fingerprints")]
    Empty,

    #[error("Frame fingerprint {index} has {found} bits, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("Entry {index} has a {found}-bit fingerprint, expected {expected} bits")]
    LengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// Per-file failures. The pipeline turns these into skip markers.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("GIF decoding error: {0}")]
    Gif(#[from] gif::DecodingError),

    #[error("WebP decoding error: {0}")]
    WebP(#[from] image_webp::DecodingError),

    #[cfg(feature = "video-ffmpeg")]
    #[error("Video decoding error: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),

    #[error("No decoder available for {path}")]
    Unsupported { path: PathBuf },

    #[error("No frames could be sampled")]
    NoFrames,

    #[error("Hash computation failed: {0}")]
    Hash(#[from] HashError),

    #[error("Frame aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No hash algorithm selected")]
    MissingAlgorithm,

    #[error("{field} must be positive")]
    NotPositive { field: &'static str },

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
