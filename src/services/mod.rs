#[cfg(feature = "video-ffmpeg")]
pub mod ffmpeg;
pub mod pipeline;
pub mod sampling;
pub mod scanner;
pub mod source;

pub use pipeline::{HashOutcome, Pipeline, RunSummary, SkippedFile, hash_file};
pub use scanner::{MediaMode, list_media};
pub use source::{FrameSource, hash_frames, hash_still, open_video};
