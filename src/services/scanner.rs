use crate::error::ScanError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "webp"];
// Containers other than GIF/WebP need the `video-ffmpeg` feature; without it
// they are still listed and show up as skipped.
const VIDEO_EXTENSIONS: &[&str] = &["gif", "webp", "mp4", "avi", "mov", "mkv", "m4v"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaMode {
    /// Still images, one frame each
    #[default]
    Image,
    /// Animated files, sampled and merged per file
    Video,
}

impl MediaMode {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_EXTENSIONS,
            Self::Video => VIDEO_EXTENSIONS,
        }
    }

    pub fn accepts(self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext.to_lowercase().as_str()))
    }
}

/// Files directly inside `dir` matching `mode`, sorted by file name.
pub fn list_media(dir: &Path, mode: MediaMode) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::InvalidPath {
            path: dir.to_string_lossy().to_string(),
        });
    }

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && mode.accepts(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    log::debug!(
        "Found {} {:?} files in {}",
        files.len(),
        mode,
        dir.display()
    );
    Ok(files)
}
