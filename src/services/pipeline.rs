use crate::config::RunConfig;
use crate::core::{Fingerprint, Group, HashSettings, cluster};
use crate::error::{MediaError, Result};
use crate::services::scanner::{MediaMode, list_media};
use crate::services::source::{hash_frames, hash_still, open_video};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of hashing one file. Failures never abort the run.
#[derive(Debug, Clone)]
pub enum HashOutcome {
    Hashed {
        index: usize,
        id: String,
        fingerprint: Fingerprint,
    },
    Skipped {
        index: usize,
        id: String,
        reason: String,
    },
}

impl HashOutcome {
    /// Position of the file in the input listing.
    pub fn index(&self) -> usize {
        match self {
            Self::Hashed { index, .. } | Self::Skipped { index, .. } => *index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub files_total: usize,
    /// Hashed files in input order.
    pub entries: Vec<(String, Fingerprint)>,
    pub skipped: Vec<SkippedFile>,
    pub groups: Vec<Group<String>>,
}

/// Fingerprint of one file: a still image, or the majority vote of sampled frames.
pub fn hash_file(
    path: &Path,
    mode: MediaMode,
    settings: &HashSettings,
    frames_to_sample: usize,
) -> Result<Fingerprint, MediaError> {
    match mode {
        MediaMode::Image => hash_still(path, settings),
        MediaMode::Video => {
            let source = open_video(path)?;
            hash_frames(source.as_ref(), settings, frames_to_sample)
        }
    }
}

fn identifier(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub struct Pipeline<'a> {
    config: &'a RunConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        Ok(list_media(&self.config.input, self.config.mode)?)
    }

    /// Hash `files` on a bounded worker pool. `on_done` runs after each file.
    /// Outcomes come back sorted by their position in `files`.
    pub fn hash_files<F>(&self, files: &[PathBuf], on_done: F) -> Result<Vec<HashOutcome>>
    where
        F: Fn(&Path) + Sync,
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .thread_name(|i| format!("hash-worker-{i}"))
            .build()?;
        let chunk_size = self.config.chunk_size(files.len());
        log::info!(
            "Hashing {} files with {} workers, chunk size {}",
            files.len(),
            self.config.workers,
            chunk_size
        );

        let tasks: Vec<(usize, &PathBuf)> = files.iter().enumerate().collect();
        let start = Instant::now();
        let mut outcomes: Vec<HashOutcome> = pool.install(|| {
            tasks
                .par_chunks(chunk_size)
                .flat_map_iter(|chunk| {
                    chunk.iter().map(|&(index, path)| {
                        let outcome = self.hash_one(index, path);
                        on_done(path);
                        outcome
                    })
                })
                .collect()
        });
        log::debug!("Hashing took {:.2?}", start.elapsed());

        outcomes.sort_by_key(HashOutcome::index);
        Ok(outcomes)
    }

    fn hash_one(&self, index: usize, path: &Path) -> HashOutcome {
        let id = identifier(path);
        let config = self.config;
        match hash_file(path, config.mode, &config.hash, config.frames_to_sample) {
            Ok(fingerprint) => HashOutcome::Hashed {
                index,
                id,
                fingerprint,
            },
            Err(e) => {
                match &e {
                    MediaError::Unsupported { .. } => log::debug!("Skipping {}: {}", path.display(), e),
                    _ => log::warn!("Skipping {}: {}", path.display(), e),
                }
                HashOutcome::Skipped {
                    index,
                    id,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Drop the skipped files and cluster the rest in input order.
    pub fn summarize(&self, files_total: usize, mut outcomes: Vec<HashOutcome>) -> Result<RunSummary> {
        outcomes.sort_by_key(HashOutcome::index);

        let mut entries = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                HashOutcome::Hashed { id, fingerprint, .. } => entries.push((id, fingerprint)),
                HashOutcome::Skipped { id, reason, .. } => skipped.push(SkippedFile { id, reason }),
            }
        }

        let groups = cluster(&entries, self.config.threshold)?;
        log::info!(
            "Clustered {} fingerprints into {} groups ({} skipped)",
            entries.len(),
            groups.len(),
            skipped.len()
        );

        Ok(RunSummary {
            files_total,
            entries,
            skipped,
            groups,
        })
    }

    pub fn run<F>(&self, files: &[PathBuf], on_done: F) -> Result<RunSummary>
    where
        F: Fn(&Path) + Sync,
    {
        let outcomes = self.hash_files(files, on_done)?;
        self.summarize(files.len(), outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartialConfig;
    use crate::core::HashAlgorithm;
    use image::{GrayImage, Luma};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn create_test_image(path: &Path, seed: u32) {
        let img = GrayImage::from_fn(96, 64, |x, y| {
            let band = (x / 12 + y / 16 + seed) % 3;
            Luma([(band * 100) as u8])
        });
        img.save(path).unwrap();
    }

    fn config(input: &Path, algorithm: HashAlgorithm) -> RunConfig {
        RunConfig::resolve(
            input,
            PartialConfig {
                hash_type: Some(algorithm),
                workers: Some(2),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_groups_duplicates_and_skips_broken_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_image(&temp_dir.path().join("a.png"), 0);
        create_test_image(&temp_dir.path().join("b.png"), 1);
        create_test_image(&temp_dir.path().join("c.png"), 0);
        fs::write(temp_dir.path().join("d.jpg"), b"truncated").unwrap();

        let config = config(temp_dir.path(), HashAlgorithm::Difference);
        let pipeline = Pipeline::new(&config);
        let files = pipeline.discover().unwrap();
        assert_eq!(files.len(), 4);

        let done = AtomicUsize::new(0);
        let summary = pipeline
            .run(&files, |_| {
                done.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();

        assert_eq!(done.load(Ordering::Relaxed), 4);
        assert_eq!(summary.files_total, 4);
        assert_eq!(summary.entries.len(), 3);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].id, "d.jpg");
        assert_eq!(summary.groups, vec![vec!["a.png".to_string(), "c.png".to_string()]]);
    }

    #[test]
    fn test_outcomes_follow_input_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = Vec::new();
        for i in 0..12 {
            let path = temp_dir.path().join(format!("img_{i:02}.png"));
            create_test_image(&path, i);
            files.push(path);
        }

        let mut config = config(temp_dir.path(), HashAlgorithm::Wavelet);
        config.workers = 4;
        config.chunk_coef = 1;
        let outcomes = Pipeline::new(&config).hash_files(&files, |_| {}).unwrap();

        let indices: Vec<usize> = outcomes.iter().map(HashOutcome::index).collect();
        assert_eq!(indices, (0..12).collect::<Vec<_>>());
        assert!(outcomes.iter().all(|o| matches!(o, HashOutcome::Hashed { .. })));
    }

    #[test]
    fn test_summarize_reorders_before_clustering() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path(), HashAlgorithm::Difference);
        let same = Fingerprint::zeros(64);
        let outcomes = vec![
            HashOutcome::Hashed {
                index: 2,
                id: "z".into(),
                fingerprint: same.clone(),
            },
            HashOutcome::Skipped {
                index: 1,
                id: "y".into(),
                reason: "unreadable".into(),
            },
            HashOutcome::Hashed {
                index: 0,
                id: "x".into(),
                fingerprint: same,
            },
        ];

        let summary = Pipeline::new(&config).summarize(3, outcomes).unwrap();
        assert_eq!(summary.groups, vec![vec!["x".to_string(), "z".to_string()]]);
        assert_eq!(
            summary.skipped,
            vec![SkippedFile {
                id: "y".into(),
                reason: "unreadable".into()
            }]
        );
    }

    #[test]
    fn test_video_mode_skips_undecodable_containers() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("clip.mp4"), b"\0\0\0\x18ftypmp42").unwrap();

        let mut config = config(temp_dir.path(), HashAlgorithm::Difference);
        config.mode = MediaMode::Video;
        let pipeline = Pipeline::new(&config);
        let files = pipeline.discover().unwrap();
        let summary = pipeline.run(&files, |_| {}).unwrap();

        assert!(summary.entries.is_empty());
        assert!(summary.groups.is_empty());
        assert_eq!(summary.skipped.len(), 1);
    }
}
