use crate::config::RunConfig;
use crate::core::{Fingerprint, HashAlgorithm};
use crate::error::Result;
use crate::services::pipeline::{RunSummary, SkippedFile};
use crate::services::scanner::MediaMode;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct ReportGroup {
    pub leader: String,
    pub leader_fingerprint: Option<Fingerprint>,
    pub members: Vec<String>,
}

/// JSON summary of a run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub input: String,
    pub mode: MediaMode,
    pub algorithm: HashAlgorithm,
    pub hash_size: u32,
    pub threshold: u32,
    pub files_total: usize,
    pub files_hashed: usize,
    pub groups: Vec<ReportGroup>,
    pub skipped: Vec<SkippedFile>,
}

impl Report {
    pub fn new(config: &RunConfig, summary: &RunSummary) -> Self {
        let fingerprints: HashMap<&str, &Fingerprint> = summary
            .entries
            .iter()
            .map(|(id, fp)| (id.as_str(), fp))
            .collect();

        let groups = summary
            .groups
            .iter()
            .filter_map(|group| {
                let leader = group.first()?;
                Some(ReportGroup {
                    leader: leader.clone(),
                    leader_fingerprint: fingerprints.get(leader.as_str()).map(|fp| (*fp).clone()),
                    members: group.clone(),
                })
            })
            .collect();

        Self {
            generated_at: Utc::now().to_rfc3339(),
            input: config.input.to_string_lossy().into_owned(),
            mode: config.mode,
            algorithm: config.hash.algorithm,
            hash_size: config.hash.hash_size,
            threshold: config.threshold,
            files_total: summary.files_total,
            files_hashed: summary.entries.len(),
            groups,
            skipped: summary.skipped.clone(),
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
