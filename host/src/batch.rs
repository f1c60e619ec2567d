use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::runner::fingerprint_to_hex;
use crate::verify::verify_tape;

#[derive(Clone, Debug, Serialize)]
pub struct BatchEntry {
    pub path: String,
    pub accepted: bool,
    pub frame_count: Option<u32>,
    pub fingerprint: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub entries: Vec<BatchEntry>,
}

/// Tape files directly inside `dir`, sorted by name.
pub fn collect_tapes(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed listing directory {}", dir.display()))?
    {
        let path = entry
            .with_context(|| format!("failed reading entry in {}", dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "tape") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Verify every tape on a worker pool. A rejected tape is reported in its
/// entry; only unreadable files fail the batch.
pub fn verify_tapes(paths: &[PathBuf], max_frames: u32, jobs: Option<usize>) -> Result<BatchSummary> {
    let verify_one = |path: &PathBuf| -> Result<BatchEntry> {
        let bytes =
            fs::read(path).with_context(|| format!("failed reading tape {}", path.display()))?;
        let entry = match verify_tape(&bytes, max_frames) {
            Ok(verification) => BatchEntry {
                path: path.display().to_string(),
                accepted: true,
                frame_count: Some(verification.result.frame_count),
                fingerprint: Some(fingerprint_to_hex(verification.result.fingerprint)),
                error: None,
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "tape rejected");
                BatchEntry {
                    path: path.display().to_string(),
                    accepted: false,
                    frame_count: None,
                    fingerprint: None,
                    error: Some(err.to_string()),
                }
            }
        };
        Ok(entry)
    };

    let results: Vec<Result<BatchEntry>> = if let Some(jobs) = jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| paths.par_iter().map(verify_one).collect())
    } else {
        paths.par_iter().map(verify_one).collect()
    };

    let mut entries = Vec::with_capacity(results.len());
    for result in results {
        entries.push(result?);
    }
    let accepted = entries.iter().filter(|entry| entry.accepted).count();

    Ok(BatchSummary {
        accepted,
        rejected: entries.len() - accepted,
        entries,
    })
}
