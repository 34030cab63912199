use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::aoa::{AngleAnalysis, AngleEstimator};
use crate::batch::{AngleGroup, AngleStatistics, WrapPolicy, summarize};
use crate::error::{AoaError, Result};
use crate::signal_processing::{CorrelationPoint, DelayTriple};

/// Result of estimating one recording
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delays: Option<DelayTriple>,
    /// Correlation around zero lag for the (2,1), (3,1) and (3,2) pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<[Vec<CorrelationPoint>; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    fn analyzed(path: &Path, analysis: AngleAnalysis, keep_windows: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            angle_deg: Some(analysis.angle.degrees()),
            delays: Some(analysis.delays),
            windows: keep_windows.then_some(analysis.windows),
            error: None,
        }
    }

    fn failed(path: &Path, error: &AoaError) -> Self {
        Self {
            path: path.to_path_buf(),
            angle_deg: None,
            delays: None,
            windows: None,
            error: Some(error.to_string()),
        }
    }

    /// File name for display, falling back to the full path
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Per-file outcomes and aggregate statistics of one group
#[derive(Debug, Clone, Serialize)]
pub struct GroupResult {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_deg: Option<f64>,
    pub files: Vec<FileOutcome>,
    /// Absent when no file in the group produced an estimate
    pub statistics: Option<AngleStatistics>,
}

impl GroupResult {
    pub fn angles(&self) -> Vec<f64> {
        self.files.iter().filter_map(|f| f.angle_deg).collect()
    }

    pub fn failures(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }
}

/// Runs an estimator over groups of recordings
///
/// Files within a group are processed in parallel; groups are processed in
/// order and results keep the input order.
pub struct BatchRunner {
    estimator: AngleEstimator,
    policy: WrapPolicy,
    fail_fast: bool,
    keep_windows: bool,
}

impl BatchRunner {
    pub fn new(estimator: AngleEstimator, policy: WrapPolicy) -> Self {
        Self {
            estimator,
            policy,
            fail_fast: false,
            keep_windows: false,
        }
    }

    /// Abort the batch on the first file that fails instead of recording it
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Keep each file's correlation windows in its outcome
    pub fn with_windows(mut self, keep_windows: bool) -> Self {
        self.keep_windows = keep_windows;
        self
    }

    pub fn estimator(&self) -> &AngleEstimator {
        &self.estimator
    }

    /// Analyze every file in parallel, keeping the input order
    pub fn analyze_files(&self, files: &[PathBuf]) -> Vec<Result<AngleAnalysis>> {
        files
            .par_iter()
            .map(|path| self.estimator.analyze_file(path))
            .collect()
    }

    /// Estimate one group and summarize it
    ///
    /// # Errors
    /// `AoaError::InvalidFilterSpec` always aborts the group. Other errors
    /// abort only in fail-fast mode. Either way the first error in input
    /// order is returned.
    pub fn run_group(&self, group: &AngleGroup) -> Result<GroupResult> {
        log::info!("Group {}: {} files", group.label, group.files.len());

        let results = self.analyze_files(&group.files);
        let mut files = Vec::with_capacity(results.len());
        for (path, result) in group.files.iter().zip(results) {
            match result {
                Ok(analysis) => {
                    log::info!("{}: {}", path.display(), analysis.angle);
                    files.push(FileOutcome::analyzed(path, analysis, self.keep_windows));
                }
                Err(e @ AoaError::InvalidFilterSpec(_)) => {
                    log::error!("{}: {}", path.display(), e);
                    return Err(e);
                }
                Err(e) if self.fail_fast => {
                    log::error!("{}: {}", path.display(), e);
                    return Err(e);
                }
                Err(e) => {
                    log::warn!("{}: {}", path.display(), e);
                    files.push(FileOutcome::failed(path, &e));
                }
            }
        }

        let mut group_result = GroupResult {
            label: group.label.clone(),
            reference_deg: group.reference_deg,
            files,
            statistics: None,
        };
        group_result.statistics = summarize(&group_result.angles(), self.policy, group.reference_deg);

        if let Some(stats) = &group_result.statistics {
            log::info!(
                "Group {}: mean {:.1}° std {:.2}° over {} estimates",
                group.label,
                stats.mean_deg,
                stats.std_dev_deg,
                stats.count
            );
        }
        Ok(group_result)
    }

    pub fn run(&self, groups: &[AngleGroup]) -> Result<Vec<GroupResult>> {
        groups.iter().map(|g| self.run_group(g)).collect()
    }
}
