//! Session state and report
//!
//! One [`Session`] tracks a single bundle's run: lazily created
//! per-kind output directories, running counts, and the ordered
//! outcome sequence. [`Session::finish`] freezes it into the
//! [`SessionReport`] consumed by the reporting writer.

use crate::outcome::{ExtractionOutcome, ExtractionStatus};
use bundlerip_core::{AssetKind, Bundle, ExtractError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Mutable per-bundle state, alive for one run
#[derive(Debug)]
pub struct Session {
    output_root: PathBuf,
    created_dirs: HashSet<PathBuf>,
    outcomes: Vec<ExtractionOutcome>,
}

impl Session {
    pub fn new<P: Into<PathBuf>>(output_root: P) -> Self {
        Self {
            output_root: output_root.into(),
            created_dirs: HashSet::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Output subdirectory for a kind, created on first use
    pub fn kind_dir(&mut self, kind: &AssetKind) -> Result<PathBuf> {
        let dir = self.output_root.join(kind.name());
        if !self.created_dirs.contains(&dir) {
            std::fs::create_dir_all(&dir).map_err(|e| {
                ExtractError::output_unwritable(format!("{}: {}", dir.display(), e))
            })?;
            self.created_dirs.insert(dir.clone());
        }
        Ok(dir)
    }

    /// Record one asset's outcome
    pub fn record(&mut self, outcome: ExtractionOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    /// Freeze into the final report
    pub fn finish(self, bundle: &Bundle) -> SessionReport {
        let mut succeeded = 0;
        let mut partial = 0;
        let mut failed = 0;
        let mut extracted_by_kind: BTreeMap<String, usize> = BTreeMap::new();

        for outcome in &self.outcomes {
            match outcome.status {
                ExtractionStatus::Success => succeeded += 1,
                ExtractionStatus::PartialSuccess => partial += 1,
                ExtractionStatus::Failed => failed += 1,
            }
            if outcome.status != ExtractionStatus::Failed {
                *extracted_by_kind
                    .entry(outcome.kind.name().to_string())
                    .or_insert(0) += 1;
            }
        }

        SessionReport {
            engine_version: bundle.engine_version.clone(),
            platform: bundle.platform.clone(),
            output_root: self.output_root,
            total: self.outcomes.len(),
            succeeded,
            partial,
            failed,
            extracted_by_kind,
            outcomes: self.outcomes,
        }
    }
}

/// Immutable summary of one bundle's extraction run
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub engine_version: String,
    pub platform: String,
    pub output_root: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub partial: usize,
    pub failed: usize,
    /// Successful and partial extraction counts per type directory
    pub extracted_by_kind: BTreeMap<String, usize>,
    pub outcomes: Vec<ExtractionOutcome>,
}

impl SessionReport {
    /// Outcomes that need a detail block in the log
    pub fn problems(&self) -> impl Iterator<Item = &ExtractionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != ExtractionStatus::Success)
    }

    pub fn find(&self, path_id: i64) -> Option<&ExtractionOutcome> {
        self.outcomes.iter().find(|o| o.path_id == path_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::FidelityTier;
    use tempfile::tempdir;

    fn outcome(path_id: i64, kind: AssetKind, status: ExtractionStatus) -> ExtractionOutcome {
        ExtractionOutcome {
            path_id,
            kind,
            name: format!("asset_{}", path_id),
            status,
            tier: FidelityTier::Fields,
            output_paths: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn test_kind_dir_created_once() {
        let dir = tempdir().unwrap();
        let mut session = Session::new(dir.path());

        let a = session.kind_dir(&AssetKind::Texture2D).unwrap();
        let b = session.kind_dir(&AssetKind::Texture2D).unwrap();
        assert_eq!(a, b);
        assert!(a.is_dir());
        assert!(a.ends_with("Texture2D"));
    }

    #[test]
    fn test_finish_counts() {
        let dir = tempdir().unwrap();
        let bundle = Bundle::new("2021.3.0f1", "Android");
        let mut session = Session::new(dir.path());
        session.record(outcome(1, AssetKind::Texture2D, ExtractionStatus::Success));
        session.record(outcome(
            2,
            AssetKind::MonoBehaviour,
            ExtractionStatus::PartialSuccess,
        ));
        session.record(outcome(
            3,
            AssetKind::Other("X".into()),
            ExtractionStatus::Failed,
        ));

        let report = session.finish(&bundle);
        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.partial, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.extracted_by_kind.get("Texture2D"), Some(&1));
        assert!(!report.extracted_by_kind.contains_key("X"));
        assert_eq!(report.problems().count(), 2);
    }
}
