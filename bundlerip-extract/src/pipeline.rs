//! Extraction orchestrator
//!
//! Drives one bundle end to end: validates the output root, then for
//! each asset in reader order resolves a name, runs the fallback
//! chain, and records the outcome. A single asset can never abort the
//! session; only session-fatal conditions (unwritable output) escape.

use crate::chain;
use crate::name::NameResolver;
use crate::session::{Session, SessionReport};
use bundlerip_core::{Bundle, ExtractError, Result};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Incremental progress observer
///
/// Called synchronously between assets; implementations must not
/// block.
pub trait Progress: Send + Sync {
    fn begin(&self, _total: usize) {}
    fn asset_done(&self, _processed: usize, _total: usize) {}
    fn finish(&self) {}
}

/// Observer that ignores all progress
pub struct NoProgress;

impl Progress for NoProgress {}

/// Orchestrates one bundle's extraction
#[derive(Debug, Default)]
pub struct ExtractionPipeline {
    cancel: Option<Arc<AtomicBool>>,
}

impl ExtractionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a cancellation flag, honored at asset boundaries
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Extract every asset in the bundle into `output_root`
    pub fn run(&self, bundle: &Bundle, output_root: &Path) -> Result<SessionReport> {
        self.run_with_progress(bundle, output_root, &NoProgress)
    }

    /// Extract with an observer for incremental progress
    pub fn run_with_progress(
        &self,
        bundle: &Bundle,
        output_root: &Path,
        progress: &dyn Progress,
    ) -> Result<SessionReport> {
        std::fs::create_dir_all(output_root).map_err(|e| {
            ExtractError::output_unwritable(format!("{}: {}", output_root.display(), e))
        })?;

        let total = bundle.len();
        tracing::info!(total, root = %output_root.display(), "starting extraction");
        progress.begin(total);

        let mut session = Session::new(output_root);
        let mut resolver = NameResolver::new();

        for asset in bundle.assets() {
            if self.cancelled() {
                tracing::info!(
                    processed = session.processed(),
                    total,
                    "cancellation requested, stopping at asset boundary"
                );
                break;
            }

            let name = resolver.resolve(asset, bundle);
            let dir = session.kind_dir(&asset.kind)?;
            let outcome = chain::run(asset, &name, &dir)?;
            tracing::debug!(
                path_id = outcome.path_id,
                kind = outcome.kind.name(),
                status = outcome.status.label(),
                tier = outcome.tier.label(),
                "asset processed"
            );
            session.record(outcome);
            progress.asset_done(session.processed(), total);
        }

        progress.finish();
        let report = session.finish(bundle);
        tracing::info!(
            succeeded = report.succeeded,
            partial = report.partial,
            failed = report.failed,
            "extraction finished"
        );
        Ok(report)
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}
