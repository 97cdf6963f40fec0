//! bundlerip-extract
//!
//! The extraction pipeline for Unity bundle assets: name resolution,
//! type-specific decoders, the multi-tier fallback chain, the
//! per-bundle orchestrator, and the reporting writer.
//!
//! # Example
//!
//! ```no_run
//! use bundlerip_core::Bundle;
//! use bundlerip_extract::extract_bundle;
//!
//! let bundle = Bundle::from_json_file("game.bundle.json")?;
//! let report = extract_bundle(&bundle, "out".as_ref())?;
//! println!("{} extracted, {} failed", report.succeeded, report.failed);
//! # Ok::<(), bundlerip_core::ExtractError>(())
//! ```

pub mod chain;
pub mod extractors;
pub mod name;
pub mod outcome;
pub mod pipeline;
pub mod report;
pub mod session;

// Re-export main types
pub use name::NameResolver;
pub use outcome::{ExtractionFailure, ExtractionOutcome, ExtractionStatus, FidelityTier};
pub use pipeline::{ExtractionPipeline, NoProgress, Progress};
pub use session::{Session, SessionReport};

use bundlerip_core::{Bundle, Result};
use std::path::Path;

/// Run the full pipeline and write the log and metadata side-files
pub fn extract_bundle(bundle: &Bundle, output_root: &Path) -> Result<SessionReport> {
    extract_bundle_with_progress(bundle, output_root, &NoProgress)
}

/// Like [`extract_bundle`], with an incremental progress observer
pub fn extract_bundle_with_progress(
    bundle: &Bundle,
    output_root: &Path,
    progress: &dyn Progress,
) -> Result<SessionReport> {
    let report = ExtractionPipeline::new().run_with_progress(bundle, output_root, progress)?;
    report::write_all(&report, bundle, output_root)?;
    Ok(report)
}
