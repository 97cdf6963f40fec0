//! Extraction outcomes
//!
//! The fallback chain reports every asset through an explicit result
//! type rather than exceptions: which tier produced output, at what
//! status, with which files, and what failed on the way down.

use bundlerip_core::AssetKind;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Which fallback strategy produced an asset's output
///
/// Tiers are attempted from most specific to most generic; the chain
/// stops at the first success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FidelityTier {
    /// Per-kind decoder (pixels, samples, geometry, ...)
    Specific,
    /// Generic typed-field JSON dump
    Fields,
    /// Raw byte dump
    Raw,
    /// Minimal stub record of the failure
    Stub,
}

impl FidelityTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::Fields => "fields",
            Self::Raw => "raw",
            Self::Stub => "stub",
        }
    }
}

impl fmt::Display for FidelityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-asset extraction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionStatus {
    /// The first attempted tier succeeded
    Success,
    /// A lower-fidelity tier succeeded after downgrades
    PartialSuccess,
    /// Only the stub record could be written
    Failed,
}

impl ExtractionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::PartialSuccess => "PartialSuccess",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The error chain captured while tiers were downgraded
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionFailure {
    /// Root cause: the failure of the richest attempted tier
    pub message: String,
    /// One entry per failed tier, in attempt order
    pub trace: Vec<String>,
}

impl ExtractionFailure {
    pub fn from_trace(trace: Vec<String>) -> Self {
        Self {
            message: trace
                .first()
                .cloned()
                .unwrap_or_else(|| "no extraction strategy available".to_string()),
            trace,
        }
    }
}

/// One asset's extraction record, immutable once produced
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub path_id: i64,
    pub kind: AssetKind,
    /// Resolved, sanitized, de-duplicated output name
    pub name: String,
    pub status: ExtractionStatus,
    pub tier: FidelityTier,
    /// Files written for this asset; all exist when the outcome is
    /// returned
    pub output_paths: Vec<PathBuf>,
    pub error: Option<ExtractionFailure>,
}
