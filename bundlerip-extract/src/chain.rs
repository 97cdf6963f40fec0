//! Fallback decoder chain
//!
//! Attempts decreasingly specific strategies for a single asset until
//! one produces output: the kind's specific extractor, the typed-field
//! JSON dump, the raw byte dump, and finally a stub record of the
//! failure. Tier failures are absorbed and recorded; only an
//! unwritable output at the stub tier escapes as session-fatal.

use crate::extractors::{self, with_ext};
use crate::outcome::{ExtractionFailure, ExtractionOutcome, ExtractionStatus, FidelityTier};
use bundlerip_core::{Asset, FieldValue, Result};
use std::path::{Path, PathBuf};

/// Run the chain for one asset, writing under `dir` as `name`
pub fn run(asset: &Asset, name: &str, dir: &Path) -> Result<ExtractionOutcome> {
    let base = dir.join(name);
    let mut trace: Vec<String> = Vec::new();

    // Tier 0: kind-specific decoder
    let had_specific = match extractors::specific(asset, &base) {
        Some(Ok(paths)) => {
            return Ok(outcome(
                asset,
                name,
                ExtractionStatus::Success,
                FidelityTier::Specific,
                paths,
                Vec::new(),
            ));
        }
        Some(Err(err)) => {
            tracing::debug!(
                path_id = asset.path_id,
                kind = asset.kind.name(),
                error = %err,
                "specific extractor failed, downgrading to field dump"
            );
            trace.push(format!("specific: {}", err));
            true
        }
        None => false,
    };

    // Tier 1: typed-field dump, or basic header fields when the tree
    // is unreadable
    match fields_tier(asset, &base) {
        Ok(FieldsArtifact::Full(paths)) => {
            let status = if had_specific {
                ExtractionStatus::PartialSuccess
            } else {
                ExtractionStatus::Success
            };
            return Ok(outcome(asset, name, status, FidelityTier::Fields, paths, trace));
        }
        Ok(FieldsArtifact::Basic(paths, reason)) => {
            trace.push(format!("fields: {}", reason));
            return Ok(outcome(
                asset,
                name,
                ExtractionStatus::PartialSuccess,
                FidelityTier::Fields,
                paths,
                trace,
            ));
        }
        Err(err) => {
            tracing::debug!(
                path_id = asset.path_id,
                kind = asset.kind.name(),
                error = %err,
                "field dump failed, downgrading to raw dump"
            );
            trace.push(format!("fields: {}", err));
        }
    }

    // Tier 2: raw byte dump
    match raw_tier(asset, &base) {
        Ok(Some(paths)) => {
            return Ok(outcome(
                asset,
                name,
                ExtractionStatus::PartialSuccess,
                FidelityTier::Raw,
                paths,
                trace,
            ));
        }
        Ok(None) => trace.push("raw: no raw byte buffer available".to_string()),
        Err(err) => trace.push(format!("raw: {}", err)),
    }

    // Tier 3: stub record. A write failure here means the output
    // directory itself is unusable and aborts the session.
    let stub = stub_tier(asset, &base, &trace)?;
    Ok(outcome(
        asset,
        name,
        ExtractionStatus::Failed,
        FidelityTier::Stub,
        vec![stub],
        trace,
    ))
}

enum FieldsArtifact {
    Full(Vec<PathBuf>),
    Basic(Vec<PathBuf>, String),
}

fn fields_tier(asset: &Asset, base: &Path) -> Result<FieldsArtifact> {
    match asset.read_fields() {
        Ok(tree) => {
            let doc = FieldValue::Object(tree.clone());
            let path = with_ext(base, "json");
            let text = serde_json::to_vec_pretty(&doc).map_err(|e| {
                bundlerip_core::ExtractError::decode(format!("field dump serialization: {}", e))
            })?;
            std::fs::write(&path, text)?;
            Ok(FieldsArtifact::Full(vec![path]))
        }
        Err(read_err) => {
            let mut basic = serde_json::Map::new();
            if let Some(name) = asset.name_hint() {
                basic.insert("m_Name".to_string(), name.into());
            }
            if let Some(enabled) = asset.enabled() {
                basic.insert("m_Enabled".to_string(), enabled.into());
            }
            if let Some(owner) = asset.owner() {
                basic.insert("m_GameObject_PathID".to_string(), owner.into());
            }
            if let Some(script) = asset.script_ref() {
                basic.insert("m_Script_PathID".to_string(), script.into());
            }
            if basic.is_empty() {
                return Err(read_err);
            }

            let mut os = base.as_os_str().to_owned();
            os.push("_basic.json");
            let path = PathBuf::from(os);
            let text = serde_json::to_vec_pretty(&serde_json::Value::Object(basic)).map_err(
                |e| bundlerip_core::ExtractError::decode(format!("basic dump serialization: {}", e)),
            )?;
            std::fs::write(&path, text)?;
            Ok(FieldsArtifact::Basic(
                vec![path],
                format!("field tree unreadable ({}), saved basic fields", read_err),
            ))
        }
    }
}

fn raw_tier(asset: &Asset, base: &Path) -> Result<Option<Vec<PathBuf>>> {
    let Some(raw) = asset.raw_data() else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    let path = with_ext(base, "bin");
    std::fs::write(&path, raw)?;
    Ok(Some(vec![path]))
}

fn stub_tier(asset: &Asset, base: &Path, trace: &[String]) -> Result<PathBuf> {
    let mut os = base.as_os_str().to_owned();
    os.push("_stub.txt");
    let path = PathBuf::from(os);

    let mut record = String::new();
    record.push_str(&format!("path_id: {}\n", asset.path_id));
    record.push_str(&format!("type: {}\n", asset.kind.name()));
    record.push_str("errors:\n");
    if trace.is_empty() {
        record.push_str("  - no extraction strategy available\n");
    }
    for entry in trace {
        record.push_str(&format!("  - {}\n", entry));
    }
    std::fs::write(&path, record)?;
    Ok(path)
}

fn outcome(
    asset: &Asset,
    name: &str,
    status: ExtractionStatus,
    tier: FidelityTier,
    output_paths: Vec<PathBuf>,
    trace: Vec<String>,
) -> ExtractionOutcome {
    let error = if status == ExtractionStatus::Success {
        None
    } else {
        Some(ExtractionFailure::from_trace(trace))
    };
    ExtractionOutcome {
        path_id: asset.path_id,
        kind: asset.kind.clone(),
        name: name.to_string(),
        status,
        tier,
        output_paths,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlerip_core::{AssetKind, FieldTree};
    use tempfile::tempdir;

    #[test]
    fn test_generic_kind_succeeds_at_fields_tier() {
        let dir = tempdir().unwrap();
        let mut tree = FieldTree::new();
        tree.insert("m_Name".to_string(), "root".into());
        let asset = Asset::new(1, AssetKind::GameObject).with_fields(tree);

        let out = run(&asset, "root", dir.path()).unwrap();
        assert_eq!(out.status, ExtractionStatus::Success);
        assert_eq!(out.tier, FidelityTier::Fields);
        assert!(out.output_paths[0].ends_with("root.json"));
        assert!(out.error.is_none());
    }

    #[test]
    fn test_unreadable_behaviour_saves_basic_fields() {
        let dir = tempdir().unwrap();
        let asset = Asset::new(2, AssetKind::MonoBehaviour)
            .with_name_hint("Spawner")
            .with_owner(9)
            .with_script_ref(4)
            .with_field_error("script class unresolved");

        let out = run(&asset, "Spawner", dir.path()).unwrap();
        assert_eq!(out.status, ExtractionStatus::PartialSuccess);
        assert_eq!(out.tier, FidelityTier::Fields);
        assert!(out.output_paths[0].ends_with("Spawner_basic.json"));

        let doc: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&out.output_paths[0]).unwrap()).unwrap();
        assert_eq!(doc["m_GameObject_PathID"], 9);
        assert!(
            out.error
                .as_ref()
                .map(|e| e.message.contains("script class unresolved"))
                .unwrap_or(false)
        );
    }

    #[test]
    fn test_raw_tier_when_fields_unreadable() {
        let dir = tempdir().unwrap();
        let asset = Asset::new(3, AssetKind::Other("ShaderVariantCollection".into()))
            .with_field_error("no type tree")
            .with_raw(vec![0xde, 0xad]);

        let out = run(&asset, "blob", dir.path()).unwrap();
        assert_eq!(out.status, ExtractionStatus::PartialSuccess);
        assert_eq!(out.tier, FidelityTier::Raw);
        assert_eq!(std::fs::read(&out.output_paths[0]).unwrap(), vec![0xde, 0xad]);
    }

    #[test]
    fn test_stub_is_terminal_and_always_written() {
        let dir = tempdir().unwrap();
        let asset = Asset::new(4, AssetKind::Other("Unknown".into()));

        let out = run(&asset, "mystery", dir.path()).unwrap();
        assert_eq!(out.status, ExtractionStatus::Failed);
        assert_eq!(out.tier, FidelityTier::Stub);
        let stub = std::fs::read_to_string(&out.output_paths[0]).unwrap();
        assert!(stub.contains("path_id: 4"));
        assert!(stub.contains("type: Unknown"));
    }

    #[test]
    fn test_malformed_texture_downgrades_to_fields() {
        let dir = tempdir().unwrap();
        let mut tree = FieldTree::new();
        tree.insert("m_Name".to_string(), "icon".into());
        tree.insert("m_Width".to_string(), 4i64.into());
        tree.insert("m_Height".to_string(), 4i64.into());
        tree.insert("m_TextureFormat".to_string(), 4i64.into());
        // 4x4 RGBA32 needs 64 bytes
        tree.insert("image data".to_string(), vec![0u8; 8].into());
        let asset = Asset::new(5, AssetKind::Texture2D).with_fields(tree);

        let out = run(&asset, "icon", dir.path()).unwrap();
        assert_eq!(out.status, ExtractionStatus::PartialSuccess);
        assert_eq!(out.tier, FidelityTier::Fields);
        assert!(out.output_paths[0].ends_with("icon.json"));
        let failure = out.error.unwrap();
        assert!(failure.trace[0].contains("too short"));
    }
}
