//! Reporting and metadata writer
//!
//! Terminal serialization of a session: the human-readable
//! `extraction_log.txt` plus the structured side-files
//! (`bundle_metadata.json`, `type_tree.json`, `dependencies.json`).
//! Every file is written to a temporary name and renamed into place so
//! an interrupted run never leaves partial reports.

use crate::session::SessionReport;
use bundlerip_core::{Bundle, ExtractError, FieldValue, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

/// File names written next to the per-kind directories
pub const LOG_FILE: &str = "extraction_log.txt";
pub const METADATA_FILE: &str = "bundle_metadata.json";
pub const TYPE_TREE_FILE: &str = "type_tree.json";
pub const DEPENDENCIES_FILE: &str = "dependencies.json";

/// Write the log and all metadata side-files, returning their paths
pub fn write_all(report: &SessionReport, bundle: &Bundle, output_root: &Path) -> Result<Vec<PathBuf>> {
    let log = output_root.join(LOG_FILE);
    atomic_write(&log, render_log(report).as_bytes())?;

    let metadata = output_root.join(METADATA_FILE);
    atomic_write(&metadata, &to_pretty(&bundle_metadata(report, bundle))?)?;

    let type_tree = output_root.join(TYPE_TREE_FILE);
    atomic_write(&type_tree, &to_pretty(&type_tree_doc(report, bundle))?)?;

    let dependencies = output_root.join(DEPENDENCIES_FILE);
    atomic_write(
        &dependencies,
        &to_pretty(&json!({ "edges": bundle.dependencies() }))?,
    )?;

    Ok(vec![log, metadata, type_tree, dependencies])
}

/// Render the run summary in the log format
pub fn render_log(report: &SessionReport) -> String {
    let mut log = String::new();
    log.push_str("== UnityFS Bundle Extraction Log ==\n");
    log.push_str(&format!("Total objects processed: {}\n", report.total));
    log.push_str(&format!("Successfully extracted: {}\n", report.succeeded));
    log.push_str(&format!("Partial extractions: {}\n", report.partial));
    log.push_str(&format!("Failed extractions: {}\n\n", report.failed));

    log.push_str("== Extracted Object Type Counts ==\n");
    if report.extracted_by_kind.is_empty() {
        log.push_str("No objects were successfully extracted.\n");
    } else {
        for (kind, count) in &report.extracted_by_kind {
            log.push_str(&format!("- {}: {}\n", kind, count));
        }
    }

    log.push_str("\n== Error Details ==\n");
    let mut any = false;
    for outcome in report.problems() {
        any = true;
        log.push_str(&format!("Object ID: {}\n", outcome.path_id));
        log.push_str(&format!("Type: {}\n", outcome.kind.name()));
        log.push_str(&format!("Name: {}\n", outcome.name));
        log.push_str(&format!("Status: {}\n", outcome.status));
        log.push_str(&format!("Tier: {}\n", outcome.tier));
        if let Some(failure) = &outcome.error {
            log.push_str(&format!("Error: {}\n", failure.message));
            if failure.trace.len() > 1 {
                log.push_str("Trace:\n");
                for entry in &failure.trace {
                    log.push_str(&format!("  - {}\n", entry));
                }
            }
        }
        log.push_str(&"=".repeat(50));
        log.push('\n');
    }
    if !any {
        log.push_str("No errors recorded.\n");
    }
    log
}

fn bundle_metadata(report: &SessionReport, bundle: &Bundle) -> serde_json::Value {
    json!({
        "engine_version": bundle.engine_version,
        "platform": bundle.platform,
        "asset_count": bundle.len(),
        "container_paths": bundle.container_paths(),
        "extracted_by_type": report.extracted_by_kind,
        "status_counts": {
            "success": report.succeeded,
            "partial_success": report.partial,
            "failed": report.failed,
        },
    })
}

fn type_tree_doc(report: &SessionReport, bundle: &Bundle) -> serde_json::Value {
    let mut objects = serde_json::Map::new();
    for asset in bundle.assets() {
        let Ok(fields) = asset.read_fields() else {
            continue;
        };
        let name = report
            .find(asset.path_id)
            .map(|o| o.name.clone())
            .unwrap_or_default();
        objects.insert(
            asset.path_id.to_string(),
            json!({
                "type": asset.kind.name(),
                "name": name,
                "fields": FieldValue::Object(fields.clone()),
            }),
        );
    }
    serde_json::Value::Object(objects)
}

fn to_pretty(value: &serde_json::Value) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value)
        .map_err(|e| ExtractError::decode(format!("report serialization: {}", e)))
}

/// Write to `<path>.tmp` then rename into place
fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    let tmp = PathBuf::from(os);
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionPipeline;
    use bundlerip_core::{Asset, AssetKind, FieldTree};
    use tempfile::tempdir;

    fn run_bundle() -> (tempfile::TempDir, SessionReport, Bundle) {
        let dir = tempdir().unwrap();
        let mut bundle = Bundle::new("2021.3.16f1", "StandaloneWindows64");
        let mut tree = FieldTree::new();
        tree.insert("m_Name".to_string(), "readme".into());
        tree.insert("m_Script".to_string(), "hello".into());
        bundle.push(
            Asset::new(1, AssetKind::TextAsset)
                .with_fields(tree)
                .with_container_path("assets/readme.txt"),
        );
        bundle.push(
            Asset::new(2, AssetKind::MonoBehaviour)
                .with_name_hint("Spawner")
                .with_field_error("script class unresolved"),
        );
        bundle.add_dependency(2, 1);

        let report = ExtractionPipeline::new().run(&bundle, dir.path()).unwrap();
        (dir, report, bundle)
    }

    #[test]
    fn test_log_layout() {
        let (_dir, report, _bundle) = run_bundle();
        let log = render_log(&report);
        assert!(log.starts_with("== UnityFS Bundle Extraction Log ==\n"));
        assert!(log.contains("Total objects processed: 2\n"));
        assert!(log.contains("Successfully extracted: 1\n"));
        assert!(log.contains("Partial extractions: 1\n"));
        assert!(log.contains("- TextAsset: 1\n"));
        assert!(log.contains("Status: PartialSuccess\n"));
        assert!(log.contains("script class unresolved"));
    }

    #[test]
    fn test_side_files_written_atomically() {
        let (dir, report, bundle) = run_bundle();
        let paths = write_all(&report, &bundle, dir.path()).unwrap();
        assert_eq!(paths.len(), 4);
        for path in &paths {
            assert!(path.is_file(), "{} missing", path.display());
        }
        // no leftover temp files
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name();
            assert!(!name.to_string_lossy().ends_with(".tmp"));
        }

        let metadata: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(METADATA_FILE)).unwrap()).unwrap();
        assert_eq!(metadata["engine_version"], "2021.3.16f1");
        assert_eq!(metadata["container_paths"][0], "assets/readme.txt");
        assert_eq!(metadata["status_counts"]["partial_success"], 1);

        let tree: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(TYPE_TREE_FILE)).unwrap()).unwrap();
        assert_eq!(tree["1"]["type"], "TextAsset");
        assert!(tree.get("2").is_none()); // unreadable tree skipped

        let deps: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(DEPENDENCIES_FILE)).unwrap())
                .unwrap();
        assert_eq!(deps["edges"][0]["from"], 2);
    }
}
