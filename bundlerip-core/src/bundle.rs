//! Bundle session model
//!
//! A [`Bundle`] is the in-memory view of one resource container:
//! ordered asset records plus the bundle-level facts the reader
//! exposes (engine version, target platform, container paths,
//! dependency edges).
//!
//! The binary container format itself is parsed by an external
//! reader. This crate's adapter boundary is the JSON bundle dump: a
//! document holding the reflected field trees of every object, with
//! byte buffers base64-encoded under the `$bytes` marker.

use crate::asset::Asset;
use crate::error::{ExtractError, Result};
use crate::field_value::FieldValue;
use crate::kind::AssetKind;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A directed reference from one asset to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: i64,
    pub to: i64,
}

/// One resource container's worth of assets and facts
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Engine version the bundle was built with
    pub engine_version: String,
    /// Target platform name
    pub platform: String,
    assets: Vec<Asset>,
    dependencies: Vec<DependencyEdge>,
}

impl Bundle {
    /// Create an empty bundle with the given facts
    pub fn new<S: Into<String>>(engine_version: S, platform: S) -> Self {
        Self {
            engine_version: engine_version.into(),
            platform: platform.into(),
            assets: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Append an asset, keeping reader order
    pub fn push(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    /// Record a dependency edge
    pub fn add_dependency(&mut self, from: i64, to: i64) {
        self.dependencies.push(DependencyEdge { from, to });
    }

    /// All assets in reader order
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Number of assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the bundle holds no assets
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Look up an asset by path id
    pub fn find(&self, path_id: i64) -> Option<&Asset> {
        self.assets.iter().find(|a| a.path_id == path_id)
    }

    /// Container paths of all mapped assets, in reader order
    pub fn container_paths(&self) -> Vec<&str> {
        self.assets
            .iter()
            .filter_map(|a| a.container_path.as_deref())
            .collect()
    }

    /// Dependency edges between assets
    pub fn dependencies(&self) -> &[DependencyEdge] {
        &self.dependencies
    }

    /// Load a bundle from a JSON dump file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            ExtractError::bundle_unreadable(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_slice(&data)
    }

    /// Parse a bundle from JSON dump bytes
    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        let doc: BundleDoc = serde_json::from_slice(data)
            .map_err(|e| ExtractError::bundle_unreadable(format!("invalid bundle JSON: {}", e)))?;

        let mut bundle = Bundle::new(
            doc.engine_version.unwrap_or_else(|| "unknown".to_string()),
            doc.platform.unwrap_or_else(|| "unknown".to_string()),
        );
        bundle.dependencies = doc.dependencies;

        for entry in doc.assets {
            let kind = match entry.kind {
                ClassRef::Name(name) => AssetKind::from_class_name(&name),
                ClassRef::Id(class_id) => AssetKind::from_class_id(class_id),
            };
            let mut asset = Asset::new(entry.path_id, kind);
            if let Some(container) = entry.container {
                asset = asset.with_container_path(container);
            }
            if let Some(name) = entry.name_hint {
                asset = asset.with_name_hint(name);
            }
            if let Some(owner) = entry.game_object {
                asset = asset.with_owner(owner);
            }
            if let Some(script) = entry.script {
                asset = asset.with_script_ref(script);
            }
            if let Some(enabled) = entry.enabled {
                asset = asset.with_enabled(enabled);
            }
            if let Some(fields) = entry.fields {
                match FieldValue::from_json(&fields) {
                    FieldValue::Object(tree) => asset = asset.with_fields(tree),
                    _ => {
                        return Err(ExtractError::bundle_unreadable(format!(
                            "asset {}: fields must be a JSON object",
                            entry.path_id
                        )));
                    }
                }
            }
            if let Some(message) = entry.field_error {
                asset = asset.with_field_error(message);
            }
            if let Some(encoded) = entry.raw {
                let raw = BASE64.decode(&encoded).map_err(|e| {
                    ExtractError::bundle_unreadable(format!(
                        "asset {}: bad raw data encoding: {}",
                        entry.path_id, e
                    ))
                })?;
                asset = asset.with_raw(raw);
            }
            bundle.push(asset);
        }

        Ok(bundle)
    }
}

#[derive(Deserialize)]
struct BundleDoc {
    engine_version: Option<String>,
    platform: Option<String>,
    #[serde(default)]
    assets: Vec<AssetDoc>,
    #[serde(default)]
    dependencies: Vec<DependencyEdge>,
}

/// A dump's class reference, either the class name or the numeric
/// Unity class id
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassRef {
    Name(String),
    Id(i32),
}

#[derive(Deserialize)]
struct AssetDoc {
    path_id: i64,
    #[serde(rename = "type")]
    kind: ClassRef,
    container: Option<String>,
    name_hint: Option<String>,
    game_object: Option<i64>,
    script: Option<i64>,
    enabled: Option<bool>,
    fields: Option<serde_json::Value>,
    field_error: Option<String>,
    raw: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_slice() {
        let doc = r#"{
            "engine_version": "2021.3.16f1",
            "platform": "StandaloneWindows64",
            "assets": [
                {
                    "path_id": 1,
                    "type": "TextAsset",
                    "container": "assets/readme.txt",
                    "fields": {"m_Name": "readme", "m_Script": "hello"}
                },
                {
                    "path_id": 2,
                    "type": "MonoBehaviour",
                    "name_hint": "Spawner",
                    "game_object": 5,
                    "field_error": "script class unresolved"
                }
            ],
            "dependencies": [{"from": 2, "to": 1}]
        }"#;

        let bundle = Bundle::from_json_slice(doc.as_bytes()).unwrap();
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.engine_version, "2021.3.16f1");
        assert_eq!(bundle.container_paths(), vec!["assets/readme.txt"]);
        assert_eq!(bundle.dependencies().len(), 1);

        let text = bundle.find(1).unwrap();
        assert_eq!(text.kind, AssetKind::TextAsset);
        assert!(text.has_fields());

        let behaviour = bundle.find(2).unwrap();
        assert!(behaviour.read_fields().is_err());
        assert_eq!(behaviour.name_hint(), Some("Spawner"));
    }

    #[test]
    fn test_numeric_class_ids() {
        let doc = r#"{"assets": [
            {"path_id": 1, "type": 28, "fields": {"m_Name": "icon"}},
            {"path_id": 2, "type": 999999}
        ]}"#;
        let bundle = Bundle::from_json_slice(doc.as_bytes()).unwrap();
        assert_eq!(bundle.find(1).unwrap().kind, AssetKind::Texture2D);
        assert_eq!(
            bundle.find(2).unwrap().kind,
            AssetKind::Other("Class_999999".to_string())
        );
    }

    #[test]
    fn test_bad_json_is_session_fatal() {
        let err = Bundle::from_json_slice(b"not json").unwrap_err();
        assert!(err.is_session_fatal());
    }

    #[test]
    fn test_raw_bytes_decode() {
        let doc = r#"{"assets": [{"path_id": 3, "type": "Shader", "raw": "AAEC"}]}"#;
        let bundle = Bundle::from_json_slice(doc.as_bytes()).unwrap();
        assert_eq!(bundle.find(3).unwrap().raw_data(), Some(&[0u8, 1, 2][..]));
    }
}
