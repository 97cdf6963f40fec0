//! Text-like payload extraction
//!
//! TextAsset, MonoScript, Shader, and Font all carry a single content
//! payload; the artifact extension is inferred by content sniffing
//! (JSON braces, C# preamble, OTTO font magic). Byte payloads are
//! decoded as UTF-8 with substitution, which is recorded as an
//! encoding warning, not a failure.

use super::with_ext;
use bundlerip_core::{Asset, ExtractError, FieldValue, Result};
use std::path::{Path, PathBuf};

pub fn extract_text_asset(asset: &Asset, base: &Path) -> Result<Vec<PathBuf>> {
    let fields = asset.read_fields()?;
    let content = script_content(asset, fields.get("m_Script"))?;

    let ext = if looks_like_json(&content) { "json" } else { "txt" };
    let path = with_ext(base, ext);
    std::fs::write(&path, content)?;
    Ok(vec![path])
}

pub fn extract_mono_script(asset: &Asset, base: &Path) -> Result<Vec<PathBuf>> {
    let fields = asset.read_fields()?;

    // Decompiled source is rare but worth keeping when present
    if let Some(value) = fields.get("m_Script") {
        if let Ok(content) = script_content(asset, Some(value)) {
            let trimmed = content.trim_start();
            if trimmed.starts_with("using ") || trimmed.starts_with("namespace ") {
                let path = with_ext(base, "cs");
                std::fs::write(&path, content)?;
                return Ok(vec![path]);
            }
        }
    }

    // Otherwise the script's reflection record is the artifact
    let doc = FieldValue::Object(fields.clone());
    let path = with_ext(base, "json");
    let text = serde_json::to_vec_pretty(&doc)
        .map_err(|e| ExtractError::decode(format!("script serialization: {}", e)))?;
    std::fs::write(&path, text)?;
    Ok(vec![path])
}

pub fn extract_shader(asset: &Asset, base: &Path) -> Result<Vec<PathBuf>> {
    let fields = asset.read_fields()?;
    let content = script_content(asset, fields.get("m_Script"))?;

    let path = with_ext(base, "shader");
    std::fs::write(&path, content)?;
    Ok(vec![path])
}

pub fn extract_font(asset: &Asset, base: &Path) -> Result<Vec<PathBuf>> {
    let fields = asset.read_fields()?;
    let data = fields
        .get("m_FontData")
        .and_then(FieldValue::as_bytes)
        .ok_or_else(|| ExtractError::missing_field("m_FontData", asset.kind.name()))?;
    if data.is_empty() {
        return Err(ExtractError::invalid_data("empty font data buffer"));
    }

    let ext = if data.starts_with(b"OTTO") { "otf" } else { "ttf" };
    let path = with_ext(base, ext);
    std::fs::write(&path, data)?;
    Ok(vec![path])
}

fn script_content(asset: &Asset, value: Option<&FieldValue>) -> Result<String> {
    let content = match value {
        Some(FieldValue::String(s)) => s.clone(),
        Some(FieldValue::Bytes(b)) => {
            let text = String::from_utf8_lossy(b);
            if text.contains('\u{fffd}') {
                tracing::warn!(
                    path_id = asset.path_id,
                    "script content is not valid UTF-8, decoded with substitution"
                );
            }
            text.into_owned()
        }
        _ => {
            return Err(ExtractError::missing_field("m_Script", asset.kind.name()));
        }
    };
    if content.is_empty() {
        return Err(ExtractError::invalid_data("empty script content"));
    }
    Ok(content)
}

fn looks_like_json(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlerip_core::{AssetKind, FieldTree};
    use tempfile::tempdir;

    fn with_script(kind: AssetKind, script: FieldValue) -> Asset {
        let mut tree = FieldTree::new();
        tree.insert("m_Name".to_string(), "payload".into());
        tree.insert("m_Script".to_string(), script);
        Asset::new(1, kind).with_fields(tree)
    }

    #[test]
    fn test_text_asset_extension_sniffing() {
        let dir = tempdir().unwrap();

        let asset = with_script(AssetKind::TextAsset, r#"{"a": 1}"#.into());
        let paths = extract_text_asset(&asset, &dir.path().join("cfg")).unwrap();
        assert!(paths[0].ends_with("cfg.json"));

        let asset = with_script(AssetKind::TextAsset, "hello".into());
        let paths = extract_text_asset(&asset, &dir.path().join("note")).unwrap();
        assert!(paths[0].ends_with("note.txt"));
        assert_eq!(std::fs::read_to_string(&paths[0]).unwrap(), "hello");
    }

    #[test]
    fn test_text_asset_bytes_decoded_lossily() {
        let dir = tempdir().unwrap();
        let asset = with_script(
            AssetKind::TextAsset,
            FieldValue::Bytes(b"abc\xff".to_vec()),
        );
        let paths = extract_text_asset(&asset, &dir.path().join("bin")).unwrap();
        let content = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(content.starts_with("abc"));
    }

    #[test]
    fn test_mono_script_source_detection() {
        let dir = tempdir().unwrap();
        let asset = with_script(
            AssetKind::MonoScript,
            "using UnityEngine;\nclass A {}".into(),
        );
        let paths = extract_mono_script(&asset, &dir.path().join("A")).unwrap();
        assert!(paths[0].ends_with("A.cs"));
    }

    #[test]
    fn test_mono_script_falls_back_to_field_dump() {
        let dir = tempdir().unwrap();
        let mut tree = FieldTree::new();
        tree.insert("m_ClassName".to_string(), "EnemyAI".into());
        let asset = Asset::new(2, AssetKind::MonoScript).with_fields(tree);

        let paths = extract_mono_script(&asset, &dir.path().join("EnemyAI")).unwrap();
        assert!(paths[0].ends_with("EnemyAI.json"));
        let doc: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths[0]).unwrap()).unwrap();
        assert_eq!(doc["m_ClassName"], "EnemyAI");
    }

    #[test]
    fn test_font_magic_sniffing() {
        let dir = tempdir().unwrap();
        let mut tree = FieldTree::new();
        tree.insert("m_FontData".to_string(), b"OTTO rest".to_vec().into());
        let asset = Asset::new(3, AssetKind::Font).with_fields(tree);

        let paths = extract_font(&asset, &dir.path().join("Title")).unwrap();
        assert!(paths[0].ends_with("Title.otf"));
    }

    #[test]
    fn test_empty_content_fails_tier() {
        let dir = tempdir().unwrap();
        let asset = with_script(AssetKind::TextAsset, "".into());
        assert!(extract_text_asset(&asset, &dir.path().join("empty")).is_err());
    }
}
