//! Material extraction
//!
//! Collects the shader reference and the float/color/texture property
//! blocks into one structured JSON document. Textures are referenced
//! by name or path id, never inlined.

use super::{with_ext, write_sidecar};
use bundlerip_core::{Asset, ExtractError, FieldValue, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn extract(asset: &Asset, base: &Path) -> Result<Vec<PathBuf>> {
    let fields = asset.read_fields()?;

    let shader = fields
        .get("m_Shader")
        .map(FieldValue::to_json)
        .unwrap_or(serde_json::Value::Null);

    let saved = fields
        .get("m_SavedProperties")
        .and_then(FieldValue::as_object);
    let floats = property_block(saved.and_then(|p| p.get("m_Floats")));
    let colors = property_block(saved.and_then(|p| p.get("m_Colors")));
    let textures = property_block(saved.and_then(|p| p.get("m_TexEnvs")));

    let doc = json!({
        "name": fields.get("m_Name").map(FieldValue::to_json),
        "shader": shader,
        "floats": floats,
        "colors": colors,
        "textures": textures,
    });

    let path = with_ext(base, "json");
    let text = serde_json::to_vec_pretty(&doc)
        .map_err(|e| ExtractError::decode(format!("material serialization: {}", e)))?;
    std::fs::write(&path, text)?;

    let sidecar = write_sidecar(
        base,
        &json!({
            "float_count": floats.as_object().map(|m| m.len()).unwrap_or(0),
            "color_count": colors.as_object().map(|m| m.len()).unwrap_or(0),
            "texture_count": textures.as_object().map(|m| m.len()).unwrap_or(0),
        }),
    )?;

    Ok(vec![path, sidecar])
}

/// Normalize a property block into a name-keyed JSON object
///
/// Blocks arrive either as a plain mapping or as an array of
/// `{first, second}` pairs, depending on the serializer that produced
/// the dump.
fn property_block(value: Option<&FieldValue>) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    match value {
        Some(FieldValue::Object(map)) => {
            for (name, v) in map {
                out.insert(name.clone(), v.to_json());
            }
        }
        Some(FieldValue::Array(pairs)) => {
            for pair in pairs {
                let name = pair
                    .get("first")
                    .and_then(FieldValue::as_str)
                    .map(str::to_string);
                if let (Some(name), Some(second)) = (name, pair.get("second")) {
                    out.insert(name, second.to_json());
                }
            }
        }
        _ => {}
    }
    serde_json::Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlerip_core::FieldTree;

    #[test]
    fn test_property_block_from_mapping() {
        let mut map = FieldTree::new();
        map.insert("_Glossiness".to_string(), 0.5f64.into());
        let block = property_block(Some(&FieldValue::Object(map)));
        assert_eq!(block["_Glossiness"], json!(0.5));
    }

    #[test]
    fn test_property_block_from_pairs() {
        let mut pair = FieldTree::new();
        pair.insert("first".to_string(), "_MainTex".into());
        let mut tex = FieldTree::new();
        tex.insert("m_PathID".to_string(), 77i64.into());
        pair.insert("second".to_string(), FieldValue::Object(tex));

        let block = property_block(Some(&FieldValue::Array(vec![FieldValue::Object(pair)])));
        assert_eq!(block["_MainTex"]["m_PathID"], json!(77));
    }
}
