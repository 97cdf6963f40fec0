//! Animation clip extraction
//!
//! Flattens the clip's float curves into JSON grouped by target
//! property path, one entry per curve with its keyframe sequence
//! (time, value, tangents).

use super::{with_ext, write_sidecar};
use bundlerip_core::{Asset, ExtractError, FieldValue, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn extract(asset: &Asset, base: &Path) -> Result<Vec<PathBuf>> {
    let fields = asset.read_fields()?;
    let curves = fields
        .get("m_FloatCurves")
        .and_then(FieldValue::as_array)
        .ok_or_else(|| ExtractError::missing_field("m_FloatCurves", asset.kind.name()))?;

    let mut grouped = serde_json::Map::new();
    let mut key_count = 0usize;
    for curve in curves {
        let path = curve
            .get("path")
            .and_then(FieldValue::as_str)
            .unwrap_or("")
            .to_string();
        let attribute = curve
            .get("attribute")
            .and_then(FieldValue::as_str)
            .unwrap_or("")
            .to_string();

        let keyframes: Vec<serde_json::Value> = curve
            .get("curve")
            .and_then(|c| c.get("m_Curve"))
            .and_then(FieldValue::as_array)
            .map(|keys| {
                keys.iter()
                    .map(|key| {
                        json!({
                            "time": key.get("time").and_then(FieldValue::as_f64),
                            "value": key.get("value").and_then(FieldValue::as_f64),
                            "in_slope": key.get("inSlope").and_then(FieldValue::as_f64),
                            "out_slope": key.get("outSlope").and_then(FieldValue::as_f64),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        key_count += keyframes.len();

        let entry = json!({
            "attribute": attribute,
            "keyframes": keyframes,
        });
        match grouped.get_mut(&path) {
            Some(serde_json::Value::Array(list)) => list.push(entry),
            _ => {
                grouped.insert(path, serde_json::Value::Array(vec![entry]));
            }
        }
    }

    let doc = json!({
        "name": fields.get("m_Name").map(FieldValue::to_json),
        "curves": grouped,
    });

    let path = with_ext(base, "json");
    let text = serde_json::to_vec_pretty(&doc)
        .map_err(|e| ExtractError::decode(format!("animation serialization: {}", e)))?;
    std::fs::write(&path, text)?;

    let sidecar = write_sidecar(
        base,
        &json!({
            "curve_count": curves.len(),
            "keyframe_count": key_count,
        }),
    )?;

    Ok(vec![path, sidecar])
}
