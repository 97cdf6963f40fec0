//! Type-specific extractors
//!
//! One module per capability: pixel data, audio samples, geometry,
//! material bindings, keyframe curves, and text-like payloads. Each
//! extractor takes the asset plus a base output path (directory and
//! resolved name, no extension) and either returns the files it wrote
//! or fails, handing the asset to the next fallback tier. Extractors
//! never abort the session.

pub mod animation;
pub mod audio;
pub mod material;
pub mod mesh;
pub mod texture;
pub mod text;

use bundlerip_core::{Asset, AssetKind, ExtractError, FieldTree, FieldValue, Result};
use std::path::{Path, PathBuf};

/// Dispatch to the specific extractor for this asset's kind
///
/// Returns `None` for kinds with no specific strategy; the chain then
/// starts at the typed-field dump tier.
pub fn specific(asset: &Asset, base: &Path) -> Option<Result<Vec<PathBuf>>> {
    match &asset.kind {
        AssetKind::Texture2D | AssetKind::Sprite => Some(texture::extract(asset, base)),
        AssetKind::AudioClip => Some(audio::extract(asset, base)),
        AssetKind::Mesh => Some(mesh::extract(asset, base)),
        AssetKind::Material => Some(material::extract(asset, base)),
        AssetKind::AnimationClip => Some(animation::extract(asset, base)),
        AssetKind::TextAsset => Some(text::extract_text_asset(asset, base)),
        AssetKind::MonoScript => Some(text::extract_mono_script(asset, base)),
        AssetKind::Shader => Some(text::extract_shader(asset, base)),
        AssetKind::Font => Some(text::extract_font(asset, base)),
        _ => None,
    }
}

/// Append an extension to a base path without touching dots already in
/// the resolved name
pub(crate) fn with_ext(base: &Path, ext: &str) -> PathBuf {
    let mut os = base.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

/// Path of the `_info.json` sidecar next to a primary artifact
pub(crate) fn sidecar_path(base: &Path) -> PathBuf {
    let mut os = base.as_os_str().to_owned();
    os.push("_info.json");
    PathBuf::from(os)
}

/// Write the sidecar metadata record and return its path
pub(crate) fn write_sidecar(base: &Path, doc: &serde_json::Value) -> Result<PathBuf> {
    let path = sidecar_path(base);
    let text = serde_json::to_vec_pretty(doc)
        .map_err(|e| ExtractError::decode(format!("sidecar serialization: {}", e)))?;
    std::fs::write(&path, text)?;
    Ok(path)
}

/// Required integer field, as u32
pub(crate) fn u32_field(fields: &FieldTree, field: &str, kind: &AssetKind) -> Result<u32> {
    let value = fields
        .get(field)
        .and_then(FieldValue::as_i64)
        .ok_or_else(|| ExtractError::missing_field(field, kind.name()))?;
    u32::try_from(value)
        .map_err(|_| ExtractError::invalid_data(format!("{} out of range: {}", field, value)))
}

/// Required byte-buffer field
pub(crate) fn bytes_field<'a>(
    fields: &'a FieldTree,
    field: &str,
    kind: &AssetKind,
) -> Result<&'a [u8]> {
    fields
        .get(field)
        .and_then(FieldValue::as_bytes)
        .ok_or_else(|| ExtractError::missing_field(field, kind.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_ext_keeps_dots_in_name() {
        let base = Path::new("/out/TextAsset/config.v2");
        assert_eq!(
            with_ext(base, "json"),
            PathBuf::from("/out/TextAsset/config.v2.json")
        );
        assert_eq!(
            sidecar_path(base),
            PathBuf::from("/out/TextAsset/config.v2_info.json")
        );
    }

    #[test]
    fn test_no_specific_extractor_for_scene_objects() {
        let base = Path::new("/out/GameObject/x");
        assert!(specific(&Asset::new(1, AssetKind::GameObject), base).is_none());
        assert!(specific(&Asset::new(2, AssetKind::MonoBehaviour), base).is_none());
        assert!(
            specific(
                &Asset::new(3, AssetKind::Other("ParticleSystem".into())),
                base
            )
            .is_none()
        );
    }
}
