//! Texture and sprite extraction
//!
//! Decodes the uncompressed pixel formats Unity stores directly
//! (RGBA32, BGRA32, ARGB32, RGB24, Alpha8) into an RGBA image and
//! writes a PNG plus the `_info.json` sidecar. Block-compressed
//! formats are not decoded here; they fail the tier and fall back to
//! the field dump.

use super::{bytes_field, u32_field, with_ext, write_sidecar};
use bundlerip_core::{Asset, AssetKind, ExtractError, FieldValue, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Pixel formats decodable without a block decompressor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelFormat {
    Alpha8,
    Rgb24,
    Rgba32,
    Argb32,
    Bgra32,
}

impl PixelFormat {
    /// Unity TextureFormat ids
    fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::Alpha8),
            3 => Some(Self::Rgb24),
            4 => Some(Self::Rgba32),
            5 => Some(Self::Argb32),
            14 => Some(Self::Bgra32),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Alpha8 => "Alpha8",
            Self::Rgb24 => "RGB24",
            Self::Rgba32 => "RGBA32",
            Self::Argb32 => "ARGB32",
            Self::Bgra32 => "BGRA32",
        }
    }

    fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Alpha8 => 1,
            Self::Rgb24 => 3,
            _ => 4,
        }
    }
}

pub fn extract(asset: &Asset, base: &Path) -> Result<Vec<PathBuf>> {
    let fields = asset.read_fields()?;
    let width = u32_field(fields, "m_Width", &asset.kind)?;
    let height = u32_field(fields, "m_Height", &asset.kind)?;
    let format_id = fields
        .get("m_TextureFormat")
        .and_then(FieldValue::as_i64)
        .ok_or_else(|| ExtractError::missing_field("m_TextureFormat", asset.kind.name()))?;
    let data = bytes_field(fields, "image data", &asset.kind)?;

    let format = PixelFormat::from_id(format_id).ok_or_else(|| {
        ExtractError::decode(format!("unsupported texture format {}", format_id))
    })?;
    let image = decode(format, data, width, height)?;

    let png = with_ext(base, "png");
    image
        .save(&png)
        .map_err(|e| ExtractError::decode(format!("PNG encode: {}", e)))?;

    let mut info = json!({
        "width": width,
        "height": height,
        "format": format.name(),
    });
    if asset.kind == AssetKind::Sprite {
        if let Some(rect) = fields.get("m_Rect").and_then(FieldValue::as_object) {
            info["sprite_rect"] = json!({
                "x": rect.get("x").and_then(FieldValue::as_f64).unwrap_or(0.0),
                "y": rect.get("y").and_then(FieldValue::as_f64).unwrap_or(0.0),
                "width": rect.get("width").and_then(FieldValue::as_f64).unwrap_or(0.0),
                "height": rect.get("height").and_then(FieldValue::as_f64).unwrap_or(0.0),
            });
        }
    }
    let sidecar = write_sidecar(base, &info)?;

    Ok(vec![png, sidecar])
}

fn decode(format: PixelFormat, data: &[u8], width: u32, height: u32) -> Result<RgbaImage> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel()))
        .ok_or_else(|| ExtractError::invalid_data("texture dimensions overflow"))?;
    if data.len() < expected {
        return Err(ExtractError::invalid_data(format!(
            "pixel buffer too short: {} bytes, need {} for {}x{} {}",
            data.len(),
            expected,
            width,
            height,
            format.name()
        )));
    }

    let mut image: RgbaImage = ImageBuffer::new(width, height);
    for (i, pixel) in image.pixels_mut().enumerate() {
        let p = i * format.bytes_per_pixel();
        *pixel = match format {
            PixelFormat::Rgba32 => Rgba([data[p], data[p + 1], data[p + 2], data[p + 3]]),
            PixelFormat::Bgra32 => Rgba([data[p + 2], data[p + 1], data[p], data[p + 3]]),
            PixelFormat::Argb32 => Rgba([data[p + 1], data[p + 2], data[p + 3], data[p]]),
            PixelFormat::Rgb24 => Rgba([data[p], data[p + 1], data[p + 2], 255]),
            PixelFormat::Alpha8 => Rgba([255, 255, 255, data[p]]),
        };
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rgba32() {
        let data = vec![10, 20, 30, 40, 50, 60, 70, 80];
        let image = decode(PixelFormat::Rgba32, &data, 2, 1).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [10, 20, 30, 40]);
        assert_eq!(image.get_pixel(1, 0).0, [50, 60, 70, 80]);
    }

    #[test]
    fn test_decode_bgra32_swizzles() {
        let data = vec![1, 2, 3, 4];
        let image = decode(PixelFormat::Bgra32, &data, 1, 1).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [3, 2, 1, 4]);
    }

    #[test]
    fn test_decode_rgb24_opaque() {
        let data = vec![9, 8, 7];
        let image = decode(PixelFormat::Rgb24, &data, 1, 1).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [9, 8, 7, 255]);
    }

    #[test]
    fn test_short_buffer_is_tier_failure() {
        let err = decode(PixelFormat::Rgba32, &[0, 0], 2, 2).unwrap_err();
        assert!(!err.is_session_fatal());
        assert!(format!("{}", err).contains("too short"));
    }

    #[test]
    fn test_oversized_dimensions_are_tier_failure() {
        // 2^31 x 2^31 pixels overflows the byte-count multiply
        let err = decode(PixelFormat::Rgba32, &[], 2_147_483_648, 2_147_483_648).unwrap_err();
        assert!(!err.is_session_fatal());
        assert!(format!("{}", err).contains("overflow"));
    }

    #[test]
    fn test_unknown_format_rejected() {
        // DXT1 needs a block decompressor
        assert!(PixelFormat::from_id(10).is_none());
    }
}
