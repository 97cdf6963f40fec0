//! Audio clip extraction
//!
//! Audio data already wrapped in an Ogg container is written out
//! verbatim as `.ogg`. Uncompressed PCM is wrapped into a WAV file.
//! Anything else (Vorbis without container, ADPCM, platform codecs)
//! fails the tier; the field dump preserves the clip's metadata.

use super::{bytes_field, with_ext, write_sidecar};
use bundlerip_core::{Asset, ExtractError, FieldValue, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Unity AudioCompressionFormat: 0 = PCM
const COMPRESSION_PCM: i64 = 0;

pub fn extract(asset: &Asset, base: &Path) -> Result<Vec<PathBuf>> {
    let fields = asset.read_fields()?;
    let data = bytes_field(fields, "m_AudioData", &asset.kind)?;
    if data.is_empty() {
        return Err(ExtractError::invalid_data("empty audio data buffer"));
    }

    let frequency = fields.get("m_Frequency").and_then(FieldValue::as_i64);
    let channels = fields.get("m_Channels").and_then(FieldValue::as_i64);
    let compression = fields
        .get("m_CompressionFormat")
        .and_then(FieldValue::as_i64);
    let length = fields.get("m_Length").and_then(FieldValue::as_f64);

    let (primary, format_name) = if data.starts_with(b"OggS") {
        let path = with_ext(base, "ogg");
        std::fs::write(&path, data)?;
        (path, "Vorbis/Ogg")
    } else if compression.unwrap_or(COMPRESSION_PCM) == COMPRESSION_PCM {
        let path = with_ext(base, "wav");
        write_wav(&path, data, fields)?;
        (path, "PCM")
    } else {
        return Err(ExtractError::decode(format!(
            "compression format {} has no container to pass through",
            compression.unwrap_or(-1)
        )));
    };

    let sidecar = write_sidecar(
        base,
        &json!({
            "frequency": frequency,
            "channels": channels,
            "format": format_name,
            "length": length,
        }),
    )?;

    Ok(vec![primary, sidecar])
}

fn write_wav(path: &Path, data: &[u8], fields: &bundlerip_core::FieldTree) -> Result<()> {
    let channels = fields
        .get("m_Channels")
        .and_then(FieldValue::as_i64)
        .unwrap_or(1);
    let frequency = fields
        .get("m_Frequency")
        .and_then(FieldValue::as_i64)
        .unwrap_or(44100);
    let bits = fields
        .get("m_BitsPerSample")
        .and_then(FieldValue::as_i64)
        .unwrap_or(16);
    if bits != 16 {
        return Err(ExtractError::decode(format!(
            "unsupported PCM bit depth: {}",
            bits
        )));
    }
    let channels = u16::try_from(channels)
        .map_err(|_| ExtractError::invalid_data(format!("channel count out of range: {}", channels)))?;
    let frequency = u32::try_from(frequency)
        .map_err(|_| ExtractError::invalid_data(format!("frequency out of range: {}", frequency)))?;
    if channels == 0 || frequency == 0 {
        return Err(ExtractError::invalid_data("zero channels or sample rate"));
    }

    let spec = hound::WavSpec {
        channels,
        sample_rate: frequency,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| ExtractError::decode(format!("WAV create: {}", e)))?;
    for pair in data.chunks_exact(2) {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        writer
            .write_sample(sample)
            .map_err(|e| ExtractError::decode(format!("WAV write: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| ExtractError::decode(format!("WAV finalize: {}", e)))?;
    Ok(())
}
