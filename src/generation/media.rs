//! Media helpers: WAV container wrapping and `data:` URI encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{GenerationError, GenerationResult};

/// Speech model output format: 24 kHz, mono, 16-bit little-endian PCM.
pub const TTS_SAMPLE_RATE: u32 = 24_000;
pub const TTS_CHANNELS: u16 = 1;
pub const TTS_BITS_PER_SAMPLE: u16 = 16;

const WAV_HEADER_LEN: usize = 44;

/// PCM layout used when wrapping samples in a WAV container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl PcmFormat {
    /// The speech model's output format.
    pub const TTS: Self = Self {
        sample_rate: TTS_SAMPLE_RATE,
        channels: TTS_CHANNELS,
        bits_per_sample: TTS_BITS_PER_SAMPLE,
    };

    fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }
}

/// Wraps headerless PCM in a canonical 44-byte RIFF/WAVE header.
pub fn wav_wrap(pcm: &[u8], format: PcmFormat) -> Vec<u8> {
    let data_len = pcm.len() as u32;
    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&format.byte_rate().to_le_bytes());
    out.extend_from_slice(&format.block_align().to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

/// Encodes bytes as a self-contained `data:<mime>;base64,` reference.
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Parses a base64 `data:` URI.
pub fn parse_data_uri(uri: &str) -> GenerationResult<DataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| GenerationError::decode("not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| GenerationError::decode("data URI has no payload"))?;
    let mime_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| GenerationError::decode("data URI is not base64-encoded"))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| GenerationError::decode(e.to_string()))?;
    Ok(DataUri {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// Decodes a bare base64 payload (as found in provider JSON).
pub fn decode_base64(payload: &str) -> GenerationResult<Vec<u8>> {
    STANDARD
        .decode(payload.trim())
        .map_err(|e| GenerationError::decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_header_layout() {
        let pcm = [0u8, 1, 2, 3, 4, 5];
        let wav = wav_wrap(&pcm, PcmFormat::TTS);

        assert_eq!(wav.len(), 44 + pcm.len());
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 6);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1);
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 24_000);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 48_000);
        assert_eq!(u16::from_le_bytes([wav[32], wav[33]]), 2);
        assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 6);
        assert_eq!(&wav[44..], &pcm);
    }

    #[test]
    fn test_data_uri() {
        let uri = to_data_uri("video/mp4", b"hello");
        assert_eq!(uri, "data:video/mp4;base64,aGVsbG8=");

        let parsed = parse_data_uri(&uri).unwrap();
        assert_eq!(parsed.mime_type, "video/mp4");
        assert_eq!(parsed.bytes, b"hello");
    }

    #[test]
    fn test_parse_rejects_non_base64() {
        assert!(parse_data_uri("https://example.com/a.mp4").is_err());
        assert!(parse_data_uri("data:text/plain,hello").is_err());
        assert!(parse_data_uri("data:video/mp4;base64,@@@").is_err());
    }
}
