use crate::error::SessionError;
use base64::Engine;

/// A decoded chunk of playable audio: mono/interleaved f32 samples tagged
/// with the rate and channel count they were produced at.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// RMS level of the buffer, 0..1. Drives the amplitude observable.
    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }
}

/// RMS level of a float sample slice, clamped to 0..1.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt().min(1.0)
}

/// Convert float samples in [-1, 1] to 16-bit little-endian PCM bytes.
///
/// Out-of-range input is clamped, never wrapped. Scaling by 32768 mirrors
/// the decoder's normalization exactly, keeping every sample within one
/// quantization step across a round trip; saturation at i16::MAX keeps
/// +1.0 representable.
pub fn float_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * 32768.0).clamp(-32768.0, 32767.0) as i16;
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Reinterpret little-endian 16-bit PCM bytes as a playable float buffer,
/// normalizing each sample by 1/32768.
///
/// An odd byte length means a truncated or corrupt chunk; the caller is
/// expected to drop it and keep the session alive.
pub fn decode_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<AudioBuffer, SessionError> {
    if bytes.len() % 2 != 0 {
        return Err(SessionError::MalformedChunk { len: bytes.len() });
    }

    let samples: Vec<f32> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    Ok(AudioBuffer {
        samples,
        sample_rate,
        channels,
    })
}

/// Base64-encode raw PCM bytes for the text-safe transport boundary.
pub fn encode_payload(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode a base64 transport payload back to raw bytes.
pub fn decode_payload(text: &str) -> Result<Vec<u8>, SessionError> {
    base64::engine::general_purpose::STANDARD
        .decode(text)
        .map_err(|e| SessionError::Transport(format!("invalid base64 payload: {e}")))
}
