// Unit tests for the PCM codec: float/i16 conversion, the base64 transport
// encoding, and malformed-chunk rejection.

use aria_voice::audio::pcm;
use aria_voice::SessionError;

#[test]
fn test_payload_roundtrip_arbitrary_lengths() {
    // Includes lengths that are not a multiple of 3 (base64 padding paths)
    for len in [0usize, 1, 2, 3, 4, 5, 7, 100, 1001] {
        let bytes: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
        let encoded = pcm::encode_payload(&bytes);
        let decoded = pcm::decode_payload(&encoded).unwrap();
        assert_eq!(decoded, bytes, "roundtrip failed for length {len}");
    }
}

#[test]
fn test_payload_rejects_invalid_text() {
    assert!(pcm::decode_payload("not base64!!!").is_err());
}

#[test]
fn test_pcm16_roundtrip_within_quantization_step() {
    // Near-full-scale positives drift past one step if the encoder and
    // decoder scale by different constants
    let samples = [
        0.0f32, 0.5, -0.5, 0.25, -0.25, 0.999, -0.999, 0.9999, -0.9999, 1.0, -1.0,
    ];
    let bytes = pcm::float_to_pcm16(&samples);
    let decoded = pcm::decode_pcm16(&bytes, 16000, 1).unwrap();

    assert_eq!(decoded.samples.len(), samples.len());
    for (orig, round) in samples.iter().zip(decoded.samples.iter()) {
        assert!(
            (orig - round).abs() <= 1.0 / 32768.0,
            "sample {orig} decoded as {round}"
        );
    }
}

#[test]
fn test_pcm16_clamps_out_of_range() {
    let bytes = pcm::float_to_pcm16(&[2.0, -2.0, 1.5, -1.5]);
    let decoded = pcm::decode_pcm16(&bytes, 16000, 1).unwrap();

    // Clamped to the extremes, never wrapped to the opposite sign
    assert!(decoded.samples[0] > 0.99);
    assert!(decoded.samples[1] < -0.99);
    assert!(decoded.samples[2] > 0.99);
    assert!(decoded.samples[3] < -0.99);
}

#[test]
fn test_decode_rejects_odd_length() {
    let err = pcm::decode_pcm16(&[1, 2, 3], 24000, 1).unwrap_err();
    assert!(matches!(err, SessionError::MalformedChunk { len: 3 }));
}

#[test]
fn test_decode_empty_chunk() {
    let buffer = pcm::decode_pcm16(&[], 24000, 1).unwrap();
    assert!(buffer.samples.is_empty());
    assert_eq!(buffer.duration_secs(), 0.0);
}

#[test]
fn test_buffer_duration() {
    // 24000 samples at 24kHz mono = exactly one second
    let bytes = vec![0u8; 24000 * 2];
    let buffer = pcm::decode_pcm16(&bytes, 24000, 1).unwrap();
    assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
}

#[test]
fn test_rms_levels() {
    assert_eq!(pcm::rms(&[]), 0.0);
    assert_eq!(pcm::rms(&[0.0, 0.0, 0.0]), 0.0);

    let full = pcm::rms(&[1.0, -1.0, 1.0, -1.0]);
    assert!((full - 1.0).abs() < 1e-6);

    let half = pcm::rms(&[0.5, -0.5]);
    assert!((half - 0.5).abs() < 1e-6);
}
