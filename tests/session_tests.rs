// Integration tests for the session engine: the connection state machine,
// the capture pipeline, the tool contract, and interruption handling.
//
// The live service is replaced by a fake transport fed through the same
// ordered event channel the websocket reader uses.

use anyhow::Result;
use aria_voice::transport::{LiveTransport, ServerEvent, OUTFIT_TOOL};
use aria_voice::{Config, SessionState, VoiceSession, WavSource};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

#[derive(Default)]
struct FakeTransport {
    audio: Mutex<Vec<(String, String)>>,
    texts: Mutex<Vec<String>>,
    acks: Mutex<Vec<(String, bool)>>,
    closed: AtomicBool,
}

#[async_trait::async_trait]
impl LiveTransport for FakeTransport {
    async fn send_audio(&self, mime_type: &str, payload: String) -> Result<()> {
        self.audio
            .lock()
            .unwrap()
            .push((mime_type.to_string(), payload));
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_tool_response(&self, call_id: &str, success: bool) -> Result<()> {
        self.acks
            .lock()
            .unwrap()
            .push((call_id.to_string(), success));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Half a second of 16kHz mono audio on disk, the stand-in microphone.
fn write_test_wav(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("mic.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..8000 {
        writer.write_sample(((i % 200) as i16 - 100) * 50).unwrap();
    }
    writer.finalize().unwrap();
    path
}

async fn start_session() -> (
    Arc<VoiceSession>,
    mpsc::Sender<ServerEvent>,
    Arc<FakeTransport>,
    TempDir,
) {
    let dir = TempDir::new().unwrap();
    let wav = write_test_wav(&dir);
    let source = WavSource::open(&wav, 1600).unwrap();

    let config = Config::default();
    let transport = Arc::new(FakeTransport::default());
    let (event_tx, event_rx) = mpsc::channel(32);

    let session = VoiceSession::start(
        &config,
        Arc::clone(&transport) as Arc<dyn LiveTransport>,
        event_rx,
        Box::new(source),
    )
    .await;

    (session, event_tx, transport, dir)
}

async fn wait_for_state(session: &VoiceSession, expected: SessionState) {
    let mut watch = session.watch_state();
    timeout(Duration::from_secs(2), watch.wait_for(|s| *s == expected))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for state {expected}"))
        .unwrap();
}

/// Half a second of silent 24kHz PCM: long enough that the Speaking state
/// is reliably observable before the source drains.
fn audio_chunk() -> Vec<u8> {
    vec![0u8; 12000 * 2]
}

#[tokio::test]
async fn test_connect_open_speak_drain_walk() {
    let (session, events, transport, _dir) = start_session().await;

    assert_eq!(session.state(), SessionState::Connecting);

    events.send(ServerEvent::Open).await.unwrap();
    wait_for_state(&session, SessionState::Listening).await;

    events
        .send(ServerEvent::Audio { data: audio_chunk() })
        .await
        .unwrap();
    wait_for_state(&session, SessionState::Speaking).await;

    // The 10ms chunk finishes and the active set drains
    wait_for_state(&session, SessionState::Listening).await;
    assert_eq!(session.stats().chunks_played, 1);

    // Capture attached on open: microphone frames reach the transport
    timeout(Duration::from_secs(2), async {
        loop {
            if !transport.audio.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("no captured frames reached the transport");

    let (mime, payload) = transport.audio.lock().unwrap()[0].clone();
    assert_eq!(mime, "audio/pcm;rate=16000");
    assert!(!payload.is_empty());

    session.disconnect().await;
    assert_eq!(session.state(), SessionState::Idle);
    assert!(transport.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_interruption_returns_to_listening() {
    let (session, events, _transport, _dir) = start_session().await;

    events.send(ServerEvent::Open).await.unwrap();
    wait_for_state(&session, SessionState::Listening).await;

    // A full second of speech, then barge-in
    events
        .send(ServerEvent::Audio {
            data: vec![0u8; 24000 * 2],
        })
        .await
        .unwrap();
    wait_for_state(&session, SessionState::Speaking).await;

    events.send(ServerEvent::Interrupted).await.unwrap();
    wait_for_state(&session, SessionState::Listening).await;

    // Interruption while already listening is a no-op on state
    events.send(ServerEvent::Interrupted).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.state(), SessionState::Listening);

    session.disconnect().await;
}

#[tokio::test]
async fn test_malformed_chunk_is_dropped() {
    let (session, events, _transport, _dir) = start_session().await;

    events.send(ServerEvent::Open).await.unwrap();
    wait_for_state(&session, SessionState::Listening).await;

    events
        .send(ServerEvent::Audio {
            data: vec![1, 2, 3],
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Still listening, nothing scheduled, session alive
    assert_eq!(session.state(), SessionState::Listening);
    assert_eq!(session.stats().chunks_played, 0);

    // A well-formed chunk afterwards still plays
    events
        .send(ServerEvent::Audio { data: audio_chunk() })
        .await
        .unwrap();
    wait_for_state(&session, SessionState::Speaking).await;

    session.disconnect().await;
}

#[tokio::test]
async fn test_outfit_tool_replaces_state_and_acks_once() {
    let (session, events, transport, _dir) = start_session().await;

    events.send(ServerEvent::Open).await.unwrap();
    wait_for_state(&session, SessionState::Listening).await;

    events
        .send(ServerEvent::ToolCall {
            id: "call-1".to_string(),
            name: OUTFIT_TOOL.to_string(),
            args: json!({
                "top": "linen shirt",
                "bottom": "chinos",
                "shoes": "loafers",
                "accessories": ["watch", "belt"],
                "colors": ["navy", "cream"],
                "style": "smart casual"
            }),
        })
        .await
        .unwrap();

    let mut outfits = session.watch_outfit();
    timeout(Duration::from_secs(2), outfits.wait_for(|o| o.is_some()))
        .await
        .unwrap()
        .unwrap();

    let outfit = session.outfit().unwrap();
    assert_eq!(outfit.top, "linen shirt");
    assert_eq!(outfit.accessories, vec!["watch", "belt"]);
    assert_eq!(outfit.style, "smart casual");

    // A second suggestion replaces the first wholesale
    events
        .send(ServerEvent::ToolCall {
            id: "call-2".to_string(),
            name: OUTFIT_TOOL.to_string(),
            args: json!({ "style": "minimal" }),
        })
        .await
        .unwrap();

    timeout(
        Duration::from_secs(2),
        outfits.wait_for(|o| o.as_ref().is_some_and(|o| o.style == "minimal")),
    )
    .await
    .unwrap()
    .unwrap();

    // Missing fields render empty, they are not an error
    let outfit = session.outfit().unwrap();
    assert_eq!(outfit.top, "");
    assert!(outfit.accessories.is_empty());

    // Exactly one acknowledgement per invocation, echoing the call id
    let acks = transport.acks.lock().unwrap().clone();
    assert_eq!(
        acks,
        vec![
            ("call-1".to_string(), true),
            ("call-2".to_string(), true)
        ]
    );

    session.dismiss_outfit();
    assert!(session.outfit().is_none());

    session.disconnect().await;
}

#[tokio::test]
async fn test_transcript_accumulates_and_resets_on_text() {
    let (session, events, transport, _dir) = start_session().await;

    events.send(ServerEvent::Open).await.unwrap();
    wait_for_state(&session, SessionState::Listening).await;

    events
        .send(ServerEvent::Transcript {
            text: "Here's an outfit ".to_string(),
        })
        .await
        .unwrap();
    events
        .send(ServerEvent::Transcript {
            text: "for a rainy day.".to_string(),
        })
        .await
        .unwrap();

    let mut transcripts = session.watch_transcript();
    timeout(
        Duration::from_secs(2),
        transcripts.wait_for(|t| t == "Here's an outfit for a rainy day."),
    )
    .await
    .unwrap()
    .unwrap();

    // A new user message starts a fresh transcript
    session.send_text("what about shoes?").await.unwrap();
    assert_eq!(session.transcript(), "");
    assert_eq!(
        transport.texts.lock().unwrap().clone(),
        vec!["what about shoes?".to_string()]
    );

    session.disconnect().await;
}

#[tokio::test]
async fn test_transport_error_reaches_error_state() {
    let (session, events, _transport, _dir) = start_session().await;

    events
        .send(ServerEvent::Error {
            message: "connection reset".to_string(),
        })
        .await
        .unwrap();
    wait_for_state(&session, SessionState::Error).await;

    // Error is sticky through disconnect; only a fresh connect leaves it
    session.disconnect().await;
    assert_eq!(session.state(), SessionState::Error);
}

#[tokio::test]
async fn test_clean_close_returns_to_idle() {
    let (session, events, _transport, _dir) = start_session().await;

    events.send(ServerEvent::Open).await.unwrap();
    wait_for_state(&session, SessionState::Listening).await;

    events.send(ServerEvent::Closed).await.unwrap();
    wait_for_state(&session, SessionState::Idle).await;
}

#[tokio::test]
async fn test_connect_without_credential_is_rejected() {
    std::env::remove_var("ARIA_API_KEY");

    let dir = TempDir::new().unwrap();
    let wav = write_test_wav(&dir);
    let source = WavSource::open(&wav, 1600).unwrap();

    let Err(err) = VoiceSession::connect(&Config::default(), Box::new(source)).await else {
        panic!("connect must fail without a credential");
    };
    assert!(matches!(err, aria_voice::SessionError::MissingCredential));
}
