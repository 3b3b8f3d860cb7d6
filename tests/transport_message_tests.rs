// Serialization tests for the wire messages exchanged with the live
// service, and the outfit tool payload's lenient decoding.

use aria_voice::audio::pcm;
use aria_voice::transport::{ClientMessage, OutfitSuggestion, ServerMessage};

#[test]
fn test_realtime_input_serialization() {
    let pcm_bytes: Vec<u8> = vec![0, 1, 2, 3];
    let msg = ClientMessage::RealtimeInput {
        mime_type: "audio/pcm;rate=16000".to_string(),
        data: pcm::encode_payload(&pcm_bytes),
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"type\":\"realtime_input\""));
    assert!(json.contains("audio/pcm;rate=16000"));

    let back: ClientMessage = serde_json::from_str(&json).unwrap();
    match back {
        ClientMessage::RealtimeInput { data, .. } => {
            assert_eq!(pcm::decode_payload(&data).unwrap(), pcm_bytes);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn test_tool_response_serialization() {
    let msg = ClientMessage::ToolResponse {
        id: "call-7".to_string(),
        response: aria_voice::transport::ToolResult { success: true },
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"type\":\"tool_response\""));
    assert!(json.contains("\"id\":\"call-7\""));
    assert!(json.contains("\"success\":true"));
}

#[test]
fn test_server_audio_deserialization() {
    let json = r#"{"type":"audio","data":"AAAA"}"#;
    let msg: ServerMessage = serde_json::from_str(json).unwrap();
    match msg {
        ServerMessage::Audio { data } => {
            assert_eq!(pcm::decode_payload(&data).unwrap(), vec![0, 0, 0]);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn test_server_tool_call_deserialization() {
    let json = r#"{
        "type": "tool_call",
        "id": "call-1",
        "name": "show_outfit_suggestion",
        "args": {"top": "jacket", "style": "street"}
    }"#;

    let msg: ServerMessage = serde_json::from_str(json).unwrap();
    match msg {
        ServerMessage::ToolCall { id, name, args } => {
            assert_eq!(id, "call-1");
            assert_eq!(name, aria_voice::OUTFIT_TOOL);
            assert_eq!(args["top"], "jacket");
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn test_server_control_events() {
    let interrupted: ServerMessage =
        serde_json::from_str(r#"{"type":"interrupted"}"#).unwrap();
    assert!(matches!(interrupted, ServerMessage::Interrupted));

    let turn: ServerMessage = serde_json::from_str(r#"{"type":"turn_complete"}"#).unwrap();
    assert!(matches!(turn, ServerMessage::TurnComplete));

    let err: ServerMessage =
        serde_json::from_str(r#"{"type":"error","message":"quota"}"#).unwrap();
    match err {
        ServerMessage::Error { message } => assert_eq!(message, "quota"),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn test_outfit_full_payload() {
    let json = r#"{
        "top": "wool coat",
        "bottom": "jeans",
        "shoes": "boots",
        "accessories": ["scarf"],
        "colors": ["charcoal", "rust"],
        "style": "autumn layers"
    }"#;

    let outfit: OutfitSuggestion = serde_json::from_str(json).unwrap();
    assert_eq!(outfit.top, "wool coat");
    assert_eq!(outfit.colors, vec!["charcoal", "rust"]);
}

#[test]
fn test_outfit_missing_fields_default_to_empty() {
    let outfit: OutfitSuggestion = serde_json::from_str(r#"{"style":"minimal"}"#).unwrap();
    assert_eq!(outfit.style, "minimal");
    assert_eq!(outfit.top, "");
    assert!(outfit.accessories.is_empty());
    assert!(outfit.colors.is_empty());

    let empty: OutfitSuggestion = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, OutfitSuggestion::default());
}
