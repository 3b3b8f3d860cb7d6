use serde::{Deserialize, Serialize};

/// Name of the one tool this client exposes to the model.
pub const OUTFIT_TOOL: &str = "show_outfit_suggestion";

/// Message sent to the live-session service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Session setup, sent once right after the socket opens.
    Setup { model: String },
    /// One captured audio frame.
    RealtimeInput {
        mime_type: String,
        /// Base64-encoded PCM bytes
        data: String,
    },
    /// User-typed text message.
    Text { text: String },
    /// Acknowledgement of a tool invocation.
    ToolResponse { id: String, response: ToolResult },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
}

/// Wire message received from the live-session service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    SetupComplete,
    Audio {
        /// Base64-encoded PCM bytes
        data: String,
    },
    Transcript {
        text: String,
    },
    ToolCall {
        id: String,
        name: String,
        args: serde_json::Value,
    },
    Interrupted,
    TurnComplete,
    Error {
        message: String,
    },
}

/// Outfit the model asks the client to display.
///
/// All six fields are required by the tool contract, but the client renders
/// whatever is present: missing fields default to empty rather than
/// rejecting the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutfitSuggestion {
    pub top: String,
    pub bottom: String,
    pub shoes: String,
    pub accessories: Vec<String>,
    pub colors: Vec<String>,
    pub style: String,
}
