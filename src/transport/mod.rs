//! Live-session transport: the channel to the hosted conversational model.
//!
//! The wire protocol belongs to the remote service; this module only frames
//! outbound messages and turns inbound ones into provider-agnostic
//! [`ServerEvent`]s delivered serially over one channel, preserving arrival
//! order.

pub mod messages;
pub mod ws;

pub use messages::{ClientMessage, OutfitSuggestion, ServerMessage, ToolResult, OUTFIT_TOOL};
pub use ws::WsTransport;

use anyhow::Result;

/// Event produced by any live session, independent of provider.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// Session setup completed; ready to stream.
    Open,
    /// One chunk of response speech (raw PCM16 bytes, already
    /// base64-decoded).
    Audio { data: Vec<u8> },
    /// Transcript fragment of the model's speech.
    Transcript { text: String },
    /// Model-initiated tool invocation.
    ToolCall {
        id: String,
        name: String,
        args: serde_json::Value,
    },
    /// The model cut off its own speech (user barge-in).
    Interrupted,
    /// The model finished a response turn.
    TurnComplete,
    /// Transport or protocol failure.
    Error { message: String },
    /// The transport closed cleanly.
    Closed,
}

/// Outbound half of the live session.
#[async_trait::async_trait]
pub trait LiveTransport: Send + Sync {
    /// Send one captured media frame (base64 PCM payload plus mime type).
    async fn send_audio(&self, mime_type: &str, payload: String) -> Result<()>;

    /// Send a user-typed text message.
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Acknowledge a tool invocation, echoing its call id.
    async fn send_tool_response(&self, call_id: &str, success: bool) -> Result<()>;

    /// Close the session.
    async fn close(&self) -> Result<()>;
}
