use super::messages::{ClientMessage, ServerMessage, ToolResult};
use super::{LiveTransport, ServerEvent};
use crate::audio::pcm;
use crate::config::LiveConfig;
use anyhow::{Context, Result};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Websocket adapter to the hosted live-session service.
///
/// Shuttles JSON frames both ways; a reader task turns inbound frames into
/// [`ServerEvent`]s on a single ordered channel. Protocol semantics stay
/// with the remote service.
pub struct WsTransport {
    sink: Mutex<WsSink>,
}

impl WsTransport {
    /// Open the websocket, send session setup, and start the reader task.
    ///
    /// The credential rides as a query parameter; callers must have
    /// validated its presence already.
    pub async fn connect(
        live: &LiveConfig,
        api_key: &str,
    ) -> Result<(Self, mpsc::Receiver<ServerEvent>)> {
        let url = format!("{}?key={}", live.url, api_key);
        info!("connecting to live session at {}", live.url);

        let (stream, _) = connect_async(&url)
            .await
            .context("Failed to connect to live session")?;

        let (mut sink, source) = stream.split();

        let setup = serde_json::to_string(&ClientMessage::Setup {
            model: live.model.clone(),
        })?;
        sink.send(Message::Text(setup))
            .await
            .context("Failed to send session setup")?;

        let (event_tx, event_rx) = mpsc::channel(64);
        tokio::spawn(read_events(source, event_tx));

        Ok((
            Self {
                sink: Mutex::new(sink),
            },
            event_rx,
        ))
    }

    async fn send(&self, message: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(message)?;
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(json))
            .await
            .context("Failed to send message to live session")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LiveTransport for WsTransport {
    async fn send_audio(&self, mime_type: &str, payload: String) -> Result<()> {
        self.send(&ClientMessage::RealtimeInput {
            mime_type: mime_type.to_string(),
            data: payload,
        })
        .await
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.send(&ClientMessage::Text {
            text: text.to_string(),
        })
        .await
    }

    async fn send_tool_response(&self, call_id: &str, success: bool) -> Result<()> {
        self.send(&ClientMessage::ToolResponse {
            id: call_id.to_string(),
            response: ToolResult { success },
        })
        .await
    }

    async fn close(&self) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Close(None)).await.ok();
        Ok(())
    }
}

/// Drain the socket into the event channel, in arrival order.
async fn read_events(
    mut source: futures::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    event_tx: mpsc::Sender<ServerEvent>,
) {
    while let Some(frame) = source.next().await {
        let event = match frame {
            Ok(Message::Text(json)) => match serde_json::from_str::<ServerMessage>(&json) {
                Ok(message) => translate(message),
                Err(e) => {
                    warn!("unparseable server message, dropping: {e}");
                    continue;
                }
            },
            Ok(Message::Close(_)) => Some(ServerEvent::Closed),
            Ok(_) => continue, // ping/pong/binary keepalive frames
            Err(e) => Some(ServerEvent::Error {
                message: e.to_string(),
            }),
        };

        let Some(event) = event else { continue };
        let last = matches!(event, ServerEvent::Closed | ServerEvent::Error { .. });

        if event_tx.send(event).await.is_err() {
            break; // session torn down
        }
        if last {
            break;
        }
    }

    info!("live session reader finished");
}

fn translate(message: ServerMessage) -> Option<ServerEvent> {
    match message {
        ServerMessage::SetupComplete => Some(ServerEvent::Open),
        ServerMessage::Audio { data } => match pcm::decode_payload(&data) {
            Ok(bytes) => Some(ServerEvent::Audio { data: bytes }),
            Err(e) => {
                warn!("undecodable audio payload, dropping: {e}");
                None
            }
        },
        ServerMessage::Transcript { text } => Some(ServerEvent::Transcript { text }),
        ServerMessage::ToolCall { id, name, args } => {
            Some(ServerEvent::ToolCall { id, name, args })
        }
        ServerMessage::Interrupted => Some(ServerEvent::Interrupted),
        ServerMessage::TurnComplete => Some(ServerEvent::TurnComplete),
        ServerMessage::Error { message } => Some(ServerEvent::Error { message }),
    }
}
