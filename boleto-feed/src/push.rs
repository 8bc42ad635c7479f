use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::stomp::Frame;

pub const SUBSCRIPTION_ID: &str = "sub-tickets";
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// The per-user topic the backend publishes booking changes on.
pub fn user_topic(user_id: i64) -> String {
    format!("/topic/user/{}/tickets", user_id)
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Could not connect to ticket topic: {0}")]
    Connect(String),

    #[error("WebSocket transport error: {0}")]
    Transport(String),

    #[error("Broker rejected the session: {0}")]
    Broker(String),
}

/// A live subscription. Dropping the handle (or calling `stop`) aborts the
/// background task and closes the socket, so a user change maps to
/// stop-then-subscribe.
pub struct PushHandle {
    task: tokio::task::JoinHandle<()>,
}

impl PushHandle {
    /// Wraps an already-spawned subscription task.
    pub fn from_task(task: tokio::task::JoinHandle<()>) -> Self {
        Self { task }
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for PushHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Server-originated change notifications for a user's tickets. Message
/// payloads are never interpreted; each delivery just means "something
/// changed, refetch".
#[async_trait]
pub trait TicketPush: Send + Sync {
    async fn subscribe(
        &self,
        user_id: i64,
        notify: mpsc::Sender<()>,
    ) -> Result<PushHandle, PushError>;
}

/// STOMP over WebSocket with automatic reconnection at a fixed delay. The
/// subscription outlives individual connections; it ends when the notify
/// receiver is dropped or the handle is stopped.
pub struct StompPush {
    ws_url: String,
    reconnect_delay: Duration,
}

impl StompPush {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

#[async_trait]
impl TicketPush for StompPush {
    async fn subscribe(
        &self,
        user_id: i64,
        notify: mpsc::Sender<()>,
    ) -> Result<PushHandle, PushError> {
        let url = self.ws_url.clone();
        let delay = self.reconnect_delay;
        let destination = user_topic(user_id);

        let task = tokio::spawn(async move {
            loop {
                if let Err(e) = run_session(&url, &destination, &notify).await {
                    tracing::warn!("Ticket push connection lost: {}", e);
                }
                if notify.is_closed() {
                    return;
                }
                tokio::time::sleep(delay).await;
            }
        });
        Ok(PushHandle { task })
    }
}

fn host_of(url: &str) -> &str {
    url.split("//")
        .nth(1)
        .and_then(|rest| rest.split(['/', ':']).next())
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost")
}

/// One connection lifetime: CONNECT, SUBSCRIBE on CONNECTED, then forward a
/// unit notification per MESSAGE until the socket closes.
async fn run_session(
    url: &str,
    destination: &str,
    notify: &mpsc::Sender<()>,
) -> Result<(), PushError> {
    let (mut ws, _) = connect_async(url)
        .await
        .map_err(|e| PushError::Connect(e.to_string()))?;

    let connect = Frame::connect(host_of(url)).encode();
    ws.send(Message::Binary(connect))
        .await
        .map_err(|e| PushError::Transport(e.to_string()))?;

    while let Some(next) = ws.next().await {
        let message = next.map_err(|e| PushError::Transport(e.to_string()))?;
        let raw = match &message {
            Message::Text(text) => text.as_bytes(),
            Message::Binary(bytes) => bytes.as_slice(),
            Message::Close(_) => return Ok(()),
            _ => continue,
        };

        let frame = match Frame::decode(raw) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue, // heartbeat
            Err(e) => {
                tracing::warn!("Ignoring undecodable frame: {}", e);
                continue;
            }
        };

        match frame.command.as_str() {
            "CONNECTED" => {
                let subscribe = Frame::subscribe(SUBSCRIPTION_ID, destination).encode();
                ws.send(Message::Binary(subscribe))
                    .await
                    .map_err(|e| PushError::Transport(e.to_string()))?;
                tracing::info!(destination, "Subscribed to ticket topic");
            }
            "MESSAGE" => {
                if notify.send(()).await.is_err() {
                    // Receiver gone: the view unmounted, stop pushing.
                    return Ok(());
                }
            }
            "ERROR" => {
                let detail = frame.header("message").unwrap_or("unspecified").to_string();
                return Err(PushError::Broker(detail));
            }
            other => {
                tracing::debug!("Ignoring frame: {}", other);
            }
        }
    }
    Ok(())
}
