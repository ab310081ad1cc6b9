//! Suggestion Providers
//!
//! A provider turns a [`Snapshot`] into free-form text naming a move. The
//! text is decoded leniently by the caller, so providers never need to
//! validate it.

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::debug;

use super::Snapshot;

/// Why a suggestion could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestError {
    /// No provider is configured.
    #[error("suggestion provider unavailable")]
    Unavailable,

    /// The call exceeded its deadline.
    #[error("suggestion timed out after {0} ms")]
    Timeout(u64),

    /// Could not reach the provider.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Connection dropped mid-call.
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider closed without replying.
    #[error("provider closed the connection without a reply")]
    Closed,

    /// Snapshot could not be encoded.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The call was abandoned before it finished.
    #[error("suggestion call aborted")]
    Aborted,
}

/// External move-suggestion collaborator.
pub trait SuggestionProvider: Send + Sync + 'static {
    /// Ask for a move given the current world.
    fn suggest(&self, snapshot: Snapshot) -> impl Future<Output = Result<String, SuggestError>> + Send;
}

/// Provider that is never available; every call fails immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct Offline;

impl SuggestionProvider for Offline {
    async fn suggest(&self, _snapshot: Snapshot) -> Result<String, SuggestError> {
        Err(SuggestError::Unavailable)
    }
}

/// Sends the snapshot as JSON over a WebSocket and reads one text reply.
///
/// One connection per call.
#[derive(Clone, Debug)]
pub struct WsSuggestionProvider {
    url: String,
}

impl WsSuggestionProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SuggestionProvider for WsSuggestionProvider {
    async fn suggest(&self, snapshot: Snapshot) -> Result<String, SuggestError> {
        let json = snapshot
            .to_json()
            .map_err(|e| SuggestError::Encode(e.to_string()))?;

        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| SuggestError::Connect(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        write
            .send(Message::Text(json))
            .await
            .map_err(|e| SuggestError::Transport(e.to_string()))?;

        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    debug!(reply = %text, "suggestion received");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(text);
                }
                Ok(Message::Close(_)) => return Err(SuggestError::Closed),
                Ok(Message::Ping(data)) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Ok(_) => {}
                Err(e) => return Err(SuggestError::Transport(e.to_string())),
            }
        }

        Err(SuggestError::Closed)
    }
}
