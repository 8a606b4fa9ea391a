//! [`PushTransport`] implementation over `tokio-tungstenite`.

use std::future::Future;

use futures::{SinkExt, StreamExt};
use ipadha_app::ports::PushTransport;
use ipadha_domain::entity::Entity;
use ipadha_domain::error::IpadhaError;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::error::WebSocketError;
use crate::protocol::{ClientMessage, ServerMessage};

/// `{hub as ws/wss}/api/websocket` for a hub base URL.
///
/// # Errors
///
/// Returns [`WebSocketError::InvalidUrl`] when `hub_url` does not parse and
/// [`WebSocketError::UnsupportedScheme`] for schemes other than
/// `http`, `https`, `ws` and `wss`.
pub fn websocket_url(hub_url: &str) -> Result<Url, WebSocketError> {
    let mut url = Url::parse(hub_url)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(WebSocketError::UnsupportedScheme(other.to_string())),
    };
    if url.set_scheme(scheme).is_err() {
        return Err(WebSocketError::UnsupportedScheme(url.scheme().to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.join("api/websocket")?)
}

/// Push transport subscribing to `state_changed` events.
#[derive(Debug, Clone)]
pub struct WebSocketPushTransport {
    url: Url,
    token: String,
}

impl WebSocketPushTransport {
    /// # Errors
    ///
    /// Returns an error when `hub_url` cannot be turned into a WebSocket URL.
    pub fn new(hub_url: &str, token: impl Into<String>) -> Result<Self, WebSocketError> {
        Ok(Self {
            url: websocket_url(hub_url)?,
            token: token.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn stream(&self, sink: mpsc::Sender<Entity>) -> Result<(), WebSocketError> {
        let (socket, _) = connect_async(self.url.as_str()).await?;
        tracing::debug!(url = %self.url, "websocket connected");
        let (mut writer, mut reader) = socket.split();

        while let Some(frame) = reader.next().await {
            let text = match frame? {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };
            let message = match serde_json::from_str::<ServerMessage>(&text) {
                Ok(message) => message,
                Err(err) => {
                    tracing::warn!(%err, "ignoring malformed hub message");
                    continue;
                }
            };
            match message {
                ServerMessage::AuthRequired { .. } => {
                    let auth = ClientMessage::Auth {
                        access_token: &self.token,
                    };
                    writer.send(Message::Text(serde_json::to_string(&auth)?)).await?;
                }
                ServerMessage::AuthOk { ha_version } => {
                    tracing::info!(ha_version = ?ha_version, "authenticated with hub websocket");
                    let subscribe = ClientMessage::subscribe_state_changed();
                    writer.send(Message::Text(serde_json::to_string(&subscribe)?)).await?;
                }
                ServerMessage::AuthInvalid { message } => {
                    return Err(WebSocketError::AuthInvalid(message));
                }
                ServerMessage::Result { success: false, .. } => {
                    return Err(WebSocketError::SubscriptionRejected);
                }
                ServerMessage::Result { .. } => tracing::debug!("subscribed to state_changed"),
                ServerMessage::Event { event, .. } => match event.into_new_state() {
                    Ok(Some(entity)) => {
                        if sink.send(entity).await.is_err() {
                            tracing::debug!("state receiver gone, closing websocket");
                            let _ = writer.close().await;
                            return Ok(());
                        }
                    }
                    Ok(None) => {}
                    Err(err) => tracing::warn!(%err, "ignoring malformed state_changed event"),
                },
                ServerMessage::Other => {}
            }
        }

        tracing::info!("hub closed the websocket");
        Ok(())
    }
}

impl PushTransport for WebSocketPushTransport {
    fn stream_states(
        &self,
        sink: mpsc::Sender<Entity>,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send {
        async move { self.stream(sink).await.map_err(WebSocketError::into_domain) }
    }
}
