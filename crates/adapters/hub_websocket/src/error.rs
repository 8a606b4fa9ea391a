//! Hub WebSocket adapter error types.

use ipadha_domain::error::IpadhaError;
use tokio_tungstenite::tungstenite;

/// Errors specific to the WebSocket adapter.
#[derive(Debug, thiserror::Error)]
pub enum WebSocketError {
    /// The configured hub URL does not parse.
    #[error("invalid hub url")]
    InvalidUrl(#[from] url::ParseError),

    /// The hub URL is not `http(s)` or `ws(s)`.
    #[error("hub url must use http, https, ws or wss, got {0:?}")]
    UnsupportedScheme(String),

    /// Connecting or talking to the socket failed.
    #[error("websocket connection error")]
    Connection(#[source] Box<tungstenite::Error>),

    /// An outgoing message could not be encoded.
    #[error("failed to encode websocket message")]
    Encode(#[from] serde_json::Error),

    /// The hub answered `auth_invalid`.
    #[error("hub rejected the access token")]
    AuthInvalid(Option<String>),

    /// The hub refused the event subscription.
    #[error("hub refused the state_changed subscription")]
    SubscriptionRejected,
}

impl From<tungstenite::Error> for WebSocketError {
    fn from(err: tungstenite::Error) -> Self {
        Self::Connection(Box::new(err))
    }
}

impl WebSocketError {
    /// Convert into an [`IpadhaError`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> IpadhaError {
        match self {
            Self::AuthInvalid(_) => IpadhaError::Unauthorized,
            other => IpadhaError::Transport(Box::new(other)),
        }
    }
}

impl From<WebSocketError> for IpadhaError {
    fn from(err: WebSocketError) -> Self {
        err.into_domain()
    }
}
