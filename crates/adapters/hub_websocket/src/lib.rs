//! # ipadha-adapter-hub-websocket
//!
//! Hub WebSocket adapter — implements [`ipadha_app::ports::PushTransport`]
//! over the Home Assistant WebSocket API.
//!
//! ## Handshake
//! 1. server → `auth_required`
//! 2. client → `{"type": "auth", "access_token": …}`
//! 3. server → `auth_ok` (or `auth_invalid`)
//! 4. client → `{"id": 1, "type": "subscribe_events", "event_type": "state_changed"}`
//! 5. server → `result`, then one `event` per state change
//!
//! The `new_state` of every `state_changed` event is forwarded to the
//! engine.

mod error;
pub mod protocol;
mod transport;

pub use error::WebSocketError;
pub use transport::{WebSocketPushTransport, websocket_url};
