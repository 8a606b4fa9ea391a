//! Wire messages of the hub WebSocket API.

use ipadha_domain::entity::Entity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type carrying entity state changes.
pub const STATE_CHANGED: &str = "state_changed";

/// Id of the single subscription this client opens.
pub const SUBSCRIPTION_ID: u64 = 1;

/// Messages sent by the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage<'a> {
    Auth { access_token: &'a str },
    SubscribeEvents { id: u64, event_type: &'a str },
}

impl ClientMessage<'_> {
    /// The `state_changed` subscription request.
    #[must_use]
    pub fn subscribe_state_changed() -> Self {
        ClientMessage::SubscribeEvents {
            id: SUBSCRIPTION_ID,
            event_type: STATE_CHANGED,
        }
    }
}

/// Messages received from the hub. Unknown types decode as
/// [`ServerMessage::Other`].
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    AuthRequired {
        #[serde(default)]
        ha_version: Option<String>,
    },
    AuthOk {
        #[serde(default)]
        ha_version: Option<String>,
    },
    AuthInvalid {
        #[serde(default)]
        message: Option<String>,
    },
    Result {
        id: u64,
        success: bool,
    },
    Event {
        id: u64,
        event: HubEvent,
    },
    #[serde(other)]
    Other,
}

/// Payload of an `event` message.
#[derive(Debug, Deserialize)]
pub struct HubEvent {
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct StateChangedData {
    #[serde(default)]
    new_state: Option<Entity>,
}

impl HubEvent {
    /// The new entity state of a `state_changed` event.
    ///
    /// Returns `Ok(None)` for other event types and for removals
    /// (`new_state: null`).
    ///
    /// # Errors
    ///
    /// Returns the decoding error when the payload is not a state change.
    pub fn into_new_state(self) -> Result<Option<Entity>, serde_json::Error> {
        if self.event_type != STATE_CHANGED {
            return Ok(None);
        }
        let data: StateChangedData = serde_json::from_value(self.data)?;
        Ok(data.new_state)
    }
}
