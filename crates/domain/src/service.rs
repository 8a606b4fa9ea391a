//! Service — a command sent to the hub.
//!
//! Examples: `light.turn_on`, `switch.toggle`. The domain of the call is the
//! domain of the targeted entity.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::entity::ATTR_BRIGHTNESS;
use crate::id::EntityId;
use crate::level::Brightness;

pub const SERVICE_TOGGLE: &str = "toggle";
pub const SERVICE_TURN_ON: &str = "turn_on";

/// A single hub service call: `POST /api/services/{domain}/{service}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub entity_id: EntityId,
    /// Service-specific fields sent next to `entity_id`.
    pub data: Map<String, Value>,
}

impl ServiceCall {
    /// Call `service` on `entity_id`, in the entity's own domain.
    #[must_use]
    pub fn new(entity_id: EntityId, service: impl Into<String>) -> Self {
        Self {
            domain: entity_id.domain().to_string(),
            service: service.into(),
            entity_id,
            data: Map::new(),
        }
    }

    /// `{domain}.toggle`.
    #[must_use]
    pub fn toggle(entity_id: EntityId) -> Self {
        Self::new(entity_id, SERVICE_TOGGLE)
    }

    /// `{domain}.turn_on` with a `brightness` on the `0..=255` scale.
    #[must_use]
    pub fn set_brightness(entity_id: EntityId, brightness: Brightness) -> Self {
        Self::new(entity_id, SERVICE_TURN_ON)
            .with_field(ATTR_BRIGHTNESS, Value::from(brightness.value()))
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Brightness carried by the call, if any.
    #[must_use]
    pub fn brightness(&self) -> Option<Brightness> {
        self.data
            .get(ATTR_BRIGHTNESS)
            .and_then(Value::as_u64)
            .and_then(|raw| u8::try_from(raw).ok())
            .map(Brightness::new)
    }

    /// Path below the hub API root, e.g. `services/light/turn_on`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("services/{}/{}", self.domain, self.service)
    }

    /// JSON body: `{"entity_id": …, <data>}`.
    #[must_use]
    pub fn body(&self) -> ServiceCallBody<'_> {
        ServiceCallBody {
            entity_id: &self.entity_id,
            data: &self.data,
        }
    }
}

/// Serialisable request body of a [`ServiceCall`].
#[derive(Debug, Serialize)]
pub struct ServiceCallBody<'a> {
    entity_id: &'a EntityId,
    #[serde(flatten)]
    data: &'a Map<String, Value>,
}
