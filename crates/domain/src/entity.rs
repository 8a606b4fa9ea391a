//! Entity — a hub-owned snapshot of a device or sensor.
//!
//! The dashboard never creates entities on its own: they arrive from the
//! hub (`GET /api/states` or a pushed `state_changed` event) in the hub's
//! JSON shape and are cached read-only.

mod attribute_value;
mod state;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use crate::id::EntityId;
use crate::level::{Brightness, Percentage};

/// UTC timestamp as reported by the hub for `last_changed` / `last_updated`.
pub type Timestamp = DateTime<Utc>;

/// Attribute carrying the hub brightness (`0..=255`).
pub const ATTR_BRIGHTNESS: &str = "brightness";
/// Attribute carrying the human-readable name.
pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";
/// Attribute carrying a sensor unit (`°C`, `%`, …).
pub const ATTR_UNIT_OF_MEASUREMENT: &str = "unit_of_measurement";

/// A single entity snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    pub state: EntityState,
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Timestamp>,
}

impl Entity {
    /// Create a snapshot without attributes.
    #[must_use]
    pub fn new(entity_id: EntityId, state: impl Into<EntityState>) -> Self {
        Self {
            entity_id,
            state: state.into(),
            attributes: HashMap::new(),
            last_changed: None,
            last_updated: None,
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Hub brightness, when the entity is dimmable and reports one.
    #[must_use]
    pub fn brightness(&self) -> Option<Brightness> {
        self.get_attribute(ATTR_BRIGHTNESS)
            .and_then(AttributeValue::as_f64)
            .and_then(Brightness::from_attribute)
    }

    /// Slider percentage derived from the brightness attribute.
    #[must_use]
    pub fn brightness_percentage(&self) -> Option<Percentage> {
        self.brightness().map(Percentage::from_brightness)
    }

    /// Friendly name, falling back to the object id.
    #[must_use]
    pub fn friendly_name(&self) -> &str {
        self.get_attribute(ATTR_FRIENDLY_NAME)
            .and_then(AttributeValue::as_str)
            .unwrap_or_else(|| self.entity_id.object_id())
    }

    #[must_use]
    pub fn unit_of_measurement(&self) -> Option<&str> {
        self.get_attribute(ATTR_UNIT_OF_MEASUREMENT)
            .and_then(AttributeValue::as_str)
    }
}
