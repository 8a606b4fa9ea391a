//! Control registry — the on-screen controls bound to hub entities.
//!
//! A control is either a slider (percentage over a horizontal track) or a
//! tap target (a tile toggling its entity). Several controls may show the
//! same entity. The registry remembers what each control currently displays
//! so updates can be compared against it.

use std::collections::HashMap;

use ipadha_domain::entity::Entity;
use ipadha_domain::error::ValidationError;
use ipadha_domain::id::EntityId;
use ipadha_domain::level::Percentage;
use serde::Serialize;

/// Opaque handle to a bound control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ControlHandle(u64);

impl ControlHandle {
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ControlHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Slider,
    TapTarget,
}

/// Horizontal extent of a slider track in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    left: f64,
    width: f64,
}

impl TrackGeometry {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTrackWidth`] unless `width` is a
    /// positive finite number.
    pub fn new(left: f64, width: f64) -> Result<Self, ValidationError> {
        if !width.is_finite() || width <= 0.0 || !left.is_finite() {
            return Err(ValidationError::InvalidTrackWidth);
        }
        Ok(Self { left, width })
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.left
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Percentage under an absolute x position, clamped to the track.
    #[must_use]
    pub fn percentage_at(&self, x: f64) -> Percentage {
        Percentage::clamped((x - self.left) / self.width * 100.0)
    }

    /// Percentage change for a horizontal pointer delta.
    #[must_use]
    pub fn delta_percentage(&self, dx: f64) -> f64 {
        dx / self.width * 100.0
    }
}

/// What a control currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayedValue {
    /// Slider position.
    Level { percentage: Percentage },
    /// Tile text: the raw state plus an optional unit.
    Text {
        state: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// Nothing received from the hub yet.
    Unknown,
}

impl DisplayedValue {
    #[must_use]
    pub fn level(percentage: Percentage) -> Self {
        Self::Level { percentage }
    }

    /// Tile rendering of an entity snapshot.
    #[must_use]
    pub fn text_of(entity: &Entity) -> Self {
        Self::Text {
            state: entity.state.to_string(),
            unit: entity.unit_of_measurement().map(str::to_string),
        }
    }

    #[must_use]
    pub fn percentage(&self) -> Option<Percentage> {
        match self {
            Self::Level { percentage } => Some(*percentage),
            _ => None,
        }
    }
}

/// Where a displayed-value change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOrigin {
    /// A hub snapshot or push event.
    Hub,
    /// The user's own gesture.
    Local,
}

/// Notification that a control shows something new.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlUpdate {
    pub control: ControlHandle,
    pub entity_id: EntityId,
    pub value: DisplayedValue,
    pub origin: UpdateOrigin,
}

/// A bound control.
#[derive(Debug, Clone)]
pub struct Control {
    pub entity_id: EntityId,
    pub kind: ControlKind,
    pub track: Option<TrackGeometry>,
    pub displayed: DisplayedValue,
}

/// Handles to controls, keyed by handle.
#[derive(Debug, Default)]
pub struct ControlRegistry {
    next_handle: u64,
    controls: HashMap<ControlHandle, Control>,
}

impl ControlRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control and return its handle. Handles are never reused.
    pub fn bind(
        &mut self,
        entity_id: EntityId,
        kind: ControlKind,
        track: Option<TrackGeometry>,
    ) -> ControlHandle {
        self.next_handle += 1;
        let handle = ControlHandle(self.next_handle);
        self.controls.insert(
            handle,
            Control {
                entity_id,
                kind,
                track,
                displayed: DisplayedValue::Unknown,
            },
        );
        handle
    }

    pub fn unbind(&mut self, handle: ControlHandle) -> Option<Control> {
        self.controls.remove(&handle)
    }

    #[must_use]
    pub fn get(&self, handle: ControlHandle) -> Option<&Control> {
        self.controls.get(&handle)
    }

    pub fn get_mut(&mut self, handle: ControlHandle) -> Option<&mut Control> {
        self.controls.get_mut(&handle)
    }

    /// Handles of every control showing `entity_id`, in binding order.
    #[must_use]
    pub fn bound_to(&self, entity_id: &EntityId) -> Vec<ControlHandle> {
        let mut handles: Vec<_> = self
            .controls
            .iter()
            .filter(|(_, control)| &control.entity_id == entity_id)
            .map(|(handle, _)| *handle)
            .collect();
        handles.sort_unstable();
        handles
    }

    /// Replace the displayed value. Returns `false` when it was unchanged.
    pub fn set_displayed(&mut self, handle: ControlHandle, value: DisplayedValue) -> bool {
        match self.controls.get_mut(&handle) {
            Some(control) if control.displayed != value => {
                control.displayed = value;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}
