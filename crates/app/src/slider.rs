//! Slider drag controller — owns the single drag session.
//!
//! While a session is active the dragged control's value comes only from
//! pointer deltas; remote updates for it are dropped by the engine.

use ipadha_domain::id::EntityId;
use ipadha_domain::level::Percentage;

use crate::controls::{ControlHandle, TrackGeometry};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DragError {
    #[error("a drag on {0} is already in progress")]
    AlreadyDragging(ControlHandle),
}

/// The one in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub control: ControlHandle,
    pub entity_id: EntityId,
    /// Pointer x where the drag began.
    pub origin_x: f64,
    /// Displayed value when the drag began; restored on cancel.
    pub start_value: Percentage,
    pub current: Percentage,
    /// Track geometry captured at drag start.
    pub track: TrackGeometry,
}

/// Value produced by a drag step, an end, a cancel or a track jump.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderValue {
    pub control: ControlHandle,
    pub entity_id: EntityId,
    pub value: Percentage,
}

#[derive(Debug, Default)]
pub struct SliderDragController {
    session: Option<DragSession>,
}

impl SliderDragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether `control` is the one being dragged.
    #[must_use]
    pub fn is_dragging(&self, control: ControlHandle) -> bool {
        self.session.as_ref().is_some_and(|s| s.control == control)
    }

    /// Open a session.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::AlreadyDragging`] when a session is active.
    pub fn begin(
        &mut self,
        control: ControlHandle,
        entity_id: EntityId,
        origin_x: f64,
        start_value: Percentage,
        track: TrackGeometry,
    ) -> Result<(), DragError> {
        if let Some(active) = &self.session {
            return Err(DragError::AlreadyDragging(active.control));
        }
        tracing::debug!(%control, %entity_id, start = start_value.value(), "drag started");
        self.session = Some(DragSession {
            control,
            entity_id,
            origin_x,
            start_value,
            current: start_value,
            track,
        });
        Ok(())
    }

    /// Move the pointer to `x`: `clamp(start + dx / width * 100)`.
    pub fn update(&mut self, x: f64) -> Option<SliderValue> {
        let session = self.session.as_mut()?;
        let delta = session.track.delta_percentage(x - session.origin_x);
        session.current = Percentage::clamped(session.start_value.value() + delta);
        Some(SliderValue {
            control: session.control,
            entity_id: session.entity_id.clone(),
            value: session.current,
        })
    }

    /// Apply the release position and close the session.
    pub fn finish(&mut self, x: f64) -> Option<SliderValue> {
        let value = self.update(x)?;
        self.session = None;
        tracing::debug!(control = %value.control, value = value.value.value(), "drag ended");
        Some(value)
    }

    /// Close the session and return the pre-drag value.
    pub fn cancel(&mut self) -> Option<SliderValue> {
        let session = self.session.take()?;
        tracing::debug!(control = %session.control, "drag cancelled");
        Some(SliderValue {
            control: session.control,
            entity_id: session.entity_id,
            value: session.start_value,
        })
    }

    /// Close the session if it belongs to `control`, without producing a value.
    pub fn abandon(&mut self, control: ControlHandle) -> bool {
        if self.is_dragging(control) {
            self.session = None;
            return true;
        }
        false
    }

    /// Track click: jump straight to the position. `None` while dragging.
    #[must_use]
    pub fn jump(&self, track: &TrackGeometry, x: f64) -> Option<Percentage> {
        if self.is_active() {
            return None;
        }
        Some(track.percentage_at(x))
    }
}
