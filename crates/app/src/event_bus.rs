//! In-process event bus backed by a tokio broadcast channel.

use ipadha_domain::entity::Entity;
use ipadha_domain::id::EntityId;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::controls::{ControlHandle, ControlUpdate};

/// Something the view should react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A bound control shows a new value.
    ControlUpdated(ControlUpdate),
    /// A hub snapshot reached the cache, bound or not.
    EntityUpdated { entity: Entity },
    /// Swipe navigation switched tabs.
    TabChanged { index: usize, tab: String },
    /// A long press completed.
    LongPress {
        #[serde(skip_serializing_if = "Option::is_none")]
        control: Option<ControlHandle>,
        #[serde(skip_serializing_if = "Option::is_none")]
        entity_id: Option<EntityId>,
    },
}

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
#[derive(Debug)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: EngineEvent) {
        // send only fails without receivers
        let _ = self.sender.send(event);
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
