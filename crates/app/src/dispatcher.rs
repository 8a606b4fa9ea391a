//! Command dispatcher — UI intents to hub service calls.
//!
//! `set_level` is throttled with trailing-edge coalescing: the first call for
//! an entity arms a window, later calls overwrite the pending value and the
//! latest one is sent when the window closes. Requests for one entity go
//! through a per-entity lane, so at most one is in flight at a time.
//! `commit_level` values queue behind that lane in a single slot: a newer
//! commit replaces one that has not been sent yet.
//!
//! Everything is fire-and-forget: failures are logged and dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use ipadha_domain::id::EntityId;
use ipadha_domain::level::{Brightness, Percentage};
use ipadha_domain::service::ServiceCall;
use tokio::task::AbortHandle;

use crate::ports::HubClient;

/// Default throttle window.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(50);

#[derive(Default)]
struct Slot {
    pending: Option<ServiceCall>,
    /// Armed window: its generation and the task waiting for it.
    timer: Option<(u64, AbortHandle)>,
    /// Final value waiting for the lane. `Some` while its sender is queued.
    committed: Option<ServiceCall>,
    lane: Arc<tokio::sync::Mutex<()>>,
}

impl Slot {
    fn disarm(&mut self) {
        if let Some((_, timer)) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Inner<H> {
    hub: H,
    throttle: Duration,
    generation: AtomicU64,
    slots: Mutex<HashMap<EntityId, Slot>>,
}

/// Clonable handle; clones share the same throttle state.
pub struct CommandDispatcher<H> {
    inner: Arc<Inner<H>>,
}

impl<H> Clone for CommandDispatcher<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: HubClient> CommandDispatcher<H> {
    #[must_use]
    pub fn new(hub: H, throttle: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                hub,
                throttle,
                generation: AtomicU64::new(0),
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn throttle(&self) -> Duration {
        self.inner.throttle
    }

    /// Toggle the entity right away (`{domain}.toggle`).
    pub fn toggle(&self, entity_id: &EntityId) {
        let lane = self.lane(entity_id);
        self.spawn_send(lane, ServiceCall::toggle(entity_id.clone()));
    }

    /// Throttled brightness update.
    pub fn set_level(&self, entity_id: &EntityId, level: Percentage) {
        let call = ServiceCall::set_brightness(entity_id.clone(), Brightness::from_percentage(level));
        let generation = self.next_generation();

        let mut slots = self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(entity_id.clone()).or_default();
        slot.pending = Some(call);
        if slot.committed.take().is_some() {
            tracing::debug!(%entity_id, "queued commit superseded by new level");
        }
        if slot.timer.is_some() {
            return;
        }

        let dispatcher = self.clone();
        let entity_id = entity_id.clone();
        let lane = Arc::clone(&slot.lane);
        let task = tokio::spawn(async move {
            tokio::time::sleep(dispatcher.inner.throttle).await;
            let _guard = lane.lock().await;
            let Some(call) = dispatcher.take_pending(&entity_id, generation) else {
                return;
            };
            dispatcher.send(&call).await;
        });
        slot.timer = Some((generation, task.abort_handle()));
    }

    /// Unthrottled final value: replaces any pending value and is sent as
    /// soon as the in-flight request for the entity completes. Only the
    /// latest of several queued commits is sent.
    pub fn commit_level(&self, entity_id: &EntityId, level: Percentage) {
        let call = ServiceCall::set_brightness(entity_id.clone(), Brightness::from_percentage(level));
        let lane = {
            let mut slots = self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = slots.entry(entity_id.clone()).or_default();
            slot.pending = None;
            slot.disarm();
            if slot.committed.replace(call).is_some() {
                tracing::debug!(%entity_id, "queued commit superseded");
                return;
            }
            Arc::clone(&slot.lane)
        };

        let dispatcher = self.clone();
        let entity_id = entity_id.clone();
        tokio::spawn(async move {
            let _guard = lane.lock().await;
            let Some(call) = dispatcher.take_committed(&entity_id) else {
                return;
            };
            dispatcher.send(&call).await;
        });
    }

    /// Drop the pending throttled value, if any. An in-flight request is
    /// left alone.
    pub fn cancel_pending(&self, entity_id: &EntityId) {
        let mut slots = self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get_mut(entity_id) {
            if slot.pending.take().is_some() {
                tracing::debug!(%entity_id, "pending command discarded");
            }
            slot.disarm();
        }
    }

    /// Whether a throttled value is waiting for its window.
    #[must_use]
    pub fn has_pending(&self, entity_id: &EntityId) -> bool {
        let slots = self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(entity_id).is_some_and(|slot| slot.pending.is_some())
    }

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lane(&self, entity_id: &EntityId) -> Arc<tokio::sync::Mutex<()>> {
        let mut slots = self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slots.entry(entity_id.clone()).or_default().lane)
    }

    /// Claim the pending call if the window `generation` is still armed.
    fn take_pending(&self, entity_id: &EntityId, generation: u64) -> Option<ServiceCall> {
        let mut slots = self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.get_mut(entity_id)?;
        match slot.timer {
            Some((armed, _)) if armed == generation => {
                slot.timer = None;
                slot.pending.take()
            }
            _ => None,
        }
    }

    fn take_committed(&self, entity_id: &EntityId) -> Option<ServiceCall> {
        let mut slots = self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get_mut(entity_id)?.committed.take()
    }

    fn spawn_send(&self, lane: Arc<tokio::sync::Mutex<()>>, call: ServiceCall) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let _guard = lane.lock().await;
            dispatcher.send(&call).await;
        });
    }

    async fn send(&self, call: &ServiceCall) {
        tracing::debug!(entity_id = %call.entity_id, service = %call.service, "sending service call");
        if let Err(err) = self.inner.hub.call_service(call).await {
            tracing::warn!(
                entity_id = %call.entity_id,
                domain = %call.domain,
                service = %call.service,
                %err,
                "service call failed, dropping command"
            );
        }
    }
}
