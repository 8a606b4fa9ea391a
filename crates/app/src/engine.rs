//! Interaction engine — the integration surface used by the view.
//!
//! The engine owns the view model (bound controls, the gesture classifier,
//! the drag session, the entity cache) behind a single [`std::sync::Mutex`].
//! Every decision is taken synchronously under that lock; side effects
//! (service calls, callbacks, bus events) run after it is released.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use ipadha_domain::entity::Entity;
use ipadha_domain::error::{IpadhaError, NotFoundError};
use ipadha_domain::id::EntityId;
use ipadha_domain::level::Percentage;
use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

use crate::controls::{
    ControlHandle, ControlKind, ControlRegistry, ControlUpdate, DisplayedValue, TrackGeometry,
    UpdateOrigin,
};
use crate::dispatcher::{CommandDispatcher, DEFAULT_THROTTLE};
use crate::event_bus::{EngineEvent, InProcessEventBus};
use crate::gesture::{Gesture, GestureClassifier, GestureConfig, HitTarget, PointerEvent, TargetRole};
use crate::navigation::TabNavigator;
use crate::ports::{EntityCache, HubClient, PushTransport, StateSink};
use crate::slider::SliderDragController;
use crate::sync::{SyncConfig, Synchronizer};

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub refresh_interval: Duration,
    pub throttle: Duration,
    pub reconnect_interval: Duration,
    pub use_push: bool,
    pub gesture: GestureConfig,
    /// Tabs for swipe navigation, in display order.
    pub tabs: Vec<String>,
    /// Capacity of the engine event channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let sync = SyncConfig::default();
        Self {
            refresh_interval: sync.refresh_interval,
            throttle: DEFAULT_THROTTLE,
            reconnect_interval: sync.reconnect_interval,
            use_push: sync.use_push,
            gesture: GestureConfig::default(),
            tabs: Vec::new(),
            event_capacity: 256,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            refresh_interval: self.refresh_interval,
            reconnect_interval: self.reconnect_interval,
            use_push: self.use_push,
        }
    }
}

type UpdateCallback = Arc<dyn Fn(&ControlUpdate) + Send + Sync>;

struct ViewModel {
    controls: ControlRegistry,
    classifier: GestureClassifier,
    slider: SliderDragController,
    navigator: TabNavigator,
    cache: HashMap<EntityId, Entity>,
    long_press_timer: Option<(Instant, AbortHandle)>,
}

/// Side effect decided under the view lock, run after it.
enum Effect {
    Update(ControlUpdate),
    SetLevel(EntityId, Percentage),
    Commit(EntityId, Percentage),
    Toggle(EntityId),
    CancelPending(EntityId),
    Publish(EngineEvent),
}

struct EngineInner<H, P> {
    view: Mutex<ViewModel>,
    callbacks: Mutex<Vec<(u64, UpdateCallback)>>,
    next_callback: AtomicU64,
    dispatcher: CommandDispatcher<Arc<H>>,
    hub: Arc<H>,
    push: Arc<P>,
    events: Arc<InProcessEventBus>,
    sync: SyncConfig,
}

/// Detaches bindings and subscriptions from the engine that issued them.
trait Detach: Send + Sync {
    fn unbind(&self, handle: ControlHandle);
    fn unsubscribe(&self, id: u64);
}

/// A bound control. Dropping it unbinds the control, ending its drag
/// session and pending command.
pub struct Binding {
    handle: ControlHandle,
    owner: Weak<dyn Detach>,
}

impl Binding {
    #[must_use]
    pub fn handle(&self) -> ControlHandle {
        self.handle
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("handle", &self.handle).finish()
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.unbind(self.handle);
        }
    }
}

/// A registered update callback. Dropping it stops delivery.
pub struct Subscription {
    id: u64,
    owner: Weak<dyn Detach>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.unsubscribe(self.id);
        }
    }
}

/// Clonable handle to the interaction engine.
pub struct Engine<H, P> {
    inner: Arc<EngineInner<H, P>>,
}

impl<H, P> Clone for Engine<H, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: HubClient, P: PushTransport> Engine<H, P> {
    #[must_use]
    pub fn new(hub: H, push: P, config: EngineConfig) -> Self {
        let hub = Arc::new(hub);
        let sync = config.sync_config();
        Self {
            inner: Arc::new(EngineInner {
                view: Mutex::new(ViewModel {
                    controls: ControlRegistry::new(),
                    classifier: GestureClassifier::new(config.gesture),
                    slider: SliderDragController::new(),
                    navigator: TabNavigator::new(config.tabs),
                    cache: HashMap::new(),
                    long_press_timer: None,
                }),
                callbacks: Mutex::new(Vec::new()),
                next_callback: AtomicU64::new(0),
                dispatcher: CommandDispatcher::new(Arc::clone(&hub), config.throttle),
                hub,
                push: Arc::new(push),
                events: Arc::new(InProcessEventBus::new(config.event_capacity)),
                sync,
            }),
        }
    }

    /// Spawn the state synchronizer. Aborting the handle stops syncing.
    #[must_use]
    pub fn start(&self) -> JoinHandle<()> {
        Synchronizer::new(
            Arc::clone(&self.inner.hub),
            Arc::clone(&self.inner.push),
            self.clone(),
            self.inner.sync,
        )
        .start()
    }

    #[must_use]
    pub fn hub(&self) -> &Arc<H> {
        &self.inner.hub
    }

    #[must_use]
    pub fn dispatcher(&self) -> &CommandDispatcher<Arc<H>> {
        &self.inner.dispatcher
    }

    #[must_use]
    pub fn events(&self) -> Arc<InProcessEventBus> {
        Arc::clone(&self.inner.events)
    }

    /// Raw receiver of every engine event.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events.subscribe()
    }

    /// Bind a slider showing the entity's brightness.
    #[must_use]
    pub fn bind_slider(&self, entity_id: EntityId, track: TrackGeometry) -> Binding {
        self.bind(entity_id, ControlKind::Slider, Some(track))
    }

    /// Bind a tile that toggles the entity when tapped.
    #[must_use]
    pub fn bind_tap_target(&self, entity_id: EntityId) -> Binding {
        self.bind(entity_id, ControlKind::TapTarget, None)
    }

    /// Update a slider's track after a layout change. An active drag keeps
    /// the geometry it captured.
    ///
    /// # Errors
    ///
    /// Returns [`IpadhaError::NotFound`] when `handle` is not bound.
    pub fn set_track_geometry(
        &self,
        handle: ControlHandle,
        track: TrackGeometry,
    ) -> Result<(), IpadhaError> {
        let mut view = self.inner.view();
        let control = view.controls.get_mut(handle).ok_or_else(|| NotFoundError {
            entity: "Control",
            id: handle.to_string(),
        })?;
        control.track = Some(track);
        Ok(())
    }

    /// Invoke `callback` for every control display change.
    #[must_use]
    pub fn on_entity_update<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ControlUpdate) + Send + Sync + 'static,
    {
        let id = self.inner.next_callback.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        Subscription {
            id,
            owner: self.detach_handle(),
        }
    }

    /// Feed one pointer event.
    pub fn handle_pointer(&self, event: PointerEvent) {
        let effects = {
            let mut view = self.inner.view();
            let gestures = view.classifier.handle(event);
            let mut effects = Vec::new();
            for gesture in gestures {
                route(&mut view, gesture, &mut effects);
            }
            self.rearm_long_press(&mut view);
            effects
        };
        self.inner.run(effects);
    }

    /// What the control currently shows.
    #[must_use]
    pub fn displayed(&self, handle: ControlHandle) -> Option<DisplayedValue> {
        let view = self.inner.view();
        view.controls.get(handle).map(|c| c.displayed.clone())
    }

    /// Whether the control is being dragged.
    #[must_use]
    pub fn is_dragging(&self, handle: ControlHandle) -> bool {
        self.inner.view().slider.is_dragging(handle)
    }

    /// Cached snapshot of an entity.
    #[must_use]
    pub fn entity(&self, entity_id: &EntityId) -> Option<Entity> {
        self.inner.view().cache.get(entity_id).cloned()
    }

    /// Every cached snapshot, sorted by entity id.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        let mut entities: Vec<_> = self.inner.view().cache.values().cloned().collect();
        entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entities
    }

    /// Toggle an entity outside of any gesture.
    pub fn toggle(&self, entity_id: &EntityId) {
        self.inner.dispatcher.toggle(entity_id);
    }

    fn bind(&self, entity_id: EntityId, kind: ControlKind, track: Option<TrackGeometry>) -> Binding {
        let (handle, effects) = {
            let mut view = self.inner.view();
            let handle = view.controls.bind(entity_id.clone(), kind, track);
            tracing::debug!(%handle, %entity_id, ?kind, "control bound");
            let mut effects = vec![];
            if let Some(value) = view.cache.get(&entity_id).and_then(|e| display_for(kind, e)) {
                view.controls.set_displayed(handle, value.clone());
                effects.push(Effect::Update(ControlUpdate {
                    control: handle,
                    entity_id,
                    value,
                    origin: UpdateOrigin::Hub,
                }));
            }
            (handle, effects)
        };
        self.inner.run(effects);
        Binding {
            handle,
            owner: self.detach_handle(),
        }
    }

    fn detach_handle(&self) -> Weak<dyn Detach> {
        Arc::downgrade(&self.inner) as Weak<dyn Detach>
    }

    /// Keep a timer task aligned with the classifier's long-press deadline.
    fn rearm_long_press(&self, view: &mut ViewModel) {
        let deadline = view.classifier.long_press_deadline();
        let already_armed = matches!(
            (deadline, &view.long_press_timer),
            (Some(deadline), Some((armed, _))) if deadline == *armed
        );
        if already_armed {
            return;
        }
        if let Some((_, timer)) = view.long_press_timer.take() {
            timer.abort();
        }
        let Some(deadline) = deadline else {
            return;
        };
        let weak = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.fire_long_press(deadline);
            }
        });
        view.long_press_timer = Some((deadline, task.abort_handle()));
    }
}

impl<H: HubClient, P: PushTransport> EngineInner<H, P> {
    fn view(&self) -> MutexGuard<'_, ViewModel> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fire_long_press(&self, now: Instant) {
        let effects = {
            let mut view = self.view();
            view.long_press_timer = None;
            let mut effects = Vec::new();
            if let Some(gesture) = view.classifier.poll(now) {
                route(&mut view, gesture, &mut effects);
            }
            effects
        };
        self.run(effects);
    }

    fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Update(update) => self.emit(update),
                Effect::SetLevel(entity_id, level) => self.dispatcher.set_level(&entity_id, level),
                Effect::Commit(entity_id, level) => self.dispatcher.commit_level(&entity_id, level),
                Effect::Toggle(entity_id) => self.dispatcher.toggle(&entity_id),
                Effect::CancelPending(entity_id) => self.dispatcher.cancel_pending(&entity_id),
                Effect::Publish(event) => self.events.publish(event),
            }
        }
    }

    fn emit(&self, update: ControlUpdate) {
        let callbacks: Vec<UpdateCallback> = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(&update);
        }
        self.events.publish(EngineEvent::ControlUpdated(update));
    }
}

impl<H: HubClient, P: PushTransport> Detach for EngineInner<H, P> {
    fn unbind(&self, handle: ControlHandle) {
        let effects = {
            let mut view = self.view();
            let mut effects = Vec::new();
            if let Some(control) = view.controls.unbind(handle) {
                if view.slider.abandon(handle) {
                    effects.push(Effect::CancelPending(control.entity_id.clone()));
                }
                tracing::debug!(%handle, entity_id = %control.entity_id, "control unbound");
            }
            effects
        };
        self.run(effects);
    }

    fn unsubscribe(&self, id: u64) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(registered, _)| *registered != id);
    }
}

impl<H: HubClient, P: PushTransport> EntityCache for Engine<H, P> {
    fn cached_entities(&self) -> Vec<Entity> {
        self.entities()
    }

    fn cached_entity(&self, entity_id: &EntityId) -> Option<Entity> {
        self.entity(entity_id)
    }
}

impl<H: HubClient, P: PushTransport> StateSink for Engine<H, P> {
    fn apply_states(&self, entities: Vec<Entity>) {
        let effects = {
            let mut view = self.inner.view();
            let mut effects = Vec::new();
            for entity in entities {
                merge_entity(&mut view, entity, &mut effects);
            }
            effects
        };
        self.inner.run(effects);
    }
}

fn display_for(kind: ControlKind, entity: &Entity) -> Option<DisplayedValue> {
    match kind {
        ControlKind::Slider => entity.brightness_percentage().map(DisplayedValue::level),
        ControlKind::TapTarget => Some(DisplayedValue::text_of(entity)),
    }
}

/// Merge one remote snapshot: refresh bound controls that are not being
/// dragged, then the cache.
fn merge_entity(view: &mut ViewModel, entity: Entity, effects: &mut Vec<Effect>) {
    for handle in view.controls.bound_to(&entity.entity_id) {
        if view.slider.is_dragging(handle) {
            tracing::trace!(%handle, entity_id = %entity.entity_id, "dragging, remote update dropped");
            continue;
        }
        let Some(kind) = view.controls.get(handle).map(|c| c.kind) else {
            continue;
        };
        let Some(value) = display_for(kind, &entity) else {
            tracing::debug!(entity_id = %entity.entity_id, "no brightness attribute, slider left as is");
            continue;
        };
        if view.controls.set_displayed(handle, value.clone()) {
            effects.push(Effect::Update(ControlUpdate {
                control: handle,
                entity_id: entity.entity_id.clone(),
                value,
                origin: UpdateOrigin::Hub,
            }));
        }
    }

    if view.cache.get(&entity.entity_id) != Some(&entity) {
        view.cache.insert(entity.entity_id.clone(), entity.clone());
        effects.push(Effect::Publish(EngineEvent::EntityUpdated { entity }));
    }
}

/// Turn one gesture into view changes and effects.
fn route(view: &mut ViewModel, gesture: Gesture, effects: &mut Vec<Effect>) {
    match gesture {
        Gesture::DragStart { target, origin } => {
            let Some(control) = view.controls.get(target.control) else {
                return;
            };
            let (ControlKind::Slider, Some(track)) = (control.kind, control.track) else {
                return;
            };
            let start = control.displayed.percentage().unwrap_or(Percentage::MIN);
            let entity_id = control.entity_id.clone();
            if let Err(err) = view.slider.begin(target.control, entity_id, origin.x, start, track) {
                tracing::warn!(%err, "drag start rejected");
            }
        }
        Gesture::DragMove { target, position } => {
            if !view.slider.is_dragging(target.control) {
                return;
            }
            if let Some(step) = view.slider.update(position.x) {
                show_local(view, step.control, &step.entity_id, step.value, effects);
                effects.push(Effect::SetLevel(step.entity_id, step.value));
            }
        }
        Gesture::DragEnd { target, position } => {
            if !view.slider.is_dragging(target.control) {
                return;
            }
            if let Some(end) = view.slider.finish(position.x) {
                show_local(view, end.control, &end.entity_id, end.value, effects);
                effects.push(Effect::Commit(end.entity_id, end.value));
            }
        }
        Gesture::DragCancel { target } => {
            if !view.slider.is_dragging(target.control) {
                return;
            }
            if let Some(restored) = view.slider.cancel() {
                show_local(view, restored.control, &restored.entity_id, restored.value, effects);
                effects.push(Effect::CancelPending(restored.entity_id));
            }
        }
        Gesture::Tap {
            target: Some(target),
            position,
        } => tap(view, target, position.x, effects),
        Gesture::Tap { target: None, .. } => {}
        Gesture::LongPress { target, .. } => {
            let control = target.map(|t| t.control);
            let entity_id = control
                .and_then(|handle| view.controls.get(handle))
                .map(|c| c.entity_id.clone());
            effects.push(Effect::Publish(EngineEvent::LongPress { control, entity_id }));
        }
        Gesture::Swipe { direction, .. } => {
            if let Some((index, tab)) = view.navigator.on_swipe(direction) {
                tracing::debug!(index, tab, "tab changed");
                effects.push(Effect::Publish(EngineEvent::TabChanged {
                    index,
                    tab: tab.to_string(),
                }));
            }
        }
    }
}

fn tap(view: &mut ViewModel, target: HitTarget, x: f64, effects: &mut Vec<Effect>) {
    let Some(control) = view.controls.get(target.control) else {
        return;
    };
    let entity_id = control.entity_id.clone();
    match target.role {
        TargetRole::Tile => effects.push(Effect::Toggle(entity_id)),
        TargetRole::SliderTrack => {
            let Some(track) = control.track else {
                return;
            };
            if let Some(level) = view.slider.jump(&track, x) {
                show_local(view, target.control, &entity_id, level, effects);
                effects.push(Effect::Commit(entity_id, level));
            }
        }
        TargetRole::SliderThumb => {}
    }
}

fn show_local(
    view: &mut ViewModel,
    control: ControlHandle,
    entity_id: &EntityId,
    level: Percentage,
    effects: &mut Vec<Effect>,
) {
    let value = DisplayedValue::level(level);
    if view.controls.set_displayed(control, value.clone()) {
        effects.push(Effect::Update(ControlUpdate {
            control,
            entity_id: entity_id.clone(),
            value,
            origin: UpdateOrigin::Local,
        }));
    }
}
