//! Shared application state for axum handlers.

use std::sync::Arc;

use ipadha_app::event_bus::InProcessEventBus;
use ipadha_app::ports::{EntityCache, HubClient};

/// Application state shared across all axum handlers.
///
/// Generic over the hub client and the entity cache to avoid dynamic
/// dispatch. `Clone` is implemented manually so `H` and `C` themselves do
/// not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<H, C> {
    /// Hub the API proxies to.
    pub hub: Arc<H>,
    /// Synchronized snapshots, read before asking the hub.
    pub cache: Arc<C>,
    /// Engine events forwarded over SSE.
    pub events: Arc<InProcessEventBus>,
}

impl<H, C> Clone for AppState<H, C> {
    fn clone(&self) -> Self {
        Self {
            hub: Arc::clone(&self.hub),
            cache: Arc::clone(&self.cache),
            events: Arc::clone(&self.events),
        }
    }
}

impl<H: HubClient, C: EntityCache> AppState<H, C> {
    pub fn new(hub: H, cache: C, events: InProcessEventBus) -> Self {
        Self::from_arcs(Arc::new(hub), Arc::new(cache), Arc::new(events))
    }

    /// Build the state from handles already shared with the engine.
    pub fn from_arcs(hub: Arc<H>, cache: Arc<C>, events: Arc<InProcessEventBus>) -> Self {
        Self { hub, cache, events }
    }
}
