//! Stub hub and cache shared by the handler tests.

use std::future::Future;
use std::sync::Mutex;

use ipadha_app::event_bus::InProcessEventBus;
use ipadha_app::ports::{EntityCache, HubClient};
use ipadha_domain::entity::{AttributeValue, Entity};
use ipadha_domain::error::IpadhaError;
use ipadha_domain::id::EntityId;
use ipadha_domain::service::ServiceCall;

use crate::state::AppState;

#[derive(Default)]
pub(crate) struct StubHub {
    pub states: Vec<Entity>,
    pub unreachable: bool,
    pub calls: Mutex<Vec<ServiceCall>>,
}

impl StubHub {
    pub fn with_states(states: Vec<Entity>) -> Self {
        Self {
            states,
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), IpadhaError> {
        if self.unreachable {
            return Err(IpadhaError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

impl HubClient for StubHub {
    fn fetch_states(&self) -> impl Future<Output = Result<Vec<Entity>, IpadhaError>> + Send {
        async move {
            self.check()?;
            Ok(self.states.clone())
        }
    }

    fn call_service(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send {
        let call = call.clone();
        async move {
            self.check()?;
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }
}

/// Fixed cache contents; empty by default, like an engine before its first sync.
#[derive(Default)]
pub(crate) struct StubCache {
    pub entities: Vec<Entity>,
}

impl EntityCache for StubCache {
    fn cached_entities(&self) -> Vec<Entity> {
        self.entities.clone()
    }

    fn cached_entity(&self, entity_id: &EntityId) -> Option<Entity> {
        self.entities.iter().find(|e| &e.entity_id == entity_id).cloned()
    }
}

pub(crate) fn entity(id: &str, state: &str) -> Entity {
    Entity::new(EntityId::new(id).unwrap(), state)
}

pub(crate) fn light(id: &str, brightness: i64) -> Entity {
    entity(id, "on").with_attribute("brightness", AttributeValue::Int(brightness))
}

pub(crate) fn test_state(hub: StubHub) -> AppState<StubHub, StubCache> {
    cached_state(hub, Vec::new())
}

pub(crate) fn cached_state(hub: StubHub, cached: Vec<Entity>) -> AppState<StubHub, StubCache> {
    AppState::new(
        hub,
        StubCache { entities: cached },
        InProcessEventBus::default(),
    )
}
