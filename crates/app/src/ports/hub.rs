//! Hub client port — request/response access to the hub.

use std::future::Future;

use ipadha_domain::entity::Entity;
use ipadha_domain::error::IpadhaError;
use ipadha_domain::id::EntityId;
use ipadha_domain::service::ServiceCall;

/// Request/response access to the hub REST API.
pub trait HubClient: Send + Sync + 'static {
    /// Fetch every entity snapshot (`GET /api/states`).
    fn fetch_states(&self) -> impl Future<Output = Result<Vec<Entity>, IpadhaError>> + Send;

    /// Fetch a single entity snapshot, `None` when the hub does not know it.
    fn fetch_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, IpadhaError>> + Send {
        async move {
            let states = self.fetch_states().await?;
            Ok(states.into_iter().find(|e| &e.entity_id == entity_id))
        }
    }

    /// Invoke a service (`POST /api/services/{domain}/{service}`).
    fn call_service(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send;
}

impl<T: HubClient> HubClient for std::sync::Arc<T> {
    fn fetch_states(&self) -> impl Future<Output = Result<Vec<Entity>, IpadhaError>> + Send {
        (**self).fetch_states()
    }

    fn fetch_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, IpadhaError>> + Send {
        (**self).fetch_state(entity_id)
    }

    fn call_service(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send {
        (**self).call_service(call)
    }
}
