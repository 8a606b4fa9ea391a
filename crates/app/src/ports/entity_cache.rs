//! Entity cache port — read access to the synchronized snapshots.

use ipadha_domain::entity::Entity;
use ipadha_domain::id::EntityId;

/// Snapshots the engine holds after polling or push, without a hub round-trip.
pub trait EntityCache: Send + Sync + 'static {
    /// Every cached snapshot, sorted by entity id. Empty before the first sync.
    fn cached_entities(&self) -> Vec<Entity>;

    fn cached_entity(&self, entity_id: &EntityId) -> Option<Entity>;
}

impl<T: EntityCache> EntityCache for std::sync::Arc<T> {
    fn cached_entities(&self) -> Vec<Entity> {
        (**self).cached_entities()
    }

    fn cached_entity(&self, entity_id: &EntityId) -> Option<Entity> {
        (**self).cached_entity(entity_id)
    }
}
