//! State sink port — where synchronized snapshots land.

use ipadha_domain::entity::Entity;

/// Receives entity snapshots from polling or push.
///
/// Implementations must not block: they run on the synchronizer task.
pub trait StateSink: Send + Sync + 'static {
    /// Merge a batch of snapshots into the view model.
    fn apply_states(&self, entities: Vec<Entity>);
}

impl<T: StateSink> StateSink for std::sync::Arc<T> {
    fn apply_states(&self, entities: Vec<Entity>) {
        (**self).apply_states(entities);
    }
}
