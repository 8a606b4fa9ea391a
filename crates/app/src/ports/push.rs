//! Push transport port — server-pushed entity state changes.

use std::future::Future;

use ipadha_domain::entity::Entity;
use ipadha_domain::error::IpadhaError;
use tokio::sync::mpsc;

/// A long-lived subscription to hub state changes.
pub trait PushTransport: Send + Sync + 'static {
    /// Connect, subscribe and forward every new entity state into `sink`
    /// until the connection ends.
    ///
    /// Resolves with `Ok(())` when the server closes the stream or the
    /// receiver is gone.
    ///
    /// # Errors
    ///
    /// Returns [`IpadhaError::Unauthorized`] when the hub rejects the token
    /// and [`IpadhaError::Transport`] on any connection or protocol failure.
    fn stream_states(
        &self,
        sink: mpsc::Sender<Entity>,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send;
}

impl<T: PushTransport> PushTransport for std::sync::Arc<T> {
    fn stream_states(
        &self,
        sink: mpsc::Sender<Entity>,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send {
        (**self).stream_states(sink)
    }
}

/// Push transport for polling-only setups: never connects, never delivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPush;

impl PushTransport for NoPush {
    fn stream_states(
        &self,
        _sink: mpsc::Sender<Entity>,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send {
        std::future::pending()
    }
}
