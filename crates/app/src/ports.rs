//! Port definitions — traits that adapters implement.
//!
//! The engine talks to the hub through [`HubClient`] (request/response) and
//! [`PushTransport`] (server-pushed state changes). The synchronizer hands
//! every received snapshot to a [`StateSink`], which the engine implements.
//! Outer surfaces read those snapshots back through [`EntityCache`].

pub mod entity_cache;
pub mod hub;
pub mod push;
pub mod state_sink;

pub use entity_cache::EntityCache;
pub use hub::HubClient;
pub use push::PushTransport;
pub use state_sink::StateSink;
