//! # ipadha-app
//!
//! Interaction engine — the application layer between pointer input, the
//! rendered view model and the hub.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `HubClient` — fetch states, call services
//!   - `PushTransport` — stream pushed state changes
//!   - `StateSink` — receive synchronized snapshots
//! - Classify pointer sequences into gestures (`gesture`)
//! - Own the single slider drag session (`slider`)
//! - Throttle and serialise outbound service calls (`dispatcher`)
//! - Merge polled and pushed states into the view model (`sync`)
//! - Tie it together behind [`engine::Engine`]
//!
//! ## Dependency rule
//! Depends on `ipadha-domain` only (plus `tokio` for tasks, timers and
//! channels). Never imports adapter crates.

pub mod controls;
pub mod dispatcher;
pub mod engine;
pub mod event_bus;
pub mod gesture;
pub mod navigation;
pub mod ports;
pub mod slider;
pub mod sync;

#[cfg(test)]
mod test_support;
