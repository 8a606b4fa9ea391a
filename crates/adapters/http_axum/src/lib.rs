//! # ipadha-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small JSON API over the engine cache and hub (`/api/entities`,
//!   `/api/entity/{entity_id}`, `/api/service/{domain}/{service}`)
//! - Stream engine events to browsers as Server-Sent Events
//! - Map domain errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `ipadha-app` (for the `HubClient` and `EntityCache` ports and
//! the event bus) and
//! `ipadha-domain`. Never leaks axum types into either.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
