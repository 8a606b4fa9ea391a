//! # ipadha-adapter-hub-rest
//!
//! Hub REST adapter — implements [`ipadha_app::ports::HubClient`] over the
//! Home Assistant REST API.
//!
//! ## Endpoints
//! - `GET {hub}/api/states` — every entity snapshot
//! - `GET {hub}/api/states/{entity_id}` — a single snapshot
//! - `POST {hub}/api/services/{domain}/{service}` — invoke a service
//!
//! Every request carries `Authorization: Bearer {token}`; the token is
//! passed through untouched.
//!
//! ## Dependency rule
//! Depends on `ipadha-app` (for the port trait) and `ipadha-domain`.

mod client;
mod config;
mod error;

pub use client::{RestHubClient, api_base_url};
pub use config::HubRestConfig;
pub use error::HubRestError;
