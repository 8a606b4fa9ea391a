//! JSON API handler modules, mounted under `/api`.

#[allow(clippy::missing_errors_doc)]
pub mod entities;
pub mod health;
#[allow(clippy::missing_errors_doc)]
pub mod services;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use ipadha_app::ports::{EntityCache, HubClient};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<H: HubClient, C: EntityCache>() -> Router<AppState<H, C>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/entities", get(entities::list::<H, C>))
        .route("/entity/{entity_id}", get(entities::get::<H, C>))
        .route("/service/{domain}/{service}", post(services::call::<H, C>))
        .route("/events/stream", get(sse::stream::<H, C>))
}
