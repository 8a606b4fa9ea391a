//! Entity read endpoints.
//!
//! Served from the engine cache; the hub is asked only before the first
//! sync or for entities the cache has not seen.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use ipadha_app::ports::{EntityCache, HubClient};
use ipadha_domain::entity::Entity;
use ipadha_domain::error::NotFoundError;
use ipadha_domain::id::EntityId;

use crate::error::ApiError;
use crate::state::AppState;

/// Hub states grouped by the dashboard section they render in.
///
/// Entities of other domains are left out.
#[derive(Debug, Default, Serialize)]
pub struct DashboardEntities {
    pub lights: Vec<Entity>,
    pub switches: Vec<Entity>,
    pub sensors: Vec<Entity>,
    pub media_players: Vec<Entity>,
    pub climates: Vec<Entity>,
    pub covers: Vec<Entity>,
    pub locks: Vec<Entity>,
    pub alarms: Vec<Entity>,
}

impl DashboardEntities {
    #[must_use]
    pub fn group(states: Vec<Entity>) -> Self {
        let mut grouped = Self::default();
        for entity in states {
            let section = match entity.entity_id.domain() {
                "light" => &mut grouped.lights,
                "switch" => &mut grouped.switches,
                "sensor" => &mut grouped.sensors,
                "media_player" => &mut grouped.media_players,
                "climate" => &mut grouped.climates,
                "cover" => &mut grouped.covers,
                "lock" => &mut grouped.locks,
                "alarm_control_panel" => &mut grouped.alarms,
                _ => continue,
            };
            section.push(entity);
        }
        grouped
    }
}

/// `GET /api/entities`
pub async fn list<H: HubClient, C: EntityCache>(
    State(state): State<AppState<H, C>>,
) -> Result<Json<DashboardEntities>, ApiError> {
    let mut states = state.cache.cached_entities();
    if states.is_empty() {
        tracing::debug!("entity cache empty, reading states from hub");
        states = state.hub.fetch_states().await?;
    }
    Ok(Json(DashboardEntities::group(states)))
}

/// `GET /api/entity/{entity_id}`
pub async fn get<H: HubClient, C: EntityCache>(
    State(state): State<AppState<H, C>>,
    Path(entity_id): Path<String>,
) -> Result<Json<Entity>, ApiError> {
    let entity_id = EntityId::from_str(&entity_id)?;
    if let Some(entity) = state.cache.cached_entity(&entity_id) {
        return Ok(Json(entity));
    }
    let entity = state
        .hub
        .fetch_state(&entity_id)
        .await?
        .ok_or_else(|| NotFoundError {
            entity: "entity",
            id: entity_id.to_string(),
        })?;
    Ok(Json(entity))
}
