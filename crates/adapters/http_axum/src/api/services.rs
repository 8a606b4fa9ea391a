//! Service call proxy.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Map, Value, json};

use ipadha_app::ports::{EntityCache, HubClient};
use ipadha_domain::error::ValidationError;
use ipadha_domain::id::EntityId;
use ipadha_domain::service::ServiceCall;

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/service/{domain}/{service}`
///
/// The body is the service data; it must carry an `entity_id` string. Every
/// other field is forwarded to the hub unchanged.
pub async fn call<H: HubClient, C: EntityCache>(
    State(state): State<AppState<H, C>>,
    Path((domain, service)): Path<(String, String)>,
    Json(mut data): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let entity_id = match data.remove("entity_id") {
        Some(Value::String(raw)) => EntityId::new(raw)?,
        Some(other) => return Err(ValidationError::MalformedEntityId(other.to_string()).into()),
        None => return Err(ValidationError::EmptyEntityId.into()),
    };

    let mut call = ServiceCall::new(entity_id, service);
    call.domain = domain;
    call.data = data;

    tracing::debug!(
        domain = %call.domain,
        service = %call.service,
        entity_id = %call.entity_id,
        "proxying service call"
    );
    state.hub.call_service(&call).await?;
    Ok(Json(json!({ "status": "ok" })))
}
