//! Server-Sent Events (SSE) stream of engine events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use ipadha_app::ports::{EntityCache, HubClient};

use crate::state::AppState;

/// `GET /api/events/stream` — SSE stream of engine events.
///
/// Each [`EngineEvent`](ipadha_app::event_bus::EngineEvent) is sent as a
/// JSON `data:` frame until the client disconnects.
pub async fn stream<H: HubClient, C: EntityCache>(
    State(state): State<AppState<H, C>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let event_rx = state.events.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize engine event for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, some events were dropped");
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}
