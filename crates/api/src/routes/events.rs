//! Realtime event stream route.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::state::AppState;

/// Server-Sent Events stream of broadcast updates.
///
/// Best effort: events published while a viewer was disconnected, or
/// dropped because the viewer lagged behind the buffer, are not
/// replayed.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.engine.subscribe()).filter_map(|result| {
        // A lagged receiver yields an error for the dropped span; skip it.
        let event = result.ok()?;
        let sse = Event::default()
            .event(event.kind())
            .json_data(&event)
            .ok()?;
        Some(Ok(sse))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
