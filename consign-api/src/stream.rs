use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use consign_shared::topics;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/events/{kind}", get(subscribe))
}

/// GET /v1/events/:kind
/// Live notification stream for one entity kind. Messages a client
/// misses while disconnected are gone; the UI re-fetches on notify
/// instead of trusting the payload as authoritative state.
async fn subscribe(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let topic = topics::for_stream(&kind)
        .ok_or_else(|| AppError::NotFoundError(format!("unknown event stream: {}", kind)))?;
    let rx = state
        .notify
        .subscribe(topic)
        .ok_or_else(|| AppError::InternalServerError(format!("no channel for {}", topic)))?;

    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(text) => Some(Ok(Event::default().data(text))),
        // A lagged receiver skips dropped messages instead of closing.
        Err(_) => None,
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
