//! SSE endpoint

use crate::api::server::AppContext;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - subscribe to the meet event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    ctx.broadcaster.handle_sse_connection()
}
