//! SSE broadcaster for real-time client updates
//!
//! Fans every meet event out to all connected observers (organizer console,
//! judge panels, public display). Delivery is fire-and-forget: a slow or
//! absent observer never blocks or fails the originating state mutation.
//! The underlying broadcast channel preserves emission order, which gives
//! per-topic ordering for free.

use axum::{
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use ironmeet_common::events::MeetEvent;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

/// Broadcaster managing observer connections and event distribution
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<MeetEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster
    ///
    /// `capacity` is the number of events buffered per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        info!("Event broadcaster initialized with capacity {}", capacity);
        Self { tx }
    }

    /// Publish an event to all connected observers
    ///
    /// Failures (no subscribers) are logged and swallowed; they never fail
    /// the originating request.
    pub fn publish(&self, event: MeetEvent) {
        match self.tx.send(event) {
            Ok(count) => debug!("Broadcast event to {} observers", count),
            Err(e) => debug!("No observers connected, dropped event: {}", e.0.topic()),
        }
    }

    /// Subscribe directly to the raw event stream (used by tests)
    pub fn subscribe(&self) -> broadcast::Receiver<MeetEvent> {
        self.tx.subscribe()
    }

    /// Current number of connected observers
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Create an SSE stream for a new observer connection
    ///
    /// The SSE event name is the logical topic; the payload is the JSON
    /// serialized event body.
    pub fn subscribe_stream(&self) -> impl Stream<Item = Result<Event, Infallible>> {
        let rx = self.tx.subscribe();
        let stream = BroadcastStream::new(rx);

        stream.filter_map(|result| async move {
            match result {
                Ok(meet_event) => {
                    let event = Event::default()
                        .event(meet_event.topic())
                        .json_data(&meet_event)
                        .ok();
                    event.map(Ok)
                }
                Err(e) => {
                    // Lagging subscriber dropped events, log and continue
                    warn!("SSE observer lagged: {:?}", e);
                    None
                }
            }
        })
    }

    /// Create an Axum SSE response for GET /events
    pub fn handle_sse_connection(&self) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        info!(
            "New SSE observer connected, total observers: {}",
            self.client_count() + 1
        );

        Sse::new(self.subscribe_stream()).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(30))
                .text("keep-alive"),
        )
    }
}
