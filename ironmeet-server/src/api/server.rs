//! HTTP server setup and routing

use crate::api::auth::JudgeRoster;
use crate::error::{Error, Result};
use crate::meet::MeetController;
use crate::sse::EventBroadcaster;
use axum::{
    routing::{delete, get, post},
    Router,
};
use ironmeet_common::config::Config;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub db: SqlitePool,
    pub controller: Arc<MeetController>,
    pub broadcaster: EventBroadcaster,
    pub judges: Arc<JudgeRoster>,
}

/// Build the API router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // SSE event stream
        .route("/events", get(super::sse::event_stream))
        // Meet cursor
        .route("/cursor", get(super::handlers::get_cursor))
        .route("/cursor/lift_type", post(super::handlers::set_lift_type))
        .route("/cursor/advance", post(super::handlers::advance_attempt))
        .route("/cursor/activate", post(super::handlers::activate_attempt))
        .route("/cursor/active", get(super::handlers::get_active_attempt))
        // Queue
        .route("/queue/next", get(super::handlers::get_next_in_queue))
        // Lifters
        .route("/lifters", get(super::handlers::list_lifters))
        .route("/lifters", post(super::handlers::register_lifter))
        .route("/lifters/:lifter_id", get(super::handlers::get_lifter))
        .route("/lifters/:lifter_id", delete(super::handlers::delete_lifter))
        .route(
            "/lifters/:lifter_id/weight_classes/:class_id",
            post(super::handlers::add_lifter_weight_class),
        )
        .route(
            "/lifters/:lifter_id/weight_classes/:class_id",
            delete(super::handlers::remove_lifter_weight_class),
        )
        .route(
            "/lifters/:lifter_id/age_classes/:class_id",
            post(super::handlers::add_lifter_age_class),
        )
        .route(
            "/lifters/:lifter_id/age_classes/:class_id",
            delete(super::handlers::remove_lifter_age_class),
        )
        // Class tables
        .route("/weight_classes", get(super::handlers::list_weight_classes))
        .route("/weight_classes", post(super::handlers::create_weight_class))
        .route(
            "/weight_classes/:class_id",
            delete(super::handlers::delete_weight_class),
        )
        .route("/age_classes", get(super::handlers::list_age_classes))
        .route("/age_classes", post(super::handlers::create_age_class))
        .route(
            "/age_classes/:class_id",
            delete(super::handlers::delete_age_class),
        )
        // Attempts and scoring
        .route("/attempts", get(super::handlers::list_attempts))
        .route("/attempts/:attempt_id", get(super::handlers::get_attempt))
        .route("/attempts/:attempt_id/vote", post(super::handlers::submit_vote))
        // Judge login
        .route("/judges/login", post(super::handlers::judge_login))
        // Attach application context
        .with_state(ctx)
        // Enable CORS so the public display and judge tablets can connect
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP API server
pub async fn run(config: &Config, ctx: AppContext) -> Result<()> {
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
