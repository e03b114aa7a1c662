//! HTTP request handlers
//!
//! Implements the REST endpoints for meet administration, judging, and the
//! public display. Read endpoints consult the database directly; write
//! endpoints go through the meet engine and broadcast after commit.

use crate::api::server::AppContext;
use crate::db;
use crate::error::{Error, Result};
use crate::meet::{classify, registration};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use ironmeet_common::events::MeetEvent;
use ironmeet_common::models::{
    AgeClass, Attempt, GenderScope, LiftType, Lifter, MeetCursor, NewLifter, Vote, WeightClass,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct SetLiftTypeRequest {
    pub lift_type: LiftType,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivateRequest {
    /// Explicit attempt to put on the platform; None = let the queue decide
    pub attempt_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ActiveAttemptResponse {
    pub attempt: Option<Attempt>,
}

/// Lifter plus their computed age, as shown to operators
#[derive(Debug, Serialize)]
pub struct LifterResponse {
    #[serde(flatten)]
    pub lifter: Lifter,
    pub age: i64,
}

impl From<Lifter> for LifterResponse {
    fn from(lifter: Lifter) -> Self {
        let age = lifter.age_on(Utc::now().date_naive());
        Self { lifter, age }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWeightClassRequest {
    pub name: String,
    pub min_weight: f64,
    pub max_weight: Option<f64>,
    pub gender: GenderScope,
}

#[derive(Debug, Deserialize)]
pub struct CreateAgeClassRequest {
    pub name: String,
    pub min_age: i64,
    pub max_age: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttemptsQuery {
    pub lifter_id: Option<i64>,
}

/// A judge's decision as submitted; "not yet voted" is not submittable
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Pass,
    Fail,
}

impl From<VoteChoice> for Vote {
    fn from(choice: VoteChoice) -> Vote {
        match choice {
            VoteChoice::Pass => Vote::Pass,
            VoteChoice::Fail => Vote::Fail,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub pin: String,
    pub vote: VoteChoice,
}

#[derive(Debug, Deserialize)]
pub struct JudgeLoginRequest {
    pub pin: String,
}

#[derive(Debug, Serialize)]
pub struct JudgeLoginResponse {
    pub judge_slot: u8,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "ironmeet-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Meet Cursor Endpoints
// ============================================================================

/// GET /cursor - Current meet cursor position
pub async fn get_cursor(State(ctx): State<AppContext>) -> Result<Json<MeetCursor>> {
    Ok(Json(ctx.controller.cursor().await?))
}

/// POST /cursor/lift_type - Switch the meet to a different lift
pub async fn set_lift_type(
    State(ctx): State<AppContext>,
    Json(req): Json<SetLiftTypeRequest>,
) -> Result<Json<MeetCursor>> {
    Ok(Json(ctx.controller.set_lift_type(req.lift_type).await?))
}

/// POST /cursor/advance - Advance to the next attempt round
pub async fn advance_attempt(State(ctx): State<AppContext>) -> Result<Json<MeetCursor>> {
    Ok(Json(ctx.controller.advance_attempt_number().await?))
}

/// POST /cursor/activate - Put an attempt on the platform
///
/// Without a body (or with attempt_id omitted) the queue selector picks the
/// next eligible attempt; an empty queue clears the platform.
pub async fn activate_attempt(
    State(ctx): State<AppContext>,
    body: Option<Json<ActivateRequest>>,
) -> Result<Json<ActiveAttemptResponse>> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let attempt = ctx.controller.activate(req.attempt_id).await?;
    Ok(Json(ActiveAttemptResponse { attempt }))
}

/// GET /cursor/active - The attempt currently on the platform
pub async fn get_active_attempt(
    State(ctx): State<AppContext>,
) -> Result<Json<ActiveAttemptResponse>> {
    let attempt = ctx.controller.active_attempt().await?;
    Ok(Json(ActiveAttemptResponse { attempt }))
}

// ============================================================================
// Queue Endpoint
// ============================================================================

/// GET /queue/next - Peek at the queue selector's next pick
pub async fn get_next_in_queue(
    State(ctx): State<AppContext>,
) -> Result<Json<ActiveAttemptResponse>> {
    let attempt = ctx.controller.peek_next().await?;
    Ok(Json(ActiveAttemptResponse { attempt }))
}

// ============================================================================
// Lifter Endpoints
// ============================================================================

/// GET /lifters - All registered lifters
pub async fn list_lifters(State(ctx): State<AppContext>) -> Result<Json<Vec<LifterResponse>>> {
    let lifters = db::lifters::list_lifters(&ctx.db).await?;
    Ok(Json(lifters.into_iter().map(LifterResponse::from).collect()))
}

/// POST /lifters - Register a new lifter
///
/// Classifies the lifter and generates their attempt sheet in one
/// transaction.
pub async fn register_lifter(
    State(ctx): State<AppContext>,
    Json(req): Json<NewLifter>,
) -> Result<(StatusCode, Json<LifterResponse>)> {
    if req.bodyweight <= 0.0 {
        return Err(Error::BadRequest("Bodyweight must be positive".to_string()));
    }

    let lifter = registration::register_lifter(&ctx.db, &ctx.broadcaster, req).await?;
    Ok((StatusCode::CREATED, Json(lifter.into())))
}

/// GET /lifters/:lifter_id - One lifter with class memberships
pub async fn get_lifter(
    State(ctx): State<AppContext>,
    Path(lifter_id): Path<i64>,
) -> Result<Json<LifterResponse>> {
    let lifter = db::lifters::get_lifter(&ctx.db, lifter_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Lifter {}", lifter_id)))?;
    Ok(Json(lifter.into()))
}

/// DELETE /lifters/:lifter_id - Remove a lifter; attempts cascade
pub async fn delete_lifter(
    State(ctx): State<AppContext>,
    Path(lifter_id): Path<i64>,
) -> Result<StatusCode> {
    registration::remove_lifter(&ctx.db, &ctx.broadcaster, lifter_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Additional Class Membership Endpoints
// ============================================================================

/// POST /lifters/:lifter_id/weight_classes/:class_id - Add an additional
/// weight class for supplementary ranking
pub async fn add_lifter_weight_class(
    State(ctx): State<AppContext>,
    Path((lifter_id, class_id)): Path<(i64, i64)>,
) -> Result<Json<LifterResponse>> {
    let mut tx = ctx.db.begin().await?;

    let lifter = db::lifters::get_lifter_base(&mut *tx, lifter_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Lifter {}", lifter_id)))?;
    db::classes::get_weight_class(&mut *tx, class_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Weight class {}", class_id)))?;

    // A class may not be both primary and additional for the same lifter
    if lifter.weight_class_id == Some(class_id) {
        return Err(Error::InvalidState(
            "Class is already the lifter's primary weight class".to_string(),
        ));
    }
    if !db::lifters::add_extra_weight_class(&mut *tx, lifter_id, class_id).await? {
        return Err(Error::InvalidState(
            "Weight class already added".to_string(),
        ));
    }
    tx.commit().await?;

    publish_lifter_updated(&ctx, lifter_id).await
}

/// DELETE /lifters/:lifter_id/weight_classes/:class_id
pub async fn remove_lifter_weight_class(
    State(ctx): State<AppContext>,
    Path((lifter_id, class_id)): Path<(i64, i64)>,
) -> Result<Json<LifterResponse>> {
    db::lifters::get_lifter_base(&ctx.db, lifter_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Lifter {}", lifter_id)))?;
    if !db::lifters::remove_extra_weight_class(&ctx.db, lifter_id, class_id).await? {
        return Err(Error::NotFound(format!(
            "Weight class {} not on lifter {}",
            class_id, lifter_id
        )));
    }

    publish_lifter_updated(&ctx, lifter_id).await
}

/// POST /lifters/:lifter_id/age_classes/:class_id
pub async fn add_lifter_age_class(
    State(ctx): State<AppContext>,
    Path((lifter_id, class_id)): Path<(i64, i64)>,
) -> Result<Json<LifterResponse>> {
    let mut tx = ctx.db.begin().await?;

    let lifter = db::lifters::get_lifter_base(&mut *tx, lifter_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Lifter {}", lifter_id)))?;
    db::classes::get_age_class(&mut *tx, class_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Age class {}", class_id)))?;

    if lifter.age_class_id == Some(class_id) {
        return Err(Error::InvalidState(
            "Class is already the lifter's primary age class".to_string(),
        ));
    }
    if !db::lifters::add_extra_age_class(&mut *tx, lifter_id, class_id).await? {
        return Err(Error::InvalidState("Age class already added".to_string()));
    }
    tx.commit().await?;

    publish_lifter_updated(&ctx, lifter_id).await
}

/// DELETE /lifters/:lifter_id/age_classes/:class_id
pub async fn remove_lifter_age_class(
    State(ctx): State<AppContext>,
    Path((lifter_id, class_id)): Path<(i64, i64)>,
) -> Result<Json<LifterResponse>> {
    db::lifters::get_lifter_base(&ctx.db, lifter_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Lifter {}", lifter_id)))?;
    if !db::lifters::remove_extra_age_class(&ctx.db, lifter_id, class_id).await? {
        return Err(Error::NotFound(format!(
            "Age class {} not on lifter {}",
            class_id, lifter_id
        )));
    }

    publish_lifter_updated(&ctx, lifter_id).await
}

/// Re-read the lifter, broadcast the update, and build the response
async fn publish_lifter_updated(ctx: &AppContext, lifter_id: i64) -> Result<Json<LifterResponse>> {
    let lifter = db::lifters::get_lifter(&ctx.db, lifter_id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Lifter {} vanished", lifter_id)))?;
    ctx.broadcaster.publish(MeetEvent::lifter_updated(lifter.clone()));
    Ok(Json(lifter.into()))
}

// ============================================================================
// Class Table Endpoints
// ============================================================================

/// GET /weight_classes
pub async fn list_weight_classes(State(ctx): State<AppContext>) -> Result<Json<Vec<WeightClass>>> {
    Ok(Json(db::classes::list_weight_classes(&ctx.db).await?))
}

/// POST /weight_classes - Define a weight class and reclassify all lifters
pub async fn create_weight_class(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateWeightClassRequest>,
) -> Result<(StatusCode, Json<WeightClass>)> {
    if let Some(max) = req.max_weight {
        if max < req.min_weight {
            return Err(Error::BadRequest(
                "max_weight must not be below min_weight".to_string(),
            ));
        }
    }

    let mut tx = ctx.db.begin().await?;
    let id = db::classes::insert_weight_class(
        &mut *tx,
        &req.name,
        req.min_weight,
        req.max_weight,
        req.gender,
    )
    .await?;
    let count = classify::reclassify_all(&mut *tx).await?;
    let class = db::classes::get_weight_class(&mut *tx, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Weight class {} vanished", id)))?;
    tx.commit().await?;

    ctx.broadcaster.publish(MeetEvent::class_updated());
    ctx.broadcaster.publish(MeetEvent::lifters_reclassified(count));
    Ok((StatusCode::CREATED, Json(class)))
}

/// DELETE /weight_classes/:class_id
///
/// Rejected while any lifter holds the class as primary; additional-class
/// references are pruned silently.
pub async fn delete_weight_class(
    State(ctx): State<AppContext>,
    Path(class_id): Path<i64>,
) -> Result<StatusCode> {
    let mut tx = ctx.db.begin().await?;

    let class = db::classes::get_weight_class(&mut *tx, class_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Weight class {}", class_id)))?;
    let holders = db::classes::count_primary_weight_holders(&mut *tx, class_id).await?;
    if holders > 0 {
        return Err(Error::ClassInUse(format!(
            "'{}' is the primary class of {} lifters",
            class.name, holders
        )));
    }

    db::classes::delete_weight_class(&mut *tx, class_id).await?;
    let count = classify::reclassify_all(&mut *tx).await?;
    tx.commit().await?;

    ctx.broadcaster.publish(MeetEvent::class_updated());
    ctx.broadcaster.publish(MeetEvent::lifters_reclassified(count));
    Ok(StatusCode::NO_CONTENT)
}

/// GET /age_classes
pub async fn list_age_classes(State(ctx): State<AppContext>) -> Result<Json<Vec<AgeClass>>> {
    Ok(Json(db::classes::list_age_classes(&ctx.db).await?))
}

/// POST /age_classes - Define an age class and reclassify all lifters
pub async fn create_age_class(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateAgeClassRequest>,
) -> Result<(StatusCode, Json<AgeClass>)> {
    if let Some(max) = req.max_age {
        if max < req.min_age {
            return Err(Error::BadRequest(
                "max_age must not be below min_age".to_string(),
            ));
        }
    }

    let mut tx = ctx.db.begin().await?;
    let id = db::classes::insert_age_class(&mut *tx, &req.name, req.min_age, req.max_age).await?;
    let count = classify::reclassify_all(&mut *tx).await?;
    let class = db::classes::get_age_class(&mut *tx, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Age class {} vanished", id)))?;
    tx.commit().await?;

    ctx.broadcaster.publish(MeetEvent::class_updated());
    ctx.broadcaster.publish(MeetEvent::lifters_reclassified(count));
    Ok((StatusCode::CREATED, Json(class)))
}

/// DELETE /age_classes/:class_id
pub async fn delete_age_class(
    State(ctx): State<AppContext>,
    Path(class_id): Path<i64>,
) -> Result<StatusCode> {
    let mut tx = ctx.db.begin().await?;

    let class = db::classes::get_age_class(&mut *tx, class_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Age class {}", class_id)))?;
    let holders = db::classes::count_primary_age_holders(&mut *tx, class_id).await?;
    if holders > 0 {
        return Err(Error::ClassInUse(format!(
            "'{}' is the primary class of {} lifters",
            class.name, holders
        )));
    }

    db::classes::delete_age_class(&mut *tx, class_id).await?;
    let count = classify::reclassify_all(&mut *tx).await?;
    tx.commit().await?;

    ctx.broadcaster.publish(MeetEvent::class_updated());
    ctx.broadcaster.publish(MeetEvent::lifters_reclassified(count));
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Attempt and Scoring Endpoints
// ============================================================================

/// GET /attempts - All attempts, optionally filtered by lifter
pub async fn list_attempts(
    State(ctx): State<AppContext>,
    Query(query): Query<AttemptsQuery>,
) -> Result<Json<Vec<Attempt>>> {
    let attempts = match query.lifter_id {
        Some(lifter_id) => db::attempts::list_attempts_for_lifter(&ctx.db, lifter_id).await?,
        None => db::attempts::list_attempts(&ctx.db).await?,
    };
    Ok(Json(attempts))
}

/// GET /attempts/:attempt_id
pub async fn get_attempt(
    State(ctx): State<AppContext>,
    Path(attempt_id): Path<i64>,
) -> Result<Json<Attempt>> {
    let attempt = db::attempts::get_attempt(&ctx.db, attempt_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Attempt {}", attempt_id)))?;
    Ok(Json(attempt))
}

/// POST /attempts/:attempt_id/vote - Submit a judge's decision
///
/// The PIN resolves to a judge slot; the vote only lands on the currently
/// active attempt.
pub async fn submit_vote(
    State(ctx): State<AppContext>,
    Path(attempt_id): Path<i64>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Attempt>> {
    let slot = ctx
        .judges
        .slot_for_pin(&req.pin)
        .ok_or(Error::InvalidPin)?;
    let attempt = ctx
        .controller
        .submit_vote(attempt_id, slot, req.vote.into())
        .await?;
    Ok(Json(attempt))
}

// ============================================================================
// Judge Login Endpoint
// ============================================================================

/// POST /judges/login - Resolve a judge PIN to its slot
pub async fn judge_login(
    State(ctx): State<AppContext>,
    Json(req): Json<JudgeLoginRequest>,
) -> Result<Json<JudgeLoginResponse>> {
    let judge_slot = ctx
        .judges
        .slot_for_pin(&req.pin)
        .ok_or(Error::InvalidPin)?;
    Ok(Json(JudgeLoginResponse { judge_slot }))
}
