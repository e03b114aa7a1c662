//! Lifter registration
//!
//! Registration is one atomic flow: insert the lifter, resolve primary
//! classes, and materialize the attempt sheet from the declared openers.
//! Nothing is broadcast until the transaction commits.

use crate::db;
use crate::error::{Error, Result};
use crate::meet::{classify, generate};
use crate::sse::EventBroadcaster;
use chrono::Utc;
use ironmeet_common::events::MeetEvent;
use ironmeet_common::models::{age_on, Lifter, NewLifter};
use sqlx::SqlitePool;
use tracing::info;

/// Register a new lifter
///
/// Resolves primary weight/age classes against the current class tables
/// (unclassified is valid), generates pending attempts from the openers,
/// commits, then broadcasts `lifter_added`.
pub async fn register_lifter(
    pool: &SqlitePool,
    broadcaster: &EventBroadcaster,
    new: NewLifter,
) -> Result<Lifter> {
    let mut tx = pool.begin().await?;

    let weight_classes = db::classes::list_weight_classes(&mut *tx).await?;
    let age_classes = db::classes::list_age_classes(&mut *tx).await?;

    let today = Utc::now().date_naive();
    let weight_class_id =
        classify::resolve_weight_class(new.gender, new.bodyweight, &weight_classes);
    let age_class_id = classify::resolve_age_class(age_on(new.birth_date, today), &age_classes);

    let lifter_id = db::lifters::insert_lifter(&mut *tx, &new, weight_class_id, age_class_id).await?;

    let openers = generate::Openers {
        squat: new.opener_squat,
        bench: new.opener_bench,
        deadlift: new.opener_deadlift,
    };
    let attempts = generate::generate_attempts(lifter_id, &openers);
    db::attempts::insert_attempts(&mut *tx, &attempts).await?;

    tx.commit().await?;

    let lifter = db::lifters::get_lifter(pool, lifter_id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Lifter {} vanished after insert", lifter_id)))?;

    info!(
        "Registered lifter {} ({}) with {} attempts",
        lifter.name,
        lifter.lifter_number,
        attempts.len()
    );
    broadcaster.publish(MeetEvent::lifter_added(lifter.clone()));
    Ok(lifter)
}

/// Delete a lifter; their attempts and class memberships cascade
pub async fn remove_lifter(
    pool: &SqlitePool,
    broadcaster: &EventBroadcaster,
    lifter_id: i64,
) -> Result<()> {
    let deleted = db::lifters::delete_lifter(pool, lifter_id).await?;
    if !deleted {
        return Err(Error::NotFound(format!("Lifter {}", lifter_id)));
    }

    info!("Deleted lifter {} and cascaded attempts", lifter_id);
    broadcaster.publish(MeetEvent::lifter_removed(lifter_id));
    Ok(())
}
