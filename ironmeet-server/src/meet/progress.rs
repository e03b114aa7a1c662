//! Meet progress controller
//!
//! Owns the singleton meet cursor: current lift type, current attempt round,
//! and the attempt on the platform. All four write paths (lift type change,
//! round advance, activation, vote submission) serialize through one
//! controller-held lock, and each runs inside a database transaction so no
//! partial multi-field write survives a failure.

use crate::db;
use crate::error::{Error, Result};
use crate::meet::{queue, scoring};
use crate::sse::EventBroadcaster;
use ironmeet_common::config::VerdictPolicy;
use ironmeet_common::events::MeetEvent;
use ironmeet_common::models::{Attempt, AttemptStatus, LiftType, MeetCursor, Vote};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::info;

/// Single owner of all meet cursor mutations
pub struct MeetController {
    db: SqlitePool,
    broadcaster: EventBroadcaster,
    policy: VerdictPolicy,
    /// Serializes the cursor and vote write paths
    write_lock: Mutex<()>,
}

impl MeetController {
    pub fn new(db: SqlitePool, broadcaster: EventBroadcaster, policy: VerdictPolicy) -> Self {
        Self {
            db,
            broadcaster,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    /// Current cursor position
    pub async fn cursor(&self) -> Result<MeetCursor> {
        db::cursor::get_cursor(&self.db).await
    }

    /// The attempt currently on the platform, if any
    pub async fn active_attempt(&self) -> Result<Option<Attempt>> {
        let cursor = db::cursor::get_cursor(&self.db).await?;
        match cursor.active_attempt_id {
            Some(id) => db::attempts::get_attempt(&self.db, id).await,
            None => Ok(None),
        }
    }

    /// Peek at the attempt the queue selector would pick next
    pub async fn peek_next(&self) -> Result<Option<Attempt>> {
        let cursor = db::cursor::get_cursor(&self.db).await?;
        queue::select_next(&self.db, &cursor).await
    }

    /// Switch the meet to a different lift type
    ///
    /// Resets the attempt round to 1 and clears the platform. Any attempt
    /// still active is demoted back to pending.
    pub async fn set_lift_type(&self, lift: LiftType) -> Result<MeetCursor> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let mut cursor = db::cursor::get_cursor(&mut *tx).await?;
        let demoted = demote_active(&mut tx, &cursor).await?;

        cursor.lift = lift;
        cursor.attempt_number = 1;
        cursor.active_attempt_id = None;
        db::cursor::save_cursor(&mut *tx, &cursor).await?;
        tx.commit().await?;

        info!("Lift type set to {}", lift.as_str());
        if let Some(attempt) = demoted {
            self.broadcaster.publish(MeetEvent::attempt_updated(attempt));
        }
        self.broadcaster.publish(MeetEvent::cursor_updated(cursor.clone()));
        self.broadcaster.publish(MeetEvent::active_attempt_changed(None));
        Ok(cursor)
    }

    /// Advance to the next attempt round within the current lift
    ///
    /// Fails with `MaxAttemptReached` at round 3. Clears the platform.
    pub async fn advance_attempt_number(&self) -> Result<MeetCursor> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let mut cursor = db::cursor::get_cursor(&mut *tx).await?;
        if cursor.attempt_number >= 3 {
            return Err(Error::MaxAttemptReached);
        }
        let demoted = demote_active(&mut tx, &cursor).await?;

        cursor.attempt_number += 1;
        cursor.active_attempt_id = None;
        db::cursor::save_cursor(&mut *tx, &cursor).await?;
        tx.commit().await?;

        info!("Advanced to attempt round {}", cursor.attempt_number);
        if let Some(attempt) = demoted {
            self.broadcaster.publish(MeetEvent::attempt_updated(attempt));
        }
        self.broadcaster.publish(MeetEvent::cursor_updated(cursor.clone()));
        self.broadcaster.publish(MeetEvent::active_attempt_changed(None));
        Ok(cursor)
    }

    /// Put an attempt on the platform
    ///
    /// With an explicit id, the attempt must be pending and match the
    /// cursor's lift type and round (`NotFound` / `NotPending` otherwise).
    /// With no id, the queue selector picks one; an empty queue leaves the
    /// platform clear and broadcasts a null active attempt. A previously
    /// active attempt is demoted back to pending (completed ones are left
    /// alone). Activation resets all vote slots and the verdict, so
    /// reactivating an attempt rescores it from scratch.
    pub async fn activate(&self, attempt_id: Option<i64>) -> Result<Option<Attempt>> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let mut cursor = db::cursor::get_cursor(&mut *tx).await?;
        let demoted = demote_active(&mut tx, &cursor).await?;

        let target = match attempt_id {
            Some(id) => {
                let attempt = db::attempts::get_attempt(&mut *tx, id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("Attempt {}", id)))?;
                if attempt.status != AttemptStatus::Pending
                    || attempt.lift != cursor.lift
                    || attempt.number != cursor.attempt_number
                {
                    return Err(Error::NotPending(id));
                }
                Some(attempt)
            }
            None => queue::select_next(&mut *tx, &cursor).await?,
        };

        let Some(attempt) = target else {
            cursor.active_attempt_id = None;
            db::cursor::save_cursor(&mut *tx, &cursor).await?;
            tx.commit().await?;

            info!(
                "No pending attempts for {} round {}, platform cleared",
                cursor.lift.as_str(),
                cursor.attempt_number
            );
            if let Some(prev) = demoted {
                self.broadcaster.publish(MeetEvent::attempt_updated(prev));
            }
            self.broadcaster.publish(MeetEvent::cursor_updated(cursor));
            self.broadcaster.publish(MeetEvent::active_attempt_changed(None));
            return Ok(None);
        };

        // Check-and-set: a concurrent activation of the same attempt loses here
        if !db::attempts::claim_for_activation(&mut *tx, attempt.id).await? {
            return Err(Error::NotPending(attempt.id));
        }

        cursor.active_attempt_id = Some(attempt.id);
        db::cursor::save_cursor(&mut *tx, &cursor).await?;

        let activated = db::attempts::get_attempt(&mut *tx, attempt.id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Attempt {} vanished", attempt.id)))?;
        tx.commit().await?;

        info!(
            "Attempt {} active: lifter {} {} round {} at {}kg",
            activated.id,
            activated.lifter_id,
            activated.lift.as_str(),
            activated.number,
            activated.weight
        );
        if let Some(prev) = demoted {
            self.broadcaster.publish(MeetEvent::attempt_updated(prev));
        }
        self.broadcaster.publish(MeetEvent::cursor_updated(cursor));
        self.broadcaster
            .publish(MeetEvent::active_attempt_changed(Some(activated.clone())));
        Ok(Some(activated))
    }

    /// Record one judge's vote on the active attempt
    ///
    /// The vote overwrites any prior vote in that slot (judges may correct
    /// themselves until the verdict is finalized). Once the configured
    /// quorum policy decides, the attempt completes and the platform clears.
    pub async fn submit_vote(&self, attempt_id: i64, slot: u8, vote: Vote) -> Result<Attempt> {
        if !(1..=3).contains(&slot) {
            return Err(Error::InvalidJudge(slot));
        }
        if vote == Vote::Unset {
            return Err(Error::BadRequest("Vote must be pass or fail".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let mut cursor = db::cursor::get_cursor(&mut *tx).await?;
        if cursor.active_attempt_id != Some(attempt_id) {
            return Err(Error::NotActive(attempt_id));
        }

        db::attempts::record_vote(&mut *tx, attempt_id, slot, vote).await?;
        let attempt = db::attempts::get_attempt(&mut *tx, attempt_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Attempt {}", attempt_id)))?;

        let mut completed = false;
        if let Some(verdict) = scoring::evaluate(attempt.votes(), self.policy) {
            db::attempts::finalize(&mut *tx, attempt_id, verdict).await?;
            cursor.active_attempt_id = None;
            db::cursor::save_cursor(&mut *tx, &cursor).await?;
            completed = true;
        }

        let updated = db::attempts::get_attempt(&mut *tx, attempt_id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Attempt {} vanished", attempt_id)))?;
        tx.commit().await?;

        info!(
            "Judge {} voted {} on attempt {}{}",
            slot,
            vote.as_str(),
            attempt_id,
            if completed { ", verdict finalized" } else { "" }
        );
        self.broadcaster.publish(MeetEvent::attempt_updated(updated.clone()));
        if completed {
            self.broadcaster.publish(MeetEvent::cursor_updated(cursor));
            self.broadcaster.publish(MeetEvent::active_attempt_changed(None));
        }
        Ok(updated)
    }
}

/// Demote the cursor's active attempt back to pending, if it is still active
///
/// Completed attempts are left alone. Returns the demoted attempt for the
/// caller to broadcast after commit.
async fn demote_active(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    cursor: &MeetCursor,
) -> Result<Option<Attempt>> {
    let Some(prev_id) = cursor.active_attempt_id else {
        return Ok(None);
    };
    let Some(prev) = db::attempts::get_attempt(&mut **tx, prev_id).await? else {
        return Ok(None);
    };
    if prev.status != AttemptStatus::Active {
        return Ok(None);
    }

    db::attempts::set_status(&mut **tx, prev_id, AttemptStatus::Pending).await?;
    db::attempts::get_attempt(&mut **tx, prev_id).await
}
