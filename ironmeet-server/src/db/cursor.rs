//! Meet cursor queries
//!
//! The cursor is a singleton row; only the meet progress controller writes
//! it, under its own serialization lock.

use crate::error::{Error, Result};
use ironmeet_common::models::{LiftType, MeetCursor};
use sqlx::{Executor, Row, Sqlite};

pub async fn get_cursor<'e, E>(db: E) -> Result<MeetCursor>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT lift, attempt_number, active_attempt_id FROM meet_cursor WHERE id = 1",
    )
    .fetch_optional(db)
    .await?
    .ok_or_else(|| Error::Internal("Meet cursor not initialized".to_string()))?;

    let lift: String = row.try_get("lift")?;
    Ok(MeetCursor {
        lift: LiftType::from_str(&lift)
            .ok_or_else(|| Error::Internal(format!("Unknown lift type '{}'", lift)))?,
        attempt_number: row.try_get("attempt_number")?,
        active_attempt_id: row.try_get("active_attempt_id")?,
    })
}

pub async fn save_cursor<'e, E>(db: E, cursor: &MeetCursor) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "UPDATE meet_cursor SET lift = ?, attempt_number = ?, active_attempt_id = ? WHERE id = 1",
    )
    .bind(cursor.lift.as_str())
    .bind(cursor.attempt_number)
    .bind(cursor.active_attempt_id)
    .execute(db)
    .await?;
    Ok(())
}
