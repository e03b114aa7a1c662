//! Attempt queries
//!
//! Attempts are created in a batch of nine at registration and never deleted
//! individually; they go away only when their owning lifter cascades.

use crate::error::{Error, Result};
use ironmeet_common::models::{Attempt, AttemptStatus, LiftType, NewAttempt, Vote};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqliteConnection};

const ATTEMPT_COLUMNS: &str =
    "id, lifter_id, lift, number, weight, status, judge1, judge2, judge3, verdict";

fn vote_from_column(row: &SqliteRow, column: &str) -> Result<Vote> {
    let value: String = row.try_get(column)?;
    Vote::from_str(&value)
        .ok_or_else(|| Error::Internal(format!("Unknown vote value '{}' in {}", value, column)))
}

pub fn attempt_from_row(row: &SqliteRow) -> Result<Attempt> {
    let lift: String = row.try_get("lift")?;
    let status: String = row.try_get("status")?;
    Ok(Attempt {
        id: row.try_get("id")?,
        lifter_id: row.try_get("lifter_id")?,
        lift: LiftType::from_str(&lift)
            .ok_or_else(|| Error::Internal(format!("Unknown lift type '{}'", lift)))?,
        number: row.try_get("number")?,
        weight: row.try_get("weight")?,
        status: AttemptStatus::from_str(&status)
            .ok_or_else(|| Error::Internal(format!("Unknown attempt status '{}'", status)))?,
        judge1: vote_from_column(row, "judge1")?,
        judge2: vote_from_column(row, "judge2")?,
        judge3: vote_from_column(row, "judge3")?,
        verdict: vote_from_column(row, "verdict")?,
    })
}

/// Insert a batch of generated attempts (all pending, no votes)
pub async fn insert_attempts(conn: &mut SqliteConnection, rows: &[NewAttempt]) -> Result<()> {
    for attempt in rows {
        sqlx::query(
            "INSERT INTO attempts (lifter_id, lift, number, weight) VALUES (?, ?, ?, ?)",
        )
        .bind(attempt.lifter_id)
        .bind(attempt.lift.as_str())
        .bind(attempt.number)
        .bind(attempt.weight)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn get_attempt<'e, E>(db: E, id: i64) -> Result<Option<Attempt>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!("SELECT {} FROM attempts WHERE id = ?", ATTEMPT_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await?;
    row.as_ref().map(attempt_from_row).transpose()
}

pub async fn list_attempts<'e, E>(db: E) -> Result<Vec<Attempt>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(&format!(
        "SELECT {} FROM attempts ORDER BY lifter_id, lift, number",
        ATTEMPT_COLUMNS
    ))
    .fetch_all(db)
    .await?;
    rows.iter().map(attempt_from_row).collect()
}

pub async fn list_attempts_for_lifter<'e, E>(db: E, lifter_id: i64) -> Result<Vec<Attempt>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(&format!(
        "SELECT {} FROM attempts WHERE lifter_id = ? ORDER BY lift, number",
        ATTEMPT_COLUMNS
    ))
    .bind(lifter_id)
    .fetch_all(db)
    .await?;
    rows.iter().map(attempt_from_row).collect()
}

pub async fn set_status<'e, E>(db: E, id: i64, status: AttemptStatus) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE attempts SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Atomically flip a pending attempt to active, clearing votes and verdict
///
/// The `status = 'pending'` guard makes concurrent activation a
/// check-and-set: exactly one caller wins, the loser sees `false`.
pub async fn claim_for_activation<'e, E>(db: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE attempts \
         SET status = 'active', judge1 = 'unset', judge2 = 'unset', judge3 = 'unset', \
             verdict = 'unset' \
         WHERE id = ? AND status = 'pending'",
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Record one judge's vote, overwriting any prior vote in that slot
pub async fn record_vote<'e, E>(db: E, id: i64, slot: u8, vote: Vote) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let column = match slot {
        1 => "judge1",
        2 => "judge2",
        3 => "judge3",
        _ => return Err(Error::InvalidJudge(slot)),
    };

    sqlx::query(&format!("UPDATE attempts SET {} = ? WHERE id = ?", column))
        .bind(vote.as_str())
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Set the overall verdict and mark the attempt completed
pub async fn finalize<'e, E>(db: E, id: i64, verdict: Vote) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE attempts SET verdict = ?, status = 'completed' WHERE id = ?")
        .bind(verdict.as_str())
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
