//! Queue selection
//!
//! Picks the next eligible attempt for the current cursor position. The
//! ordering rule matches conventional meet running order: lighter bar first,
//! then lighter lifter, then registration order. The same inputs always
//! yield the same selection.

use crate::db::attempts::attempt_from_row;
use crate::error::Result;
use ironmeet_common::models::{Attempt, MeetCursor};
use sqlx::{Executor, Sqlite};

/// Select the next pending attempt for the cursor's lift type and round
///
/// Returns None when no attempt is eligible.
pub async fn select_next<'e, E>(db: E, cursor: &MeetCursor) -> Result<Option<Attempt>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT a.id, a.lifter_id, a.lift, a.number, a.weight, a.status,
               a.judge1, a.judge2, a.judge3, a.verdict
        FROM attempts a
        JOIN lifters l ON l.id = a.lifter_id
        WHERE a.status = 'pending' AND a.lift = ? AND a.number = ?
        ORDER BY a.weight ASC, l.bodyweight ASC, a.id ASC
        LIMIT 1
        "#,
    )
    .bind(cursor.lift.as_str())
    .bind(cursor.attempt_number)
    .fetch_optional(db)
    .await?;

    row.as_ref().map(attempt_from_row).transpose()
}
