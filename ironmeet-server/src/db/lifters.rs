//! Lifter queries
//!
//! A `Lifter` row carries its additional class memberships; the full read
//! functions take a pool so they can run the join-table lookups, while the
//! single-statement writes are generic over any executor and compose into
//! transactions.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use ironmeet_common::models::{Gender, Lifter, NewLifter};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Pool, Row, Sqlite};

/// Minimal lifter fields needed to (re)compute primary classes
#[derive(Debug, Clone)]
pub struct ClassificationRow {
    pub id: i64,
    pub gender: Gender,
    pub bodyweight: f64,
    pub birth_date: NaiveDate,
}

const LIFTER_COLUMNS: &str = "id, lifter_number, name, gender, bodyweight, birth_date, \
     opener_squat, opener_bench, opener_deadlift, weight_class_id, age_class_id";

fn lifter_from_row(row: &SqliteRow) -> Result<Lifter> {
    let gender: String = row.try_get("gender")?;
    Ok(Lifter {
        id: row.try_get("id")?,
        lifter_number: row.try_get("lifter_number")?,
        name: row.try_get("name")?,
        gender: Gender::from_str(&gender)
            .ok_or_else(|| Error::Internal(format!("Unknown gender '{}'", gender)))?,
        bodyweight: row.try_get("bodyweight")?,
        birth_date: row.try_get("birth_date")?,
        opener_squat: row.try_get("opener_squat")?,
        opener_bench: row.try_get("opener_bench")?,
        opener_deadlift: row.try_get("opener_deadlift")?,
        weight_class_id: row.try_get("weight_class_id")?,
        age_class_id: row.try_get("age_class_id")?,
        extra_weight_class_ids: Vec::new(),
        extra_age_class_ids: Vec::new(),
    })
}

/// Insert a new lifter with pre-resolved primary classes; returns the row id
pub async fn insert_lifter<'e, E>(
    db: E,
    new: &NewLifter,
    weight_class_id: Option<i64>,
    age_class_id: Option<i64>,
) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO lifters
            (lifter_number, name, gender, bodyweight, birth_date,
             opener_squat, opener_bench, opener_deadlift,
             weight_class_id, age_class_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.lifter_number)
    .bind(&new.name)
    .bind(new.gender.as_str())
    .bind(new.bodyweight)
    .bind(new.birth_date)
    .bind(new.opener_squat)
    .bind(new.opener_bench)
    .bind(new.opener_deadlift)
    .bind(weight_class_id)
    .bind(age_class_id)
    .execute(db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err)
            if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            Error::BadRequest("Lifter number already registered".to_string())
        }
        _ => Error::Database(e),
    })?;

    Ok(result.last_insert_rowid())
}

/// Fetch a lifter without additional-class memberships (single statement)
pub async fn get_lifter_base<'e, E>(db: E, id: i64) -> Result<Option<Lifter>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!("SELECT {} FROM lifters WHERE id = ?", LIFTER_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await?;
    row.as_ref().map(lifter_from_row).transpose()
}

/// Fetch a lifter including additional class memberships
pub async fn get_lifter(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Lifter>> {
    let Some(mut lifter) = get_lifter_base(pool, id).await? else {
        return Ok(None);
    };

    lifter.extra_weight_class_ids = sqlx::query_scalar(
        "SELECT weight_class_id FROM lifter_extra_weight_classes \
         WHERE lifter_id = ? ORDER BY weight_class_id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    lifter.extra_age_class_ids = sqlx::query_scalar(
        "SELECT age_class_id FROM lifter_extra_age_classes \
         WHERE lifter_id = ? ORDER BY age_class_id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(lifter))
}

/// List all lifters including additional class memberships
///
/// Runs one join-table query per lifter; fine at meet sizes (tens to low
/// hundreds of competitors).
pub async fn list_lifters(pool: &Pool<Sqlite>) -> Result<Vec<Lifter>> {
    let rows = sqlx::query(&format!("SELECT {} FROM lifters ORDER BY id", LIFTER_COLUMNS))
        .fetch_all(pool)
        .await?;

    let mut lifters = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut lifter = lifter_from_row(row)?;
        lifter.extra_weight_class_ids = sqlx::query_scalar(
            "SELECT weight_class_id FROM lifter_extra_weight_classes \
             WHERE lifter_id = ? ORDER BY weight_class_id",
        )
        .bind(lifter.id)
        .fetch_all(pool)
        .await?;
        lifter.extra_age_class_ids = sqlx::query_scalar(
            "SELECT age_class_id FROM lifter_extra_age_classes \
             WHERE lifter_id = ? ORDER BY age_class_id",
        )
        .bind(lifter.id)
        .fetch_all(pool)
        .await?;
        lifters.push(lifter);
    }

    Ok(lifters)
}

/// Delete a lifter; attempts and class memberships cascade
pub async fn delete_lifter<'e, E>(db: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM lifters WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Rows for the bulk reclassification pass
pub async fn list_classification_rows<'e, E>(db: E) -> Result<Vec<ClassificationRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT id, gender, bodyweight, birth_date FROM lifters ORDER BY id")
        .fetch_all(db)
        .await?;

    rows.iter()
        .map(|row| {
            let gender: String = row.try_get("gender")?;
            Ok(ClassificationRow {
                id: row.try_get("id")?,
                gender: Gender::from_str(&gender)
                    .ok_or_else(|| Error::Internal(format!("Unknown gender '{}'", gender)))?,
                bodyweight: row.try_get("bodyweight")?,
                birth_date: row.try_get("birth_date")?,
            })
        })
        .collect()
}

/// Overwrite a lifter's primary classes
pub async fn set_primary_classes<'e, E>(
    db: E,
    lifter_id: i64,
    weight_class_id: Option<i64>,
    age_class_id: Option<i64>,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE lifters SET weight_class_id = ?, age_class_id = ? WHERE id = ?")
        .bind(weight_class_id)
        .bind(age_class_id)
        .bind(lifter_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Add an additional weight class membership; false if already present
pub async fn add_extra_weight_class<'e, E>(db: E, lifter_id: i64, class_id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT OR IGNORE INTO lifter_extra_weight_classes (lifter_id, weight_class_id) \
         VALUES (?, ?)",
    )
    .bind(lifter_id)
    .bind(class_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove an additional weight class membership; false if it was not present
pub async fn remove_extra_weight_class<'e, E>(db: E, lifter_id: i64, class_id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "DELETE FROM lifter_extra_weight_classes WHERE lifter_id = ? AND weight_class_id = ?",
    )
    .bind(lifter_id)
    .bind(class_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Add an additional age class membership; false if already present
pub async fn add_extra_age_class<'e, E>(db: E, lifter_id: i64, class_id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT OR IGNORE INTO lifter_extra_age_classes (lifter_id, age_class_id) VALUES (?, ?)",
    )
    .bind(lifter_id)
    .bind(class_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove an additional age class membership; false if it was not present
pub async fn remove_extra_age_class<'e, E>(db: E, lifter_id: i64, class_id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "DELETE FROM lifter_extra_age_classes WHERE lifter_id = ? AND age_class_id = ?",
    )
    .bind(lifter_id)
    .bind(class_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
