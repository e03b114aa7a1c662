//! Weight and age class queries

use crate::error::{Error, Result};
use ironmeet_common::models::{AgeClass, GenderScope, WeightClass};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

fn weight_class_from_row(row: &SqliteRow) -> Result<WeightClass> {
    let gender: String = row.try_get("gender")?;
    Ok(WeightClass {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        min_weight: row.try_get("min_weight")?,
        max_weight: row.try_get("max_weight")?,
        gender: GenderScope::from_str(&gender)
            .ok_or_else(|| Error::Internal(format!("Unknown gender scope '{}'", gender)))?,
    })
}

fn age_class_from_row(row: &SqliteRow) -> Result<AgeClass> {
    Ok(AgeClass {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        min_age: row.try_get("min_age")?,
        max_age: row.try_get("max_age")?,
    })
}

pub async fn list_weight_classes<'e, E>(db: E) -> Result<Vec<WeightClass>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows =
        sqlx::query("SELECT id, name, min_weight, max_weight, gender FROM weight_classes ORDER BY id")
            .fetch_all(db)
            .await?;
    rows.iter().map(weight_class_from_row).collect()
}

pub async fn get_weight_class<'e, E>(db: E, id: i64) -> Result<Option<WeightClass>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, name, min_weight, max_weight, gender FROM weight_classes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    row.as_ref().map(weight_class_from_row).transpose()
}

pub async fn insert_weight_class<'e, E>(
    db: E,
    name: &str,
    min_weight: f64,
    max_weight: Option<f64>,
    gender: GenderScope,
) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO weight_classes (name, min_weight, max_weight, gender) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(min_weight)
    .bind(max_weight)
    .bind(gender.as_str())
    .execute(db)
    .await
    .map_err(unique_name_error)?;
    Ok(result.last_insert_rowid())
}

pub async fn delete_weight_class<'e, E>(db: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM weight_classes WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Number of lifters holding this weight class as their primary class
pub async fn count_primary_weight_holders<'e, E>(db: E, id: i64) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM lifters WHERE weight_class_id = ?")
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn list_age_classes<'e, E>(db: E) -> Result<Vec<AgeClass>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT id, name, min_age, max_age FROM age_classes ORDER BY id")
        .fetch_all(db)
        .await?;
    rows.iter().map(age_class_from_row).collect()
}

pub async fn get_age_class<'e, E>(db: E, id: i64) -> Result<Option<AgeClass>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT id, name, min_age, max_age FROM age_classes WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    row.as_ref().map(age_class_from_row).transpose()
}

pub async fn insert_age_class<'e, E>(
    db: E,
    name: &str,
    min_age: i64,
    max_age: Option<i64>,
) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("INSERT INTO age_classes (name, min_age, max_age) VALUES (?, ?, ?)")
        .bind(name)
        .bind(min_age)
        .bind(max_age)
        .execute(db)
        .await
        .map_err(unique_name_error)?;
    Ok(result.last_insert_rowid())
}

pub async fn delete_age_class<'e, E>(db: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM age_classes WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Number of lifters holding this age class as their primary class
pub async fn count_primary_age_holders<'e, E>(db: E, id: i64) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM lifters WHERE age_class_id = ?")
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Map a unique-name constraint violation to a client error
fn unique_name_error(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db_err)
            if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            Error::BadRequest("Class name already exists".to_string())
        }
        _ => Error::Database(e),
    }
}
