//! Database initialization
//!
//! Creates the meet schema idempotently at startup and seeds the cursor
//! singleton plus the default IPF weight and age class tables when the
//! database is empty.

use crate::error::Result;
use sqlx::{Pool, Sqlite};
use tracing::info;

/// Create all tables and indexes if they do not exist
pub async fn create_schema(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weight_classes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            min_weight REAL NOT NULL,
            max_weight REAL,
            gender TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS age_classes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            min_age INTEGER NOT NULL,
            max_age INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lifters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lifter_number TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            gender TEXT NOT NULL,
            bodyweight REAL NOT NULL,
            birth_date TEXT NOT NULL,
            opener_squat REAL,
            opener_bench REAL,
            opener_deadlift REAL,
            weight_class_id INTEGER REFERENCES weight_classes(id) ON DELETE SET NULL,
            age_class_id INTEGER REFERENCES age_classes(id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lifter_extra_weight_classes (
            lifter_id INTEGER NOT NULL REFERENCES lifters(id) ON DELETE CASCADE,
            weight_class_id INTEGER NOT NULL REFERENCES weight_classes(id) ON DELETE CASCADE,
            PRIMARY KEY (lifter_id, weight_class_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lifter_extra_age_classes (
            lifter_id INTEGER NOT NULL REFERENCES lifters(id) ON DELETE CASCADE,
            age_class_id INTEGER NOT NULL REFERENCES age_classes(id) ON DELETE CASCADE,
            PRIMARY KEY (lifter_id, age_class_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attempts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lifter_id INTEGER NOT NULL REFERENCES lifters(id) ON DELETE CASCADE,
            lift TEXT NOT NULL,
            number INTEGER NOT NULL,
            weight REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            judge1 TEXT NOT NULL DEFAULT 'unset',
            judge2 TEXT NOT NULL DEFAULT 'unset',
            judge3 TEXT NOT NULL DEFAULT 'unset',
            verdict TEXT NOT NULL DEFAULT 'unset',
            UNIQUE (lifter_id, lift, number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Queue selection filters on (status, lift, number)
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_attempts_queue ON attempts (status, lift, number)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meet_cursor (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            lift TEXT NOT NULL,
            attempt_number INTEGER NOT NULL,
            active_attempt_id INTEGER REFERENCES attempts(id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed the cursor singleton row
///
/// Initial state: squat, attempt 1, no active attempt.
pub async fn init_cursor(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO meet_cursor (id, lift, attempt_number, active_attempt_id) \
         VALUES (1, 'squat', 1, NULL)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Seed the default IPF weight class table when none are configured
pub async fn init_default_weight_classes(pool: &Pool<Sqlite>) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weight_classes")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    info!("Seeding default weight classes");
    let defaults: [(&str, f64, Option<f64>, &str); 16] = [
        ("Men's 59kg", 0.0, Some(59.0), "male"),
        ("Men's 66kg", 59.01, Some(66.0), "male"),
        ("Men's 74kg", 66.01, Some(74.0), "male"),
        ("Men's 83kg", 74.01, Some(83.0), "male"),
        ("Men's 93kg", 83.01, Some(93.0), "male"),
        ("Men's 105kg", 93.01, Some(105.0), "male"),
        ("Men's 120kg", 105.01, Some(120.0), "male"),
        ("Men's 120+kg", 120.01, None, "male"),
        ("Women's 47kg", 0.0, Some(47.0), "female"),
        ("Women's 52kg", 47.01, Some(52.0), "female"),
        ("Women's 57kg", 52.01, Some(57.0), "female"),
        ("Women's 63kg", 57.01, Some(63.0), "female"),
        ("Women's 69kg", 63.01, Some(69.0), "female"),
        ("Women's 76kg", 69.01, Some(76.0), "female"),
        ("Women's 84kg", 76.01, Some(84.0), "female"),
        ("Women's 84+kg", 84.01, None, "female"),
    ];

    for (name, min, max, gender) in defaults {
        sqlx::query(
            "INSERT INTO weight_classes (name, min_weight, max_weight, gender) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(min)
        .bind(max)
        .bind(gender)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Seed the default age class table when none are configured
pub async fn init_default_age_classes(pool: &Pool<Sqlite>) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM age_classes")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    info!("Seeding default age classes");
    let defaults: [(&str, i64, Option<i64>); 7] = [
        ("Sub-Junior", 14, Some(18)),
        ("Junior", 19, Some(23)),
        ("Open", 24, Some(39)),
        ("Master I", 40, Some(49)),
        ("Master II", 50, Some(59)),
        ("Master III", 60, Some(69)),
        ("Master IV", 70, None),
    ];

    for (name, min, max) in defaults {
        sqlx::query("INSERT INTO age_classes (name, min_age, max_age) VALUES (?, ?, ?)")
            .bind(name)
            .bind(min)
            .bind(max)
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Initialize all required database structures
pub async fn initialize_database(pool: &Pool<Sqlite>) -> Result<()> {
    info!("Initializing database structures");

    create_schema(pool).await?;
    init_cursor(pool).await?;
    init_default_weight_classes(pool).await?;
    init_default_age_classes(pool).await?;

    info!("Database initialization complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    async fn setup_test_db() -> Pool<Sqlite> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_database_seeds_defaults() {
        let pool = setup_test_db().await;
        initialize_database(&pool).await.unwrap();

        let wc_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weight_classes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(wc_count, 16);

        let ac_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM age_classes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(ac_count, 7);

        let cursor_lift: String = sqlx::query_scalar("SELECT lift FROM meet_cursor WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(cursor_lift, "squat");
    }

    #[tokio::test]
    async fn test_initialize_database_idempotent() {
        let pool = setup_test_db().await;
        initialize_database(&pool).await.unwrap();
        initialize_database(&pool).await.unwrap();

        let wc_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weight_classes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(wc_count, 16);

        let cursor_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meet_cursor")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(cursor_rows, 1);
    }

    #[tokio::test]
    async fn test_seed_skipped_when_classes_exist() {
        let pool = setup_test_db().await;
        create_schema(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO weight_classes (name, min_weight, max_weight, gender) \
             VALUES ('Custom', 0, NULL, 'both')",
        )
        .execute(&pool)
        .await
        .unwrap();

        init_default_weight_classes(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weight_classes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
