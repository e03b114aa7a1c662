//! Classification resolver
//!
//! Maps a lifter's bodyweight/gender/age onto primary weight and age classes.
//! Resolution is a pure function over the configured class tables; "no
//! matching class" is a valid unclassified outcome, not an error.

use crate::db;
use crate::error::Result;
use chrono::Utc;
use ironmeet_common::models::{age_on, AgeClass, Gender, WeightClass};
use sqlx::SqliteConnection;
use tracing::debug;

/// Resolve the primary weight class for a lifter
///
/// Among classes whose range contains the bodyweight and whose gender scope
/// matches, the one with the smallest upper bound wins (unbounded treated as
/// +infinity, so bounded classes beat open-ended "+" classes when both
/// match). Ties break on the lower bound. Returns None when nothing matches.
pub fn resolve_weight_class(
    gender: Gender,
    bodyweight: f64,
    classes: &[WeightClass],
) -> Option<i64> {
    classes
        .iter()
        .filter(|wc| wc.contains(gender, bodyweight))
        .min_by(|a, b| {
            let a_max = a.max_weight.unwrap_or(f64::INFINITY);
            let b_max = b.max_weight.unwrap_or(f64::INFINITY);
            a_max
                .total_cmp(&b_max)
                .then(a.min_weight.total_cmp(&b.min_weight))
        })
        .map(|wc| wc.id)
}

/// Resolve the primary age class for a lifter
///
/// Same selection rule as weight classes: smallest upper bound wins,
/// unbounded last, ties broken on the lower bound.
pub fn resolve_age_class(age: i64, classes: &[AgeClass]) -> Option<i64> {
    classes
        .iter()
        .filter(|ac| ac.contains(age))
        .min_by_key(|ac| (ac.max_age.unwrap_or(i64::MAX), ac.min_age))
        .map(|ac| ac.id)
}

/// Recompute primary classes for every lifter
///
/// Runs after any class table edit, inside the caller's transaction so a
/// failed pass leaves prior classifications untouched. Returns the number of
/// lifters processed; the caller emits one aggregate broadcast rather than
/// one per lifter.
pub async fn reclassify_all(conn: &mut SqliteConnection) -> Result<u64> {
    let weight_classes = db::classes::list_weight_classes(&mut *conn).await?;
    let age_classes = db::classes::list_age_classes(&mut *conn).await?;
    let lifters = db::lifters::list_classification_rows(&mut *conn).await?;

    let today = Utc::now().date_naive();
    let count = lifters.len() as u64;

    for lifter in lifters {
        let weight_class_id =
            resolve_weight_class(lifter.gender, lifter.bodyweight, &weight_classes);
        let age = age_on(lifter.birth_date, today);
        let age_class_id = resolve_age_class(age, &age_classes);
        db::lifters::set_primary_classes(&mut *conn, lifter.id, weight_class_id, age_class_id)
            .await?;
    }

    debug!("Reclassified {} lifters", count);
    Ok(count)
}
