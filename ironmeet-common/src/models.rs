//! Domain models shared between ironmeet crates
//!
//! All enums stored in SQLite as TEXT use lowercase snake_case strings;
//! `as_str`/`from_str` pairs keep the database representation in one place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The three competition lifts, in meet running order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiftType {
    Squat,
    Bench,
    Deadlift,
}

impl LiftType {
    /// All lift types in running order (squat first)
    pub const ALL: [LiftType; 3] = [LiftType::Squat, LiftType::Bench, LiftType::Deadlift];

    pub fn as_str(&self) -> &'static str {
        match self {
            LiftType::Squat => "squat",
            LiftType::Bench => "bench",
            LiftType::Deadlift => "deadlift",
        }
    }

    pub fn from_str(s: &str) -> Option<LiftType> {
        match s {
            "squat" => Some(LiftType::Squat),
            "bench" => Some(LiftType::Bench),
            "deadlift" => Some(LiftType::Deadlift),
            _ => None,
        }
    }
}

/// Lifter gender, used for weight class scoping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Gender> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Gender scope of a weight class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderScope {
    Male,
    Female,
    Both,
}

impl GenderScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenderScope::Male => "male",
            GenderScope::Female => "female",
            GenderScope::Both => "both",
        }
    }

    pub fn from_str(s: &str) -> Option<GenderScope> {
        match s {
            "male" => Some(GenderScope::Male),
            "female" => Some(GenderScope::Female),
            "both" => Some(GenderScope::Both),
            _ => None,
        }
    }

    /// Whether a lifter of the given gender falls inside this scope
    pub fn matches(&self, gender: Gender) -> bool {
        match self {
            GenderScope::Both => true,
            GenderScope::Male => gender == Gender::Male,
            GenderScope::Female => gender == Gender::Female,
        }
    }
}

/// Attempt lifecycle status
///
/// Transitions: pending -> active -> completed. An active attempt may be
/// demoted back to pending when the organizer activates a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Pending,
    Active,
    Completed,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Pending => "pending",
            AttemptStatus::Active => "active",
            AttemptStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<AttemptStatus> {
        match s {
            "pending" => Some(AttemptStatus::Pending),
            "active" => Some(AttemptStatus::Active),
            "completed" => Some(AttemptStatus::Completed),
            _ => None,
        }
    }
}

/// Three-valued judge decision
///
/// "Not yet voted" is structurally distinct from "voted fail"; the same type
/// carries an attempt's overall verdict, where `Unset` means no quorum yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Unset,
    Pass,
    Fail,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vote::Unset => "unset",
            Vote::Pass => "pass",
            Vote::Fail => "fail",
        }
    }

    pub fn from_str(s: &str) -> Option<Vote> {
        match s {
            "unset" => Some(Vote::Unset),
            "pass" => Some(Vote::Pass),
            "fail" => Some(Vote::Fail),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Vote::Unset)
    }
}

/// Registered competitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lifter {
    pub id: i64,
    /// External ID number (membership card etc.), unique per meet
    pub lifter_number: String,
    pub name: String,
    pub gender: Gender,
    /// Bodyweight at weigh-in, kg
    pub bodyweight: f64,
    pub birth_date: NaiveDate,
    pub opener_squat: Option<f64>,
    pub opener_bench: Option<f64>,
    pub opener_deadlift: Option<f64>,
    /// Primary weight class; None = unclassified (valid state, not an error)
    pub weight_class_id: Option<i64>,
    /// Primary age class; None = unclassified
    pub age_class_id: Option<i64>,
    /// Additional weight classes entered for supplementary ranking
    pub extra_weight_class_ids: Vec<i64>,
    /// Additional age classes entered for supplementary ranking
    pub extra_age_class_ids: Vec<i64>,
}

impl Lifter {
    /// Age in whole years as of `today` (calendar rule: birthday not yet
    /// reached this year counts the previous year)
    pub fn age_on(&self, today: NaiveDate) -> i64 {
        age_on(self.birth_date, today)
    }
}

/// Age in whole years of someone born on `birth_date`, as of `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    use chrono::Datelike;
    let mut age = i64::from(today.year()) - i64::from(birth_date.year());
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Registration payload for a new lifter (before classification)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLifter {
    pub lifter_number: String,
    pub name: String,
    pub gender: Gender,
    pub bodyweight: f64,
    pub birth_date: NaiveDate,
    pub opener_squat: Option<f64>,
    pub opener_bench: Option<f64>,
    pub opener_deadlift: Option<f64>,
}

/// Weight class definition
///
/// Ranges are advisory: overlapping definitions are a configuration hazard,
/// not a runtime error. Resolution picks the smallest upper bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightClass {
    pub id: i64,
    pub name: String,
    pub min_weight: f64,
    /// None = open-ended ("+" class)
    pub max_weight: Option<f64>,
    pub gender: GenderScope,
}

impl WeightClass {
    /// Whether this class's range and gender scope cover the lifter
    pub fn contains(&self, gender: Gender, bodyweight: f64) -> bool {
        self.gender.matches(gender)
            && self.min_weight <= bodyweight
            && self.max_weight.map_or(true, |max| bodyweight <= max)
    }
}

/// Age class definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeClass {
    pub id: i64,
    pub name: String,
    pub min_age: i64,
    /// None = open-ended
    pub max_age: Option<i64>,
}

impl AgeClass {
    pub fn contains(&self, age: i64) -> bool {
        self.min_age <= age && self.max_age.map_or(true, |max| age <= max)
    }
}

/// One scored try at a lift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub lifter_id: i64,
    pub lift: LiftType,
    /// Attempt number within the lift, 1..=3
    pub number: i64,
    /// Requested bar weight, kg
    pub weight: f64,
    pub status: AttemptStatus,
    pub judge1: Vote,
    pub judge2: Vote,
    pub judge3: Vote,
    /// Aggregated result; Unset until judge quorum is reached
    pub verdict: Vote,
}

impl Attempt {
    /// Vote slots in judge order
    pub fn votes(&self) -> [Vote; 3] {
        [self.judge1, self.judge2, self.judge3]
    }
}

/// New attempt row, produced by the attempt generator
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt {
    pub lifter_id: i64,
    pub lift: LiftType,
    pub number: i64,
    pub weight: f64,
}

/// Singleton meet progress cursor
///
/// Exactly one row exists; only the meet progress controller writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetCursor {
    pub lift: LiftType,
    /// Current attempt round, 1..=3
    pub attempt_number: i64,
    /// Attempt currently on the platform, if any
    pub active_attempt_id: Option<i64>,
}

impl MeetCursor {
    pub fn is_idle(&self) -> bool {
        self.active_attempt_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let born = date(1990, 6, 15);
        assert_eq!(age_on(born, date(2026, 6, 14)), 35);
        assert_eq!(age_on(born, date(2026, 6, 15)), 36);
        assert_eq!(age_on(born, date(2026, 6, 16)), 36);
    }

    #[test]
    fn test_weight_class_contains() {
        let wc = WeightClass {
            id: 1,
            name: "Women's 69kg".to_string(),
            min_weight: 63.01,
            max_weight: Some(69.0),
            gender: GenderScope::Female,
        };
        assert!(wc.contains(Gender::Female, 68.0));
        assert!(wc.contains(Gender::Female, 69.0));
        assert!(!wc.contains(Gender::Female, 69.01));
        assert!(!wc.contains(Gender::Male, 68.0));

        let open = WeightClass {
            id: 2,
            name: "Men's 120+kg".to_string(),
            min_weight: 120.01,
            max_weight: None,
            gender: GenderScope::Male,
        };
        assert!(open.contains(Gender::Male, 155.0));
        assert!(!open.contains(Gender::Male, 120.0));
    }

    #[test]
    fn test_enum_round_trips() {
        for lift in LiftType::ALL {
            assert_eq!(LiftType::from_str(lift.as_str()), Some(lift));
        }
        for vote in [Vote::Unset, Vote::Pass, Vote::Fail] {
            assert_eq!(Vote::from_str(vote.as_str()), Some(vote));
        }
        assert_eq!(LiftType::from_str("curl"), None);
    }
}
