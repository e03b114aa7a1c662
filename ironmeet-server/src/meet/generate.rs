//! Attempt generator
//!
//! Materializes a lifter's attempt sheet from their opening weights at
//! registration: three attempts per declared lift, opener plus a fixed
//! increment per round.

use ironmeet_common::models::{LiftType, NewAttempt};

/// Fixed weight increment between consecutive attempts, kg
pub const ATTEMPT_INCREMENT_KG: f64 = 5.0;

/// A lifter's declared opening weights; None = not entering that lift
#[derive(Debug, Clone, Copy, Default)]
pub struct Openers {
    pub squat: Option<f64>,
    pub bench: Option<f64>,
    pub deadlift: Option<f64>,
}

impl Openers {
    fn for_lift(&self, lift: LiftType) -> Option<f64> {
        match lift {
            LiftType::Squat => self.squat,
            LiftType::Bench => self.bench,
            LiftType::Deadlift => self.deadlift,
        }
    }
}

/// Generate pending attempt rows for a new lifter
///
/// For each lift with a declared opener: attempt 1 = opener, attempt 2 =
/// opener + increment, attempt 3 = opener + 2x increment. A full entry
/// yields nine rows.
pub fn generate_attempts(lifter_id: i64, openers: &Openers) -> Vec<NewAttempt> {
    let mut attempts = Vec::with_capacity(9);

    for lift in LiftType::ALL {
        let Some(opener) = openers.for_lift(lift) else {
            continue;
        };
        for number in 1..=3i64 {
            attempts.push(NewAttempt {
                lifter_id,
                lift,
                number,
                weight: opener + ATTEMPT_INCREMENT_KG * (number - 1) as f64,
            });
        }
    }

    attempts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_entry_yields_nine_attempts() {
        let openers = Openers {
            squat: Some(100.0),
            bench: Some(60.0),
            deadlift: Some(120.0),
        };
        let attempts = generate_attempts(7, &openers);
        assert_eq!(attempts.len(), 9);
        assert!(attempts.iter().all(|a| a.lifter_id == 7));
    }

    #[test]
    fn test_weights_strictly_increase_per_lift() {
        let openers = Openers {
            squat: Some(100.0),
            bench: Some(60.0),
            deadlift: Some(120.0),
        };
        let attempts = generate_attempts(1, &openers);

        for lift in LiftType::ALL {
            let weights: Vec<f64> = attempts
                .iter()
                .filter(|a| a.lift == lift)
                .map(|a| a.weight)
                .collect();
            assert_eq!(weights.len(), 3);
            assert!(weights[0] < weights[1] && weights[1] < weights[2]);
        }
    }

    #[test]
    fn test_opener_plus_fixed_increments() {
        let openers = Openers {
            squat: Some(100.0),
            ..Default::default()
        };
        let attempts = generate_attempts(1, &openers);
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[0].weight, 100.0);
        assert_eq!(attempts[1].weight, 105.0);
        assert_eq!(attempts[2].weight, 110.0);
    }

    #[test]
    fn test_missing_opener_skips_lift() {
        let openers = Openers {
            squat: Some(100.0),
            bench: None,
            deadlift: Some(120.0),
        };
        let attempts = generate_attempts(1, &openers);
        assert_eq!(attempts.len(), 6);
        assert!(attempts.iter().all(|a| a.lift != LiftType::Bench));
    }
}
