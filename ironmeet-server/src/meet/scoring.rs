//! Verdict aggregation
//!
//! Combines up to three independent judge votes into one pass/fail result.
//! The evaluation itself is pure; recording votes and finalizing attempts
//! happens in the meet progress controller, which serializes the
//! read-aggregate-write sequence.

use ironmeet_common::config::VerdictPolicy;
use ironmeet_common::models::Vote;

/// Evaluate the vote slots under the given quorum policy
///
/// Returns `Some(Vote::Pass)` or `Some(Vote::Fail)` once the policy's quorum
/// is reached, `None` while the verdict is still undecided. Never returns
/// `Some(Vote::Unset)`.
pub fn evaluate(votes: [Vote; 3], policy: VerdictPolicy) -> Option<Vote> {
    let passes = votes.iter().filter(|v| **v == Vote::Pass).count();
    let fails = votes.iter().filter(|v| **v == Vote::Fail).count();

    match policy {
        VerdictPolicy::WaitForThree => {
            if passes + fails < 3 {
                return None;
            }
            Some(if passes >= 2 { Vote::Pass } else { Vote::Fail })
        }
        VerdictPolicy::MajorityOfVoted => {
            if passes + fails < 2 || passes == fails {
                return None;
            }
            Some(if passes > fails { Vote::Pass } else { Vote::Fail })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Vote::{Fail, Pass, Unset};

    #[test]
    fn test_wait_for_three_needs_all_slots() {
        let policy = VerdictPolicy::WaitForThree;
        assert_eq!(evaluate([Unset, Unset, Unset], policy), None);
        assert_eq!(evaluate([Pass, Unset, Unset], policy), None);
        // Two votes, even unanimous, never decide under the strict policy
        assert_eq!(evaluate([Pass, Pass, Unset], policy), None);
        assert_eq!(evaluate([Fail, Fail, Unset], policy), None);
    }

    #[test]
    fn test_wait_for_three_majority() {
        let policy = VerdictPolicy::WaitForThree;
        assert_eq!(evaluate([Pass, Pass, Fail], policy), Some(Pass));
        assert_eq!(evaluate([Fail, Fail, Pass], policy), Some(Fail));
        assert_eq!(evaluate([Pass, Pass, Pass], policy), Some(Pass));
        assert_eq!(evaluate([Fail, Fail, Fail], policy), Some(Fail));
    }

    #[test]
    fn test_wait_for_three_is_order_independent() {
        let policy = VerdictPolicy::WaitForThree;
        // Same multiset of votes in every slot arrangement
        for votes in [
            [Pass, Pass, Fail],
            [Pass, Fail, Pass],
            [Fail, Pass, Pass],
        ] {
            assert_eq!(evaluate(votes, policy), Some(Pass));
        }
    }

    #[test]
    fn test_majority_of_voted_decides_at_two() {
        let policy = VerdictPolicy::MajorityOfVoted;
        assert_eq!(evaluate([Pass, Pass, Unset], policy), Some(Pass));
        assert_eq!(evaluate([Fail, Unset, Fail], policy), Some(Fail));
        // Split with two votes stays undecided until the third arrives
        assert_eq!(evaluate([Pass, Fail, Unset], policy), None);
        assert_eq!(evaluate([Pass, Fail, Fail], policy), Some(Fail));
        assert_eq!(evaluate([Pass, Unset, Unset], policy), None);
    }
}
