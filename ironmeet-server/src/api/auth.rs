//! Judge identity lookup
//!
//! A static mapping from a short PIN credential to a judge slot (1..=3).
//! Authentication beyond this lookup is out of scope; PINs come from the
//! service configuration and default to the printed card set.

use ironmeet_common::config::Config;
use std::collections::HashMap;

/// Static judge credential roster
#[derive(Debug, Clone)]
pub struct JudgeRoster {
    pins: HashMap<String, u8>,
}

impl JudgeRoster {
    pub fn from_config(config: &Config) -> Self {
        Self {
            pins: config.judge_pins.clone(),
        }
    }

    /// Resolve a PIN to its judge slot, if the PIN is known
    pub fn slot_for_pin(&self, pin: &str) -> Option<u8> {
        self.pins.get(pin).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lookup() {
        let roster = JudgeRoster {
            pins: HashMap::from([("1111".to_string(), 1), ("2222".to_string(), 2)]),
        };
        assert_eq!(roster.slot_for_pin("1111"), Some(1));
        assert_eq!(roster.slot_for_pin("2222"), Some(2));
        assert_eq!(roster.slot_for_pin("0000"), None);
    }
}
