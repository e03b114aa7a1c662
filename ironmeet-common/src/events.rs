//! Event types for the ironmeet broadcast system
//!
//! Every durable state mutation emits one of these; the SSE layer fans them
//! out to all connected observers (organizer console, judge panels, public
//! display). Events within one topic are delivered in emission order.

use crate::models::{Attempt, Lifter, MeetCursor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Meet broadcast event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeetEvent {
    /// Cursor position changed (lift type, attempt number, or active pointer)
    CursorUpdated {
        cursor: MeetCursor,
        timestamp: DateTime<Utc>,
    },

    /// A different attempt is on the platform (None = platform empty)
    ActiveAttemptChanged {
        attempt: Option<Attempt>,
        timestamp: DateTime<Utc>,
    },

    /// Attempt fields changed (status, votes, verdict)
    AttemptUpdated {
        attempt: Attempt,
        timestamp: DateTime<Utc>,
    },

    /// New lifter registered
    LifterAdded {
        lifter: Lifter,
        timestamp: DateTime<Utc>,
    },

    /// Lifter fields changed (class memberships)
    LifterUpdated {
        lifter: Lifter,
        timestamp: DateTime<Utc>,
    },

    /// Lifter deleted, attempts cascaded
    LifterRemoved {
        lifter_id: i64,
        timestamp: DateTime<Utc>,
    },

    /// Weight or age class definitions changed
    ClassUpdated {
        timestamp: DateTime<Utc>,
    },

    /// Aggregate notification after a class edit forced a full
    /// reclassification pass over all lifters
    LiftersReclassified {
        count: u64,
        timestamp: DateTime<Utc>,
    },
}

impl MeetEvent {
    /// SSE event name (the logical broadcast topic)
    pub fn topic(&self) -> &'static str {
        match self {
            MeetEvent::CursorUpdated { .. } => "cursor_updated",
            MeetEvent::ActiveAttemptChanged { .. } => "active_attempt_changed",
            MeetEvent::AttemptUpdated { .. } => "attempt_updated",
            MeetEvent::LifterAdded { .. } => "lifter_added",
            MeetEvent::LifterUpdated { .. } => "lifter_updated",
            MeetEvent::LifterRemoved { .. } => "lifter_removed",
            MeetEvent::ClassUpdated { .. } => "class_updated",
            MeetEvent::LiftersReclassified { .. } => "lifters_reclassified",
        }
    }

    /// Create CursorUpdated event
    pub fn cursor_updated(cursor: MeetCursor) -> Self {
        MeetEvent::CursorUpdated {
            cursor,
            timestamp: Utc::now(),
        }
    }

    /// Create ActiveAttemptChanged event
    pub fn active_attempt_changed(attempt: Option<Attempt>) -> Self {
        MeetEvent::ActiveAttemptChanged {
            attempt,
            timestamp: Utc::now(),
        }
    }

    /// Create AttemptUpdated event
    pub fn attempt_updated(attempt: Attempt) -> Self {
        MeetEvent::AttemptUpdated {
            attempt,
            timestamp: Utc::now(),
        }
    }

    /// Create LifterAdded event
    pub fn lifter_added(lifter: Lifter) -> Self {
        MeetEvent::LifterAdded {
            lifter,
            timestamp: Utc::now(),
        }
    }

    /// Create LifterUpdated event
    pub fn lifter_updated(lifter: Lifter) -> Self {
        MeetEvent::LifterUpdated {
            lifter,
            timestamp: Utc::now(),
        }
    }

    /// Create LifterRemoved event
    pub fn lifter_removed(lifter_id: i64) -> Self {
        MeetEvent::LifterRemoved {
            lifter_id,
            timestamp: Utc::now(),
        }
    }

    /// Create ClassUpdated event
    pub fn class_updated() -> Self {
        MeetEvent::ClassUpdated {
            timestamp: Utc::now(),
        }
    }

    /// Create LiftersReclassified event
    pub fn lifters_reclassified(count: u64) -> Self {
        MeetEvent::LiftersReclassified {
            count,
            timestamp: Utc::now(),
        }
    }
}
