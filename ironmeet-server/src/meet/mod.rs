//! Meet engine: the attempt scheduling and scoring core
//!
//! - `classify`: primary weight/age class resolution
//! - `generate`: attempt sheet generation from openers
//! - `scoring`: judge vote aggregation policies
//! - `progress`: the cursor state machine (single writer)
//! - `queue`: deterministic next-attempt selection
//! - `registration`: atomic lifter registration flow

pub mod classify;
pub mod generate;
pub mod progress;
pub mod queue;
pub mod registration;
pub mod scoring;

pub use progress::MeetController;
