//! Ironmeet meet coordination service
//!
//! Coordinates a live powerlifting meet: lifter registration and
//! classification, attempt sequencing, judge scoring, and real-time fan-out
//! of every state change to connected observers.

pub mod api;
pub mod db;
pub mod error;
pub mod meet;
pub mod sse;

pub use error::{Error, Result};
