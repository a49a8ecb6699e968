//! Core types and hardware interfaces.
//!
//! - [`Distance`], [`Reading`], [`Sweep`]: scan data with tagged out-of-range values
//! - [`CandidateRun`], [`VerifiedGap`]: detector and verifier outputs
//! - [`Actuator`], [`RangeSensor`]: injected hardware interfaces
//! - [`RetryPolicy`]: timeouts and bounded retries at the hardware boundary

pub mod driver;
pub mod types;

pub use driver::{Actuator, RangeSensor, RetryPolicy};
pub use types::{
    CandidateRun, Distance, MIN_RUN_LENGTH, Reading, STRAIGHT_AHEAD_DEG, SteeringCommand, Sweep,
    VerifiedGap,
};
