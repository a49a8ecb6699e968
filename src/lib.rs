//! ChidraNav - gap-finding navigation for a wheeled robot
//!
//! The platform drives forward until an obstacle is close, sweeps a
//! servo-mounted range sensor across its forward hemisphere, looks for an
//! opening wide enough for the chassis and turns toward it.
//!
//! ## Pipeline
//!
//! - [`scanning::SweepScanner`]: one averaged reading per servo step
//! - [`scanning::find_runs`]: runs of out-of-range readings closed by an obstacle
//! - [`scanning::verify`]: chord-width check against the chassis width
//! - [`navigation::Navigator`]: advance / scan / evaluate / turn loop
//!
//! Hardware is injected through [`crate::core::Actuator`] and [`crate::core::RangeSensor`];
//! [`devices::mock`] provides a simulated platform.

pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod scanning;

// Re-export commonly used types
pub use config::NavConfig;
pub use crate::core::{Actuator, Distance, RangeSensor, Reading, Sweep, VerifiedGap};
pub use error::{Error, Result};
pub use navigation::{HaltReason, NavigationOutcome, Navigator};
