//! Navigation driver.
//!
//! - [`Navigator`]: advance / scan / evaluate / turn state machine
//! - [`GapSelection`]: which verified gap to steer toward

mod navigator;
mod selection;

pub use navigator::{HaltReason, NavState, NavigationOutcome, Navigator, NavigatorConfig};
pub use selection::GapSelection;
