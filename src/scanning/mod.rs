//! Gap-finding pipeline.
//!
//! ```text
//! SweepScanner::scan ──▶ Sweep ──▶ find_runs ──▶ CandidateRun* ──▶ verify ──▶ VerifiedGap*
//! ```

mod detector;
mod scanner;
mod verifier;

pub use detector::{MIN_RUN_LENGTH, find_runs};
pub use scanner::{ScanParams, SweepScanner, average_samples, scan_increment};
pub use verifier::{measure, verify};

use crate::core::{Sweep, VerifiedGap};

/// Detector followed by verifier.
pub fn find_gaps(sweep: &Sweep, chassis_width: f32) -> Vec<VerifiedGap> {
    verify(find_runs(sweep), chassis_width)
}
