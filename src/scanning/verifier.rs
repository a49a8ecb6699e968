//! Gap verifier.
//!
//! Measures each candidate run as the chord between its boundary readings
//! and keeps the ones the chassis fits through.

use crate::core::{CandidateRun, VerifiedGap};
use crate::geometry::chord_distance;

/// Width and centre of a run, before the chassis check.
pub fn measure(run: &CandidateRun) -> VerifiedGap {
    let first = run.first();
    let last = run.last();
    let width = chord_distance(first.project(run.horizon()), last.project(run.horizon()));
    VerifiedGap {
        center_angle: (first.angle + last.angle) / 2.0,
        width,
    }
}

/// Keep runs at least `chassis_width` wide, preserving angle order.
///
/// No margin is applied; pass a wider chassis to demand clearance.
pub fn verify<I>(runs: I, chassis_width: f32) -> Vec<VerifiedGap>
where
    I: IntoIterator<Item = CandidateRun>,
{
    runs.into_iter()
        .map(|run| measure(&run))
        .filter(|gap| {
            let fits = gap.width >= chassis_width;
            log::debug!(
                "Gap at {:.1}°: {:.1}cm wide ({})",
                gap.center_angle,
                gap.width,
                if fits { "fits" } else { "too narrow" }
            );
            fits
        })
        .collect()
}
