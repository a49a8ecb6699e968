//! Gap selection policies.

use crate::core::{STRAIGHT_AHEAD_DEG, VerifiedGap};
use serde::{Deserialize, Serialize};

/// How the navigator picks one gap out of a scan's verified gaps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapSelection {
    /// Lowest angle, i.e. the first gap the sweep found
    #[default]
    FirstFound,
    /// Largest chord width
    Widest,
    /// Centre closest to straight ahead
    StraightestAhead,
}

impl GapSelection {
    /// Pick a gap. Ties go to the lower angle.
    pub fn select(&self, gaps: &[VerifiedGap]) -> Option<VerifiedGap> {
        let mut iter = gaps.iter().copied();
        match self {
            GapSelection::FirstFound => iter.next(),
            GapSelection::Widest => iter.reduce(|best, g| if g.width > best.width { g } else { best }),
            GapSelection::StraightestAhead => iter.reduce(|best, g| {
                if off_axis(&g) < off_axis(&best) {
                    g
                } else {
                    best
                }
            }),
        }
    }
}

#[inline]
fn off_axis(gap: &VerifiedGap) -> f32 {
    (gap.center_angle - STRAIGHT_AHEAD_DEG).abs()
}
