//! Sweep data types shared by the scanner, detector, verifier and navigator.

use crate::geometry::{polar_to_cartesian, Point2D};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Servo angle that points the sensor straight ahead (degrees)
pub const STRAIGHT_AHEAD_DEG: f32 = 90.0;

/// Shortest run of open readings worth verifying
pub const MIN_RUN_LENGTH: usize = 3;

/// Result of one distance measurement after range classification
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Distance {
    /// Obstacle seen at this range (cm)
    Measured(f32),
    /// Nothing within the sensor horizon, or the sensor could not tell
    OutOfRange,
}

impl Distance {
    /// Classify a raw sensor value.
    ///
    /// Negative values are sensor error codes. Values at or past the horizon
    /// count as open space.
    #[inline]
    pub fn classify(raw: f32, infinity_threshold: f32) -> Self {
        if raw.is_nan() || raw < 0.0 || raw >= infinity_threshold {
            Distance::OutOfRange
        } else {
            Distance::Measured(raw)
        }
    }

    #[inline]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Distance::OutOfRange)
    }

    /// Measured range, if any
    #[inline]
    pub fn measured(&self) -> Option<f32> {
        match self {
            Distance::Measured(d) => Some(*d),
            Distance::OutOfRange => None,
        }
    }

    /// Numeric range with `OutOfRange` pinned to the horizon.
    #[inline]
    pub fn or_horizon(&self, horizon: f32) -> f32 {
        self.measured().unwrap_or(horizon)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Measured(d) => write!(f, "{:.1}cm", d),
            Distance::OutOfRange => write!(f, "inf"),
        }
    }
}

/// One (angle, distance) sample of a sweep
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Servo angle in degrees, 0..=180
    pub angle: f32,
    pub distance: Distance,
}

impl Reading {
    #[inline]
    pub fn new(angle: f32, distance: Distance) -> Self {
        Self { angle, distance }
    }

    /// Cartesian position of the sample; open readings sit on the horizon.
    #[inline]
    pub fn project(&self, horizon: f32) -> Point2D {
        polar_to_cartesian(self.angle, self.distance.or_horizon(horizon))
    }
}

/// Ordered readings from one scan, ascending by angle
#[derive(Clone, Debug, PartialEq)]
pub struct Sweep {
    readings: Vec<Reading>,
    /// Range beyond which readings were classified as out of range (cm)
    horizon: f32,
}

impl Sweep {
    /// Wrap readings taken against the given infinity threshold.
    pub fn new(readings: Vec<Reading>, horizon: f32) -> Self {
        Self { readings, horizon }
    }

    /// Build a sweep from raw (angle, cm) pairs, classifying each value.
    pub fn from_raw(samples: &[(f32, f32)], infinity_threshold: f32) -> Self {
        let readings = samples
            .iter()
            .map(|&(angle, raw)| Reading::new(angle, Distance::classify(raw, infinity_threshold)))
            .collect();
        Self::new(readings, infinity_threshold)
    }

    #[inline]
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    #[inline]
    pub fn horizon(&self) -> f32 {
        self.horizon
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// True if angles strictly increase by `increment` (within `tolerance`).
    pub fn is_evenly_spaced(&self, increment: f32, tolerance: f32) -> bool {
        self.readings
            .windows(2)
            .all(|w| (w[1].angle - w[0].angle - increment).abs() <= tolerance)
    }
}

/// Contiguous out-of-range readings bounded by an obstacle on the far side
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateRun {
    readings: Vec<Reading>,
    horizon: f32,
}

impl CandidateRun {
    /// Returns `None` for fewer than [`MIN_RUN_LENGTH`] readings.
    pub fn new(readings: Vec<Reading>, horizon: f32) -> Option<Self> {
        if readings.len() < MIN_RUN_LENGTH {
            return None;
        }
        Some(Self { readings, horizon })
    }

    #[inline]
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    #[inline]
    pub fn first(&self) -> &Reading {
        &self.readings[0]
    }

    #[inline]
    pub fn last(&self) -> &Reading {
        &self.readings[self.readings.len() - 1]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    #[inline]
    pub fn horizon(&self) -> f32 {
        self.horizon
    }
}

/// Gap confirmed wide enough for the chassis
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerifiedGap {
    /// Midpoint of the run's boundary angles (degrees)
    pub center_angle: f32,
    /// Chord between the run's boundary readings (cm)
    pub width: f32,
}

impl VerifiedGap {
    /// Steering needed to face the gap's centre.
    #[inline]
    pub fn steering(&self) -> SteeringCommand {
        SteeringCommand::toward(self.center_angle)
    }
}

/// In-place turn issued to the drive
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SteeringCommand {
    /// Turn left by this many degrees
    Left(f32),
    /// Turn right by this many degrees
    Right(f32),
}

impl SteeringCommand {
    /// Convert a servo angle into a turn relative to straight ahead.
    ///
    /// Angles below 90° turn left, everything else turns right.
    pub fn toward(servo_angle: f32) -> Self {
        let degs = servo_angle - STRAIGHT_AHEAD_DEG;
        if degs < 0.0 {
            SteeringCommand::Left(-degs)
        } else {
            SteeringCommand::Right(degs)
        }
    }

    /// Turn magnitude in degrees
    pub fn degrees(&self) -> f32 {
        match self {
            SteeringCommand::Left(d) | SteeringCommand::Right(d) => *d,
        }
    }
}
