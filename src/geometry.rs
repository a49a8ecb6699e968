//! Planar geometry for sweep readings.
//!
//! Angles are in degrees with 0° pointing hard left of the chassis, 90°
//! straight ahead and 180° hard right, matching the servo's range. In the
//! resulting frame +X points left and +Y points forward.

use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// Point in the sensor frame (centimetres)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    /// Create a new point
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Origin of the sensor frame
    pub const ZERO: Point2D = Point2D { x: 0.0, y: 0.0 };

    /// Length of the vector from the origin
    #[inline]
    pub fn norm(&self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point2D::new(self.x - other.x, self.y - other.y)
    }
}

/// Project an (angle, distance) sample onto the sensor plane.
#[inline]
pub fn polar_to_cartesian(angle_deg: f32, distance: f32) -> Point2D {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Point2D::new(distance * cos, distance * sin)
}

/// Straight-line distance between two projected samples.
#[inline]
pub fn chord_distance(p1: Point2D, p2: Point2D) -> f32 {
    (p1 - p2).norm()
}
