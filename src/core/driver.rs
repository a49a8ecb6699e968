//! Hardware interfaces consumed by the navigation core.
//!
//! Implementations are handed to the scanner and navigator explicitly so the
//! pipeline can run against real hardware, the mock device, or scripted fakes.

use crate::error::Result;
use std::time::Duration;

/// Drive motors and sensor servo
///
/// Every call blocks until the command is issued or the motion completes.
pub trait Actuator {
    /// Point the distance sensor at a servo angle (degrees, 0..=180)
    fn set_sensor_angle(&mut self, angle: f32) -> Result<()>;

    /// Start driving straight ahead until `stop` is called
    fn drive_forward(&mut self) -> Result<()>;

    /// Stop both drive motors
    fn stop(&mut self) -> Result<()>;

    /// Rotate in place to the left by `degrees`
    fn turn_left(&mut self, degrees: f32) -> Result<()>;

    /// Rotate in place to the right by `degrees`
    fn turn_right(&mut self, degrees: f32) -> Result<()>;
}

/// Ranging sensor mounted on the servo
pub trait RangeSensor {
    /// Take one raw measurement in centimetres.
    ///
    /// A negative value is the sensor's own error code. `Err` means the
    /// interface itself failed (timeout, disconnect).
    fn read_distance(&mut self, timeout: Duration) -> Result<f32>;
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn set_sensor_angle(&mut self, angle: f32) -> Result<()> {
        (**self).set_sensor_angle(angle)
    }

    fn drive_forward(&mut self) -> Result<()> {
        (**self).drive_forward()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn turn_left(&mut self, degrees: f32) -> Result<()> {
        (**self).turn_left(degrees)
    }

    fn turn_right(&mut self, degrees: f32) -> Result<()> {
        (**self).turn_right(degrees)
    }
}

impl<T: RangeSensor + ?Sized> RangeSensor for Box<T> {
    fn read_distance(&mut self, timeout: Duration) -> Result<f32> {
        (**self).read_distance(timeout)
    }
}

/// Timeout and bounded retry applied at the hardware boundary
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Per-call timeout passed to the sensor
    pub read_timeout: Duration,
    /// Extra attempts after the first one fails transiently
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(15),
            max_retries: 2,
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails permanently, or retries run out.
    ///
    /// Only errors for which [`crate::Error::is_transient`] holds are retried.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    log::debug!(
                        "{} failed ({}), retry {}/{}",
                        what,
                        e,
                        attempt,
                        self.max_retries
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Read the sensor with this policy's timeout and retries.
    pub fn read_distance<S: RangeSensor + ?Sized>(&self, sensor: &mut S) -> Result<f32> {
        let timeout = self.read_timeout;
        self.run("read_distance", || sensor.read_distance(timeout))
    }

    /// Move the servo with retries. Repeating a servo move is harmless.
    pub fn set_sensor_angle<A: Actuator + ?Sized>(&self, actuator: &mut A, angle: f32) -> Result<()> {
        self.run("set_sensor_angle", || actuator.set_sensor_angle(angle))
    }
}
