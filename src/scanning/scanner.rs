//! Sweep scanner.
//!
//! Steps the sensor servo across the forward hemisphere and records one
//! averaged reading per step.

use crate::core::{Actuator, Distance, RangeSensor, Reading, RetryPolicy, Sweep};
use crate::error::{Error, Result};

/// Angular step fine enough that a chassis-wide gap at the stop distance
/// always spans more than one sample.
///
/// `degrees(atan(chassis_width / stop_distance)) / 2`
pub fn scan_increment(chassis_width: f32, stop_distance: f32) -> f32 {
    (chassis_width / stop_distance).atan().to_degrees() / 2.0
}

/// Parameters for one sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanParams {
    /// First servo angle (degrees)
    pub start_angle: f32,
    /// Last servo angle; never overshot (degrees)
    pub end_angle: f32,
    /// Servo step between readings (degrees)
    pub increment: f32,
    /// Raw measurements averaged per step
    pub samples_per_step: u32,
    /// Raw values at or beyond this range are out of range (cm)
    pub infinity_threshold: f32,
}

impl ScanParams {
    /// Servo angles visited by a sweep, ascending and never past `end_angle`.
    pub fn angles(&self) -> impl Iterator<Item = f32> + '_ {
        // Tolerate float error so an end angle that is an exact multiple
        // of the increment is still visited, then clamp the last step.
        let span = self.end_angle - self.start_angle;
        let steps = if span < 0.0 || self.increment <= 0.0 {
            0
        } else {
            (span / self.increment + 1e-3).floor() as usize + 1
        };
        (0..steps).map(move |i| (self.start_angle + i as f32 * self.increment).min(self.end_angle))
    }

    fn validate(&self) -> Result<()> {
        if self.increment.is_nan() || self.increment <= 0.0 {
            return Err(Error::Config(format!(
                "scan increment must be positive, got {}",
                self.increment
            )));
        }
        if self.samples_per_step == 0 {
            return Err(Error::Config("samples_per_step must be at least 1".into()));
        }
        if !self.start_angle.is_finite() || !self.end_angle.is_finite() {
            return Err(Error::Config(format!(
                "sweep angles must be finite, got {}..{}",
                self.start_angle, self.end_angle
            )));
        }
        if self.end_angle < self.start_angle {
            return Err(Error::Config(format!(
                "end angle {} is before start angle {}",
                self.end_angle, self.start_angle
            )));
        }
        Ok(())
    }
}

/// Average classified samples into one distance.
///
/// Out-of-range samples weigh in at the threshold. Only an all-out-of-range
/// step stays out of range.
pub fn average_samples(samples: &[Distance], infinity_threshold: f32) -> Distance {
    if samples.is_empty() || samples.iter().all(Distance::is_out_of_range) {
        return Distance::OutOfRange;
    }
    let sum: f32 = samples
        .iter()
        .map(|d| d.or_horizon(infinity_threshold))
        .sum();
    Distance::Measured(sum / samples.len() as f32)
}

/// Drives the servo and sensor through one sweep.
pub struct SweepScanner {
    params: ScanParams,
    retry: RetryPolicy,
}

impl SweepScanner {
    pub fn new(params: ScanParams, retry: RetryPolicy) -> Self {
        Self { params, retry }
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Sweep from start to end angle and return the readings.
    ///
    /// The servo is left at the last scanned angle. A step whose hardware
    /// calls fail transiently is recorded as out of range. Permanent
    /// failures abort the sweep.
    pub fn scan<A, S>(&self, actuator: &mut A, sensor: &mut S) -> Result<Sweep>
    where
        A: Actuator + ?Sized,
        S: RangeSensor + ?Sized,
    {
        self.params.validate()?;

        let mut readings = Vec::new();
        for angle in self.params.angles() {
            let distance = match self.sample_step(actuator, sensor, angle) {
                Ok(d) => d,
                Err(e) if e.is_transient() => {
                    log::warn!("Scan step at {:.1}° failed ({}), treating as open", angle, e);
                    Distance::OutOfRange
                }
                Err(e) => return Err(e),
            };
            log::trace!("{:.1}° -> {}", angle, distance);
            readings.push(Reading::new(angle, distance));
        }

        log::debug!(
            "Sweep {:.1}°..{:.1}° step {:.2}°: {} readings, {} open",
            self.params.start_angle,
            self.params.end_angle,
            self.params.increment,
            readings.len(),
            readings.iter().filter(|r| r.distance.is_out_of_range()).count()
        );

        Ok(Sweep::new(readings, self.params.infinity_threshold))
    }

    fn sample_step<A, S>(&self, actuator: &mut A, sensor: &mut S, angle: f32) -> Result<Distance>
    where
        A: Actuator + ?Sized,
        S: RangeSensor + ?Sized,
    {
        self.retry.set_sensor_angle(actuator, angle)?;

        let threshold = self.params.infinity_threshold;
        let mut samples = Vec::with_capacity(self.params.samples_per_step as usize);
        for _ in 0..self.params.samples_per_step {
            let raw = self.retry.read_distance(sensor)?;
            samples.push(Distance::classify(raw, threshold));
        }
        Ok(average_samples(&samples, threshold))
    }
}
