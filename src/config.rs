//! Configuration loading for ChidraNav
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working setup against the mock device.
//!
//! ```toml
//! [navigation]
//! stop_distance = 20.0
//! infinity_threshold = 250.0
//! samples_per_step = 2
//! chassis_width = 15.0
//! max_cycles = 3
//! gap_selection = "first_found"
//!
//! [hardware]
//! read_timeout_ms = 15
//! max_retries = 2
//!
//! [device]
//! type = "mock"
//!
//! [logging]
//! level = "info"
//! ```

use crate::core::RetryPolicy;
use crate::devices::mock::SimulationConfig;
use crate::error::{Error, Result};
use crate::navigation::{GapSelection, NavigatorConfig};
use crate::scanning::{ScanParams, scan_increment};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct NavConfig {
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gap-finding and drive loop parameters
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NavigationConfig {
    /// Stop advancing when an obstacle is closer than this (cm)
    #[serde(default = "default_stop_distance")]
    pub stop_distance: f32,

    /// Readings at or beyond this range count as open space (cm)
    #[serde(default = "default_infinity_threshold")]
    pub infinity_threshold: f32,

    /// Raw measurements averaged per sweep step
    #[serde(default = "default_samples_per_step")]
    pub samples_per_step: u32,

    /// Narrowest gap the chassis passes through (cm)
    #[serde(default = "default_chassis_width")]
    pub chassis_width: f32,

    /// Maximum advance/scan/turn cycles
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,

    /// First sweep angle (degrees)
    #[serde(default)]
    pub start_angle: f32,

    /// Last sweep angle (degrees)
    #[serde(default = "default_end_angle")]
    pub end_angle: f32,

    /// Delay between distance polls while advancing (ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Stop advancing after this many polls even without an obstacle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_advance_polls: Option<u32>,

    /// Which verified gap to steer toward
    #[serde(default)]
    pub gap_selection: GapSelection,
}

/// Hardware call limits
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct HardwareConfig {
    /// Timeout passed to every distance read (ms)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Retries after a transient read or servo failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Device selection
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Device type ("mock")
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,

    #[serde(default = "default_device_name")]
    pub name: String,

    /// World for the mock device
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_stop_distance() -> f32 {
    20.0
}
fn default_infinity_threshold() -> f32 {
    250.0
}
fn default_samples_per_step() -> u32 {
    2
}
fn default_chassis_width() -> f32 {
    15.0
}
fn default_max_cycles() -> u32 {
    3
}
fn default_end_angle() -> f32 {
    180.0
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_read_timeout_ms() -> u64 {
    15
}
fn default_max_retries() -> u32 {
    2
}
fn default_device_type() -> String {
    "mock".to_string()
}
fn default_device_name() -> String {
    "Mock rover".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            stop_distance: default_stop_distance(),
            infinity_threshold: default_infinity_threshold(),
            samples_per_step: default_samples_per_step(),
            chassis_width: default_chassis_width(),
            max_cycles: default_max_cycles(),
            start_angle: 0.0,
            end_angle: default_end_angle(),
            poll_interval_ms: default_poll_interval_ms(),
            max_advance_polls: None,
            gap_selection: GapSelection::default(),
        }
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            name: default_device_name(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl NavConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config: NavConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let nav = &self.navigation;
        let positive = [
            ("stop_distance", nav.stop_distance),
            ("infinity_threshold", nav.infinity_threshold),
            ("chassis_width", nav.chassis_width),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(Error::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        if nav.samples_per_step == 0 {
            return Err(Error::Config("samples_per_step must be at least 1".into()));
        }
        if !nav.start_angle.is_finite()
            || !nav.end_angle.is_finite()
            || nav.start_angle < 0.0
            || nav.end_angle > 180.0
            || nav.start_angle >= nav.end_angle
        {
            return Err(Error::Config(format!(
                "sweep {}°..{}° must lie within 0..=180 and be non-empty",
                nav.start_angle, nav.end_angle
            )));
        }
        if nav.stop_distance >= nav.infinity_threshold {
            return Err(Error::Config(format!(
                "stop_distance {} must be below infinity_threshold {}",
                nav.stop_distance, nav.infinity_threshold
            )));
        }
        Ok(())
    }

    /// Sweep step derived from chassis width and stop distance (degrees)
    pub fn scan_increment(&self) -> f32 {
        scan_increment(self.navigation.chassis_width, self.navigation.stop_distance)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            read_timeout: Duration::from_millis(self.hardware.read_timeout_ms),
            max_retries: self.hardware.max_retries,
        }
    }

    pub fn scan_params(&self) -> ScanParams {
        ScanParams {
            start_angle: self.navigation.start_angle,
            end_angle: self.navigation.end_angle,
            increment: self.scan_increment(),
            samples_per_step: self.navigation.samples_per_step,
            infinity_threshold: self.navigation.infinity_threshold,
        }
    }

    /// Settings for [`crate::navigation::Navigator`]
    pub fn navigator_config(&self) -> NavigatorConfig {
        let nav = &self.navigation;
        NavigatorConfig {
            stop_distance: nav.stop_distance,
            chassis_width: nav.chassis_width,
            max_cycles: nav.max_cycles,
            poll_interval: Duration::from_millis(nav.poll_interval_ms),
            max_advance_polls: nav.max_advance_polls,
            selection: nav.gap_selection,
            scan: self.scan_params(),
            retry: self.retry_policy(),
        }
    }
}
