//! Device implementations

pub mod mock;

use crate::config::DeviceConfig;
use crate::core::{Actuator, RangeSensor};
use crate::error::{Error, Result};

/// Hardware handles produced by [`create_device`]
pub struct DeviceHandles {
    pub actuator: Box<dyn Actuator + Send>,
    pub sensor: Box<dyn RangeSensor + Send>,
}

/// Create a device based on configuration
pub fn create_device(config: &DeviceConfig) -> Result<DeviceHandles> {
    match config.device_type.as_str() {
        "mock" => {
            let (actuator, sensor, _world) = mock::create_mock(config.simulation.clone());
            Ok(DeviceHandles {
                actuator: Box::new(actuator),
                sensor: Box::new(sensor),
            })
        }
        _ => Err(Error::UnknownDevice(config.device_type.clone())),
    }
}
