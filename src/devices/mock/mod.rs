//! Mock device for hardware-free runs
//!
//! Simulates a differential-drive platform with a servo-mounted range sensor
//! in a 2D world of walls and posts.
//!
//! | Component | Simulation Method |
//! |-----------|-------------------|
//! | Range sensor | Ray cast from the platform centre along the servo direction |
//! | Drive | Advances `step_per_poll` cm per sensor read while driving |
//! | Turns | Instant in-place heading change |
//! | Faults | Gaussian range noise, negative error readings, read timeouts |
//!
//! The actuator and sensor halves share one [`SimWorld`] behind a mutex so
//! they can be handed to the navigator separately.
//!
//! # Module Structure
//!
//! - [`config`]: world and noise configuration
//! - [`world`]: pose, servo and ray casting
//! - [`noise`]: seeded noise generator

pub mod config;
mod noise;
pub mod world;

pub use config::{PostConfig, RangeNoiseConfig, SimulationConfig, WallConfig};
pub use world::{ActuatorCommand, HISTORY_CAPACITY, SimWorld};

use crate::core::{Actuator, RangeSensor};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Shared handle on the simulated world
pub type SharedWorld = Arc<Mutex<SimWorld>>;

/// Create the actuator and sensor halves of a simulated platform.
pub fn create_mock(config: SimulationConfig) -> (MockActuator, MockSensor, SharedWorld) {
    log::info!(
        "Mock platform at ({:.0}, {:.0}) heading {:.0}°, {} walls, {} posts",
        config.start_x,
        config.start_y,
        config.start_heading,
        config.walls.len(),
        config.posts.len()
    );
    let world = Arc::new(Mutex::new(SimWorld::new(config)));
    (
        MockActuator {
            world: Arc::clone(&world),
        },
        MockSensor {
            world: Arc::clone(&world),
        },
        world,
    )
}

/// Drive and servo half of the mock platform
pub struct MockActuator {
    world: SharedWorld,
}

impl MockActuator {
    fn send(&mut self, cmd: ActuatorCommand) -> Result<()> {
        log::trace!("mock actuator: {:?}", cmd);
        self.world.lock().apply(cmd);
        Ok(())
    }
}

impl Actuator for MockActuator {
    fn set_sensor_angle(&mut self, angle: f32) -> Result<()> {
        if !(0.0..=180.0).contains(&angle) {
            return Err(Error::Hardware(format!(
                "servo angle {:.1}° outside 0..=180",
                angle
            )));
        }
        self.send(ActuatorCommand::SensorAngle(angle))
    }

    fn drive_forward(&mut self) -> Result<()> {
        self.send(ActuatorCommand::DriveForward)
    }

    fn stop(&mut self) -> Result<()> {
        self.send(ActuatorCommand::Stop)
    }

    fn turn_left(&mut self, degrees: f32) -> Result<()> {
        self.send(ActuatorCommand::TurnLeft(degrees))
    }

    fn turn_right(&mut self, degrees: f32) -> Result<()> {
        self.send(ActuatorCommand::TurnRight(degrees))
    }
}

/// Range sensor half of the mock platform
pub struct MockSensor {
    world: SharedWorld,
}

impl RangeSensor for MockSensor {
    fn read_distance(&mut self, timeout: Duration) -> Result<f32> {
        self.world
            .lock()
            .measure()
            .ok_or(Error::Timeout(timeout.as_millis() as u64))
    }
}
