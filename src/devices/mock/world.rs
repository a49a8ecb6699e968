//! Simulated world: platform pose, servo and ray casting.

use super::config::{PostConfig, SimulationConfig, WallConfig};
use super::noise::NoiseGenerator;
use crate::core::STRAIGHT_AHEAD_DEG;
use crate::geometry::Point2D;

/// Most recent actuator commands kept in [`SimWorld::history`]
pub const HISTORY_CAPACITY: usize = 1024;

/// Command received by the mock actuator, in order
#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCommand {
    SensorAngle(f32),
    DriveForward,
    Stop,
    TurnLeft(f32),
    TurnRight(f32),
}

#[inline]
fn cross(a: Point2D, b: Point2D) -> f32 {
    a.x * b.y - a.y * b.x
}

#[inline]
fn dot(a: Point2D, b: Point2D) -> f32 {
    a.x * b.x + a.y * b.y
}

/// Ray/segment intersection distance, if the ray hits the wall.
fn hit_wall(origin: Point2D, dir: Point2D, wall: &WallConfig) -> Option<f32> {
    let a = Point2D::new(wall.from[0], wall.from[1]);
    let e = Point2D::new(wall.to[0], wall.to[1]) - a;
    let denom = cross(dir, e);
    if denom.abs() < 1e-9 {
        return None;
    }
    let ap = a - origin;
    let t = cross(ap, e) / denom;
    let u = cross(ap, dir) / denom;
    (t >= 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
}

/// Ray/circle intersection distance, if the ray hits the post.
fn hit_post(origin: Point2D, dir: Point2D, post: &PostConfig) -> Option<f32> {
    let f = origin - Point2D::new(post.center[0], post.center[1]);
    let b = dot(f, dir);
    let c = dot(f, f) - post.radius * post.radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    [-b - root, -b + root].into_iter().find(|&t| t >= 0.0)
}

/// Platform state plus the static obstacles around it
pub struct SimWorld {
    config: SimulationConfig,
    position: Point2D,
    /// Degrees CCW from +X
    heading: f32,
    servo_angle: f32,
    driving: bool,
    noise: NoiseGenerator,
    history: Vec<ActuatorCommand>,
}

impl SimWorld {
    pub fn new(config: SimulationConfig) -> Self {
        let noise = NoiseGenerator::new(config.random_seed);
        Self {
            position: Point2D::new(config.start_x, config.start_y),
            heading: config.start_heading,
            servo_angle: STRAIGHT_AHEAD_DEG,
            driving: false,
            noise,
            history: Vec::new(),
            config,
        }
    }

    pub fn position(&self) -> Point2D {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn servo_angle(&self) -> f32 {
        self.servo_angle
    }

    pub fn is_driving(&self) -> bool {
        self.driving
    }

    /// Actuator commands received so far, oldest first.
    ///
    /// Holds at most [`HISTORY_CAPACITY`] entries; older ones are dropped.
    pub fn history(&self) -> &[ActuatorCommand] {
        &self.history
    }

    pub(super) fn apply(&mut self, cmd: ActuatorCommand) {
        match cmd {
            ActuatorCommand::SensorAngle(a) => self.servo_angle = a,
            ActuatorCommand::DriveForward => self.driving = true,
            ActuatorCommand::Stop => self.driving = false,
            ActuatorCommand::TurnLeft(d) => self.heading = (self.heading + d).rem_euclid(360.0),
            ActuatorCommand::TurnRight(d) => self.heading = (self.heading - d).rem_euclid(360.0),
        }
        if self.history.len() >= HISTORY_CAPACITY {
            self.history.drain(..HISTORY_CAPACITY / 2);
        }
        self.history.push(cmd);
    }

    /// World direction the sensor currently faces (degrees CCW from +X)
    pub fn beam_direction(&self) -> f32 {
        self.heading + (STRAIGHT_AHEAD_DEG - self.servo_angle)
    }

    /// Noise-free range along a world direction, capped at `max_range`.
    pub fn ray_cast(&self, direction_deg: f32) -> f32 {
        let (sin, cos) = direction_deg.to_radians().sin_cos();
        let dir = Point2D::new(cos, sin);
        let walls = self
            .config
            .walls
            .iter()
            .filter_map(|w| hit_wall(self.position, dir, w));
        let posts = self
            .config
            .posts
            .iter()
            .filter_map(|p| hit_post(self.position, dir, p));
        walls
            .chain(posts)
            .fold(self.config.max_range, f32::min)
    }

    /// One sensor measurement. Advances the platform first if driving.
    ///
    /// Returns `None` when the simulated read times out.
    pub(super) fn measure(&mut self) -> Option<f32> {
        if self.driving {
            let (sin, cos) = self.heading.to_radians().sin_cos();
            let step = self.config.step_per_poll;
            self.position = Point2D::new(self.position.x + step * cos, self.position.y + step * sin);
        }

        let noise_cfg = self.config.noise.clone();
        if self.noise.chance(noise_cfg.timeout_rate) {
            return None;
        }
        if self.noise.chance(noise_cfg.error_rate) {
            return Some(-1.0);
        }

        let range = self.ray_cast(self.beam_direction());
        if range >= self.config.max_range {
            return Some(self.config.max_range);
        }
        let noisy = range + self.noise.gaussian(noise_cfg.range_stddev);
        Some(noisy.clamp(0.0, self.config.max_range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::config::RangeNoiseConfig;
    use approx::assert_relative_eq;

    fn ideal_default() -> SimWorld {
        SimWorld::new(SimulationConfig {
            noise: RangeNoiseConfig::ideal(),
            ..Default::default()
        })
    }

    #[test]
    fn test_wall_hit() {
        let w = WallConfig {
            from: [-10.0, 50.0],
            to: [10.0, 50.0],
        };
        let t = hit_wall(Point2D::ZERO, Point2D::new(0.0, 1.0), &w).unwrap();
        assert_relative_eq!(t, 50.0);
        assert!(hit_wall(Point2D::ZERO, Point2D::new(0.0, -1.0), &w).is_none());
        assert!(hit_wall(Point2D::ZERO, Point2D::new(1.0, 0.0), &w).is_none());
    }

    #[test]
    fn test_post_hit() {
        let p = PostConfig {
            center: [0.0, 30.0],
            radius: 5.0,
        };
        let t = hit_post(Point2D::ZERO, Point2D::new(0.0, 1.0), &p).unwrap();
        assert_relative_eq!(t, 25.0);
        assert!(hit_post(Point2D::ZERO, Point2D::new(1.0, 0.0), &p).is_none());
    }

    #[test]
    fn test_servo_maps_to_world_direction() {
        let mut world = ideal_default();
        assert_relative_eq!(world.beam_direction(), 90.0);
        world.apply(ActuatorCommand::SensorAngle(0.0));
        assert_relative_eq!(world.beam_direction(), 180.0);
        world.apply(ActuatorCommand::SensorAngle(180.0));
        assert_relative_eq!(world.beam_direction(), 0.0);
    }

    #[test]
    fn test_default_world_ranges_from_start() {
        let world = ideal_default();
        // Partition straight ahead, short wall to the left
        assert_relative_eq!(world.ray_cast(90.0), 120.0, epsilon = 1e-3);
        assert_relative_eq!(world.ray_cast(180.0), 100.0, epsilon = 1e-3);
        assert_relative_eq!(world.ray_cast(270.0), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_driving_advances_per_poll() {
        let mut world = ideal_default();
        world.apply(ActuatorCommand::DriveForward);
        let first = world.measure().unwrap();
        let second = world.measure().unwrap();
        assert_relative_eq!(first, 115.0, epsilon = 1e-3);
        assert_relative_eq!(second, 110.0, epsilon = 1e-3);

        world.apply(ActuatorCommand::Stop);
        assert_relative_eq!(world.measure().unwrap(), 110.0, epsilon = 1e-3);
        assert_relative_eq!(world.position().y, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_turns_update_heading() {
        let mut world = ideal_default();
        world.apply(ActuatorCommand::TurnLeft(45.0));
        assert_relative_eq!(world.heading(), 135.0);
        world.apply(ActuatorCommand::TurnRight(180.0));
        assert_relative_eq!(world.heading(), 315.0);
        assert_eq!(world.history().len(), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut world = ideal_default();
        for i in 0..3 * HISTORY_CAPACITY {
            world.apply(ActuatorCommand::SensorAngle((i % 180) as f32));
        }
        world.apply(ActuatorCommand::Stop);

        let history = world.history();
        assert!(history.len() <= HISTORY_CAPACITY);
        assert_eq!(history.last(), Some(&ActuatorCommand::Stop));
        assert_eq!(
            history[history.len() - 2],
            ActuatorCommand::SensorAngle(((3 * HISTORY_CAPACITY - 1) % 180) as f32)
        );
    }

    #[test]
    fn test_fault_injection() {
        let mut world = SimWorld::new(SimulationConfig {
            noise: RangeNoiseConfig {
                range_stddev: 0.0,
                error_rate: 1.0,
                timeout_rate: 0.0,
            },
            ..Default::default()
        });
        assert_eq!(world.measure(), Some(-1.0));

        world.config.noise.timeout_rate = 1.0;
        assert_eq!(world.measure(), None);
    }
}
