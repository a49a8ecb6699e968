//! Navigation state machine.
//!
//! Drives forward until an obstacle is close, scans for a gap, turns toward
//! it and repeats, up to a fixed number of cycles.
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//!      Advancing ──▶ Scanning ──▶ Evaluating ──▶ Turning ───┘
//!            │                        │
//!            │ budget / cancel        │ no gap
//!            ▼                        ▼
//!          Halted ◀───────────────────┘
//! ```

use super::selection::GapSelection;
use crate::core::{
    Actuator, Distance, RangeSensor, RetryPolicy, STRAIGHT_AHEAD_DEG, SteeringCommand, Sweep,
    VerifiedGap,
};
use crate::error::Result;
use crate::scanning::{ScanParams, SweepScanner, find_gaps};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Navigator settings
#[derive(Clone, Debug, PartialEq)]
pub struct NavigatorConfig {
    /// Stop advancing when an obstacle is closer than this (cm)
    pub stop_distance: f32,
    /// Narrowest gap the chassis fits through (cm)
    pub chassis_width: f32,
    /// Upper bound on advance/scan/turn cycles
    pub max_cycles: u32,
    /// Delay between distance polls while advancing
    pub poll_interval: Duration,
    /// Give up advancing after this many polls without an obstacle
    pub max_advance_polls: Option<u32>,
    /// Gap picked when a scan finds several
    pub selection: GapSelection,
    /// Sweep parameters
    pub scan: ScanParams,
    /// Hardware timeout and retry policy
    pub retry: RetryPolicy,
}

/// Why navigation stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// A scan found no gap wide enough
    NoViableGap,
    /// `max_cycles` cycles completed
    CycleBudgetExhausted,
    /// Shutdown was requested between cycles
    Cancelled,
}

/// Navigator state
#[derive(Clone, Debug, PartialEq)]
pub enum NavState {
    Advancing,
    Scanning,
    Evaluating(Sweep),
    Turning(VerifiedGap),
    Halted(HaltReason),
}

impl NavState {
    pub fn is_halted(&self) -> bool {
        self.halt_reason().is_some()
    }

    /// Why navigation stopped, once halted
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self {
            NavState::Halted(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Summary returned when the navigator halts
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigationOutcome {
    pub reason: HaltReason,
    /// Cycles started, including one that ended in a halt
    pub cycles: u32,
    /// Most recent gap turned toward
    pub last_gap: Option<VerifiedGap>,
}

/// Gap-seeking navigator over injected hardware
pub struct Navigator<A, S> {
    config: NavigatorConfig,
    scanner: SweepScanner,
    actuator: A,
    sensor: S,
    state: NavState,
    cycles: u32,
    last_gap: Option<VerifiedGap>,
    running: Option<Arc<AtomicBool>>,
}

impl<A: Actuator, S: RangeSensor> Navigator<A, S> {
    pub fn new(config: NavigatorConfig, actuator: A, sensor: S) -> Self {
        let scanner = SweepScanner::new(config.scan, config.retry);
        Self {
            config,
            scanner,
            actuator,
            sensor,
            state: NavState::Advancing,
            cycles: 0,
            last_gap: None,
            running: None,
        }
    }

    /// Halt at the next cycle boundary once `running` is cleared.
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Return the hardware handles.
    pub fn into_parts(self) -> (A, S) {
        (self.actuator, self.sensor)
    }

    /// Run cycles until halted.
    ///
    /// Hardware faults that survive retries are returned as `Err`; halting
    /// for any [`HaltReason`] is `Ok`.
    pub fn run(&mut self) -> Result<NavigationOutcome> {
        log::info!(
            "Navigation started: up to {} cycles, stop at {:.1}cm, chassis {:.1}cm",
            self.config.max_cycles,
            self.config.stop_distance,
            self.config.chassis_width
        );

        let reason = loop {
            if let Some(reason) = self.state.halt_reason() {
                break reason;
            }
            self.step()?;
        };
        log::info!("Navigation halted after {} cycle(s): {:?}", self.cycles, reason);

        Ok(NavigationOutcome {
            reason,
            cycles: self.cycles,
            last_gap: self.last_gap,
        })
    }

    /// Perform the current state's work and move to the next state.
    pub fn step(&mut self) -> Result<&NavState> {
        let state = std::mem::replace(&mut self.state, NavState::Advancing);
        self.state = match state {
            NavState::Advancing => {
                if let Some(reason) = self.boundary_halt() {
                    NavState::Halted(reason)
                } else {
                    self.cycles += 1;
                    log::info!("Cycle {}/{}: advancing", self.cycles, self.config.max_cycles);
                    self.advance()?;
                    NavState::Scanning
                }
            }
            NavState::Scanning => {
                let sweep = self.scanner.scan(&mut self.actuator, &mut self.sensor)?;
                NavState::Evaluating(sweep)
            }
            NavState::Evaluating(sweep) => {
                let gaps = find_gaps(&sweep, self.config.chassis_width);
                log::info!(
                    "Found {} gap(s) at least {:.1}cm wide",
                    gaps.len(),
                    self.config.chassis_width
                );
                match self.config.selection.select(&gaps) {
                    Some(gap) => NavState::Turning(gap),
                    None => NavState::Halted(HaltReason::NoViableGap),
                }
            }
            NavState::Turning(gap) => {
                self.turn_to(&gap)?;
                self.last_gap = Some(gap);
                NavState::Advancing
            }
            halted @ NavState::Halted(_) => halted,
        };
        Ok(&self.state)
    }

    /// Checked only between cycles.
    fn boundary_halt(&self) -> Option<HaltReason> {
        if let Some(running) = &self.running
            && !running.load(Ordering::Relaxed)
        {
            return Some(HaltReason::Cancelled);
        }
        if self.cycles >= self.config.max_cycles {
            return Some(HaltReason::CycleBudgetExhausted);
        }
        None
    }

    fn advance(&mut self) -> Result<()> {
        let retry = self.config.retry;
        retry.set_sensor_angle(&mut self.actuator, STRAIGHT_AHEAD_DEG)?;
        self.actuator.drive_forward()?;

        if let Err(e) = self.poll_until_blocked() {
            log::error!("Distance polling failed while driving: {}", e);
            if let Err(stop_err) = self.actuator.stop() {
                log::error!("Failed to stop drive: {}", stop_err);
            }
            return Err(e);
        }

        self.actuator.stop()
    }

    fn poll_until_blocked(&mut self) -> Result<()> {
        let threshold = self.config.scan.infinity_threshold;
        let mut polls: u32 = 0;
        loop {
            let ahead = match self.config.retry.read_distance(&mut self.sensor) {
                Ok(raw) => Distance::classify(raw, threshold),
                Err(e) if e.is_transient() => {
                    log::warn!("Distance poll failed ({}), continuing", e);
                    Distance::OutOfRange
                }
                Err(e) => return Err(e),
            };
            polls += 1;

            if let Distance::Measured(d) = ahead
                && d < self.config.stop_distance
            {
                log::info!("Obstacle at {:.1}cm after {} poll(s), stopping", d, polls);
                return Ok(());
            }

            if let Some(limit) = self.config.max_advance_polls
                && polls >= limit
            {
                log::warn!("No obstacle after {} polls, stopping to scan", polls);
                return Ok(());
            }

            if !self.config.poll_interval.is_zero() {
                std::thread::sleep(self.config.poll_interval);
            }
        }
    }

    fn turn_to(&mut self, gap: &VerifiedGap) -> Result<()> {
        let cmd = gap.steering();
        log::info!(
            "Turning toward gap at {:.1}° ({:.1}cm wide): {:?}",
            gap.center_angle,
            gap.width,
            cmd
        );
        match cmd {
            SteeringCommand::Left(deg) => self.actuator.turn_left(deg),
            SteeringCommand::Right(deg) => self.actuator.turn_right(deg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Debug, PartialEq)]
    enum Cmd {
        Servo(f32),
        Forward,
        Stop,
        Left(f32),
        Right(f32),
    }

    type Profile = Box<dyn Fn(f32) -> f32>;

    /// Scripted platform: close obstacle while driving, per-cycle scan profile otherwise.
    struct FakeWorld {
        servo: f32,
        driving: bool,
        turns: usize,
        profiles: Vec<Profile>,
        ahead_while_driving: f32,
        disconnect_while_driving: bool,
        log: Vec<Cmd>,
    }

    impl FakeWorld {
        fn shared(profiles: Vec<Profile>) -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                servo: 90.0,
                driving: false,
                turns: 0,
                profiles,
                ahead_while_driving: 10.0,
                disconnect_while_driving: false,
                log: Vec::new(),
            }))
        }
    }

    struct FakeActuator(Rc<RefCell<FakeWorld>>);
    struct FakeSensor(Rc<RefCell<FakeWorld>>);

    impl Actuator for FakeActuator {
        fn set_sensor_angle(&mut self, angle: f32) -> Result<()> {
            let mut w = self.0.borrow_mut();
            w.servo = angle;
            w.log.push(Cmd::Servo(angle));
            Ok(())
        }
        fn drive_forward(&mut self) -> Result<()> {
            let mut w = self.0.borrow_mut();
            w.driving = true;
            w.log.push(Cmd::Forward);
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            let mut w = self.0.borrow_mut();
            w.driving = false;
            w.log.push(Cmd::Stop);
            Ok(())
        }
        fn turn_left(&mut self, degrees: f32) -> Result<()> {
            let mut w = self.0.borrow_mut();
            w.turns += 1;
            w.log.push(Cmd::Left(degrees));
            Ok(())
        }
        fn turn_right(&mut self, degrees: f32) -> Result<()> {
            let mut w = self.0.borrow_mut();
            w.turns += 1;
            w.log.push(Cmd::Right(degrees));
            Ok(())
        }
    }

    impl RangeSensor for FakeSensor {
        fn read_distance(&mut self, _timeout: Duration) -> Result<f32> {
            let w = self.0.borrow();
            if w.driving {
                if w.disconnect_while_driving {
                    return Err(Error::Disconnected("sensor bus".into()));
                }
                return Ok(w.ahead_while_driving);
            }
            let idx = w.turns.min(w.profiles.len() - 1);
            Ok((w.profiles[idx])(w.servo))
        }
    }

    fn config(max_cycles: u32) -> NavigatorConfig {
        NavigatorConfig {
            stop_distance: 20.0,
            chassis_width: 15.0,
            max_cycles,
            poll_interval: Duration::ZERO,
            max_advance_polls: None,
            selection: GapSelection::FirstFound,
            scan: ScanParams {
                start_angle: 0.0,
                end_angle: 180.0,
                increment: 10.0,
                samples_per_step: 1,
                infinity_threshold: 250.0,
            },
            retry: RetryPolicy::default(),
        }
    }

    fn navigator(
        config: NavigatorConfig,
        world: &Rc<RefCell<FakeWorld>>,
    ) -> Navigator<FakeActuator, FakeSensor> {
        Navigator::new(
            config,
            FakeActuator(Rc::clone(world)),
            FakeSensor(Rc::clone(world)),
        )
    }

    fn walled() -> Profile {
        Box::new(|_| 60.0)
    }

    /// Open between `lo` and `hi` degrees inclusive
    fn opening(lo: f32, hi: f32) -> Profile {
        Box::new(move |a| if a >= lo && a <= hi { 300.0 } else { 60.0 })
    }

    fn turns(world: &Rc<RefCell<FakeWorld>>) -> Vec<Cmd> {
        world
            .borrow()
            .log
            .iter()
            .filter(|c| matches!(c, Cmd::Left(_) | Cmd::Right(_)))
            .cloned()
            .collect()
    }

    #[test]
    fn test_no_gap_halts_after_first_cycle() {
        let world = FakeWorld::shared(vec![walled()]);
        let mut nav = navigator(config(3), &world);

        let outcome = nav.run().unwrap();
        assert_eq!(outcome.reason, HaltReason::NoViableGap);
        assert_eq!(outcome.cycles, 1);
        assert_eq!(outcome.last_gap, None);
        assert!(turns(&world).is_empty());
    }

    #[test]
    fn test_cycle_budget_exhausted() {
        let world = FakeWorld::shared(vec![opening(0.0, 40.0)]);
        let mut nav = navigator(config(3), &world);

        let outcome = nav.run().unwrap();
        assert_eq!(outcome.reason, HaltReason::CycleBudgetExhausted);
        assert_eq!(outcome.cycles, 3);
        assert_eq!(turns(&world), vec![Cmd::Left(70.0); 3]);
        assert_eq!(outcome.last_gap.map(|g| g.center_angle), Some(20.0));
    }

    #[test]
    fn test_first_found_gap_is_chosen() {
        // Narrower gap on the left comes first in the sweep
        let world = FakeWorld::shared(vec![Box::new(|a| {
            if (20.0..=40.0).contains(&a) || (100.0..=160.0).contains(&a) {
                300.0
            } else {
                60.0
            }
        })]);
        let mut nav = navigator(config(1), &world);

        let outcome = nav.run().unwrap();
        assert_eq!(outcome.last_gap.map(|g| g.center_angle), Some(30.0));
        assert_eq!(turns(&world), vec![Cmd::Left(60.0)]);
    }

    #[test]
    fn test_widest_selection_turns_right() {
        let world = FakeWorld::shared(vec![Box::new(|a| {
            if (20.0..=40.0).contains(&a) || (100.0..=160.0).contains(&a) {
                300.0
            } else {
                60.0
            }
        })]);
        let mut cfg = config(1);
        cfg.selection = GapSelection::Widest;
        let mut nav = navigator(cfg, &world);

        nav.run().unwrap();
        assert_eq!(turns(&world), vec![Cmd::Right(40.0)]);
    }

    #[test]
    fn test_gap_running_off_sweep_edge_is_ignored() {
        let world = FakeWorld::shared(vec![opening(140.0, 180.0)]);
        let mut nav = navigator(config(3), &world);

        let outcome = nav.run().unwrap();
        assert_eq!(outcome.reason, HaltReason::NoViableGap);
    }

    #[test]
    fn test_state_sequence() {
        let world = FakeWorld::shared(vec![opening(0.0, 40.0), walled()]);
        let mut nav = navigator(config(5), &world);

        assert_eq!(nav.state(), &NavState::Advancing);
        assert_eq!(nav.step().unwrap(), &NavState::Scanning);
        assert!(matches!(nav.step().unwrap(), NavState::Evaluating(_)));
        assert!(matches!(nav.step().unwrap(), NavState::Turning(_)));
        assert_eq!(nav.step().unwrap(), &NavState::Advancing);
        assert_eq!(nav.step().unwrap(), &NavState::Scanning);
        assert!(matches!(nav.step().unwrap(), NavState::Evaluating(_)));
        assert_eq!(
            nav.step().unwrap(),
            &NavState::Halted(HaltReason::NoViableGap)
        );
        // Terminal
        assert_eq!(
            nav.step().unwrap(),
            &NavState::Halted(HaltReason::NoViableGap)
        );
        assert_eq!(nav.cycles(), 2);
    }

    #[test]
    fn test_advance_points_sensor_ahead_and_stops() {
        let world = FakeWorld::shared(vec![walled()]);
        let mut nav = navigator(config(1), &world);
        nav.step().unwrap();

        let log = world.borrow().log.clone();
        assert_eq!(log, vec![Cmd::Servo(90.0), Cmd::Forward, Cmd::Stop]);
    }

    #[test]
    fn test_cancelled_before_first_cycle() {
        let world = FakeWorld::shared(vec![opening(0.0, 40.0)]);
        let running = Arc::new(AtomicBool::new(false));
        let mut nav = navigator(config(3), &world).with_running_flag(running);

        let outcome = nav.run().unwrap();
        assert_eq!(outcome.reason, HaltReason::Cancelled);
        assert_eq!(outcome.cycles, 0);
        assert!(world.borrow().log.is_empty());
    }

    #[test]
    fn test_cancel_takes_effect_at_cycle_boundary() {
        let world = FakeWorld::shared(vec![opening(0.0, 40.0)]);
        let running = Arc::new(AtomicBool::new(true));
        let mut nav = navigator(config(3), &world).with_running_flag(Arc::clone(&running));

        nav.step().unwrap();
        running.store(false, Ordering::Relaxed);
        // Remainder of the cycle still runs
        assert!(matches!(nav.step().unwrap(), NavState::Evaluating(_)));
        assert!(matches!(nav.step().unwrap(), NavState::Turning(_)));
        assert_eq!(nav.step().unwrap(), &NavState::Advancing);

        let outcome = nav.run().unwrap();
        assert_eq!(outcome.reason, HaltReason::Cancelled);
        assert_eq!(outcome.cycles, 1);
        assert_eq!(turns(&world).len(), 1);
    }

    #[test]
    fn test_max_advance_polls() {
        let world = FakeWorld::shared(vec![walled()]);
        world.borrow_mut().ahead_while_driving = 500.0;
        let mut cfg = config(1);
        cfg.max_advance_polls = Some(4);
        let mut nav = navigator(cfg, &world);

        assert_eq!(nav.step().unwrap(), &NavState::Scanning);
        assert_eq!(nav.actuator().0.borrow().log.last(), Some(&Cmd::Stop));
    }

    #[test]
    fn test_hardware_handles_returned() {
        let world = FakeWorld::shared(vec![walled()]);
        let mut nav = navigator(config(3), &world);
        assert!(Rc::ptr_eq(&nav.sensor().0, &world));

        let outcome = nav.run().unwrap();
        assert_eq!(nav.state().halt_reason(), Some(outcome.reason));

        let (actuator, sensor) = nav.into_parts();
        assert!(Rc::ptr_eq(&actuator.0, &world));
        assert!(Rc::ptr_eq(&sensor.0, &world));
        assert!(!world.borrow().driving);
    }

    #[test]
    fn test_disconnect_while_driving_stops_and_errors() {
        let world = FakeWorld::shared(vec![walled()]);
        world.borrow_mut().disconnect_while_driving = true;
        let mut nav = navigator(config(3), &world);

        assert!(matches!(nav.run(), Err(Error::Disconnected(_))));
        assert_eq!(world.borrow().log.last(), Some(&Cmd::Stop));
    }
}
