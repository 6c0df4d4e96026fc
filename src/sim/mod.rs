//! Software-in-the-loop collaborators for the Ares robot
//!
//! Stand-ins for the real sensor suite and drivetrain: a scripted snapshot
//! source and a recording drivetrain for unit tests, and a small circular-
//! arena simulation for end-to-end runs. None of this ships on the robot.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use nalgebra::{distance, Point2, Vector2};
use tokio::time::Instant;

use crate::control::drivetrain::{DriveError, Drivetrain, StopMode};
use crate::perception::sensors::SnapshotSource;
use crate::perception::SensorSnapshot;

/// Replays a fixed sequence of snapshots, repeating the last one forever.
pub struct ScriptedSource {
    frames: VecDeque<SensorSnapshot>,
    current: SensorSnapshot,
}

impl ScriptedSource {
    /// Replay `frames` in order, then keep returning the final frame.
    pub fn sequence(frames: Vec<SensorSnapshot>) -> Self {
        let mut frames: VecDeque<_> = frames.into();
        let current = frames
            .pop_front()
            .unwrap_or_else(|| SensorSnapshot::clear(0.0, 0.0));
        ScriptedSource { frames, current }
    }

    /// Return the same snapshot every cycle.
    pub fn repeating(snapshot: SensorSnapshot) -> Self {
        ScriptedSource::sequence(vec![snapshot])
    }
}

impl SnapshotSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted_source"
    }

    fn sample(&mut self) -> SensorSnapshot {
        let mut snapshot = self.current;
        if let Some(next) = self.frames.pop_front() {
            self.current = next;
        }
        snapshot.sampled_at = Instant::now();
        snapshot
    }
}

/// Everything a command can look like on the wire, for assertions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveRecord {
    Drive { linear_mm_s: f64, angular_deg_s: f64 },
    Motors { left_mm_s: f64, right_mm_s: f64 },
    Stop(StopMode),
}

#[derive(Debug, Default)]
struct SimDrivetrainState {
    records: Vec<DriveRecord>,
    stopped: bool,
    no_composite: bool,
    fail_drive: bool,
    fail_motors: bool,
    fail_stop: bool,
}

/// Recording drivetrain with injectable capability gaps and faults.
///
/// Clones share state, so a test can keep a handle for inspection after
/// boxing one for the stack under test.
#[derive(Debug, Clone, Default)]
pub struct SimDrivetrain {
    state: Arc<Mutex<SimDrivetrainState>>,
}

impl SimDrivetrain {
    /// A fully capable, fault-free drivetrain.
    pub fn new() -> Self {
        SimDrivetrain::default()
    }

    /// Report no composite-drive capability.
    pub fn without_composite_drive(self) -> Self {
        self.state.lock().unwrap().no_composite = true;
        self
    }

    /// Make the composite drive primitive fail at runtime.
    pub fn with_failing_drive(self) -> Self {
        self.state.lock().unwrap().fail_drive = true;
        self
    }

    /// Make per-side motor commands fail at runtime.
    pub fn with_failing_motors(self) -> Self {
        self.state.lock().unwrap().fail_motors = true;
        self
    }

    /// Make the stop primitive fail at runtime.
    pub fn with_failing_stop(self) -> Self {
        self.state.lock().unwrap().fail_stop = true;
        self
    }

    /// Whether the last effective command left the drivetrain stopped.
    pub fn is_stopped(&self) -> bool {
        self.state.lock().unwrap().stopped
    }

    /// Every command received, in order.
    pub fn records(&self) -> Vec<DriveRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// The (linear, angular) pairs of the composite drive commands received.
    pub fn drive_commands(&self) -> Vec<(f64, f64)> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                DriveRecord::Drive {
                    linear_mm_s,
                    angular_deg_s,
                } => Some((linear_mm_s, angular_deg_s)),
                _ => None,
            })
            .collect()
    }

    /// Whether any composite drive command got through.
    pub fn saw_composite_drive(&self) -> bool {
        self.records()
            .iter()
            .any(|record| matches!(record, DriveRecord::Drive { .. }))
    }

    /// Whether any per-side motor command got through.
    pub fn saw_motor_command(&self) -> bool {
        self.records()
            .iter()
            .any(|record| matches!(record, DriveRecord::Motors { .. }))
    }
}

impl Drivetrain for SimDrivetrain {
    fn name(&self) -> &str {
        "sim_drivetrain"
    }

    fn supports_drive(&self) -> bool {
        !self.state.lock().unwrap().no_composite
    }

    fn drive(&mut self, linear_mm_s: f64, angular_deg_s: f64) -> Result<(), DriveError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_drive {
            return Err(DriveError::Fault("injected drive fault".to_string()));
        }
        state.records.push(DriveRecord::Drive {
            linear_mm_s,
            angular_deg_s,
        });
        state.stopped = linear_mm_s == 0.0 && angular_deg_s == 0.0;
        Ok(())
    }

    fn run_motors(&mut self, left_mm_s: f64, right_mm_s: f64) -> Result<(), DriveError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_motors {
            return Err(DriveError::Fault("injected motor fault".to_string()));
        }
        state.records.push(DriveRecord::Motors {
            left_mm_s,
            right_mm_s,
        });
        state.stopped = left_mm_s == 0.0 && right_mm_s == 0.0;
        Ok(())
    }

    fn stop(&mut self, mode: StopMode) -> Result<(), DriveError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_stop {
            return Err(DriveError::Fault("injected stop fault".to_string()));
        }
        state.records.push(DriveRecord::Stop(mode));
        state.stopped = true;
        Ok(())
    }
}

/// Shared state of the simulated match.
#[derive(Debug)]
struct ArenaWorld {
    ring_radius_mm: f64,
    robot_position: Point2<f64>,
    robot_heading_rad: f64,
    opponent_position: Point2<f64>,
    // Current body command: linear mm/s, angular deg/s.
    command: (f64, f64),
    last_update: Instant,
}

impl ArenaWorld {
    /// Integrate the current command up to `now` and shove the opponent if
    /// the blade reaches it.
    fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.last_update = now;
        if dt <= 0.0 {
            return;
        }

        let (linear, angular_deg) = self.command;
        self.robot_heading_rad += angular_deg.to_radians() * dt;

        let step = Vector2::new(
            self.robot_heading_rad.cos(),
            self.robot_heading_rad.sin(),
        ) * linear
            * dt;
        self.robot_position += step;

        // Blade contact: a forward-moving robot pushes the opponent ahead
        // of itself.
        if linear > 0.0 && distance(&self.robot_position, &self.opponent_position) < 80.0 {
            self.opponent_position += step;
        }
    }

    fn bearing_to_opponent(&self) -> f64 {
        let to_opponent = self.opponent_position - self.robot_position;
        let angle = to_opponent.y.atan2(to_opponent.x) - self.robot_heading_rad;

        // Normalize to [-pi, pi]; the heading accumulates across full spins.
        let tau = 2.0 * std::f64::consts::PI;
        (angle + std::f64::consts::PI).rem_euclid(tau) - std::f64::consts::PI
    }

    fn reflectance_at(&self, forward_mm: f64, lateral_mm: f64) -> f64 {
        let (sin, cos) = self.robot_heading_rad.sin_cos();
        let point = self.robot_position
            + Vector2::new(
                forward_mm * cos - lateral_mm * sin,
                forward_mm * sin + lateral_mm * cos,
            );
        let from_center = distance(&Point2::origin(), &point);
        if from_center > self.ring_radius_mm - 20.0 {
            85.0
        } else {
            12.0
        }
    }
}

/// A circular sumo ring with one opponent, playable end to end.
///
/// `split` yields the two collaborator halves the combat stack owns plus a
/// handle for inspecting the match from outside.
pub struct ArenaSim;

impl ArenaSim {
    const SENSOR_FORWARD_MM: f64 = 60.0;
    const SENSOR_LATERAL_MM: f64 = 40.0;
    const SENSOR_CONE_RAD: f64 = 0.45;
    const DISTANCE_RANGE_MM: f64 = 600.0;
    const PROXIMITY_RANGE_MM: f64 = 150.0;
    const BODY_RADIUS_MM: f64 = 40.0;

    /// Build a ring and hand out sensors, drivetrain and observer handle.
    pub fn split(
        ring_radius_mm: f64,
        robot_position: Point2<f64>,
        robot_heading_rad: f64,
        opponent_position: Point2<f64>,
    ) -> (ArenaSensors, ArenaDrive, ArenaHandle) {
        let world = Arc::new(Mutex::new(ArenaWorld {
            ring_radius_mm,
            robot_position,
            robot_heading_rad,
            opponent_position,
            command: (0.0, 0.0),
            last_update: Instant::now(),
        }));
        (
            ArenaSensors {
                world: Arc::clone(&world),
            },
            ArenaDrive {
                world: Arc::clone(&world),
            },
            ArenaHandle { world },
        )
    }
}

/// The sensor half of the simulated arena.
pub struct ArenaSensors {
    world: Arc<Mutex<ArenaWorld>>,
}

impl SnapshotSource for ArenaSensors {
    fn name(&self) -> &str {
        "arena_sim"
    }

    fn sample(&mut self) -> SensorSnapshot {
        let now = Instant::now();
        let mut world = self.world.lock().unwrap();
        world.advance(now);

        let left_reflectance =
            world.reflectance_at(ArenaSim::SENSOR_FORWARD_MM, ArenaSim::SENSOR_LATERAL_MM);
        let right_reflectance =
            world.reflectance_at(ArenaSim::SENSOR_FORWARD_MM, -ArenaSim::SENSOR_LATERAL_MM);

        let range = distance(&world.robot_position, &world.opponent_position);
        let in_cone = world.bearing_to_opponent().abs() < ArenaSim::SENSOR_CONE_RAD;

        let distance_mm =
            (in_cone && range < ArenaSim::DISTANCE_RANGE_MM).then_some(range);
        let proximity = (in_cone && range < ArenaSim::PROXIMITY_RANGE_MM).then_some(range * 0.5);

        SensorSnapshot {
            left_reflectance,
            right_reflectance,
            proximity,
            distance_mm,
            sampled_at: now,
        }
    }
}

/// The drivetrain half of the simulated arena.
pub struct ArenaDrive {
    world: Arc<Mutex<ArenaWorld>>,
}

impl Drivetrain for ArenaDrive {
    fn name(&self) -> &str {
        "arena_sim"
    }

    fn supports_drive(&self) -> bool {
        true
    }

    fn drive(&mut self, linear_mm_s: f64, angular_deg_s: f64) -> Result<(), DriveError> {
        let now = Instant::now();
        let mut world = self.world.lock().unwrap();
        world.advance(now);
        world.command = (linear_mm_s, angular_deg_s);
        Ok(())
    }

    fn run_motors(&mut self, left_mm_s: f64, right_mm_s: f64) -> Result<(), DriveError> {
        // Invert the differential split over a 120 mm track.
        let linear = (left_mm_s + right_mm_s) / 2.0;
        let angular = ((right_mm_s - left_mm_s) / 120.0).to_degrees();
        self.drive(linear, angular)
    }

    fn stop(&mut self, _mode: StopMode) -> Result<(), DriveError> {
        self.drive(0.0, 0.0)
    }
}

/// Observer handle over the simulated match.
#[derive(Clone)]
pub struct ArenaHandle {
    world: Arc<Mutex<ArenaWorld>>,
}

impl ArenaHandle {
    /// Robot position and heading.
    pub fn robot_pose(&self) -> (Point2<f64>, f64) {
        let world = self.world.lock().unwrap();
        (world.robot_position, world.robot_heading_rad)
    }

    /// Distance from the robot to the ring center, mm.
    pub fn robot_from_center(&self) -> f64 {
        let world = self.world.lock().unwrap();
        distance(&Point2::origin(), &world.robot_position)
    }

    /// Whether the opponent has been pushed over the border. A body is out
    /// once its hull reaches past the ring boundary.
    pub fn opponent_out(&self) -> bool {
        let world = self.world.lock().unwrap();
        distance(&Point2::origin(), &world.opponent_position)
            > world.ring_radius_mm - ArenaSim::BODY_RADIUS_MM
    }

    /// Whether the robot itself has left the ring.
    pub fn robot_out(&self) -> bool {
        let world = self.world.lock().unwrap();
        distance(&Point2::origin(), &world.robot_position)
            > world.ring_radius_mm - ArenaSim::BODY_RADIUS_MM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_source_replays_then_repeats() {
        let mut first = SensorSnapshot::clear(10.0, 10.0);
        first.distance_mm = Some(100.0);
        let second = SensorSnapshot::clear(20.0, 20.0);

        let mut source = ScriptedSource::sequence(vec![first, second]);
        assert_eq!(source.sample().distance_mm, Some(100.0));
        assert_eq!(source.sample().left_reflectance, 20.0);
        assert_eq!(source.sample().left_reflectance, 20.0);
    }

    #[test]
    fn sim_drivetrain_tracks_stop_state() {
        let mut drivetrain = SimDrivetrain::new();
        drivetrain.drive(500.0, 0.0).unwrap();
        assert!(!drivetrain.is_stopped());
        drivetrain.stop(StopMode::Brake).unwrap();
        assert!(drivetrain.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn arena_reads_the_line_near_the_border() {
        let (mut sensors, _drive, _handle) = ArenaSim::split(
            500.0,
            Point2::new(450.0, 0.0),
            0.0, // facing the border
            Point2::new(-400.0, 0.0),
        );
        let snapshot = sensors.sample();
        assert!(snapshot.left_reflectance > 50.0);
        assert!(snapshot.right_reflectance > 50.0);
    }

    #[tokio::test(start_paused = true)]
    async fn arena_sees_an_opponent_dead_ahead() {
        let (mut sensors, _drive, _handle) = ArenaSim::split(
            500.0,
            Point2::new(0.0, 0.0),
            0.0,
            Point2::new(300.0, 0.0),
        );
        let snapshot = sensors.sample();
        assert_eq!(snapshot.distance_mm, Some(300.0));
        assert_eq!(snapshot.proximity, None); // beyond near-field range
    }

    #[tokio::test(start_paused = true)]
    async fn arena_integrates_drive_commands() {
        let (mut sensors, mut drive, handle) = ArenaSim::split(
            500.0,
            Point2::new(0.0, 0.0),
            0.0,
            Point2::new(-400.0, 0.0),
        );
        drive.drive(100.0, 0.0).unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        let _ = sensors.sample(); // advances the world
        let (position, _) = handle.robot_pose();
        assert!((position.x - 100.0).abs() < 5.0);
    }
}
