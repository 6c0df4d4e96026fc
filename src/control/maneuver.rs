//! Timed, abortable maneuvers for the Ares robot
//!
//! Every maneuver follows the same shape: issue an initial drivetrain
//! command, then poll at a fixed cadence, re-sampling the sensors and
//! checking the abort predicate, the action's success condition, the kill
//! switch and the deadline. Whatever path a maneuver exits through, the
//! drivetrain receives an explicit stop command before control returns to
//! the caller. That stop is the safety invariant of the whole controller.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::common::{KillSwitch, TurnDirection};
use crate::config::CombatConfig;
use crate::control::drivetrain::{DriveError, DrivetrainCommand, StopMode};
use crate::control::DriveController;
use crate::perception::sensors::SnapshotSource;
use crate::perception::SensorSnapshot;

/// Why a maneuver ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The deadline elapsed (for fixed-length actions: the action ran its
    /// full planned time).
    TimedOut,
    /// The abort predicate fired, or the kill switch was triggered.
    Aborted,
    /// A scan found the opponent.
    TargetAcquired,
    /// A push lost the opponent: it escaped or left both sensors' range.
    TargetLost,
}

/// Runs timed actions against the drivetrain, re-sampling sensors at every
/// poll tick. The only component that owns a maneuver timer.
pub struct ManeuverExecutor {
    config: CombatConfig,
}

impl ManeuverExecutor {
    /// Create an executor over a validated configuration
    pub fn new(config: CombatConfig) -> Self {
        ManeuverExecutor { config }
    }

    /// The timed-action primitive every maneuver is built on.
    ///
    /// Polls until the abort predicate fires (`Aborted`), the success
    /// predicate yields a completion, or `deadline` elapses (`TimedOut`).
    /// The kill switch is checked at the same cadence as the abort
    /// predicate. The drivetrain is stopped on every exit path; if even the
    /// stop chain fails the error is returned after the attempt.
    pub async fn run(
        &self,
        drive: &mut DriveController,
        sensors: &mut dyn SnapshotSource,
        initial: DrivetrainCommand,
        deadline: Duration,
        kill: &KillSwitch,
        mut abort: impl FnMut(&SensorSnapshot) -> bool,
        mut success: impl FnMut(&SensorSnapshot) -> Option<Completion>,
    ) -> Result<Completion, DriveError> {
        if let Err(err) = drive.issue(initial) {
            self.halt(drive, &err);
            return Err(err);
        }

        let deadline_at = Instant::now() + deadline;
        let completion = loop {
            if kill.is_triggered() {
                break Completion::Aborted;
            }
            if Instant::now() >= deadline_at {
                break Completion::TimedOut;
            }
            let snapshot = sensors.sample();
            if abort(&snapshot) {
                break Completion::Aborted;
            }
            if let Some(done) = success(&snapshot) {
                break done;
            }
            sleep(self.config.poll_interval()).await;
        };

        drive.stop(StopMode::Brake)?;
        debug!(?completion, "maneuver ended");
        Ok(completion)
    }

    /// Sustained push: full attack speed forward until the opponent is lost,
    /// an edge appears, or the push budget runs out.
    ///
    /// The deadline bounds a full-speed commitment even if the sensors
    /// degrade mid-push.
    pub async fn sustained_push(
        &self,
        drive: &mut DriveController,
        sensors: &mut dyn SnapshotSource,
        kill: &KillSwitch,
    ) -> Result<Completion, DriveError> {
        let edge_threshold = self.config.edge_reflectance_threshold;
        let proximity_threshold = self.config.proximity_attack_threshold;
        let distance_threshold = self.config.distance_attack_threshold_mm;

        debug!(
            speed = self.config.attack_speed_mm_s,
            max_ms = self.config.push_max_ms,
            "sustained push"
        );
        self.run(
            drive,
            sensors,
            DrivetrainCommand::Drive {
                linear_mm_s: self.config.attack_speed_mm_s,
                angular_deg_s: 0.0,
            },
            Duration::from_millis(self.config.push_max_ms),
            kill,
            |snapshot| snapshot.sees_line(edge_threshold),
            |snapshot| {
                (!snapshot.detects_opponent(proximity_threshold, distance_threshold))
                    .then_some(Completion::TargetLost)
            },
        )
        .await
    }

    /// Rotate in place, watching for the opponent to enter either sensor's
    /// range. Aborts on any edge reading.
    pub async fn rotate_and_scan(
        &self,
        drive: &mut DriveController,
        sensors: &mut dyn SnapshotSource,
        direction: TurnDirection,
        kill: &KillSwitch,
    ) -> Result<Completion, DriveError> {
        let edge_threshold = self.config.edge_reflectance_threshold;
        let proximity_threshold = self.config.proximity_attack_threshold;
        let distance_threshold = self.config.distance_attack_threshold_mm;

        debug!(?direction, "rotate and scan");
        self.run(
            drive,
            sensors,
            DrivetrainCommand::Drive {
                linear_mm_s: 0.0,
                angular_deg_s: self.config.spin_rate_deg_s * direction.multiplier(),
            },
            Duration::from_millis(self.config.scan_duration_ms),
            kill,
            |snapshot| snapshot.sees_line(edge_threshold),
            |snapshot| {
                snapshot
                    .detects_opponent(proximity_threshold, distance_threshold)
                    .then_some(Completion::TargetAcquired)
            },
        )
        .await
    }

    /// Retreat straight back, then rotate toward the arena interior.
    ///
    /// Neither leg watches the edge sensors: the edge is what this maneuver
    /// is recovering from, retreating is always safe, and both legs are
    /// short and bounded. The kill switch is still honored at every tick.
    /// Reports `TimedOut` after running its full planned time.
    pub async fn retreat_and_turn(
        &self,
        drive: &mut DriveController,
        retreat_distance_mm: f64,
        direction: TurnDirection,
        angle_deg: f64,
        kill: &KillSwitch,
    ) -> Result<Completion, DriveError> {
        debug!(retreat_distance_mm, ?direction, angle_deg, "retreat and turn");

        let retreat = CombatConfig::travel_time(retreat_distance_mm, self.config.retreat_speed_mm_s);
        let completed = self
            .timed_leg(
                drive,
                DrivetrainCommand::Drive {
                    linear_mm_s: -self.config.retreat_speed_mm_s,
                    angular_deg_s: 0.0,
                },
                retreat,
                kill,
            )
            .await?;
        if !completed {
            drive.stop(StopMode::Brake)?;
            return Ok(Completion::Aborted);
        }

        let rotation = CombatConfig::rotation_time(angle_deg, self.config.turn_rate_deg_s);
        let completed = self
            .timed_leg(
                drive,
                DrivetrainCommand::Drive {
                    linear_mm_s: 0.0,
                    angular_deg_s: self.config.turn_rate_deg_s * direction.multiplier(),
                },
                rotation,
                kill,
            )
            .await?;

        drive.stop(StopMode::Brake)?;
        Ok(if completed {
            Completion::TimedOut
        } else {
            Completion::Aborted
        })
    }

    /// Rotate by a fixed angle at the recovery turn rate, then stop.
    pub async fn rotate_by(
        &self,
        drive: &mut DriveController,
        angle_deg: f64,
        direction: TurnDirection,
        kill: &KillSwitch,
    ) -> Result<Completion, DriveError> {
        let rotation = CombatConfig::rotation_time(angle_deg, self.config.turn_rate_deg_s);
        let completed = self
            .timed_leg(
                drive,
                DrivetrainCommand::Drive {
                    linear_mm_s: 0.0,
                    angular_deg_s: self.config.turn_rate_deg_s * direction.multiplier(),
                },
                rotation,
                kill,
            )
            .await?;

        drive.stop(StopMode::Brake)?;
        Ok(if completed {
            Completion::TimedOut
        } else {
            Completion::Aborted
        })
    }

    /// Drive one fixed-duration leg without sensor polling. Returns whether
    /// the leg ran to its full duration (false: kill switch cut it short).
    /// The caller owns the stop.
    async fn timed_leg(
        &self,
        drive: &mut DriveController,
        command: DrivetrainCommand,
        duration: Duration,
        kill: &KillSwitch,
    ) -> Result<bool, DriveError> {
        if let Err(err) = drive.issue(command) {
            self.halt(drive, &err);
            return Err(err);
        }

        let end = Instant::now() + duration;
        loop {
            if kill.is_triggered() {
                return Ok(false);
            }
            let now = Instant::now();
            if now >= end {
                return Ok(true);
            }
            sleep(self.config.poll_interval().min(end - now)).await;
        }
    }

    /// Best-effort stop after a failed command; the original error is what
    /// the caller reports.
    fn halt(&self, drive: &mut DriveController, cause: &DriveError) {
        if let Err(stop_err) = drive.stop(StopMode::Brake) {
            warn!(%cause, %stop_err, "stop after failed command also failed");
        }
    }
}
