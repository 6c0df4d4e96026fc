//! Control module for the Ares robot
pub mod drivetrain;
pub mod kinematics;
pub mod maneuver;

use tracing::warn;

use self::drivetrain::{DriveError, Drivetrain, DrivetrainCommand, StopMode};
use self::kinematics::DifferentialKinematics;

/// Routes commands to the exclusively-owned drivetrain.
///
/// The composite-drive capability is read once here, at construction, so the
/// per-call path never re-negotiates it. When the composite primitive is
/// missing or fails, commands are converted to per-side wheel speeds and the
/// stop path walks the same chain, keeping the stop guarantee intact under
/// drive faults.
pub struct DriveController {
    drivetrain: Box<dyn Drivetrain>,
    kinematics: DifferentialKinematics,
    composite: bool,
}

impl DriveController {
    /// Wrap a drivetrain, capturing its capability flag once
    pub fn new(drivetrain: Box<dyn Drivetrain>, axle_track_mm: f64) -> Self {
        let composite = drivetrain.supports_drive();
        DriveController {
            drivetrain,
            kinematics: DifferentialKinematics::new(axle_track_mm),
            composite,
        }
    }

    /// Issue any drivetrain command
    pub fn issue(&mut self, command: DrivetrainCommand) -> Result<(), DriveError> {
        match command {
            DrivetrainCommand::Drive {
                linear_mm_s,
                angular_deg_s,
            } => self.drive(linear_mm_s, angular_deg_s),
            DrivetrainCommand::Stop(mode) => self.stop(mode),
        }
    }

    /// Drive with body velocities, falling back to per-side motor commands
    pub fn drive(&mut self, linear_mm_s: f64, angular_deg_s: f64) -> Result<(), DriveError> {
        if self.composite {
            match self.drivetrain.drive(linear_mm_s, angular_deg_s) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(
                        drivetrain = self.drivetrain.name(),
                        %err,
                        "composite drive failed, falling back to per-side motors"
                    );
                }
            }
        }
        let (left, right) = self.kinematics.wheel_speeds(linear_mm_s, angular_deg_s);
        self.drivetrain.run_motors(left, right)
    }

    /// Stop the drivetrain, trying per-side zero commands if the stop
    /// primitive itself fails
    pub fn stop(&mut self, mode: StopMode) -> Result<(), DriveError> {
        match self.drivetrain.stop(mode) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(
                    drivetrain = self.drivetrain.name(),
                    %err,
                    "stop command failed, zeroing motors per side"
                );
                self.drivetrain.run_motors(0.0, 0.0)
            }
        }
    }

    /// Name of the underlying drivetrain
    pub fn name(&self) -> &str {
        self.drivetrain.name()
    }
}
