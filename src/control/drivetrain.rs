//! Drivetrain interface for the Ares robot

use thiserror::Error;

/// How an explicit stop should hold the wheels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Actively hold position. Used for every safety-relevant stop.
    Brake,
    /// Let the wheels spin down freely.
    Coast,
}

/// A single drivetrain command.
///
/// A new command fully supersedes the previous one; the drivetrain never
/// queues and never applies backpressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrivetrainCommand {
    Drive {
        linear_mm_s: f64,
        angular_deg_s: f64,
    },
    Stop(StopMode),
}

/// Drivetrain command failure
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("composite drive primitive is unavailable")]
    Unsupported,
    #[error("drivetrain fault: {0}")]
    Fault(String),
}

/// The drivetrain collaborator abstracting differential-drive kinematics.
///
/// Positive linear speed drives forward toward the blade; positive angular
/// rate rotates counterclockwise. Implementations that need inverted motor
/// signs apply them here, at the hardware boundary, after calibration.
pub trait Drivetrain: Send {
    /// Get the drivetrain name
    fn name(&self) -> &str;

    /// Whether the composite (linear, angular) drive primitive is available.
    ///
    /// Read once at controller construction; per-side motor control is the
    /// fallback when this reports false or when `drive` fails at runtime.
    fn supports_drive(&self) -> bool;

    /// Drive with a linear speed (mm/s) and an angular rate (deg/s)
    fn drive(&mut self, linear_mm_s: f64, angular_deg_s: f64) -> Result<(), DriveError>;

    /// Command each wheel's ground speed directly (mm/s)
    fn run_motors(&mut self, left_mm_s: f64, right_mm_s: f64) -> Result<(), DriveError>;

    /// Stop both wheels
    fn stop(&mut self, mode: StopMode) -> Result<(), DriveError>;
}
