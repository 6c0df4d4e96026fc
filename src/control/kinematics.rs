//! Differential-drive kinematics for the Ares robot

/// Converts body velocities into per-wheel ground speeds.
///
/// Used when the drivetrain offers no composite drive primitive, or when
/// that primitive fails and the controller falls back to per-side motor
/// commands.
#[derive(Debug, Clone, Copy)]
pub struct DifferentialKinematics {
    axle_track_mm: f64,
}

impl DifferentialKinematics {
    /// Create kinematics for a given distance between the drive wheels
    pub fn new(axle_track_mm: f64) -> Self {
        DifferentialKinematics { axle_track_mm }
    }

    /// Compute (left, right) wheel speeds in mm/s.
    ///
    /// Positive angular (counterclockwise) speeds up the right wheel and
    /// slows the left one.
    pub fn wheel_speeds(&self, linear_mm_s: f64, angular_deg_s: f64) -> (f64, f64) {
        let omega = angular_deg_s.to_radians();
        let half_track = self.axle_track_mm / 2.0;

        let left = linear_mm_s - omega * half_track;
        let right = linear_mm_s + omega * half_track;

        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_drive_keeps_wheels_equal() {
        let kinematics = DifferentialKinematics::new(120.0);
        let (left, right) = kinematics.wheel_speeds(500.0, 0.0);
        assert_eq!(left, 500.0);
        assert_eq!(right, 500.0);
    }

    #[test]
    fn left_turn_speeds_up_right_wheel() {
        let kinematics = DifferentialKinematics::new(120.0);
        let (left, right) = kinematics.wheel_speeds(0.0, 180.0);
        assert!(right > 0.0);
        assert!(left < 0.0);
        assert!((left + right).abs() < 1e-9);
    }

    #[test]
    fn turn_rate_scales_with_axle_track() {
        let narrow = DifferentialKinematics::new(100.0);
        let wide = DifferentialKinematics::new(200.0);
        let (_, narrow_right) = narrow.wheel_speeds(0.0, 90.0);
        let (_, wide_right) = wide.wheel_speeds(0.0, 90.0);
        assert!(wide_right > narrow_right);
    }
}
