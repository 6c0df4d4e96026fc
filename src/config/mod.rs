//! Combat configuration for the Ares robot
//!
//! All thresholds, speeds and durations live in one immutable value that is
//! validated when it is built and never mutated for the rest of the match.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

/// Rejected configuration. Fatal at construction time, never at runtime.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be strictly positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be at least 1 ms")]
    ZeroDuration { name: &'static str },
    #[error("min_attack_fraction must be in (0, 1], got {0}")]
    BadFraction(f64),
    #[error("poll_interval_ms ({poll}) must not exceed {name} ({value})")]
    PollTooCoarse {
        poll: u64,
        name: &'static str,
        value: u64,
    },
    #[error("unknown parameter \"{0}\"")]
    UnknownParam(String),
}

/// How the attack selector commits once an opponent is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStyle {
    /// Issue a continuous full-speed forward command and return to the loop.
    Ram,
    /// Run a bounded sustained-push maneuver that tracks the target.
    Push,
}

/// How the robot looks for an opponent when nothing is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStyle {
    /// Continuous curved-forward sweep, one command per cycle.
    Sweep,
    /// Active hunt cycle: look, spin-scan both ways, short blind advance.
    Hunt,
}

/// Immutable combat parameters.
///
/// Defaults reflect a 120 mm axle-track robot on a standard bordered ring.
#[derive(Debug, Clone)]
pub struct CombatConfig {
    /// Reflectance above this reads as the white border line.
    pub edge_reflectance_threshold: f64,
    /// Proximity readings below this trigger a near-range attack.
    pub proximity_attack_threshold: f64,
    /// Distance readings below this trigger a far-range attack.
    pub distance_attack_threshold_mm: f64,
    /// Forward speed of a committed attack, mm/s.
    pub attack_speed_mm_s: f64,
    /// Lower clamp on the scaled far-attack speed, as a fraction of nominal.
    pub min_attack_fraction: f64,
    /// Scale far-attack speed down with remaining distance for braking margin.
    pub scaled_far_attack: bool,
    /// Forward component of the search sweep, mm/s.
    pub search_speed_mm_s: f64,
    /// Angular component of the search sweep, deg/s.
    pub search_turn_rate_deg_s: f64,
    /// Speed of the straight retreat leg, mm/s.
    pub retreat_speed_mm_s: f64,
    /// Retreat length when one sensor saw the line, mm.
    pub retreat_distance_mm: f64,
    /// Retreat length when both sensors saw the line, mm.
    pub retreat_distance_both_mm: f64,
    /// Rotation rate of recovery turns, deg/s.
    pub turn_rate_deg_s: f64,
    /// Escape rotation after a single-side edge hit, degrees.
    pub edge_turn_angle_deg: f64,
    /// Escape rotation after a both-sides edge hit, degrees.
    pub edge_turn_angle_both_deg: f64,
    /// Rotation rate while scanning for the opponent, deg/s.
    pub spin_rate_deg_s: f64,
    /// Upper bound on one rotate-and-scan, ms.
    pub scan_duration_ms: u64,
    /// Upper bound on one sustained push, ms.
    pub push_max_ms: u64,
    /// Settle time after a braking stop, ms.
    pub stabilize_ms: u64,
    /// Cadence of the arbitration loop and of maneuver polling, ms.
    pub poll_interval_ms: u64,
    /// Hunt-cycle glance rotation, degrees.
    pub hunt_look_angle_deg: f64,
    /// Settle time after a hunt glance before sampling, ms.
    pub hunt_look_pause_ms: u64,
    /// Speed of the hunt cycle's last-resort advance, mm/s.
    pub blind_advance_speed_mm_s: f64,
    /// Duration of the last-resort advance, ms.
    pub blind_advance_ms: u64,
    /// Distance between the drive wheels, mm.
    pub axle_track_mm: f64,
    /// Attack commitment style.
    pub attack_style: AttackStyle,
    /// Search style.
    pub search_style: SearchStyle,
}

impl Default for CombatConfig {
    fn default() -> Self {
        CombatConfig {
            edge_reflectance_threshold: 50.0,
            proximity_attack_threshold: 75.0,
            distance_attack_threshold_mm: 200.0,
            attack_speed_mm_s: 900.0,
            min_attack_fraction: 0.5,
            scaled_far_attack: true,
            search_speed_mm_s: 150.0,
            search_turn_rate_deg_s: 170.0,
            retreat_speed_mm_s: 200.0,
            retreat_distance_mm: 120.0,
            retreat_distance_both_mm: 150.0,
            turn_rate_deg_s: 300.0,
            edge_turn_angle_deg: 90.0,
            edge_turn_angle_both_deg: 180.0,
            spin_rate_deg_s: 600.0,
            scan_duration_ms: 700,
            push_max_ms: 2000,
            stabilize_ms: 120,
            poll_interval_ms: 10,
            hunt_look_angle_deg: 30.0,
            hunt_look_pause_ms: 80,
            blind_advance_speed_mm_s: 600.0,
            blind_advance_ms: 300,
            axle_track_mm: 120.0,
            attack_style: AttackStyle::Push,
            search_style: SearchStyle::Hunt,
        }
    }
}

impl CombatConfig {
    /// Build the default configuration, already validated.
    pub fn new() -> Result<Self, ConfigError> {
        let config = CombatConfig::default();
        config.validate()?;
        Ok(config)
    }

    /// Check every field. Called at construction and after overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            (
                "edge_reflectance_threshold",
                self.edge_reflectance_threshold,
            ),
            (
                "proximity_attack_threshold",
                self.proximity_attack_threshold,
            ),
            (
                "distance_attack_threshold_mm",
                self.distance_attack_threshold_mm,
            ),
            ("attack_speed_mm_s", self.attack_speed_mm_s),
            ("search_speed_mm_s", self.search_speed_mm_s),
            ("search_turn_rate_deg_s", self.search_turn_rate_deg_s),
            ("retreat_speed_mm_s", self.retreat_speed_mm_s),
            ("retreat_distance_mm", self.retreat_distance_mm),
            ("retreat_distance_both_mm", self.retreat_distance_both_mm),
            ("turn_rate_deg_s", self.turn_rate_deg_s),
            ("edge_turn_angle_deg", self.edge_turn_angle_deg),
            ("edge_turn_angle_both_deg", self.edge_turn_angle_both_deg),
            ("spin_rate_deg_s", self.spin_rate_deg_s),
            ("hunt_look_angle_deg", self.hunt_look_angle_deg),
            ("blind_advance_speed_mm_s", self.blind_advance_speed_mm_s),
            ("axle_track_mm", self.axle_track_mm),
        ];
        for (name, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.min_attack_fraction <= 0.0 || self.min_attack_fraction > 1.0 {
            return Err(ConfigError::BadFraction(self.min_attack_fraction));
        }

        let durations = [
            ("scan_duration_ms", self.scan_duration_ms),
            ("push_max_ms", self.push_max_ms),
            ("blind_advance_ms", self.blind_advance_ms),
            ("poll_interval_ms", self.poll_interval_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { name });
            }
        }

        // The poll tick paces every timed maneuver; a coarser tick than the
        // maneuver itself would never observe its own deadline.
        let paced = [
            ("scan_duration_ms", self.scan_duration_ms),
            ("push_max_ms", self.push_max_ms),
            ("blind_advance_ms", self.blind_advance_ms),
        ];
        for (name, value) in paced {
            if self.poll_interval_ms > value {
                return Err(ConfigError::PollTooCoarse {
                    poll: self.poll_interval_ms,
                    name,
                    value,
                });
            }
        }

        Ok(())
    }

    /// Override numeric fields from a parameter map, then re-validate.
    pub fn apply_params(&mut self, params: &HashMap<String, f64>) -> Result<(), ConfigError> {
        for (key, &value) in params {
            match key.as_str() {
                "edge_reflectance_threshold" => self.edge_reflectance_threshold = value,
                "proximity_attack_threshold" => self.proximity_attack_threshold = value,
                "distance_attack_threshold_mm" => self.distance_attack_threshold_mm = value,
                "attack_speed_mm_s" => self.attack_speed_mm_s = value,
                "min_attack_fraction" => self.min_attack_fraction = value,
                "search_speed_mm_s" => self.search_speed_mm_s = value,
                "search_turn_rate_deg_s" => self.search_turn_rate_deg_s = value,
                "retreat_speed_mm_s" => self.retreat_speed_mm_s = value,
                "retreat_distance_mm" => self.retreat_distance_mm = value,
                "retreat_distance_both_mm" => self.retreat_distance_both_mm = value,
                "turn_rate_deg_s" => self.turn_rate_deg_s = value,
                "edge_turn_angle_deg" => self.edge_turn_angle_deg = value,
                "edge_turn_angle_both_deg" => self.edge_turn_angle_both_deg = value,
                "spin_rate_deg_s" => self.spin_rate_deg_s = value,
                "scan_duration_ms" => self.scan_duration_ms = value as u64,
                "push_max_ms" => self.push_max_ms = value as u64,
                "stabilize_ms" => self.stabilize_ms = value as u64,
                "poll_interval_ms" => self.poll_interval_ms = value as u64,
                "hunt_look_angle_deg" => self.hunt_look_angle_deg = value,
                "hunt_look_pause_ms" => self.hunt_look_pause_ms = value as u64,
                "blind_advance_speed_mm_s" => self.blind_advance_speed_mm_s = value,
                "blind_advance_ms" => self.blind_advance_ms = value as u64,
                "axle_track_mm" => self.axle_track_mm = value,
                other => return Err(ConfigError::UnknownParam(other.to_string())),
            }
        }
        self.validate()
    }

    /// Poll cadence as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Post-stop settle time as a `Duration`.
    pub fn stabilize(&self) -> Duration {
        Duration::from_millis(self.stabilize_ms)
    }

    /// How long a rotation at `rate_deg_s` takes to cover `angle_deg`.
    pub fn rotation_time(angle_deg: f64, rate_deg_s: f64) -> Duration {
        Duration::from_secs_f64(angle_deg / rate_deg_s)
    }

    /// How long a straight leg at `speed_mm_s` takes to cover `distance_mm`.
    pub fn travel_time(distance_mm: f64, speed_mm_s: f64) -> Duration {
        Duration::from_secs_f64(distance_mm / speed_mm_s)
    }
}
