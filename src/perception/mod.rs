//! Perception module for the Ares robot
//!
//! One `SensorSnapshot` is read per arbitration cycle and shared, immutable,
//! by every decision made in that cycle.

pub mod sensors;

use tokio::time::Instant;

/// All sensor readings taken in a single atomic sample.
///
/// `None` means the sensor returned no valid reading this cycle. A missing
/// reading is "condition not met" everywhere downstream, never zero and
/// never a detection.
#[derive(Debug, Clone, Copy)]
pub struct SensorSnapshot {
    /// Reflectance under the left front corner, 0 to 100.
    pub left_reflectance: f64,
    /// Reflectance under the right front corner, 0 to 100.
    pub right_reflectance: f64,
    /// Near-field proximity reading from the angled top sensor.
    pub proximity: Option<f64>,
    /// Range to whatever is ahead, mm, from the center distance sensor.
    pub distance_mm: Option<f64>,
    /// Monotonic time of the sample.
    pub sampled_at: Instant,
}

impl SensorSnapshot {
    /// A snapshot with the given reflectance readings and nothing detected.
    pub fn clear(left_reflectance: f64, right_reflectance: f64) -> Self {
        SensorSnapshot {
            left_reflectance,
            right_reflectance,
            proximity: None,
            distance_mm: None,
            sampled_at: Instant::now(),
        }
    }

    /// Whether either reflectance sensor currently reads the border line.
    pub fn sees_line(&self, edge_threshold: f64) -> bool {
        self.left_reflectance > edge_threshold || self.right_reflectance > edge_threshold
    }

    /// Whether either opponent sensor currently reads below its threshold.
    pub fn detects_opponent(&self, proximity_threshold: f64, distance_threshold_mm: f64) -> bool {
        let near = self.proximity.map(|p| p < proximity_threshold);
        let far = self.distance_mm.map(|d| d < distance_threshold_mm);
        near.unwrap_or(false) || far.unwrap_or(false)
    }
}
