//! Sensor interfaces for the Ares robot

use crate::perception::SensorSnapshot;

/// The sensor-acquisition collaborator.
///
/// The core calls `sample` exactly once at the top of each arbitration cycle
/// and once per maneuver poll tick; the returned snapshot is never mutated.
pub trait SnapshotSource: Send {
    /// Get the source name
    fn name(&self) -> &str;

    /// Read all sensors once and return the combined snapshot
    fn sample(&mut self) -> SensorSnapshot;
}
