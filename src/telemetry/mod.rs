//! Telemetry seam for the Ares robot
//!
//! The loop reports one event per state *transition*, never one per cycle;
//! the debounce lives in the combat stack, so sinks stay dumb.

use tracing::info;

use crate::behaviors::ControllerState;
use crate::perception::SensorSnapshot;

/// The logging/UI collaborator fed by the arbitration loop.
pub trait TelemetrySink: Send {
    /// Called once each time the controller enters a new state, with the
    /// snapshot that caused the transition.
    fn on_state(&mut self, state: ControllerState, snapshot: &SensorSnapshot);
}

/// Default sink: structured log events.
#[derive(Debug, Default)]
pub struct TraceTelemetry;

impl TelemetrySink for TraceTelemetry {
    fn on_state(&mut self, state: ControllerState, snapshot: &SensorSnapshot) {
        info!(
            state = state.name(),
            left = snapshot.left_reflectance,
            right = snapshot.right_reflectance,
            proximity = ?snapshot.proximity,
            distance_mm = ?snapshot.distance_mm,
            "state"
        );
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every reported state for assertions.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        states: Arc<Mutex<Vec<ControllerState>>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            RecordingSink::default()
        }

        pub fn states(&self) -> Vec<ControllerState> {
            self.states.lock().unwrap().clone()
        }
    }

    impl TelemetrySink for RecordingSink {
        fn on_state(&mut self, state: ControllerState, _snapshot: &SensorSnapshot) {
            self.states.lock().unwrap().push(state);
        }
    }
}
