//! Common utilities and types for the Ares robot

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A rotation direction, so behavior code never hard-codes sign conventions.
///
/// Positive angular rates turn the robot counterclockwise (left); the
/// multiplier below maps a direction onto that convention. Hardware-side
/// inversion (wiring, mirrored gearboxes) is the drivetrain's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Sign applied to an angular rate to rotate in this direction.
    pub fn multiplier(self) -> f64 {
        match self {
            TurnDirection::Left => 1.0,
            TurnDirection::Right => -1.0,
        }
    }

}

/// Cloneable stop flag for the control loop and everything running under it.
///
/// Checked at the top of every arbitration cycle and at every maneuver poll
/// tick, which is the same granularity at which edge aborts are observed.
#[derive(Debug, Clone, Default)]
pub struct KillSwitch {
    flag: Arc<AtomicBool>,
}

impl KillSwitch {
    /// Create a new, untriggered kill switch.
    pub fn new() -> Self {
        KillSwitch {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request that the control loop and any in-flight maneuver wind down.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_switch_is_shared_across_clones() {
        let kill = KillSwitch::new();
        let handle = kill.clone();
        assert!(!kill.is_triggered());
        handle.trigger();
        assert!(kill.is_triggered());
    }

    #[test]
    fn turn_direction_multipliers_oppose() {
        assert_eq!(TurnDirection::Left.multiplier(), 1.0);
        assert_eq!(TurnDirection::Right.multiplier(), -1.0);
    }
}
