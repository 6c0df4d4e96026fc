//! Border detection and evasion for the Ares robot
//!
//! Falling off the ring loses the match outright, so edge handling dominates
//! every other signal, every cycle, including mid-attack.

use tokio::time::sleep;
use tracing::info;

use crate::common::{KillSwitch, TurnDirection};
use crate::config::CombatConfig;
use crate::control::drivetrain::{DriveError, StopMode};
use crate::control::maneuver::ManeuverExecutor;
use crate::control::DriveController;
use crate::perception::SensorSnapshot;

/// Which reflectance sensors saw the border line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEvent {
    Both,
    Left,
    Right,
}

impl EdgeEvent {
    /// Escape rotation away from the triggering side, back toward the
    /// arena interior. A both-sides hit escapes toward the default side.
    pub fn escape_direction(self) -> TurnDirection {
        match self {
            EdgeEvent::Both => TurnDirection::Right,
            EdgeEvent::Left => TurnDirection::Right,
            EdgeEvent::Right => TurnDirection::Left,
        }
    }
}

/// Classify the snapshot's reflectance readings against the line threshold.
///
/// Pure: repeated calls on the same snapshot give the same answer, with no
/// residual state in between.
pub fn classify(snapshot: &SensorSnapshot, config: &CombatConfig) -> Option<EdgeEvent> {
    let left = snapshot.left_reflectance > config.edge_reflectance_threshold;
    let right = snapshot.right_reflectance > config.edge_reflectance_threshold;
    match (left, right) {
        (true, true) => Some(EdgeEvent::Both),
        (true, false) => Some(EdgeEvent::Left),
        (false, true) => Some(EdgeEvent::Right),
        (false, false) => None,
    }
}

/// Run the evasive maneuver for a classified edge event: braking stop, a
/// short stabilization wait, then retreat-and-turn toward the interior.
///
/// Ends with the drivetrain stopped on every path, including drive errors.
pub async fn respond(
    executor: &ManeuverExecutor,
    drive: &mut DriveController,
    event: EdgeEvent,
    config: &CombatConfig,
    kill: &KillSwitch,
) -> Result<(), DriveError> {
    info!(?event, "edge detected, evading");

    drive.stop(StopMode::Brake)?;
    sleep(config.stabilize()).await;

    let (retreat_mm, angle_deg) = match event {
        EdgeEvent::Both => (
            config.retreat_distance_both_mm,
            config.edge_turn_angle_both_deg,
        ),
        EdgeEvent::Left | EdgeEvent::Right => {
            (config.retreat_distance_mm, config.edge_turn_angle_deg)
        }
    };

    executor
        .retreat_and_turn(drive, retreat_mm, event.escape_direction(), angle_deg, kill)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimDrivetrain;

    fn config() -> CombatConfig {
        CombatConfig::default()
    }

    fn snapshot(left: f64, right: f64) -> SensorSnapshot {
        SensorSnapshot::clear(left, right)
    }

    #[test]
    fn classifies_all_four_cases() {
        let config = config();
        assert_eq!(
            classify(&snapshot(80.0, 80.0), &config),
            Some(EdgeEvent::Both)
        );
        assert_eq!(
            classify(&snapshot(80.0, 10.0), &config),
            Some(EdgeEvent::Left)
        );
        assert_eq!(
            classify(&snapshot(10.0, 80.0), &config),
            Some(EdgeEvent::Right)
        );
        assert_eq!(classify(&snapshot(10.0, 10.0), &config), None);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let config = config();
        assert_eq!(classify(&snapshot(50.0, 50.0), &config), None);
    }

    #[test]
    fn classification_is_idempotent() {
        let config = config();
        let clear = snapshot(10.0, 10.0);
        assert_eq!(classify(&clear, &config), None);
        assert_eq!(classify(&clear, &config), None);
    }

    #[test]
    fn escape_turns_away_from_the_line() {
        assert_eq!(EdgeEvent::Left.escape_direction(), TurnDirection::Right);
        assert_eq!(EdgeEvent::Right.escape_direction(), TurnDirection::Left);
        assert_eq!(EdgeEvent::Both.escape_direction(), TurnDirection::Right);
    }

    #[tokio::test(start_paused = true)]
    async fn respond_retreats_then_turns_and_stops() {
        let config = config();
        let drivetrain = SimDrivetrain::new();
        let mut drive = DriveController::new(Box::new(drivetrain.clone()), config.axle_track_mm);
        let executor = ManeuverExecutor::new(config.clone());
        let kill = KillSwitch::new();

        respond(&executor, &mut drive, EdgeEvent::Right, &config, &kill)
            .await
            .unwrap();

        assert!(drivetrain.is_stopped());
        let drives = drivetrain.drive_commands();
        // Backward leg first, then a counterclockwise (leftward) escape turn.
        assert!(drives[0].0 < 0.0);
        assert!(drives[1].1 > 0.0);
    }
}
