//! Active hunt cycle for the Ares robot
//!
//! The escalation used when passive sweeping is not aggressive enough:
//! glance to one side, spin-scan across the other, and close with a short
//! advance to force contact. Any detection anywhere dispatches an immediate
//! sustained push. Any edge abort hands control straight back to the
//! arbitration loop, which re-classifies on its next cycle; the hunt never
//! handles the edge itself.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::common::{KillSwitch, TurnDirection};
use crate::config::CombatConfig;
use crate::control::drivetrain::{DriveError, DrivetrainCommand};
use crate::control::maneuver::{Completion, ManeuverExecutor};
use crate::control::DriveController;
use crate::perception::sensors::SnapshotSource;

/// How a hunt cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntOutcome {
    /// The opponent was found and a sustained push ran; carries the push's
    /// own completion.
    Engaged(Completion),
    /// The full cycle ran without a detection.
    NothingFound,
    /// An edge reading or the kill switch cut the cycle short.
    Interrupted,
}

/// Run one full hunt cycle.
pub async fn run_cycle(
    executor: &ManeuverExecutor,
    drive: &mut DriveController,
    sensors: &mut dyn SnapshotSource,
    config: &CombatConfig,
    kill: &KillSwitch,
) -> Result<HuntOutcome, DriveError> {
    debug!("hunt cycle start");

    // Glance left, settle, and check the fast front sensors.
    if executor
        .rotate_by(drive, config.hunt_look_angle_deg, TurnDirection::Left, kill)
        .await?
        == Completion::Aborted
    {
        return Ok(HuntOutcome::Interrupted);
    }
    if let Some(outcome) = look(executor, drive, sensors, config, kill).await? {
        return Ok(outcome);
    }

    // Spin-scan across to the right.
    match executor
        .rotate_and_scan(drive, sensors, TurnDirection::Right, kill)
        .await?
    {
        Completion::TargetAcquired => {
            let push = executor.sustained_push(drive, sensors, kill).await?;
            return Ok(HuntOutcome::Engaged(push));
        }
        Completion::Aborted => return Ok(HuntOutcome::Interrupted),
        _ => {}
    }

    // Glance to the right of center and check again.
    if executor
        .rotate_by(
            drive,
            2.0 * config.hunt_look_angle_deg,
            TurnDirection::Right,
            kill,
        )
        .await?
        == Completion::Aborted
    {
        return Ok(HuntOutcome::Interrupted);
    }
    if let Some(outcome) = look(executor, drive, sensors, config, kill).await? {
        return Ok(outcome);
    }

    // Spin-scan back across to the left.
    match executor
        .rotate_and_scan(drive, sensors, TurnDirection::Left, kill)
        .await?
    {
        Completion::TargetAcquired => {
            let push = executor.sustained_push(drive, sensors, kill).await?;
            return Ok(HuntOutcome::Engaged(push));
        }
        Completion::Aborted => return Ok(HuntOutcome::Interrupted),
        _ => {}
    }

    // Last resort: a short advance to force contact with a large opponent
    // sitting just outside the sensor cones. Edge-aborted like any maneuver.
    match executor
        .run(
            drive,
            sensors,
            DrivetrainCommand::Drive {
                linear_mm_s: config.blind_advance_speed_mm_s,
                angular_deg_s: 0.0,
            },
            Duration::from_millis(config.blind_advance_ms),
            kill,
            {
                let edge = config.edge_reflectance_threshold;
                move |snapshot| snapshot.sees_line(edge)
            },
            {
                let proximity = config.proximity_attack_threshold;
                let distance = config.distance_attack_threshold_mm;
                move |snapshot| {
                    snapshot
                        .detects_opponent(proximity, distance)
                        .then_some(Completion::TargetAcquired)
                }
            },
        )
        .await?
    {
        Completion::TargetAcquired => {
            let push = executor.sustained_push(drive, sensors, kill).await?;
            Ok(HuntOutcome::Engaged(push))
        }
        Completion::Aborted => Ok(HuntOutcome::Interrupted),
        _ => {
            debug!("hunt cycle found nothing");
            Ok(HuntOutcome::NothingFound)
        }
    }
}

/// Settle after a glance, sample once, and push if anything is in range.
async fn look(
    executor: &ManeuverExecutor,
    drive: &mut DriveController,
    sensors: &mut dyn SnapshotSource,
    config: &CombatConfig,
    kill: &KillSwitch,
) -> Result<Option<HuntOutcome>, DriveError> {
    sleep(Duration::from_millis(config.hunt_look_pause_ms)).await;
    let snapshot = sensors.sample();
    if snapshot.detects_opponent(
        config.proximity_attack_threshold,
        config.distance_attack_threshold_mm,
    ) {
        let push = executor.sustained_push(drive, sensors, kill).await?;
        return Ok(Some(HuntOutcome::Engaged(push)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::SensorSnapshot;
    use crate::sim::{ScriptedSource, SimDrivetrain};

    fn clear_snapshot() -> SensorSnapshot {
        SensorSnapshot::clear(10.0, 10.0)
    }

    fn opponent_ahead() -> SensorSnapshot {
        let mut snapshot = clear_snapshot();
        snapshot.distance_mm = Some(120.0);
        snapshot
    }

    fn edge_under_both() -> SensorSnapshot {
        SensorSnapshot::clear(90.0, 90.0)
    }

    #[tokio::test(start_paused = true)]
    async fn empty_arena_runs_full_cycle() {
        let config = CombatConfig::default();
        let drivetrain = SimDrivetrain::new();
        let mut drive = DriveController::new(Box::new(drivetrain.clone()), config.axle_track_mm);
        let executor = ManeuverExecutor::new(config.clone());
        let mut sensors = ScriptedSource::repeating(clear_snapshot());
        let kill = KillSwitch::new();

        let outcome = run_cycle(&executor, &mut drive, &mut sensors, &config, &kill)
            .await
            .unwrap();

        assert_eq!(outcome, HuntOutcome::NothingFound);
        assert!(drivetrain.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn detection_during_scan_dispatches_push() {
        let config = CombatConfig::default();
        let drivetrain = SimDrivetrain::new();
        let mut drive = DriveController::new(Box::new(drivetrain.clone()), config.axle_track_mm);
        let executor = ManeuverExecutor::new(config.clone());
        // Clear during the first glance, opponent appears while spinning,
        // then escapes mid-push.
        let mut sensors = ScriptedSource::sequence(vec![
            clear_snapshot(),
            clear_snapshot(),
            opponent_ahead(),
            opponent_ahead(),
            clear_snapshot(),
        ]);
        let kill = KillSwitch::new();

        let outcome = run_cycle(&executor, &mut drive, &mut sensors, &config, &kill)
            .await
            .unwrap();

        assert_eq!(outcome, HuntOutcome::Engaged(Completion::TargetLost));
        assert!(drivetrain.is_stopped());
        // The push drove forward at full attack speed at some point.
        assert!(drivetrain
            .drive_commands()
            .iter()
            .any(|&(linear, _)| linear == config.attack_speed_mm_s));
    }

    #[tokio::test(start_paused = true)]
    async fn edge_mid_scan_interrupts_the_hunt() {
        let config = CombatConfig::default();
        let drivetrain = SimDrivetrain::new();
        let mut drive = DriveController::new(Box::new(drivetrain.clone()), config.axle_track_mm);
        let executor = ManeuverExecutor::new(config.clone());
        let mut sensors = ScriptedSource::sequence(vec![
            clear_snapshot(),
            clear_snapshot(),
            edge_under_both(),
        ]);
        let kill = KillSwitch::new();

        let outcome = run_cycle(&executor, &mut drive, &mut sensors, &config, &kill)
            .await
            .unwrap();

        assert_eq!(outcome, HuntOutcome::Interrupted);
        assert!(drivetrain.is_stopped());
    }
}
