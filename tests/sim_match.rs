//! End-to-end runs of the combat stack against the simulated arena.

use std::time::Duration;

use nalgebra::Point2;

use ares_core::behaviors::{CombatStack, ControllerState};
use ares_core::common::KillSwitch;
use ares_core::config::{CombatConfig, SearchStyle};
use ares_core::lifecycle::LifecycleNode;
use ares_core::sim::{ArenaSim, SimDrivetrain};
use ares_core::sim::ScriptedSource;
use ares_core::perception::SensorSnapshot;
use ares_core::AresCore;

const RING_RADIUS_MM: f64 = 385.0;

#[tokio::test(start_paused = true)]
async fn facing_the_border_triggers_edge_evasion() {
    let (sensors, drive, arena) = ArenaSim::split(
        RING_RADIUS_MM,
        Point2::new(320.0, 0.0),
        0.0, // nose toward the border
        Point2::new(-300.0, 0.0),
    );
    let mut stack =
        CombatStack::new(CombatConfig::default(), Box::new(sensors), Box::new(drive)).unwrap();
    let kill = KillSwitch::new();

    let state = stack.step(&kill).await.unwrap();

    assert_eq!(state, ControllerState::EdgeBoth);
    assert!(!arena.robot_out());
    // The retreat leg pulled the robot back toward the interior.
    assert!(arena.robot_from_center() < 320.0);
}

#[tokio::test(start_paused = true)]
async fn skewed_approach_classifies_the_near_side() {
    // Heading along +y with the border off the right shoulder.
    let (sensors, drive, _arena) = ArenaSim::split(
        RING_RADIUS_MM,
        Point2::new(330.0, 0.0),
        std::f64::consts::FRAC_PI_2,
        Point2::new(-300.0, 0.0),
    );
    let mut stack =
        CombatStack::new(CombatConfig::default(), Box::new(sensors), Box::new(drive)).unwrap();
    let kill = KillSwitch::new();

    let state = stack.step(&kill).await.unwrap();
    assert_eq!(state, ControllerState::EdgeRight);
}

#[tokio::test(start_paused = true)]
async fn push_match_ends_with_opponent_out_and_robot_in() {
    let (sensors, drive, arena) = ArenaSim::split(
        RING_RADIUS_MM,
        Point2::new(0.0, 0.0),
        0.0,
        Point2::new(180.0, 0.0), // dead ahead, inside far-attack range
    );
    let mut stack =
        CombatStack::new(CombatConfig::default(), Box::new(sensors), Box::new(drive)).unwrap();
    stack.on_configure().unwrap();
    stack.on_activate().unwrap();

    let kill = KillSwitch::new();
    let clock = kill.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        clock.trigger();
    });

    stack.run(kill).await.unwrap();

    assert!(arena.opponent_out(), "opponent should be shoved over the line");
    assert!(!arena.robot_out(), "edge guard must keep the robot inside");
}

#[tokio::test(start_paused = true)]
async fn registry_wires_init_run_and_shutdown() {
    let (sensors, drive, _arena) = ArenaSim::split(
        RING_RADIUS_MM,
        Point2::new(-100.0, 0.0),
        0.0,
        Point2::new(250.0, 40.0),
    );
    let mut config = CombatConfig::default();
    config.search_style = SearchStyle::Sweep;
    let stack = CombatStack::new(config, Box::new(sensors), Box::new(drive)).unwrap();

    let mut core = AresCore::new();
    core.register(stack);
    core.init().unwrap();

    let kill = KillSwitch::new();
    let clock = kill.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        clock.trigger();
    });

    core.combat_stack_mut().unwrap().run(kill).await.unwrap();
    core.shutdown().unwrap();
}

#[tokio::test(start_paused = true)]
async fn kill_switch_interrupts_an_active_push() {
    // Opponent parked in detection range forever: the stack would push for
    // the full budget if nothing interrupted it.
    let mut snapshot = SensorSnapshot::clear(10.0, 10.0);
    snapshot.proximity = Some(40.0);
    snapshot.distance_mm = Some(120.0);

    let drivetrain = SimDrivetrain::new();
    let mut stack = CombatStack::new(
        CombatConfig::default(),
        Box::new(ScriptedSource::repeating(snapshot)),
        Box::new(drivetrain.clone()),
    )
    .unwrap();
    stack.on_configure().unwrap();
    stack.on_activate().unwrap();

    let kill = KillSwitch::new();
    let trigger = kill.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.trigger();
    });

    stack.run(kill).await.unwrap();
    assert!(drivetrain.is_stopped());
}
