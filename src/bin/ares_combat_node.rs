use std::time::Duration;

use anyhow::Result;
use nalgebra::Point2;

use ares_core::behaviors::CombatStack;
use ares_core::common::KillSwitch;
use ares_core::config::CombatConfig;
use ares_core::sim::ArenaSim;
use ares_core::AresCore;

/// Seconds between the operator go-ahead and the first command, per match
/// rules.
const PRE_MATCH_DELAY_SECS: u64 = 5;
/// Wall-clock bound on the simulated match.
const MATCH_DURATION_SECS: u64 = 30;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Initializing Ares Combat Node...");

    let config = CombatConfig::new()?;
    println!(
        "Using parameters: edge_threshold={}, attack_speed={} mm/s, poll={} ms",
        config.edge_reflectance_threshold, config.attack_speed_mm_s, config.poll_interval_ms
    );

    // A 77 cm ring with the opponent across the center, like a practice mat.
    let (sensors, drive, arena) = ArenaSim::split(
        385.0,
        Point2::new(-150.0, 0.0),
        0.0,
        Point2::new(200.0, 60.0),
    );

    let stack = CombatStack::new(config, Box::new(sensors), Box::new(drive))?;

    let mut core = AresCore::new();
    core.register(stack);
    core.init().map_err(anyhow::Error::msg)?;
    println!("Core initialized successfully!");

    // Stand-in for the operator start gate: confirm, then clear the ring.
    println!("Match starts in {} s...", PRE_MATCH_DELAY_SECS);
    tokio::time::sleep(Duration::from_secs(PRE_MATCH_DELAY_SECS)).await;

    let kill = KillSwitch::new();

    // Ctrl-C or the match clock ends the bout.
    let on_interrupt = kill.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Operator stop!");
            on_interrupt.trigger();
        }
    });
    let on_clock = kill.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(MATCH_DURATION_SECS)).await;
        println!("Match clock expired.");
        on_clock.trigger();
    });

    println!("Fight!");
    core.combat_stack_mut()
        .expect("combat stack was just registered")
        .run(kill)
        .await?;

    let (position, heading) = arena.robot_pose();
    println!(
        "Final pose: x={:.0} mm, y={:.0} mm, heading={:.2} rad",
        position.x, position.y, heading
    );
    match (arena.opponent_out(), arena.robot_out()) {
        (true, false) => println!("Opponent pushed out - match won!"),
        (false, true) => println!("Robot left the ring - match lost."),
        _ => println!("No decision inside the match clock."),
    }

    core.shutdown().map_err(anyhow::Error::msg)?;
    println!("Core shutdown successfully!");

    Ok(())
}
