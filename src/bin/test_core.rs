use ares_core::behaviors::CombatStack;
use ares_core::common::KillSwitch;
use ares_core::config::{AttackStyle, CombatConfig, SearchStyle};
use ares_core::perception::SensorSnapshot;
use ares_core::sim::{ScriptedSource, SimDrivetrain};
use ares_core::AresCore;
use std::collections::HashMap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Initializing Ares Core...");

    let mut config = CombatConfig::new()?;

    // Configure a couple of thresholds the way a bench calibration would
    let mut params = HashMap::new();
    params.insert("edge_reflectance_threshold".to_string(), 50.0);
    params.insert("distance_attack_threshold_mm".to_string(), 180.0);
    config.apply_params(&params)?;
    // One decision per canned frame below: continuous-command styles.
    config.attack_style = AttackStyle::Ram;
    config.search_style = SearchStyle::Sweep;

    // Canned snapshots walking through every controller state
    let mut near = SensorSnapshot::clear(10.0, 10.0);
    near.proximity = Some(60.0);
    near.distance_mm = Some(300.0);

    let mut far = SensorSnapshot::clear(10.0, 10.0);
    far.distance_mm = Some(150.0);

    let frames = vec![
        SensorSnapshot::clear(10.0, 10.0), // nothing out there: search
        near,                              // proximity wins: near attack
        far,                               // distance only: far attack
        SensorSnapshot::clear(80.0, 10.0), // line under the left sensor
        SensorSnapshot::clear(10.0, 10.0), // clear again after evasion
    ];

    let drivetrain = SimDrivetrain::new();
    let stack = CombatStack::new(
        config,
        Box::new(ScriptedSource::sequence(frames)),
        Box::new(drivetrain.clone()),
    )?;

    let mut core = AresCore::new();
    core.register(stack);

    match core.init() {
        Ok(_) => println!("Core initialized successfully!"),
        Err(e) => {
            println!("Failed to initialize core: {}", e);
            return Ok(());
        }
    }

    let kill = KillSwitch::new();
    let stack = core
        .combat_stack_mut()
        .expect("combat stack was just registered");

    for cycle in 0..5 {
        let state = stack.step(&kill).await?;
        println!("Cycle {}: {}", cycle, state.name());
    }

    println!(
        "Drivetrain saw {} commands, stopped: {}",
        drivetrain.records().len(),
        drivetrain.is_stopped()
    );

    match core.shutdown() {
        Ok(_) => println!("Core shutdown successfully!"),
        Err(e) => println!("Failed to shutdown core: {}", e),
    }

    Ok(())
}
