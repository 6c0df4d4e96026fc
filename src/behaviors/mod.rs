//! Behaviors module for the Ares robot
//!
//! The arbitration loop re-derives its decision from a fresh sensor
//! snapshot every cycle in strict priority order: edge evasion, then
//! attack, then search. The only state it keeps between cycles is the
//! debounce value used to rate-limit telemetry.

pub mod attack;
pub mod edge_guard;
pub mod hunt;
pub mod search;

use std::any::Any;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::common::KillSwitch;
use crate::config::{AttackStyle, CombatConfig, ConfigError, SearchStyle};
use crate::control::drivetrain::{DriveError, Drivetrain, DrivetrainCommand, StopMode};
use crate::control::maneuver::ManeuverExecutor;
use crate::control::DriveController;
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use crate::perception::sensors::SnapshotSource;
use crate::perception::SensorSnapshot;
use crate::telemetry::{TelemetrySink, TraceTelemetry};

use self::attack::AttackPlan;
use self::edge_guard::EdgeEvent;

/// What the controller decided this cycle.
///
/// Carried only for debounced telemetry; control decisions are recomputed
/// from the snapshot every cycle and never read this back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    EdgeBoth,
    EdgeLeft,
    EdgeRight,
    NearAttack,
    FarAttack,
    Search,
}

impl ControllerState {
    /// Human-readable state name for telemetry
    pub fn name(&self) -> &'static str {
        match self {
            ControllerState::EdgeBoth => "EDGE_BOTH",
            ControllerState::EdgeLeft => "EDGE_LEFT",
            ControllerState::EdgeRight => "EDGE_RIGHT",
            ControllerState::NearAttack => "NEAR_ATTACK",
            ControllerState::FarAttack => "FAR_ATTACK",
            ControllerState::Search => "SEARCH",
        }
    }
}

impl From<EdgeEvent> for ControllerState {
    fn from(event: EdgeEvent) -> Self {
        match event {
            EdgeEvent::Both => ControllerState::EdgeBoth,
            EdgeEvent::Left => ControllerState::EdgeLeft,
            EdgeEvent::Right => ControllerState::EdgeRight,
        }
    }
}

/// Combat stack for the robot: owns the sensors, the drivetrain and the
/// maneuver executor, and runs the arbitration loop over them.
pub struct CombatStack {
    base: LifecycleNodeBase,
    config: CombatConfig,
    sensors: Box<dyn SnapshotSource>,
    drive: DriveController,
    executor: ManeuverExecutor,
    telemetry: Box<dyn TelemetrySink>,
    last_state: Option<ControllerState>,
}

impl CombatStack {
    /// Create a combat stack over its two collaborators.
    ///
    /// The configuration is validated here; an invalid one is fatal.
    pub fn new(
        config: CombatConfig,
        sensors: Box<dyn SnapshotSource>,
        drivetrain: Box<dyn Drivetrain>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let drive = DriveController::new(drivetrain, config.axle_track_mm);
        let executor = ManeuverExecutor::new(config.clone());
        Ok(CombatStack {
            base: LifecycleNodeBase::new("combat_stack"),
            config,
            sensors,
            drive,
            executor,
            telemetry: Box::new(TraceTelemetry),
            last_state: None,
        })
    }

    /// Replace the default telemetry sink
    pub fn with_telemetry(mut self, telemetry: Box<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Run one arbitration cycle and return the state it decided.
    ///
    /// Edge evasion preempts attack, attack preempts search; a handled
    /// branch may block for the length of its maneuver, re-sampling and
    /// remaining abortable at every poll tick within it.
    pub async fn step(&mut self, kill: &KillSwitch) -> Result<ControllerState, DriveError> {
        let snapshot = self.sensors.sample();

        // Priority 1: never drive off the ring.
        if let Some(event) = edge_guard::classify(&snapshot, &self.config) {
            let state = ControllerState::from(event);
            self.report(state, &snapshot);
            edge_guard::respond(&self.executor, &mut self.drive, event, &self.config, kill)
                .await?;
            return Ok(state);
        }

        // Priority 2: attack whatever the opponent sensors see.
        if let Some(plan) = attack::select(&snapshot, &self.config) {
            let state = match plan {
                AttackPlan::Near => ControllerState::NearAttack,
                AttackPlan::Far { .. } => ControllerState::FarAttack,
            };
            self.report(state, &snapshot);
            self.engage(plan, kill).await?;
            return Ok(state);
        }

        // Priority 3: go looking for it.
        self.report(ControllerState::Search, &snapshot);
        match self.config.search_style {
            SearchStyle::Sweep => {
                self.drive.issue(search::sweep_command(&self.config))?;
            }
            SearchStyle::Hunt => {
                hunt::run_cycle(
                    &self.executor,
                    &mut self.drive,
                    self.sensors.as_mut(),
                    &self.config,
                    kill,
                )
                .await?;
            }
        }
        Ok(ControllerState::Search)
    }

    /// Run the arbitration loop until the kill switch fires.
    ///
    /// Handled edge/attack cycles restart immediately; only a search cycle
    /// sleeps for the poll interval. Drive faults are logged and yield to
    /// the next cycle's re-evaluation; there is no other retry policy. The
    /// drivetrain is stopped on the way out.
    pub async fn run(&mut self, kill: KillSwitch) -> Result<(), DriveError> {
        if !self.base.is_active() {
            warn!("combat stack is not armed, refusing to run");
            return Ok(());
        }
        info!(drivetrain = self.drive.name(), "combat loop running");

        while !kill.is_triggered() {
            match self.step(&kill).await {
                Ok(ControllerState::Search) => sleep(self.config.poll_interval()).await,
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, "cycle ended in a drive fault");
                    sleep(self.config.poll_interval()).await;
                }
            }
        }

        info!("kill switch triggered, stopping");
        self.drive.stop(StopMode::Brake)
    }

    /// Commit to an attack according to the configured style.
    async fn engage(&mut self, plan: AttackPlan, kill: &KillSwitch) -> Result<(), DriveError> {
        match (self.config.attack_style, plan) {
            // Ram: one continuous forward command, re-evaluated next cycle.
            (AttackStyle::Ram, AttackPlan::Near) => self.drive.issue(DrivetrainCommand::Drive {
                linear_mm_s: self.config.attack_speed_mm_s,
                angular_deg_s: 0.0,
            }),
            (AttackStyle::Ram, AttackPlan::Far { speed_mm_s }) => {
                self.drive.issue(DrivetrainCommand::Drive {
                    linear_mm_s: speed_mm_s,
                    angular_deg_s: 0.0,
                })
            }
            // Push: a bounded full-commitment shove that tracks the target.
            (AttackStyle::Push, _) => {
                self.executor
                    .sustained_push(&mut self.drive, self.sensors.as_mut(), kill)
                    .await?;
                Ok(())
            }
        }
    }

    /// Debounced telemetry: report only on state transitions.
    fn report(&mut self, state: ControllerState, snapshot: &SensorSnapshot) {
        if self.last_state != Some(state) {
            self.last_state = Some(state);
            self.telemetry.on_state(state, snapshot);
        }
    }
}

impl LifecycleNode for CombatStack {
    fn on_configure(&mut self) -> Result<(), String> {
        self.config.validate().map_err(|e| e.to_string())?;
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_activate(&mut self) -> Result<(), String> {
        // Arming starts from a known-safe commanded-stop state.
        self.drive
            .stop(StopMode::Brake)
            .map_err(|e| e.to_string())?;
        self.base.set_state(State::Active);
        Ok(())
    }

    fn on_deactivate(&mut self) -> Result<(), String> {
        self.drive
            .stop(StopMode::Brake)
            .map_err(|e| e.to_string())?;
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_cleanup(&mut self) -> Result<(), String> {
        self.drive
            .stop(StopMode::Coast)
            .map_err(|e| e.to_string())?;
        self.base.set_state(State::Unconfigured);
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
