//! Passive search sweep for the Ares robot

use crate::config::CombatConfig;
use crate::control::drivetrain::DrivetrainCommand;

/// The continuous curved-forward command that sweeps the arena when nothing
/// else demands the drivetrain. Issued and returned from immediately; the
/// loop re-polls at the next cycle.
pub fn sweep_command(config: &CombatConfig) -> DrivetrainCommand {
    DrivetrainCommand::Drive {
        linear_mm_s: config.search_speed_mm_s,
        angular_deg_s: config.search_turn_rate_deg_s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_is_a_nonzero_curved_drive() {
        let config = CombatConfig::default();
        match sweep_command(&config) {
            DrivetrainCommand::Drive {
                linear_mm_s,
                angular_deg_s,
            } => {
                assert!(linear_mm_s > 0.0);
                assert!(angular_deg_s != 0.0);
            }
            other => panic!("expected a drive command, got {:?}", other),
        }
    }
}
