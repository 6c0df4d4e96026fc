//! Attack selection for the Ares robot
//!
//! The near-field proximity sensor outranks the wider-range distance
//! sensor: it only fires when the opponent is already close, so it carries
//! more urgency and fewer false positives. A missing reading is "no
//! detection", never zero.

use crate::config::CombatConfig;
use crate::perception::SensorSnapshot;

/// The attack the selector committed to for this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackPlan {
    /// Near-range attack at full speed.
    Near,
    /// Far-range attack; the speed leaves braking margin at long range.
    Far { speed_mm_s: f64 },
}

/// Pick an attack from the snapshot, or `None` when nothing qualifies.
pub fn select(snapshot: &SensorSnapshot, config: &CombatConfig) -> Option<AttackPlan> {
    if let Some(proximity) = snapshot.proximity {
        if proximity < config.proximity_attack_threshold {
            return Some(AttackPlan::Near);
        }
    }
    if let Some(distance_mm) = snapshot.distance_mm {
        if distance_mm < config.distance_attack_threshold_mm {
            return Some(AttackPlan::Far {
                speed_mm_s: far_attack_speed(distance_mm, config),
            });
        }
    }
    None
}

/// Forward speed for a far-range attack.
///
/// When scaling is enabled the speed ramps linearly from the minimum
/// fraction at the detection threshold up to full speed at zero range,
/// never dropping below the configured floor.
pub fn far_attack_speed(distance_mm: f64, config: &CombatConfig) -> f64 {
    if !config.scaled_far_attack {
        return config.attack_speed_mm_s;
    }
    let ramp = 1.0 - (distance_mm / config.distance_attack_threshold_mm)
        * (1.0 - config.min_attack_fraction);
    config.attack_speed_mm_s * ramp.clamp(config.min_attack_fraction, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CombatConfig {
        CombatConfig::default()
    }

    fn snapshot(proximity: Option<f64>, distance_mm: Option<f64>) -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::clear(10.0, 10.0);
        snapshot.proximity = proximity;
        snapshot.distance_mm = distance_mm;
        snapshot
    }

    #[test]
    fn proximity_outranks_distance() {
        // Both sensors qualify; the near-field reading wins.
        let plan = select(&snapshot(Some(60.0), Some(150.0)), &config());
        assert_eq!(plan, Some(AttackPlan::Near));
    }

    #[test]
    fn qualifying_proximity_triggers_near_attack_despite_far_distance() {
        let plan = select(&snapshot(Some(60.0), Some(300.0)), &config());
        assert_eq!(plan, Some(AttackPlan::Near));
    }

    #[test]
    fn distance_alone_triggers_far_attack() {
        match select(&snapshot(None, Some(150.0)), &config()) {
            Some(AttackPlan::Far { speed_mm_s }) => {
                let config = config();
                assert!(speed_mm_s < config.attack_speed_mm_s);
                assert!(speed_mm_s >= config.attack_speed_mm_s * config.min_attack_fraction);
            }
            other => panic!("expected far attack, got {:?}", other),
        }
    }

    #[test]
    fn missing_readings_never_attack() {
        assert_eq!(select(&snapshot(None, None), &config()), None);
    }

    #[test]
    fn readings_at_threshold_do_not_attack() {
        let config = config();
        assert_eq!(select(&snapshot(Some(75.0), Some(200.0)), &config), None);
    }

    #[test]
    fn far_speed_ramps_up_as_range_closes() {
        let config = config();
        let near = far_attack_speed(20.0, &config);
        let far = far_attack_speed(190.0, &config);
        assert!(near > far);
        assert!(near <= config.attack_speed_mm_s);
        assert!(far >= config.attack_speed_mm_s * config.min_attack_fraction);
    }

    #[test]
    fn far_speed_is_clamped_to_minimum_fraction() {
        let mut config = config();
        config.min_attack_fraction = 0.6;
        let speed = far_attack_speed(199.0, &config);
        assert!(speed >= config.attack_speed_mm_s * 0.6);
    }

    #[test]
    fn unscaled_far_attack_uses_full_speed() {
        let mut config = config();
        config.scaled_far_attack = false;
        assert_eq!(far_attack_speed(150.0, &config), config.attack_speed_mm_s);
    }
}
