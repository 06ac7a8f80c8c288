use crate::core::effects::EffectKind;
use crate::core::vehicle::COLLISION_HALF_EXTENT;
use serde::{Deserialize, Serialize};

/// Spin (rad) a placed obstacle's visual advances per unpaused tick.
pub const OBSTACLE_SPIN_PER_TICK: f64 = 0.01;

/// * `kind` - Special effect handed out on contact
/// * `position` - (x, z) world position
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct HazardPars {
    pub kind: EffectKind,
    pub position: [f64; 2],
}

/// hits tests whether a vehicle at (x, z) touches a hazard at `position`.
fn hits(position: [f64; 2], x: f64, z: f64) -> bool {
    (position[0] - x).abs() < COLLISION_HALF_EXTENT
        && (position[1] - z).abs() < COLLISION_HALF_EXTENT
}

/// A power-up is fixed at race setup and never consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub kind: EffectKind,
    pub position: [f64; 2],
}

impl PowerUp {
    pub fn new(pars: &HazardPars) -> PowerUp {
        PowerUp {
            kind: pars.kind,
            position: pars.position,
        }
    }

    pub fn duration(&self) -> u32 {
        self.kind.duration()
    }

    pub fn check_collision(&self, x: f64, z: f64) -> bool {
        hits(self.position, x, z)
    }
}

/// A player-placed obstacle. `id` identifies the obstacle towards the scene collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub kind: EffectKind,
    pub position: [f64; 2],
    spin: f64,
}

impl Obstacle {
    pub fn new(id: u32, pars: &HazardPars) -> Obstacle {
        Obstacle {
            id,
            kind: pars.kind,
            position: pars.position,
            spin: 0.0,
        }
    }

    pub fn duration(&self) -> u32 {
        self.kind.duration()
    }

    pub fn check_collision(&self, x: f64, z: f64) -> bool {
        hits(self.position, x, z)
    }

    /// animate advances the cosmetic spin of the obstacle by one tick.
    pub fn animate(&mut self) {
        self.spin = (self.spin + OBSTACLE_SPIN_PER_TICK) % (2.0 * std::f64::consts::PI);
    }

    pub fn spin(&self) -> f64 {
        self.spin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hazard_duration_follows_kind() {
        let pars = HazardPars {
            kind: EffectKind::Block,
            position: [-50.0, 90.0],
        };
        assert_eq!(Obstacle::new(0, &pars).duration(), 250);
        assert_eq!(PowerUp::new(&pars).duration(), 250);
    }

    #[test]
    fn proximity_is_strict() {
        let power_up = PowerUp::new(&HazardPars {
            kind: EffectKind::Speed,
            position: [2.0, 80.0],
        });
        assert!(power_up.check_collision(2.9, 79.1));
        assert!(!power_up.check_collision(3.0, 80.0));
        assert!(!power_up.check_collision(2.0, 81.0));
    }

    #[test]
    fn obstacle_spins_while_animated() {
        let mut obstacle = Obstacle::new(
            3,
            &HazardPars {
                kind: EffectKind::Dizzy,
                position: [0.0, -20.0],
            },
        );
        for _ in 0..5 {
            obstacle.animate();
        }
        assert_abs_diff_eq!(obstacle.spin(), 0.05, epsilon = 1e-12);
    }
}
