use crate::core::timer::Countdown;
use crate::core::vehicle::{Vehicle, BASE_MAX_SPEED, BASE_MIN_SPEED};
use serde::{Deserialize, Serialize};

/// Speed multiplier applied on top of `max_speed` when a speed boost starts.
pub const SPEED_BOOST_FACTOR: f64 = 1.7;

/// Multiplier applied to speed and both speed bounds while a vehicle is slowed down.
pub const SLOW_FACTOR: f64 = 0.4;

/// Fixed exit point of the portal, (x, z) in world coordinates.
pub const PORTAL_DESTINATION: [f64; 2] = [-65.0, 30.0];

/// Heading (deg) of a vehicle leaving the portal.
pub const PORTAL_HEADING_DEG: f64 = 200.0;

/// Special effects that power-ups and obstacles put on a vehicle. The table below is fixed, a
/// power-up or obstacle only decides which kind it hands out.
///
/// | kind   | duration (ticks) | on activation                  | on expiry                     |
/// |--------|------------------|--------------------------------|-------------------------------|
/// | Speed  | 100              | speed = 1.7 * max, heading = 0 | speed = max                   |
/// | Portal | 10               | teleport to portal exit        | -                             |
/// | Dizzy  | 200              | dizzy = true                   | dizzy = false                 |
/// | Block  | 250              | blocked = true                 | blocked = false               |
/// | Slow   | 200              | speed and bounds * 0.4         | bounds restored to base       |
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Speed,
    Portal,
    Dizzy,
    Block,
    Slow,
}

impl EffectKind {
    pub fn duration(self) -> u32 {
        match self {
            EffectKind::Speed => 100,
            EffectKind::Portal => 10,
            EffectKind::Dizzy => 200,
            EffectKind::Block => 250,
            EffectKind::Slow => 200,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Speed => "Speed",
            EffectKind::Portal => "Portal",
            EffectKind::Dizzy => "Dizzy",
            EffectKind::Block => "Block",
            EffectKind::Slow => "Slow",
        }
    }

    /// Whether the kind is handed out by a power-up (fixed at race setup) or by a player-placed
    /// obstacle.
    pub fn is_power_up(self) -> bool {
        matches!(self, EffectKind::Speed | EffectKind::Portal)
    }

    fn on_activate(self, vehicle: &mut Vehicle) {
        match self {
            EffectKind::Speed => {
                vehicle.speed = vehicle.max_speed * SPEED_BOOST_FACTOR;
                vehicle.heading = 0.0;
            }
            EffectKind::Portal => {
                vehicle.x = PORTAL_DESTINATION[0];
                vehicle.z = PORTAL_DESTINATION[1];
                vehicle.heading = PORTAL_HEADING_DEG.to_radians();
            }
            EffectKind::Dizzy => vehicle.dizzy = true,
            EffectKind::Block => vehicle.blocked = true,
            EffectKind::Slow => {
                vehicle.speed *= SLOW_FACTOR;
                vehicle.max_speed *= SLOW_FACTOR;
                vehicle.min_speed *= SLOW_FACTOR;
            }
        }
    }

    fn on_expire(self, vehicle: &mut Vehicle) {
        match self {
            EffectKind::Speed => vehicle.speed = vehicle.max_speed,
            EffectKind::Portal => {}
            EffectKind::Dizzy => vehicle.dizzy = false,
            EffectKind::Block => vehicle.blocked = false,
            EffectKind::Slow => {
                vehicle.max_speed = BASE_MAX_SPEED;
                vehicle.min_speed = BASE_MIN_SPEED;
            }
        }
    }
}

/// An effect currently running on a vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    countdown: Countdown,
}

impl ActiveEffect {
    pub fn new(kind: EffectKind) -> ActiveEffect {
        ActiveEffect {
            kind,
            countdown: Countdown::new(kind.duration()),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }
}

/// tick_effect advances the vehicle's active effect by one tick and fires its triggers. Once the
/// countdown has run out the effect is removed from the vehicle.
pub fn tick_effect(vehicle: &mut Vehicle) {
    let (kind, step, finished) = match vehicle.effect.as_mut() {
        Some(active) => {
            let step = active.countdown.step();
            (active.kind, step, active.countdown.is_finished())
        }
        None => return,
    };

    if step.activated {
        log::debug!("{} effect activated on {}", kind.name(), vehicle.model);
        kind.on_activate(vehicle);
    }
    if step.expired {
        log::debug!("{} effect expired on {}", kind.name(), vehicle.model);
        kind.on_expire(vehicle);
    }
    if finished {
        vehicle.effect = None;
    }
}
