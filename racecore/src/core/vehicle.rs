use crate::core::effects::{tick_effect, ActiveEffect, EffectKind, SPEED_BOOST_FACTOR};
use crate::interfaces::hud_interface::RgbColor;
use anyhow::Context;
use helpers::general::wrap_angle;
use serde::{Deserialize, Serialize};

/// Upper speed bound of an unaffected vehicle on the track (units per tick).
pub const BASE_MAX_SPEED: f64 = 0.4;
/// Lower speed bound of an unaffected vehicle on the track (reverse, units per tick).
pub const BASE_MIN_SPEED: f64 = -0.2;
/// Speed change per accelerate/brake command.
pub const SPEED_STEP: f64 = 0.01;
/// Counter value a turn command starts with, decremented once per integrated tick.
pub const TURN_BUDGET: u32 = 8;
/// Heading change (deg) per tick and unit of speed while a turn intent is active.
pub const TURN_RATE_DEG: f64 = 10.0;
/// Factor applied to speed and speed bounds when a vehicle leaves the track.
pub const OFF_TRACK_FACTOR: f64 = 0.2;
/// Half extent of the square used for proximity tests.
pub const COLLISION_HALF_EXTENT: f64 = 1.0;
/// Offset per axis by which a colliding vehicle is pushed away.
pub const AVOIDANCE_DISTANCE: f64 = 1.5;
/// Heading perturbation (deg) caused by a vehicle-vehicle collision.
pub const COLLISION_HEADING_KICK_DEG: f64 = 30.0;

/// Selection slot of a catalog vehicle. Player-slot vehicles can only be picked as the player's
/// car, opponent-slot vehicles only as the route-driven opponent.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VehicleRole {
    Player,
    Opponent,
}

/// * `model` - Model name, e.g. Aquamarine (cosmetic for the core)
/// * `color` - Body color as hex string, e.g. #00ffff
/// * `role` - Selection slot of the vehicle
/// * `parking_spot` - (x, z) position of the vehicle while it is parked
/// * `parking_heading` - (rad) Heading of the vehicle while it is parked
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VehiclePars {
    pub model: String,
    pub color: String,
    pub role: VehicleRole,
    pub parking_spot: [f64; 2],
    pub parking_heading: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnIntent {
    None,
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub model: String,
    pub color: RgbColor,
    pub role: VehicleRole,
    pub(crate) x: f64,
    pub(crate) z: f64,
    pub(crate) heading: f64,
    pub(crate) speed: f64,
    pub(crate) max_speed: f64,
    pub(crate) min_speed: f64,
    pub(crate) dizzy: bool,
    pub(crate) blocked: bool,
    pub(crate) effect: Option<ActiveEffect>,
    left: bool,
    right: bool,
    angle_offset: u32,
    off_track: bool,
    laps: u32,
    parking_spot: [f64; 2],
    parking_heading: f64,
}

impl Vehicle {
    pub fn new(vehicle_pars: &VehiclePars) -> anyhow::Result<Vehicle> {
        let color = vehicle_pars
            .color
            .parse::<css_color_parser::Color>()
            .context(format!(
                "Could not parse color {} of vehicle {}!",
                vehicle_pars.color, vehicle_pars.model
            ))?;

        let mut vehicle = Vehicle {
            model: vehicle_pars.model.to_owned(),
            color: RgbColor {
                r: color.r,
                g: color.g,
                b: color.b,
            },
            role: vehicle_pars.role,
            x: 0.0,
            z: 0.0,
            heading: 0.0,
            speed: 0.0,
            max_speed: BASE_MAX_SPEED,
            min_speed: BASE_MIN_SPEED,
            dizzy: false,
            blocked: false,
            effect: None,
            left: false,
            right: false,
            angle_offset: 0,
            off_track: false,
            laps: 0,
            parking_spot: vehicle_pars.parking_spot,
            parking_heading: vehicle_pars.parking_heading,
        };
        vehicle.park();
        Ok(vehicle)
    }

    // ---------------------------------------------------------------------------------------------
    // CONTROL INTENTS -----------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn accelerate(&mut self) {
        if self.speed < self.max_speed {
            self.speed = (self.speed + SPEED_STEP).min(self.max_speed);
        }
    }

    pub fn brake(&mut self) {
        if self.speed > self.min_speed {
            self.speed = (self.speed - SPEED_STEP).max(self.min_speed);
        }
    }

    /// turn_left starts a left turn. Dizziness is not considered here, the caller swaps the
    /// commands if required.
    pub fn turn_left(&mut self) {
        self.left = true;
        self.right = false;
        self.angle_offset = TURN_BUDGET;
    }

    pub fn turn_right(&mut self) {
        self.right = true;
        self.left = false;
        self.angle_offset = TURN_BUDGET;
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// update advances the vehicle by one tick: the active special effect is applied first, then
    /// the kinematic state is integrated unless the vehicle is blocked.
    pub fn update(&mut self) {
        tick_effect(self);
        if self.blocked {
            return;
        }

        self.x -= self.speed * self.heading.sin();
        self.z -= self.speed * self.heading.cos();

        // turn rate grows with speed, the number of turning ticks does not
        let rate = (TURN_RATE_DEG * self.speed).to_radians();

        if self.right {
            self.heading -= rate;
            self.consume_turn_budget();
        } else if self.left {
            self.heading += rate;
            self.consume_turn_budget();
        }

        self.heading = wrap_angle(self.heading);
        self.debug_check_invariants();
    }

    fn consume_turn_budget(&mut self) {
        self.angle_offset = self.angle_offset.saturating_sub(1);
        if self.angle_offset == 0 {
            self.left = false;
            self.right = false;
        }
    }

    // ---------------------------------------------------------------------------------------------
    // EFFECTS, COLLISIONS, TRACK STATE ------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// apply_effect assigns a special effect to the vehicle. Effects do not stack: if another
    /// effect is still running the call is ignored and false is returned.
    pub fn apply_effect(&mut self, kind: EffectKind) -> bool {
        if let Some(active) = &self.effect {
            log::debug!(
                "Ignored {} effect on {}, {} is still active",
                kind.name(),
                self.model,
                active.kind.name()
            );
            return false;
        }
        self.effect = Some(ActiveEffect::new(kind));
        true
    }

    /// check_collision returns true if the given (x, z) position lies within the vehicle's
    /// proximity square.
    pub fn check_collision(&self, x: f64, z: f64) -> bool {
        (self.x - x).abs() < COLLISION_HALF_EXTENT && (self.z - z).abs() < COLLISION_HALF_EXTENT
    }

    /// collide pushes the vehicle away from the other vehicle's (x, z) position on both axes and
    /// perturbs its heading. The pair is not rewound to a collision-free state.
    pub fn collide(&mut self, x: f64, z: f64) {
        self.x += if self.x < x {
            -AVOIDANCE_DISTANCE
        } else {
            AVOIDANCE_DISTANCE
        };
        self.z += if self.z < z {
            -AVOIDANCE_DISTANCE
        } else {
            AVOIDANCE_DISTANCE
        };
        self.heading = wrap_angle(self.heading + COLLISION_HEADING_KICK_DEG.to_radians());
    }

    /// set_off_track updates the off-track state. Only transitions change the speed bounds:
    /// leaving the track scales speed and bounds down once, returning restores the base bounds.
    /// Returns true if the state changed.
    pub fn set_off_track(&mut self, off_track: bool) -> bool {
        if off_track == self.off_track {
            return false;
        }

        if off_track {
            self.speed *= OFF_TRACK_FACTOR;
            self.max_speed *= OFF_TRACK_FACTOR;
            self.min_speed *= OFF_TRACK_FACTOR;
        } else {
            self.max_speed = BASE_MAX_SPEED;
            self.min_speed = BASE_MIN_SPEED;
        }
        self.off_track = off_track;
        true
    }

    pub fn complete_lap(&mut self) {
        self.laps += 1;
    }

    /// set_pose moves the vehicle without touching any other state (used for route playback).
    pub fn set_pose(&mut self, x: f64, z: f64, heading: f64) {
        self.x = x;
        self.z = z;
        self.heading = wrap_angle(heading);
    }

    /// reset_to puts the vehicle at the given pose with a fresh kinematic, effect and lap state.
    pub fn reset_to(&mut self, x: f64, z: f64, heading: f64) {
        self.set_pose(x, z, heading);
        self.speed = 0.0;
        self.max_speed = BASE_MAX_SPEED;
        self.min_speed = BASE_MIN_SPEED;
        self.dizzy = false;
        self.blocked = false;
        self.effect = None;
        self.left = false;
        self.right = false;
        self.angle_offset = 0;
        self.off_track = false;
        self.laps = 0;
    }

    /// park resets the vehicle at its catalog parking spot.
    pub fn park(&mut self) {
        self.reset_to(
            self.parking_spot[0],
            self.parking_spot[1],
            self.parking_heading,
        );
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (GETTERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn position(&self) -> [f64; 2] {
        [self.x, self.z]
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn min_speed(&self) -> f64 {
        self.min_speed
    }

    /// speed_ceiling returns the effective upper speed bound. A running speed boost lifts it
    /// above `max_speed` by the boost factor.
    pub fn speed_ceiling(&self) -> f64 {
        match self.effect_kind() {
            Some(EffectKind::Speed) => self.max_speed * SPEED_BOOST_FACTOR,
            _ => self.max_speed,
        }
    }

    pub fn is_dizzy(&self) -> bool {
        self.dizzy
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn is_off_track(&self) -> bool {
        self.off_track
    }

    pub fn laps(&self) -> u32 {
        self.laps
    }

    pub fn effect_kind(&self) -> Option<EffectKind> {
        self.effect.as_ref().map(|active| active.kind)
    }

    /// effect_timer returns the remaining ticks of the active effect, 0 if there is none.
    pub fn effect_timer(&self) -> u32 {
        self.effect.as_ref().map_or(0, |active| active.remaining())
    }

    pub fn turn_intent(&self) -> TurnIntent {
        if self.left {
            TurnIntent::Left
        } else if self.right {
            TurnIntent::Right
        } else {
            TurnIntent::None
        }
    }

    pub fn angle_offset(&self) -> u32 {
        self.angle_offset
    }

    /// wheel_angle_deg returns the steering angle (deg) of the front wheels, derived from the
    /// turn intent and the remaining turn budget.
    pub fn wheel_angle_deg(&self) -> f64 {
        let value = 6.0 * (10.0 - self.angle_offset as f64);
        match self.turn_intent() {
            TurnIntent::Left => value,
            TurnIntent::Right => -value,
            TurnIntent::None => 0.0,
        }
    }

    fn debug_check_invariants(&self) {
        debug_assert!(
            self.min_speed - 1e-9 <= self.speed && self.speed <= self.speed_ceiling() + 1e-9,
            "Speed {:.4} of {} left [{:.4}, {:.4}]!",
            self.speed,
            self.model,
            self.min_speed,
            self.speed_ceiling()
        );
        debug_assert!((0.0..2.0 * std::f64::consts::PI).contains(&self.heading));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::effects::{PORTAL_DESTINATION, PORTAL_HEADING_DEG};
    use approx::assert_abs_diff_eq;

    fn test_vehicle(role: VehicleRole) -> Vehicle {
        let mut vehicle = Vehicle::new(&VehiclePars {
            model: "Aquamarine".to_owned(),
            color: "#00ffff".to_owned(),
            role,
            parking_spot: [-88.0, 17.0],
            parking_heading: std::f64::consts::FRAC_PI_2,
        })
        .unwrap();
        vehicle.reset_to(0.0, 0.0, 0.0);
        vehicle
    }

    fn assert_speed_within_bounds(vehicle: &Vehicle) {
        assert!(vehicle.speed() >= vehicle.min_speed() - 1e-9);
        assert!(vehicle.speed() <= vehicle.speed_ceiling() + 1e-9);
    }

    #[test]
    fn accelerate_and_brake_clamp_to_bounds() {
        let mut v = test_vehicle(VehicleRole::Player);
        for _ in 0..100 {
            v.accelerate();
            assert_speed_within_bounds(&v);
        }
        assert_abs_diff_eq!(v.speed(), BASE_MAX_SPEED, epsilon = 1e-12);

        for _ in 0..200 {
            v.brake();
            assert_speed_within_bounds(&v);
        }
        assert_abs_diff_eq!(v.speed(), BASE_MIN_SPEED, epsilon = 1e-12);
    }

    #[test]
    fn update_moves_against_heading() {
        let mut v = test_vehicle(VehicleRole::Player);
        v.speed = 0.2;
        v.update();
        assert_abs_diff_eq!(v.position()[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.position()[1], -0.2, epsilon = 1e-12);
    }

    #[test]
    fn turn_lasts_budget_ticks_and_scales_with_speed() {
        let mut v = test_vehicle(VehicleRole::Player);
        v.speed = 0.3;
        v.turn_left();
        assert_abs_diff_eq!(v.wheel_angle_deg(), 12.0, epsilon = 1e-12);

        for _ in 0..TURN_BUDGET {
            assert_eq!(v.turn_intent(), TurnIntent::Left);
            v.update();
        }
        assert_eq!(v.turn_intent(), TurnIntent::None);
        assert_abs_diff_eq!(
            v.heading(),
            (TURN_BUDGET as f64 * 3.0).to_radians(),
            epsilon = 1e-9
        );

        // further ticks do not turn any more
        let heading = v.heading();
        v.update();
        assert_abs_diff_eq!(v.heading(), heading, epsilon = 1e-12);
    }

    #[test]
    fn right_turn_from_zero_wraps_heading() {
        let mut v = test_vehicle(VehicleRole::Player);
        v.speed = 0.4;
        v.turn_right();
        assert_abs_diff_eq!(v.wheel_angle_deg(), -12.0, epsilon = 1e-12);
        v.update();
        assert!(v.heading() >= 0.0 && v.heading() < 2.0 * std::f64::consts::PI);
        assert_abs_diff_eq!(v.heading(), (360.0f64 - 4.0).to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn speed_effect_boosts_then_restores() {
        let mut v = test_vehicle(VehicleRole::Player);
        v.speed = 0.1;
        v.heading = 1.0;
        assert!(v.apply_effect(EffectKind::Speed));
        assert_eq!(v.effect_timer(), 100);

        v.update();
        assert_abs_diff_eq!(v.speed(), v.max_speed() * SPEED_BOOST_FACTOR, epsilon = 1e-12);
        assert_abs_diff_eq!(v.heading(), 0.0, epsilon = 1e-12);

        for _ in 0..99 {
            assert_eq!(v.effect_kind(), Some(EffectKind::Speed));
            v.update();
            assert_speed_within_bounds(&v);
        }
        assert_eq!(v.effect_kind(), None);
        assert_eq!(v.effect_timer(), 0);
        assert_abs_diff_eq!(v.speed(), v.max_speed(), epsilon = 1e-12);
    }

    #[test]
    fn portal_teleports_on_first_tick() {
        let mut v = test_vehicle(VehicleRole::Player);
        assert!(v.apply_effect(EffectKind::Portal));
        v.update();
        assert_eq!(v.position(), PORTAL_DESTINATION);
        assert_abs_diff_eq!(v.heading(), PORTAL_HEADING_DEG.to_radians(), epsilon = 1e-12);
        assert_eq!(v.effect_timer(), 9);
    }

    #[test]
    fn effects_do_not_stack() {
        let mut v = test_vehicle(VehicleRole::Player);
        assert!(v.apply_effect(EffectKind::Dizzy));
        v.update();
        let before = (v.effect_kind(), v.effect_timer(), v.is_dizzy());

        assert!(!v.apply_effect(EffectKind::Block));
        assert_eq!((v.effect_kind(), v.effect_timer(), v.is_dizzy()), before);
    }

    #[test]
    fn effect_timer_and_kind_agree_over_the_whole_effect() {
        for kind in [
            EffectKind::Speed,
            EffectKind::Portal,
            EffectKind::Dizzy,
            EffectKind::Block,
            EffectKind::Slow,
        ] {
            let mut v = test_vehicle(VehicleRole::Player);
            v.apply_effect(kind);
            for _ in 0..kind.duration() + 5 {
                assert_eq!(v.effect_timer() > 0, v.effect_kind().is_some());
                v.accelerate();
                v.update();
                assert_speed_within_bounds(&v);
            }
            assert_eq!(v.effect_kind(), None);
        }
    }

    #[test]
    fn block_freezes_position_until_expiry() {
        let mut v = test_vehicle(VehicleRole::Player);
        v.speed = 0.3;
        v.apply_effect(EffectKind::Block);

        for _ in 0..EffectKind::Block.duration() - 1 {
            v.update();
            assert!(v.is_blocked());
            assert_eq!(v.position(), [0.0, 0.0]);
        }

        // the expiry tick releases the vehicle and integrates again
        v.update();
        assert!(!v.is_blocked());
        assert!(v.position()[1] < 0.0);
    }

    #[test]
    fn slow_scales_bounds_and_restores_base() {
        let mut v = test_vehicle(VehicleRole::Player);
        v.speed = 0.4;
        v.apply_effect(EffectKind::Slow);
        v.update();
        assert_abs_diff_eq!(v.max_speed(), 0.16, epsilon = 1e-12);
        assert_abs_diff_eq!(v.min_speed(), -0.08, epsilon = 1e-12);
        assert_abs_diff_eq!(v.speed(), 0.16, epsilon = 1e-12);

        for _ in 1..EffectKind::Slow.duration() {
            v.update();
        }
        assert_abs_diff_eq!(v.max_speed(), BASE_MAX_SPEED, epsilon = 1e-12);
        assert_abs_diff_eq!(v.min_speed(), BASE_MIN_SPEED, epsilon = 1e-12);
    }

    #[test]
    fn off_track_is_edge_triggered() {
        let mut v = test_vehicle(VehicleRole::Player);
        v.speed = 0.4;

        assert!(v.set_off_track(true));
        assert!(!v.set_off_track(true));
        assert!(!v.set_off_track(true));
        assert_abs_diff_eq!(v.max_speed(), BASE_MAX_SPEED * OFF_TRACK_FACTOR, epsilon = 1e-12);
        assert_abs_diff_eq!(v.min_speed(), BASE_MIN_SPEED * OFF_TRACK_FACTOR, epsilon = 1e-12);
        assert_abs_diff_eq!(v.speed(), 0.4 * OFF_TRACK_FACTOR, epsilon = 1e-12);

        assert!(v.set_off_track(false));
        assert!(!v.set_off_track(false));
        assert_abs_diff_eq!(v.max_speed(), BASE_MAX_SPEED, epsilon = 1e-12);
        assert_abs_diff_eq!(v.min_speed(), BASE_MIN_SPEED, epsilon = 1e-12);
    }

    #[test]
    fn collision_response_is_symmetric() {
        let mut a = test_vehicle(VehicleRole::Player);
        let mut b = test_vehicle(VehicleRole::Opponent);
        a.set_pose(0.2, -0.3, 0.0);
        b.set_pose(0.7, 0.4, 0.0);
        assert!(a.check_collision(b.position()[0], b.position()[1]));
        assert!(b.check_collision(a.position()[0], a.position()[1]));

        let (pa, pb) = (a.position(), b.position());
        let dist_before = [(pa[0] - pb[0]).abs(), (pa[1] - pb[1]).abs()];
        a.collide(pb[0], pb[1]);
        b.collide(pa[0], pa[1]);

        let da = [a.position()[0] - pa[0], a.position()[1] - pa[1]];
        let db = [b.position()[0] - pb[0], b.position()[1] - pb[1]];
        assert_eq!(da[0].signum(), -db[0].signum());
        assert_eq!(da[1].signum(), -db[1].signum());

        let dist_after = [
            (a.position()[0] - b.position()[0]).abs(),
            (a.position()[1] - b.position()[1]).abs(),
        ];
        assert!(dist_after[0] >= dist_before[0]);
        assert!(dist_after[1] >= dist_before[1]);
        assert_abs_diff_eq!(a.heading(), 30f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn invalid_color_is_rejected() {
        let res = Vehicle::new(&VehiclePars {
            model: "Broken".to_owned(),
            color: "not-a-color".to_owned(),
            role: VehicleRole::Player,
            parking_spot: [0.0, 0.0],
            parking_heading: 0.0,
        });
        assert!(res.is_err());
    }
}
