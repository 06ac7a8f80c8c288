use crate::core::effects::EffectKind;
use crate::core::hazard::{HazardPars, Obstacle, PowerUp};
use crate::core::phase::{Handler, Phase, Subscriptions};
use crate::core::route::{Difficulty, RouteAnimator, RoutePars};
use crate::core::timer::{whole_secs, TICK, UNITS_PER_S};
use crate::core::track::Track;
use crate::core::vehicle::{Vehicle, VehicleRole};
use crate::interfaces::collaborators::{CameraRig, PickTarget, Picker, Scene, SceneEntity};
use crate::interfaces::hud_interface::{EffectDisplay, HudState};
use crate::interfaces::input_interface::{InputEvent, Key};
use crate::post::race_result::RaceOutcome;
use crate::pre::read_game_pars::GamePars;
use helpers::general::{argsort, SortOrder};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Seconds of the start countdown before the race is released.
pub const COUNTDOWN_S: u64 = 3;
/// Minimum number of whole seconds between two counted finish line crossings.
pub const LAP_COOLDOWN_S: u64 = 10;

/// Camera position and look-at target, (x, y, z) with y pointing up.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: [f64; 3],
    pub target: [f64; 3],
}

/// * `menu` - Camera pose in the menu and on the over screen
/// * `obstacle_choice` - Camera pose while an obstacle template is chosen
/// * `placement` - Camera pose while the chosen obstacle is placed on the track
/// * `follow_offset` - (x, y, z) offset of the follow camera from the player, y is absolute
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraPars {
    pub menu: CameraPose,
    pub obstacle_choice: CameraPose,
    pub placement: CameraPose,
    pub follow_offset: [f64; 3],
}

impl Default for CameraPars {
    fn default() -> Self {
        CameraPars {
            menu: CameraPose {
                position: [-100.0, 10.0, 50.0],
                target: [0.0, 0.0, 10.0],
            },
            obstacle_choice: CameraPose {
                position: [-25.0, 20.0, 65.0],
                target: [-50.0, 0.0, 90.0],
            },
            placement: CameraPose {
                position: [-30.0, 110.0, 20.0],
                target: [-30.0, 0.0, 20.0],
            },
            follow_offset: [-10.0, 10.0, -10.0],
        }
    }
}

/// * `max_laps` - Number of laps the player has to complete
/// * `player_grid` - (x, z, heading) start pose of the player
/// * `opponent_grid` - (x, z, heading) start pose of the opponent
/// * `over_player_spot` - (x, z, heading) pose of the player's car on the over screen
/// * `over_opponent_spot` - (x, z, heading) pose of the opponent's car on the over screen
/// * `power_ups` - Power-ups placed at race setup
/// * `obstacle_templates` - Obstacles the player can choose from after a power-up pickup
/// * `cameras` - Camera poses
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RacePars {
    pub max_laps: u32,
    pub player_grid: [f64; 3],
    pub opponent_grid: [f64; 3],
    pub over_player_spot: [f64; 3],
    pub over_opponent_spot: [f64; 3],
    pub power_ups: Vec<HazardPars>,
    pub obstacle_templates: Vec<HazardPars>,
    #[serde(default)]
    pub cameras: CameraPars,
}

impl Default for RacePars {
    fn default() -> Self {
        RacePars {
            max_laps: 3,
            player_grid: [-2.0, 8.0, 0.0],
            opponent_grid: [2.0, 5.0, 0.0],
            over_player_spot: [-85.0, 21.0, PI / 1.7],
            over_opponent_spot: [-70.0, 60.0, PI / 1.6],
            power_ups: vec![
                HazardPars {
                    kind: EffectKind::Speed,
                    position: [2.0, 80.0],
                },
                HazardPars {
                    kind: EffectKind::Portal,
                    position: [-44.0, 0.5],
                },
            ],
            obstacle_templates: vec![
                HazardPars {
                    kind: EffectKind::Slow,
                    position: [-55.0, 86.0],
                },
                HazardPars {
                    kind: EffectKind::Block,
                    position: [-50.0, 90.0],
                },
                HazardPars {
                    kind: EffectKind::Dizzy,
                    position: [-45.0, 94.0],
                },
            ],
            cameras: CameraPars::default(),
        }
    }
}

/// RaceController is the top-level state machine of the game. It owns the vehicle fleet, the
/// hazards and the opponent's route, dispatches input events to the handlers registered for the
/// current phase and advances the simulation by one tick per call of `update`.
pub struct RaceController {
    // parameters
    race_pars: RacePars,
    route_pars: RoutePars,

    // collaborators
    scene: Box<dyn Scene>,
    camera: Box<dyn CameraRig>,
    picker: Box<dyn Picker>,
    subs: Subscriptions,

    // world
    track: Track,
    fleet: Vec<Vehicle>,
    power_ups: Vec<PowerUp>,
    obstacles: Vec<Obstacle>,
    next_obstacle_id: u32,
    route: Option<RouteAnimator>,

    // selections
    player_name: String,
    difficulty: Difficulty,
    player_idx: Option<usize>,
    opponent_idx: Option<usize>,
    chosen_template: Option<EffectKind>,

    // race state
    follow: bool,
    paused: bool,
    released: bool,
    elapsed_time: u64,
    start_countdown: u64,
    lap_cooldown: u64,
    player_time: u64,
    outcome: Option<RaceOutcome>,
}

impl RaceController {
    pub fn new(
        game_pars: &GamePars,
        scene: Box<dyn Scene>,
        camera: Box<dyn CameraRig>,
        picker: Box<dyn Picker>,
    ) -> anyhow::Result<RaceController> {
        game_pars.validate()?;

        let fleet = game_pars
            .vehicle_pars_all
            .iter()
            .map(Vehicle::new)
            .collect::<anyhow::Result<Vec<Vehicle>>>()?;

        let mut game = RaceController {
            race_pars: game_pars.race_pars.to_owned(),
            route_pars: game_pars.route_pars.to_owned(),
            scene,
            camera,
            picker,
            subs: Subscriptions::new(),
            track: Track::new(&game_pars.track_pars),
            fleet,
            power_ups: game_pars
                .race_pars
                .power_ups
                .iter()
                .map(PowerUp::new)
                .collect(),
            obstacles: vec![],
            next_obstacle_id: 0,
            route: None,
            player_name: String::new(),
            difficulty: Difficulty::default(),
            player_idx: None,
            opponent_idx: None,
            chosen_template: None,
            follow: false,
            paused: false,
            released: false,
            elapsed_time: 0,
            start_countdown: 0,
            lap_cooldown: 0,
            player_time: 0,
            outcome: None,
        };

        // static world
        game.scene.add(SceneEntity::Track);
        for i in 0..game.power_ups.len() {
            game.scene.add(SceneEntity::PowerUp(i));
        }
        for template in game.race_pars.obstacle_templates.iter() {
            game.scene.add(SceneEntity::ObstacleTemplate(template.kind));
        }
        for i in 0..game.fleet.len() {
            game.scene.add(SceneEntity::Vehicle(i));
        }

        game.main_menu();
        Ok(game)
    }

    // ---------------------------------------------------------------------------------------------
    // INPUT DISPATCH ------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// handle_event passes an input event to every handler attached in the current phase. A
    /// handler that gets detached while the event is dispatched is not invoked any more, and
    /// dispatch stops once a handler switched the phase.
    pub fn handle_event(&mut self, event: &InputEvent) {
        let phase = self.subs.phase();
        let handlers = self.subs.handlers().to_vec();

        for handler in handlers {
            if self.subs.phase() != phase {
                break;
            }
            if !self.subs.is_attached(handler) || !handler.accepts(event) {
                continue;
            }
            self.invoke(handler, event);
        }
    }

    fn invoke(&mut self, handler: Handler, event: &InputEvent) {
        match event {
            InputEvent::TextInput(value) => {
                if handler == Handler::NameInput {
                    self.player_name = value.to_owned();
                }
            }
            InputEvent::KeyDown(key) => self.on_key(handler, *key),
            InputEvent::Click { x, y } => {
                if let Some(target) = self.picker.pick(*x, *y) {
                    self.on_click(handler, target);
                }
            }
        }
    }

    fn on_key(&mut self, handler: Handler, key: Key) {
        match handler {
            Handler::QuitRace => self.end_gameplay(),
            Handler::RaceKeys => {
                if !self.controls_unlocked() {
                    log::debug!("Ignored key {:?} during the start countdown", key);
                    return;
                }
                match key {
                    Key::Q => self.toggle_pause(),
                    Key::E => self.follow = !self.follow,
                    _ => {}
                }
            }
            _ => {
                if self.paused {
                    return;
                }
                let player_idx = match self.player_idx {
                    Some(idx) => idx,
                    None => return,
                };
                let player = &mut self.fleet[player_idx];

                match handler {
                    Handler::Accelerate => player.accelerate(),
                    Handler::Brake => player.brake(),
                    Handler::TurnLeft if player.is_dizzy() => player.turn_right(),
                    Handler::TurnLeft => player.turn_left(),
                    Handler::TurnRight if player.is_dizzy() => player.turn_left(),
                    Handler::TurnRight => player.turn_right(),
                    _ => {}
                }
            }
        }
    }

    fn on_click(&mut self, handler: Handler, target: PickTarget) {
        match (handler, target) {
            (Handler::DifficultySelect, PickTarget::Difficulty(difficulty)) => {
                log::debug!("Selected difficulty {}", difficulty);
                self.difficulty = difficulty;
            }
            (Handler::CarSelect, PickTarget::Vehicle(idx)) => self.select_vehicle(idx),
            (Handler::StartRace, PickTarget::StartButton) => self.start_race(),
            (Handler::ObstaclePicker, PickTarget::ObstacleTemplate(kind)) => {
                self.choose_obstacle(kind)
            }
            (Handler::ObstaclePlacer, PickTarget::TrackPoint { x, z }) => self.place_obstacle(x, z),
            (Handler::Restart, PickTarget::RestartButton) => self.restart(),
            (Handler::ReturnToMenu, PickTarget::MenuButton) => self.return_to_menu(),
            _ => {}
        }
    }

    // ---------------------------------------------------------------------------------------------
    // PHASE TRANSITIONS ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// transition switches the phase and its input handlers. Transitions that are not allowed
    /// from the current phase are ignored.
    fn transition(&mut self, next: Phase) -> bool {
        let cur = self.subs.phase();
        if !cur.can_transition_to(next) {
            log::debug!("Ignored phase transition {:?} -> {:?}", cur, next);
            return false;
        }
        log::info!("Phase {:?} -> {:?}", cur, next);
        self.subs.enter(next);
        true
    }

    fn set_camera(&mut self, pose: CameraPose, controls_enabled: bool) {
        self.camera.set_position(pose.position);
        self.camera.look_at(pose.target);
        self.camera.set_controls_enabled(controls_enabled);
    }

    fn main_menu(&mut self) {
        let pose = self.race_pars.cameras.menu;
        self.set_camera(pose, false);
        self.scene.add(SceneEntity::Menu);
    }

    fn select_vehicle(&mut self, idx: usize) {
        let role = match self.fleet.get(idx) {
            Some(vehicle) => vehicle.role,
            None => return,
        };
        let slot = match role {
            VehicleRole::Player => &mut self.player_idx,
            VehicleRole::Opponent => &mut self.opponent_idx,
        };

        if let Some(prev) = slot.replace(idx) {
            self.scene.remove(SceneEntity::SelectionMarker(prev));
        }
        self.scene.add(SceneEntity::SelectionMarker(idx));
        log::debug!("Selected {} as {:?}", self.fleet[idx].model, role);
    }

    fn start_race(&mut self) {
        if !self.ready_to_start() || !self.transition(Phase::Gameplay) {
            return;
        }
        self.scene.remove(SceneEntity::Menu);
        self.begin_gameplay();
    }

    /// begin_gameplay sets up a fresh race with the current selections.
    fn begin_gameplay(&mut self) {
        let (player_idx, opponent_idx) = match self.racers() {
            Some(racers) => racers,
            None => return,
        };

        // validated at construction, a failure here is a defect
        match RouteAnimator::new(&self.route_pars, self.difficulty) {
            Ok(route) => self.route = Some(route),
            Err(e) => {
                debug_assert!(false, "{}", e);
                log::error!("Could not build route: {}", e);
            }
        }
        self.scene.add(SceneEntity::RouteVisual);

        self.scene.remove(SceneEntity::SelectionMarker(player_idx));
        self.scene.remove(SceneEntity::SelectionMarker(opponent_idx));

        let [x, z, h] = self.race_pars.player_grid;
        self.fleet[player_idx].reset_to(x, z, h);
        let [x, z, h] = self.race_pars.opponent_grid;
        self.fleet[opponent_idx].reset_to(x, z, h);

        self.camera.set_controls_enabled(true);
        self.follow = true;
        self.paused = true;
        self.released = false;
        self.elapsed_time = 0;
        self.start_countdown = 0;
        self.lap_cooldown = 0;
        self.player_time = 0;
        self.chosen_template = None;
        self.outcome = None;

        log::info!(
            "Race {} ({}) vs. Opponent ({}) on difficulty {}",
            self.player_name,
            self.fleet[player_idx].model,
            self.fleet[opponent_idx].model,
            self.difficulty
        );
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if let Some(route) = self.route.as_mut() {
            if self.paused {
                route.pause();
            } else {
                route.resume();
            }
        }
        log::debug!("Race {}", if self.paused { "paused" } else { "resumed" });
    }

    /// pick_obstacle freezes the race and lets the player choose an obstacle template.
    fn pick_obstacle(&mut self) {
        if !self.transition(Phase::ObstaclePlacement) {
            return;
        }
        self.paused = true;
        if let Some(route) = self.route.as_mut() {
            route.pause();
        }
        self.follow = false;
        self.chosen_template = None;

        let pose = self.race_pars.cameras.obstacle_choice;
        self.set_camera(pose, false);
    }

    fn choose_obstacle(&mut self, kind: EffectKind) {
        if !self
            .race_pars
            .obstacle_templates
            .iter()
            .any(|template| template.kind == kind)
        {
            return;
        }
        self.chosen_template = Some(kind);
        self.subs.detach(Handler::ObstaclePicker);
        self.subs.attach(Handler::ObstaclePlacer);

        let pose = self.race_pars.cameras.placement;
        self.set_camera(pose, true);
        log::debug!("Chose {} obstacle", kind.name());
    }

    fn place_obstacle(&mut self, x: f64, z: f64) {
        let kind = match self.chosen_template {
            Some(kind) => kind,
            None => return,
        };
        if !self.track.is_on_track(x, z) {
            log::debug!("Ignored obstacle placement off the track at ({:.1}, {:.1})", x, z);
            return;
        }
        if !self.transition(Phase::Gameplay) {
            return;
        }

        let obstacle = Obstacle::new(
            self.next_obstacle_id,
            &HazardPars {
                kind,
                position: [x, z],
            },
        );
        self.next_obstacle_id += 1;
        self.scene.add(SceneEntity::Obstacle(obstacle.id));
        log::info!("Placed {} obstacle at ({:.1}, {:.1})", kind.name(), x, z);
        self.obstacles.push(obstacle);

        self.chosen_template = None;
        self.paused = false;
        if let Some(route) = self.route.as_mut() {
            route.resume();
        }
        self.follow = true;
        self.camera.set_controls_enabled(true);
    }

    /// end_gameplay scores the race and shows the over screen.
    fn end_gameplay(&mut self) {
        let (player_idx, opponent_idx) = match self.racers() {
            Some(racers) => racers,
            None => return,
        };
        if !self.transition(Phase::Over) {
            return;
        }
        self.follow = false;

        let outcome = RaceOutcome::evaluate(
            &self.player_name,
            &self.fleet[player_idx].model,
            &self.fleet[opponent_idx].model,
            self.difficulty,
            self.fleet[player_idx].laps(),
            self.race_pars.max_laps,
            self.elapsed_secs(),
            self.player_time,
            self.race_threshold_s(),
        );
        log::info!(
            "Race over: player {}s, opponent {}s, {}",
            outcome.player_time_s,
            outcome.opponent_time_s,
            if outcome.player_won() { "won" } else { "lost" }
        );
        self.outcome = Some(outcome);

        for obstacle in self.obstacles.drain(..) {
            self.scene.remove(SceneEntity::Obstacle(obstacle.id));
        }
        for i in 0..self.fleet.len() {
            if i != player_idx && i != opponent_idx {
                self.scene.remove(SceneEntity::Vehicle(i));
            }
        }
        let [x, z, h] = self.race_pars.over_player_spot;
        self.fleet[player_idx].reset_to(x, z, h);
        let [x, z, h] = self.race_pars.over_opponent_spot;
        self.fleet[opponent_idx].reset_to(x, z, h);

        if let Some(route) = self.route.as_mut() {
            route.stop();
        }
        self.scene.remove(SceneEntity::RouteVisual);

        self.scene.add(SceneEntity::OverScreen);
        let pose = self.race_pars.cameras.menu;
        self.set_camera(pose, false);
    }

    /// reset_fleet parks every catalog vehicle and shows it again.
    fn reset_fleet(&mut self) {
        for (i, vehicle) in self.fleet.iter_mut().enumerate() {
            vehicle.park();
            self.scene.add(SceneEntity::Vehicle(i));
        }
    }

    fn restart(&mut self) {
        if self.racers().is_none() || !self.transition(Phase::Gameplay) {
            return;
        }
        self.scene.remove(SceneEntity::OverScreen);
        self.reset_fleet();
        self.begin_gameplay();
    }

    fn return_to_menu(&mut self) {
        if !self.transition(Phase::Menu) {
            return;
        }
        self.scene.remove(SceneEntity::OverScreen);
        self.reset_fleet();

        self.player_name.clear();
        self.difficulty = Difficulty::default();
        self.player_idx = None;
        self.opponent_idx = None;
        self.route = None;
        self.follow = false;
        self.paused = false;
        self.released = false;
        self.elapsed_time = 0;
        self.start_countdown = 0;
        self.lap_cooldown = 0;
        self.player_time = 0;

        self.main_menu();
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// update advances the game by one tick.
    pub fn update(&mut self) {
        match self.subs.phase() {
            Phase::Menu => self.update_menu(),
            Phase::Gameplay => self.update_gameplay(),
            Phase::ObstaclePlacement | Phase::Over => {}
        }
    }

    /// update_menu offers the start button once a name and both cars are selected, and retracts
    /// it if the name is cleared again.
    fn update_menu(&mut self) {
        let ready = self.ready_to_start();

        if ready && !self.subs.is_attached(Handler::StartRace) {
            self.subs.attach(Handler::StartRace);
            log::debug!("Start offered");
        } else if !ready && self.subs.detach(Handler::StartRace) {
            log::debug!("Start retracted");
        }
    }

    fn update_gameplay(&mut self) {
        let (player_idx, opponent_idx) = match self.racers() {
            Some(racers) => racers,
            None => return,
        };

        if self.follow {
            self.follow_player(player_idx);
        }

        // start countdown
        self.start_countdown += TICK;
        if !self.released && whole_secs(self.start_countdown) >= COUNTDOWN_S {
            self.released = true;
            self.paused = false;
            if let Some(route) = self.route.as_mut() {
                route.play();
            }
            log::info!("Race started");
        }

        if self.paused {
            return;
        }
        self.elapsed_time += TICK;

        let max_laps = self.race_pars.max_laps;
        if self.fleet[player_idx].laps() < max_laps {
            self.lap_cooldown += TICK;
            self.player_time = self.elapsed_secs();
        }
        let opponent_active = self.elapsed_secs() < self.race_threshold_s();

        // effects and integration
        self.fleet[player_idx].update();
        if opponent_active {
            self.fleet[opponent_idx].update();
        }

        // vehicle-vehicle collision, both respond to the pre-collision positions
        let [px, pz] = self.fleet[player_idx].position();
        let [ox, oz] = self.fleet[opponent_idx].position();
        if self.fleet[player_idx].check_collision(ox, oz) {
            log::debug!("Collision at ({:.1}, {:.1})", px, pz);
            self.fleet[player_idx].collide(ox, oz);
            if opponent_active {
                self.fleet[opponent_idx].collide(px, pz);
            }
        }

        self.check_lap(player_idx);
        self.check_off_track(player_idx);
        let entered_placement = self.check_pickups(player_idx);

        // opponent route
        if opponent_active && !entered_placement {
            self.advance_opponent(opponent_idx);
        }

        if !entered_placement {
            for obstacle in self.obstacles.iter_mut() {
                obstacle.animate();
            }
        }

        log::trace!(
            "t = {} | player ({:.2}, {:.2}) v = {:.3}",
            self.elapsed_time,
            self.fleet[player_idx].position()[0],
            self.fleet[player_idx].position()[1],
            self.fleet[player_idx].speed()
        );

        if self.fleet[player_idx].laps() == max_laps
            && self.elapsed_secs() >= self.race_threshold_s()
        {
            self.end_gameplay();
        }
    }

    fn follow_player(&mut self, player_idx: usize) {
        let [x, z] = self.fleet[player_idx].position();
        let offset = self.race_pars.cameras.follow_offset;
        self.camera.look_at([x, 0.0, z]);
        self.camera
            .set_position([x + offset[0], offset[1], z + offset[2]]);
    }

    fn check_lap(&mut self, player_idx: usize) {
        let player = &mut self.fleet[player_idx];
        if player.laps() >= self.race_pars.max_laps {
            return;
        }

        let [x, z] = player.position();
        if self.track.is_in_finish_box(x, z) && whole_secs(self.lap_cooldown) > LAP_COOLDOWN_S {
            self.lap_cooldown = 0;
            player.complete_lap();
            log::info!(
                "Lap {} / {} completed after {}s",
                player.laps(),
                self.race_pars.max_laps,
                whole_secs(self.elapsed_time)
            );
        }
        debug_assert!(player.laps() <= self.race_pars.max_laps);
    }

    fn check_off_track(&mut self, player_idx: usize) {
        let [x, z] = self.fleet[player_idx].position();
        let off_track = !self.track.is_on_track(x, z);

        if self.fleet[player_idx].set_off_track(off_track) {
            log::debug!(
                "Player {} the track at ({:.1}, {:.1})",
                if off_track { "left" } else { "returned to" },
                x,
                z
            );
        }
    }

    /// check_pickups applies the effect of a touched power-up or obstacle. Power-ups take
    /// precedence and additionally start the obstacle placement. Returns true if the placement
    /// phase was entered.
    fn check_pickups(&mut self, player_idx: usize) -> bool {
        if self.fleet[player_idx].effect_kind().is_some() {
            return false;
        }
        let [x, z] = self.fleet[player_idx].position();

        let power_up = self
            .power_ups
            .iter()
            .find(|power_up| power_up.check_collision(x, z))
            .map(|power_up| power_up.kind);
        if let Some(kind) = power_up {
            log::info!("Picked up {} power-up", kind.name());
            self.fleet[player_idx].apply_effect(kind);
            self.pick_obstacle();
            return true;
        }

        let obstacle = self
            .obstacles
            .iter()
            .find(|obstacle| obstacle.check_collision(x, z))
            .map(|obstacle| obstacle.kind);
        if let Some(kind) = obstacle {
            log::info!("Hit {} obstacle", kind.name());
            self.fleet[player_idx].apply_effect(kind);
        }
        false
    }

    fn advance_opponent(&mut self, opponent_idx: usize) {
        let route = match self.route.as_mut() {
            Some(route) => route,
            None => return,
        };
        route.advance(TICK as f64 / UNITS_PER_S as f64);

        if let Some(pose) = route.pose() {
            let opponent = &mut self.fleet[opponent_idx];
            let [x, z] = pose.position.unwrap_or_else(|| opponent.position());
            opponent.set_pose(x, z, pose.heading);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HUD) -------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// hud_state derives the HUD fields. Returns None outside of a race.
    pub fn hud_state(&self) -> Option<HudState> {
        if !matches!(
            self.subs.phase(),
            Phase::Gameplay | Phase::ObstaclePlacement
        ) {
            return None;
        }
        let (player_idx, opponent_idx) = self.racers()?;
        let player = &self.fleet[player_idx];
        let opponent = &self.fleet[opponent_idx];

        // ranking, the opponent stays ahead on equal laps
        let labels = [
            format!("Opponent ({})", opponent.model),
            format!("{} ({})", self.player_name, player.model),
        ];
        let laps = [self.opponent_laps(), player.laps()];
        let ranking = argsort(&laps, SortOrder::Descending)
            .into_iter()
            .map(|i| labels[i].to_owned())
            .collect();

        let countdown_s = whole_secs(self.start_countdown);

        Some(HudState {
            phase: self.subs.phase(),
            paused: self.paused,
            laps: player.laps(),
            max_laps: self.race_pars.max_laps,
            elapsed_s: self.elapsed_secs(),
            speed_display: (player.speed() * 250.0).floor() as i64,
            speed_fraction: player.speed() / player.max_speed(),
            effect: player.effect_kind().map(|kind| EffectDisplay {
                name: kind.name().to_owned(),
                remaining_s: player.effect_timer() as f64 / 50.0,
            }),
            ranking,
            countdown: if countdown_s <= COUNTDOWN_S {
                Some(COUNTDOWN_S - countdown_s)
            } else {
                None
            },
            final_result: None,
        })
    }

    /// opponent_laps derives the opponent's laps from the elapsed time.
    pub fn opponent_laps(&self) -> u32 {
        (self.elapsed_secs() as f64 / (self.route_duration() + 1.0)).floor() as u32
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (GETTERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn racers(&self) -> Option<(usize, usize)> {
        Some((self.player_idx?, self.opponent_idx?))
    }

    fn ready_to_start(&self) -> bool {
        !self.player_name.is_empty() && self.racers().is_some()
    }

    /// Pause and camera keys are accepted only after the start countdown has run out.
    fn controls_unlocked(&self) -> bool {
        whole_secs(self.start_countdown) > COUNTDOWN_S
    }

    pub fn phase(&self) -> Phase {
        self.subs.phase()
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subs
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn fleet(&self) -> &[Vehicle] {
        &self.fleet
    }

    pub fn player(&self) -> Option<&Vehicle> {
        self.player_idx.map(|idx| &self.fleet[idx])
    }

    pub fn opponent(&self) -> Option<&Vehicle> {
        self.opponent_idx.map(|idx| &self.fleet[idx])
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacle_templates(&self) -> &[HazardPars] {
        &self.race_pars.obstacle_templates
    }

    pub fn chosen_template(&self) -> Option<EffectKind> {
        self.chosen_template
    }

    pub fn route(&self) -> Option<&RouteAnimator> {
        self.route.as_ref()
    }

    /// route_duration returns the duration (s) of one opponent lap on the selected difficulty.
    pub fn route_duration(&self) -> f64 {
        self.route_pars.duration(self.difficulty)
    }

    /// race_threshold_s returns the minimum race time (whole seconds) before a race is scored.
    pub fn race_threshold_s(&self) -> u64 {
        (self.race_pars.max_laps as f64 * (self.route_duration() + 1.0)).ceil() as u64
    }

    pub fn max_laps(&self) -> u32 {
        self.race_pars.max_laps
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Elapsed race time in time units.
    pub fn elapsed_time(&self) -> u64 {
        self.elapsed_time
    }

    pub fn elapsed_secs(&self) -> u64 {
        whole_secs(self.elapsed_time)
    }

    pub fn player_time(&self) -> u64 {
        self.player_time
    }

    pub fn outcome(&self) -> Option<&RaceOutcome> {
        self.outcome.as_ref()
    }
}
