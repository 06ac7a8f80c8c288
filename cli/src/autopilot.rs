use helpers::general::signed_angle_diff;
use racecore::core::phase::Phase;
use racecore::core::race::RaceController;
use racecore::core::track::Track;
use racecore::core::vehicle::TurnIntent;
use racecore::interfaces::collaborators::{HotspotPicker, PickTarget};
use racecore::interfaces::input_interface::{InputEvent, InputSource, Key};

/// Number of centerline samples the autopilot looks ahead.
const LOOKAHEAD: usize = 25;
/// Heading error (rad) below which the autopilot drives straight.
const HEADING_TOLERANCE: f64 = 0.08;
/// Speed the autopilot accelerates to.
const TARGET_SPEED: f64 = 0.3;
/// Centerline samples between the opponent and a placed obstacle.
const OBSTACLE_LEAD: usize = 120;

/// Autopilot fills in the menu and then drives the player's car along the track centerline. It
/// produces the same clicks and key presses a human player would.
pub struct Autopilot {
    name: String,
    targets: Vec<PickTarget>,
    menu_clicks: Vec<PickTarget>,
    menu_done: bool,
}

impl Autopilot {
    pub fn new(name: &str, targets: &[PickTarget], menu_clicks: Vec<PickTarget>) -> Autopilot {
        Autopilot {
            name: name.to_owned(),
            targets: targets.to_vec(),
            menu_clicks,
            menu_done: false,
        }
    }

    fn click(&self, target: PickTarget) -> Option<InputEvent> {
        if let PickTarget::TrackPoint { x, z } = target {
            return Some(InputEvent::Click { x, y: z });
        }
        let idx = self.targets.iter().position(|t| *t == target)?;
        let [x, y] = HotspotPicker::hotspot_position(idx);
        Some(InputEvent::Click { x, y })
    }

    fn menu_events(&mut self) -> Vec<InputEvent> {
        if self.menu_done {
            // the start button is offered one tick after the selection is complete
            return self.click(PickTarget::StartButton).into_iter().collect();
        }
        self.menu_done = true;

        let mut events = vec![InputEvent::TextInput(self.name.to_owned())];
        events.extend(self.menu_clicks.iter().filter_map(|t| self.click(*t)));
        events
    }

    fn drive_events(&self, game: &RaceController) -> Vec<InputEvent> {
        let player = match game.player() {
            Some(player) => player,
            None => return vec![],
        };
        if !game.is_released() {
            return vec![];
        }
        let mut events = vec![];

        if player.speed() < TARGET_SPEED.min(player.max_speed()) {
            events.push(InputEvent::KeyDown(Key::W));
        }

        // steer towards a centerline point ahead
        if player.turn_intent() == TurnIntent::None {
            let [x, z] = player.position();
            let samples = game.track().samples();
            let idx = game.track().nearest_sample_idx(x, z);
            let [tx, tz] = Track::to_world(samples[(idx + LOOKAHEAD) % samples.len()]);

            // vehicles move along (-sin h, -cos h)
            let desired = (-(tx - x)).atan2(-(tz - z));
            let diff = signed_angle_diff(player.heading(), desired);

            let (left, right) = if player.is_dizzy() {
                (Key::D, Key::A)
            } else {
                (Key::A, Key::D)
            };
            if diff > HEADING_TOLERANCE {
                events.push(InputEvent::KeyDown(left));
            } else if diff < -HEADING_TOLERANCE {
                events.push(InputEvent::KeyDown(right));
            }
        }
        events
    }

    fn placement_events(&self, game: &RaceController) -> Vec<InputEvent> {
        match game.chosen_template() {
            None => game
                .obstacle_templates()
                .first()
                .and_then(|template| self.click(PickTarget::ObstacleTemplate(template.kind)))
                .into_iter()
                .collect(),
            Some(_) => {
                // drop it on the centerline ahead of the opponent
                let [x, z] = game.opponent().map_or([0.0, 0.0], |o| o.position());
                let samples = game.track().samples();
                let idx = (game.track().nearest_sample_idx(x, z) + OBSTACLE_LEAD) % samples.len();
                let [px, pz] = Track::to_world(samples[idx]);
                self.click(PickTarget::TrackPoint { x: px, z: pz })
                    .into_iter()
                    .collect()
            }
        }
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, _tick: u64, game: &RaceController) -> Vec<InputEvent> {
        match game.phase() {
            Phase::Menu => self.menu_events(),
            Phase::Gameplay => self.drive_events(game),
            Phase::ObstaclePlacement => self.placement_events(game),
            Phase::Over => vec![],
        }
    }
}
