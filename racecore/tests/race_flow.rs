use racecore::core::effects::EffectKind;
use racecore::core::handle_race::handle_race;
use racecore::core::phase::Phase;
use racecore::core::race::RaceController;
use racecore::core::route::Difficulty;
use racecore::interfaces::collaborators::{
    CameraRig, HotspotPicker, NullCamera, NullScene, PickTarget, Scene, SceneEntity,
};
use racecore::interfaces::hud_interface::HudState;
use racecore::interfaces::input_interface::{InputEvent, Key, ScriptedInput};
use racecore::pre::read_game_pars::GamePars;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::thread;

const TARGETS: [PickTarget; 9] = [
    PickTarget::Difficulty(Difficulty::Hard),
    PickTarget::Vehicle(0),
    PickTarget::Vehicle(3),
    PickTarget::StartButton,
    PickTarget::ObstacleTemplate(EffectKind::Slow),
    PickTarget::ObstacleTemplate(EffectKind::Block),
    PickTarget::ObstacleTemplate(EffectKind::Dizzy),
    PickTarget::RestartButton,
    PickTarget::MenuButton,
];

#[derive(Clone, Default)]
struct RecordingScene {
    visible: Rc<RefCell<HashSet<SceneEntity>>>,
}

impl Scene for RecordingScene {
    fn add(&mut self, entity: SceneEntity) {
        self.visible.borrow_mut().insert(entity);
    }
    fn remove(&mut self, entity: SceneEntity) {
        self.visible.borrow_mut().remove(&entity);
    }
}

#[derive(Debug, Default)]
struct CameraLog {
    position: [f64; 3],
    target: [f64; 3],
    controls_enabled: bool,
}

#[derive(Clone, Default)]
struct RecordingCamera {
    log: Rc<RefCell<CameraLog>>,
}

impl CameraRig for RecordingCamera {
    fn set_position(&mut self, position: [f64; 3]) {
        self.log.borrow_mut().position = position;
    }
    fn look_at(&mut self, target: [f64; 3]) {
        self.log.borrow_mut().target = target;
    }
    fn set_controls_enabled(&mut self, enabled: bool) {
        self.log.borrow_mut().controls_enabled = enabled;
    }
}

fn click_event(target: PickTarget) -> InputEvent {
    let idx = TARGETS.iter().position(|t| *t == target).unwrap();
    let [x, y] = HotspotPicker::hotspot_position(idx);
    InputEvent::Click { x, y }
}

fn menu_events() -> Vec<InputEvent> {
    vec![
        InputEvent::TextInput("Grace".to_owned()),
        click_event(PickTarget::Difficulty(Difficulty::Hard)),
        click_event(PickTarget::Vehicle(0)),
        click_event(PickTarget::Vehicle(3)),
    ]
}

fn null_game() -> RaceController {
    RaceController::new(
        &GamePars::default(),
        Box::new(NullScene),
        Box::new(NullCamera),
        Box::new(HotspotPicker::with_grid(&TARGETS, true)),
    )
    .unwrap()
}

#[test]
fn scene_follows_the_phases() {
    let scene = RecordingScene::default();
    let camera = RecordingCamera::default();
    let mut game = RaceController::new(
        &GamePars::default(),
        Box::new(scene.clone()),
        Box::new(camera.clone()),
        Box::new(HotspotPicker::with_grid(&TARGETS, true)),
    )
    .unwrap();

    {
        let visible = scene.visible.borrow();
        assert!(visible.contains(&SceneEntity::Menu));
        assert!(visible.contains(&SceneEntity::Track));
        assert!(visible.contains(&SceneEntity::PowerUp(1)));
        assert!(visible.contains(&SceneEntity::ObstacleTemplate(EffectKind::Block)));
        assert!((0..6).all(|i| visible.contains(&SceneEntity::Vehicle(i))));
    }
    assert_eq!(camera.log.borrow().position, [-100.0, 10.0, 50.0]);
    assert!(!camera.log.borrow().controls_enabled);

    for event in menu_events() {
        game.handle_event(&event);
    }
    assert!(scene
        .visible
        .borrow()
        .contains(&SceneEntity::SelectionMarker(3)));

    game.update();
    game.handle_event(&click_event(PickTarget::StartButton));
    assert_eq!(game.phase(), Phase::Gameplay);
    {
        let visible = scene.visible.borrow();
        assert!(!visible.contains(&SceneEntity::Menu));
        assert!(!visible.contains(&SceneEntity::SelectionMarker(0)));
        assert!(!visible.contains(&SceneEntity::SelectionMarker(3)));
        assert!(visible.contains(&SceneEntity::RouteVisual));
    }
    assert!(camera.log.borrow().controls_enabled);

    // the follow camera looks at the player
    game.update();
    let [x, z] = game.player().unwrap().position();
    assert_eq!(camera.log.borrow().target, [x, 0.0, z]);
    assert_eq!(camera.log.borrow().position, [x - 10.0, 10.0, z - 10.0]);

    game.handle_event(&InputEvent::KeyDown(Key::Escape));
    assert_eq!(game.phase(), Phase::Over);
    {
        let visible = scene.visible.borrow();
        assert!(visible.contains(&SceneEntity::OverScreen));
        assert!(!visible.contains(&SceneEntity::RouteVisual));
        assert!(visible.contains(&SceneEntity::Vehicle(0)));
        assert!(visible.contains(&SceneEntity::Vehicle(3)));
        assert!(!visible.contains(&SceneEntity::Vehicle(1)));
    }
    assert_eq!(game.player().unwrap().position(), [-85.0, 21.0]);
    assert_eq!(game.opponent().unwrap().position(), [-70.0, 60.0]);

    game.handle_event(&click_event(PickTarget::MenuButton));
    assert_eq!(game.phase(), Phase::Menu);
    let visible = scene.visible.borrow();
    assert!(visible.contains(&SceneEntity::Menu));
    assert!(!visible.contains(&SceneEntity::OverScreen));
    assert!((0..6).all(|i| visible.contains(&SceneEntity::Vehicle(i))));
}

#[test]
fn hard_route_sets_a_shorter_threshold() {
    let mut game = null_game();
    let normal_threshold = game.race_threshold_s();

    for event in menu_events() {
        game.handle_event(&event);
    }
    assert_eq!(game.difficulty(), Difficulty::Hard);
    assert!(game.race_threshold_s() < normal_threshold);
}

#[test]
fn scripted_session_reports_a_quit_as_loss() {
    let mut game = null_game();

    let mut script: Vec<(u64, InputEvent)> = menu_events().into_iter().map(|e| (0, e)).collect();
    script.push((1, click_event(PickTarget::StartButton)));
    script.push((200, InputEvent::KeyDown(Key::W)));
    script.push((400, InputEvent::KeyDown(Key::Escape)));
    let mut input = ScriptedInput::new(script);

    let (tx, rx) = flume::unbounded();
    let outcome = handle_race(&mut game, &mut input, 10_000, Some(&tx), 0.0)
        .unwrap()
        .unwrap();
    drop(tx);

    assert_eq!(outcome.player_name, "Grace");
    assert_eq!(outcome.player_model, "Aquamarine");
    assert_eq!(outcome.opponent_model, "Flame Cruiser");
    assert_eq!(outcome.difficulty, Difficulty::Hard);
    assert_eq!(outcome.player_time_s, 999);
    assert!(!outcome.player_won());

    let states: Vec<_> = rx.try_iter().collect();
    assert!(states.len() > 2);
    assert!(states[0].countdown.is_some());
    let last = states.last().unwrap();
    assert_eq!(last.phase, Phase::Over);
    assert_eq!(last.final_result.as_ref(), Some(&outcome));
}

#[test]
fn session_without_start_times_out() {
    let mut game = null_game();
    let mut input = ScriptedInput::new(vec![(0, InputEvent::TextInput("Nobody".to_owned()))]);

    let outcome = handle_race(&mut game, &mut input, 50, None, 0.0).unwrap();
    assert!(outcome.is_none());
    assert_eq!(game.phase(), Phase::Menu);
}

#[test]
fn hud_printer_thread_receives_every_state() {
    let mut game = null_game();
    let mut script: Vec<(u64, InputEvent)> = menu_events().into_iter().map(|e| (0, e)).collect();
    script.push((1, click_event(PickTarget::StartButton)));
    script.push((300, InputEvent::KeyDown(Key::Escape)));
    let mut input = ScriptedInput::new(script);

    // consumer is spawned before the sender is handed to the session runner
    let (tx, rx) = flume::unbounded::<HudState>();
    let printer = thread::spawn(move || {
        let mut lines = vec![];
        for hud_state in rx.iter() {
            match &hud_state.final_result {
                Some(outcome) => lines.push(outcome.summary().unwrap()),
                None => lines.push(hud_state.hud_line()),
            }
        }
        lines
    });

    let outcome = handle_race(&mut game, &mut input, 10_000, Some(&tx), 0.0)
        .unwrap()
        .unwrap();
    drop(tx);

    let lines = printer.join().unwrap();
    assert!(lines.len() > 2);
    assert!(lines[0].starts_with("Gameplay"));
    assert_eq!(lines.last().unwrap(), &outcome.summary().unwrap());
}
