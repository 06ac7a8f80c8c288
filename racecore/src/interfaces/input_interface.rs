/// Keys the core reacts to. Everything else arrives as `Key::Other` and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    S,
    A,
    D,
    Q,
    E,
    Escape,
    Other,
}

/// Abstract input events. Events only set control intents or trigger phase transitions, they
/// never advance simulation time.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    Click { x: f64, y: f64 },
    TextInput(String),
}

/// InputSource is polled once per tick by the session runner. `tick` is the number of ticks
/// simulated so far, the controller is passed read-only so that producers (e.g. a bot) can react
/// to the current state.
pub trait InputSource {
    fn poll(&mut self, tick: u64, game: &crate::core::race::RaceController) -> Vec<InputEvent>;
}

/// ScriptedInput replays a fixed list of events, each tagged with the tick it is due at.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: Vec<(u64, InputEvent)>,
    next: usize,
}

impl ScriptedInput {
    pub fn new(mut events: Vec<(u64, InputEvent)>) -> ScriptedInput {
        events.sort_by_key(|(tick, _)| *tick);
        ScriptedInput { events, next: 0 }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64, _game: &crate::core::race::RaceController) -> Vec<InputEvent> {
        let mut due = vec![];
        while self.next < self.events.len() && self.events[self.next].0 <= tick {
            due.push(self.events[self.next].1.clone());
            self.next += 1;
        }
        due
    }
}
