use crate::interfaces::input_interface::{InputEvent, Key};
use serde::Serialize;

/// Top-level state of the race controller.
///
/// Allowed transitions:
/// * Menu -> Gameplay
/// * Gameplay -> ObstaclePlacement, Gameplay -> Over
/// * ObstaclePlacement -> Gameplay, ObstaclePlacement -> Over
/// * Over -> Menu, Over -> Gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Menu,
    Gameplay,
    ObstaclePlacement,
    Over,
}

impl Phase {
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Menu, Phase::Gameplay)
                | (Phase::Gameplay, Phase::ObstaclePlacement)
                | (Phase::Gameplay, Phase::Over)
                | (Phase::ObstaclePlacement, Phase::Gameplay)
                | (Phase::ObstaclePlacement, Phase::Over)
                | (Phase::Over, Phase::Menu)
                | (Phase::Over, Phase::Gameplay)
        )
    }

    /// default_handlers returns the handlers a phase registers when it is entered.
    pub fn default_handlers(self) -> &'static [Handler] {
        match self {
            Phase::Menu => &[
                Handler::NameInput,
                Handler::DifficultySelect,
                Handler::CarSelect,
            ],
            Phase::Gameplay => &[
                Handler::Accelerate,
                Handler::Brake,
                Handler::TurnLeft,
                Handler::TurnRight,
                Handler::RaceKeys,
                Handler::QuitRace,
            ],
            Phase::ObstaclePlacement => &[Handler::ObstaclePicker, Handler::QuitRace],
            Phase::Over => &[Handler::Restart, Handler::ReturnToMenu],
        }
    }
}

/// Input handlers the race controller can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    // menu
    NameInput,
    DifficultySelect,
    CarSelect,
    StartRace,
    // gameplay
    Accelerate,
    Brake,
    TurnLeft,
    TurnRight,
    RaceKeys,
    QuitRace,
    // obstacle placement
    ObstaclePicker,
    ObstaclePlacer,
    // over
    Restart,
    ReturnToMenu,
}

impl Handler {
    /// accepts returns true if the handler listens to the given event.
    pub fn accepts(self, event: &InputEvent) -> bool {
        match (self, event) {
            (Handler::NameInput, InputEvent::TextInput(_)) => true,
            (Handler::Accelerate, InputEvent::KeyDown(key)) => *key == Key::W,
            (Handler::Brake, InputEvent::KeyDown(key)) => *key == Key::S,
            (Handler::TurnLeft, InputEvent::KeyDown(key)) => *key == Key::A,
            (Handler::TurnRight, InputEvent::KeyDown(key)) => *key == Key::D,
            (Handler::RaceKeys, InputEvent::KeyDown(key)) => matches!(key, Key::Q | Key::E),
            (Handler::QuitRace, InputEvent::KeyDown(key)) => *key == Key::Escape,
            (
                Handler::DifficultySelect
                | Handler::CarSelect
                | Handler::StartRace
                | Handler::ObstaclePicker
                | Handler::ObstaclePlacer
                | Handler::Restart
                | Handler::ReturnToMenu,
                InputEvent::Click { .. },
            ) => true,
            _ => false,
        }
    }
}

/// Subscriptions is the registry of input handlers attached in the current phase. Entering a
/// phase detaches every handler of the previous one before the new phase's set is attached.
#[derive(Debug, Clone)]
pub struct Subscriptions {
    phase: Phase,
    attached: Vec<Handler>,
}

impl Default for Subscriptions {
    fn default() -> Self {
        Subscriptions::new()
    }
}

impl Subscriptions {
    /// Creates the registry in the menu phase with the menu's handlers attached.
    pub fn new() -> Subscriptions {
        Subscriptions {
            phase: Phase::Menu,
            attached: Phase::Menu.default_handlers().to_vec(),
        }
    }

    /// enter switches the registry to the given phase and returns the handlers that were
    /// detached.
    pub fn enter(&mut self, phase: Phase) -> Vec<Handler> {
        let detached = std::mem::take(&mut self.attached);
        self.phase = phase;
        self.attached = phase.default_handlers().to_vec();
        log::trace!("Detached {:?}, attached {:?}", detached, self.attached);
        detached
    }

    /// attach adds a handler to the current phase. Returns false if it was attached already.
    pub fn attach(&mut self, handler: Handler) -> bool {
        if self.is_attached(handler) {
            return false;
        }
        self.attached.push(handler);
        true
    }

    /// detach removes a handler from the current phase. Returns false if it was not attached.
    pub fn detach(&mut self, handler: Handler) -> bool {
        let len_before = self.attached.len();
        self.attached.retain(|h| *h != handler);
        self.attached.len() != len_before
    }

    pub fn is_attached(&self, handler: Handler) -> bool {
        self.attached.contains(&handler)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.attached
    }
}
