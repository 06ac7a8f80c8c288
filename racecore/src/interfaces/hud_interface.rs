use crate::core::phase::Phase;
use crate::post::race_result::RaceOutcome;

pub const MAX_HUD_UPDATE_FREQUENCY: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Active effect as shown on the HUD, remaining time in seconds (ticks / 50).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectDisplay {
    pub name: String,
    pub remaining_s: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudState {
    pub phase: Phase,
    pub paused: bool,
    pub laps: u32,
    pub max_laps: u32,

    // elapsed race time in whole seconds
    pub elapsed_s: u64,

    // speed readout out of 100 plus the fraction of the current upper bound
    pub speed_display: i64,
    pub speed_fraction: f64,

    pub effect: Option<EffectDisplay>,

    // names from first to last place
    pub ranking: Vec<String>,

    // 3, 2, 1, 0 during the start countdown
    pub countdown: Option<u64>,

    // final results payload (sent once when the race is over)
    pub final_result: Option<RaceOutcome>,
}

impl Default for HudState {
    fn default() -> Self {
        HudState {
            phase: Phase::Menu,
            paused: true,
            laps: 0,
            max_laps: 0,
            elapsed_s: 0,
            speed_display: 0,
            speed_fraction: 0.0,
            effect: None,
            ranking: vec![],
            countdown: None,
            final_result: None,
        }
    }
}

impl HudState {
    pub fn status(&self) -> &'static str {
        if self.paused {
            "Paused"
        } else {
            "Running"
        }
    }

    /// hud_line formats the state as a single status line.
    pub fn hud_line(&self) -> String {
        let effect = match &self.effect {
            Some(e) => format!("{} {:.2}s", e.name, e.remaining_s),
            None => "-".to_owned(),
        };
        let countdown = match self.countdown {
            Some(c) => format!(" | start in {}", c),
            None => String::new(),
        };

        format!(
            "{:?} | {} | lap {} / {} | {} s | speed {} / 100 | effect {} | ranking {}{}",
            self.phase,
            self.status(),
            self.laps,
            self.max_laps,
            self.elapsed_s,
            self.speed_display,
            effect,
            self.ranking.join(" > "),
            countdown
        )
    }
}
