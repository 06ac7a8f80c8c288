use crate::core::route::Difficulty;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Recorded player time (s) of a race that was not completed.
pub const LOSS_SENTINEL_S: u64 = 999;

/// RaceOutcome contains the information shown on the over screen.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RaceOutcome {
    pub player_name: String,
    pub player_model: String,
    pub opponent_model: String,
    pub difficulty: Difficulty,
    pub laps: u32,
    pub max_laps: u32,
    pub player_time_s: u64,
    pub opponent_time_s: u64,
}

impl RaceOutcome {
    /// evaluate scores a race. `elapsed_s` is the race time in whole seconds, `player_time_s` the
    /// time tracked for the player while it had laps left, `threshold_s` the opponent's race time.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate(
        player_name: &str,
        player_model: &str,
        opponent_model: &str,
        difficulty: Difficulty,
        laps: u32,
        max_laps: u32,
        elapsed_s: u64,
        player_time_s: u64,
        threshold_s: u64,
    ) -> RaceOutcome {
        let (player_time_s, opponent_time_s) = if elapsed_s < threshold_s {
            (LOSS_SENTINEL_S, elapsed_s)
        } else {
            (player_time_s, threshold_s)
        };

        RaceOutcome {
            player_name: player_name.to_owned(),
            player_model: player_model.to_owned(),
            opponent_model: opponent_model.to_owned(),
            difficulty,
            laps,
            max_laps,
            player_time_s,
            opponent_time_s,
        }
    }

    pub fn player_won(&self) -> bool {
        self.player_time_s < self.opponent_time_s
    }

    pub fn summary(&self) -> anyhow::Result<String> {
        let mut tmp_string = String::new();
        writeln!(&mut tmp_string, "RESULT: Race on difficulty {}", self.difficulty)?;
        writeln!(
            &mut tmp_string,
            "{} ({}): {:4}s, {} / {} laps",
            self.player_name, self.player_model, self.player_time_s, self.laps, self.max_laps
        )?;
        writeln!(
            &mut tmp_string,
            "Opponent ({}): {:4}s",
            self.opponent_model, self.opponent_time_s
        )?;
        write!(
            &mut tmp_string,
            "RESULT: {}",
            if self.player_won() {
                "You won!"
            } else {
                "You lost!"
            }
        )?;
        Ok(tmp_string)
    }

    /// print_summary prints the race result to the console output.
    pub fn print_summary(&self) -> anyhow::Result<()> {
        println!("{}", self.summary()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate(elapsed_s: u64, player_time_s: u64) -> RaceOutcome {
        RaceOutcome::evaluate(
            "Ada",
            "Aquamarine",
            "Flame Cruiser",
            Difficulty::Normal,
            3,
            3,
            elapsed_s,
            player_time_s,
            69,
        )
    }

    #[test]
    fn unfinished_race_records_sentinel() {
        let outcome = evaluate(40, 40);
        assert_eq!(outcome.player_time_s, LOSS_SENTINEL_S);
        assert_eq!(outcome.opponent_time_s, 40);
        assert!(!outcome.player_won());
    }

    #[test]
    fn finished_race_compares_with_threshold() {
        let outcome = evaluate(69, 61);
        assert_eq!(outcome.player_time_s, 61);
        assert_eq!(outcome.opponent_time_s, 69);
        assert!(outcome.player_won());
        assert!(outcome.summary().unwrap().ends_with("You won!"));

        assert!(!evaluate(75, 72).player_won());
    }
}
