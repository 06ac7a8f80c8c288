use crate::core::phase::Phase;
use crate::core::race::RaceController;
use crate::core::timer::{TICK, UNITS_PER_S};
use crate::interfaces::hud_interface::{HudState, MAX_HUD_UPDATE_FREQUENCY};
use crate::interfaces::input_interface::InputSource;
use crate::post::race_result::RaceOutcome;
use anyhow::Context;
use flume::Sender;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// handle_race drives the game one tick at a time until a race is over or `max_ticks` ticks have
/// been simulated. Input events are polled before every tick. If a sender is inserted, HUD
/// states are forwarded at a bounded frequency and the final result is sent once. A positive
/// real-time factor paces the ticks in wall-clock time.
///
/// Returns the race outcome, or None if no race was completed within `max_ticks`.
pub fn handle_race(
    game: &mut RaceController,
    input: &mut dyn InputSource,
    max_ticks: u64,
    tx: Option<&Sender<HudState>>,
    realtime_factor: f64,
) -> anyhow::Result<Option<RaceOutcome>> {
    let hud_period = (UNITS_PER_S as f64 / MAX_HUD_UPDATE_FREQUENCY) as u64;
    let mut t_hud_update: Option<u64> = None;

    for tick in 0..max_ticks {
        let t_start = Instant::now();

        for event in input.poll(tick, game) {
            game.handle_event(&event);
        }
        game.update();

        if game.phase() == Phase::Over {
            if let Some(outcome) = game.outcome() {
                log::info!("Race finished after {} ticks", tick + 1);

                if let Some(tx) = tx {
                    let final_msg = HudState {
                        phase: Phase::Over,
                        final_result: Some(outcome.to_owned()),
                        ..HudState::default()
                    };
                    tx.send(final_msg)
                        .context("Failed to send final race result to HUD!")?;
                }
                return Ok(Some(outcome.to_owned()));
            }
        }

        // send current HUD state
        if let Some(tx) = tx {
            let t_now = tick * TICK;
            let due = match t_hud_update {
                Some(t_last) => t_now >= t_last + hud_period,
                None => true,
            };

            if due {
                if let Some(hud_state) = game.hud_state() {
                    tx.send(hud_state).context("Failed to send HUD state!")?;
                    t_hud_update = Some(t_now);
                }
            }
        }

        // sleep until the tick is finished in real-time as well (calculation in ms)
        if realtime_factor > 0.0 {
            let t_sleep =
                (TICK as f64 / realtime_factor) as i64 - t_start.elapsed().as_millis() as i64;

            if t_sleep > 0 {
                sleep(Duration::from_millis(t_sleep as u64));
            } else {
                log::warn!("Could not keep up with real-time!");
            }
        }
    }

    log::warn!("No race completed within {} ticks", max_ticks);
    Ok(None)
}
