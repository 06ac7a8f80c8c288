mod autopilot;

use anyhow::Context;
use autopilot::Autopilot;
use clap::Parser;
use racecore::core::race::RaceController;
use racecore::core::route::Difficulty;
use racecore::interfaces::collaborators::{HotspotPicker, NullCamera, NullScene, PickTarget};
use racecore::interfaces::hud_interface::HudState;
use racecore::pre::game_opts::GameOpts;
use racecore::pre::read_game_pars::{read_game_pars, read_track_csv, GamePars};
use std::thread;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get game options from the command line arguments
    let game_opts: GameOpts = GameOpts::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if game_opts.debug {
            "debug"
        } else {
            "info"
        },
    ))
    .init();

    // get game parameters
    let mut game_pars = if let Some(parfile) = &game_opts.parfile {
        log::info!("Reading game parameters from {}", parfile.display());
        read_game_pars(parfile)?
    } else {
        log::info!("No parameter file provided, using the built-in circuit");
        GamePars::default()
    };

    if let Some(track_file) = &game_opts.track_file {
        log::info!("Reading track control points from {}", track_file.display());
        game_pars.track_pars.control_points = read_track_csv(track_file)?;
    }
    game_pars.validate()?;

    let difficulty: Difficulty = game_opts.difficulty.parse()?;
    let player_idx = game_pars
        .vehicle_idx(&game_opts.player_car)
        .context(format!("Unknown player car {}!", game_opts.player_car))?;
    let opponent_idx = game_pars
        .vehicle_idx(&game_opts.opponent_car)
        .context(format!("Unknown opponent car {}!", game_opts.opponent_car))?;

    // every clickable thing gets its own screen hotspot, other clicks hit the ground
    let mut targets = vec![
        PickTarget::Difficulty(Difficulty::Normal),
        PickTarget::Difficulty(Difficulty::Hard),
        PickTarget::StartButton,
        PickTarget::RestartButton,
        PickTarget::MenuButton,
    ];
    targets.extend((0..game_pars.vehicle_pars_all.len()).map(PickTarget::Vehicle));
    targets.extend(
        game_pars
            .race_pars
            .obstacle_templates
            .iter()
            .map(|template| PickTarget::ObstacleTemplate(template.kind)),
    );

    let mut game = RaceController::new(
        &game_pars,
        Box::new(NullScene),
        Box::new(NullCamera),
        Box::new(HotspotPicker::with_grid(&targets, true)),
    )?;
    let mut autopilot = Autopilot::new(
        &game_opts.name,
        &targets,
        vec![
            PickTarget::Difficulty(difficulty),
            PickTarget::Vehicle(player_idx),
            PickTarget::Vehicle(opponent_idx),
        ],
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();

    let outcome = if game_opts.hud {
        // HUD lines are printed on a separate thread
        let (tx, rx) = flume::unbounded::<HudState>();
        let printer = thread::spawn(move || {
            for hud_state in rx.iter() {
                match &hud_state.final_result {
                    Some(_) => println!("HUD: race over"),
                    None => println!("HUD: {}", hud_state.hud_line()),
                }
            }
        });

        let outcome = racecore::core::handle_race::handle_race(
            &mut game,
            &mut autopilot,
            game_opts.max_ticks,
            Some(&tx),
            game_opts.realtime_factor,
        )?;

        drop(tx);
        if printer.join().is_err() {
            log::warn!("HUD printer thread panicked");
        }
        outcome
    } else {
        racecore::core::handle_race::handle_race(
            &mut game,
            &mut autopilot,
            game_opts.max_ticks,
            None,
            game_opts.realtime_factor,
        )?
    };

    log::info!("Execution time: {}ms", t_start.elapsed().as_millis());

    // POST-PROCESSING -----------------------------------------------------------------------------
    match outcome {
        Some(outcome) => outcome.print_summary()?,
        None => log::warn!(
            "Race did not finish within {} ticks, increase --max-ticks",
            game_opts.max_ticks
        ),
    }

    Ok(())
}
