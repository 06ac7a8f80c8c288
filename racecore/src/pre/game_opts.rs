use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "racecore",
    about = "A headless two-car arcade race against a route-driven opponent"
)]
pub struct GameOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Print HUD lines while the race is running
    #[clap(long)]
    pub hud: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the game parameter file (OPTIONAL: if not set, uses the built-in circuit)
    #[clap(short, long)]
    pub parfile: Option<PathBuf>,

    /// Set path to a CSV file with track control points (columns x_m, z_m), replaces the
    /// control points of the parameter file
    #[clap(short, long)]
    pub track_file: Option<PathBuf>,

    /// Set the player name shown on the HUD
    #[clap(short, long, default_value = "Player")]
    pub name: String,

    /// Set difficulty, normal or hard
    #[clap(long, default_value = "normal")]
    pub difficulty: String,

    /// Set model name of the player's car
    #[clap(long, default_value = "Aquamarine")]
    pub player_car: String,

    /// Set model name of the opponent's car
    #[clap(long, default_value = "Flame Cruiser")]
    pub opponent_car: String,

    /// Set maximum number of simulated ticks before the race is quit
    #[clap(short, long, default_value = "20000")]
    pub max_ticks: u64,

    /// Set real-time factor (0 simulates as fast as possible)
    #[clap(short, long, default_value = "0.0")]
    pub realtime_factor: f64,
}
