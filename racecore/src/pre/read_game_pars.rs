use crate::core::race::RacePars;
use crate::core::route::RoutePars;
use crate::core::track::TrackPars;
use crate::core::vehicle::{VehiclePars, VehicleRole};
use anyhow::Context;
use helpers::general::InputValueError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs::OpenOptions;
use std::path::Path;

/// GamePars is used to store all other parameter structs.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GamePars {
    pub race_pars: RacePars,
    pub track_pars: TrackPars,
    pub route_pars: RoutePars,
    pub vehicle_pars_all: Vec<VehiclePars>,
}

fn catalog_entry(model: &str, color: &str, role: VehicleRole, spot: [f64; 2]) -> VehiclePars {
    VehiclePars {
        model: model.to_owned(),
        color: color.to_owned(),
        role,
        parking_spot: spot,
        parking_heading: match role {
            VehicleRole::Player => PI / 2.0,
            VehicleRole::Opponent => PI / 1.3,
        },
    }
}

impl Default for GamePars {
    fn default() -> Self {
        GamePars {
            race_pars: RacePars::default(),
            track_pars: TrackPars::default(),
            route_pars: RoutePars::default(),
            vehicle_pars_all: vec![
                catalog_entry("Aquamarine", "#00ffff", VehicleRole::Player, [-88.0, 17.0]),
                catalog_entry("Street Blue", "#91a0e6", VehicleRole::Player, [-85.0, 21.0]),
                catalog_entry("Azure Blitz", "#6666ff", VehicleRole::Player, [-82.0, 25.0]),
                catalog_entry("Flame Cruiser", "#d66904", VehicleRole::Opponent, [-71.0, 55.0]),
                catalog_entry("Crimson Comet", "#c9406e", VehicleRole::Opponent, [-70.0, 60.0]),
                catalog_entry("Blood Bullet", "#ff2222", VehicleRole::Opponent, [-69.0, 65.0]),
            ],
        }
    }
}

impl GamePars {
    /// validate checks the parameters for consistency before a game is created from them.
    pub fn validate(&self) -> Result<(), InputValueError> {
        if self.track_pars.control_points.len() < 2 {
            return Err(InputValueError::new(
                "Track requires at least 2 control points!",
            ));
        }
        if self.track_pars.segments == 0 {
            return Err(InputValueError::new(
                "Track must be sampled with at least 1 segment!",
            ));
        }
        if self.race_pars.max_laps == 0 {
            return Err(InputValueError::new("Race requires at least 1 lap!"));
        }

        self.route_pars.validate()?;

        if self.vehicle_pars_all.is_empty() {
            return Err(InputValueError::new("Vehicle catalog is empty!"));
        }
        for role in [VehicleRole::Player, VehicleRole::Opponent] {
            if !self.vehicle_pars_all.iter().any(|v| v.role == role) {
                return Err(InputValueError::new(format!(
                    "Vehicle catalog lacks a vehicle for slot {:?}!",
                    role
                )));
            }
        }
        for vehicle_pars in self.vehicle_pars_all.iter() {
            if vehicle_pars
                .color
                .parse::<css_color_parser::Color>()
                .is_err()
            {
                return Err(InputValueError::new(format!(
                    "Color {} of vehicle {} cannot be parsed!",
                    vehicle_pars.color, vehicle_pars.model
                )));
            }
        }
        Ok(())
    }

    /// vehicle_idx returns the catalog index of the vehicle with the given model name.
    pub fn vehicle_idx(&self, model: &str) -> Option<usize> {
        self.vehicle_pars_all
            .iter()
            .position(|v| v.model.eq_ignore_ascii_case(model))
    }
}

/// read_game_pars reads the JSON file and decodes the JSON string into the game parameters
/// struct.
pub fn read_game_pars(filepath: &Path) -> anyhow::Result<GamePars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars: GamePars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    pars.validate().context(format!(
        "Invalid parameters in file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}

#[derive(Debug, Deserialize, Clone)]
pub struct CsvTrackEl {
    pub x_m: f64,
    pub z_m: f64,
}

/// read_track_csv reads the track control points from a CSV file with the columns x_m and z_m.
pub fn read_track_csv(filepath: &Path) -> anyhow::Result<Vec<[f64; 2]>> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!("Failed to open track file {}!", filepath.display()))?;

    let mut csv_reader = csv::Reader::from_reader(&fh);
    let mut control_points: Vec<[f64; 2]> = vec![];

    for result in csv_reader.deserialize() {
        let csv_track_el: CsvTrackEl = result.context(format!(
            "Failed to parse track file {}!",
            filepath.display()
        ))?;
        control_points.push([csv_track_el.x_m, csv_track_el.z_m]);
    }

    if control_points.len() < 2 {
        return Err(InputValueError::new(format!(
            "Track file {} contains less than 2 control points!",
            filepath.display()
        ))
        .into());
    }
    Ok(control_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("racecore_{}_{}", std::process::id(), name));
        let mut fh = std::fs::File::create(&path).unwrap();
        fh.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn default_parameters_are_valid() {
        let pars = GamePars::default();
        assert!(pars.validate().is_ok());
        assert_eq!(pars.vehicle_idx("blood bullet"), Some(5));
        assert_eq!(pars.vehicle_idx("Unknown"), None);
    }

    #[test]
    fn catalog_needs_both_slots() {
        let mut pars = GamePars::default();
        pars.vehicle_pars_all
            .retain(|v| v.role == VehicleRole::Player);
        assert!(pars.validate().is_err());
    }

    #[test]
    fn invalid_colors_and_tracks_are_rejected() {
        let mut pars = GamePars::default();
        pars.vehicle_pars_all[0].color = "#nothex".to_owned();
        assert!(pars.validate().is_err());

        let mut pars = GamePars::default();
        pars.track_pars.segments = 0;
        assert!(pars.validate().is_err());
    }

    #[test]
    fn game_pars_survive_json() {
        let json = serde_json::to_string(&GamePars::default()).unwrap();
        let path = temp_file("pars.json", &json);
        let pars = read_game_pars(&path).unwrap();
        assert_eq!(pars.vehicle_pars_all.len(), 6);
        assert_eq!(pars.race_pars.max_laps, 3);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn track_csv_is_read() {
        let path = temp_file("track.csv", "x_m,z_m\n0.0,0.0\n0.0,-50.0\n40.0,-50.0\n");
        let points = read_track_csv(&path).unwrap();
        assert_eq!(points, vec![[0.0, 0.0], [0.0, -50.0], [40.0, -50.0]]);
        std::fs::remove_file(path).unwrap();

        let path = temp_file("short.csv", "x_m,z_m\n0.0,0.0\n");
        assert!(read_track_csv(&path).is_err());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_game_pars(Path::new("does/not/exist.json")).unwrap_err();
        assert!(format!("{}", err).contains("does/not/exist.json"));
    }
}
