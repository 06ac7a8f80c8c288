pub mod effects;
pub mod handle_race;
pub mod hazard;
pub mod phase;
pub mod race;
pub mod route;
pub mod timer;
pub mod track;
pub mod vehicle;
