pub mod collaborators;
pub mod hud_interface;
pub mod input_interface;
