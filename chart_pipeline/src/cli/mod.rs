pub mod commands;
pub mod params;
