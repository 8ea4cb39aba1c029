//! cubefall library - audio-reactive cube waterfall with selective bloom

pub mod audio;
pub mod camera;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod controls;
pub mod driver;
pub mod error;
pub mod grid;
pub mod mapper;
pub mod params;
pub mod rendering;
pub mod spectrum;
pub mod tracks;
