//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::tracks::Track;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "cubefall")]
#[command(about = "Audio-reactive cube waterfall with selective bloom", long_about = None)]
pub struct Args {
    /// Config file (default: ./cubefall.toml, then the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Audio file to add to the track list (repeatable; replaces configured tracks)
    #[arg(long = "track", value_name = "PATH")]
    pub tracks: Vec<PathBuf>,

    /// Minimum cube scale for a cube to glow
    #[arg(long, value_name = "SCALE")]
    pub threshold: Option<f32>,

    /// Bloom strength
    #[arg(long)]
    pub strength: Option<f32>,

    /// Bloom radius (0-1)
    #[arg(long)]
    pub radius: Option<f32>,

    /// Tone-mapping exposure (applied as exposure^4)
    #[arg(long)]
    pub exposure: Option<f32>,

    /// Playback volume (linear gain)
    #[arg(long)]
    pub volume: Option<f32>,

    /// Initial window width (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Initial window height (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,
}

impl Args {
    /// Apply command-line overrides on top of the file configuration
    pub fn apply(&self, config: &mut Config) {
        let bloom = &mut config.bloom;
        if let Some(v) = self.threshold {
            bloom.threshold = v;
        }
        if let Some(v) = self.strength {
            bloom.strength = v;
        }
        if let Some(v) = self.radius {
            bloom.radius = v;
        }
        if let Some(v) = self.exposure {
            bloom.exposure = v;
        }
        *bloom = bloom.clamped();

        if let Some(v) = self.volume {
            config.audio.volume = v.max(0.0);
        }
        if let Some(v) = self.width.filter(|&w| w > 0) {
            config.window.window_width = v;
        }
        if let Some(v) = self.height.filter(|&h| h > 0) {
            config.window.window_height = v;
        }

        if !self.tracks.is_empty() {
            config.tracks = self.tracks.iter().cloned().map(Track::from_path).collect();
        }
    }
}
