//! TOML configuration file.
//!
//! Every section is optional; missing keys fall back to the defaults in
//! [`crate::params`]. Command-line flags are applied on top afterwards.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::params::{
    AnalyserConfig, BloomParameters, GridLayout, MappingConstants, OrbitCameraConfig,
    RenderConfig,
};
use crate::tracks::{Track, TrackList};

/// File name looked up in the working directory
pub const FILE_NAME: &str = "cubefall.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridLayout,
    pub mapping: MappingConstants,
    pub bloom: BloomParameters,
    pub audio: AnalyserConfig,
    pub window: RenderConfig,
    pub camera: OrbitCameraConfig,
    pub tracks: Vec<Track>,
}

impl Config {
    /// Parse and validate config text; `path` is only used for errors
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let clamped = config.bloom.clamped();
        if clamped != config.bloom {
            log::warn!("Bloom parameters in {} clamped to range", path.display());
            config.bloom = clamped;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Load `explicit` if given, else the first existing default location,
    /// else built-in defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            log::info!("Config: {}", path.display());
            return Self::load(path);
        }

        match search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                log::info!("Config: {}", path.display());
                Self::load(&path)
            }
            None => {
                log::info!("Config: built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns == 0 || self.grid.rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must have at least one column and row, got {}x{}",
                self.grid.columns, self.grid.rows
            )));
        }
        if self.grid.spacing <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "grid.spacing must be positive, got {}",
                self.grid.spacing
            )));
        }
        if self.mapping.normalization <= 0.0 || self.mapping.max_magnitude <= 0.0 {
            return Err(ConfigError::Invalid(
                "mapping.normalization and mapping.max_magnitude must be positive".to_string(),
            ));
        }
        let bloom = &self.bloom;
        if ![bloom.threshold, bloom.strength, bloom.radius, bloom.exposure]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ConfigError::Invalid(format!(
                "bloom parameters must be finite, got {:?}",
                bloom
            )));
        }
        let camera = &self.camera;
        if !(camera.zoom_speed > 0.0 && camera.zoom_speed < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.zoom_speed must be between 0 and 1 (exclusive), got {}",
                camera.zoom_speed
            )));
        }
        if !(camera.min_distance > 0.0 && camera.min_distance <= camera.max_distance) {
            return Err(ConfigError::Invalid(format!(
                "camera distances must satisfy 0 < min_distance <= max_distance, got {}..{}",
                camera.min_distance, camera.max_distance
            )));
        }
        if self.window.window_width == 0 || self.window.window_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.window_width, self.window.window_height
            )));
        }
        self.audio.validate()
    }

    /// Configured tracks, or the built-in pair when none are listed
    pub fn track_list(&self) -> TrackList {
        if self.tracks.is_empty() {
            TrackList::default()
        } else {
            TrackList::new(self.tracks.clone())
        }
    }
}

/// Default config locations, in lookup order
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cubefall").join("config.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        Config::parse(text, Path::new("test.toml"))
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = parse("").unwrap();

        assert_eq!(config.grid, GridLayout::default());
        assert_eq!(config.bloom, BloomParameters::default());
        assert_eq!(config.audio.fft_size, 64);
        assert!(config.tracks.is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse(
            r#"
            [grid]
            columns = 16

            [bloom]
            strength = 1.2

            [[tracks]]
            name = "Demo"
            path = "demo.flac"
            "#,
        )
        .unwrap();

        assert_eq!(config.grid.columns, 16);
        assert_eq!(config.grid.rows, GridLayout::default().rows);
        assert_eq!(config.bloom.strength, 1.2);
        assert_eq!(config.bloom.threshold, BloomParameters::default().threshold);

        let tracks = config.track_list();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks.current().unwrap().name, "Demo");
    }

    #[test]
    fn test_default_track_list_when_none_configured() {
        let config = Config::default();
        assert_eq!(config.track_list().len(), 2);
    }

    #[test]
    fn test_zero_rows_rejected() {
        let err = parse("[grid]\nrows = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_fft_size_rejected() {
        let err = parse("[audio]\nfft_size = 100").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_out_of_range_bloom_is_clamped() {
        let config = parse("[bloom]\nexposure = 9.0\nthreshold = -1.0").unwrap();
        assert_eq!(config.bloom.exposure, 2.0);
        assert_eq!(config.bloom.threshold, 0.0);
    }

    #[test]
    fn test_nan_bloom_rejected() {
        let err = parse("[bloom]\nthreshold = nan").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = parse("[bloom]\nstrength = inf").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zoom_speed_must_stay_below_one() {
        for text in [
            "[camera]\nzoom_speed = 1.0",
            "[camera]\nzoom_speed = 1.5",
            "[camera]\nzoom_speed = 0.0",
        ] {
            let err = parse(text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{}", text);
        }
        assert!(parse("[camera]\nzoom_speed = 0.5").is_ok());
    }

    #[test]
    fn test_inverted_camera_distances_rejected() {
        let err = parse("[camera]\nmin_distance = 50.0\nmax_distance = 10.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_syntax_error() {
        let err = parse("[grid\ncolumns = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::resolve(Some(Path::new("/nope/cubefall.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_search_paths_start_in_working_dir() {
        assert_eq!(search_paths()[0], PathBuf::from(FILE_NAME));
    }
}
