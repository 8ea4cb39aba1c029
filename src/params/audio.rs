//! Spectrum analyser and playback configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Spectrum analyser configuration (byte frequency data, 0-255 per bin)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// FFT window size in samples (power of 2); yields fft_size / 2 bins
    pub fft_size: usize,

    /// Temporal smoothing between analyses (0 = none, close to 1 = heavy)
    pub smoothing: f32,

    /// Magnitude (dB) mapped to byte 0
    pub min_decibels: f32,

    /// Magnitude (dB) mapped to byte 255
    pub max_decibels: f32,

    /// Playback volume (linear gain)
    pub volume: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 64, // 32 bins, one per grid column
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
            volume: 0.5,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins per frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(ConfigError::Invalid(format!(
                "audio.fft_size must be a power of 2 in 32..=32768, got {}",
                self.fft_size
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(ConfigError::Invalid(format!(
                "audio.smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(ConfigError::Invalid(format!(
                "audio.min_decibels ({}) must be below audio.max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        if !(self.volume >= 0.0 && self.volume.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "audio.volume must be finite and not negative, got {}",
                self.volume
            )));
        }
        Ok(())
    }
}
