//! Cube grid layout and the magnitude-to-geometry mapping constants.

use serde::Deserialize;

/// Cube grid dimensions and spacing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Number of columns (frequency bins shown per row)
    pub columns: usize,

    /// Number of rows (history depth; row H-1 is the newest frame)
    pub rows: usize,

    /// Distance between neighbouring cube centers (world units)
    pub spacing: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 32,
            rows: 40,
            spacing: 3.0,
        }
    }
}

impl GridLayout {
    /// Total number of cubes (columns * rows)
    pub fn cube_count(&self) -> usize {
        self.columns * self.rows
    }
}

/// Constants turning one byte magnitude into cube scale, visibility and hue.
///
/// Empirical values:
/// `scale = (magnitude / normalization)^2 * scale_factor`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MappingConstants {
    /// Magnitude divisor applied before squaring
    pub normalization: f32,

    /// Multiplier applied after squaring
    pub scale_factor: f32,

    /// Cubes whose scale is not above this are hidden
    pub visibility_threshold: f32,

    /// Magnitude divisor for the hue angle (0..1 turn)
    pub max_magnitude: f32,
}

impl Default for MappingConstants {
    fn default() -> Self {
        Self {
            normalization: 80.0,
            scale_factor: 5.0,
            visibility_threshold: 5.0,
            max_magnitude: 256.0,
        }
    }
}

impl MappingConstants {
    /// Vertical scale for a raw magnitude
    pub fn scale_for(&self, magnitude: f32) -> f32 {
        let normalized = magnitude / self.normalization;
        normalized * normalized * self.scale_factor
    }

    /// Hue (fraction of a full turn) for a raw magnitude
    pub fn hue_for(&self, magnitude: f32) -> f32 {
        magnitude / self.max_magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_squared() {
        let constants = MappingConstants::default();

        assert_eq!(constants.scale_for(0.0), 0.0);
        assert!((constants.scale_for(80.0) - 5.0).abs() < 1e-6);
        assert!((constants.scale_for(160.0) - 20.0).abs() < 1e-6);
        assert!((constants.scale_for(255.0) - 50.8008).abs() < 1e-3);
    }

    #[test]
    fn test_default_layout_cube_count() {
        assert_eq!(GridLayout::default().cube_count(), 32 * 40);
    }
}
