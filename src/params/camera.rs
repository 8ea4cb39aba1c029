//! Orbit camera placement and input sensitivity.

use serde::Deserialize;

/// Orbit camera parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbitCameraConfig {
    /// Initial eye position (world units)
    pub eye: [f32; 3],

    /// Orbit pivot (world units)
    pub target: [f32; 3],

    /// Radians of rotation per pixel of drag
    pub rotate_speed: f32,

    /// Fractional distance change per scroll line
    pub zoom_speed: f32,

    /// Closest allowed eye distance from the pivot
    pub min_distance: f32,

    /// Farthest allowed eye distance from the pivot
    pub max_distance: f32,
}

impl Default for OrbitCameraConfig {
    fn default() -> Self {
        Self {
            eye: [70.0, 50.0, 20.0],
            target: [0.0, 0.0, 0.0],
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_distance: 5.0,
            max_distance: 500.0,
        }
    }
}
