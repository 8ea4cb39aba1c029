//! Orbit camera: drag to rotate around the grid, scroll to zoom.

use glam::{Mat4, Vec3};

use crate::params::{OrbitCameraConfig, RenderConfig};

/// Keeps the camera from flipping over the poles
const POLAR_EPSILON: f32 = 1e-3;

/// Perspective camera orbiting a fixed pivot
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    distance: f32,
    /// Angle around +Y, measured from +Z toward +X (radians)
    azimuth: f32,
    /// Angle from +Y (radians)
    polar: f32,
    aspect: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    config: OrbitCameraConfig,
}

impl OrbitCamera {
    /// Create camera from the configured eye/pivot and projection settings
    pub fn new(config: OrbitCameraConfig, render_config: &RenderConfig) -> Self {
        let target = Vec3::from_array(config.target);
        let offset = Vec3::from_array(config.eye) - target;
        let distance = offset.length().max(f32::EPSILON);

        Self {
            target,
            distance,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / distance).clamp(-1.0, 1.0).acos(),
            aspect: render_config.aspect_ratio(),
            fov_y: render_config.fov_degrees.to_radians(),
            near: render_config.near_plane,
            far: render_config.far_plane,
            config,
        }
    }

    /// Current eye position
    pub fn eye(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.distance
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Track the viewport; zero-height viewports (minimized windows) are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Rotate by a pointer drag in pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * self.config.rotate_speed;
        self.polar = (self.polar - dy * self.config.rotate_speed)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);
    }

    /// Zoom by scroll lines (positive = closer)
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - self.config.zoom_speed).powf(lines);
        self.distance = (self.distance * factor)
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Combined projection * view matrix
    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(OrbitCameraConfig::default(), &RenderConfig::default())
    }

    #[test]
    fn test_initial_eye_matches_config() {
        let camera = camera();
        let eye = camera.eye();

        assert!((eye - Vec3::new(70.0, 50.0, 20.0)).length() < 1e-3);
    }

    #[test]
    fn test_rotate_keeps_distance() {
        let mut camera = camera();
        let distance = camera.distance();

        camera.rotate(120.0, -45.0);
        assert!(((camera.eye() - camera.target()).length() - distance).abs() < 1e-3);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = camera();

        camera.rotate(0.0, 1.0e6);
        assert!(camera.eye().y > camera.target().y);
        assert!(camera.eye().is_finite());

        camera.rotate(0.0, -1.0e6);
        assert!(camera.eye().y < camera.target().y);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = camera();

        camera.zoom(1000.0);
        assert_eq!(camera.distance(), OrbitCameraConfig::default().min_distance);

        camera.zoom(-1000.0);
        assert_eq!(camera.distance(), OrbitCameraConfig::default().max_distance);
    }

    #[test]
    fn test_viewport_updates_aspect() {
        let mut camera = camera();

        camera.set_viewport(1920, 1080);
        assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);

        // Minimized window keeps the previous aspect
        camera.set_viewport(800, 0);
        assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let view_proj = camera().view_proj();

        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(view_proj.is_finite());
    }
}
