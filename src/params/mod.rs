//! Parameter definitions with documented units and defaults.
//!
//! Every tunable of the visualizer lives here so that the configuration
//! file, the command line and the control surface all edit the same types.

mod audio;
mod bloom;
mod camera;
mod grid;
mod render;

// Re-export all types
pub use audio::AnalyserConfig;
pub use bloom::BloomParameters;
pub(crate) use bloom::clamp_to;
pub use camera::OrbitCameraConfig;
pub use grid::{GridLayout, MappingConstants};
pub use render::RenderConfig;
