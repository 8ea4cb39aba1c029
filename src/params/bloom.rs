//! Live-tunable selective bloom parameters.

use std::ops::RangeInclusive;

use serde::Deserialize;

/// Bloom parameters read by the mapper and compositor every frame
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BloomParameters {
    /// Minimum cube scale for a cube to be glow-eligible
    pub threshold: f32,

    /// Bloom intensity multiplier
    pub strength: f32,

    /// Blur spread (0 = tight, 1 = wide)
    pub radius: f32,

    /// Tone-mapping exposure base (applied as exposure^4)
    pub exposure: f32,
}

impl Default for BloomParameters {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            strength: 0.345,
            radius: 0.1,
            exposure: 1.0,
        }
    }
}

impl BloomParameters {
    pub const THRESHOLD_RANGE: RangeInclusive<f32> = 0.0..=30.0;
    pub const STRENGTH_RANGE: RangeInclusive<f32> = 0.0..=3.0;
    pub const RADIUS_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const EXPOSURE_RANGE: RangeInclusive<f32> = 0.1..=2.0;

    /// Clamp every parameter into its control range
    pub fn clamped(self) -> Self {
        Self {
            threshold: clamp_to(self.threshold, &Self::THRESHOLD_RANGE),
            strength: clamp_to(self.strength, &Self::STRENGTH_RANGE),
            radius: clamp_to(self.radius, &Self::RADIUS_RANGE),
            exposure: clamp_to(self.exposure, &Self::EXPOSURE_RANGE),
        }
    }

    /// Exposure as consumed by the tone-mapping step
    pub fn tone_mapping_exposure(&self) -> f32 {
        self.exposure.powf(4.0)
    }
}

pub(crate) fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}
