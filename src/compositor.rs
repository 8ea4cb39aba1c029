//! Selective bloom: material swap bookkeeping around the two render passes.
//!
//! Only glowing cubes may contribute to the blurred bloom texture. Before the
//! bloom pass every glow-capable cube that is not glow-eligible is painted
//! black; its real material is stashed and written back before the final pass.

use std::fmt::Display;

use crate::grid::{Category, Grid, Material};
use crate::params::BloomParameters;

/// The two render passes of a selective bloom frame
pub trait CompositeTarget {
    type Error: Display;

    /// Render the (partially darkened) scene through the bloom filter chain
    fn render_bloom(&mut self, grid: &Grid, params: &BloomParameters) -> Result<(), Self::Error>;

    /// Render the unmodified scene, add the bloom texture, tone map, present
    fn render_final(&mut self, grid: &Grid, params: &BloomParameters) -> Result<(), Self::Error>;
}

/// Owns the (cube index, saved material) stash for one isolate pass
#[derive(Debug, Default)]
pub struct SelectiveBloom {
    stash: Vec<(usize, Material)>,
}

impl SelectiveBloom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint non-glowing glow-capable cubes black, stashing their materials.
    ///
    /// Returns the number of cubes darkened.
    pub fn darken_non_bloomed(&mut self, grid: &mut Grid) -> usize {
        let before = self.stash.len();

        for (index, cube) in grid.cubes_mut().iter_mut().enumerate() {
            if cube.category() != Category::GlowCapable || cube.glow || cube.material.is_dark() {
                continue;
            }
            self.stash.push((index, cube.material));
            cube.material = Material::Dark;
        }

        self.stash.len() - before
    }

    /// Write every stashed material back; the stash is empty afterwards.
    ///
    /// Returns the number of cubes restored.
    pub fn restore_materials(&mut self, grid: &mut Grid) -> usize {
        let restored = self.stash.len();
        let cubes = grid.cubes_mut();

        while let Some((index, material)) = self.stash.pop() {
            if let Some(cube) = cubes.get_mut(index) {
                cube.material = material;
            }
        }

        restored
    }

    /// Number of materials currently swapped out
    pub fn stashed(&self) -> usize {
        self.stash.len()
    }

    /// Run both passes for one frame.
    ///
    /// A failed bloom pass is logged and the final pass still runs over
    /// whatever bloom texture is available; only final-pass errors are returned.
    pub fn composite<T: CompositeTarget + ?Sized>(
        &mut self,
        grid: &mut Grid,
        params: &BloomParameters,
        target: &mut T,
    ) -> Result<(), T::Error> {
        let darkened = self.darken_non_bloomed(grid);
        let bloom = target.render_bloom(grid, params);
        let restored = self.restore_materials(grid);
        debug_assert_eq!(darkened, restored);

        if let Err(e) = bloom {
            log::warn!("Bloom pass failed, compositing without glow: {}", e);
        }

        target.render_final(grid, params)
    }
}
