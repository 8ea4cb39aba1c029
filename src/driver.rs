//! Per-frame driver: sample, remember, map, composite.

use crate::compositor::{CompositeTarget, SelectiveBloom};
use crate::grid::Grid;
use crate::mapper::map_to_grid;
use crate::params::{BloomParameters, GridLayout, MappingConstants};
use crate::spectrum::{FrequencySource, History, SpectrumSampler};

/// Everything the visualization owns between frames
pub struct Visualizer {
    pub grid: Grid,
    pub history: History,
    pub params: BloomParameters,
    pub mapping: MappingConstants,
    sampler: SpectrumSampler,
    bloom: SelectiveBloom,
    frame_count: u64,
}

impl Visualizer {
    /// Create the grid and an empty history sized to it
    pub fn new(
        layout: &GridLayout,
        bins: usize,
        params: BloomParameters,
        mapping: MappingConstants,
    ) -> Self {
        Self {
            grid: Grid::new(layout),
            history: History::new(layout.rows),
            params,
            mapping,
            sampler: SpectrumSampler::new(bins),
            bloom: SelectiveBloom::new(),
            frame_count: 0,
        }
    }

    /// Advance one frame.
    ///
    /// Stale spectrum data still renders; only the final pass can fail, and
    /// the host decides how to recover (the loop itself never stops here).
    pub fn tick<S, T>(&mut self, source: &mut S, target: &mut T) -> Result<(), T::Error>
    where
        S: FrequencySource + ?Sized,
        T: CompositeTarget + ?Sized,
    {
        let frame = self.sampler.sample(source);
        self.history.push(frame);
        map_to_grid(&self.history, &mut self.grid, &self.params, &self.mapping);

        self.frame_count += 1;
        self.bloom.composite(&mut self.grid, &self.params, target)
    }

    /// Frames driven so far (including ones whose present failed)
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Consecutive frames rendered from stale spectrum data
    pub fn stale_frames(&self) -> u64 {
        self.sampler.stale_frames()
    }
}
