//! Waterfall behaviour through the public frame driver, without audio or GPU.

use std::collections::VecDeque;
use std::convert::Infallible;

use cubefall::compositor::CompositeTarget;
use cubefall::driver::Visualizer;
use cubefall::grid::Grid;
use cubefall::params::{BloomParameters, GridLayout, MappingConstants};
use cubefall::spectrum::{FrequencyFrame, FrequencySource};

/// Hands out queued frames, then nothing
struct Script(VecDeque<FrequencyFrame>);

impl Script {
    fn new(frames: &[[u8; 2]]) -> Self {
        Self(frames.iter().map(|f| FrequencyFrame::from(f.to_vec())).collect())
    }
}

impl FrequencySource for Script {
    fn frequency_data(&mut self) -> Option<FrequencyFrame> {
        self.0.pop_front()
    }
}

/// Records what each pass saw
#[derive(Default)]
struct Recorder {
    darkened_in_bloom: Vec<usize>,
    dark_in_final: Vec<usize>,
    column_zero: Vec<Vec<f32>>,
}

impl CompositeTarget for Recorder {
    type Error = Infallible;

    fn render_bloom(&mut self, grid: &Grid, _: &BloomParameters) -> Result<(), Infallible> {
        let dark = grid.cubes().iter().filter(|c| c.material.is_dark()).count();
        self.darkened_in_bloom.push(dark);
        Ok(())
    }

    fn render_final(&mut self, grid: &Grid, _: &BloomParameters) -> Result<(), Infallible> {
        let dark = grid.cubes().iter().filter(|c| c.material.is_dark()).count();
        self.dark_in_final.push(dark);
        self.column_zero.push(
            (0..grid.rows())
                .filter_map(|row| grid.get(0, row))
                .map(|c| c.scale_y)
                .collect(),
        );
        Ok(())
    }
}

fn visualizer(threshold: f32) -> Visualizer {
    let layout = GridLayout {
        columns: 2,
        rows: 3,
        spacing: 3.0,
    };
    let params = BloomParameters {
        threshold,
        ..Default::default()
    };
    Visualizer::new(&layout, 2, params, MappingConstants::default())
}

fn assert_scales(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 0.01, "{:?} != {:?}", actual, expected);
    }
}

#[test]
fn test_newest_frame_enters_last_row_and_scrolls_back() {
    let mut viz = visualizer(3.0);
    let mut source = Script::new(&[[255, 0], [160, 0], [80, 0]]);
    let mut target = Recorder::default();

    for _ in 0..4 {
        viz.tick(&mut source, &mut target).unwrap();
    }

    let loud = 255.0f32 / 80.0;
    let loud = loud * loud * 5.0;

    // Rows not yet reached by history keep their initial scale
    assert_scales(&target.column_zero[0], &[1.0, 1.0, loud]);
    assert_scales(&target.column_zero[1], &[1.0, loud, 20.0]);
    assert_scales(&target.column_zero[2], &[loud, 20.0, 5.0]);

    // Empty source: the last frame is reused and still scrolls
    assert_scales(&target.column_zero[3], &[20.0, 5.0, 5.0]);
    assert_eq!(viz.stale_frames(), 1);
    assert_eq!(viz.frame_count(), 4);
}

#[test]
fn test_only_glowing_cubes_stay_lit_for_bloom() {
    let mut viz = visualizer(10.0);
    let mut source = Script::new(&[[255, 0]]);
    let mut target = Recorder::default();

    viz.tick(&mut source, &mut target).unwrap();

    // One glowing cube out of six
    assert_eq!(target.darkened_in_bloom, vec![5]);
    assert_eq!(target.dark_in_final, vec![0]);
    assert!(viz.grid.get(0, 2).unwrap().glow);
    assert!(!viz.grid.get(1, 2).unwrap().visible);
}

#[test]
fn test_history_and_positions_are_stable() {
    let mut viz = visualizer(3.0);
    let positions: Vec<_> = viz.grid.cubes().iter().map(|c| c.position()).collect();
    let mut source = Script::new(&[[200, 100]; 10]);
    let mut target = Recorder::default();

    for _ in 0..10 {
        viz.tick(&mut source, &mut target).unwrap();
    }

    assert_eq!(viz.history.len(), 3);
    let after: Vec<_> = viz.grid.cubes().iter().map(|c| c.position()).collect();
    assert_eq!(positions, after);
}

#[test]
fn test_raised_threshold_applies_on_next_frame() {
    let mut viz = visualizer(3.0);
    let mut source = Script::new(&[[255, 120], [255, 120]]);
    let mut target = Recorder::default();

    viz.tick(&mut source, &mut target).unwrap();
    let before = viz.grid.cubes().iter().filter(|c| c.glow).count();

    viz.params.threshold = 25.0;
    viz.tick(&mut source, &mut target).unwrap();
    let glowing: Vec<_> = viz.grid.cubes().iter().filter(|c| c.glow).collect();

    // 120 maps to 11.25: glowing at 3, not at 25
    assert_eq!(before, 2);
    assert_eq!(glowing.len(), 2);
    assert!(glowing.iter().all(|c| c.scale_y >= 25.0));
}
