//! Projection of the spectrum history onto the cube grid.
//!
//! History row `r` (0 = newest) lands on grid row `H - 1 - r`, so every new
//! frame pushes older rows one step further away: the waterfall scroll.
//! Column `i` is frequency bin `i`.

use crate::grid::{Color, Grid, Material};
use crate::params::{BloomParameters, MappingConstants};
use crate::spectrum::History;

/// Visual state derived from a single magnitude
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeState {
    pub scale_y: f32,
    pub color: Color,
    pub visible: bool,
    pub glow: bool,
}

/// Derive scale, color, visibility and glow eligibility for one magnitude
pub fn cube_state(
    magnitude: u8,
    params: &BloomParameters,
    constants: &MappingConstants,
) -> CubeState {
    let magnitude = f32::from(magnitude);
    let scale_y = constants.scale_for(magnitude);

    CubeState {
        scale_y,
        color: Color::from_hsl(constants.hue_for(magnitude), 1.0, 0.5),
        visible: scale_y > constants.visibility_threshold,
        // Independent of visibility; the compositor decides what to do with it
        glow: scale_y >= params.threshold,
    }
}

/// Update every cube covered by `history`; cubes outside it keep their state.
///
/// Returns the number of cubes written.
pub fn map_to_grid(
    history: &History,
    grid: &mut Grid,
    params: &BloomParameters,
    constants: &MappingConstants,
) -> usize {
    let rows = grid.rows();
    let columns = grid.columns();
    let mut written = 0;

    for (r, frame) in history.rows().take(rows).enumerate() {
        let grid_row = rows - 1 - r;

        for (col, &magnitude) in frame.as_slice().iter().take(columns).enumerate() {
            let Some(cube) = grid.get_mut(col, grid_row) else {
                continue;
            };

            let state = cube_state(magnitude, params, constants);
            cube.scale_y = state.scale_y;
            cube.material = Material::Basic { color: state.color };
            cube.visible = state.visible;
            cube.glow = state.glow;
            written += 1;
        }
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GridLayout;
    use crate::spectrum::FrequencyFrame;

    fn small_layout() -> GridLayout {
        GridLayout {
            columns: 4,
            rows: 3,
            spacing: 3.0,
        }
    }

    #[test]
    fn test_silence_hides_everything() {
        let layout = GridLayout::default();
        let mut grid = Grid::new(&layout);
        let mut history = History::new(layout.rows);
        for _ in 0..layout.rows {
            history.push(FrequencyFrame::silent(layout.columns));
        }

        let params = BloomParameters::default();
        map_to_grid(&history, &mut grid, &params, &MappingConstants::default());

        for cube in grid.cubes() {
            assert_eq!(cube.scale_y, 0.0);
            assert!(!cube.visible);
            assert!(!cube.glow);
        }
    }

    #[test]
    fn test_max_magnitude_spike() {
        let params = BloomParameters::default();
        let state = cube_state(255, &params, &MappingConstants::default());

        assert!((state.scale_y - 50.8).abs() < 0.01);
        assert!(state.visible);
        assert!(state.glow);

        let strict = BloomParameters {
            threshold: 51.0,
            ..params
        };
        assert!(!cube_state(255, &strict, &MappingConstants::default()).glow);
    }

    #[test]
    fn test_glow_is_independent_of_visibility() {
        // scale = (60/80)^2 * 5 = 2.8125: hidden, but above a low threshold
        let params = BloomParameters {
            threshold: 2.0,
            ..Default::default()
        };
        let state = cube_state(60, &params, &MappingConstants::default());

        assert!(!state.visible);
        assert!(state.glow);
    }

    #[test]
    fn test_raising_threshold_never_adds_glow() {
        let constants = MappingConstants::default();

        for magnitude in 0..=255u8 {
            let mut was_eligible = true;
            for step in 0..=60 {
                let params = BloomParameters {
                    threshold: step as f32 * 0.5,
                    ..Default::default()
                };
                let eligible = cube_state(magnitude, &params, &constants).glow;
                assert!(
                    !eligible || was_eligible,
                    "magnitude {} became eligible at threshold {}",
                    magnitude,
                    params.threshold
                );
                was_eligible = eligible;
            }
        }
    }

    #[test]
    fn test_newest_row_lands_nearest_and_scrolls() {
        let layout = small_layout();
        let mut grid = Grid::new(&layout);
        let mut history = History::new(layout.rows);
        let params = BloomParameters::default();
        let constants = MappingConstants::default();

        history.push(FrequencyFrame::from(vec![200, 0, 0, 0]));
        map_to_grid(&history, &mut grid, &params, &constants);
        let loud = grid.get(0, 2).unwrap().scale_y;
        assert!(loud > 0.0);

        history.push(FrequencyFrame::from(vec![0, 0, 0, 0]));
        map_to_grid(&history, &mut grid, &params, &constants);

        // The loud frame moved one row away, the new one took its place
        assert_eq!(grid.get(0, 1).unwrap().scale_y, loud);
        assert_eq!(grid.get(0, 2).unwrap().scale_y, 0.0);
    }

    #[test]
    fn test_partial_history_leaves_other_cubes_untouched() {
        let layout = small_layout();
        let mut grid = Grid::new(&layout);
        let mut history = History::new(layout.rows);
        history.push(FrequencyFrame::from(vec![255, 255]));

        let written = map_to_grid(
            &history,
            &mut grid,
            &BloomParameters::default(),
            &MappingConstants::default(),
        );
        assert_eq!(written, 2);

        // Bins beyond the frame and rows beyond the history keep defaults
        assert_eq!(grid.get(2, 2).unwrap().scale_y, 1.0);
        assert_eq!(grid.get(0, 0).unwrap().scale_y, 1.0);
        assert_eq!(grid.get(0, 0).unwrap().material, Material::default());
    }

    #[test]
    fn test_extra_bins_are_ignored() {
        let layout = small_layout();
        let mut grid = Grid::new(&layout);
        let mut history = History::new(layout.rows);
        history.push(FrequencyFrame::from(vec![100; 64]));

        let written = map_to_grid(
            &history,
            &mut grid,
            &BloomParameters::default(),
            &MappingConstants::default(),
        );
        assert_eq!(written, layout.columns);
    }

    #[test]
    fn test_positions_survive_mapping() {
        let layout = GridLayout::default();
        let mut grid = Grid::new(&layout);
        let before: Vec<_> = grid.cubes().iter().map(|c| c.position()).collect();

        let mut history = History::new(layout.rows);
        for v in 0..50u8 {
            history.push(FrequencyFrame::from(vec![v.wrapping_mul(5); layout.columns]));
            map_to_grid(
                &history,
                &mut grid,
                &BloomParameters::default(),
                &MappingConstants::default(),
            );
        }

        let after: Vec<_> = grid.cubes().iter().map(|c| c.position()).collect();
        assert_eq!(before, after);
    }
}
