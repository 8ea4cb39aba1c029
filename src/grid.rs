//! Fixed-size grid of cubes: positions, materials and per-frame visual state.

use glam::Vec3;

use crate::params::GridLayout;

/// Linear-space RGB color
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from hue (turns), saturation and lightness given in sRGB
    /// space, converted to linear so the output step can re-encode it.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let [r, g, b] = hsl_to_srgb(hue, saturation, lightness);
        Self::new(
            srgb_to_linear(r),
            srgb_to_linear(g),
            srgb_to_linear(b),
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// HSL (hue in turns, wrapped) to non-linear sRGB components
pub fn hsl_to_srgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let q = 2.0 * l - p;

    [
        hue_to_channel(q, p, h + 1.0 / 3.0),
        hue_to_channel(q, p, h),
        hue_to_channel(q, p, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

/// Surface appearance of a cube
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    /// Unlit flat color
    Basic { color: Color },
    /// Flat black stand-in used while isolating glowing cubes
    Dark,
}

impl Default for Material {
    fn default() -> Self {
        Material::Basic {
            color: Color::WHITE,
        }
    }
}

impl Material {
    /// Color the cube pass draws with
    pub fn color(&self) -> Color {
        match self {
            Material::Basic { color } => *color,
            Material::Dark => Color::BLACK,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Material::Dark)
    }
}

/// Capability tag deciding how the compositor treats a scene entity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// Takes part in the bloom isolate pass (darkened unless glowing)
    GlowCapable,
    /// Rendered as-is in both passes
    Plain,
}

/// One cell of the grid
#[derive(Clone, Debug)]
pub struct Cube {
    position: Vec3,
    category: Category,
    pub scale_y: f32,
    pub material: Material,
    pub visible: bool,
    pub glow: bool,
}

impl Cube {
    pub fn new(position: Vec3, category: Category) -> Self {
        Self {
            position,
            category,
            scale_y: 1.0,
            material: Material::default(),
            visible: true,
            glow: false,
        }
    }

    /// World position, fixed at creation
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

/// W x H cubes indexed by `row * columns + col`
#[derive(Clone, Debug)]
pub struct Grid {
    columns: usize,
    rows: usize,
    cubes: Vec<Cube>,
}

impl Grid {
    /// Create the grid on the XZ plane, centered on the origin
    pub fn new(layout: &GridLayout) -> Self {
        let GridLayout {
            columns,
            rows,
            spacing,
        } = *layout;

        let half_width = columns as f32 * spacing / 2.0;
        let half_depth = rows as f32 * spacing / 2.0;

        let mut cubes = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for col in 0..columns {
                let position = Vec3::new(
                    col as f32 * spacing - half_width,
                    0.0,
                    row as f32 * spacing - half_depth,
                );
                cubes.push(Cube::new(position, Category::GlowCapable));
            }
        }

        Self {
            columns,
            rows,
            cubes,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Flat index of (col, row), or None when out of range
    pub fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.columns && row < self.rows).then(|| row * self.columns + col)
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&Cube> {
        self.index(col, row).map(|i| &self.cubes[i])
    }

    pub fn get_mut(&mut self, col: usize, row: usize) -> Option<&mut Cube> {
        self.index(col, row).map(move |i| &mut self.cubes[i])
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    /// Mutable access to the cubes; the slice itself cannot grow or shrink
    pub fn cubes_mut(&mut self) -> &mut [Cube] {
        &mut self.cubes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_grid_creation() {
        let layout = GridLayout::default();
        let grid = Grid::new(&layout);

        assert_eq!(grid.len(), layout.columns * layout.rows);
        assert!(grid
            .cubes()
            .iter()
            .all(|c| c.category() == Category::GlowCapable));
    }

    #[test]
    fn test_positions_follow_spacing() {
        let layout = GridLayout {
            columns: 4,
            rows: 2,
            spacing: 3.0,
        };
        let grid = Grid::new(&layout);

        // x = col * 3 - 6, z = row * 3 - 3
        assert_eq!(grid.get(0, 0).unwrap().position(), Vec3::new(-6.0, 0.0, -3.0));
        assert_eq!(grid.get(3, 1).unwrap().position(), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_index_is_row_major_and_bounded() {
        let mut grid = Grid::new(&GridLayout::default());

        assert_eq!(grid.index(5, 2), Some(2 * 32 + 5));
        assert_eq!(grid.index(32, 0), None);
        assert_eq!(grid.index(0, 40), None);
        assert!(grid.get_mut(31, 39).is_some());
    }

    #[test]
    fn test_hsl_primaries() {
        let red = hsl_to_srgb(0.0, 1.0, 0.5);
        assert!(approx(red[0], 1.0) && approx(red[1], 0.0) && approx(red[2], 0.0));

        let green = hsl_to_srgb(1.0 / 3.0, 1.0, 0.5);
        assert!(approx(green[0], 0.0) && approx(green[1], 1.0) && approx(green[2], 0.0));

        let blue = hsl_to_srgb(2.0 / 3.0, 1.0, 0.5);
        assert!(approx(blue[0], 0.0) && approx(blue[1], 0.0) && approx(blue[2], 1.0));

        // Hue wraps
        let wrapped = hsl_to_srgb(1.0, 1.0, 0.5);
        assert!(approx(wrapped[0], 1.0) && approx(wrapped[2], 0.0));
    }

    #[test]
    fn test_hsl_gray_when_unsaturated() {
        assert_eq!(hsl_to_srgb(0.7, 0.0, 0.25), [0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_linear_conversion_keeps_extremes() {
        let white = Color::from_hsl(0.0, 0.0, 1.0);
        assert!(approx(white.r, 1.0));

        let black = Color::from_hsl(0.0, 0.0, 0.0);
        assert_eq!(black, Color::BLACK);

        // Mid gray darkens in linear space
        let gray = Color::from_hsl(0.0, 0.0, 0.5);
        assert!(gray.r < 0.25 && gray.r > 0.2);
    }

    #[test]
    fn test_dark_material_is_black() {
        assert_eq!(Material::Dark.color(), Color::BLACK);
        assert!(Material::Dark.is_dark());
        assert!(!Material::default().is_dark());
    }
}
