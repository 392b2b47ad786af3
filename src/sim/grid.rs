//! Maze occupancy grid
//!
//! A level is a `height x width` matrix of wall/open cells. The border is
//! solid except for two exits at the middle column of the top and bottom rows.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Occupancy of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Open,
    Wall,
}

impl Cell {
    #[inline]
    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }
}

/// Immutable level layout, stored row-major (`cells[y * width + x]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridCells")]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

/// Unchecked serialized form of a [`Grid`]
#[derive(Deserialize)]
struct GridCells {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl TryFrom<GridCells> for Grid {
    type Error = GenerationError;

    fn try_from(raw: GridCells) -> Result<Self, Self::Error> {
        let GridCells {
            width,
            height,
            cells,
        } = raw;
        if width < 3 || height < 3 {
            return Err(GenerationError::InvalidDimensions { width, height });
        }
        let expected = width.checked_mul(height).ok_or_else(|| {
            GenerationError::parameter("cells", format!("{width}x{height} grid is too large"))
        })?;
        if cells.len() != expected {
            return Err(GenerationError::parameter(
                "cells",
                format!("expected {expected} cells, got {}", cells.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }
}

impl Grid {
    /// Generate a grid from an explicit random source.
    ///
    /// Border cells are walls, interior cells become walls with probability
    /// `wall_density`, and both exits are forced open last.
    pub fn generate<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        wall_density: f32,
        rng: &mut R,
    ) -> Result<Self, GenerationError> {
        if width < 3 || height < 3 {
            return Err(GenerationError::InvalidDimensions { width, height });
        }
        // NaN fails the range check too
        if !(0.0..=1.0).contains(&wall_density) {
            return Err(GenerationError::parameter(
                "wall_density",
                format!("{wall_density} is outside [0, 1]"),
            ));
        }

        let mut cells = vec![Cell::Open; width * height];
        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || x == width - 1 || y == 0 || y == height - 1;
                let cell = if border {
                    Cell::Wall
                } else if rng.random_bool(wall_density as f64) {
                    Cell::Wall
                } else {
                    Cell::Open
                };
                cells[y * width + x] = cell;
            }
        }

        let mut grid = Self {
            width,
            height,
            cells,
        };
        for (x, y) in grid.exits() {
            grid.cells[y * width + x] = Cell::Open;
        }

        log::info!(
            "Generated {}x{} maze ({} walls, density {:.2})",
            width,
            height,
            grid.wall_count(),
            wall_density
        );
        Ok(grid)
    }

    /// Generate a grid from a seed (same seed and parameters give the same grid)
    pub fn generate_seeded(
        width: usize,
        height: usize,
        wall_density: f32,
        seed: u64,
    ) -> Result<Self, GenerationError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self::generate(width, height, wall_density, &mut rng)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at `(x, y)`; out-of-range coordinates read as wall
    pub fn get(&self, x: usize, y: usize) -> Cell {
        if x >= self.width || y >= self.height {
            return Cell::Wall;
        }
        self.cells[y * self.width + x]
    }

    #[inline]
    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_wall()
    }

    /// The two exit cells `(x, y)`: top row then bottom row
    pub fn exits(&self) -> [(usize, usize); 2] {
        let mid = self.width / 2;
        [(mid, 0), (mid, self.height - 1)]
    }

    /// Row-major iterator over `(x, y, cell)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &c)| (i % self.width, i / self.width, c))
    }

    /// Coordinates of every wall cell
    pub fn walls(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.iter()
            .filter(|(_, _, c)| c.is_wall())
            .map(|(x, y, _)| (x, y))
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_wall()).count()
    }

    /// Interior coordinates (excludes the border ring)
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (w, h) = (self.width, self.height);
        (1..h - 1).flat_map(move |y| (1..w - 1).map(move |x| (x, y)))
    }

    /// World-space floor position of a cell centre
    #[inline]
    pub fn cell_to_world(x: usize, y: usize, cell_size: f32) -> Vec3 {
        Vec3::new(x as f32 * cell_size, 0.0, y as f32 * cell_size)
    }

    /// Cell containing a world-space position, if it lies on the grid
    pub fn world_to_cell(&self, pos: Vec3, cell_size: f32) -> Option<(usize, usize)> {
        // Cell centres sit on integer multiples of cell_size
        let x = (pos.x / cell_size).round();
        let y = (pos.z / cell_size).round();
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// ASCII rendering for logs (`#` wall, `.` open)
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(if self.is_wall(x, y) { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_border_invariant(grid: &Grid) {
        let (w, h) = (grid.width(), grid.height());
        let exits = grid.exits();
        for y in 0..h {
            for x in 0..w {
                let border = x == 0 || x == w - 1 || y == 0 || y == h - 1;
                if !border {
                    continue;
                }
                if exits.contains(&(x, y)) {
                    assert_eq!(grid.get(x, y), Cell::Open, "exit ({x},{y}) must be open");
                } else {
                    assert_eq!(grid.get(x, y), Cell::Wall, "border ({x},{y}) must be wall");
                }
            }
        }
    }

    #[test]
    fn test_generate_5x5_no_interior_walls() {
        let grid = Grid::generate_seeded(5, 5, 0.0, 1).unwrap();
        for (x, y) in grid.interior() {
            assert_eq!(grid.get(x, y), Cell::Open);
        }
        assert_eq!(grid.get(2, 0), Cell::Open);
        assert_eq!(grid.get(2, 4), Cell::Open);
        assert_border_invariant(&grid);
        // 16 border cells minus the two exits
        assert_eq!(grid.wall_count(), 14);
    }

    #[test]
    fn test_full_density_fills_interior() {
        let grid = Grid::generate_seeded(6, 4, 1.0, 7).unwrap();
        assert!(grid.interior().all(|(x, y)| grid.is_wall(x, y)));
        assert_border_invariant(&grid);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            Grid::generate_seeded(2, 10, 0.2, 0),
            Err(GenerationError::InvalidDimensions {
                width: 2,
                height: 10
            })
        );
        assert!(matches!(
            Grid::generate_seeded(10, 0, 0.2, 0),
            Err(GenerationError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_invalid_density() {
        for density in [-0.1, 1.5, f32::NAN] {
            assert!(matches!(
                Grid::generate_seeded(10, 10, density, 0),
                Err(GenerationError::InvalidParameter {
                    name: "wall_density",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_same_seed_same_grid() {
        let a = Grid::generate_seeded(20, 20, 0.2, 4242).unwrap();
        let b = Grid::generate_seeded(20, 20, 0.2, 4242).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wall_frequency_converges() {
        let density = 0.3;
        let mut walls = 0usize;
        let mut total = 0usize;
        for seed in 0..200 {
            let grid = Grid::generate_seeded(12, 12, density, seed).unwrap();
            for (x, y) in grid.interior() {
                total += 1;
                if grid.is_wall(x, y) {
                    walls += 1;
                }
            }
        }
        let observed = walls as f32 / total as f32;
        assert!(
            (observed - density).abs() < 0.02,
            "observed wall frequency {observed} too far from {density}"
        );
    }

    #[test]
    fn test_world_cell_mapping() {
        let grid = Grid::generate_seeded(5, 5, 0.0, 0).unwrap();
        let world = Grid::cell_to_world(3, 1, 2.0);
        assert_eq!(world, Vec3::new(6.0, 0.0, 2.0));
        assert_eq!(grid.world_to_cell(world, 2.0), Some((3, 1)));
        assert_eq!(grid.world_to_cell(Vec3::new(-5.0, 0.0, 0.0), 2.0), None);
        assert_eq!(grid.world_to_cell(Vec3::new(50.0, 0.0, 0.0), 2.0), None);
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let grid = Grid::generate_seeded(7, 5, 0.3, 9).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(serde_json::from_str::<Grid>(&json).unwrap(), grid);

        let short = r#"{ "width": 3, "height": 3, "cells": ["Wall", "Open"] }"#;
        let err = serde_json::from_str::<Grid>(short).unwrap_err();
        assert!(err.to_string().contains("expected 9 cells, got 2"), "{err}");

        let tiny = r#"{ "width": 2, "height": 2, "cells": ["Wall", "Wall", "Wall", "Wall"] }"#;
        assert!(serde_json::from_str::<Grid>(tiny).is_err());
    }

    #[test]
    fn test_ascii_shape() {
        let grid = Grid::generate_seeded(5, 3, 0.0, 0).unwrap();
        assert_eq!(grid.to_ascii(), "##.##\n#...#\n##.##\n");
    }

    proptest! {
        #[test]
        fn border_is_solid_except_exits(
            width in 3usize..40,
            height in 3usize..40,
            density in 0.0f32..=1.0,
            seed in any::<u64>(),
        ) {
            let grid = Grid::generate_seeded(width, height, density, seed).unwrap();
            prop_assert_eq!(grid.width(), width);
            prop_assert_eq!(grid.height(), height);
            assert_border_invariant(&grid);
        }
    }
}
