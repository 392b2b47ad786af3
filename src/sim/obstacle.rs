//! Static obstacle volumes derived from wall cells
//!
//! Each wall cell becomes a vertical cylinder:
//! - center: floor position of the cell (y = 0)
//! - radius: half the cell size
//! - height: wall height, spanning y in [0, height]

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use crate::flatten;

/// A collidable cylinder standing on the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Floor center (y is the base of the cylinder)
    pub center: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(center: Vec3, radius: f32, height: f32) -> Self {
        Self {
            center,
            radius,
            height,
        }
    }

    #[inline]
    pub fn base(&self) -> f32 {
        self.center.y
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y + self.height
    }

    /// Horizontal distance from a point to the cylinder axis
    #[inline]
    pub fn axis_distance(&self, p: Vec3) -> f32 {
        flatten(p - self.center).length()
    }

    /// Check if a point lies inside the cylinder (surface inclusive)
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.axis_distance(p) <= self.radius && p.y >= self.base() && p.y <= self.top()
    }

    /// Per-instance data for the host renderer
    pub fn instance(&self) -> ObstacleInstance {
        ObstacleInstance {
            position: [
                self.center.x,
                self.center.y + self.height / 2.0,
                self.center.z,
            ],
            half_extent: self.radius,
            height: self.height,
        }
    }
}

/// Build one obstacle per wall cell, in row-major order
pub fn obstacles_from_grid(grid: &Grid, cell_size: f32, wall_height: f32) -> Vec<Obstacle> {
    grid.walls()
        .map(|(x, y)| {
            Obstacle::new(
                Grid::cell_to_world(x, y, cell_size),
                cell_size / 2.0,
                wall_height,
            )
        })
        .collect()
}

/// GPU-friendly wall instance: mesh center, half width, full height
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObstacleInstance {
    pub position: [f32; 3],
    pub half_extent: f32,
    pub height: f32,
}

impl ObstacleInstance {
    /// Number of floats per instance when flattened
    pub const FLOATS: usize = 5;
}

/// Flatten obstacles into a contiguous float buffer for instanced drawing
pub fn instance_buffer(obstacles: &[Obstacle]) -> Vec<f32> {
    let instances: Vec<ObstacleInstance> = obstacles.iter().map(Obstacle::instance).collect();
    bytemuck::cast_slice::<ObstacleInstance, f32>(&instances).to_vec()
}
