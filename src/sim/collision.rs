//! Ray-based collision detection against wall cylinders
//!
//! Movement is validated by casting short probe rays and checking whether the
//! nearest wall along any of them lies inside the agent's radius. A blocked
//! probe rejects the whole displacement for the tick; there is no sliding
//! along walls.

use glam::Vec3;

use super::obstacle::Obstacle;
use crate::{flatten, right_of};

const PARALLEL_EPS: f32 = 1e-8;

/// Nearest obstacle hit along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin (0 when the origin is inside the volume)
    pub distance: f32,
    /// Index into the obstacle slice
    pub index: usize,
}

/// Distance along a unit ray to where it enters the cylinder, if it does
///
/// Intersects the slab the ray spends inside the infinite vertical cylinder
/// with the slab it spends between the cylinder's base and top.
pub fn ray_cylinder_distance(origin: Vec3, dir: Vec3, obstacle: &Obstacle) -> Option<f32> {
    let o = origin - obstacle.center;
    let r2 = obstacle.radius * obstacle.radius;

    // Horizontal interval: |o.xz + t * dir.xz| <= radius
    let a = dir.x * dir.x + dir.z * dir.z;
    let c = o.x * o.x + o.z * o.z - r2;
    let (h_enter, h_exit) = if a < PARALLEL_EPS {
        // Vertical ray: inside the footprint for all t or never
        if c > 0.0 {
            return None;
        }
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        let b = o.x * dir.x + o.z * dir.z;
        let disc = b * b - a * c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        ((-b - sq) / a, (-b + sq) / a)
    };

    // Vertical interval: 0 <= o.y + t * dir.y <= height
    let (v_enter, v_exit) = if dir.y.abs() < PARALLEL_EPS {
        if o.y < 0.0 || o.y > obstacle.height {
            return None;
        }
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        let t0 = -o.y / dir.y;
        let t1 = (obstacle.height - o.y) / dir.y;
        (t0.min(t1), t0.max(t1))
    };

    let enter = h_enter.max(v_enter);
    let exit = h_exit.min(v_exit);
    if enter > exit || exit < 0.0 {
        return None;
    }
    Some(enter.max(0.0))
}

/// Cast a ray and return the nearest obstacle within `max_distance`
///
/// Broad phase skips obstacles whose footprint is farther than `max_distance`
/// from the origin. Returns `None` for zero-length directions.
pub fn raycast(
    position: Vec3,
    direction: Vec3,
    max_distance: f32,
    obstacles: &[Obstacle],
) -> Option<RayHit> {
    if obstacles.is_empty() || !(max_distance >= 0.0) {
        return None;
    }
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        log::trace!("raycast with zero-length direction ignored");
        return None;
    }

    let mut nearest: Option<RayHit> = None;
    for (index, obstacle) in obstacles.iter().enumerate() {
        if obstacle.axis_distance(position) - obstacle.radius > max_distance {
            continue;
        }
        let Some(distance) = ray_cylinder_distance(position, dir, obstacle) else {
            continue;
        };
        if distance > max_distance {
            continue;
        }
        if nearest.is_none_or(|hit| distance < hit.distance) {
            nearest = Some(RayHit { distance, index });
        }
    }
    nearest
}

/// Whether an agent of `radius` would overlap a wall along `direction`
///
/// The nearest hit within `max_distance` collides only if it is strictly
/// closer than `radius`; a wall exactly `radius` away is clear.
pub fn would_collide(
    position: Vec3,
    direction: Vec3,
    max_distance: f32,
    radius: f32,
    obstacles: &[Obstacle],
) -> bool {
    raycast(position, direction, max_distance, obstacles).is_some_and(|hit| hit.distance < radius)
}

/// Forward, backward, right and left of a horizontal frame
pub fn probe_directions(forward: Vec3) -> [Vec3; 4] {
    let forward = flatten(forward).normalize_or_zero();
    let right = right_of(forward);
    [forward, -forward, right, -right]
}

/// Check a horizontal displacement against the walls
///
/// Two tests, either of which blocks the move:
/// - a sweep from the current position along the travel direction, reaching
///   the step length plus the agent radius
/// - the four local-frame probes from the candidate position, reaching the
///   agent radius
///
/// `frame_forward` is the agent's facing; when it is zero the travel
/// direction is used as the frame.
pub fn is_move_blocked(
    position: Vec3,
    displacement: Vec3,
    frame_forward: Vec3,
    radius: f32,
    obstacles: &[Obstacle],
) -> bool {
    if obstacles.is_empty() {
        return false;
    }
    let step = displacement.length();
    if step <= 0.0 {
        return false;
    }
    let travel = displacement / step;

    let reach = step + radius;
    if would_collide(position, travel, reach, reach, obstacles) {
        return true;
    }

    let frame = if flatten(frame_forward).length_squared() > 0.0 {
        frame_forward
    } else {
        travel
    };
    let candidate = position + displacement;
    probe_directions(frame)
        .iter()
        .filter(|dir| **dir != Vec3::ZERO)
        .any(|&dir| would_collide(candidate, dir, radius, radius, obstacles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wall_at(x: f32, z: f32) -> Obstacle {
        Obstacle::new(Vec3::new(x, 0.0, z), 1.0, 3.0)
    }

    #[test]
    fn test_ray_hits_cylinder_front() {
        let o = wall_at(5.0, 0.0);
        let d = ray_cylinder_distance(Vec3::new(0.0, 1.0, 0.0), Vec3::X, &o).unwrap();
        assert!((d - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_misses_cylinder_behind() {
        let o = wall_at(-5.0, 0.0);
        assert!(ray_cylinder_distance(Vec3::new(0.0, 1.0, 0.0), Vec3::X, &o).is_none());
    }

    #[test]
    fn test_ray_over_wall_misses() {
        let o = wall_at(5.0, 0.0);
        assert!(ray_cylinder_distance(Vec3::new(0.0, 3.5, 0.0), Vec3::X, &o).is_none());
    }

    #[test]
    fn test_origin_inside_is_zero_distance() {
        let o = wall_at(0.0, 0.0);
        let d = ray_cylinder_distance(Vec3::new(0.5, 1.0, 0.0), Vec3::Z, &o).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_descending_ray_hits_top_cap() {
        let o = wall_at(0.0, 0.0);
        let d = ray_cylinder_distance(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, &o).unwrap();
        assert!((d - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_raycast_picks_nearest() {
        let obstacles = [wall_at(10.0, 0.0), wall_at(4.0, 0.0), wall_at(0.0, 8.0)];
        let hit = raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 20.0, &obstacles).unwrap();
        assert_eq!(hit.index, 1);
        assert!((hit.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_raycast_respects_max_distance() {
        let obstacles = [wall_at(10.0, 0.0)];
        assert!(raycast(Vec3::ZERO, Vec3::X, 5.0, &obstacles).is_none());
        assert!(raycast(Vec3::ZERO, Vec3::X, 9.5, &obstacles).is_some());
    }

    #[test]
    fn test_would_collide_strict_boundary() {
        // Surface at x = 2.0
        let obstacles = [wall_at(3.0, 0.0)];
        let origin = Vec3::new(0.0, 1.0, 0.0);
        assert!(would_collide(origin, Vec3::X, 5.0, 2.5, &obstacles));
        assert!(!would_collide(origin, Vec3::X, 5.0, 1.5, &obstacles));
        // Exactly at radius is open
        assert!(!would_collide(origin, Vec3::X, 5.0, 2.0, &obstacles));
    }

    #[test]
    fn test_zero_direction_never_collides() {
        let obstacles = [wall_at(0.5, 0.0)];
        assert!(!would_collide(Vec3::ZERO, Vec3::ZERO, 5.0, 1.0, &obstacles));
    }

    #[test]
    fn test_probe_directions_are_cardinal() {
        let [f, b, r, l] = probe_directions(Vec3::new(0.0, 0.3, -2.0));
        assert!((f - Vec3::NEG_Z).length() < 1e-6);
        assert!((b - Vec3::Z).length() < 1e-6);
        assert!((r - Vec3::X).length() < 1e-6);
        assert!((l - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn test_lateral_graze_is_blocked() {
        // Moving along -Z past a wall on the right; the travel sweep misses,
        // the right-hand probe from the candidate catches it.
        let obstacles = [wall_at(1.3, -1.0)];
        let pos = Vec3::new(0.0, 0.0, 0.0);
        let step = Vec3::new(0.0, 0.0, -1.0);
        assert!(!would_collide(pos, step, 1.4, 1.4, &obstacles));
        assert!(is_move_blocked(pos, step, Vec3::NEG_Z, 0.4, &obstacles));
    }

    #[test]
    fn test_open_move_not_blocked() {
        let obstacles = [wall_at(10.0, 10.0)];
        assert!(!is_move_blocked(
            Vec3::ZERO,
            Vec3::new(0.1, 0.0, 0.0),
            Vec3::X,
            0.4,
            &obstacles
        ));
    }

    #[test]
    fn test_move_into_wall_blocked() {
        // Wall surface at x = 1.0, agent at 0.5 with radius 0.4 stepping 0.2 toward it
        let obstacles = [wall_at(2.0, 0.0)];
        assert!(is_move_blocked(
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(0.2, 0.0, 0.0),
            Vec3::X,
            0.4,
            &obstacles
        ));
    }

    proptest! {
        #[test]
        fn no_obstacles_never_collide(
            px in -100.0f32..100.0, py in -10.0f32..10.0, pz in -100.0f32..100.0,
            dx in -1.0f32..1.0, dy in -1.0f32..1.0, dz in -1.0f32..1.0,
            max_distance in 0.0f32..50.0,
            radius in 0.0f32..10.0,
        ) {
            let hit = would_collide(
                Vec3::new(px, py, pz),
                Vec3::new(dx, dy, dz),
                max_distance,
                radius,
                &[],
            );
            prop_assert!(!hit);
        }
    }
}
