//! Geometry kernel.
//!
//! All public coordinates are centimetres; the kernel converts to map
//! pixels internally. Ray casting steps at 1 cm and is best-effort: a ray
//! that leaves the map simply ends, it never errors.

use crate::constants::*;
use crate::error::{Error, Result};
use crate::grid::OccupancyGrid;
use crate::reduce::RoomMap;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Position and heading in centimetres/radians.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Pose {
        Pose { x, y, theta }
    }
}

/// Counterclockwise angle of the line from `(x1, y1)` to `(x2, y2)`.
/// Always the two-argument `atan2`; dividing first would lose the quadrant.
#[inline]
pub fn compute_angle(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (y2 - y1).atan2(x2 - x1)
}

/// Wrap an angle into `[-PI, PI]`.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}

/// Angular-sector + range inclusion test. Occlusion is not checked here;
/// detectors handle it by ray casting.
pub fn in_view_cone(pose: &Pose, fov: f64, range: f64, px: f64, py: f64) -> bool {
    let distance = ((px - pose.x).powi(2) + (py - pose.y).powi(2)).sqrt();
    if distance > range {
        return false;
    }
    let offset = normalize_angle(compute_angle(pose.x, pose.y, px, py) - pose.theta);
    offset.abs() <= fov / 2.0
}

/// The area under surveillance: the fine occupancy bitmap, the semantic
/// map built over it, and the pixel/centimetre conversion.
pub struct Environment {
    grid: OccupancyGrid,
    pub room_map: RoomMap,
    pixel_to_cm: f64,
    cm_to_pixel: f64,
}

impl Environment {
    pub fn new(grid: OccupancyGrid, room_map: RoomMap, pixel_to_cm: f64) -> Result<Environment> {
        if pixel_to_cm <= 0.0 || !pixel_to_cm.is_finite() {
            return Err(Error::Config(format!(
                "pixel_to_cm must be positive, got {}",
                pixel_to_cm
            )));
        }
        Ok(Environment {
            grid,
            room_map,
            pixel_to_cm,
            cm_to_pixel: 1.0 / pixel_to_cm,
        })
    }

    #[inline]
    fn to_pixel(&self, v: f64) -> i64 {
        (v * self.cm_to_pixel).floor() as i64
    }

    /// Whether a centimetre point lies inside the map bounds.
    pub fn in_environment(&self, x: f64, y: f64) -> bool {
        self.grid.in_bounds(self.to_pixel(x), self.to_pixel(y))
    }

    /// Whether a centimetre point lies inside a solid object. Points
    /// outside the map are not "in" anything.
    pub fn in_object(&self, x: f64, y: f64) -> bool {
        let px = self.to_pixel(x);
        let py = self.to_pixel(y);
        self.grid.in_bounds(px, py) && self.grid.is_wall(px, py)
    }

    /// Step a ray at 1 cm increments from `(x, y)` along `theta`. Returns
    /// the last point before the ray leaves the map or enters an object,
    /// or the point at `max_range`, whichever comes first.
    pub fn cast_ray(&self, x: f64, y: f64, theta: f64, max_range: f64) -> (f64, f64) {
        let dir_x = theta.cos();
        let dir_y = theta.sin();
        let mut last = (x, y);
        let mut distance = 0.0;
        while distance < max_range {
            distance += RAY_STEP_CM;
            let next_x = x + distance * dir_x;
            let next_y = y + distance * dir_y;
            if !self.in_environment(next_x, next_y) || self.in_object(next_x, next_y) {
                break;
            }
            last = (next_x, next_y);
        }
        last
    }

    #[inline]
    pub fn pixel_to_cm(&self) -> f64 {
        self.pixel_to_cm
    }

    /// World-space edge length of one box cell.
    #[inline]
    pub fn box_size_cm(&self) -> f64 {
        BOX_SIZE as f64 * self.pixel_to_cm
    }

    /// Box coordinates to centimetres (cell origin).
    pub fn cell_to_cm(&self, pos: (f64, f64)) -> (f64, f64) {
        (
            pos.0 * self.box_size_cm(),
            pos.1 * self.box_size_cm(),
        )
    }

    /// Box coordinates to centimetres (cell centre).
    pub fn cell_center_cm(&self, pos: (f64, f64)) -> (f64, f64) {
        (
            (pos.0 + 0.5) * self.box_size_cm(),
            (pos.1 + 0.5) * self.box_size_cm(),
        )
    }
}

/// Test fixture: build an environment from an ASCII box map (`#` solid).
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::grid::BoxGrid;

    pub(crate) fn environment_from(rows: &[&str], pixel_to_cm: f64) -> Environment {
        let matrix: Vec<Vec<u8>> = rows
            .iter()
            .map(|r| r.bytes().map(|b| if b == b'#' { 0 } else { 1 }).collect())
            .collect();
        let boxes = BoxGrid::from_matrix(&matrix).unwrap();
        let grid = boxes.rasterize(BOX_SIZE);
        let room_map = RoomMap::build(boxes);
        Environment::new(grid, room_map, pixel_to_cm).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::environment_from;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn compute_angle_keeps_the_quadrant() {
        assert_relative_eq!(compute_angle(0.0, 0.0, 1.0, 1.0), PI / 4.0);
        assert_relative_eq!(compute_angle(0.0, 0.0, -1.0, 1.0), 3.0 * PI / 4.0);
        assert_relative_eq!(compute_angle(0.0, 0.0, -1.0, -1.0), -3.0 * PI / 4.0);
        assert_relative_eq!(compute_angle(0.0, 0.0, 0.0, -1.0), -PI / 2.0);
    }

    #[test]
    fn view_cone_wraps_across_pi() {
        let pose = Pose::new(0.0, 0.0, PI);
        // Just below the negative x axis: angle is close to -PI, which is
        // a small signed offset from a heading of +PI.
        assert!(in_view_cone(&pose, PI / 2.0, 100.0, -50.0, -5.0));
        assert!(in_view_cone(&pose, PI / 2.0, 100.0, -50.0, 5.0));
        assert!(!in_view_cone(&pose, PI / 2.0, 100.0, 50.0, 0.0));
    }

    #[test]
    fn view_cone_respects_range() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        assert!(!in_view_cone(&pose, PI / 2.0, 50.0, 60.0, 0.0));
        assert!(in_view_cone(&pose, PI / 2.0, 50.0, 40.0, 0.0));
    }

    #[test]
    fn ray_stops_before_walls() {
        let env = environment_from(&["#####", "#...#", "#####"], 1.0);
        // Start mid-corridor; the corridor spans x in [50, 200) pixels.
        let (ex, ey) = env.cast_ray(125.0, 75.0, 0.0, f64::INFINITY);
        assert!(ex < 200.0);
        assert!(ex > 190.0);
        assert_relative_eq!(ey, 75.0);
        assert!(!env.in_object(ex, ey));
    }

    #[test]
    fn ray_honours_max_range() {
        let env = environment_from(&["#####", "#...#", "#####"], 1.0);
        let (ex, _) = env.cast_ray(60.0, 75.0, 0.0, 20.0);
        assert!(ex <= 80.0);
        assert!(ex >= 79.0);
    }

    #[test]
    fn ray_back_walk_never_hits_an_object() {
        let env = environment_from(&["#####", "#...#", "#####"], 1.0);
        let origin = (60.0, 75.0);
        let theta = 0.3;
        let (ex, ey) = env.cast_ray(origin.0, origin.1, theta, f64::INFINITY);
        let length = ((ex - origin.0).powi(2) + (ey - origin.1).powi(2)).sqrt();
        let mut d = 0.0;
        while d < length {
            let x = origin.0 + d * theta.cos();
            let y = origin.1 + d * theta.sin();
            assert!(!env.in_object(x, y));
            d += 1.0;
        }
    }

    #[test]
    fn unit_conversion_scales_with_pixel_to_cm() {
        let env = environment_from(&["###", "#.#", "###"], 2.0);
        assert_relative_eq!(env.box_size_cm(), 100.0);
        assert_eq!(env.cell_to_cm((1.0, 1.0)), (100.0, 100.0));
        assert_eq!(env.cell_center_cm((1.0, 1.0)), (150.0, 150.0));
        // Centimetre point (150, 150) is pixel (75, 75): the free cell.
        assert!(env.in_environment(150.0, 150.0));
        assert!(!env.in_object(150.0, 150.0));
        assert!(env.in_object(20.0, 20.0));
    }
}
