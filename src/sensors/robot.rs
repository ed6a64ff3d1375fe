//! Mobile robot carrying a forward-facing LIDAR.

use crate::adversary::AdversaryPool;
use crate::environment::{Environment, Pose};
use crate::object::SurveillanceObject;
use crate::sensors::{ray_hits_pool, sorted_hits};
use crate::visual::SceneVisualizer;
use fnv::FnvHashSet;
use std::f64::consts::PI;

#[derive(Debug)]
pub struct Robot {
    name: String,
    pub radius: f64,
    pub speed: f64,
    /// Full LIDAR cone angle, radians.
    fov: f64,
    range: f64,
    /// Angular spacing between LIDAR rays, radians.
    angle_resolution: f64,
    pose: Option<Pose>,
}

impl Robot {
    /// `fov` is configured in radians, `angle_resolution` in degrees.
    pub fn new(
        name: impl Into<String>,
        radius: f64,
        speed: f64,
        fov: f64,
        range: f64,
        angle_resolution: f64,
    ) -> Robot {
        Robot {
            name: name.into(),
            radius,
            speed,
            fov,
            range,
            angle_resolution: angle_resolution.to_radians(),
            pose: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// LIDAR sweep headings from the low cone edge, end exclusive.
    fn sweep_angles(&self, theta: f64) -> Vec<f64> {
        let mut angles = Vec::new();
        let mut angle = theta - self.fov / 2.0;
        let end = theta + self.fov / 2.0;
        while angle < end {
            angles.push(angle);
            angle += self.angle_resolution;
        }
        angles
    }

    /// Pool indices of every adversary the LIDAR sweep samples.
    pub fn adversary_detected(&self, env: &Environment, pool: &AdversaryPool) -> Vec<usize> {
        let pose = self.pose.as_ref().expect("sensor queried before placement");
        let mut hits = FnvHashSet::default();
        for angle in self.sweep_angles(pose.theta) {
            if hits.len() == pool.len() {
                break;
            }
            ray_hits_pool(env, pool, (pose.x, pose.y), angle, self.range, &mut hits);
        }
        sorted_hits(hits)
    }
}

impl SurveillanceObject for Robot {
    fn place(&mut self, x: f64, y: f64, theta: f64) {
        self.pose = Some(Pose::new(x, y, theta));
    }

    fn pose(&self) -> Option<Pose> {
        self.pose
    }

    /// Drive forward; on a blocked step turn 90 degrees and hold position.
    fn update(&mut self, env: &Environment) {
        let pose = self.pose.as_mut().expect("sensor updated before placement");
        let next_x = pose.x + self.speed * pose.theta.cos();
        let next_y = pose.y + self.speed * pose.theta.sin();
        let edge_x = next_x + self.radius * pose.theta.cos();
        let edge_y = next_y + self.radius * pose.theta.sin();
        if env.in_environment(edge_x, edge_y) && !env.in_object(edge_x, edge_y) {
            pose.x = next_x;
            pose.y = next_y;
        } else {
            pose.theta += PI / 2.0;
        }
    }

    fn display(&self, env: &Environment, visual: &mut dyn SceneVisualizer) {
        let pose = self.pose.as_ref().expect("sensor displayed before placement");
        visual.circle(pose.x, pose.y, self.radius);
        for angle in self.sweep_angles(pose.theta) {
            let (end_x, end_y) = env.cast_ray(pose.x, pose.y, angle, self.range);
            visual.segment(pose.x, pose.y, end_x, end_y);
        }
    }
}
