//! Breakbeam line sensor: a single static ray across a hallway.

use crate::adversary::AdversaryPool;
use crate::environment::{Environment, Pose};
use crate::object::SurveillanceObject;
use crate::sensors::{ray_hits_pool, sorted_hits};
use crate::visual::SceneVisualizer;
use fnv::FnvHashSet;

#[derive(Debug)]
pub struct LineSensor {
    name: String,
    range: f64,
    pose: Option<Pose>,
}

impl LineSensor {
    pub fn new(name: impl Into<String>, range: f64) -> LineSensor {
        LineSensor {
            name: name.into(),
            range,
            pose: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    /// Where the beam terminates: the first obstacle or `range`.
    fn endpoint(&self, env: &Environment) -> (f64, f64) {
        let pose = self.pose.as_ref().expect("sensor queried before placement");
        env.cast_ray(pose.x, pose.y, pose.theta, self.range)
    }

    /// Pool indices of every adversary intersecting the beam.
    pub fn adversary_detected(&self, env: &Environment, pool: &AdversaryPool) -> Vec<usize> {
        let pose = self.pose.as_ref().expect("sensor queried before placement");
        let mut hits = FnvHashSet::default();
        ray_hits_pool(env, pool, (pose.x, pose.y), pose.theta, self.range, &mut hits);
        sorted_hits(hits)
    }
}

impl SurveillanceObject for LineSensor {
    fn place(&mut self, x: f64, y: f64, theta: f64) {
        self.pose = Some(Pose::new(x, y, theta));
    }

    fn pose(&self) -> Option<Pose> {
        self.pose
    }

    fn update(&mut self, _env: &Environment) {
        // A breakbeam has no per-timestep state.
    }

    fn display(&self, env: &Environment, visual: &mut dyn SceneVisualizer) {
        let pose = self.pose.as_ref().expect("sensor displayed before placement");
        let (end_x, end_y) = self.endpoint(env);
        visual.segment(pose.x, pose.y, end_x, end_y);
        visual.point(pose.x, pose.y);
    }
}
