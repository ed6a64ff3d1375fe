//! Fixed field-of-view camera.

use crate::adversary::AdversaryPool;
use crate::constants::DEG_PER_RAY;
use crate::environment::{Environment, Pose};
use crate::object::SurveillanceObject;
use crate::sensors::{ray_hits_pool, sorted_hits};
use crate::visual::SceneVisualizer;
use fnv::FnvHashSet;

#[derive(Debug)]
pub struct CameraSensor {
    name: String,
    /// Full cone angle, radians.
    fov: f64,
    range: f64,
    num_rays: usize,
    pose: Option<Pose>,
}

impl CameraSensor {
    /// `field_of_view` is configured in degrees; ray density scales with
    /// it at one ray per three degrees, rounded up.
    pub fn new(name: impl Into<String>, field_of_view: f64, range: f64) -> CameraSensor {
        let num_rays = ((field_of_view / DEG_PER_RAY).ceil() as usize).max(1);
        CameraSensor {
            name: name.into(),
            fov: field_of_view.to_radians(),
            range,
            num_rays,
            pose: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    /// Ray headings spread evenly across the cone, both edges included.
    fn ray_angles(&self, theta: f64) -> Vec<f64> {
        let start = theta - self.fov / 2.0;
        if self.num_rays == 1 {
            return vec![start];
        }
        let step = self.fov / (self.num_rays - 1) as f64;
        (0..self.num_rays).map(|i| start + step * i as f64).collect()
    }

    /// Pool indices of every adversary a cone ray samples.
    pub fn adversary_detected(&self, env: &Environment, pool: &AdversaryPool) -> Vec<usize> {
        let pose = self.pose.as_ref().expect("sensor queried before placement");
        let mut hits = FnvHashSet::default();
        for angle in self.ray_angles(pose.theta) {
            if hits.len() == pool.len() {
                break;
            }
            ray_hits_pool(env, pool, (pose.x, pose.y), angle, self.range, &mut hits);
        }
        sorted_hits(hits)
    }
}

impl SurveillanceObject for CameraSensor {
    fn place(&mut self, x: f64, y: f64, theta: f64) {
        self.pose = Some(Pose::new(x, y, theta));
    }

    fn pose(&self) -> Option<Pose> {
        self.pose
    }

    fn update(&mut self, _env: &Environment) {
        // Cameras are static.
    }

    fn display(&self, env: &Environment, visual: &mut dyn SceneVisualizer) {
        let pose = self.pose.as_ref().expect("sensor displayed before placement");
        for angle in [pose.theta - self.fov / 2.0, pose.theta + self.fov / 2.0] {
            let (end_x, end_y) = env.cast_ray(pose.x, pose.y, angle, self.range);
            visual.segment(pose.x, pose.y, end_x, end_y);
        }
        if self.range.is_finite() {
            visual.arc(
                pose.x,
                pose.y,
                self.range,
                pose.theta - self.fov / 2.0,
                pose.theta + self.fov / 2.0,
            );
        }
        visual.point(pose.x, pose.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adversary::Adversary;
    use crate::environment::testing::environment_from;

    fn open_field() -> Environment {
        environment_from(
            &[
                "..........",
                "..........",
                "..........",
                "..........",
            ],
            1.0,
        )
    }

    fn pool_at(x: f64, y: f64, radius: f64) -> AdversaryPool {
        let mut adversary = Adversary::new(radius, 1.0);
        adversary.place(x, y, 0.0);
        AdversaryPool::new(vec![adversary])
    }

    #[test]
    fn out_of_range_target_in_cone_is_missed() {
        let env = open_field();
        let pool = pool_at(60.0, 0.0, 10.0);
        let mut camera = CameraSensor::new("lobby", 90.0, 50.0);
        camera.place(0.0, 0.0, 0.0);
        assert!(camera.adversary_detected(&env, &pool).is_empty());
    }

    #[test]
    fn target_within_range_is_detected() {
        let env = open_field();
        let pool = pool_at(60.0, 0.0, 10.0);
        let mut camera = CameraSensor::new("lobby", 90.0, 100.0);
        camera.place(0.0, 0.0, 0.0);
        assert_eq!(camera.adversary_detected(&env, &pool), vec![0]);
    }

    #[test]
    fn target_outside_the_cone_is_missed() {
        let env = open_field();
        // Directly behind the camera.
        let pool = pool_at(200.0, 100.0, 10.0);
        let mut camera = CameraSensor::new("lobby", 90.0, 400.0);
        camera.place(400.0, 100.0, 0.0);
        assert!(camera.adversary_detected(&env, &pool).is_empty());
    }

    #[test]
    fn ray_count_scales_with_field_of_view() {
        let narrow = CameraSensor::new("a", 45.0, 100.0);
        let wide = CameraSensor::new("b", 90.0, 100.0);
        assert_eq!(narrow.num_rays, 15);
        assert_eq!(wide.num_rays, 30);
    }
}
