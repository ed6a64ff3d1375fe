//! Adversaries: the intruders the deployment is meant to catch.

use crate::environment::{Environment, Pose};
use crate::object::SurveillanceObject;
use crate::visual::SceneVisualizer;
use std::f64::consts::PI;

/// A circular intruder with fails-forward motion: walk straight, and on a
/// blocked step turn 90 degrees and stay put. Adversaries do not collide
/// with each other.
#[derive(Clone, Debug)]
pub struct Adversary {
    pub radius: f64,
    pub speed: f64,
    pose: Option<Pose>,
}

impl Adversary {
    pub fn new(radius: f64, speed: f64) -> Adversary {
        Adversary {
            radius,
            speed,
            pose: None,
        }
    }

    /// Whether a centimetre point lies inside the adversary's circle.
    pub fn in_adversary(&self, x: f64, y: f64) -> bool {
        let pose = self
            .pose
            .as_ref()
            .expect("adversary queried before placement");
        let distance = ((x - pose.x).powi(2) + (y - pose.y).powi(2)).sqrt();
        distance <= self.radius
    }
}

impl SurveillanceObject for Adversary {
    fn place(&mut self, x: f64, y: f64, theta: f64) {
        self.pose = Some(Pose::new(x, y, theta));
    }

    fn pose(&self) -> Option<Pose> {
        self.pose
    }

    fn update(&mut self, env: &Environment) {
        let pose = self
            .pose
            .as_mut()
            .expect("adversary updated before placement");
        let next_x = pose.x + self.speed * pose.theta.cos();
        let next_y = pose.y + self.speed * pose.theta.sin();
        // Bound-check the leading edge of the circle, not the centre.
        let edge_x = next_x + self.radius * pose.theta.cos();
        let edge_y = next_y + self.radius * pose.theta.sin();
        if env.in_environment(edge_x, edge_y) && !env.in_object(edge_x, edge_y) {
            pose.x = next_x;
            pose.y = next_y;
        } else {
            pose.theta += PI / 2.0;
        }
    }

    fn display(&self, _env: &Environment, visual: &mut dyn SceneVisualizer) {
        let pose = self
            .pose
            .as_ref()
            .expect("adversary displayed before placement");
        visual.circle(pose.x, pose.y, self.radius);
    }
}

/// The set of adversaries a detector is queried against.
pub struct AdversaryPool {
    adversaries: Vec<Adversary>,
}

impl AdversaryPool {
    pub fn new(adversaries: Vec<Adversary>) -> AdversaryPool {
        AdversaryPool { adversaries }
    }

    /// Whether any adversary contains the given centimetre point.
    pub fn in_adversary(&self, x: f64, y: f64) -> bool {
        self.adversaries.iter().any(|a| a.in_adversary(x, y))
    }

    /// Pool indices of every adversary containing the given point.
    pub fn hits_at(&self, x: f64, y: f64) -> impl Iterator<Item = usize> + '_ {
        self.adversaries
            .iter()
            .enumerate()
            .filter(move |(_, a)| a.in_adversary(x, y))
            .map(|(index, _)| index)
    }

    pub fn update(&mut self, env: &Environment) {
        for adversary in &mut self.adversaries {
            adversary.update(env);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Adversary> {
        self.adversaries.iter()
    }

    pub fn len(&self) -> usize {
        self.adversaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adversaries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::testing::environment_from;
    use approx::assert_relative_eq;

    #[test]
    fn walks_forward_until_blocked_then_turns() {
        // Corridor 2 boxes tall, 6 wide: free pixels x in [50, 350),
        // y in [50, 150).
        let env = environment_from(&["########", "#......#", "#......#", "########"], 1.0);
        let mut adversary = Adversary::new(10.0, 10.0);
        adversary.place(100.0, 100.0, 0.0);

        adversary.update(&env);
        let pose = adversary.pose().unwrap();
        assert_relative_eq!(pose.x, 110.0);
        assert_relative_eq!(pose.y, 100.0);

        // Keep walking east; the leading edge meets the wall at x = 350.
        for _ in 0..1000 {
            adversary.update(&env);
        }
        let pose = adversary.pose().unwrap();
        assert!(pose.x + adversary.radius < 350.0);
        assert!(pose.theta > 0.0);
    }

    #[test]
    fn pool_containment_uses_each_radius() {
        let mut small = Adversary::new(5.0, 1.0);
        small.place(100.0, 100.0, 0.0);
        let mut large = Adversary::new(25.0, 1.0);
        large.place(300.0, 100.0, 0.0);
        let pool = AdversaryPool::new(vec![small, large]);

        assert!(pool.in_adversary(103.0, 100.0));
        assert!(!pool.in_adversary(110.0, 100.0));
        assert!(pool.in_adversary(320.0, 100.0));
        assert!(!pool.in_adversary(330.0, 100.0));
    }
}
