//! Robot placement.
//!
//! A stand-in policy: each robot starts at a uniformly random room node.
//! A coverage-driven policy (seeded by which rooms the cameras left
//! unsurveilled) is the anticipated replacement.

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::object::SurveillanceObject;
use crate::placement::{drain_kind, PlacementStep, StepResult};
use crate::reduce::ReducedGraph;
use crate::sensors::{Sensor, SensorKind};
use log::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub struct RobotPlacement;

impl PlacementStep for RobotPlacement {
    fn name(&self) -> &str {
        "robot"
    }

    fn place(
        &self,
        sensors: &mut Vec<Sensor>,
        graph: ReducedGraph,
        env: &Environment,
        rng: &mut ChaCha8Rng,
    ) -> Result<StepResult> {
        let robots = drain_kind(sensors, SensorKind::Robot);
        if robots.is_empty() {
            return Ok(StepResult {
                placed: Vec::new(),
                graph,
            });
        }

        let rooms = graph.room_nodes();
        if rooms.is_empty() {
            return Err(Error::Placement(
                "no room nodes available to station robots".to_string(),
            ));
        }

        let mut placed = Vec::new();
        for mut robot in robots {
            let room = rooms[rng.gen_range(0..rooms.len())];
            let pos = graph.node(room).expect("room exists").pos;
            let (x, y) = env.cell_center_cm(pos);
            debug!("robot '{}' in room {} at ({:.1}, {:.1})", robot.name(), room, x, y);
            robot.place(x, y, 0.0);
            placed.push(robot);
        }

        // Robots do not segment the graph.
        Ok(StepResult { placed, graph })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::testing::environment_from;
    use crate::sensors::Robot;
    use rand::SeedableRng;
    use std::f64::consts::PI;

    fn robot(name: &str) -> Sensor {
        Sensor::Robot(Robot::new(name, 10.0, 1.0, PI / 2.0, 100.0, 1.0))
    }

    #[test]
    fn robots_start_in_rooms_with_zero_heading() {
        let env = environment_from(
            &[
                "##########",
                "#....#...#",
                "#....#...#",
                "#........#",
                "##########",
            ],
            1.0,
        );
        let mut sensors = vec![robot("r1"), robot("r2")];
        let before = env.room_map.reduced.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let result = RobotPlacement
            .place(&mut sensors, before.clone(), &env, &mut rng)
            .unwrap();

        assert_eq!(result.placed.len(), 2);
        assert_eq!(result.graph, before);
        for sensor in &result.placed {
            let pose = sensor.pose().unwrap();
            assert_eq!(pose.theta, 0.0);
            assert!(env.in_environment(pose.x, pose.y));
        }
    }

    #[test]
    fn seeded_placement_is_reproducible() {
        let env = environment_from(
            &[
                "##########",
                "#....#...#",
                "#....#...#",
                "#........#",
                "##########",
            ],
            1.0,
        );
        let run = |seed: u64| {
            let mut sensors = vec![robot("r1")];
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            RobotPlacement
                .place(&mut sensors, env.room_map.reduced.clone(), &env, &mut rng)
                .unwrap()
                .placed[0]
                .pose()
                .unwrap()
        };
        assert_eq!(run(7), run(7));
    }
}
