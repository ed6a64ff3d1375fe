//! Line sensor placement.
//!
//! Breakbeams segment topology: placing one on a hallway node removes that
//! node from the graph. The stage exhaustively scores every size-k subset
//! of hallway nodes, minimising the cycles left behind and breaking ties
//! by how evenly the survivors split into sub-graphs. The hallway count is
//! small after reduction, so the combinatorial search is affordable.

use crate::environment::{Environment, Pose};
use crate::error::{Error, Result};
use crate::object::SurveillanceObject;
use crate::placement::{drain_kind, PlacementStep, StepResult};
use crate::reduce::ReducedGraph;
use crate::sensors::{Sensor, SensorKind};
use itertools::Itertools;
use log::*;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

pub struct LineSensorPlacement;

/// Sample standard deviation; zero when fewer than two values.
fn sample_stddev(values: &[usize]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<usize>() as f64 / n;
    let variance = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    variance.sqrt()
}

/// All size-k hallway subsets whose removal leaves the fewest cycles.
fn least_cycles(graph: &ReducedGraph, hallways: &[usize], k: usize) -> Vec<Vec<usize>> {
    let mut performances: Vec<(usize, Vec<usize>)> = Vec::new();
    for combo in hallways.iter().copied().combinations(k) {
        let mut candidate = graph.clone();
        for &node in &combo {
            candidate.remove_node(node);
        }
        // Isolated singletons left by the removal throw off the count.
        candidate.prune_isolated();
        performances.push((candidate.number_of_cycles(), combo));
    }
    debug!("evaluated {} hallway combinations", performances.len());

    let least = performances
        .iter()
        .map(|(cycles, _)| *cycles)
        .min()
        .expect("at least one combination");
    performances
        .into_iter()
        .filter(|(cycles, _)| *cycles == least)
        .map(|(_, combo)| combo)
        .collect()
}

/// Among tied combinations, the one splitting the graph into the most
/// evenly sized sub-graphs. Ties fall to enumeration order.
fn lowest_stddev(graph: &ReducedGraph, candidates: Vec<Vec<usize>>) -> Vec<usize> {
    let mut best: Option<(f64, Vec<usize>)> = None;
    for combo in candidates {
        let mut candidate = graph.clone();
        for &node in &combo {
            candidate.remove_node(node);
        }
        let stddev = sample_stddev(&candidate.sub_graph_sizes());
        match &best {
            Some((best_stddev, _)) if stddev >= *best_stddev => {}
            _ => best = Some((stddev, combo)),
        }
    }
    best.expect("at least one candidate").1
}

/// Walk up to one box width along `theta` looking for a wall; on a hit
/// return the last free point.
fn probe_wall(env: &Environment, x: f64, y: f64, theta: f64) -> Option<(f64, f64)> {
    let mut distance = 0.0;
    while distance < env.box_size_cm() {
        distance += 1.0;
        let px = x + distance * theta.cos();
        let py = y + distance * theta.sin();
        if !env.in_environment(px, py) || env.in_object(px, py) {
            let back = distance - 1.0;
            return Some((x + back * theta.cos(), y + back * theta.sin()));
        }
    }
    None
}

/// A pose whose beam spans the hallway: butt the sensor against one wall
/// and aim it perpendicular, across the corridor.
fn pose_for_node(env: &Environment, graph: &ReducedGraph, node: usize) -> Pose {
    let pos = graph.node(node).expect("placement node exists").pos;
    let (x_map, y_map) = env.cell_to_cm(pos);

    if let Some((x, y)) = probe_wall(env, x_map, y_map, PI) {
        return Pose::new(x, y, 0.0);
    }
    if let Some((x, y)) = probe_wall(env, x_map, y_map, 3.0 * PI / 2.0) {
        return Pose::new(x, y, PI / 2.0);
    }
    // No wall within a box on either probe axis; hallways are at most one
    // box wide, so this is effectively unreachable.
    Pose::new(x_map, y_map, PI / 2.0)
}

impl PlacementStep for LineSensorPlacement {
    fn name(&self) -> &str {
        "line"
    }

    fn place(
        &self,
        sensors: &mut Vec<Sensor>,
        graph: ReducedGraph,
        env: &Environment,
        _rng: &mut ChaCha8Rng,
    ) -> Result<StepResult> {
        let line_sensors = drain_kind(sensors, SensorKind::Line);
        if line_sensors.is_empty() {
            return Ok(StepResult {
                placed: Vec::new(),
                graph,
            });
        }

        let hallways = graph.hallway_nodes();
        debug!(
            "{} hallway nodes, {} line sensors",
            hallways.len(),
            line_sensors.len()
        );
        if hallways.is_empty() {
            return Err(Error::Graph(
                "line sensors requested but the reduced graph has no hallway nodes".to_string(),
            ));
        }
        if line_sensors.len() > hallways.len() {
            return Err(Error::Graph(format!(
                "{} line sensors but only {} hallway nodes",
                line_sensors.len(),
                hallways.len()
            )));
        }

        let top = least_cycles(&graph, &hallways, line_sensors.len());
        let chosen = if top.len() == 1 {
            top.into_iter().next().expect("single winner")
        } else {
            lowest_stddev(&graph, top)
        };

        let mut placed = Vec::new();
        for (mut sensor, &node) in line_sensors.into_iter().zip(chosen.iter()) {
            let pose = pose_for_node(env, &graph, node);
            debug!(
                "line sensor '{}' on node {} at ({:.1}, {:.1}, {:.2})",
                sensor.name(),
                node,
                pose.x,
                pose.y,
                pose.theta
            );
            sensor.place(pose.x, pose.y, pose.theta);
            placed.push(sensor);
        }

        let mut graph = graph;
        for &node in &chosen {
            graph.remove_node(node);
        }

        Ok(StepResult { placed, graph })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::testing::environment_from;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    fn line(name: &str) -> Sensor {
        Sensor::Line(crate::sensors::LineSensor::new(name, f64::INFINITY))
    }

    #[test]
    fn ring_corridor_is_cut_to_zero_cycles() {
        let env = environment_from(&["#####", "#...#", "#.#.#", "#...#", "#####"], 1.0);
        assert_eq!(env.room_map.reduced.number_of_cycles(), 1);

        let mut sensors = vec![line("beam")];
        let result = LineSensorPlacement
            .place(
                &mut sensors,
                env.room_map.reduced.clone(),
                &env,
                &mut rng(),
            )
            .unwrap();

        assert!(sensors.is_empty());
        assert_eq!(result.placed.len(), 1);
        assert!(result.placed[0].pose().is_some());
        assert_eq!(result.graph.number_of_cycles(), 0);
        assert_eq!(result.graph.len(), env.room_map.reduced.len() - 1);
    }

    #[test]
    fn zero_line_sensors_is_a_no_op() {
        let env = environment_from(&["#####", "#...#", "#####"], 1.0);
        let mut sensors = Vec::new();
        let before = env.room_map.reduced.clone();
        let result = LineSensorPlacement
            .place(&mut sensors, before.clone(), &env, &mut rng())
            .unwrap();
        assert!(result.placed.is_empty());
        assert_eq!(result.graph, before);
    }

    #[test]
    fn hallway_free_graph_is_a_graph_error() {
        // One open room reduces to a single room node.
        let env = environment_from(
            &["######", "#....#", "#....#", "#....#", "######"],
            1.0,
        );
        assert!(env.room_map.reduced.hallway_nodes().is_empty());
        let mut sensors = vec![line("beam")];
        let err = LineSensorPlacement
            .place(
                &mut sensors,
                env.room_map.reduced.clone(),
                &env,
                &mut rng(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Graph(_)));
    }

    #[test]
    fn beam_is_oriented_across_the_corridor() {
        // Horizontal corridor: the north probe finds the wall, so the beam
        // points south across the hallway.
        let env = environment_from(&["########", "#......#", "########"], 1.0);
        let mut sensors = vec![line("beam")];
        let result = LineSensorPlacement
            .place(
                &mut sensors,
                env.room_map.reduced.clone(),
                &env,
                &mut rng(),
            )
            .unwrap();
        let pose = result.placed[0].pose().unwrap();
        assert_eq!(pose.theta, PI / 2.0);
    }

    #[test]
    fn stddev_tie_break_prefers_even_splits() {
        assert_eq!(sample_stddev(&[4]), 0.0);
        assert!(sample_stddev(&[4, 4]) < sample_stddev(&[1, 7]));
    }
}
