//! Camera placement.
//!
//! Greedy, one camera at a time: rooms are visited largest remaining area
//! first, candidate poses sit on the room's corners aimed at its centroid,
//! and the pose seeing the most still-uncovered cells wins. Convex
//! (outward-pointing) corners are skipped; their cone faces away from the
//! room. Covered cells are retired so no cell is counted twice across
//! cameras.

use crate::environment::{in_view_cone, Environment, Pose};
use crate::error::{Error, Result};
use crate::location::Location;
use crate::object::SurveillanceObject;
use crate::placement::{drain_kind, PlacementStep, StepResult};
use crate::reduce::{CornerKind, NodeKind, ReducedGraph};
use crate::sensors::{Sensor, SensorKind};
use fnv::FnvHashSet;
use log::*;
use rand_chacha::ChaCha8Rng;

pub struct CameraPlacement;

struct Candidate {
    room: usize,
    pose: Pose,
    covered: Vec<usize>,
}

/// Centre of a member cell in centimetres.
fn cell_center(env: &Environment, graph: &ReducedGraph, cell: usize) -> (f64, f64) {
    let loc = Location::from_index(cell, graph.width());
    env.cell_center_cm((loc.x() as f64, loc.y() as f64))
}

/// Room ids ordered by descending remaining area, id as the stable tie.
fn rooms_by_area(graph: &ReducedGraph) -> Vec<usize> {
    let mut rooms = graph.room_nodes();
    rooms.sort_by(|a, b| {
        let area_a = graph.node(*a).expect("room exists").area();
        let area_b = graph.node(*b).expect("room exists").area();
        area_b.cmp(&area_a).then(a.cmp(b))
    });
    rooms
}

/// The best corner pose for one camera over the whole graph.
fn best_candidate(
    env: &Environment,
    graph: &ReducedGraph,
    fov: f64,
    range: f64,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for room_id in rooms_by_area(graph) {
        let node = graph.node(room_id).expect("room exists");
        let NodeKind::Room {
            room_nodes,
            corners,
            ..
        } = &node.kind
        else {
            continue;
        };
        let (centroid_x, centroid_y) = env.cell_center_cm(node.pos);

        for corner in corners {
            if corner.kind == CornerKind::Convex {
                continue;
            }
            let (corner_x, corner_y) = cell_center(env, graph, corner.cell);
            let theta =
                crate::environment::compute_angle(corner_x, corner_y, centroid_x, centroid_y);
            let pose = Pose::new(corner_x, corner_y, theta);

            let covered: Vec<usize> = room_nodes
                .iter()
                .copied()
                .filter(|&cell| {
                    let (x, y) = cell_center(env, graph, cell);
                    in_view_cone(&pose, fov, range, x, y)
                })
                .collect();

            let better = best
                .as_ref()
                .map(|b| covered.len() > b.covered.len())
                .unwrap_or(true);
            if better {
                best = Some(Candidate {
                    room: room_id,
                    pose,
                    covered,
                });
            }
        }
    }

    best
}

impl PlacementStep for CameraPlacement {
    fn name(&self) -> &str {
        "camera"
    }

    fn place(
        &self,
        sensors: &mut Vec<Sensor>,
        graph: ReducedGraph,
        env: &Environment,
        _rng: &mut ChaCha8Rng,
    ) -> Result<StepResult> {
        let cameras = drain_kind(sensors, SensorKind::Camera);
        if cameras.is_empty() {
            return Ok(StepResult {
                placed: Vec::new(),
                graph,
            });
        }

        let mut graph = graph;
        let mut placed = Vec::new();

        for mut sensor in cameras {
            let (fov, range) = match &sensor {
                Sensor::Camera(camera) => (camera.fov(), camera.range()),
                _ => unreachable!("drained by kind"),
            };

            let candidate = best_candidate(env, &graph, fov, range).ok_or_else(|| {
                Error::Placement(format!(
                    "no room corner available for camera '{}'",
                    sensor.name()
                ))
            })?;

            debug!(
                "camera '{}' on room {} covering {} cells at ({:.1}, {:.1}, {:.2})",
                sensor.name(),
                candidate.room,
                candidate.covered.len(),
                candidate.pose.x,
                candidate.pose.y,
                candidate.pose.theta
            );

            // Retire the covered cells: area and room_nodes move in
            // lock-step or the greedy ordering breaks.
            let retired: FnvHashSet<usize> = candidate.covered.iter().copied().collect();
            let node = graph
                .node_mut(candidate.room)
                .expect("chosen room exists");
            if let NodeKind::Room {
                area, room_nodes, ..
            } = &mut node.kind
            {
                *area -= retired.len();
                room_nodes.retain(|cell| !retired.contains(cell));
            }

            sensor.place(candidate.pose.x, candidate.pose.y, candidate.pose.theta);
            placed.push(sensor);
        }

        Ok(StepResult { placed, graph })
    }
}
