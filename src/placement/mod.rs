//! The sensor placement pipeline.
//!
//! A fixed ordered sequence of stages, each consuming the sensors of its
//! kind and handing a (possibly mutated) graph to the next stage. Line
//! sensors run first so that later coverage decisions see the topology
//! after hallway segmentation.

pub mod camera;
pub mod line;
pub mod robot;

pub use camera::CameraPlacement;
pub use line::LineSensorPlacement;
pub use robot::RobotPlacement;

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::reduce::ReducedGraph;
use crate::sensors::{Sensor, SensorKind};
use log::*;
use rand_chacha::ChaCha8Rng;

/// Output of a single stage: the sensors it placed and the graph it hands
/// to the next stage.
#[derive(Debug)]
pub struct StepResult {
    pub placed: Vec<Sensor>,
    pub graph: ReducedGraph,
}

/// One stage of the pipeline. Stages are stateless; all placement state
/// lives in the sensors and the graph passed through.
pub trait PlacementStep {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Place the sensors this stage consumes. `sensors` is the remaining
    /// working list; the stage removes the ones it places.
    fn place(
        &self,
        sensors: &mut Vec<Sensor>,
        graph: ReducedGraph,
        env: &Environment,
        rng: &mut ChaCha8Rng,
    ) -> Result<StepResult>;
}

/// Pull every sensor of one kind out of the working list.
pub(crate) fn drain_kind(sensors: &mut Vec<Sensor>, kind: SensorKind) -> Vec<Sensor> {
    let mut mine = Vec::new();
    let mut rest = Vec::new();
    for sensor in sensors.drain(..) {
        if sensor.kind() == kind {
            mine.push(sensor);
        } else {
            rest.push(sensor);
        }
    }
    *sensors = rest;
    mine
}

/// The placed inventory and the final segmented graph.
pub struct PlacementResult {
    pub sensors: Vec<Sensor>,
    pub graph: ReducedGraph,
}

pub struct PlacementPipeline {
    steps: Vec<Box<dyn PlacementStep>>,
}

impl PlacementPipeline {
    /// The standard Line -> Camera -> Robot ordering.
    pub fn standard() -> PlacementPipeline {
        PlacementPipeline {
            steps: vec![
                Box::new(LineSensorPlacement),
                Box::new(CameraPlacement),
                Box::new(RobotPlacement),
            ],
        }
    }

    /// Run every stage over the inventory. A sensor no stage consumes is
    /// an error: it reached a pipeline that does not know its kind.
    pub fn run(
        &self,
        mut sensors: Vec<Sensor>,
        env: &Environment,
        rng: &mut ChaCha8Rng,
    ) -> Result<PlacementResult> {
        let mut graph = env.room_map.reduced.clone();
        let mut placed = Vec::new();
        for step in &self.steps {
            debug!(
                "placement stage '{}', {} sensors pending",
                step.name(),
                sensors.len()
            );
            let result = step.place(&mut sensors, graph, env, rng)?;
            placed.extend(result.placed);
            graph = result.graph;
        }
        if let Some(stray) = sensors.first() {
            return Err(Error::Placement(format!(
                "no stage consumed sensor '{}'",
                stray.name()
            )));
        }
        Ok(PlacementResult {
            sensors: placed,
            graph,
        })
    }
}
