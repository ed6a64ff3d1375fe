//! Timestep scheduler.
//!
//! Per timestep, in strict order: advance every adversary, advance every
//! sensor, then run detection queries and record the hits. All state is
//! owned here and mutated from the main thread only; the display layer may
//! observe between steps but never mutates.

use crate::adversary::AdversaryPool;
use crate::environment::Environment;
use crate::object::SurveillanceObject;
use crate::sensors::Sensor;
use log::*;

/// External continue-callback for the loop: the simulation keeps stepping
/// while it returns true. Wraps interrupt flags, frame budgets, or display
/// back-pressure without the engine knowing which.
pub struct RunBudget {
    should_continue: Box<dyn Fn() -> bool>,
}

impl RunBudget {
    pub fn new<F: Fn() -> bool + 'static>(should_continue: F) -> RunBudget {
        RunBudget {
            should_continue: Box::new(should_continue),
        }
    }

    /// Never interrupts; the loop runs to `max_timesteps`.
    pub fn unlimited() -> RunBudget {
        RunBudget {
            should_continue: Box::new(|| true),
        }
    }

    pub fn has_budget(&self) -> bool {
        (self.should_continue)()
    }
}

/// A sensor reporting contact on a given timestep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detection {
    pub timestep: u64,
    pub sensor: String,
    /// Pool indices of the adversaries the sensor saw.
    pub adversaries: Vec<usize>,
}

pub struct Simulator<'e> {
    env: &'e Environment,
    sensors: Vec<Sensor>,
    adversaries: AdversaryPool,
    max_timesteps: Option<u64>,
    timestep: u64,
}

impl<'e> Simulator<'e> {
    pub fn new(
        env: &'e Environment,
        sensors: Vec<Sensor>,
        adversaries: AdversaryPool,
        max_timesteps: Option<u64>,
    ) -> Simulator<'e> {
        Simulator {
            env,
            sensors,
            adversaries,
            max_timesteps,
            timestep: 0,
        }
    }

    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn adversaries(&self) -> &AdversaryPool {
        &self.adversaries
    }

    /// Advance one timestep and return the detections it produced.
    pub fn step(&mut self) -> Vec<Detection> {
        self.adversaries.update(self.env);
        for sensor in &mut self.sensors {
            sensor.update(self.env);
        }

        let mut hits = Vec::new();
        for sensor in &self.sensors {
            let seen = sensor.adversary_detected(self.env, &self.adversaries);
            if !seen.is_empty() {
                info!(
                    "t={}: sensor '{}' detected adversaries {:?}",
                    self.timestep,
                    sensor.name(),
                    seen
                );
                hits.push(Detection {
                    timestep: self.timestep,
                    sensor: sensor.name().to_string(),
                    adversaries: seen,
                });
            }
        }

        self.timestep += 1;
        hits
    }

    fn halted(&self) -> bool {
        self.max_timesteps
            .map(|max| self.timestep >= max)
            .unwrap_or(false)
    }

    /// Run until `max_timesteps` or until the budget interrupts. With no
    /// step limit and an unlimited budget this never returns.
    pub fn run(&mut self, budget: &RunBudget) -> Vec<Detection> {
        let mut detections = Vec::new();
        while !self.halted() && budget.has_budget() {
            detections.extend(self.step());
        }
        detections
    }
}
