//! Common contract for objects that live in the simulation.

use crate::environment::{Environment, Pose};
use crate::visual::SceneVisualizer;

/// Anything with a pose that advances per timestep and can describe
/// itself to a display front-end. Sensors additionally expose detection
/// on their concrete types.
pub trait SurveillanceObject {
    /// Set position and orientation, in centimetres and radians.
    fn place(&mut self, x: f64, y: f64, theta: f64);

    /// The current pose, if the object has been placed.
    fn pose(&self) -> Option<Pose>;

    /// Advance state by one timestep.
    fn update(&mut self, env: &Environment);

    /// Emit display primitives for an external renderer.
    fn display(&self, env: &Environment, visual: &mut dyn SceneVisualizer);
}
