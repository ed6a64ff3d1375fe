//! Drawing seam for external display layers.
//!
//! The engine never renders anything itself. Objects describe their
//! appearance in world-space primitives (centimetres) and a front-end
//! implements `SceneVisualizer` however it draws.

pub trait SceneVisualizer {
    fn point(&mut self, x: f64, y: f64);
    fn segment(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
    fn circle(&mut self, x: f64, y: f64, radius: f64);
    /// Circular arc centred on `(x, y)` between two absolute angles.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64);
}
