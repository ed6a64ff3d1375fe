//! Sensor models.
//!
//! Three variants share the `SurveillanceObject` contract plus an
//! `adversary_detected` query reporting which pool members were seen.
//! Detection is best-effort ray casting: rays that leave the map simply
//! report nothing.

pub mod camera;
pub mod line;
pub mod robot;

pub use camera::CameraSensor;
pub use line::LineSensor;
pub use robot::Robot;

use crate::adversary::AdversaryPool;
use crate::config::SensorConfig;
use crate::environment::{Environment, Pose};
use crate::object::SurveillanceObject;
use crate::visual::SceneVisualizer;
use fnv::FnvHashSet;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Line,
    Camera,
    Robot,
}

/// A deployable sensor of any kind.
#[derive(Debug)]
pub enum Sensor {
    Line(LineSensor),
    Camera(CameraSensor),
    Robot(Robot),
}

impl Sensor {
    /// Construct a sensor from its configuration record.
    pub fn from_config(config: &SensorConfig) -> Sensor {
        match config {
            SensorConfig::Line { name, range } => Sensor::Line(LineSensor::new(name, *range)),
            SensorConfig::Camera {
                name,
                field_of_view,
                range,
            } => Sensor::Camera(CameraSensor::new(name, *field_of_view, *range)),
            SensorConfig::Robot {
                name,
                radius,
                speed,
                fov,
                range,
                angle_resolution,
            } => Sensor::Robot(Robot::new(
                name,
                *radius,
                *speed,
                *fov,
                *range,
                *angle_resolution,
            )),
        }
    }

    pub fn kind(&self) -> SensorKind {
        match self {
            Sensor::Line(_) => SensorKind::Line,
            Sensor::Camera(_) => SensorKind::Camera,
            Sensor::Robot(_) => SensorKind::Robot,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Sensor::Line(s) => s.name(),
            Sensor::Camera(s) => s.name(),
            Sensor::Robot(s) => s.name(),
        }
    }

    /// Sorted pool indices of every adversary the sensor currently sees.
    /// Empty means no contact.
    pub fn adversary_detected(&self, env: &Environment, pool: &AdversaryPool) -> Vec<usize> {
        match self {
            Sensor::Line(s) => s.adversary_detected(env, pool),
            Sensor::Camera(s) => s.adversary_detected(env, pool),
            Sensor::Robot(s) => s.adversary_detected(env, pool),
        }
    }
}

impl SurveillanceObject for Sensor {
    fn place(&mut self, x: f64, y: f64, theta: f64) {
        match self {
            Sensor::Line(s) => s.place(x, y, theta),
            Sensor::Camera(s) => s.place(x, y, theta),
            Sensor::Robot(s) => s.place(x, y, theta),
        }
    }

    fn pose(&self) -> Option<Pose> {
        match self {
            Sensor::Line(s) => s.pose(),
            Sensor::Camera(s) => s.pose(),
            Sensor::Robot(s) => s.pose(),
        }
    }

    fn update(&mut self, env: &Environment) {
        match self {
            Sensor::Line(s) => s.update(env),
            Sensor::Camera(s) => s.update(env),
            Sensor::Robot(s) => s.update(env),
        }
    }

    fn display(&self, env: &Environment, visual: &mut dyn SceneVisualizer) {
        match self {
            Sensor::Line(s) => s.display(env, visual),
            Sensor::Camera(s) => s.display(env, visual),
            Sensor::Robot(s) => s.display(env, visual),
        }
    }
}

/// Walk a cast ray at 1 cm steps and collect the pool indices of every
/// adversary a sample lands in. Shared by all three detectors; stops
/// early once the whole pool has been seen.
pub(crate) fn ray_hits_pool(
    env: &Environment,
    pool: &AdversaryPool,
    origin: (f64, f64),
    theta: f64,
    range: f64,
    hits: &mut FnvHashSet<usize>,
) {
    let (end_x, end_y) = env.cast_ray(origin.0, origin.1, theta, range);
    let length = ((end_x - origin.0).powi(2) + (end_y - origin.1).powi(2)).sqrt();
    let mut distance = 0.0;
    while distance < length {
        if hits.len() == pool.len() {
            return;
        }
        let x = origin.0 + distance * theta.cos();
        let y = origin.1 + distance * theta.sin();
        hits.extend(pool.hits_at(x, y));
        distance += crate::constants::RAY_STEP_CM;
    }
}

/// Finish a detection query: the hit set as sorted pool indices.
pub(crate) fn sorted_hits(hits: FnvHashSet<usize>) -> Vec<usize> {
    let mut hits: Vec<usize> = hits.into_iter().collect();
    hits.sort_unstable();
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::testing::environment_from;

    #[test]
    fn factory_builds_each_configured_kind() {
        let yaml = r#"
- { type: "Line", name: beam }
- { type: "Camera", name: cam, field_of_view: 90 }
- { type: "Robot", name: bot, speed: 2 }
"#;
        let configs: Vec<SensorConfig> = serde_yaml::from_str(yaml).unwrap();
        let sensors: Vec<Sensor> = configs.iter().map(Sensor::from_config).collect();
        assert_eq!(sensors[0].kind(), SensorKind::Line);
        assert_eq!(sensors[1].kind(), SensorKind::Camera);
        assert_eq!(sensors[2].kind(), SensorKind::Robot);
        assert_eq!(sensors[0].name(), "beam");
        assert_eq!(sensors[2].name(), "bot");
    }

    #[derive(Default)]
    struct Recorder {
        points: usize,
        segments: usize,
        circles: usize,
        arcs: usize,
    }

    impl SceneVisualizer for Recorder {
        fn point(&mut self, _x: f64, _y: f64) {
            self.points += 1;
        }
        fn segment(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64) {
            self.segments += 1;
        }
        fn circle(&mut self, _x: f64, _y: f64, _radius: f64) {
            self.circles += 1;
        }
        fn arc(&mut self, _x: f64, _y: f64, _r: f64, _a0: f64, _a1: f64) {
            self.arcs += 1;
        }
    }

    #[test]
    fn display_emits_the_expected_primitives() {
        let env = environment_from(&["#####", "#...#", "#...#", "#####"], 1.0);

        let mut beam = Sensor::Line(LineSensor::new("beam", 100.0));
        beam.place(75.0, 75.0, 0.0);
        let mut recorder = Recorder::default();
        beam.display(&env, &mut recorder);
        assert_eq!((recorder.segments, recorder.points), (1, 1));

        let mut camera = Sensor::Camera(CameraSensor::new("cam", 60.0, 80.0));
        camera.place(75.0, 75.0, 0.0);
        let mut recorder = Recorder::default();
        camera.display(&env, &mut recorder);
        assert_eq!(recorder.segments, 2);
        assert_eq!(recorder.arcs, 1);
        assert_eq!(recorder.points, 1);

        let mut robot = Sensor::Robot(Robot::new("bot", 10.0, 1.0, 0.5, 60.0, 10.0));
        robot.place(100.0, 100.0, 0.0);
        let mut recorder = Recorder::default();
        robot.display(&env, &mut recorder);
        assert_eq!(recorder.circles, 1);
        assert!(recorder.segments > 0);
    }
}
