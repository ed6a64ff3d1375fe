//! YAML configuration records.
//!
//! Field defaults mirror the sensor hardware profiles: omitted values fall
//! back to the stock radius/speed/field-of-view rather than erroring.

use crate::error::Result;
use serde::Deserialize;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub adversaries: Vec<AdversaryConfig>,
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
    /// Seed for the randomised placement stages; omit for entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub map: MapConfig,
    /// Omitted means run until externally cancelled.
    #[serde(default)]
    pub max_timesteps: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// Grayscale raster; pixels >= 128 are free space.
    pub image: PathBuf,
    pub pixel_to_cm: f64,
    /// Pre-built room graph blob. Built from the raster when omitted.
    #[serde(default)]
    pub graph: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PoseConfig {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub theta: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdversaryConfig {
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Starting pose; spawns in the largest room when omitted.
    #[serde(default)]
    pub pose: Option<PoseConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SensorConfig {
    Line {
        name: String,
        #[serde(default = "default_unbounded")]
        range: f64,
    },
    Camera {
        name: String,
        /// Degrees.
        #[serde(default = "default_field_of_view")]
        field_of_view: f64,
        #[serde(default = "default_unbounded")]
        range: f64,
    },
    Robot {
        name: String,
        #[serde(default = "default_radius")]
        radius: f64,
        #[serde(default = "default_speed")]
        speed: f64,
        /// Radians.
        #[serde(default = "default_robot_fov")]
        fov: f64,
        #[serde(default = "default_robot_range")]
        range: f64,
        /// Degrees between LIDAR rays.
        #[serde(default = "default_angle_resolution")]
        angle_resolution: f64,
    },
}

impl SensorConfig {
    pub fn name(&self) -> &str {
        match self {
            SensorConfig::Line { name, .. } => name,
            SensorConfig::Camera { name, .. } => name,
            SensorConfig::Robot { name, .. } => name,
        }
    }
}

fn default_radius() -> f64 {
    10.0
}

fn default_speed() -> f64 {
    1.0
}

fn default_field_of_view() -> f64 {
    45.0
}

fn default_unbounded() -> f64 {
    f64::INFINITY
}

fn default_robot_fov() -> f64 {
    PI / 2.0
}

fn default_robot_range() -> f64 {
    100.0
}

fn default_angle_resolution() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let yaml = r#"
environment:
  map:
    image: floor.png
    pixel_to_cm: 2.5
  max_timesteps: 500
adversaries:
  - { radius: 12, speed: 3 }
  - {}
sensors:
  - { type: "Line", name: east-door, range: 400 }
  - { type: "Camera", name: lobby }
  - { type: "Robot", name: patrol, speed: 5 }
seed: 7
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.environment.max_timesteps, Some(500));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.adversaries.len(), 2);
        assert_eq!(config.adversaries[1].radius, 10.0);
        assert_eq!(config.adversaries[1].speed, 1.0);
        match &config.sensors[1] {
            SensorConfig::Camera {
                field_of_view,
                range,
                ..
            } => {
                assert_eq!(*field_of_view, 45.0);
                assert!(range.is_infinite());
            }
            other => panic!("expected camera, got {:?}", other),
        }
        match &config.sensors[2] {
            SensorConfig::Robot {
                radius,
                speed,
                fov,
                range,
                angle_resolution,
                ..
            } => {
                assert_eq!(*radius, 10.0);
                assert_eq!(*speed, 5.0);
                assert_eq!(*fov, PI / 2.0);
                assert_eq!(*range, 100.0);
                assert_eq!(*angle_resolution, 1.0);
            }
            other => panic!("expected robot, got {:?}", other),
        }
    }

    #[test]
    fn unknown_sensor_type_is_rejected() {
        let yaml = r#"
environment:
  map:
    image: floor.png
    pixel_to_cm: 1.0
sensors:
  - { type: "Sonar", name: ping }
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn missing_max_timesteps_means_unbounded() {
        let yaml = r#"
environment:
  map:
    image: floor.png
    pixel_to_cm: 1.0
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.environment.max_timesteps, None);
        assert!(config.sensors.is_empty());
        assert!(config.adversaries.is_empty());
    }
}
