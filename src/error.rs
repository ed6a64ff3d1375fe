//! Error kinds for the planning and simulation engine.
//!
//! Configuration, map, and graph errors abort startup; placement errors
//! abort before the simulation loop. Querying an unplaced sensor is a
//! programming fault and panics rather than surfacing here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or incomplete configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Map raster unusable (unreadable, empty, or fully occupied).
    #[error("map error: {0}")]
    Map(String),

    /// Graph reduction cannot support the requested sensor inventory.
    #[error("graph error: {0}")]
    Graph(String),

    /// A sensor reached the end of the pipeline without being placed.
    #[error("placement error: {0}")]
    Placement(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("map error: {0}")]
    Image(#[from] image::ImageError),

    #[error("graph blob error: {0}")]
    Blob(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
