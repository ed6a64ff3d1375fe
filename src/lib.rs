pub mod adversary;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod graph;
pub mod grid;
pub mod location;
pub mod object;
pub mod placement;
pub mod reduce;
pub mod sensors;
pub mod sim;

pub mod visual;
pub use visual::*;

pub use error::{Error, Result};
