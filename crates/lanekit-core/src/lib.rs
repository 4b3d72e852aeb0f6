//! Lanekit Core Library
//!
//! Signing configuration models, environment handling and the pipeline
//! actions used by iOS CI lanes.

pub mod actions;
pub mod env;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod signing;

pub use env::{Environment, strip_quotes, strip_quotes_opt};
pub use error::{LanekitError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
