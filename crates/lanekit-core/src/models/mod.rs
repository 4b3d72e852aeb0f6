//! Domain models for lanekit.

pub mod project;
pub mod signing;

pub use project::*;
pub use signing::*;
