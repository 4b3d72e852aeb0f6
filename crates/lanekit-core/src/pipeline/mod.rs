//! Lane execution infrastructure.
//!
//! This module provides functionality for parsing lane files, executing
//! their steps in order and carrying results between steps.

pub mod context;
pub mod executor;
pub mod parser;
pub mod runner;

pub use context::*;
pub use executor::*;
pub use parser::*;
pub use runner::*;
