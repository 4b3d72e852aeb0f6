//! iOS code signing.
//!
//! This module provides functionality for:
//! - resolving the enterprise signing configuration from CI variables
//! - decoding and installing provisioning profiles

pub mod profile;
pub mod resolver;

pub use profile::*;
pub use resolver::*;
