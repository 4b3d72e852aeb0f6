//! Lane actions.
//!
//! Each action reads its parameters, does its one job and publishes what it
//! produced into the [`LaneContext`](crate::pipeline::LaneContext).

pub mod enterprise_configuration;
pub mod icon_banner;
pub mod install_provisioning_profile;

pub use enterprise_configuration::EnterpriseConfigurationParams;
