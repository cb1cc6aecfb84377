//! Configuration loading and dependency wiring for the provisioner.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::ProvisionerSettings;
