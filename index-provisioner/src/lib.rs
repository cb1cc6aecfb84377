//! # Index Provisioner
//!
//! Ensures a search index exists with a given field mapping by destructively
//! recreating it: check existence, delete if present, create, put mapping,
//! verify.
//!
//! This crate holds the provisioning flow and the command-line surface of
//! the `index-provisioner` binary.

pub mod cli;
pub mod config;
pub mod logging;
pub mod provisioner;

pub use config::{Dependencies, ProvisionerSettings};
pub use provisioner::{IndexProvisioner, ProvisionReport};

use index_provisioner_repository::{ConnectionConfig, IndexAdminError, IndexConfig};
use index_provisioner_shared::MappingSpec;
use thiserror::Error;

/// Errors that can occur while provisioning an index.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A request to the search service failed.
    #[error("Search error: {0}")]
    SearchError(#[from] IndexAdminError),

    /// The index was still reported after it was deleted.
    #[error("Index {0} still exists after delete; not recreating it")]
    DeleteNotConfirmed(String),

    /// The index was not reported after it was created.
    #[error("Index {0} does not exist after create; not applying mapping")]
    CreateNotConfirmed(String),

    /// The final check found the index or its mapping missing.
    #[error("Verification of index {index} failed: {reason}")]
    VerificationFailed { index: String, reason: String },
}

impl ProvisionError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a verification error.
    pub fn verification(index: &str, reason: impl Into<String>) -> Self {
        Self::VerificationFailed {
            index: index.to_string(),
            reason: reason.into(),
        }
    }
}

/// Provision `index` with `mapping` on the service described by `connection`.
///
/// Builds a signed client and runs the full delete/create/map/verify sequence.
/// Any failure aborts the remaining steps; nothing is rolled back.
pub async fn provision(
    connection: &ConnectionConfig,
    index: &IndexConfig,
    mapping: &MappingSpec,
) -> Result<ProvisionReport, ProvisionError> {
    let dependencies = Dependencies::new(connection.clone()).await?;
    dependencies.provisioner.provision(index, mapping).await
}
