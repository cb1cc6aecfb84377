//! Dependency initialization and wiring for the index provisioner.

use std::sync::Arc;
use tracing::info;

use crate::provisioner::IndexProvisioner;
use crate::ProvisionError;
use index_provisioner_repository::{ConnectionConfig, OpenSearchClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured provisioner ready to run.
    pub provisioner: IndexProvisioner,
}

impl Dependencies {
    /// Initialize the search client and provisioner for a connection.
    ///
    /// No request is sent to the service here, so an unreachable endpoint is
    /// only reported by the first provisioning step.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ProvisionError)` - If the client cannot be built
    pub async fn new(connection: ConnectionConfig) -> Result<Self, ProvisionError> {
        info!(
            host = %connection.host,
            port = connection.port,
            tls = connection.use_tls,
            credentials = ?connection.credentials,
            "Initializing dependencies"
        );

        let client = OpenSearchClient::new(connection)
            .await
            .map_err(|e| ProvisionError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        let provisioner = IndexProvisioner::new(Arc::new(client));

        Ok(Self { provisioner })
    }
}
