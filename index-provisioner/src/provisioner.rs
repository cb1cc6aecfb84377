//! Index provisioning flow.
//!
//! Recreates an index from scratch so that its mapping is exactly the one
//! requested. Older engines cannot drop a mapping on its own, so the whole
//! index is deleted and created again.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::ProvisionError;
use index_provisioner_repository::{IndexAdmin, IndexConfig, IndexStats};
use index_provisioner_shared::MappingSpec;

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// The provisioned index.
    pub index: String,
    /// The legacy document type the mapping was applied through, if any.
    pub document_type: Option<String>,
    /// Whether an existing index was deleted first.
    pub replaced_existing: bool,
    /// Statistics read after provisioning, when requested and available.
    pub stats: Option<IndexStats>,
}

/// Drives the delete, create, put-mapping and verify sequence.
///
/// Each step runs only after the previous one succeeded and was confirmed.
/// There are no retries and nothing is rolled back.
pub struct IndexProvisioner {
    admin: Arc<dyn IndexAdmin>,
    collect_stats: bool,
}

impl IndexProvisioner {
    /// Create a provisioner that reports index statistics when done.
    pub fn new(admin: Arc<dyn IndexAdmin>) -> Self {
        Self {
            admin,
            collect_stats: true,
        }
    }

    /// Skip the statistics request after provisioning.
    pub fn without_stats(mut self) -> Self {
        self.collect_stats = false;
        self
    }

    /// Ensure `index` exists with exactly `mapping`, recreating it if present.
    ///
    /// # Returns
    ///
    /// * `Ok(ProvisionReport)` - The index was (re)created and its mapping verified
    /// * `Err(ProvisionError::DeleteNotConfirmed)` - The old index survived deletion
    /// * `Err(ProvisionError::CreateNotConfirmed)` - The new index was not found after creation
    /// * `Err(ProvisionError::VerificationFailed)` - The final check did not find the mapping
    /// * `Err(ProvisionError::SearchError)` - A request to the service failed
    #[instrument(skip(self, index, mapping), fields(index = %index.name))]
    pub async fn provision(
        &self,
        index: &IndexConfig,
        mapping: &MappingSpec,
    ) -> Result<ProvisionReport, ProvisionError> {
        index
            .validate()
            .map_err(|e| ProvisionError::config(e.to_string()))?;
        if mapping.properties.is_empty() {
            return Err(ProvisionError::config("mapping declares no fields"));
        }

        let name = index.name.as_str();

        let replaced_existing = self.remove_existing(name).await?;
        self.create(name).await?;
        self.apply_mapping(index, mapping).await?;
        self.verify(index, mapping).await?;

        let stats = if self.collect_stats {
            self.read_stats(name).await
        } else {
            None
        };

        Ok(ProvisionReport {
            index: index.name.clone(),
            document_type: index.document_type.clone(),
            replaced_existing,
            stats,
        })
    }

    /// Delete the index if it exists. Returns whether it existed.
    async fn remove_existing(&self, name: &str) -> Result<bool, ProvisionError> {
        if !self.admin.index_exists(name).await? {
            info!(index = %name, "Index does not exist, nothing to delete");
            return Ok(false);
        }

        info!(index = %name, "Index exists, deleting");
        self.admin.delete_index(name).await?;

        if self.admin.index_exists(name).await? {
            error!(index = %name, "Index still exists after delete");
            return Err(ProvisionError::DeleteNotConfirmed(name.to_string()));
        }

        info!(index = %name, "Successfully deleted index");
        Ok(true)
    }

    async fn create(&self, name: &str) -> Result<(), ProvisionError> {
        self.admin.create_index(name).await?;

        if !self.admin.index_exists(name).await? {
            error!(index = %name, "Index not found after create");
            return Err(ProvisionError::CreateNotConfirmed(name.to_string()));
        }

        info!(index = %name, "Successfully created index");
        Ok(())
    }

    async fn apply_mapping(
        &self,
        index: &IndexConfig,
        mapping: &MappingSpec,
    ) -> Result<(), ProvisionError> {
        info!(
            index = %index.name,
            mapping = %index.mapping_label(),
            fields = ?mapping.field_names(),
            "Starting request to put index mapping"
        );

        self.admin
            .put_mapping(&index.name, index.document_type.as_deref(), mapping)
            .await?;

        info!(index = %index.name, "Finished request to put index mapping");
        Ok(())
    }

    async fn verify(&self, index: &IndexConfig, mapping: &MappingSpec) -> Result<(), ProvisionError> {
        let name = index.name.as_str();

        if !self.admin.index_exists(name).await? {
            error!(index = %name, "Index missing at final verification");
            return Err(ProvisionError::verification(name, "index does not exist"));
        }

        let applied = self.admin.get_mapping(name).await?;
        let missing = mapping.missing_from(&applied);
        if !missing.is_empty() {
            error!(index = %name, missing = ?missing, "Applied mapping is incomplete");
            return Err(ProvisionError::verification(
                name,
                format!("fields missing or mistyped: {}", missing.join(", ")),
            ));
        }

        info!(
            index = %name,
            mapping = %index.mapping_label(),
            "Successfully created index with document mapping"
        );
        Ok(())
    }

    async fn read_stats(&self, name: &str) -> Option<IndexStats> {
        match self.admin.index_stats(name).await {
            Ok(stats) => {
                info!(
                    index = %name,
                    documents = stats.document_count,
                    store_bytes = stats.store_size_bytes,
                    "Index statistics"
                );
                Some(stats)
            }
            Err(e) => {
                warn!(index = %name, error = %e, "Failed to read index statistics");
                None
            }
        }
    }
}
