//! Index administration trait definition.
//!
//! This module defines the abstract interface for index-level operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, mocks).

use async_trait::async_trait;

use crate::errors::IndexAdminError;
use crate::types::IndexStats;
use index_provisioner_shared::MappingSpec;

/// Abstracts index-level administration on the search service.
///
/// Implementations are injected into the provisioner so the provisioning flow
/// can be exercised against an in-memory mock as well as a live cluster.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Every non-success response and every transport failure is returned as an
/// `IndexAdminError`. Implementations never retry.
#[async_trait]
pub trait IndexAdmin: Send + Sync {
    /// Check whether an index exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The service reports the index (2xx)
    /// * `Ok(false)` - The service reports no such index (404)
    /// * `Err(IndexAdminError)` - Any other status, or the request failed
    async fn index_exists(&self, index: &str) -> Result<bool, IndexAdminError>;

    /// Delete an index and all of its documents.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The index was deleted
    /// * `Err(IndexAdminError::IndexNotFound)` - The index did not exist
    /// * `Err(IndexAdminError)` - If the deletion fails
    async fn delete_index(&self, index: &str) -> Result<(), IndexAdminError>;

    /// Create an index with default settings and no body.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The index was created
    /// * `Err(IndexAdminError::IndexAlreadyExists)` - The name is already taken
    /// * `Err(IndexAdminError)` - If creation fails
    async fn create_index(&self, index: &str) -> Result<(), IndexAdminError>;

    /// Apply a field mapping to an index.
    ///
    /// # Arguments
    ///
    /// * `index` - The target index
    /// * `document_type` - Legacy mapping type label. `None` applies the mapping
    ///   at the index level, which is what current engines expect.
    /// * `mapping` - The field mapping to apply
    async fn put_mapping(
        &self,
        index: &str,
        document_type: Option<&str>,
        mapping: &MappingSpec,
    ) -> Result<(), IndexAdminError>;

    /// Read back the field mapping currently applied to an index.
    async fn get_mapping(&self, index: &str) -> Result<MappingSpec, IndexAdminError>;

    /// Fetch document count and storage size for an index.
    async fn index_stats(&self, index: &str) -> Result<IndexStats, IndexAdminError>;
}
