//! Response types for index administration.

use serde_json::Value;

use crate::errors::IndexAdminError;

/// Primary-shard statistics for a single index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of documents in the index.
    pub document_count: u64,
    /// Bytes stored on disk by the primary shards.
    pub store_size_bytes: u64,
}

impl IndexStats {
    /// Parse the body of a `GET /{index}/_stats` response.
    ///
    /// Reads `_all.primaries.docs.count` and `_all.primaries.store.size_in_bytes`.
    pub fn from_stats_body(body: &Value) -> Result<Self, IndexAdminError> {
        let primaries = body
            .pointer("/_all/primaries")
            .ok_or_else(|| IndexAdminError::parse("Stats response has no _all.primaries"))?;

        let document_count = primaries
            .pointer("/docs/count")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let store_size_bytes = primaries
            .pointer("/store/size_in_bytes")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        Ok(Self {
            document_count,
            store_size_bytes,
        })
    }
}
