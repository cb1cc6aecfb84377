//! # Index Provisioner Repository
//!
//! This crate provides the trait and implementation for administering indices
//! on the search service. It includes definitions for errors, connection
//! configuration, the built-in movies index definition, and a concrete
//! implementation for OpenSearch and managed Elasticsearch domains.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::{ConnectionConfig, CredentialSource};
pub use errors::IndexAdminError;
pub use interfaces::IndexAdmin;
pub use opensearch::{movies_mapping, IndexConfig, OpenSearchClient};
pub use types::IndexStats;
