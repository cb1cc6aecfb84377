//! OpenSearch implementation of the index administration interface.
//!
//! This module provides a concrete implementation of `IndexAdmin`
//! using OpenSearch as the backend.

mod auth;
mod client;
mod index_config;

pub use client::OpenSearchClient;
pub use index_config::{
    movies_mapping, IndexConfig, DOCUMENT_TYPE, INDEX_NAME, KEYWORD_IGNORE_ABOVE,
};
