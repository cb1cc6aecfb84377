//! # Index Provisioner Shared
//!
//! Plain data types shared between the repository layer and the provisioner.
//! The mapping types serialize into the exact JSON body that the search
//! service expects on its put-mapping endpoint.

pub mod mapping;

pub use mapping::{FieldMapping, FieldType, MappingSpec};
