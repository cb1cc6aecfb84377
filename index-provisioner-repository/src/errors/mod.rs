//! Error types for the index provisioner repository.

mod index_admin_error;

pub use index_admin_error::IndexAdminError;
