//! Index identity and the built-in movies mapping.
//!
//! This module defines which index is provisioned and the field mapping that
//! is applied to it.

use index_provisioner_shared::{FieldMapping, FieldType, MappingSpec};

use crate::errors::IndexAdminError;

/// The name of the default index.
pub const INDEX_NAME: &str = "movies";

/// Legacy mapping type label used by older engines that still have document types.
pub const DOCUMENT_TYPE: &str = "movie";

/// Length cap on the exact-match `title.keyword` sub-field.
pub const KEYWORD_IGNORE_ABOVE: u32 = 256;

/// Identifies the index to provision and how its mapping is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Index name.
    pub name: String,
    /// Legacy document type label. `None` applies the mapping at index level.
    pub document_type: Option<String>,
}

impl IndexConfig {
    /// Target an index with a typeless mapping.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document_type: None,
        }
    }

    /// Address the mapping through a legacy document type.
    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    /// Reject names the service would refuse before any request is made.
    ///
    /// Index names must be non-empty, lowercase, and free of whitespace and
    /// of `\ / * ? " < > | , # :`. They must not start with `_`, `-` or `+`,
    /// and must not be `.` or `..`. A document type, when set, follows the
    /// same character rules.
    pub fn validate(&self) -> Result<(), IndexAdminError> {
        let name = self.name.as_str();
        check_path_name("index name", name)?;
        if name.starts_with(['_', '-', '+']) {
            return Err(IndexAdminError::validation(format!(
                "index name must not start with '_', '-' or '+': {}",
                name
            )));
        }
        if name.chars().any(char::is_uppercase) {
            return Err(IndexAdminError::validation(format!(
                "index name must be lowercase: {}",
                name
            )));
        }
        if let Some(document_type) = &self.document_type {
            check_path_name("document type", document_type)?;
        }
        Ok(())
    }

    /// Label used in progress messages for the mapping being applied.
    pub fn mapping_label(&self) -> &str {
        self.document_type.as_deref().unwrap_or("typeless")
    }
}

/// Characters the service refuses in index and type names.
const FORBIDDEN_NAME_CHARS: [char; 11] = ['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ':'];

fn check_path_name(kind: &str, value: &str) -> Result<(), IndexAdminError> {
    if value.is_empty() {
        return Err(IndexAdminError::validation(format!("{} must not be empty", kind)));
    }
    if value == "." || value == ".." {
        return Err(IndexAdminError::validation(format!(
            "{} must not be '.' or '..'",
            kind
        )));
    }
    if let Some(c) = value
        .chars()
        .find(|c| c.is_whitespace() || FORBIDDEN_NAME_CHARS.contains(c))
    {
        return Err(IndexAdminError::validation(format!(
            "{} contains forbidden character {:?}: {}",
            kind, c, value
        )));
    }
    Ok(())
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(INDEX_NAME)
    }
}

/// Get the field mapping for the movies index.
///
/// The mapping includes:
/// - **title**: analyzed `text` with an exact-match `keyword` sub-field for
///   sorting, aggregation and filtering, capped at 256 characters
/// - **year**: 64-bit integer (`long`)
pub fn movies_mapping() -> MappingSpec {
    MappingSpec::new()
        .field("title", FieldMapping::text_with_keyword(KEYWORD_IGNORE_ABOVE))
        .field("year", FieldMapping::new(FieldType::Long))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_movies_mapping_structure() {
        let mapping = movies_mapping().to_json();

        assert_eq!(mapping["properties"]["title"]["type"], "text");
        assert_eq!(
            mapping["properties"]["title"]["fields"]["keyword"]["type"],
            "keyword"
        );
        assert_eq!(
            mapping["properties"]["title"]["fields"]["keyword"]["ignore_above"],
            256
        );
        assert_eq!(mapping["properties"]["year"], json!({ "type": "long" }));
    }

    #[test]
    fn test_index_name() {
        assert_eq!(INDEX_NAME, "movies");
        assert_eq!(IndexConfig::default().name, "movies");
        assert!(IndexConfig::default().document_type.is_none());
    }

    #[test]
    fn test_mapping_label() {
        assert_eq!(IndexConfig::default().mapping_label(), "typeless");
        assert_eq!(
            IndexConfig::default()
                .with_document_type(DOCUMENT_TYPE)
                .mapping_label(),
            "movie"
        );
    }

    #[test]
    fn test_validate() {
        assert!(IndexConfig::new("movies").validate().is_ok());
        assert!(IndexConfig::new("movies-2024").validate().is_ok());

        for bad in ["", "Movies", "my movies", "_movies", "-movies", "+movies"] {
            let result = IndexConfig::new(bad).validate();
            assert!(
                matches!(result, Err(IndexAdminError::ValidationError(_))),
                "expected {:?} to be rejected",
                bad
            );
        }

        let result = IndexConfig::new("movies").with_document_type("").validate();
        assert!(matches!(result, Err(IndexAdminError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_path_characters() {
        let bad_names = [
            "movies?v=1", "movies/x", "mov\\ies", "mov*", "a\"b", "a<b", "a>b", "a|b",
            "a,b", "a#b", "a:b", "tab\there", ".", "..",
        ];
        for bad in bad_names {
            let result = IndexConfig::new(bad).validate();
            assert!(
                matches!(result, Err(IndexAdminError::ValidationError(_))),
                "expected index name {:?} to be rejected",
                bad
            );
        }

        for bad in ["../..", "movie/x", "movie?x", "..", " "] {
            let result = IndexConfig::new("movies").with_document_type(bad).validate();
            assert!(
                matches!(result, Err(IndexAdminError::ValidationError(_))),
                "expected document type {:?} to be rejected",
                bad
            );
        }

        assert!(IndexConfig::new("movies.v2").with_document_type("_doc").validate().is_ok());
    }
}
