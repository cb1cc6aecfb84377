//! Field mapping types.
//!
//! A `MappingSpec` is the `{"properties": {...}}` body sent to the put-mapping
//! endpoint. Each property is a `FieldMapping` that may carry secondary
//! sub-fields (for example an exact-match `keyword` copy of a `text` field).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Core field types supported by the mapping builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Keyword,
    Long,
    Integer,
    Short,
    Byte,
    Double,
    Float,
    Boolean,
    Date,
    /// Object fields are returned by the service without an explicit `type`.
    #[default]
    Object,
    /// Any type this crate does not model. Only produced when reading a
    /// mapping back from the service.
    #[serde(other)]
    Unknown,
}

/// Descriptor for a single mapped field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// The field's type.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Secondary sub-fields indexed from the same source value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldMapping>,

    /// Strings longer than this are not indexed (keyword fields only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_above: Option<u32>,

    /// Nested properties of an object field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, FieldMapping>,
}

impl FieldMapping {
    /// Create a field of the given type with no sub-fields.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            fields: BTreeMap::new(),
            ignore_above: None,
            properties: BTreeMap::new(),
        }
    }

    /// A `text` field with an exact-match `keyword` sub-field capped at
    /// `ignore_above` characters.
    pub fn text_with_keyword(ignore_above: u32) -> Self {
        Self::new(FieldType::Text).with_sub_field(
            "keyword",
            Self::new(FieldType::Keyword).with_ignore_above(ignore_above),
        )
    }

    /// Add a secondary sub-field.
    pub fn with_sub_field(mut self, name: impl Into<String>, field: FieldMapping) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Set the `ignore_above` length cap.
    pub fn with_ignore_above(mut self, ignore_above: u32) -> Self {
        self.ignore_above = Some(ignore_above);
        self
    }

    /// Add a nested property (object fields only).
    pub fn with_property(mut self, name: impl Into<String>, field: FieldMapping) -> Self {
        self.properties.insert(name.into(), field);
        self
    }

    fn collect_mismatches(&self, path: &str, actual: Option<&FieldMapping>, out: &mut Vec<String>) {
        let Some(actual) = actual else {
            out.push(path.to_string());
            return;
        };

        if actual.field_type != self.field_type {
            out.push(path.to_string());
            return;
        }

        if self.ignore_above.is_some() && actual.ignore_above != self.ignore_above {
            out.push(path.to_string());
        }

        for (name, expected) in &self.fields {
            expected.collect_mismatches(&format!("{path}.{name}"), actual.fields.get(name), out);
        }
        for (name, expected) in &self.properties {
            expected.collect_mismatches(
                &format!("{path}.{name}"),
                actual.properties.get(name),
                out,
            );
        }
    }
}

/// A complete field mapping specification for an index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingSpec {
    /// Top-level fields keyed by name.
    #[serde(default)]
    pub properties: BTreeMap<String, FieldMapping>,
}

impl MappingSpec {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level field.
    pub fn field(mut self, name: impl Into<String>, field: FieldMapping) -> Self {
        self.properties.insert(name.into(), field);
        self
    }

    /// Names of the top-level fields, in sorted order.
    pub fn field_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    /// The JSON body for a put-mapping request.
    pub fn to_json(&self) -> Value {
        // Serializing a map of plain structs cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Dotted paths of fields declared here that are absent from `actual` or
    /// mapped there with a different type.
    ///
    /// An empty result means `actual` carries everything this mapping declares.
    /// Extra fields present only in `actual` are ignored.
    pub fn missing_from(&self, actual: &MappingSpec) -> Vec<String> {
        let mut out = Vec::new();
        for (name, expected) in &self.properties {
            expected.collect_mismatches(name, actual.properties.get(name), &mut out);
        }
        out
    }
}
