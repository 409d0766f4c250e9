use serde::{Deserialize, Serialize};

use crate::Schema;

/// Schemas shipped together, e.g. to seed a store or hand to another service.
///
/// Bundles are plain JSON; the CLI's `bundle` command writes them and the
/// store's loader reads them back.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::*;
///
/// let mut bundle = SchemaBundle::new("1.0.0", "2024-01-15T10:30:00Z");
/// bundle.name = Some("billing".into());
/// bundle.schemas.push(Schema::new("Invoice"));
/// bundle.schemas.push(Schema::new("Payment"));
///
/// assert_eq!(bundle.schema_count(), 2);
/// assert!(bundle.find("Payment").is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Wire format of the schemas inside. Absent in bundles written before
    /// the field existed; see [`SCHEMA_FORMAT_VERSION`](crate::SCHEMA_FORMAT_VERSION).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    /// Release of the bundle itself. Must not be blank.
    pub version: String,
    /// Label, such as the service that owns the events.
    #[serde(default)]
    pub name: Option<String>,
    /// Free text for humans.
    #[serde(default)]
    pub description: Option<String>,
    /// When the bundle was written, RFC 3339.
    pub generated_at: String,
    /// The schemas, in the order they were added. Names must be unique.
    pub schemas: Vec<Schema>,
}

impl SchemaBundle {
    /// Starts an empty bundle stamped with the current wire format.
    pub fn new(version: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            format_version: Some(crate::SCHEMA_FORMAT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            generated_at: generated_at.into(),
            schemas: Vec::new(),
        }
    }

    /// Number of schemas carried.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Looks up a schema by its name.
    pub fn find(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_without_optional_metadata_loads() {
        let json = r#"{
            "version": "0.9.0",
            "generated_at": "2023-11-02T08:00:00Z",
            "schemas": [{ "name": "Legacy", "fields": {} }]
        }"#;
        let bundle: SchemaBundle = serde_json::from_str(json).unwrap();

        assert_eq!(bundle.format_version, None);
        assert_eq!(bundle.name, None);
        assert!(bundle.find("Legacy").unwrap().is_empty());
    }

    #[test]
    fn test_new_bundle_stamps_format_version() {
        let bundle = SchemaBundle::new("1.2.0", "2024-05-05T05:05:05Z");
        let value = serde_json::to_value(&bundle).unwrap();

        assert_eq!(value["format_version"], crate::SCHEMA_FORMAT_VERSION);
        assert_eq!(value["schemas"], serde_json::json!([]));
        assert!(bundle.find("Anything").is_none());
    }
}
