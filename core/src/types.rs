//! Schema type definitions.
//!
//! This module defines the canonical, language-agnostic schema model that the
//! event store uses to validate payloads. The types serialize with [`serde`]
//! using the store's wire names (`fieldType`, `overridesOnNull`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the serialized schema format (semver).
///
/// Embedded in every [`SchemaBundle`](crate::SchemaBundle) to track
/// compatibility across releases.
pub const SCHEMA_FORMAT_VERSION: &str = "1.0.0";

/// Scalar kinds the store distinguishes.
///
/// Integer width, signedness and float precision are intentionally collapsed
/// into [`Number`](PrimitiveType::Number).
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::PrimitiveType;
///
/// let json = serde_json::to_string(&PrimitiveType::Boolean).unwrap();
/// assert_eq!(json, "\"BOOLEAN\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrimitiveType {
    /// Text values.
    String,
    /// Any integer or floating-point value.
    Number,
    /// `true` / `false`.
    Boolean,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
        };
        f.write_str(name)
    }
}

/// Shape of a field's type.
///
/// A closed set of exactly three shapes. Arrays are homogeneous and ordered;
/// sub-schemas embed a nested record.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::{FieldType, PrimitiveType};
///
/// let tags = FieldType::array(FieldType::Primitive(PrimitiveType::String));
/// let json = serde_json::to_value(&tags).unwrap();
/// assert_eq!(json["array"]["elementType"]["primitive"], "STRING");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// A scalar value.
    Primitive(PrimitiveType),
    /// An ordered, homogeneous collection.
    Array(ArrayType),
    /// A nested record.
    SubSchema(Schema),
}

/// Element description of an [`FieldType::Array`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayType {
    /// Type shared by every element.
    pub element_type: Box<FieldType>,
}

impl FieldType {
    /// Creates an array type with the given element type.
    pub fn array(element_type: FieldType) -> Self {
        Self::Array(ArrayType {
            element_type: Box::new(element_type),
        })
    }

    /// Returns the primitive kind, if this is a primitive.
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Self::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the element type, if this is an array.
    pub fn element_type(&self) -> Option<&FieldType> {
        match self {
            Self::Array(array) => Some(&array.element_type),
            _ => None,
        }
    }

    /// Returns the nested schema, if this is a sub-schema.
    pub fn as_sub_schema(&self) -> Option<&Schema> {
        match self {
            Self::SubSchema(schema) => Some(schema),
            _ => None,
        }
    }
}

/// Optional value constraints attached to a field.
///
/// Mirrors the store's constraint model. Generated schemas only carry
/// constraints that were declared on the record member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConstraints {
    /// Value must be present and non-null.
    #[serde(default)]
    pub required: bool,
    /// Inclusive lower bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Inclusive upper bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i32>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,
    /// Pattern a string must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl FieldConstraints {
    /// Returns `true` when no constraint is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One named slot in a [`Schema`].
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::{Field, FieldType, PrimitiveType};
///
/// let field = Field::new(FieldType::Primitive(PrimitiveType::String)).nullable();
/// assert!(field.nullable);
/// assert!(!field.overrides_on_null);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Shape of the value.
    pub field_type: FieldType,
    /// Whether `null` is an acceptable value.
    pub nullable: bool,
    /// Reserved null-override policy; always `false` from generation.
    #[serde(default)]
    pub overrides_on_null: bool,
    /// Declared value constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<FieldConstraints>,
}

impl Field {
    /// Creates a non-nullable field of the given type.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            nullable: false,
            overrides_on_null: false,
            constraints: None,
        }
    }

    /// Marks the field as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attaches constraints, dropping them if empty.
    pub fn with_constraints(mut self, constraints: FieldConstraints) -> Self {
        self.constraints = (!constraints.is_empty()).then_some(constraints);
        self
    }
}

/// Named collection of field definitions describing a record type.
///
/// Field keys are unique; the map is ordered so serialized output is
/// deterministic.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::{Field, FieldType, PrimitiveType, Schema};
///
/// let schema = Schema::new("Address")
///     .with_field("street", Field::new(FieldType::Primitive(PrimitiveType::String)))
///     .with_field("city", Field::new(FieldType::Primitive(PrimitiveType::String)));
///
/// assert_eq!(schema.len(), 2);
/// assert!(schema.field("city").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema identifier, usually the record type's name.
    pub name: String,
    /// Fields keyed by their external name.
    #[serde(default)]
    pub fields: BTreeMap<String, Field>,
}

impl Schema {
    /// Creates an empty schema with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field, replacing any field with the same key.
    pub fn with_field(mut self, key: impl Into<String>, field: Field) -> Self {
        self.fields.insert(key.into(), field);
        self
    }

    /// Looks up a field by key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// Returns the field keys in order.
    pub fn field_keys(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_wire_shape() {
        let schema = Schema::new("Person")
            .with_field(
                "name",
                Field::new(FieldType::Primitive(PrimitiveType::String)),
            )
            .with_field(
                "tags",
                Field::new(FieldType::array(FieldType::Primitive(PrimitiveType::String)))
                    .nullable(),
            );

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["name"], "Person");
        assert_eq!(json["fields"]["name"]["fieldType"]["primitive"], "STRING");
        assert_eq!(json["fields"]["name"]["nullable"], false);
        assert_eq!(json["fields"]["name"]["overridesOnNull"], false);
        assert!(json["fields"]["name"].get("constraints").is_none());
        assert_eq!(
            json["fields"]["tags"]["fieldType"]["array"]["elementType"]["primitive"],
            "STRING"
        );
    }

    #[test]
    fn test_sub_schema_deserializes() {
        let json = r#"{
            "name": "Order",
            "fields": {
                "shipping": {
                    "fieldType": {"subSchema": {"name": "Address", "fields": {
                        "city": {"fieldType": {"primitive": "STRING"}, "nullable": false}
                    }}},
                    "nullable": true
                }
            }
        }"#;

        let schema: Schema = serde_json::from_str(json).unwrap();
        let shipping = schema.field("shipping").unwrap();
        assert!(shipping.nullable);
        assert!(!shipping.overrides_on_null);
        let address = shipping.field_type.as_sub_schema().unwrap();
        assert_eq!(address.name, "Address");
        assert_eq!(
            address.field("city").unwrap().field_type.as_primitive(),
            Some(PrimitiveType::String)
        );
    }

    #[test]
    fn test_empty_constraints_are_dropped() {
        let field = Field::new(FieldType::Primitive(PrimitiveType::Number))
            .with_constraints(FieldConstraints::default());
        assert!(field.constraints.is_none());

        let field = Field::new(FieldType::Primitive(PrimitiveType::Number)).with_constraints(
            FieldConstraints {
                min_value: Some(0.0),
                ..Default::default()
            },
        );
        assert_eq!(field.constraints.unwrap().min_value, Some(0.0));
    }
}
