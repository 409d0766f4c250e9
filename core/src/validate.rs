//! Schema and bundle validation.
//!
//! Validates structural invariants of schema values that did not necessarily
//! come from the generator (for example, schemas loaded from JSON files),
//! catching empty names and inconsistent constraints before the schemas are
//! registered with a store.
//!
//! # Examples
//!
//! ```
//! use graveyard_schema_core::*;
//!
//! let schema = Schema::new("Person")
//!     .with_field("name", Field::new(FieldType::Primitive(PrimitiveType::String)));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Invalid: empty schema name
//! let bad = Schema::new("  ");
//! assert_eq!(validate_schema(&bad), vec![ValidationError::EmptySchemaName]);
//! ```

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;

use crate::{Field, FieldConstraints, FieldType, PrimitiveType, Schema, SchemaBundle};

/// Schema/bundle validation errors.
///
/// Paths use the same dotted notation as generation errors, with `[]`
/// marking array elements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Bundle version string is empty.
    #[error("bundle version cannot be empty")]
    EmptyBundleVersion,
    /// Schema name is empty or whitespace-only.
    #[error("schema name cannot be empty")]
    EmptySchemaName,
    /// A nested sub-schema has an empty name.
    #[error("sub-schema name cannot be empty at: {0}")]
    EmptySubSchemaName(String),
    /// Two schemas in the same bundle share a name.
    #[error("duplicate schema in bundle: {0}")]
    DuplicateSchema(String),
    /// A field key is empty or whitespace-only.
    #[error("empty field key at: {0}")]
    EmptyFieldKey(String),
    /// Constraint bounds contradict each other.
    #[error("invalid constraint on {path}: {reason}")]
    InvalidConstraint { path: String, reason: String },
    /// A constraint does not apply to the field's type.
    #[error("constraint {constraint} does not apply to {path}")]
    ConstraintTypeMismatch { path: String, constraint: String },
    /// A regex constraint does not compile.
    #[error("invalid regex on {path}: {pattern}")]
    InvalidRegex { path: String, pattern: String },
}

/// Validates a schema bundle.
///
/// Checks for an empty version string and duplicate schema names, and
/// validates each schema individually. Stops at the first failing schema.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::*;
///
/// let mut bundle = SchemaBundle::new("1.0.0", "2024-01-01T00:00:00Z");
/// bundle.schemas.push(Schema::new("Order"));
/// assert!(validate_bundle(&bundle).is_empty());
///
/// bundle.schemas.push(Schema::new("Order"));
/// let errors = validate_bundle(&bundle);
/// assert_eq!(errors, vec![ValidationError::DuplicateSchema("Order".into())]);
/// ```
pub fn validate_bundle(bundle: &SchemaBundle) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if bundle.version.trim().is_empty() {
        errors.push(ValidationError::EmptyBundleVersion);
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for schema in &bundle.schemas {
        let name = schema.name.as_str();
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateSchema(name.to_string()));
            return errors;
        }
        errors.extend(validate_schema(schema));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

/// Validates a schema and every nested sub-schema.
///
/// Unlike bundle validation, all problems found are reported.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::*;
///
/// let field = Field::new(FieldType::Primitive(PrimitiveType::Number)).with_constraints(
///     FieldConstraints { min_value: Some(10.0), max_value: Some(1.0), ..Default::default() },
/// );
/// let schema = Schema::new("Reading").with_field("value", field);
///
/// let errors = validate_schema(&schema);
/// assert!(matches!(&errors[..], [ValidationError::InvalidConstraint { path, .. }] if path == "value"));
/// ```
pub fn validate_schema(schema: &Schema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if schema.name.trim().is_empty() {
        errors.push(ValidationError::EmptySchemaName);
        return errors;
    }

    validate_fields(schema, "", &mut errors);
    errors
}

fn validate_fields(schema: &Schema, prefix: &str, errors: &mut Vec<ValidationError>) {
    for (key, field) in &schema.fields {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        if key.trim().is_empty() {
            errors.push(ValidationError::EmptyFieldKey(path));
            continue;
        }

        if let Some(constraints) = &field.constraints {
            validate_constraints(field, constraints, &path, errors);
        }
        validate_field_type(&field.field_type, &path, errors);
    }
}

fn validate_field_type(field_type: &FieldType, path: &str, errors: &mut Vec<ValidationError>) {
    match field_type {
        FieldType::Primitive(_) => {}
        FieldType::Array(array) => {
            validate_field_type(&array.element_type, &format!("{path}[]"), errors)
        }
        FieldType::SubSchema(schema) => {
            if schema.name.trim().is_empty() {
                errors.push(ValidationError::EmptySubSchemaName(path.to_string()));
                return;
            }
            validate_fields(schema, path, errors);
        }
    }
}

fn validate_constraints(
    field: &Field,
    constraints: &FieldConstraints,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let primitive = field.field_type.as_primitive();
    let mismatch = |constraint: &str| ValidationError::ConstraintTypeMismatch {
        path: path.to_string(),
        constraint: constraint.to_string(),
    };

    if primitive != Some(PrimitiveType::Number) {
        if constraints.min_value.is_some() {
            errors.push(mismatch("min_value"));
        }
        if constraints.max_value.is_some() {
            errors.push(mismatch("max_value"));
        }
    }
    if primitive != Some(PrimitiveType::String) {
        if constraints.min_length.is_some() {
            errors.push(mismatch("min_length"));
        }
        if constraints.max_length.is_some() {
            errors.push(mismatch("max_length"));
        }
        if constraints.regex.is_some() {
            errors.push(mismatch("regex"));
        }
    }

    let invalid = |reason: String| ValidationError::InvalidConstraint {
        path: path.to_string(),
        reason,
    };

    if let (Some(min), Some(max)) = (constraints.min_value, constraints.max_value) {
        if min > max {
            errors.push(invalid(format!("min_value {min} exceeds max_value {max}")));
        }
    }
    for (name, value) in [
        ("min_length", constraints.min_length),
        ("max_length", constraints.max_length),
    ] {
        if let Some(len) = value {
            if len < 0 {
                errors.push(invalid(format!("{name} {len} is negative")));
            }
        }
    }
    if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
        if min > max {
            errors.push(invalid(format!("min_length {min} exceeds max_length {max}")));
        }
    }

    if let Some(pattern) = &constraints.regex {
        if Regex::new(pattern).is_err() {
            errors.push(ValidationError::InvalidRegex {
                path: path.to_string(),
                pattern: pattern.clone(),
            });
        }
    }
}
