//! Schema generation errors.
//!
//! Generation is all-or-nothing: the first failure aborts the build and is
//! returned to the caller annotated with the path of the field it came from.

use std::fmt;

use thiserror::Error;

use crate::Kind;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A field's resolved key.
    Key(String),
    /// The element type of an array.
    Element,
}

/// Location of a failing field, outermost segment first.
///
/// Displays as a dotted path with `[]` marking array elements, e.g.
/// `orders[].shipping.zip`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Returns the segments, outermost first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    fn prepend(&mut self, segment: PathSegment) {
        self.0.insert(0, segment);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Element => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

/// Errors raised while generating a schema.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use graveyard_schema_core::{generate, record, GenerateError, Kind};
///
/// record! {
///     pub struct Inventory {
///         pub counts: HashMap<String, u32>,
///     }
/// }
///
/// let err = generate::<Inventory>().unwrap_err();
/// assert_eq!(err.to_string(), "field counts: unsupported type: map");
/// assert_eq!(err.root_cause(), &GenerateError::UnsupportedType(Kind::Map));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The root type is not a record, even after one optional unwrap.
    #[error("schema generation requires a record, got {0}")]
    RootType(Kind),

    /// A field or element type has no schema representation.
    #[error("unsupported type: {0}")]
    UnsupportedType(Kind),

    /// A record contains itself, directly or through other records.
    #[error("cyclic record type: {0}")]
    CyclicType(String),

    /// Two members of one record resolve to the same key.
    #[error("duplicate field key: {0}")]
    DuplicateField(String),

    /// An error raised inside a nested field.
    #[error("field {path}: {source}")]
    Field {
        path: FieldPath,
        source: Box<GenerateError>,
    },
}

impl GenerateError {
    /// Annotates the error with the key of the field it was raised in.
    pub fn in_field(self, key: &str) -> Self {
        self.prefixed(PathSegment::Key(key.to_string()))
    }

    /// Annotates the error as raised inside an array element.
    pub fn in_element(self) -> Self {
        self.prefixed(PathSegment::Element)
    }

    fn prefixed(self, segment: PathSegment) -> Self {
        match self {
            Self::Field { mut path, source } => {
                path.prepend(segment);
                Self::Field { path, source }
            }
            other => Self::Field {
                path: FieldPath(vec![segment]),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, without path annotations.
    pub fn root_cause(&self) -> &GenerateError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the failing field's path, if the error was raised in a field.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::Field { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations_merge_into_one_path() {
        let err = GenerateError::UnsupportedType(Kind::Channel)
            .in_field("zip")
            .in_field("shipping")
            .in_element()
            .in_field("orders");

        assert_eq!(err.path().unwrap().to_string(), "orders[].shipping.zip");
        assert_eq!(
            err.to_string(),
            "field orders[].shipping.zip: unsupported type: channel"
        );
        assert_eq!(err.root_cause(), &GenerateError::UnsupportedType(Kind::Channel));
    }

    #[test]
    fn test_unannotated_error_has_no_path() {
        let err = GenerateError::RootType(Kind::String);
        assert!(err.path().is_none());
        assert_eq!(err.to_string(), "schema generation requires a record, got string");
    }

    #[test]
    fn test_nested_elements() {
        let err = GenerateError::UnsupportedType(Kind::Any)
            .in_element()
            .in_element()
            .in_field("matrix");
        assert_eq!(err.path().unwrap().to_string(), "matrix[][]");
    }
}
