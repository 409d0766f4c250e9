//! Schema generation from type descriptors.
//!
//! Three layers, leaves first:
//!
//! - [`map_type`] turns one type descriptor into a [`FieldType`];
//! - [`map_field`] turns a record member into a [`Field`], detecting
//!   single-level optionals as nullable;
//! - [`build_schema`] / [`generate`] turn a record into a [`Schema`].
//!
//! The descent carries the chain of records under construction, so a record
//! that contains itself fails with [`GenerateError::CyclicType`] instead of
//! recursing forever.
//!
//! # Example
//!
//! ```
//! use graveyard_schema_core::*;
//!
//! record! {
//!     pub struct Address {
//!         pub street: String,
//!         pub city: String,
//!     }
//! }
//!
//! record! {
//!     pub struct Person {
//!         pub name: String => "full_name",
//!         pub tags: Vec<String>,
//!         pub address: Option<Address>,
//!     }
//! }
//!
//! let schema = generate::<Person>().unwrap();
//! let address = schema.field("address").unwrap();
//! assert!(address.nullable);
//! assert_eq!(address.field_type.as_sub_schema().unwrap().name, "Address");
//! assert_eq!(
//!     schema.field("tags").unwrap().field_type,
//!     FieldType::array(FieldType::Primitive(PrimitiveType::String))
//! );
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::descriptor::{Kind, MemberDescriptor, RecordDescriptor, TypeDescriptor, Visibility};
use crate::{Describe, Field, FieldType, GenerateError, PrimitiveType, Schema};

/// Generates the schema for a record type.
///
/// # Errors
///
/// Returns [`GenerateError::RootType`] if `T` is not a record (or an
/// `Option` of one), and any error raised while mapping its fields.
pub fn generate<T: Describe>() -> Result<Schema, GenerateError> {
    build_schema(&T::describe())
}

/// Builds a schema from a record descriptor.
///
/// A single level of [`TypeDescriptor::Optional`] around the record is
/// unwrapped.
///
/// # Errors
///
/// Returns [`GenerateError::RootType`] for non-record roots; otherwise the
/// first field error, annotated with its path.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::{build_schema, Describe, GenerateError, Kind};
///
/// let err = build_schema(&String::describe()).unwrap_err();
/// assert_eq!(err, GenerateError::RootType(Kind::String));
/// ```
pub fn build_schema(root: &TypeDescriptor) -> Result<Schema, GenerateError> {
    let target = match root {
        TypeDescriptor::Optional(inner) => inner.as_ref(),
        other => other,
    };
    match target {
        TypeDescriptor::Record(record) => SchemaBuilder::default().record(record),
        other => Err(GenerateError::RootType(other.kind())),
    }
}

/// Maps one member to a field.
///
/// # Errors
///
/// Propagates the type mapping error for the member's (unwrapped) type.
pub fn map_field(member: &MemberDescriptor) -> Result<Field, GenerateError> {
    SchemaBuilder::default().field(member)
}

/// Maps one type descriptor to a field type.
///
/// # Errors
///
/// Returns [`GenerateError::UnsupportedType`] for kinds outside text,
/// numbers, booleans, sequences and records.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::{map_type, Describe, FieldType, PrimitiveType};
///
/// assert_eq!(
///     map_type(&u8::describe()).unwrap(),
///     FieldType::Primitive(PrimitiveType::Number)
/// );
/// // Byte buffers are arrays of numbers.
/// assert_eq!(
///     map_type(&Vec::<u8>::describe()).unwrap(),
///     FieldType::array(FieldType::Primitive(PrimitiveType::Number))
/// );
/// ```
pub fn map_type(ty: &TypeDescriptor) -> Result<FieldType, GenerateError> {
    SchemaBuilder::default().field_type(ty)
}

/// Recursive descent state for a single generation call.
#[derive(Debug, Default)]
struct SchemaBuilder {
    /// Records currently being built, outermost first.
    in_progress: Vec<(&'static str, String)>,
}

impl SchemaBuilder {
    fn record(&mut self, record: &RecordDescriptor) -> Result<Schema, GenerateError> {
        if let Some(start) = self
            .in_progress
            .iter()
            .position(|(type_id, _)| *type_id == record.type_id)
        {
            let chain = self.in_progress[start..]
                .iter()
                .map(|(_, name)| name.as_str())
                .chain(std::iter::once(record.name.as_str()))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(GenerateError::CyclicType(chain));
        }

        self.in_progress.push((record.type_id, record.name.clone()));
        let result = self.record_fields(record);
        self.in_progress.pop();
        result
    }

    fn record_fields(&mut self, record: &RecordDescriptor) -> Result<Schema, GenerateError> {
        debug!(
            record = %record.name,
            members = record.members.len(),
            depth = self.in_progress.len(),
            "building schema"
        );

        let mut fields = BTreeMap::new();
        for member in &record.members {
            if member.visibility != Visibility::Public {
                debug!(record = %record.name, member = %member.ident, "skipping non-public member");
                continue;
            }

            let key = member.key();
            if fields.contains_key(key) {
                return Err(GenerateError::DuplicateField(key.to_string()));
            }

            let field = self.field(member).map_err(|err| err.in_field(key))?;
            fields.insert(key.to_string(), field);
        }

        Ok(Schema {
            name: record.name.clone(),
            fields,
        })
    }

    fn field(&mut self, member: &MemberDescriptor) -> Result<Field, GenerateError> {
        let (ty, nullable) = match member.type_descriptor() {
            TypeDescriptor::Optional(inner) => (*inner, true),
            other => (other, false),
        };

        let field_type = self.field_type(&ty)?;
        let constraints = member.constraints.clone().filter(|c| !c.is_empty());

        Ok(Field {
            field_type,
            nullable,
            overrides_on_null: false,
            constraints,
        })
    }

    fn field_type(&mut self, ty: &TypeDescriptor) -> Result<FieldType, GenerateError> {
        match ty {
            TypeDescriptor::Scalar(kind) if kind.is_text() => {
                Ok(FieldType::Primitive(PrimitiveType::String))
            }
            TypeDescriptor::Scalar(kind) if kind.is_numeric() => {
                Ok(FieldType::Primitive(PrimitiveType::Number))
            }
            TypeDescriptor::Scalar(Kind::Bool) => Ok(FieldType::Primitive(PrimitiveType::Boolean)),
            TypeDescriptor::Sequence { element, .. } => {
                let element_type = self.field_type(element).map_err(GenerateError::in_element)?;
                Ok(FieldType::array(element_type))
            }
            TypeDescriptor::Record(record) => Ok(FieldType::SubSchema(self.record(record)?)),
            other => Err(GenerateError::UnsupportedType(other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldConstraints;

    fn number() -> FieldType {
        FieldType::Primitive(PrimitiveType::Number)
    }

    #[test]
    fn test_map_type_primitives() {
        let text = FieldType::Primitive(PrimitiveType::String);
        assert_eq!(map_type(&String::describe()).unwrap(), text);
        assert_eq!(map_type(&<&str>::describe()).unwrap(), text);
        assert_eq!(map_type(&char::describe()).unwrap(), text);
        assert_eq!(
            map_type(&bool::describe()).unwrap(),
            FieldType::Primitive(PrimitiveType::Boolean)
        );

        let numerics = [
            i8::describe(),
            i16::describe(),
            i32::describe(),
            i64::describe(),
            i128::describe(),
            isize::describe(),
            u8::describe(),
            u16::describe(),
            u32::describe(),
            u64::describe(),
            u128::describe(),
            usize::describe(),
            f32::describe(),
            f64::describe(),
        ];
        for ty in &numerics {
            assert_eq!(map_type(ty).unwrap(), number(), "kind {}", ty.kind());
        }
    }

    #[test]
    fn test_map_type_sequences() {
        assert_eq!(
            map_type(&<[u16; 3]>::describe()).unwrap(),
            FieldType::array(number())
        );
        assert_eq!(
            map_type(&Vec::<Vec<bool>>::describe()).unwrap(),
            FieldType::array(FieldType::array(FieldType::Primitive(PrimitiveType::Boolean)))
        );
    }

    #[test]
    fn test_map_type_rejects_unsupported_kinds() {
        let cases = [
            (std::collections::HashMap::<String, u8>::describe(), Kind::Map),
            (<fn() -> u8>::describe(), Kind::Function),
            (std::sync::mpsc::Sender::<u8>::describe(), Kind::Channel),
            (serde_json::Value::describe(), Kind::Any),
            (<()>::describe(), Kind::Unit),
            (<(u8, u8)>::describe(), Kind::Tuple),
            (Option::<u8>::describe(), Kind::Optional),
        ];
        for (ty, kind) in cases {
            assert_eq!(map_type(&ty), Err(GenerateError::UnsupportedType(kind)));
        }
    }

    #[test]
    fn test_map_type_annotates_element_errors() {
        let err = map_type(&Vec::<Option<u8>>::describe()).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "[]");
        assert_eq!(err.root_cause(), &GenerateError::UnsupportedType(Kind::Optional));
    }

    #[test]
    fn test_map_field_nullability() {
        let plain = map_field(&MemberDescriptor::public::<u32>("count")).unwrap();
        assert!(!plain.nullable);
        assert_eq!(plain.field_type, number());

        let optional = map_field(&MemberDescriptor::public::<Option<u32>>("count")).unwrap();
        assert!(optional.nullable);
        assert_eq!(optional.field_type, number());
        assert!(!optional.overrides_on_null);
    }

    #[test]
    fn test_map_field_rejects_double_optional() {
        let err = map_field(&MemberDescriptor::public::<Option<Option<u32>>>("count")).unwrap_err();
        assert_eq!(err, GenerateError::UnsupportedType(Kind::Optional));
    }

    #[test]
    fn test_map_field_carries_constraints() {
        let member = MemberDescriptor::public::<String>("code").constraints(FieldConstraints {
            min_length: Some(2),
            max_length: Some(8),
            ..Default::default()
        });
        let field = map_field(&member).unwrap();
        let constraints = field.constraints.unwrap();
        assert_eq!(constraints.min_length, Some(2));
        assert_eq!(constraints.max_length, Some(8));

        let member = MemberDescriptor::public::<String>("code").constraints(FieldConstraints::default());
        assert!(map_field(&member).unwrap().constraints.is_none());
    }

    #[test]
    fn test_build_schema_root_checks() {
        assert_eq!(
            build_schema(&Vec::<u8>::describe()),
            Err(GenerateError::RootType(Kind::Vec))
        );

        struct Empty;
        let record: TypeDescriptor = RecordDescriptor::new::<Empty>("Empty").into();
        let schema = build_schema(&TypeDescriptor::optional(record.clone())).unwrap();
        assert_eq!(schema.name, "Empty");
        assert!(schema.is_empty());

        let twice = TypeDescriptor::optional(TypeDescriptor::optional(record));
        assert_eq!(
            build_schema(&twice),
            Err(GenerateError::RootType(Kind::Optional))
        );
    }

    #[test]
    fn test_build_schema_skips_non_public_members() {
        struct Account;
        let record: TypeDescriptor = RecordDescriptor::new::<Account>("Account")
            .member(MemberDescriptor::public::<String>("owner"))
            .member(MemberDescriptor::new::<u64>("balance", Visibility::Restricted))
            .member(MemberDescriptor::private::<String>("secret"))
            .into();

        let schema = build_schema(&record).unwrap();
        assert_eq!(schema.field_keys(), vec!["owner"]);
    }

    #[test]
    fn test_private_unsupported_member_is_ignored() {
        struct Cache;
        let record: TypeDescriptor = RecordDescriptor::new::<Cache>("Cache")
            .member(MemberDescriptor::public::<String>("name"))
            .member(MemberDescriptor::private::<std::collections::HashMap<String, String>>("entries"))
            .into();

        assert_eq!(build_schema(&record).unwrap().len(), 1);
    }

    #[test]
    fn test_build_schema_rejects_duplicate_keys() {
        struct Clash;
        let record: TypeDescriptor = RecordDescriptor::new::<Clash>("Clash")
            .member(MemberDescriptor::public::<String>("name"))
            .member(MemberDescriptor::public::<String>("display_name").alias("name,omitempty"))
            .into();

        assert_eq!(
            build_schema(&record),
            Err(GenerateError::DuplicateField("name".to_string()))
        );
    }

    #[test]
    fn test_build_schema_detects_self_reference() {
        struct Node;
        fn node() -> TypeDescriptor {
            RecordDescriptor::new::<Node>("Node")
                .member(MemberDescriptor::public::<String>("label"))
                .member(MemberDescriptor::with_type("next", Visibility::Public, || {
                    TypeDescriptor::optional(node())
                }))
                .into()
        }

        let err = build_schema(&node()).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "next");
        assert_eq!(
            err.root_cause(),
            &GenerateError::CyclicType("Node -> Node".to_string())
        );
    }

    #[test]
    fn test_same_record_twice_is_not_a_cycle() {
        struct Point;
        struct Line;
        fn point() -> TypeDescriptor {
            RecordDescriptor::new::<Point>("Point")
                .member(MemberDescriptor::public::<f64>("x"))
                .member(MemberDescriptor::public::<f64>("y"))
                .into()
        }

        let line: TypeDescriptor = RecordDescriptor::new::<Line>("Line")
            .member(MemberDescriptor::with_type("from", Visibility::Public, point))
            .member(MemberDescriptor::with_type("to", Visibility::Public, point))
            .into();

        let schema = build_schema(&line).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(
            schema.field("from").unwrap().field_type,
            schema.field("to").unwrap().field_type
        );
    }
}
