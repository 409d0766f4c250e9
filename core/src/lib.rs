//! Schema model and schema generation for event payload validation.
//!
//! This crate turns Rust record types into the canonical schema description
//! the event store uses to validate payloads:
//!
//! - [`Schema`]: a named map of [`Field`]s.
//! - [`Field`]: a [`FieldType`] plus nullability and optional constraints.
//! - [`FieldType`]: a primitive (`STRING`, `NUMBER`, `BOOLEAN`), an array,
//!   or a nested sub-schema.
//! - [`SchemaBundle`]: a versioned set of schemas for distribution.
//!
//! Types describe themselves through the [`Describe`] trait, implemented for
//! standard types and generated for records by the [`record!`] macro.
//! [`generate`] walks the descriptor and builds the schema; validation
//! ([`validate_schema`], [`validate_bundle`]) checks schema values that were
//! loaded from elsewhere.
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
//!     pub struct ValidationStruct {
//!         pub name: String => "full_name",
//!         pub age: i64,
//!         pub active: bool,
//!         pub tags: Vec<String>,
//!         pub address: Option<Address>,
//!     }
//! }
//!
//! let schema = generate::<ValidationStruct>().unwrap();
//! assert_eq!(schema.name, "ValidationStruct");
//! assert_eq!(schema.len(), 5);
//! assert!(schema.field("full_name").is_some());
//! assert!(schema.field("address").unwrap().nullable);
//! assert!(validate_schema(&schema).is_empty());
//! ```

mod bundle;
mod describe;
mod descriptor;
mod error;
mod generate;
mod types;
mod validate;

pub use bundle::SchemaBundle;
pub use describe::Describe;
pub use descriptor::{Kind, MemberDescriptor, RecordDescriptor, TypeDescriptor, Visibility};
pub use error::{FieldPath, GenerateError, PathSegment};
pub use generate::{build_schema, generate, map_field, map_type};
pub use types::*;
pub use validate::{ValidationError, validate_bundle, validate_schema};
