//! Compile-time type descriptors.
//!
//! Schema generation walks a [`TypeDescriptor`] instead of inspecting values
//! at runtime. Descriptors are produced by [`Describe`](crate::Describe)
//! implementations, either hand-written or generated by the
//! [`record!`](crate::record) macro.
//!
//! Record members hold their type lazily (`fn() -> TypeDescriptor`), so a
//! record that refers to itself can be described without recursing; the
//! generator detects the cycle instead.

use std::fmt;

use crate::FieldConstraints;

/// Diagnostic tag for a described type.
///
/// Every [`TypeDescriptor`] reports one kind; generation errors name the kind
/// that could not be mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Char,
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    /// Growable sequence (`Vec`, `VecDeque`, boxed slice).
    Vec,
    /// Fixed-size array `[T; N]`.
    Array,
    /// Borrowed slice `&[T]`.
    Slice,
    Optional,
    Map,
    Tuple,
    Record,
    Function,
    Channel,
    /// Dynamically typed value.
    Any,
    Unit,
}

impl Kind {
    /// Stable lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Char => "char",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Vec => "vec",
            Self::Array => "array",
            Self::Slice => "slice",
            Self::Optional => "optional",
            Self::Map => "map",
            Self::Tuple => "tuple",
            Self::Record => "record",
            Self::Function => "function",
            Self::Channel => "channel",
            Self::Any => "any",
            Self::Unit => "unit",
        }
    }

    /// Returns `true` for string-like kinds.
    pub fn is_text(self) -> bool {
        matches!(self, Self::String | Self::Char)
    }

    /// Returns `true` for every integer and floating-point kind.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::I128
                | Self::Isize
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::U128
                | Self::Usize
                | Self::F32
                | Self::F64
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Description of a Rust type, as seen by the schema generator.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// A leaf type with no inner types (numbers, text, bool, unit,
    /// functions, channels, dynamic values).
    Scalar(Kind),
    /// An ordered collection; `kind` is one of [`Kind::Vec`],
    /// [`Kind::Array`] or [`Kind::Slice`].
    Sequence {
        kind: Kind,
        element: Box<TypeDescriptor>,
    },
    /// A nullable wrapper around another type.
    Optional(Box<TypeDescriptor>),
    /// A key/value dictionary.
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    /// A tuple of heterogeneous items.
    Tuple(Vec<TypeDescriptor>),
    /// A structured record with named members.
    Record(RecordDescriptor),
}

impl TypeDescriptor {
    /// Creates a sequence descriptor.
    pub fn sequence(kind: Kind, element: TypeDescriptor) -> Self {
        Self::Sequence {
            kind,
            element: Box::new(element),
        }
    }

    /// Creates an optional descriptor.
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Creates a map descriptor.
    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Returns the diagnostic kind of this descriptor.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Scalar(kind) | Self::Sequence { kind, .. } => *kind,
            Self::Optional(_) => Kind::Optional,
            Self::Map { .. } => Kind::Map,
            Self::Tuple(_) => Kind::Tuple,
            Self::Record(_) => Kind::Record,
        }
    }

    /// Returns the record descriptor, if this describes a record.
    pub fn as_record(&self) -> Option<&RecordDescriptor> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<RecordDescriptor> for TypeDescriptor {
    fn from(record: RecordDescriptor) -> Self {
        Self::Record(record)
    }
}

/// Visibility of a record member.
///
/// Only [`Public`](Visibility::Public) members are part of a record's
/// exported contract and appear in generated schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Declared `pub`.
    Public,
    /// Declared `pub(crate)`, `pub(super)` or `pub(in ..)`.
    Restricted,
    /// No visibility modifier.
    #[default]
    Private,
}

impl Visibility {
    /// Classifies a visibility as written in source (`"pub"`,
    /// `"pub(crate)"`, `""`).
    ///
    /// # Examples
    ///
    /// ```
    /// use graveyard_schema_core::Visibility;
    ///
    /// assert_eq!(Visibility::from_source("pub"), Visibility::Public);
    /// assert_eq!(Visibility::from_source("pub(crate)"), Visibility::Restricted);
    /// assert_eq!(Visibility::from_source(""), Visibility::Private);
    /// ```
    pub fn from_source(vis: &str) -> Self {
        let vis: String = vis.chars().filter(|c| !c.is_whitespace()).collect();
        match vis.as_str() {
            "" => Self::Private,
            "pub" => Self::Public,
            _ => Self::Restricted,
        }
    }
}

/// One declared member of a record.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::{MemberDescriptor, Visibility};
///
/// let member = MemberDescriptor::public::<String>("name").alias("full_name,omitempty");
/// assert_eq!(member.ident, "name");
/// assert_eq!(member.visibility, Visibility::Public);
/// assert_eq!(member.alias.as_deref(), Some("full_name,omitempty"));
/// ```
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    /// Raw member identifier.
    pub ident: String,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Raw serialization-alias annotation, e.g. `"full_name,omitempty"`.
    pub alias: Option<String>,
    /// Declared value constraints.
    pub constraints: Option<FieldConstraints>,
    ty: fn() -> TypeDescriptor,
}

impl MemberDescriptor {
    /// Creates a member whose type is described by `T`.
    pub fn new<T: crate::Describe>(ident: impl Into<String>, visibility: Visibility) -> Self {
        Self::with_type(ident, visibility, T::describe)
    }

    /// Creates a member from an explicit descriptor function.
    pub fn with_type(
        ident: impl Into<String>,
        visibility: Visibility,
        ty: fn() -> TypeDescriptor,
    ) -> Self {
        Self {
            ident: ident.into(),
            visibility,
            alias: None,
            constraints: None,
            ty,
        }
    }

    /// Creates a `pub` member.
    pub fn public<T: crate::Describe>(ident: impl Into<String>) -> Self {
        Self::new::<T>(ident, Visibility::Public)
    }

    /// Creates a private member.
    pub fn private<T: crate::Describe>(ident: impl Into<String>) -> Self {
        Self::new::<T>(ident, Visibility::Private)
    }

    /// Sets the serialization-alias annotation.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the member's constraints.
    pub fn constraints(mut self, constraints: FieldConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Describes the member's declared type.
    pub fn type_descriptor(&self) -> TypeDescriptor {
        (self.ty)()
    }

    /// Resolves the member's external key.
    ///
    /// A present, non-empty alias other than the skip sentinel `"-"`
    /// contributes its first comma-delimited segment; an empty segment (as in
    /// `",omitempty"`) falls back to the raw identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use graveyard_schema_core::MemberDescriptor;
    ///
    /// let m = MemberDescriptor::public::<u32>("Age");
    /// assert_eq!(m.key(), "Age");
    /// assert_eq!(m.clone().alias("age,omitempty").key(), "age");
    /// assert_eq!(m.clone().alias(",omitempty").key(), "Age");
    /// assert_eq!(m.alias("-").key(), "Age");
    /// ```
    pub fn key(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() && alias != "-" => {
                match alias.split(',').next() {
                    Some(segment) if !segment.is_empty() => segment,
                    _ => &self.ident,
                }
            }
            _ => &self.ident,
        }
    }
}

/// Description of a record type and its members.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::{MemberDescriptor, RecordDescriptor};
///
/// struct Address;
///
/// let record = RecordDescriptor::new::<Address>("Address")
///     .member(MemberDescriptor::public::<String>("street"))
///     .member(MemberDescriptor::public::<String>("city"));
///
/// assert_eq!(record.name, "Address");
/// assert_eq!(record.members.len(), 2);
/// assert!(record.type_id.ends_with("Address"));
/// ```
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    /// Declared type name; becomes the schema name.
    pub name: String,
    /// Fully qualified type identity, used for cycle detection.
    pub type_id: &'static str,
    /// Members in declaration order.
    pub members: Vec<MemberDescriptor>,
}

impl RecordDescriptor {
    /// Creates an empty record descriptor for `T`.
    pub fn new<T: ?Sized>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: std::any::type_name::<T>(),
            members: Vec::new(),
        }
    }

    /// Appends a member.
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }
}
