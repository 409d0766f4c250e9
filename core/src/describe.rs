//! The [`Describe`] trait and its implementations for standard types.
//!
//! Records implement [`Describe`] by hand with [`RecordDescriptor`] or
//! through the [`record!`](crate::record) macro.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, SyncSender};

use crate::descriptor::{Kind, TypeDescriptor};

/// Types that can describe their own shape for schema generation.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::{Describe, Kind, TypeDescriptor};
///
/// assert_eq!(u16::describe().kind(), Kind::U16);
/// assert_eq!(Vec::<String>::describe().kind(), Kind::Vec);
/// assert!(matches!(Option::<bool>::describe(), TypeDescriptor::Optional(_)));
/// ```
///
/// A hand-written record:
///
/// ```
/// use graveyard_schema_core::{Describe, MemberDescriptor, RecordDescriptor, TypeDescriptor};
///
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// impl Describe for Point {
///     fn describe() -> TypeDescriptor {
///         RecordDescriptor::new::<Self>("Point")
///             .member(MemberDescriptor::public::<f64>("x"))
///             .member(MemberDescriptor::public::<f64>("y"))
///             .into()
///     }
/// }
///
/// let schema = graveyard_schema_core::generate::<Point>().unwrap();
/// assert_eq!(schema.len(), 2);
/// ```
pub trait Describe {
    /// Returns the descriptor for this type.
    fn describe() -> TypeDescriptor;
}

macro_rules! impl_describe_scalar {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Scalar(Kind::$kind)
                }
            }
        )+
    };
}

impl_describe_scalar! {
    String => String,
    &str => String,
    Cow<'_, str> => String,
    Box<str> => String,
    char => Char,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    () => Unit,
    serde_json::Value => Any,
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(Kind::Vec, T::describe())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(Kind::Vec, T::describe())
    }
}

impl<T: Describe> Describe for Box<[T]> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(Kind::Vec, T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(Kind::Array, T::describe())
    }
}

impl<T: Describe> Describe for &[T] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(Kind::Slice, T::describe())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

// Owning pointers are not nullable, so they describe as their target.
impl<T: Describe> Describe for Box<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe> Describe for Rc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map(K::describe(), V::describe())
    }
}

macro_rules! impl_describe_tuple {
    ($($name:ident),+) => {
        impl<$($name: Describe),+> Describe for ($($name,)+) {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::Tuple(vec![$($name::describe()),+])
            }
        }
    };
}

impl_describe_tuple!(A);
impl_describe_tuple!(A, B);
impl_describe_tuple!(A, B, C);
impl_describe_tuple!(A, B, C, D);

macro_rules! impl_describe_fn {
    ($($arg:ident),*) => {
        impl<R $(, $arg)*> Describe for fn($($arg),*) -> R {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::Scalar(Kind::Function)
            }
        }
    };
}

impl_describe_fn!();
impl_describe_fn!(A);
impl_describe_fn!(A, B);

impl<T> Describe for Sender<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Scalar(Kind::Channel)
    }
}

impl<T> Describe for SyncSender<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Scalar(Kind::Channel)
    }
}

impl<T> Describe for Receiver<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Scalar(Kind::Channel)
    }
}

/// Declares a struct together with its [`Describe`] implementation.
///
/// Each field's declared visibility decides whether it is part of the
/// generated schema (only `pub` fields are). An optional `=> "alias"` after
/// the field type records the serialization-alias annotation used as the
/// field key. A trailing `{ ... }` clause attaches [`FieldConstraints`]
/// (`required`, `min_value`, `max_value`, `min_length`, `max_length`,
/// `regex`). Generic structs are not supported.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::{generate, record, PrimitiveType};
///
/// record! {
///     #[derive(Debug, Default)]
///     pub struct Customer {
///         pub name: String => "full_name,omitempty",
///         pub age: u32,
///         pub nickname: Option<String>,
///         internal_id: u64,
///     }
/// }
///
/// let schema = generate::<Customer>().unwrap();
/// assert_eq!(schema.name, "Customer");
/// assert_eq!(schema.field_keys(), vec!["age", "full_name", "nickname"]);
/// assert!(schema.field("nickname").unwrap().nullable);
/// assert_eq!(
///     schema.field("age").unwrap().field_type.as_primitive(),
///     Some(PrimitiveType::Number)
/// );
/// ```
///
/// With constraints:
///
/// ```
/// use graveyard_schema_core::{generate, record, validate_schema};
///
/// record! {
///     pub struct Sku {
///         pub code: String => "code" { required: true, min_length: 2, regex: "^[A-Z]+$" },
///         pub price: f64 { min_value: 0, max_value: 10_000 },
///     }
/// }
///
/// let schema = generate::<Sku>().unwrap();
/// let code = schema.field("code").unwrap().constraints.as_ref().unwrap();
/// assert_eq!(code.min_length, Some(2));
/// assert_eq!(code.regex.as_deref(), Some("^[A-Z]+$"));
/// let price = schema.field("price").unwrap().constraints.as_ref().unwrap();
/// assert_eq!(price.max_value, Some(10_000.0));
/// assert!(validate_schema(&schema).is_empty());
/// ```
///
/// [`FieldConstraints`]: crate::FieldConstraints
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $field_ty:ty $(=> $alias:literal)?
                $({ $($key:ident : $value:expr),* $(,)? })?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $field_ty,
            )*
        }

        impl $crate::Describe for $name {
            fn describe() -> $crate::TypeDescriptor {
                $crate::RecordDescriptor::new::<$name>(stringify!($name))
                    $(
                        .member({
                            let member = $crate::MemberDescriptor::new::<$field_ty>(
                                stringify!($field),
                                $crate::Visibility::from_source(stringify!($field_vis)),
                            );
                            $(let member = member.alias($alias);)?
                            $(
                                let member = member.constraints({
                                    #[allow(unused_mut)]
                                    let mut constraints = $crate::FieldConstraints::default();
                                    $($crate::__record_constraint!(constraints, $key, $value);)*
                                    constraints
                                });
                            )?
                            member
                        })
                    )*
                    .into()
            }
        }
    };
}

/// Sets one constraint inside [`record!`](crate::record). Unknown keys fail
/// to compile.
#[doc(hidden)]
#[macro_export]
macro_rules! __record_constraint {
    ($c:ident, required, $v:expr) => {
        $c.required = $v;
    };
    ($c:ident, min_value, $v:expr) => {
        $c.min_value = Some($v as f64);
    };
    ($c:ident, max_value, $v:expr) => {
        $c.max_value = Some($v as f64);
    };
    ($c:ident, min_length, $v:expr) => {
        $c.min_length = Some($v as i32);
    };
    ($c:ident, max_length, $v:expr) => {
        $c.max_length = Some($v as i32);
    };
    ($c:ident, regex, $v:expr) => {
        $c.regex = Some(::std::string::String::from($v));
    };
}
