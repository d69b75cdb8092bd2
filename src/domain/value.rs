// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed option values.
//!
//! [`Value`] is the closed set of shapes an option can hold. [`FromValue`] extracts
//! a Rust type from a value after lossless coercion, which is what the typed
//! accessors build on.

use crate::domain::errors::{RegistryError, Result};
use crate::domain::value_type::{ScalarKind, ValueType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A typed option value.
///
/// # Examples
///
/// ```
/// use optreg::domain::Value;
///
/// let port = Value::from(8080i64);
/// assert_eq!(port.type_name(), "i64");
///
/// let hosts = Value::from(vec!["a", "b"]);
/// assert_eq!(hosts.type_name(), "[]string");
/// assert_eq!(hosts.to_string(), "a,b");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
    /// A signed 8-bit integer.
    I8(i8),
    /// A signed 16-bit integer.
    I16(i16),
    /// A signed 32-bit integer.
    I32(i32),
    /// A signed 64-bit integer.
    I64(i64),
    /// An unsigned 8-bit integer.
    U8(u8),
    /// An unsigned 16-bit integer.
    U16(u16),
    /// An unsigned 32-bit integer.
    U32(u32),
    /// An unsigned 64-bit integer.
    U64(u64),
    /// A 32-bit float.
    F32(f32),
    /// A 64-bit float.
    F64(f64),
    /// A span of time.
    Duration(Duration),
    /// A point in time, in UTC.
    Timestamp(DateTime<Utc>),
    /// A homogeneous sequence of scalars.
    List(Vec<Value>),
}

impl Value {
    /// Returns the scalar kind of this value, or `None` for a list.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        let kind = match self {
            Value::Bool(_) => ScalarKind::Bool,
            Value::String(_) => ScalarKind::String,
            Value::I8(_) => ScalarKind::I8,
            Value::I16(_) => ScalarKind::I16,
            Value::I32(_) => ScalarKind::I32,
            Value::I64(_) => ScalarKind::I64,
            Value::U8(_) => ScalarKind::U8,
            Value::U16(_) => ScalarKind::U16,
            Value::U32(_) => ScalarKind::U32,
            Value::U64(_) => ScalarKind::U64,
            Value::F32(_) => ScalarKind::F32,
            Value::F64(_) => ScalarKind::F64,
            Value::Duration(_) => ScalarKind::Duration,
            Value::Timestamp(_) => ScalarKind::Timestamp,
            Value::List(_) => return None,
        };
        Some(kind)
    }

    /// Returns a display name for the shape of this value.
    ///
    /// Lists are named after their first element; an empty list is `[]`.
    pub fn type_name(&self) -> String {
        match self {
            Value::List(items) => match items.first().and_then(Value::scalar_kind) {
                Some(kind) => ValueType::Sequence(kind).to_string(),
                None => "[]".to_string(),
            },
            scalar => scalar
                .scalar_kind()
                .map(|kind| kind.name().to_string())
                .unwrap_or_default(),
        }
    }

    /// Reports whether this value already has exactly the given type.
    pub fn conforms_to(&self, value_type: ValueType) -> bool {
        match (self, value_type) {
            (Value::List(items), ValueType::Sequence(kind)) => items
                .iter()
                .all(|item| item.scalar_kind() == Some(kind)),
            (scalar, ValueType::Scalar(kind)) => scalar.scalar_kind() == Some(kind),
            _ => false,
        }
    }

    /// Returns the string slice if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an `i128` if it is an integer of any width.
    pub(crate) fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::I8(n) => Some(n.into()),
            Value::I16(n) => Some(n.into()),
            Value::I32(n) => Some(n.into()),
            Value::I64(n) => Some(n.into()),
            Value::U8(n) => Some(n.into()),
            Value::U16(n) => Some(n.into()),
            Value::U32(n) => Some(n.into()),
            Value::U64(n) => Some(n.into()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
            Value::I8(n) => write!(f, "{}", n),
            Value::I16(n) => write!(f, "{}", n),
            Value::I32(n) => write!(f, "{}", n),
            Value::I64(n) => write!(f, "{}", n),
            Value::U8(n) => write!(f, "{}", n),
            Value::U16(n) => write!(f, "{}", n),
            Value::U32(n) => write!(f, "{}", n),
            Value::U64(n) => write!(f, "{}", n),
            Value::F32(n) => write!(f, "{}", n),
            Value::F64(n) => write!(f, "{}", n),
            Value::Duration(d) => write!(f, "{:?}", d),
            Value::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Extraction of a Rust type from a [`Value`].
///
/// Implemented for every supported scalar type and for `Vec` of each. The
/// accessors coerce the stored value to [`FromValue::VALUE_TYPE`] first, so an
/// `i32` option can be read as `i64` but a `u64` holding `300` cannot be read as
/// `u8`.
pub trait FromValue: Sized {
    /// The value type this Rust type corresponds to.
    const VALUE_TYPE: ValueType;

    /// Takes the value apart if it has exactly [`FromValue::VALUE_TYPE`].
    fn from_exact(value: Value) -> Option<Self>;

    /// Coerces `value` to [`FromValue::VALUE_TYPE`] and extracts it.
    ///
    /// # Examples
    ///
    /// ```
    /// use optreg::domain::{FromValue, Value};
    ///
    /// assert_eq!(i64::from_value(&Value::I32(7)).unwrap(), 7);
    /// assert!(u8::from_value(&Value::U64(300)).is_err());
    /// ```
    fn from_value(value: &Value) -> Result<Self> {
        let coerced = Self::VALUE_TYPE.coerce(value.clone())?;
        let actual = coerced.type_name();
        Self::from_exact(coerced).ok_or_else(|| RegistryError::TypeMismatch {
            expected: Self::VALUE_TYPE.to_string(),
            actual,
        })
    }
}

macro_rules! value_kinds {
    ($($ty:ty => $variant:ident, $kind:ident;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $ty {
                const VALUE_TYPE: ValueType = ValueType::Scalar(ScalarKind::$kind);

                fn from_exact(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl FromValue for Vec<$ty> {
                const VALUE_TYPE: ValueType = ValueType::Sequence(ScalarKind::$kind);

                fn from_exact(value: Value) -> Option<Self> {
                    match value {
                        Value::List(items) => items
                            .into_iter()
                            .map(<$ty as FromValue>::from_exact)
                            .collect(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

value_kinds! {
    bool => Bool, Bool;
    String => String, String;
    i8 => I8, I8;
    i16 => I16, I16;
    i32 => I32, I32;
    i64 => I64, I64;
    u8 => U8, U8;
    u16 => U16, U16;
    u32 => U32, U32;
    u64 => U64, U64;
    f32 => F32, F32;
    f64 => F64, F64;
    Duration => Duration, Duration;
    DateTime<Utc> => Timestamp, Timestamp;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from(true).type_name(), "bool");
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::from(1u16).type_name(), "u16");
        assert_eq!(Value::from(vec![1i64, 2]).type_name(), "[]i64");
        assert_eq!(Value::List(vec![]).type_name(), "[]");
    }

    #[test]
    fn test_conforms_to() {
        let list = Value::from(vec![1u32, 2]);
        assert!(list.conforms_to(ValueType::Sequence(ScalarKind::U32)));
        assert!(!list.conforms_to(ValueType::Sequence(ScalarKind::U64)));
        assert!(!list.conforms_to(ValueType::Scalar(ScalarKind::U32)));
        assert!(Value::List(vec![]).conforms_to(ValueType::Sequence(ScalarKind::Bool)));

        let mixed = Value::List(vec![Value::I64(1), Value::from("a")]);
        assert!(!mixed.conforms_to(ValueType::Sequence(ScalarKind::I64)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(3.5f64).to_string(), "3.5");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "a,b");
        assert_eq!(Value::from(Duration::from_millis(1500)).to_string(), "1.5s");
    }

    #[test]
    fn test_from_exact_scalars() {
        assert_eq!(bool::from_exact(Value::Bool(true)), Some(true));
        assert_eq!(i64::from_exact(Value::I32(1)), None);
        assert_eq!(String::from_exact(Value::from("x")), Some("x".to_string()));
    }

    #[test]
    fn test_from_value_widens_integers() {
        assert_eq!(i64::from_value(&Value::U8(200)).unwrap(), 200);
        assert_eq!(u16::from_value(&Value::I64(65535)).unwrap(), 65535);
    }

    #[test]
    fn test_from_value_rejects_truncation() {
        assert!(i8::from_value(&Value::I64(128)).is_err());
        assert!(u32::from_value(&Value::I32(-1)).is_err());
        assert!(f32::from_value(&Value::F64(0.1)).is_err());
    }

    #[test]
    fn test_from_value_sequences() {
        let list = Value::from(vec![1i32, 2, 3]);
        assert_eq!(Vec::<i64>::from_value(&list).unwrap(), vec![1, 2, 3]);
        assert!(Vec::<bool>::from_value(&list).is_err());
    }

    #[test]
    fn test_from_value_mismatch() {
        let err = bool::from_value(&Value::from(Duration::from_secs(1))).unwrap_err();
        assert!(matches!(err, RegistryError::TypeMismatch { .. }));
    }
}
