// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declared option types.
//!
//! An option's [`ValueType`] is fixed when the option is defined. It decides how
//! raw text is converted, what a written value may be coerced into, and what the
//! zero value is.

use crate::domain::convert::{parse_bool, parse_duration, parse_timestamp, split_list};
use crate::domain::errors::{RegistryError, Result};
use crate::domain::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The scalar kinds an option (or a sequence element) can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// `String`
    String,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `std::time::Duration`
    Duration,
    /// `chrono::DateTime<Utc>`
    Timestamp,
}

impl ScalarKind {
    /// Every supported scalar kind.
    pub const ALL: [ScalarKind; 14] = [
        ScalarKind::Bool,
        ScalarKind::String,
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::U8,
        ScalarKind::U16,
        ScalarKind::U32,
        ScalarKind::U64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::Duration,
        ScalarKind::Timestamp,
    ];

    /// Returns the canonical name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Duration => "duration",
            ScalarKind::Timestamp => "timestamp",
        }
    }

    fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarKind::I8
                | ScalarKind::I16
                | ScalarKind::I32
                | ScalarKind::I64
                | ScalarKind::U8
                | ScalarKind::U16
                | ScalarKind::U32
                | ScalarKind::U64
        )
    }

    /// Converts raw text into a value of this kind.
    pub fn parse_text(self, raw: &str) -> Result<Value> {
        let text = raw.trim();
        let target = self.name();
        let value = match self {
            ScalarKind::Bool => Value::Bool(parse_bool(text)?),
            // strings keep their surrounding whitespace
            ScalarKind::String => Value::String(raw.to_string()),
            ScalarKind::I8 => Value::I8(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_int_error(raw, target, e))?,
            ),
            ScalarKind::I16 => Value::I16(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_int_error(raw, target, e))?,
            ),
            ScalarKind::I32 => Value::I32(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_int_error(raw, target, e))?,
            ),
            ScalarKind::I64 => Value::I64(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_int_error(raw, target, e))?,
            ),
            ScalarKind::U8 => Value::U8(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_int_error(raw, target, e))?,
            ),
            ScalarKind::U16 => Value::U16(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_int_error(raw, target, e))?,
            ),
            ScalarKind::U32 => Value::U32(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_int_error(raw, target, e))?,
            ),
            ScalarKind::U64 => Value::U64(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_int_error(raw, target, e))?,
            ),
            ScalarKind::F32 => Value::F32(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_float_error(raw, target, e))?,
            ),
            ScalarKind::F64 => Value::F64(
                text.parse()
                    .map_err(|e| RegistryError::from_parse_float_error(raw, target, e))?,
            ),
            ScalarKind::Duration => Value::Duration(parse_duration(text)?),
            ScalarKind::Timestamp => Value::Timestamp(parse_timestamp(text)?),
        };
        Ok(value)
    }

    /// Returns the zero value of this kind.
    pub fn zero_value(self) -> Value {
        match self {
            ScalarKind::Bool => Value::Bool(false),
            ScalarKind::String => Value::String(String::new()),
            ScalarKind::I8 => Value::I8(0),
            ScalarKind::I16 => Value::I16(0),
            ScalarKind::I32 => Value::I32(0),
            ScalarKind::I64 => Value::I64(0),
            ScalarKind::U8 => Value::U8(0),
            ScalarKind::U16 => Value::U16(0),
            ScalarKind::U32 => Value::U32(0),
            ScalarKind::U64 => Value::U64(0),
            ScalarKind::F32 => Value::F32(0.0),
            ScalarKind::F64 => Value::F64(0.0),
            ScalarKind::Duration => Value::Duration(Duration::ZERO),
            ScalarKind::Timestamp => Value::Timestamp(DateTime::<Utc>::default()),
        }
    }

    /// Coerces a scalar value into this kind without losing information.
    ///
    /// Text is parsed, integers convert between widths when in range, integers and
    /// floats convert to floats when exactly representable, and any scalar can
    /// become a string.
    pub fn coerce(self, value: Value) -> Result<Value> {
        if value.scalar_kind() == Some(self) {
            return Ok(value);
        }
        if let Value::String(text) = &value {
            return self.parse_text(text);
        }
        if let Value::List(_) = value {
            return Err(self.mismatch(&value));
        }
        if self == ScalarKind::String {
            return Ok(Value::String(value.to_string()));
        }

        if self.is_integer() {
            if let Some(n) = value.as_integer() {
                return self.integer_from(n).ok_or_else(|| {
                    RegistryError::conversion(value.to_string(), self.name(), "out of range")
                });
            }
        }

        match (self, &value) {
            (ScalarKind::F64, Value::F32(f)) => Ok(Value::F64(f64::from(*f))),
            (ScalarKind::F32, Value::F64(f)) => {
                let narrowed = *f as f32;
                if f64::from(narrowed) == *f || f.is_nan() {
                    Ok(Value::F32(narrowed))
                } else {
                    Err(RegistryError::conversion(
                        value.to_string(),
                        self.name(),
                        "not exactly representable",
                    ))
                }
            }
            (ScalarKind::F32 | ScalarKind::F64, _) => match value.as_integer() {
                Some(n) => self.float_from(n).ok_or_else(|| {
                    RegistryError::conversion(
                        value.to_string(),
                        self.name(),
                        "not exactly representable",
                    )
                }),
                None => Err(self.mismatch(&value)),
            },
            _ => Err(self.mismatch(&value)),
        }
    }

    fn integer_from(self, n: i128) -> Option<Value> {
        let value = match self {
            ScalarKind::I8 => Value::I8(i8::try_from(n).ok()?),
            ScalarKind::I16 => Value::I16(i16::try_from(n).ok()?),
            ScalarKind::I32 => Value::I32(i32::try_from(n).ok()?),
            ScalarKind::I64 => Value::I64(i64::try_from(n).ok()?),
            ScalarKind::U8 => Value::U8(u8::try_from(n).ok()?),
            ScalarKind::U16 => Value::U16(u16::try_from(n).ok()?),
            ScalarKind::U32 => Value::U32(u32::try_from(n).ok()?),
            ScalarKind::U64 => Value::U64(u64::try_from(n).ok()?),
            _ => return None,
        };
        Some(value)
    }

    fn float_from(self, n: i128) -> Option<Value> {
        match self {
            ScalarKind::F32 => {
                let f = n as f32;
                (f as i128 == n).then_some(Value::F32(f))
            }
            ScalarKind::F64 => {
                let f = n as f64;
                (f as i128 == n).then_some(Value::F64(f))
            }
            _ => None,
        }
    }

    fn mismatch(self, value: &Value) -> RegistryError {
        RegistryError::TypeMismatch {
            expected: self.name().to_string(),
            actual: value.type_name(),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declared type of an option: a scalar or a homogeneous sequence of scalars.
///
/// # Examples
///
/// ```
/// use optreg::domain::{ScalarKind, Value, ValueType};
///
/// let ty: ValueType = "[]u16".parse().unwrap();
/// assert_eq!(ty, ValueType::Sequence(ScalarKind::U16));
///
/// let value = ty.parse_text("80, 443").unwrap();
/// assert_eq!(value, Value::from(vec![80u16, 443]));
///
/// assert!("map".parse::<ValueType>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// A single value of the given kind.
    Scalar(ScalarKind),
    /// A sequence of values of the given kind.
    Sequence(ScalarKind),
}

impl ValueType {
    /// Returns the scalar kind (the element kind for sequences).
    pub fn kind(self) -> ScalarKind {
        match self {
            ValueType::Scalar(kind) | ValueType::Sequence(kind) => kind,
        }
    }

    /// Reports whether this is a sequence type.
    pub fn is_sequence(self) -> bool {
        matches!(self, ValueType::Sequence(_))
    }

    /// Converts raw text into a value of this type.
    ///
    /// Sequences are read from comma-separated text.
    pub fn parse_text(self, raw: &str) -> Result<Value> {
        match self {
            ValueType::Scalar(kind) => kind.parse_text(raw),
            ValueType::Sequence(kind) => split_list(raw)
                .into_iter()
                .map(|item| kind.parse_text(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
        }
    }

    /// Returns the zero value: the scalar zero, or an empty sequence.
    pub fn zero_value(self) -> Value {
        match self {
            ValueType::Scalar(kind) => kind.zero_value(),
            ValueType::Sequence(_) => Value::List(Vec::new()),
        }
    }

    /// Coerces a value into this type without losing information.
    ///
    /// A string written to a sequence type is split on commas; list elements are
    /// coerced one by one.
    pub fn coerce(self, value: Value) -> Result<Value> {
        if value.conforms_to(self) {
            return Ok(value);
        }
        match (self, value) {
            (ValueType::Scalar(kind), value) => kind.coerce(value),
            (ValueType::Sequence(_), Value::String(text)) => self.parse_text(&text),
            (ValueType::Sequence(kind), Value::List(items)) => items
                .into_iter()
                .map(|item| kind.coerce(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            (ValueType::Sequence(_), value) => Err(RegistryError::TypeMismatch {
                expected: self.to_string(),
                actual: value.type_name(),
            }),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(kind) => f.write_str(kind.name()),
            ValueType::Sequence(kind) => write!(f, "[]{}", kind.name()),
        }
    }
}

impl FromStr for ValueType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let (sequence, scalar) = match name.strip_prefix("[]") {
            Some(inner) => (true, inner),
            None => (false, name),
        };
        let kind = match scalar {
            "bool" => ScalarKind::Bool,
            "string" | "str" => ScalarKind::String,
            "i8" | "int8" => ScalarKind::I8,
            "i16" | "int16" => ScalarKind::I16,
            "i32" | "int32" => ScalarKind::I32,
            "i64" | "int64" | "int" => ScalarKind::I64,
            "u8" | "uint8" => ScalarKind::U8,
            "u16" | "uint16" => ScalarKind::U16,
            "u32" | "uint32" => ScalarKind::U32,
            "u64" | "uint64" | "uint" => ScalarKind::U64,
            "f32" | "float32" => ScalarKind::F32,
            "f64" | "float64" | "float" => ScalarKind::F64,
            "duration" => ScalarKind::Duration,
            "timestamp" | "time" => ScalarKind::Timestamp,
            _ => {
                return Err(RegistryError::UnsupportedType {
                    name: s.to_string(),
                })
            }
        };
        Ok(if sequence {
            ValueType::Sequence(kind)
        } else {
            ValueType::Scalar(kind)
        })
    }
}
