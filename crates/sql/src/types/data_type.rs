//! SQL data types
//!
//! A `DataType` describes the static type of an expression. Every type
//! knows how to convert a raw value into itself and how to order two
//! values that already belong to it. NULL never reaches the type layer:
//! the comparison kernel handles it first, and `convert` passes it
//! through untouched.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::coercion;
use crate::error::{Error, Result};
use crate::types::Value;

/// SQL data types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Null,
    Bool,
    I64,
    U64,
    F64,
    Decimal,
    Text,
    Bytea,
    Date,
    Time,
    Timestamp,
    Tuple(Vec<DataType>),
}

impl DataType {
    /// Check if this type is numeric (integer, float, or decimal)
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::I64 | DataType::U64 | DataType::F64 | DataType::Decimal
        )
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, DataType::I64)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, DataType::U64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::F64)
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, DataType::Decimal)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DataType::Text)
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, DataType::Tuple(_))
    }

    /// Coerce a raw value to this type. NULL converts to NULL for every
    /// type; anything else either becomes a value of this type or fails
    /// with a typed conversion error.
    pub fn convert(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self {
            DataType::Null => Err(Error::TypeMismatch {
                expected: "NULL".into(),
                found: value.data_type().to_string(),
            }),
            DataType::Bool => match value {
                Value::Bool(b) => Ok(Value::Bool(b)),
                Value::I64(i) => Ok(Value::Bool(i != 0)),
                Value::U64(u) => Ok(Value::Bool(u != 0)),
                Value::F64(n) => Ok(Value::Bool(n != 0.0)),
                other => Err(Error::TypeMismatch {
                    expected: "BOOLEAN".into(),
                    found: other.data_type().to_string(),
                }),
            },
            DataType::I64 => coercion::to_signed(value),
            DataType::U64 => coercion::to_unsigned(value),
            DataType::F64 => coercion::to_double(value),
            DataType::Decimal => coercion::to_decimal(value),
            DataType::Text => coercion::to_text(value),
            DataType::Bytea => match value {
                Value::Bytea(b) => Ok(Value::Bytea(b)),
                Value::Str(s) => Ok(Value::Bytea(s.into_bytes())),
                other => Err(Error::TypeMismatch {
                    expected: "BYTEA".into(),
                    found: other.data_type().to_string(),
                }),
            },
            DataType::Date => match value {
                Value::Date(d) => Ok(Value::Date(d)),
                Value::Str(s) => s
                    .parse()
                    .map(Value::Date)
                    .map_err(|_| Error::InvalidValue(format!("invalid date: '{}'", s))),
                other => Err(Error::TypeMismatch {
                    expected: "DATE".into(),
                    found: other.data_type().to_string(),
                }),
            },
            DataType::Time => match value {
                Value::Time(t) => Ok(Value::Time(t)),
                Value::Str(s) => s
                    .parse()
                    .map(Value::Time)
                    .map_err(|_| Error::InvalidValue(format!("invalid time: '{}'", s))),
                other => Err(Error::TypeMismatch {
                    expected: "TIME".into(),
                    found: other.data_type().to_string(),
                }),
            },
            DataType::Timestamp => match value {
                Value::Timestamp(ts) => Ok(Value::Timestamp(ts)),
                Value::Date(d) => Ok(Value::Timestamp(d.and_time(NaiveTime::MIN))),
                // Accept both the SQL space-separated form and the ISO
                // 'T' form.
                Value::Str(s) => NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                    .or_else(|_| s.parse())
                    .map(Value::Timestamp)
                    .map_err(|_| Error::InvalidValue(format!("invalid timestamp: '{}'", s))),
                other => Err(Error::TypeMismatch {
                    expected: "TIMESTAMP".into(),
                    found: other.data_type().to_string(),
                }),
            },
            DataType::Tuple(elements) => match value {
                Value::Tuple(values) => {
                    if values.len() != elements.len() {
                        return Err(Error::InvalidOperandColumns {
                            expected: elements.len(),
                            actual: values.len(),
                        });
                    }
                    let converted = elements
                        .iter()
                        .zip(values)
                        .map(|(ty, v)| ty.convert(v))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(Value::Tuple(converted))
                }
                other => Err(Error::TypeMismatch {
                    expected: self.to_string(),
                    found: other.data_type().to_string(),
                }),
            },
        }
    }

    /// Total order between two values of this type. Values are coerced
    /// first, so a caller may pass raw values of a convertible type.
    pub fn compare(&self, left: &Value, right: &Value) -> Result<Ordering> {
        let left = self.convert(left.clone())?;
        let right = self.convert(right.clone())?;
        match (self, &left, &right) {
            (DataType::Bool, Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (DataType::I64, Value::I64(a), Value::I64(b)) => Ok(a.cmp(b)),
            (DataType::U64, Value::U64(a), Value::U64(b)) => Ok(a.cmp(b)),
            (DataType::F64, Value::F64(a), Value::F64(b)) => Ok(a.total_cmp(b)),
            (DataType::Decimal, Value::Decimal(a), Value::Decimal(b)) => Ok(a.cmp(b)),
            (DataType::Text, Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (DataType::Bytea, Value::Bytea(a), Value::Bytea(b)) => Ok(a.cmp(b)),
            (DataType::Date, Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
            (DataType::Time, Value::Time(a), Value::Time(b)) => Ok(a.cmp(b)),
            (DataType::Timestamp, Value::Timestamp(a), Value::Timestamp(b)) => Ok(a.cmp(b)),
            (DataType::Tuple(elements), Value::Tuple(a), Value::Tuple(b)) => {
                for (ty, (l, r)) in elements.iter().zip(a.iter().zip(b.iter())) {
                    // NULLs inside tuples sort first; the outer comparison
                    // kernel only screens top-level NULL operands.
                    let ord = match (l.is_null(), r.is_null()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        (false, false) => ty.compare(l, r)?,
                    };
                    if ord != Ordering::Equal {
                        return Ok(ord);
                    }
                }
                Ok(Ordering::Equal)
            }
            _ => Err(Error::TypeMismatch {
                expected: self.to_string(),
                found: format!("{} and {}", left.data_type(), right.data_type()),
            }),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Null => write!(f, "NULL"),
            DataType::Bool => write!(f, "BOOLEAN"),
            DataType::I64 => write!(f, "BIGINT"),
            DataType::U64 => write!(f, "BIGINT UNSIGNED"),
            DataType::F64 => write!(f, "DOUBLE"),
            DataType::Decimal => write!(f, "DECIMAL"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Bytea => write!(f, "BYTEA"),
            DataType::Date => write!(f, "DATE"),
            DataType::Time => write!(f, "TIME"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Tuple(elements) => {
                write!(f, "TUPLE(")?;
                for (i, ty) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ")")
            }
        }
    }
}
