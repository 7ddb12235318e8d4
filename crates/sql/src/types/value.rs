//! SQL values
//!
//! A `Value` is the runtime representation of a single SQL scalar (or a
//! positional tuple of scalars). `Null` is a first-class value and
//! propagates through almost every operation; comparison operators handle
//! it above the type layer.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::DataType;

/// A row of values produced by a plan node
pub type Row = Vec<Value>;

/// SQL values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Decimal(Decimal),
    Str(String),
    Bytea(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The static type this value belongs to. `Null` reports the `Null`
    /// type; expression nodes that carry a declared type take precedence.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Bool(_) => DataType::Bool,
            Value::I64(_) => DataType::I64,
            Value::U64(_) => DataType::U64,
            Value::F64(_) => DataType::F64,
            Value::Decimal(_) => DataType::Decimal,
            Value::Str(_) => DataType::Text,
            Value::Bytea(_) => DataType::Bytea,
            Value::Date(_) => DataType::Date,
            Value::Time(_) => DataType::Time,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Tuple(values) => {
                DataType::Tuple(values.iter().map(Value::data_type).collect())
            }
        }
    }

    /// SQL truthiness used by filters: NULL and false are both not-true.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::I64(i) => write!(f, "{}", i),
            Value::U64(u) => write!(f, "{}", u),
            Value::F64(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Bytea(b) => {
                write!(f, "x'")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "'")
            }
            Value::Date(d) => write!(f, "'{}'", d),
            Value::Time(t) => write!(f, "'{}'", t),
            Value::Timestamp(ts) => write!(f, "'{}'", ts),
            Value::Tuple(values) => {
                write!(f, "(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::I64(-7).to_string(), "-7");
        assert_eq!(Value::Str("abc".into()).to_string(), "'abc'");
        assert_eq!(
            Value::Tuple(vec![Value::I64(1), Value::Str("a".into())]).to_string(),
            "(1, 'a')"
        );
    }

    #[test]
    fn test_data_type() {
        assert_eq!(Value::U64(1).data_type(), DataType::U64);
        assert_eq!(
            Value::Tuple(vec![Value::I64(1), Value::F64(2.0)]).data_type(),
            DataType::Tuple(vec![DataType::I64, DataType::F64])
        );
    }
}
