//! Numeric conversion targets

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::types::Value;

/// Coerce a value to a signed 64-bit integer.
pub fn to_signed(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::I64(i) => Ok(Value::I64(i)),
        Value::U64(u) => i64::try_from(u)
            .map(Value::I64)
            .map_err(|_| Error::InvalidValue(format!("{} overflows BIGINT", u))),
        Value::F64(n) => {
            if !n.is_finite() || n < i64::MIN as f64 || n > i64::MAX as f64 {
                return Err(Error::InvalidValue(format!("{} overflows BIGINT", n)));
            }
            Ok(Value::I64(n.trunc() as i64))
        }
        Value::Decimal(d) => d
            .trunc()
            .to_i64()
            .map(Value::I64)
            .ok_or_else(|| Error::InvalidValue(format!("{} overflows BIGINT", d))),
        Value::Bool(b) => Ok(Value::I64(b as i64)),
        Value::Str(s) => parse_i64(&s).map(Value::I64),
        other => Err(Error::TypeMismatch {
            expected: "BIGINT".into(),
            found: other.data_type().to_string(),
        }),
    }
}

/// Coerce a value to an unsigned 64-bit integer.
pub fn to_unsigned(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::U64(u) => Ok(Value::U64(u)),
        Value::I64(i) => u64::try_from(i)
            .map(Value::U64)
            .map_err(|_| Error::InvalidValue(format!("{} is negative", i))),
        Value::F64(n) => {
            if !n.is_finite() || n < 0.0 || n > u64::MAX as f64 {
                return Err(Error::InvalidValue(format!(
                    "{} overflows BIGINT UNSIGNED",
                    n
                )));
            }
            Ok(Value::U64(n.trunc() as u64))
        }
        Value::Decimal(d) => d
            .trunc()
            .to_u64()
            .map(Value::U64)
            .ok_or_else(|| Error::InvalidValue(format!("{} overflows BIGINT UNSIGNED", d))),
        Value::Bool(b) => Ok(Value::U64(b as u64)),
        Value::Str(s) => {
            let trimmed = s.trim();
            if let Ok(u) = trimmed.parse::<u64>() {
                return Ok(Value::U64(u));
            }
            match to_unsigned(Value::F64(parse_f64(trimmed)?)) {
                Ok(v) => Ok(v),
                Err(_) => Err(Error::InvalidValue(format!(
                    "cannot convert '{}' to BIGINT UNSIGNED",
                    s
                ))),
            }
        }
        other => Err(Error::TypeMismatch {
            expected: "BIGINT UNSIGNED".into(),
            found: other.data_type().to_string(),
        }),
    }
}

/// Coerce a value to a double.
pub fn to_double(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::F64(n) => Ok(Value::F64(n)),
        Value::I64(i) => Ok(Value::F64(i as f64)),
        Value::U64(u) => Ok(Value::F64(u as f64)),
        Value::Decimal(d) => d
            .to_f64()
            .map(Value::F64)
            .ok_or_else(|| Error::InvalidValue(format!("{} overflows DOUBLE", d))),
        Value::Bool(b) => Ok(Value::F64(b as u8 as f64)),
        Value::Str(s) => parse_f64(s.trim()).map(Value::F64),
        other => Err(Error::TypeMismatch {
            expected: "DOUBLE".into(),
            found: other.data_type().to_string(),
        }),
    }
}

/// Coerce a value to an arbitrary-precision decimal.
pub fn to_decimal(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Decimal(d) => Ok(Value::Decimal(d)),
        Value::I64(i) => Ok(Value::Decimal(Decimal::from(i))),
        Value::U64(u) => Ok(Value::Decimal(Decimal::from(u))),
        Value::F64(n) => Decimal::from_f64(n)
            .map(Value::Decimal)
            .ok_or_else(|| Error::InvalidValue(format!("{} is not a valid DECIMAL", n))),
        Value::Bool(b) => Ok(Value::Decimal(Decimal::from(b as u8))),
        Value::Str(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|_| Error::InvalidValue(format!("invalid decimal literal: '{}'", s))),
        other => Err(Error::TypeMismatch {
            expected: "DECIMAL".into(),
            found: other.data_type().to_string(),
        }),
    }
}

fn parse_i64(s: &str) -> Result<i64> {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(i);
    }
    // MySQL accepts fractional strings in integer context and truncates.
    match parse_f64(trimmed) {
        Ok(n) if n.is_finite() && n >= i64::MIN as f64 && n <= i64::MAX as f64 => {
            Ok(n.trunc() as i64)
        }
        _ => Err(Error::InvalidValue(format!(
            "cannot convert '{}' to BIGINT",
            s
        ))),
    }
}

fn parse_f64(s: &str) -> Result<f64> {
    s.parse::<f64>()
        .map_err(|_| Error::InvalidValue(format!("cannot convert '{}' to DOUBLE", s)))
}
