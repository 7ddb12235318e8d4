//! Text conversion target

use crate::error::{Error, Result};
use crate::types::Value;

/// Coerce a value to a UTF-8 string.
pub fn to_text(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Str(s) => Ok(Value::Str(s)),
        Value::I64(i) => Ok(Value::Str(i.to_string())),
        Value::U64(u) => Ok(Value::Str(u.to_string())),
        Value::F64(n) => Ok(Value::Str(n.to_string())),
        Value::Decimal(d) => Ok(Value::Str(d.to_string())),
        // MySQL renders booleans as their tinyint form
        Value::Bool(b) => Ok(Value::Str(if b { "1" } else { "0" }.to_string())),
        Value::Bytea(bytes) => String::from_utf8(bytes)
            .map(Value::Str)
            .map_err(|e| Error::InvalidValue(format!("string decode failed: {}", e))),
        Value::Date(d) => Ok(Value::Str(d.to_string())),
        Value::Time(t) => Ok(Value::Str(t.to_string())),
        Value::Timestamp(ts) => Ok(Value::Str(ts.to_string())),
        other @ Value::Tuple(_) => Err(Error::TypeMismatch {
            expected: "TEXT".into(),
            found: other.data_type().to_string(),
        }),
    }
}
