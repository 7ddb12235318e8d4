//! LENGTH function - byte length of a string

use super::{FunctionRef, FunctionRegistry, ScalarFunction};
use crate::error::{Error, Result};
use crate::types::{DataType, Value};

pub struct LengthFunction;

impl ScalarFunction for LengthFunction {
    fn name(&self) -> &'static str {
        "LENGTH"
    }

    fn validate(&self, arg_types: &[DataType]) -> Result<DataType> {
        if arg_types.len() != 1 {
            return Err(Error::invalid_children("LENGTH", arg_types.len(), 1));
        }
        Ok(DataType::I64)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::Str(s) => Ok(Value::I64(s.len() as i64)),
            Value::Bytea(b) => Ok(Value::I64(b.len() as i64)),
            other => Err(Error::TypeMismatch {
                expected: "TEXT or BYTEA".into(),
                found: other.data_type().to_string(),
            }),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(FunctionRef::new(LengthFunction));
}
