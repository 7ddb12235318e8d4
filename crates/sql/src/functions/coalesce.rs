//! COALESCE function - first non-NULL argument

use super::{FunctionRef, FunctionRegistry, ScalarFunction};
use crate::error::{Error, Result};
use crate::types::{DataType, Value};

pub struct CoalesceFunction;

impl ScalarFunction for CoalesceFunction {
    fn name(&self) -> &'static str {
        "COALESCE"
    }

    fn validate(&self, arg_types: &[DataType]) -> Result<DataType> {
        if arg_types.is_empty() {
            return Err(Error::invalid_children("COALESCE", 0, 1));
        }
        // The result type is the first non-NULL argument type.
        Ok(arg_types
            .iter()
            .find(|ty| **ty != DataType::Null)
            .cloned()
            .unwrap_or(DataType::Null))
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        Ok(args
            .iter()
            .find(|v| !v.is_null())
            .cloned()
            .unwrap_or(Value::Null))
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(FunctionRef::new(CoalesceFunction));
}
