//! UPPER function - uppercases a string

use super::{FunctionRef, FunctionRegistry, ScalarFunction};
use crate::coercion;
use crate::error::{Error, Result};
use crate::types::{DataType, Value};

pub struct UpperFunction;

impl ScalarFunction for UpperFunction {
    fn name(&self) -> &'static str {
        "UPPER"
    }

    fn validate(&self, arg_types: &[DataType]) -> Result<DataType> {
        if arg_types.len() != 1 {
            return Err(Error::invalid_children("UPPER", arg_types.len(), 1));
        }
        Ok(DataType::Text)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match coercion::to_text(args[0].clone())? {
            Value::Null => Ok(Value::Null),
            Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
            _ => unreachable!("to_text returns Str or Null"),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(FunctionRef::new(UpperFunction));
}
