//! LOWER function - lowercases a string

use super::{FunctionRef, FunctionRegistry, ScalarFunction};
use crate::coercion;
use crate::error::{Error, Result};
use crate::types::{DataType, Value};

pub struct LowerFunction;

impl ScalarFunction for LowerFunction {
    fn name(&self) -> &'static str {
        "LOWER"
    }

    fn validate(&self, arg_types: &[DataType]) -> Result<DataType> {
        if arg_types.len() != 1 {
            return Err(Error::invalid_children("LOWER", arg_types.len(), 1));
        }
        Ok(DataType::Text)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match coercion::to_text(args[0].clone())? {
            Value::Null => Ok(Value::Null),
            Value::Str(s) => Ok(Value::Str(s.to_lowercase())),
            _ => unreachable!("to_text returns Str or Null"),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(FunctionRef::new(LowerFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_call() {
        let func = LowerFunction;
        assert_eq!(
            func.call(&[Value::Str("AbC".into())]).unwrap(),
            Value::Str("abc".into())
        );
        // Non-text input coerces to text first
        assert_eq!(
            func.call(&[Value::I64(7)]).unwrap(),
            Value::Str("7".into())
        );
        assert_eq!(func.call(&[Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn test_lower_validate() {
        let func = LowerFunction;
        assert_eq!(func.validate(&[DataType::Text]).unwrap(), DataType::Text);
        assert!(matches!(
            func.validate(&[]),
            Err(Error::InvalidChildrenNumber { .. })
        ));
    }
}
