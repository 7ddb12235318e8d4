//! ABS function - returns absolute value

use super::{FunctionRef, FunctionRegistry, ScalarFunction};
use crate::error::{Error, Result};
use crate::types::{DataType, Value};

pub struct AbsFunction;

impl ScalarFunction for AbsFunction {
    fn name(&self) -> &'static str {
        "ABS"
    }

    fn validate(&self, arg_types: &[DataType]) -> Result<DataType> {
        if arg_types.len() != 1 {
            return Err(Error::invalid_children("ABS", arg_types.len(), 1));
        }
        match &arg_types[0] {
            ty if ty.is_numeric() => Ok(ty.clone()),
            DataType::Null => Ok(DataType::Null),
            other => Err(Error::TypeMismatch {
                expected: "numeric type".into(),
                found: other.to_string(),
            }),
        }
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::I64(i) => i
                .checked_abs()
                .map(Value::I64)
                .ok_or_else(|| Error::InvalidValue("BIGINT overflow".into())),
            Value::U64(u) => Ok(Value::U64(*u)),
            Value::F64(n) => Ok(Value::F64(n.abs())),
            Value::Decimal(d) => Ok(Value::Decimal(d.abs())),
            other => Err(Error::TypeMismatch {
                expected: "numeric".into(),
                found: other.data_type().to_string(),
            }),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(FunctionRef::new(AbsFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abs_call() {
        let func = AbsFunction;
        assert_eq!(func.call(&[Value::I64(-42)]).unwrap(), Value::I64(42));
        assert_eq!(func.call(&[Value::F64(-1.5)]).unwrap(), Value::F64(1.5));
        assert_eq!(func.call(&[Value::Null]).unwrap(), Value::Null);
        assert!(func.call(&[Value::I64(i64::MIN)]).is_err());
    }
}
