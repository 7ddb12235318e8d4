//! Implicit type coercion
//!
//! The conversion targets used by comparison coercion and by
//! `DataType::convert`: signed, unsigned, double, decimal, and text.
//! Conversion failures (overflow, unparsable strings, invalid decimal
//! literals, non-UTF-8 byte strings) surface as typed errors and
//! propagate unchanged.

mod numeric;
mod string;

pub use numeric::{to_decimal, to_double, to_signed, to_unsigned};
pub use string::to_text;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Value;
    use rust_decimal::Decimal;

    #[test]
    fn test_to_signed() {
        assert_eq!(to_signed(Value::I64(-3)).unwrap(), Value::I64(-3));
        assert_eq!(to_signed(Value::U64(3)).unwrap(), Value::I64(3));
        assert_eq!(to_signed(Value::F64(3.9)).unwrap(), Value::I64(3));
        assert_eq!(to_signed(Value::Str(" 42 ".into())).unwrap(), Value::I64(42));
        assert_eq!(to_signed(Value::Str("4.2".into())).unwrap(), Value::I64(4));
        assert_eq!(to_signed(Value::Bool(true)).unwrap(), Value::I64(1));
    }

    #[test]
    fn test_to_signed_overflow() {
        assert!(matches!(
            to_signed(Value::U64(u64::MAX)),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_to_unsigned_rejects_negative() {
        assert!(to_unsigned(Value::I64(-1)).is_err());
        assert_eq!(to_unsigned(Value::I64(1)).unwrap(), Value::U64(1));
    }

    #[test]
    fn test_to_double() {
        assert_eq!(to_double(Value::I64(2)).unwrap(), Value::F64(2.0));
        assert_eq!(to_double(Value::Str("2.5".into())).unwrap(), Value::F64(2.5));
        assert!(to_double(Value::Str("two".into())).is_err());
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(
            to_decimal(Value::Str("12.34".into())).unwrap(),
            Value::Decimal(Decimal::new(1234, 2))
        );
        assert!(matches!(
            to_decimal(Value::Str("12.3.4".into())),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(Value::I64(7)).unwrap(), Value::Str("7".into()));
        assert_eq!(to_text(Value::Bool(true)).unwrap(), Value::Str("1".into()));
        assert_eq!(
            to_text(Value::Bytea(b"abc".to_vec())).unwrap(),
            Value::Str("abc".into())
        );
        assert!(to_text(Value::Bytea(vec![0xff, 0xfe])).is_err());
    }

    #[test]
    fn test_null_passes_through_all_targets() {
        assert_eq!(to_signed(Value::Null).unwrap(), Value::Null);
        assert_eq!(to_unsigned(Value::Null).unwrap(), Value::Null);
        assert_eq!(to_double(Value::Null).unwrap(), Value::Null);
        assert_eq!(to_decimal(Value::Null).unwrap(), Value::Null);
        assert_eq!(to_text(Value::Null).unwrap(), Value::Null);
    }
}
