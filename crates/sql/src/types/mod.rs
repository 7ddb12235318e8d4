//! Core type system: values, data types, and schemas

pub mod data_type;
pub mod schema;
pub mod value;

pub use data_type::DataType;
pub use schema::{Column, Schema};
pub use value::{Row, Value};
