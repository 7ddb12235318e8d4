//! Scalar function definitions and registry
//!
//! Functions are resolved by name during analysis; the resolved handle is
//! embedded into the expression tree and called with evaluated arguments.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{DataType, Value};

mod abs;
mod coalesce;
mod length;
mod lower;
mod upper;

/// Trait for scalar SQL functions
pub trait ScalarFunction: Send + Sync {
    /// Function name (uppercase)
    fn name(&self) -> &'static str;

    /// Validate argument types and return the result type
    fn validate(&self, arg_types: &[DataType]) -> Result<DataType>;

    /// Execute the function with evaluated arguments
    fn call(&self, args: &[Value]) -> Result<Value>;
}

/// A shared handle to a resolved function. Equality is by name, which is
/// what structural plan equality needs.
#[derive(Clone)]
pub struct FunctionRef(Arc<dyn ScalarFunction>);

impl FunctionRef {
    pub fn new(func: impl ScalarFunction + 'static) -> Self {
        Self(Arc::new(func))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn validate(&self, arg_types: &[DataType]) -> Result<DataType> {
        self.0.validate(arg_types)
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        self.0.call(args)
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FunctionRef").field(&self.name()).finish()
    }
}

/// Registry of available scalar functions, keyed by uppercase name
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionRef>,
}

impl FunctionRegistry {
    /// Create a registry preloaded with the builtin functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };
        abs::register(&mut registry);
        coalesce::register(&mut registry);
        length::register(&mut registry);
        lower::register(&mut registry);
        upper::register(&mut registry);
        registry
    }

    pub fn register(&mut self, func: FunctionRef) {
        self.functions.insert(func.name().to_string(), func);
    }

    pub fn lookup(&self, name: &str) -> Result<FunctionRef> {
        self.functions
            .get(&name.to_uppercase())
            .cloned()
            .ok_or_else(|| Error::FunctionNotFound(name.to_string()))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
