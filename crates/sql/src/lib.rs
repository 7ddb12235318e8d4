//! MySQL-compatible SQL engine core
//!
//! This crate provides the two hard pieces of a SQL engine:
//! - an expression evaluator that reproduces MySQL's comparison
//!   semantics (implicit numeric/string promotion, NULL propagation,
//!   regexp matching with compiled-pattern reuse), and
//! - a rule-based analyzer that rewrites logical plan trees to fixed
//!   point through ordered batches of rules.
//!
//! Parsing, storage, and the network surface live in the layers around
//! this crate; they interact with it through the catalog and the query
//! context.

pub mod analyzer;
pub mod catalog;
pub mod coercion;
pub mod context;
pub mod error;
pub mod expression;
pub mod functions;
pub mod planning;
pub mod types;

pub use analyzer::{Analyzer, AnalysisFailure, Batch, Builder, Rule, Scope};
pub use catalog::{Catalog, Database, Table};
pub use context::QueryContext;
pub use error::{Error, Result};
pub use expression::Expression;
pub use planning::{Direction, JoinType, Plan, SortKey};
pub use types::{Column, DataType, Row, Schema, Value};
