//! Logical plan representation

pub mod plan;

pub use plan::{Direction, JoinType, Plan, SortKey};
