//! Table and projection schemas

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::DataType;

/// A single output column of a plan node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Source table, if the column comes straight from one
    pub table: Option<String>,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            table: None,
            data_type,
            nullable: true,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// An ordered list of columns describing the rows a plan node produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Positional lookup by optionally-qualified name. An unqualified name
    /// matches the first column with that name in any table.
    pub fn index_of(&self, table: Option<&str>, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| {
            c.name.eq_ignore_ascii_case(name)
                && match table {
                    Some(t) => c.table.as_deref().is_some_and(|ct| ct.eq_ignore_ascii_case(t)),
                    None => true,
                }
        })
    }

    /// Concatenate two schemas, left columns first. Used by joins.
    pub fn join(&self, other: &Schema) -> Schema {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Schema { columns }
    }

    /// The same columns re-qualified under a new table name. Used by
    /// subquery aliases.
    pub fn qualify(&self, table: &str) -> Schema {
        Schema {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    table: Some(table.to_string()),
                    ..c.clone()
                })
                .collect(),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if let Some(table) = &c.table {
                write!(f, "{}.", table)?;
            }
            write!(f, "{} {}", c.name, c.data_type)?;
        }
        write!(f, ")")
    }
}
