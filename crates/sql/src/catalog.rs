//! Catalog of databases, tables, and functions
//!
//! The analyzer consults the catalog to resolve table references and
//! function names. Tables carry an in-memory row store so resolved scans
//! can produce rows directly.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::functions::{FunctionRef, FunctionRegistry};
use crate::types::{Row, Schema};

/// A named table with a schema and in-memory rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// A named collection of tables
#[derive(Debug, Default)]
pub struct Database {
    name: String,
    tables: HashMap<String, Arc<Table>>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: HashMap::new(),
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.add_table(table);
        self
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables
            .insert(table.name().to_lowercase(), Arc::new(table));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }
}

/// Catalog of databases and registered functions
pub struct Catalog {
    databases: HashMap<String, Database>,
    functions: FunctionRegistry,
    locked_tables: Mutex<HashSet<(String, String)>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            databases: HashMap::new(),
            functions: FunctionRegistry::new(),
            locked_tables: Mutex::new(HashSet::new()),
        }
    }

    pub fn add_database(&mut self, database: Database) {
        self.databases
            .insert(database.name().to_lowercase(), database);
    }

    pub fn database(&self, name: &str) -> Result<&Database> {
        self.databases
            .get(&name.to_lowercase())
            .ok_or_else(|| Error::DatabaseNotFound(name.to_string()))
    }

    pub fn table(&self, database: &str, name: &str) -> Result<Arc<Table>> {
        self.database(database)?.table(name)
    }

    pub fn function(&self, name: &str) -> Result<FunctionRef> {
        self.functions.lookup(name)
    }

    pub fn register_function(&mut self, func: FunctionRef) {
        self.functions.register(func);
    }

    /// Record a table lock for the session. Downstream storage honors the
    /// lock set; the core only tracks it.
    pub fn lock_table(&self, database: &str, name: &str) -> Result<()> {
        // Validate the reference before recording it.
        self.table(database, name)?;
        self.locked_tables
            .lock()
            .insert((database.to_lowercase(), name.to_lowercase()));
        Ok(())
    }

    pub fn is_locked(&self, database: &str, name: &str) -> bool {
        self.locked_tables
            .lock()
            .contains(&(database.to_lowercase(), name.to_lowercase()))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
