//! Common test utilities for analyzer and evaluation integration tests
#![allow(dead_code)]

use std::sync::Arc;

use quarry_sql::{
    Analyzer, Catalog, Column, Database, DataType, QueryContext, Schema, Table, Value,
};

/// Build a catalog with the sample `mydb` database: a `users` table and
/// an `orders` table with a few rows each.
pub fn sample_catalog() -> Arc<Catalog> {
    let users = Table::new(
        "users",
        Schema::new(vec![
            Column::new("id", DataType::I64).with_table("users"),
            Column::new("name", DataType::Text).with_table("users"),
            Column::new("age", DataType::I64).with_table("users"),
        ]),
    )
    .with_rows(vec![
        vec![Value::I64(1), Value::Str("ada".into()), Value::I64(36)],
        vec![Value::I64(2), Value::Str("grace".into()), Value::I64(45)],
        vec![Value::I64(3), Value::Str("alan".into()), Value::Null],
    ]);

    let orders = Table::new(
        "orders",
        Schema::new(vec![
            Column::new("id", DataType::I64).with_table("orders"),
            Column::new("user_id", DataType::I64).with_table("orders"),
            Column::new("total", DataType::F64).with_table("orders"),
        ]),
    )
    .with_rows(vec![
        vec![Value::I64(10), Value::I64(1), Value::F64(25.0)],
        vec![Value::I64(11), Value::I64(2), Value::F64(75.5)],
    ]);

    let mut catalog = Catalog::new();
    catalog.add_database(Database::new("mydb").with_table(users).with_table(orders));
    Arc::new(catalog)
}

pub fn context() -> QueryContext {
    QueryContext::new(1).with_database("mydb")
}

pub fn analyzer() -> Analyzer {
    Analyzer::with_default_rules(sample_catalog())
}
