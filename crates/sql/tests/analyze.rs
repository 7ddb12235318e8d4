//! End-to-end analysis: unresolved plans in, resolved plans out

mod common;

use quarry_sql::{
    Builder, DataType, Error, Expression, Plan, QueryContext, Result, Scope, Value,
};
use similar_asserts::assert_eq as assert_text_eq;

use common::{analyzer, context, sample_catalog};

fn unresolved_scan(name: &str) -> Plan {
    Plan::UnresolvedTable {
        database: None,
        name: name.into(),
    }
}

#[test]
fn analyze_resolves_scan_filter_project() {
    let plan = Plan::Project {
        expressions: vec![
            Expression::column("name"),
            Expression::UnresolvedFunction {
                name: "upper".into(),
                args: vec![Expression::column("name")],
            },
        ],
        input: Box::new(Plan::Filter {
            predicate: Expression::GreaterThan(
                Box::new(Expression::column("age")),
                Box::new(Expression::integer(40)),
            ),
            input: Box::new(unresolved_scan("users")),
        }),
    };

    let analyzed = analyzer().analyze(&context(), plan, &Scope::new()).unwrap();
    assert!(analyzed.resolved());

    // The resolved plan streams rows with MySQL comparison semantics:
    // the NULL age row drops out of the filter.
    let rows = analyzed
        .rows(&context())
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![vec![Value::Str("grace".into()), Value::Str("GRACE".into())]]
    );
}

#[test]
fn analyze_twice_reaches_the_same_fixed_point() {
    let plan = Plan::Filter {
        predicate: Expression::Equal(
            Box::new(Expression::qualified_column("users", "id")),
            Box::new(Expression::integer(1)),
        ),
        input: Box::new(unresolved_scan("users")),
    };
    let analyzer = analyzer();
    let once = analyzer.analyze(&context(), plan, &Scope::new()).unwrap();
    let twice = analyzer
        .analyze(&context(), once.clone(), &Scope::new())
        .unwrap();
    assert_eq!(once, twice);
    assert_text_eq!(once.to_string(), twice.to_string());
}

#[test]
fn analyze_rejects_unknown_column() {
    let plan = Plan::Filter {
        predicate: Expression::column("flavor"),
        input: Box::new(unresolved_scan("users")),
    };
    let failure = analyzer()
        .analyze(&context(), plan, &Scope::new())
        .unwrap_err();
    assert_eq!(failure.error, Error::ColumnNotFound("flavor".into()));
    // The failure carries the best plan analysis produced: the table
    // resolved even though the column could not.
    assert!(matches!(
        failure.plan,
        Plan::Filter { ref input, .. } if matches!(**input, Plan::ResolvedTable(_))
    ));
}

#[test]
fn analyze_rejects_in_against_non_tuple() {
    let plan = Plan::Filter {
        predicate: Expression::In {
            left: Box::new(Expression::column("id")),
            right: Box::new(Expression::integer(7)),
        },
        input: Box::new(unresolved_scan("users")),
    };
    let failure = analyzer()
        .analyze(&context(), plan, &Scope::new())
        .unwrap_err();
    assert_eq!(failure.error, Error::UnsupportedInOperand("BIGINT".into()));
}

#[test]
fn analyze_rejects_in_column_count_mismatch() {
    let plan = Plan::Filter {
        predicate: Expression::In {
            left: Box::new(Expression::column("id")),
            right: Box::new(Expression::Tuple(vec![Expression::Tuple(vec![
                Expression::integer(1),
                Expression::integer(2),
            ])])),
        },
        input: Box::new(unresolved_scan("users")),
    };
    let failure = analyzer()
        .analyze(&context(), plan, &Scope::new())
        .unwrap_err();
    assert_eq!(
        failure.error,
        Error::InvalidOperandColumns {
            expected: 1,
            actual: 2,
        }
    );
}

#[test]
fn analyze_resolves_correlated_subquery() {
    // SELECT name FROM users WHERE (SELECT total FROM orders
    //   WHERE orders.user_id = users.id) > 50
    let subquery = Plan::Project {
        expressions: vec![Expression::qualified_column("orders", "total")],
        input: Box::new(Plan::Filter {
            predicate: Expression::Equal(
                Box::new(Expression::qualified_column("orders", "user_id")),
                Box::new(Expression::qualified_column("users", "id")),
            ),
            input: Box::new(unresolved_scan("orders")),
        }),
    };
    let plan = Plan::Project {
        expressions: vec![Expression::column("name")],
        input: Box::new(Plan::Filter {
            predicate: Expression::GreaterThan(
                Box::new(Expression::Subquery(Box::new(subquery))),
                Box::new(Expression::integer(50)),
            ),
            input: Box::new(unresolved_scan("users")),
        }),
    };

    let analyzed = analyzer().analyze(&context(), plan, &Scope::new()).unwrap();
    assert!(analyzed.resolved());

    let rows = analyzed
        .rows(&context())
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(rows, vec![vec![Value::Str("grace".into())]]);
}

fn never_converges(
    _ctx: &QueryContext,
    _analyzer: &quarry_sql::Analyzer,
    plan: Plan,
    _scope: &Scope,
) -> Result<Plan> {
    Ok(Plan::Limit {
        limit: 1,
        input: Box::new(plan),
    })
}

#[test]
fn analyzer_absorbs_non_converging_batch() {
    // The post-analyzer batch exhausts its iteration bound; the driver
    // suppresses the error and later batches still run, so the run
    // completes with the last plan.
    let analyzer = Builder::new(sample_catalog())
        .add_post_analyze_rule("never_converges", never_converges)
        .build();
    let plan = Plan::Filter {
        predicate: Expression::Equal(
            Box::new(Expression::column("id")),
            Box::new(Expression::integer(1)),
        ),
        input: Box::new(unresolved_scan("users")),
    };
    let analyzed = analyzer.analyze(&context(), plan, &Scope::new()).unwrap();
    assert!(analyzed.resolved());
    assert!(matches!(analyzed, Plan::Limit { limit: 1, .. }));
}

#[test]
fn custom_pre_validation_rule_runs() {
    fn reject_limits(
        _ctx: &QueryContext,
        _analyzer: &quarry_sql::Analyzer,
        plan: Plan,
        _scope: &Scope,
    ) -> Result<Plan> {
        let mut found = false;
        let mut node = &plan;
        loop {
            if matches!(node, Plan::Limit { .. }) {
                found = true;
            }
            match node.children().first() {
                Some(_) => node = node.children()[0],
                None => break,
            }
        }
        if found {
            Err(Error::InAnalysis("limits are not allowed here".into()))
        } else {
            Ok(plan)
        }
    }

    let analyzer = Builder::new(sample_catalog())
        .add_pre_validation_rule("reject_limits", reject_limits)
        .build();
    let plan = Plan::Limit {
        limit: 5,
        input: Box::new(unresolved_scan("users")),
    };
    let failure = analyzer
        .analyze(&context(), plan, &Scope::new())
        .unwrap_err();
    assert_eq!(
        failure.error,
        Error::InAnalysis("limits are not allowed here".into())
    );
}

#[test]
fn lock_table_registers_through_catalog() {
    let catalog = sample_catalog();
    catalog.lock_table("mydb", "users").unwrap();
    assert!(catalog.is_locked("mydb", "users"));
    assert!(!catalog.is_locked("mydb", "orders"));
}

#[test]
fn analyze_uses_qualified_database() {
    // No current database on the context, but the table reference is
    // fully qualified.
    let ctx = QueryContext::new(7);
    let plan = Plan::UnresolvedTable {
        database: Some("mydb".into()),
        name: "users".into(),
    };
    let analyzed = analyzer().analyze(&ctx, plan, &Scope::new()).unwrap();
    assert!(analyzed.resolved());
}

#[test]
fn sort_limit_union_pipeline_streams() {
    use quarry_sql::{Direction, SortKey};
    let scan = || unresolved_scan("users");
    let plan = Plan::Limit {
        limit: 4,
        input: Box::new(Plan::Sort {
            keys: vec![SortKey {
                expression: Expression::column("name"),
                direction: Direction::Descending,
            }],
            input: Box::new(Plan::Union {
                left: Box::new(scan()),
                right: Box::new(scan()),
            }),
        }),
    };
    let analyzed = analyzer().analyze(&context(), plan, &Scope::new()).unwrap();
    let rows = analyzed
        .rows(&context())
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][1], Value::Str("grace".into()));
    assert_eq!(rows[1][1], Value::Str("grace".into()));
    assert_eq!(rows[2][1], Value::Str("alan".into()));
}

#[test]
fn subquery_alias_requalifies_schema() {
    let plan = Plan::Project {
        expressions: vec![Expression::qualified_column("u", "name")],
        input: Box::new(Plan::SubqueryAlias {
            name: "u".into(),
            input: Box::new(unresolved_scan("users")),
        }),
    };
    let analyzed = analyzer().analyze(&context(), plan, &Scope::new()).unwrap();
    assert!(analyzed.resolved());
    assert_eq!(analyzed.schema().columns()[0].name, "name");
}

#[test]
fn group_by_and_join_resolve_but_do_not_stream() {
    let plan = Plan::Join {
        join_type: quarry_sql::JoinType::Inner,
        on: Expression::Equal(
            Box::new(Expression::qualified_column("users", "id")),
            Box::new(Expression::qualified_column("orders", "user_id")),
        ),
        left: Box::new(unresolved_scan("users")),
        right: Box::new(unresolved_scan("orders")),
    };
    let analyzed = analyzer().analyze(&context(), plan, &Scope::new()).unwrap();
    assert!(analyzed.resolved());
    assert_eq!(analyzed.schema().len(), 6);
    assert!(matches!(
        analyzed.rows(&context()),
        Err(Error::ExecutionError(_))
    ));
}

#[test]
fn group_by_schema_comes_from_projections() {
    let plan = Plan::GroupBy {
        group_by: vec![Expression::column("age")],
        projections: vec![Expression::column("age")],
        input: Box::new(unresolved_scan("users")),
    };
    let analyzed = analyzer().analyze(&context(), plan, &Scope::new()).unwrap();
    assert!(analyzed.resolved());
    assert_eq!(analyzed.schema().columns()[0].name, "age");
    assert_eq!(analyzed.schema().columns()[0].data_type, DataType::I64);
}
