//! Expression evaluation over analyzed plans

mod common;

use quarry_sql::{DataType, Error, Expression, Plan, Result, Scope, Value};

use common::{analyzer, context};

fn filter_users(predicate: Expression) -> Plan {
    Plan::Project {
        expressions: vec![Expression::column("name")],
        input: Box::new(Plan::Filter {
            predicate,
            input: Box::new(Plan::UnresolvedTable {
                database: None,
                name: "users".into(),
            }),
        }),
    }
}

fn names(plan: Plan) -> Vec<String> {
    let analyzed = analyzer().analyze(&context(), plan, &Scope::new()).unwrap();
    analyzed
        .rows(&context())
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap()
        .into_iter()
        .map(|row| match &row[0] {
            Value::Str(s) => s.clone(),
            other => panic!("expected string, got {:?}", other),
        })
        .collect()
}

#[test]
fn filter_with_numeric_string_coercion() {
    // '2' = id coerces the text literal to a number.
    let predicate = Expression::Equal(
        Box::new(Expression::string("2")),
        Box::new(Expression::column("id")),
    );
    assert_eq!(names(filter_users(predicate)), vec!["grace"]);
}

#[test]
fn null_comparisons_never_match() {
    // age > 40 is NULL for alan's NULL age; NULL is not true, so the
    // row is filtered out rather than erroring.
    let predicate = Expression::GreaterThan(
        Box::new(Expression::column("age")),
        Box::new(Expression::integer(0)),
    );
    assert_eq!(names(filter_users(predicate)), vec!["ada", "grace"]);
}

#[test]
fn regexp_filter_reuses_compiled_pattern() {
    // Constant pattern: one matcher compiled, reused for all three rows.
    let predicate = Expression::regexp(Expression::column("name"), Expression::string("^a.*"));
    assert_eq!(names(filter_users(predicate)), vec!["ada", "alan"]);
}

#[test]
fn regexp_invalid_pattern_surfaces_error() {
    let predicate = Expression::regexp(Expression::column("name"), Expression::string("(unclosed"));
    let analyzed = analyzer()
        .analyze(&context(), filter_users(predicate), &Scope::new())
        .unwrap();
    let result = analyzed
        .rows(&context())
        .unwrap()
        .collect::<Result<Vec<_>>>();
    assert!(matches!(result, Err(Error::InvalidRegexp(_))));
}

#[test]
fn in_list_filters_rows() {
    let predicate = Expression::In {
        left: Box::new(Expression::column("id")),
        right: Box::new(Expression::Tuple(vec![
            Expression::integer(1),
            Expression::integer(3),
        ])),
    };
    assert_eq!(names(filter_users(predicate)), vec!["ada", "alan"]);
}

#[test]
fn arithmetic_in_projections() {
    let plan = Plan::Project {
        expressions: vec![Expression::Multiply(
            Box::new(Expression::column("id")),
            Box::new(Expression::integer(10)),
        )],
        input: Box::new(Plan::UnresolvedTable {
            database: None,
            name: "users".into(),
        }),
    };
    let analyzed = analyzer().analyze(&context(), plan, &Scope::new()).unwrap();
    assert_eq!(analyzed.schema().columns()[0].data_type, DataType::I64);
    let rows = analyzed
        .rows(&context())
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Value::I64(10)],
            vec![Value::I64(20)],
            vec![Value::I64(30)],
        ]
    );
}

#[test]
fn cancellation_stops_row_streaming() {
    let predicate = Expression::Equal(
        Box::new(Expression::column("id")),
        Box::new(Expression::integer(1)),
    );
    let analyzed = analyzer()
        .analyze(&context(), filter_users(predicate), &Scope::new())
        .unwrap();

    let ctx = context();
    let mut rows = analyzed.rows(&ctx).unwrap();
    ctx.cancel();
    match rows.next() {
        Some(Err(Error::Cancelled)) => {}
        other => panic!("expected cancellation, got {:?}", other.map(|r| r.is_ok())),
    }
}

#[test]
fn coalesce_fills_null_ages() {
    let plan = Plan::Project {
        expressions: vec![Expression::UnresolvedFunction {
            name: "coalesce".into(),
            args: vec![Expression::column("age"), Expression::integer(-1)],
        }],
        input: Box::new(Plan::UnresolvedTable {
            database: None,
            name: "users".into(),
        }),
    };
    let analyzed = analyzer().analyze(&context(), plan, &Scope::new()).unwrap();
    let rows = analyzed
        .rows(&context())
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Value::I64(36)],
            vec![Value::I64(45)],
            vec![Value::I64(-1)],
        ]
    );
}
