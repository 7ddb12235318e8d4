//! Default analysis rules
//!
//! Resolution rules are monotone toward a resolved plan: they only
//! replace unresolved nodes and leave anything they cannot resolve yet
//! untouched, so iterative batches converge once nothing is left to do.

use super::{Analyzer, Rule, Scope};
use crate::context::QueryContext;
use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::planning::Plan;
use crate::types::{DataType, Schema, Value};

pub(super) fn once_before_default() -> Vec<Rule> {
    vec![Rule::new("resolve_tables", resolve_tables)]
}

pub(super) fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new("resolve_columns", resolve_columns),
        Rule::new("resolve_functions", resolve_functions),
    ]
}

pub(super) fn once_after_default() -> Vec<Rule> {
    vec![Rule::new("simplify_filters", simplify_filters)]
}

/// Replace `UnresolvedTable` nodes with catalog-backed tables, including
/// inside subquery plans. Unqualified names use the context's current
/// database.
fn resolve_tables(
    ctx: &QueryContext,
    analyzer: &Analyzer,
    plan: Plan,
    scope: &Scope,
) -> Result<Plan> {
    ctx.check_cancelled()?;
    let plan = plan.transform_up(&|node| match node {
        Plan::UnresolvedTable { database, name } => {
            let database = database
                .or_else(|| ctx.current_database().map(str::to_string))
                .ok_or_else(|| {
                    Error::InAnalysis(format!("no database selected for table {}", name))
                })?;
            let table = analyzer.catalog.table(&database, &name)?;
            analyzer.log(&format!("resolved table {}.{}", database, name));
            Ok(Plan::ResolvedTable(table))
        }
        other => Ok(other),
    })?;
    plan.transform_expressions(&|e| {
        e.transform_up(&|node| match node {
            Expression::Subquery(inner) => Ok(Expression::Subquery(Box::new(resolve_tables(
                ctx, analyzer, *inner, scope,
            )?))),
            other => Ok(other),
        })
    })
}

/// Resolve column names to positional fields against each node's child
/// schema, falling back to the scope stack for correlated references.
/// Names that resolve nowhere are left for validation to reject.
fn resolve_columns(
    ctx: &QueryContext,
    analyzer: &Analyzer,
    plan: Plan,
    scope: &Scope,
) -> Result<Plan> {
    ctx.check_cancelled()?;
    plan.transform_up(&|node| {
        if !node.children().iter().all(|c| c.resolved()) {
            return Ok(node);
        }
        let child_schema = node
            .children()
            .iter()
            .fold(Schema::default(), |acc, c| acc.join(&c.schema()));
        let expressions = node
            .expressions()
            .into_iter()
            .cloned()
            .map(|e| resolve_expression(ctx, analyzer, e, &child_schema, scope))
            .collect::<Result<Vec<_>>>()?;
        node.with_expressions(expressions)
    })
}

fn resolve_expression(
    ctx: &QueryContext,
    analyzer: &Analyzer,
    expr: Expression,
    schema: &Schema,
    scope: &Scope,
) -> Result<Expression> {
    expr.transform_up(&|node| match node {
        Expression::UnresolvedColumn { table, name } => {
            if let Some(index) = schema.index_of(table.as_deref(), &name) {
                let data_type = schema.columns()[index].data_type.clone();
                analyzer.log(&format!("resolved column {} to field {}", name, index));
                return Ok(Expression::Field {
                    index,
                    name,
                    data_type,
                });
            }
            if let Some(outer) = scope.innermost() {
                if let Some(index) = outer.index_of(table.as_deref(), &name) {
                    let data_type = outer.columns()[index].data_type.clone();
                    analyzer.log(&format!(
                        "resolved column {} to outer field {}",
                        name, index
                    ));
                    return Ok(Expression::OuterField {
                        index,
                        name,
                        data_type,
                    });
                }
            }
            Ok(Expression::UnresolvedColumn { table, name })
        }
        Expression::Subquery(inner) => {
            let mut inner_scope = scope.clone();
            inner_scope.push(schema.clone());
            let resolved = resolve_columns(ctx, analyzer, *inner, &inner_scope)?;
            Ok(Expression::Subquery(Box::new(resolved)))
        }
        other => Ok(other),
    })
}

/// Resolve function calls against the catalog's registry once their
/// arguments are resolved, fixing the call's return type.
fn resolve_functions(
    ctx: &QueryContext,
    analyzer: &Analyzer,
    plan: Plan,
    scope: &Scope,
) -> Result<Plan> {
    ctx.check_cancelled()?;
    plan.transform_expressions(&|e| {
        e.transform_up(&|node| match node {
            Expression::UnresolvedFunction { name, args } => {
                if !args.iter().all(|a| a.resolved()) {
                    return Ok(Expression::UnresolvedFunction { name, args });
                }
                let func = analyzer.catalog.function(&name)?;
                let arg_types: Vec<DataType> = args.iter().map(|a| a.data_type()).collect();
                let return_type = func.validate(&arg_types)?;
                analyzer.log(&format!("resolved function {}", func.name()));
                Ok(Expression::Call {
                    func,
                    args,
                    return_type,
                })
            }
            Expression::Subquery(inner) => Ok(Expression::Subquery(Box::new(
                resolve_functions(ctx, analyzer, *inner, scope)?,
            ))),
            other => Ok(other),
        })
    })
}

/// Fold boolean literal absorption in filter predicates: TRUE and FALSE
/// collapse AND/OR chains, NOT of a literal inverts it.
fn simplify_filters(
    ctx: &QueryContext,
    _analyzer: &Analyzer,
    plan: Plan,
    _scope: &Scope,
) -> Result<Plan> {
    ctx.check_cancelled()?;
    plan.transform_up(&|node| match node {
        Plan::Filter { predicate, input } => Ok(Plan::Filter {
            predicate: predicate.transform_up(&fold_boolean_literals)?,
            input,
        }),
        other => Ok(other),
    })
}

fn bool_literal(value: bool) -> Expression {
    Expression::literal(Value::Bool(value), DataType::Bool)
}

/// A boolean literal operand: Some(Some(b)), a NULL boolean literal:
/// Some(None), anything else: None.
fn as_bool_literal(expr: &Expression) -> Option<Option<bool>> {
    match expr {
        Expression::Literal {
            value: Value::Bool(b),
            ..
        } => Some(Some(*b)),
        Expression::Literal {
            value: Value::Null,
            data_type: DataType::Bool,
        } => Some(None),
        _ => None,
    }
}

fn fold_boolean_literals(expr: Expression) -> Result<Expression> {
    Ok(match expr {
        Expression::And(l, r) => match (as_bool_literal(&l), as_bool_literal(&r)) {
            (Some(Some(false)), _) | (_, Some(Some(false))) => bool_literal(false),
            (Some(Some(true)), _) => *r,
            (_, Some(Some(true))) => *l,
            _ => Expression::And(l, r),
        },
        Expression::Or(l, r) => match (as_bool_literal(&l), as_bool_literal(&r)) {
            (Some(Some(true)), _) | (_, Some(Some(true))) => bool_literal(true),
            (Some(Some(false)), _) => *r,
            (_, Some(Some(false))) => *l,
            _ => Expression::Or(l, r),
        },
        Expression::Not(e) => match as_bool_literal(&e) {
            Some(Some(b)) => bool_literal(!b),
            Some(None) => Expression::literal(Value::Null, DataType::Bool),
            None => Expression::Not(e),
        },
        other => other,
    })
}
