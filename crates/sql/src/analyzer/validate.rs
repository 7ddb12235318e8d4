//! Validation rules
//!
//! Validation runs after the rewrite batches and rejects plans the
//! executor could not run: anything still unresolved, and malformed IN
//! operands.

use super::{Analyzer, Rule, Scope};
use crate::context::QueryContext;
use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::planning::Plan;
use crate::types::DataType;

pub(super) fn default_validation_rules() -> Vec<Rule> {
    vec![
        Rule::new("validate_resolved", validate_resolved),
        Rule::new("validate_operands", validate_operands),
    ]
}

fn validate_resolved(
    ctx: &QueryContext,
    _analyzer: &Analyzer,
    plan: Plan,
    _scope: &Scope,
) -> Result<Plan> {
    ctx.check_cancelled()?;
    if plan.resolved() {
        return Ok(plan);
    }
    // Name the offending column when one is what kept the plan
    // unresolved.
    match first_unresolved_column(&plan) {
        Some(name) => Err(Error::ColumnNotFound(name)),
        None => Err(Error::InAnalysis("plan is not fully resolved".into())),
    }
}

fn first_unresolved_column(plan: &Plan) -> Option<String> {
    let mut missing = None;
    for expression in plan.expressions() {
        expression.inspect(&mut |e| {
            if missing.is_some() {
                return false;
            }
            if let Expression::UnresolvedColumn { name, .. } = e {
                missing = Some(name.clone());
            }
            true
        });
        if missing.is_some() {
            return missing;
        }
    }
    plan.children()
        .into_iter()
        .find_map(first_unresolved_column)
}

fn validate_operands(
    ctx: &QueryContext,
    _analyzer: &Analyzer,
    plan: Plan,
    _scope: &Scope,
) -> Result<Plan> {
    ctx.check_cancelled()?;
    check_plan(&plan)?;
    Ok(plan)
}

fn check_plan(plan: &Plan) -> Result<()> {
    for expression in plan.expressions() {
        let mut error = None;
        expression.inspect(&mut |e| {
            if error.is_some() {
                return false;
            }
            if let Expression::In { left, right } = e {
                if let Err(e) = check_in_operands(left, right) {
                    error = Some(e);
                    return false;
                }
            }
            true
        });
        if let Some(error) = error {
            return Err(error);
        }
    }
    for child in plan.children() {
        check_plan(child)?;
    }
    Ok(())
}

fn check_in_operands(left: &Expression, right: &Expression) -> Result<()> {
    let elements = match right.data_type() {
        DataType::Tuple(elements) => elements,
        other => return Err(Error::UnsupportedInOperand(other.to_string())),
    };
    let left_columns = match left.data_type() {
        DataType::Tuple(types) => types.len(),
        _ => 1,
    };
    for element in &elements {
        let element_columns = match element {
            DataType::Tuple(types) => types.len(),
            _ => 1,
        };
        if element_columns != left_columns {
            return Err(Error::InvalidOperandColumns {
                expected: left_columns,
                actual: element_columns,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::catalog::Catalog;
    use std::sync::Arc;

    fn ctx() -> QueryContext {
        QueryContext::new(1)
    }

    fn analyzer() -> Analyzer {
        Analyzer::with_default_rules(Arc::new(Catalog::new()))
    }

    fn project(expression: Expression) -> Plan {
        Plan::Project {
            expressions: vec![expression],
            input: Box::new(Plan::UnresolvedTable {
                database: None,
                name: "t".into(),
            }),
        }
    }

    #[test]
    fn test_validate_resolved_names_missing_column() {
        let plan = project(Expression::column("x"));
        assert_eq!(
            validate_resolved(&ctx(), &analyzer(), plan, &Scope::new()).unwrap_err(),
            Error::ColumnNotFound("x".into())
        );
    }

    #[test]
    fn test_validate_resolved_unresolved_table() {
        let plan = Plan::UnresolvedTable {
            database: None,
            name: "t".into(),
        };
        assert!(matches!(
            validate_resolved(&ctx(), &analyzer(), plan, &Scope::new()),
            Err(Error::InAnalysis(_))
        ));
    }

    #[test]
    fn test_validate_operands_rejects_non_tuple_in() {
        let plan = project(Expression::In {
            left: Box::new(Expression::integer(1)),
            right: Box::new(Expression::integer(2)),
        });
        assert_eq!(
            validate_operands(&ctx(), &analyzer(), plan, &Scope::new()).unwrap_err(),
            Error::UnsupportedInOperand("BIGINT".into())
        );
    }

    #[test]
    fn test_validate_operands_rejects_column_count_mismatch() {
        let plan = project(Expression::In {
            left: Box::new(Expression::Tuple(vec![
                Expression::integer(1),
                Expression::integer(2),
            ])),
            right: Box::new(Expression::Tuple(vec![Expression::integer(3)])),
        });
        assert_eq!(
            validate_operands(&ctx(), &analyzer(), plan, &Scope::new()).unwrap_err(),
            Error::InvalidOperandColumns {
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_validate_operands_accepts_matching_in() {
        let plan = project(Expression::In {
            left: Box::new(Expression::integer(1)),
            right: Box::new(Expression::Tuple(vec![
                Expression::integer(1),
                Expression::integer(2),
            ])),
        });
        assert!(validate_operands(&ctx(), &analyzer(), plan, &Scope::new()).is_ok());
    }
}
