//! Scalar expression trees
//!
//! Expressions are immutable: rewrites produce a fresh root and may share
//! unchanged children. Every non-leaf node's arity equals the length of
//! its `children` list, and `with_children(children())` reproduces the
//! node.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

use crate::coercion;
use crate::context::QueryContext;
use crate::error::{Error, Result};
use crate::functions::FunctionRef;
use crate::planning::Plan;
use crate::types::{DataType, Row, Value};

pub mod comparison;

pub use comparison::RegexpState;

/// A scalar expression, evaluated against a row
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A typed constant.
    Literal { value: Value, data_type: DataType },
    /// A reference to the `index`-th column of the current row.
    Field {
        index: usize,
        name: String,
        data_type: DataType,
    },
    /// A correlated reference into an enclosing query's row, bound by the
    /// subquery expression before execution.
    OuterField {
        index: usize,
        name: String,
        data_type: DataType,
    },
    /// A column name that has not been resolved against a schema yet.
    UnresolvedColumn {
        table: Option<String>,
        name: String,
    },

    // Arithmetic
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),

    // Comparisons; all six share the coercing kernel in `comparison`
    Equal(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    LessThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    LessThanOrEqual(Box<Expression>, Box<Expression>),
    Regexp {
        left: Box<Expression>,
        right: Box<Expression>,
        state: RegexpState,
    },

    // Logical connectives (three-valued)
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),

    /// Membership test against a tuple.
    In {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Tuple(Vec<Expression>),

    /// A function call that has not been resolved against the registry.
    UnresolvedFunction {
        name: String,
        args: Vec<Expression>,
    },
    /// A resolved scalar function call.
    Call {
        func: FunctionRef,
        args: Vec<Expression>,
        return_type: DataType,
    },

    /// A scalar subquery.
    Subquery(Box<Plan>),
}

impl Expression {
    pub fn literal(value: Value, data_type: DataType) -> Expression {
        Expression::Literal { value, data_type }
    }

    pub fn integer(i: i64) -> Expression {
        Expression::literal(Value::I64(i), DataType::I64)
    }

    pub fn string(s: impl Into<String>) -> Expression {
        Expression::literal(Value::Str(s.into()), DataType::Text)
    }

    pub fn field(index: usize, name: impl Into<String>, data_type: DataType) -> Expression {
        Expression::Field {
            index,
            name: name.into(),
            data_type,
        }
    }

    pub fn column(name: impl Into<String>) -> Expression {
        Expression::UnresolvedColumn {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Expression {
        Expression::UnresolvedColumn {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Build a REGEXP node. Whether the compiled pattern can be reused
    /// across rows is decided here, by checking the pattern operand for
    /// column references.
    pub fn regexp(left: Expression, right: Expression) -> Expression {
        let mut cached = true;
        right.inspect(&mut |e| {
            if matches!(
                e,
                Expression::Field { .. }
                    | Expression::OuterField { .. }
                    | Expression::UnresolvedColumn { .. }
            ) {
                cached = false;
            }
            true
        });
        Expression::Regexp {
            left: Box::new(left),
            right: Box::new(right),
            state: RegexpState::new(cached),
        }
    }

    /// Node name used in structural error messages.
    pub fn node_name(&self) -> &'static str {
        match self {
            Expression::Literal { .. } => "Literal",
            Expression::Field { .. } => "Field",
            Expression::OuterField { .. } => "OuterField",
            Expression::UnresolvedColumn { .. } => "UnresolvedColumn",
            Expression::Add(..) => "Add",
            Expression::Subtract(..) => "Subtract",
            Expression::Multiply(..) => "Multiply",
            Expression::Divide(..) => "Divide",
            Expression::Equal(..) => "Equal",
            Expression::GreaterThan(..) => "GreaterThan",
            Expression::LessThan(..) => "LessThan",
            Expression::GreaterThanOrEqual(..) => "GreaterThanOrEqual",
            Expression::LessThanOrEqual(..) => "LessThanOrEqual",
            Expression::Regexp { .. } => "Regexp",
            Expression::And(..) => "And",
            Expression::Or(..) => "Or",
            Expression::Not(..) => "Not",
            Expression::In { .. } => "In",
            Expression::Tuple(..) => "Tuple",
            Expression::UnresolvedFunction { .. } => "UnresolvedFunction",
            Expression::Call { .. } => "Call",
            Expression::Subquery(..) => "Subquery",
        }
    }

    /// The static type of this expression. Well-defined once `resolved()`
    /// is true; unresolved nodes report `Null`.
    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Literal { data_type, .. } => data_type.clone(),
            Expression::Field { data_type, .. } => data_type.clone(),
            Expression::OuterField { data_type, .. } => data_type.clone(),
            Expression::UnresolvedColumn { .. } | Expression::UnresolvedFunction { .. } => {
                DataType::Null
            }
            Expression::Add(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r) => arithmetic_type(l, r),
            Expression::Equal(..)
            | Expression::GreaterThan(..)
            | Expression::LessThan(..)
            | Expression::GreaterThanOrEqual(..)
            | Expression::LessThanOrEqual(..)
            | Expression::Regexp { .. }
            | Expression::And(..)
            | Expression::Or(..)
            | Expression::Not(..)
            | Expression::In { .. } => DataType::Bool,
            Expression::Tuple(elements) => {
                DataType::Tuple(elements.iter().map(Expression::data_type).collect())
            }
            Expression::Call { return_type, .. } => return_type.clone(),
            Expression::Subquery(plan) => plan
                .schema()
                .columns()
                .first()
                .map(|c| c.data_type.clone())
                .unwrap_or(DataType::Null),
        }
    }

    pub fn resolved(&self) -> bool {
        match self {
            Expression::Literal { .. }
            | Expression::Field { .. }
            | Expression::OuterField { .. } => true,
            Expression::UnresolvedColumn { .. } | Expression::UnresolvedFunction { .. } => false,
            Expression::Subquery(plan) => plan.resolved(),
            _ => self.children().iter().all(|c| c.resolved()),
        }
    }

    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal { .. }
            | Expression::Field { .. }
            | Expression::OuterField { .. }
            | Expression::UnresolvedColumn { .. }
            | Expression::Subquery(..) => vec![],
            Expression::Add(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::Equal(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::LessThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::LessThanOrEqual(l, r)
            | Expression::And(l, r)
            | Expression::Or(l, r) => vec![l, r],
            Expression::Regexp { left, right, .. } => vec![left, right],
            Expression::In { left, right } => vec![left, right],
            Expression::Not(e) => vec![e],
            Expression::Tuple(elements) => elements.iter().collect(),
            Expression::UnresolvedFunction { args, .. } | Expression::Call { args, .. } => {
                args.iter().collect()
            }
        }
    }

    /// Rebuild this node with new children. Fails when the child count
    /// does not match the node's arity.
    pub fn with_children(&self, children: Vec<Expression>) -> Result<Expression> {
        let want = self.children().len();
        if children.len() != want {
            return Err(Error::invalid_children(
                self.node_name(),
                children.len(),
                want,
            ));
        }
        fn pair(
            it: &mut std::vec::IntoIter<Expression>,
        ) -> (Box<Expression>, Box<Expression>) {
            (Box::new(it.next().unwrap()), Box::new(it.next().unwrap()))
        }
        let mut it = children.into_iter();
        Ok(match self {
            Expression::Literal { .. }
            | Expression::Field { .. }
            | Expression::OuterField { .. }
            | Expression::UnresolvedColumn { .. }
            | Expression::Subquery(..) => self.clone(),
            Expression::Add(..) => {
                let (l, r) = pair(&mut it);
                Expression::Add(l, r)
            }
            Expression::Subtract(..) => {
                let (l, r) = pair(&mut it);
                Expression::Subtract(l, r)
            }
            Expression::Multiply(..) => {
                let (l, r) = pair(&mut it);
                Expression::Multiply(l, r)
            }
            Expression::Divide(..) => {
                let (l, r) = pair(&mut it);
                Expression::Divide(l, r)
            }
            Expression::Equal(..) => {
                let (l, r) = pair(&mut it);
                Expression::Equal(l, r)
            }
            Expression::GreaterThan(..) => {
                let (l, r) = pair(&mut it);
                Expression::GreaterThan(l, r)
            }
            Expression::LessThan(..) => {
                let (l, r) = pair(&mut it);
                Expression::LessThan(l, r)
            }
            Expression::GreaterThanOrEqual(..) => {
                let (l, r) = pair(&mut it);
                Expression::GreaterThanOrEqual(l, r)
            }
            Expression::LessThanOrEqual(..) => {
                let (l, r) = pair(&mut it);
                Expression::LessThanOrEqual(l, r)
            }
            // Rebuilding a REGEXP re-inspects the pattern operand, the
            // same as constructing one.
            Expression::Regexp { .. } => {
                let left = it.next().unwrap();
                let right = it.next().unwrap();
                Expression::regexp(left, right)
            }
            Expression::And(..) => {
                let (l, r) = pair(&mut it);
                Expression::And(l, r)
            }
            Expression::Or(..) => {
                let (l, r) = pair(&mut it);
                Expression::Or(l, r)
            }
            Expression::Not(..) => Expression::Not(Box::new(it.next().unwrap())),
            Expression::In { .. } => {
                let (left, right) = pair(&mut it);
                Expression::In { left, right }
            }
            Expression::Tuple(..) => Expression::Tuple(it.collect()),
            Expression::UnresolvedFunction { name, .. } => Expression::UnresolvedFunction {
                name: name.clone(),
                args: it.collect(),
            },
            Expression::Call {
                func, return_type, ..
            } => Expression::Call {
                func: func.clone(),
                args: it.collect(),
                return_type: return_type.clone(),
            },
        })
    }

    /// Pre-order visitor. Returning false skips the node's children.
    pub fn inspect<F: FnMut(&Expression) -> bool>(&self, f: &mut F) {
        if f(self) {
            for child in self.children() {
                child.inspect(f);
            }
        }
    }

    /// Bottom-up rewrite producing a fresh root.
    pub fn transform_up(&self, f: &dyn Fn(Expression) -> Result<Expression>) -> Result<Expression> {
        let children = self.children();
        let node = if children.is_empty() {
            self.clone()
        } else {
            let rewritten = children
                .into_iter()
                .map(|c| c.transform_up(f))
                .collect::<Result<Vec<_>>>()?;
            self.with_children(rewritten)?
        };
        f(node)
    }

    /// Evaluate the expression against a row.
    pub fn eval(&self, ctx: &QueryContext, row: &Row) -> Result<Value> {
        ctx.check_cancelled()?;
        match self {
            Expression::Literal { value, .. } => Ok(value.clone()),
            // An out-of-range field index is a bug in resolution, not a
            // SQL error: let it panic.
            Expression::Field { index, .. } => Ok(row[*index].clone()),
            Expression::OuterField { name, .. } => Err(Error::Internal(format!(
                "outer field {} evaluated without an enclosing row",
                name
            ))),
            Expression::UnresolvedColumn { name, .. } => Err(Error::Internal(format!(
                "column {} is not resolved",
                name
            ))),
            Expression::UnresolvedFunction { name, .. } => Err(Error::Internal(format!(
                "function {} is not resolved",
                name
            ))),

            Expression::Add(l, r) => arithmetic(ctx, row, l, r, ArithmeticOp::Add),
            Expression::Subtract(l, r) => arithmetic(ctx, row, l, r, ArithmeticOp::Subtract),
            Expression::Multiply(l, r) => arithmetic(ctx, row, l, r, ArithmeticOp::Multiply),
            Expression::Divide(l, r) => arithmetic(ctx, row, l, r, ArithmeticOp::Divide),

            Expression::Equal(l, r) => {
                comparison::eval_comparison(ctx, row, l, r, |o| o == Ordering::Equal)
            }
            Expression::GreaterThan(l, r) => {
                comparison::eval_comparison(ctx, row, l, r, |o| o == Ordering::Greater)
            }
            Expression::LessThan(l, r) => {
                comparison::eval_comparison(ctx, row, l, r, |o| o == Ordering::Less)
            }
            Expression::GreaterThanOrEqual(l, r) => {
                comparison::eval_comparison(ctx, row, l, r, |o| o != Ordering::Less)
            }
            Expression::LessThanOrEqual(l, r) => {
                comparison::eval_comparison(ctx, row, l, r, |o| o != Ordering::Greater)
            }
            Expression::Regexp { left, right, state } => {
                comparison::eval_regexp(ctx, row, left, right, state)
            }

            Expression::And(l, r) => {
                let lval = eval_boolean(ctx, row, l)?;
                let rval = eval_boolean(ctx, row, r)?;
                Ok(match (lval, rval) {
                    (Some(false), _) | (_, Some(false)) => Value::Bool(false),
                    (None, _) | (_, None) => Value::Null,
                    (Some(true), Some(true)) => Value::Bool(true),
                })
            }
            Expression::Or(l, r) => {
                let lval = eval_boolean(ctx, row, l)?;
                let rval = eval_boolean(ctx, row, r)?;
                Ok(match (lval, rval) {
                    (Some(true), _) | (_, Some(true)) => Value::Bool(true),
                    (None, _) | (_, None) => Value::Null,
                    (Some(false), Some(false)) => Value::Bool(false),
                })
            }
            Expression::Not(e) => Ok(match eval_boolean(ctx, row, e)? {
                Some(b) => Value::Bool(!b),
                None => Value::Null,
            }),

            Expression::In { left, right } => eval_in(ctx, row, left, right),

            Expression::Tuple(elements) => {
                let values = elements
                    .iter()
                    .map(|e| e.eval(ctx, row))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Tuple(values))
            }

            Expression::Call { func, args, .. } => {
                let values = args
                    .iter()
                    .map(|a| a.eval(ctx, row))
                    .collect::<Result<Vec<_>>>()?;
                func.call(&values)
            }

            Expression::Subquery(plan) => eval_subquery(ctx, row, plan),
        }
    }

    /// A display name for projection schemas: plain fields keep their
    /// column name, everything else uses its string form.
    pub fn display_name(&self) -> String {
        match self {
            Expression::Field { name, .. } => name.clone(),
            Expression::UnresolvedColumn { name, .. } => name.clone(),
            other => other.to_string(),
        }
    }
}

/// Evaluate an operand as a three-valued boolean: Some(bool) or None for
/// NULL.
fn eval_boolean(
    ctx: &QueryContext,
    row: &Row,
    expr: &Expression,
) -> Result<Option<bool>> {
    match DataType::Bool.convert(expr.eval(ctx, row)?)? {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        _ => unreachable!("Bool.convert returns Bool or Null"),
    }
}

enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// The static result type of an arithmetic node, following the same
/// promotion order the comparison ladder uses. Non-numeric operands
/// coerce to double.
fn arithmetic_type(l: &Expression, r: &Expression) -> DataType {
    let (lt, rt) = (l.data_type(), r.data_type());
    if lt.is_decimal() || rt.is_decimal() {
        DataType::Decimal
    } else if lt.is_float() || rt.is_float() {
        DataType::F64
    } else if !lt.is_numeric() || !rt.is_numeric() {
        DataType::F64
    } else if lt.is_signed() || rt.is_signed() {
        DataType::I64
    } else {
        DataType::U64
    }
}

fn arithmetic(
    ctx: &QueryContext,
    row: &Row,
    l: &Expression,
    r: &Expression,
    op: ArithmeticOp,
) -> Result<Value> {
    let lval = l.eval(ctx, row)?;
    let rval = r.eval(ctx, row)?;
    if lval.is_null() || rval.is_null() {
        return Ok(Value::Null);
    }

    let (lt, rt) = (lval.data_type(), rval.data_type());
    if lt.is_decimal() || rt.is_decimal() {
        let (a, b) = match (coercion::to_decimal(lval)?, coercion::to_decimal(rval)?) {
            (Value::Decimal(a), Value::Decimal(b)) => (a, b),
            _ => unreachable!(),
        };
        let out = match op {
            ArithmeticOp::Add => a.checked_add(b),
            ArithmeticOp::Subtract => a.checked_sub(b),
            ArithmeticOp::Multiply => a.checked_mul(b),
            ArithmeticOp::Divide => {
                if b == Decimal::ZERO {
                    // MySQL yields NULL on division by zero
                    return Ok(Value::Null);
                }
                a.checked_div(b)
            }
        };
        out.map(Value::Decimal)
            .ok_or_else(|| Error::InvalidValue("DECIMAL overflow".into()))
    } else if lt.is_float() || rt.is_float() || !lt.is_numeric() || !rt.is_numeric() {
        let (a, b) = match (coercion::to_double(lval)?, coercion::to_double(rval)?) {
            (Value::F64(a), Value::F64(b)) => (a, b),
            _ => unreachable!(),
        };
        Ok(match op {
            ArithmeticOp::Add => Value::F64(a + b),
            ArithmeticOp::Subtract => Value::F64(a - b),
            ArithmeticOp::Multiply => Value::F64(a * b),
            ArithmeticOp::Divide => {
                if b == 0.0 {
                    return Ok(Value::Null);
                }
                Value::F64(a / b)
            }
        })
    } else if lt.is_signed() || rt.is_signed() {
        let (a, b) = match (coercion::to_signed(lval)?, coercion::to_signed(rval)?) {
            (Value::I64(a), Value::I64(b)) => (a, b),
            _ => unreachable!(),
        };
        let out = match op {
            ArithmeticOp::Add => a.checked_add(b),
            ArithmeticOp::Subtract => a.checked_sub(b),
            ArithmeticOp::Multiply => a.checked_mul(b),
            ArithmeticOp::Divide => {
                if b == 0 {
                    return Ok(Value::Null);
                }
                a.checked_div(b)
            }
        };
        out.map(Value::I64)
            .ok_or_else(|| Error::InvalidValue("BIGINT overflow".into()))
    } else {
        let (a, b) = match (coercion::to_unsigned(lval)?, coercion::to_unsigned(rval)?) {
            (Value::U64(a), Value::U64(b)) => (a, b),
            _ => unreachable!(),
        };
        let out = match op {
            ArithmeticOp::Add => a.checked_add(b),
            ArithmeticOp::Subtract => a.checked_sub(b),
            ArithmeticOp::Multiply => a.checked_mul(b),
            ArithmeticOp::Divide => {
                if b == 0 {
                    return Ok(Value::Null);
                }
                a.checked_div(b)
            }
        };
        out.map(Value::U64)
            .ok_or_else(|| Error::InvalidValue("BIGINT UNSIGNED overflow".into()))
    }
}

fn eval_in(
    ctx: &QueryContext,
    row: &Row,
    left: &Expression,
    right: &Expression,
) -> Result<Value> {
    let right_type = right.data_type();
    if !right_type.is_tuple() {
        return Err(Error::UnsupportedInOperand(right_type.to_string()));
    }

    let lval = left.eval(ctx, row)?;
    let rval = right.eval(ctx, row)?;
    let elements = match rval {
        Value::Tuple(elements) => elements,
        other => return Err(Error::UnsupportedInOperand(other.data_type().to_string())),
    };

    let left_columns = match &lval {
        Value::Tuple(values) => values.len(),
        _ => 1,
    };

    let mut saw_null = lval.is_null();
    let mut matched = false;
    for element in &elements {
        let element_columns = match element {
            Value::Tuple(values) => values.len(),
            _ => 1,
        };
        if element_columns != left_columns {
            return Err(Error::InvalidOperandColumns {
                expected: left_columns,
                actual: element_columns,
            });
        }
        if matched || saw_null {
            continue;
        }
        if element.is_null() {
            saw_null = true;
            continue;
        }
        if comparison::compare_values(&lval, element)? == Ordering::Equal {
            matched = true;
        }
    }

    if matched {
        Ok(Value::Bool(true))
    } else if saw_null {
        Ok(Value::Null)
    } else {
        Ok(Value::Bool(false))
    }
}

fn eval_subquery(ctx: &QueryContext, row: &Row, plan: &Plan) -> Result<Value> {
    // Bind correlated references to the current row, then execute.
    let bound = plan.transform_expressions(&|e| {
        e.transform_up(&|node| match node {
            Expression::OuterField { index, name, .. } => {
                let value = row.get(index).cloned().ok_or_else(|| {
                    Error::Internal(format!("outer field {} out of range", name))
                })?;
                let data_type = value.data_type();
                Ok(Expression::Literal { value, data_type })
            }
            other => Ok(other),
        })
    })?;

    let mut iter = bound.rows(ctx)?;
    let first = match iter.next() {
        None => return Ok(Value::Null),
        Some(row) => row?,
    };
    if iter.next().is_some() {
        return Err(Error::ExecutionError(
            "scalar subquery returned more than one row".into(),
        ));
    }
    if first.len() != 1 {
        return Err(Error::InvalidOperandColumns {
            expected: 1,
            actual: first.len(),
        });
    }
    Ok(first.into_iter().next().unwrap())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal { value, .. } => write!(f, "{}", value),
            Expression::Field { name, .. } => write!(f, "{}", name),
            Expression::OuterField { name, .. } => write!(f, "outer({})", name),
            Expression::UnresolvedColumn { table, name } => match table {
                Some(t) => write!(f, "{}.{}", t, name),
                None => write!(f, "{}", name),
            },
            Expression::Add(l, r) => write!(f, "({} + {})", l, r),
            Expression::Subtract(l, r) => write!(f, "({} - {})", l, r),
            Expression::Multiply(l, r) => write!(f, "({} * {})", l, r),
            Expression::Divide(l, r) => write!(f, "({} / {})", l, r),
            Expression::Equal(l, r) => write!(f, "({} = {})", l, r),
            Expression::GreaterThan(l, r) => write!(f, "({} > {})", l, r),
            Expression::LessThan(l, r) => write!(f, "({} < {})", l, r),
            Expression::GreaterThanOrEqual(l, r) => write!(f, "({} >= {})", l, r),
            Expression::LessThanOrEqual(l, r) => write!(f, "({} <= {})", l, r),
            Expression::Regexp { left, right, .. } => write!(f, "({} REGEXP {})", left, right),
            Expression::And(l, r) => write!(f, "({} AND {})", l, r),
            Expression::Or(l, r) => write!(f, "({} OR {})", l, r),
            Expression::Not(e) => write!(f, "(NOT {})", e),
            Expression::In { left, right } => write!(f, "({} IN {})", left, right),
            Expression::Tuple(elements) => {
                write!(f, "(")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, ")")
            }
            Expression::UnresolvedFunction { name, .. } => write_call(f, name, self.children()),
            Expression::Call { func, .. } => write_call(f, func.name(), self.children()),
            Expression::Subquery(_) => write!(f, "(subquery)"),
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, args: Vec<&Expression>) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ")")
}
