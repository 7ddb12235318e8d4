//! Logical plan trees
//!
//! Plans are immutable trees of relational operators. The analyzer
//! rewrites them into resolved form; resolved streaming nodes can then
//! pull rows recursively from their children.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::catalog::Table;
use crate::context::QueryContext;
use crate::error::{Error, Result};
use crate::expression::comparison;
use crate::expression::Expression;
use crate::types::{Column, Row, Schema, Value};

/// Sort direction for a sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A single ORDER BY key
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expression: Expression,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "InnerJoin"),
            JoinType::Left => write!(f, "LeftJoin"),
            JoinType::Right => write!(f, "RightJoin"),
        }
    }
}

/// A logical plan node
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// A table reference that has not been looked up in the catalog yet.
    UnresolvedTable {
        database: Option<String>,
        name: String,
    },
    /// A catalog-backed table scan.
    ResolvedTable(Arc<Table>),
    Project {
        expressions: Vec<Expression>,
        input: Box<Plan>,
    },
    Filter {
        predicate: Expression,
        input: Box<Plan>,
    },
    Sort {
        keys: Vec<SortKey>,
        input: Box<Plan>,
    },
    Limit {
        limit: usize,
        input: Box<Plan>,
    },
    GroupBy {
        group_by: Vec<Expression>,
        projections: Vec<Expression>,
        input: Box<Plan>,
    },
    Join {
        join_type: JoinType,
        on: Expression,
        left: Box<Plan>,
        right: Box<Plan>,
    },
    SubqueryAlias {
        name: String,
        input: Box<Plan>,
    },
    Union {
        left: Box<Plan>,
        right: Box<Plan>,
    },
}

impl Plan {
    pub fn node_name(&self) -> &'static str {
        match self {
            Plan::UnresolvedTable { .. } => "UnresolvedTable",
            Plan::ResolvedTable(..) => "ResolvedTable",
            Plan::Project { .. } => "Project",
            Plan::Filter { .. } => "Filter",
            Plan::Sort { .. } => "Sort",
            Plan::Limit { .. } => "Limit",
            Plan::GroupBy { .. } => "GroupBy",
            Plan::Join { .. } => "Join",
            Plan::SubqueryAlias { .. } => "SubqueryAlias",
            Plan::Union { .. } => "Union",
        }
    }

    /// The schema of the rows this node produces. Unresolved nodes report
    /// an empty schema.
    pub fn schema(&self) -> Schema {
        match self {
            Plan::UnresolvedTable { .. } => Schema::default(),
            Plan::ResolvedTable(table) => table.schema().clone(),
            Plan::Project { expressions, .. } => projection_schema(expressions),
            Plan::Filter { input, .. } | Plan::Sort { input, .. } | Plan::Limit { input, .. } => {
                input.schema()
            }
            Plan::GroupBy { projections, .. } => projection_schema(projections),
            Plan::Join { left, right, .. } => left.schema().join(&right.schema()),
            Plan::SubqueryAlias { name, input } => input.schema().qualify(name),
            Plan::Union { left, .. } => left.schema(),
        }
    }

    pub fn children(&self) -> Vec<&Plan> {
        match self {
            Plan::UnresolvedTable { .. } | Plan::ResolvedTable(..) => vec![],
            Plan::Project { input, .. }
            | Plan::Filter { input, .. }
            | Plan::Sort { input, .. }
            | Plan::Limit { input, .. }
            | Plan::GroupBy { input, .. }
            | Plan::SubqueryAlias { input, .. } => vec![input],
            Plan::Join { left, right, .. } | Plan::Union { left, right } => vec![left, right],
        }
    }

    /// The expressions held directly by this node (not its children's).
    pub fn expressions(&self) -> Vec<&Expression> {
        match self {
            Plan::Project { expressions, .. } => expressions.iter().collect(),
            Plan::Filter { predicate, .. } => vec![predicate],
            Plan::Sort { keys, .. } => keys.iter().map(|k| &k.expression).collect(),
            Plan::GroupBy {
                group_by,
                projections,
                ..
            } => group_by.iter().chain(projections.iter()).collect(),
            Plan::Join { on, .. } => vec![on],
            _ => vec![],
        }
    }

    /// Rebuild this node with new children. Fails when the child count
    /// does not match the node's arity.
    pub fn with_children(&self, children: Vec<Plan>) -> Result<Plan> {
        let want = self.children().len();
        if children.len() != want {
            return Err(Error::invalid_children(
                self.node_name(),
                children.len(),
                want,
            ));
        }
        let mut it = children.into_iter();
        Ok(match self {
            Plan::UnresolvedTable { .. } | Plan::ResolvedTable(..) => self.clone(),
            Plan::Project { expressions, .. } => Plan::Project {
                expressions: expressions.clone(),
                input: Box::new(it.next().unwrap()),
            },
            Plan::Filter { predicate, .. } => Plan::Filter {
                predicate: predicate.clone(),
                input: Box::new(it.next().unwrap()),
            },
            Plan::Sort { keys, .. } => Plan::Sort {
                keys: keys.clone(),
                input: Box::new(it.next().unwrap()),
            },
            Plan::Limit { limit, .. } => Plan::Limit {
                limit: *limit,
                input: Box::new(it.next().unwrap()),
            },
            Plan::GroupBy {
                group_by,
                projections,
                ..
            } => Plan::GroupBy {
                group_by: group_by.clone(),
                projections: projections.clone(),
                input: Box::new(it.next().unwrap()),
            },
            Plan::Join { join_type, on, .. } => Plan::Join {
                join_type: *join_type,
                on: on.clone(),
                left: Box::new(it.next().unwrap()),
                right: Box::new(it.next().unwrap()),
            },
            Plan::SubqueryAlias { name, .. } => Plan::SubqueryAlias {
                name: name.clone(),
                input: Box::new(it.next().unwrap()),
            },
            Plan::Union { .. } => Plan::Union {
                left: Box::new(it.next().unwrap()),
                right: Box::new(it.next().unwrap()),
            },
        })
    }

    /// A plan is resolved when every node and every contained expression
    /// is resolved.
    pub fn resolved(&self) -> bool {
        match self {
            Plan::UnresolvedTable { .. } => false,
            Plan::ResolvedTable(..) => true,
            _ => {
                self.expressions().iter().all(|e| e.resolved())
                    && self.children().iter().all(|c| c.resolved())
            }
        }
    }

    /// Bottom-up rewrite producing a fresh root.
    pub fn transform_up(&self, f: &dyn Fn(Plan) -> Result<Plan>) -> Result<Plan> {
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

    /// Rebuild this node with new expressions, in the order
    /// `expressions()` reports them. Fails on a count mismatch.
    pub fn with_expressions(&self, expressions: Vec<Expression>) -> Result<Plan> {
        let want = self.expressions().len();
        if expressions.len() != want {
            return Err(Error::invalid_children(
                self.node_name(),
                expressions.len(),
                want,
            ));
        }
        let mut it = expressions.into_iter();
        Ok(match self {
            Plan::Project { input, .. } => Plan::Project {
                expressions: it.collect(),
                input: input.clone(),
            },
            Plan::Filter { input, .. } => Plan::Filter {
                predicate: it.next().unwrap(),
                input: input.clone(),
            },
            Plan::Sort { keys, input } => Plan::Sort {
                keys: keys
                    .iter()
                    .map(|k| SortKey {
                        expression: it.next().unwrap(),
                        direction: k.direction,
                    })
                    .collect(),
                input: input.clone(),
            },
            Plan::GroupBy {
                group_by,
                input,
                ..
            } => {
                let groups = it.by_ref().take(group_by.len()).collect();
                Plan::GroupBy {
                    group_by: groups,
                    projections: it.collect(),
                    input: input.clone(),
                }
            }
            Plan::Join {
                join_type,
                left,
                right,
                ..
            } => Plan::Join {
                join_type: *join_type,
                on: it.next().unwrap(),
                left: left.clone(),
                right: right.clone(),
            },
            other => other.clone(),
        })
    }

    /// Apply a rewrite to every expression of every node, bottom-up over
    /// the plan.
    pub fn transform_expressions(
        &self,
        f: &dyn Fn(Expression) -> Result<Expression>,
    ) -> Result<Plan> {
        self.transform_up(&|node| {
            let expressions = node
                .expressions()
                .into_iter()
                .cloned()
                .map(|e| f(e))
                .collect::<Result<Vec<_>>>()?;
            node.with_expressions(expressions)
        })
    }

    /// Pull rows from this node. Only streaming nodes produce rows; join
    /// and grouped aggregation belong to the execution engine above this
    /// crate.
    pub fn rows(&self, ctx: &QueryContext) -> Result<Box<dyn Iterator<Item = Result<Row>>>> {
        ctx.check_cancelled()?;
        match self {
            Plan::UnresolvedTable { .. } => Err(Error::InvalidNodeType {
                context: "row source".into(),
                actual: self.node_name().into(),
            }),
            Plan::ResolvedTable(table) => {
                let rows = table.rows().to_vec();
                Ok(Box::new(rows.into_iter().map(Ok)))
            }
            Plan::Filter { predicate, input } => {
                let input = input.rows(ctx)?;
                let predicate = predicate.clone();
                let ctx = ctx.clone();
                Ok(Box::new(input.filter_map(move |row| match row {
                    Ok(row) => match predicate.eval(&ctx, &row) {
                        Ok(value) if value.is_true() => Some(Ok(row)),
                        Ok(_) => None,
                        Err(e) => Some(Err(e)),
                    },
                    Err(e) => Some(Err(e)),
                })))
            }
            Plan::Project { expressions, input } => {
                let input = input.rows(ctx)?;
                let expressions = expressions.clone();
                let ctx = ctx.clone();
                Ok(Box::new(input.map(move |row| {
                    let row = row?;
                    expressions
                        .iter()
                        .map(|e| e.eval(&ctx, &row))
                        .collect::<Result<Row>>()
                })))
            }
            Plan::Sort { keys, input } => {
                let mut rows = input.rows(ctx)?.collect::<Result<Vec<Row>>>()?;
                let keyed = rows
                    .iter()
                    .map(|row| {
                        keys.iter()
                            .map(|k| k.expression.eval(ctx, row))
                            .collect::<Result<Vec<Value>>>()
                    })
                    .collect::<Result<Vec<_>>>()?;
                let mut order: Vec<usize> = (0..rows.len()).collect();
                order.sort_by(|&a, &b| {
                    for (key, (va, vb)) in keys.iter().zip(keyed[a].iter().zip(keyed[b].iter()))
                    {
                        let ord = order_values(va, vb);
                        let ord = match key.direction {
                            Direction::Ascending => ord,
                            Direction::Descending => ord.reverse(),
                        };
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    Ordering::Equal
                });
                // Reorder without cloning the rows themselves.
                let mut sorted = Vec::with_capacity(rows.len());
                for index in order {
                    sorted.push(std::mem::take(&mut rows[index]));
                }
                Ok(Box::new(sorted.into_iter().map(Ok)))
            }
            Plan::Limit { limit, input } => {
                let input = input.rows(ctx)?;
                Ok(Box::new(input.take(*limit)))
            }
            Plan::SubqueryAlias { input, .. } => input.rows(ctx),
            Plan::Union { left, right } => {
                let left = left.rows(ctx)?;
                let right = right.rows(ctx)?;
                Ok(Box::new(left.chain(right)))
            }
            Plan::GroupBy { .. } | Plan::Join { .. } => Err(Error::ExecutionError(format!(
                "{} does not produce rows here; it requires the execution engine",
                self.node_name()
            ))),
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for _ in 0..indent {
            write!(f, "    ")?;
        }
        match self {
            Plan::UnresolvedTable { database, name } => match database {
                Some(db) => writeln!(f, "UnresolvedTable({}.{})", db, name),
                None => writeln!(f, "UnresolvedTable({})", name),
            },
            Plan::ResolvedTable(table) => writeln!(f, "Table({})", table.name()),
            Plan::Project { expressions, .. } => {
                writeln!(f, "Project({})", join_expressions(expressions))
            }
            Plan::Filter { predicate, .. } => writeln!(f, "Filter({})", predicate),
            Plan::Sort { keys, .. } => {
                write!(f, "Sort(")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let dir = match key.direction {
                        Direction::Ascending => "ASC",
                        Direction::Descending => "DESC",
                    };
                    write!(f, "{} {}", key.expression, dir)?;
                }
                writeln!(f, ")")
            }
            Plan::Limit { limit, .. } => writeln!(f, "Limit({})", limit),
            Plan::GroupBy {
                group_by,
                projections,
                ..
            } => writeln!(
                f,
                "GroupBy({}; {})",
                join_expressions(group_by),
                join_expressions(projections)
            ),
            Plan::Join { join_type, on, .. } => writeln!(f, "{}({})", join_type, on),
            Plan::SubqueryAlias { name, .. } => writeln!(f, "SubqueryAlias({})", name),
            Plan::Union { .. } => writeln!(f, "Union"),
        }?;
        for child in self.children() {
            child.fmt_tree(f, indent + 1)?;
        }
        Ok(())
    }
}

fn projection_schema(expressions: &[Expression]) -> Schema {
    Schema::new(
        expressions
            .iter()
            .map(|e| Column::new(e.display_name(), e.data_type()))
            .collect(),
    )
}

fn join_expressions(expressions: &[Expression]) -> String {
    expressions
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Best-effort total order across values of possibly different types,
/// used by Sort. NULLs sort first; any pair whose comparison fails
/// (incomparable types, coercion errors, mismatched tuple arity) keeps
/// its relative order.
fn order_values(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => comparison::compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
