//! Rule-based plan analysis
//!
//! The analyzer runs ordered batches of rewrite rules over a logical
//! plan. Iterative batches repeat until the tree stops changing or a
//! safety bound trips; the driver absorbs iteration exhaustion so later
//! batches still run against the best plan so far.

use std::sync::Arc;

use parking_lot::Mutex;
use similar::TextDiff;
use thiserror::Error as ThisError;
use tracing::field::Empty;
use tracing::{debug_span, info};

use crate::catalog::Catalog;
use crate::context::QueryContext;
use crate::error::{Error, Result};
use crate::planning::Plan;
use crate::types::Schema;

mod rules;
mod validate;

/// Environment variable that forces debug mode regardless of the builder
/// flag.
const DEBUG_ANALYZER_KEY: &str = "DEBUG_ANALYZER";

/// Iteration bound for the iterative batches.
pub const MAX_ANALYSIS_ITERATIONS: usize = 1000;

/// A rewrite rule: a named pure function over plans.
pub type RuleFn = fn(&QueryContext, &Analyzer, Plan, &Scope) -> Result<Plan>;

#[derive(Clone)]
pub struct Rule {
    pub name: &'static str,
    pub apply: RuleFn,
}

impl Rule {
    pub fn new(name: &'static str, apply: RuleFn) -> Self {
        Self { name, apply }
    }
}

/// A stack of enclosing query schemas, innermost last. Lets subquery
/// resolution bind correlated references against the parent query.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    frames: Vec<Schema>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, schema: Schema) {
        self.frames.push(schema);
    }

    /// The innermost enclosing schema, if any.
    pub fn innermost(&self) -> Option<&Schema> {
        self.frames.last()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// A batch failure carrying the last good plan alongside the error.
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("{error}")]
pub struct AnalysisFailure {
    pub plan: Plan,
    pub error: Error,
}

/// An ordered list of rules applied to fixed point.
pub struct Batch {
    pub description: &'static str,
    pub max_iterations: usize,
    pub rules: Vec<Rule>,
}

impl Batch {
    /// Run the batch's rules in order, repeating until the plan stops
    /// changing or the iteration bound trips. A rule error returns the
    /// pre-rule plan; exhaustion returns the last plan with
    /// `MaxAnalysisIters`. Single-pass batches run once and never report
    /// exhaustion.
    pub fn eval(
        &self,
        ctx: &QueryContext,
        analyzer: &Analyzer,
        plan: Plan,
        scope: &Scope,
    ) -> std::result::Result<Plan, AnalysisFailure> {
        if self.max_iterations == 0 || self.rules.is_empty() {
            return Ok(plan);
        }
        let mut current = plan;
        let mut iterations = 0;
        loop {
            if let Err(error) = ctx.check_cancelled() {
                return Err(AnalysisFailure {
                    plan: current,
                    error,
                });
            }
            let prev = current.clone();
            for rule in &self.rules {
                let before = current;
                match (rule.apply)(ctx, analyzer, before.clone(), scope) {
                    Ok(next) => {
                        analyzer.log_diff(rule.name, &before, &next);
                        current = next;
                    }
                    Err(error) => {
                        analyzer.log(&format!("rule {} failed: {}", rule.name, error));
                        return Err(AnalysisFailure { plan: before, error });
                    }
                }
            }
            iterations += 1;
            if current == prev || self.max_iterations == 1 {
                break;
            }
            if iterations >= self.max_iterations {
                return Err(AnalysisFailure {
                    plan: current,
                    error: Error::MaxAnalysisIters(self.max_iterations),
                });
            }
        }
        Ok(current)
    }
}

/// Analyzes plans by applying rule batches and validations in order.
pub struct Analyzer {
    /// Whether to log debugging messages.
    pub debug: bool,
    /// Whether to log plan diffs after each rule application.
    pub verbose: bool,
    /// Parallelism hint carried for downstream physical operators; the
    /// analyzer itself is single-threaded per query.
    pub parallelism: usize,
    pub batches: Vec<Batch>,
    pub catalog: Arc<Catalog>,
    context_stack: Mutex<Vec<String>>,
}

impl Analyzer {
    /// Default analyzer with the standard rule batches.
    pub fn with_default_rules(catalog: Arc<Catalog>) -> Self {
        Builder::new(catalog).build()
    }

    /// Apply the batches to the plan. On failure the error carries the
    /// last successfully transformed plan. A batch that exhausts its
    /// iteration bound is absorbed: its last plan feeds the next batch.
    pub fn analyze(
        &self,
        ctx: &QueryContext,
        plan: Plan,
        scope: &Scope,
    ) -> std::result::Result<Plan, AnalysisFailure> {
        let span = debug_span!("analyze", plan = %plan, is_resolved = Empty);
        let _guard = span.enter();

        self.log(&format!("starting analysis of {}", plan.node_name()));
        let mut current = plan;
        for batch in &self.batches {
            self.push_debug_context(batch.description);
            let outcome = batch.eval(ctx, self, current, scope);
            self.pop_debug_context();
            current = match outcome {
                Ok(next) => next,
                Err(failure) if matches!(failure.error, Error::MaxAnalysisIters(_)) => {
                    self.log(&format!(
                        "batch {} did not converge: {}",
                        batch.description, failure.error
                    ));
                    failure.plan
                }
                Err(failure) => {
                    self.log(&format!("encountered error: {}", failure.error));
                    span.record("is_resolved", failure.plan.resolved());
                    return Err(failure);
                }
            };
        }

        span.record("is_resolved", current.resolved());
        Ok(current)
    }

    /// Log an informational message when debug mode is on, prefixed with
    /// the `/`-joined context stack.
    pub fn log(&self, message: &str) {
        if !self.debug {
            return;
        }
        let stack = self.context_stack.lock();
        if stack.is_empty() {
            info!("{}", message);
        } else {
            info!("{}: {}", stack.join("/"), message);
        }
    }

    /// Log a unified diff between the plans before and after a rule, when
    /// both debug and verbose are on and the string forms differ.
    pub fn log_diff(&self, rule: &str, before: &Plan, after: &Plan) {
        if !(self.debug && self.verbose) || before == after {
            return;
        }
        let old = before.to_string();
        let new = after.to_string();
        if old == new {
            return;
        }
        let diff = TextDiff::from_lines(&old, &new)
            .unified_diff()
            .header("prev", "next")
            .to_string();
        self.log(&format!("rule {}:\n{}", rule, diff));
    }

    pub fn push_debug_context(&self, context: &str) {
        self.context_stack.lock().push(context.to_string());
    }

    pub fn pop_debug_context(&self) {
        self.context_stack.lock().pop();
    }
}

/// Assembles an `Analyzer` with the fixed batch order, letting callers
/// splice custom rules around the defaults.
pub struct Builder {
    catalog: Arc<Catalog>,
    pre_analyze_rules: Vec<Rule>,
    post_analyze_rules: Vec<Rule>,
    pre_validation_rules: Vec<Rule>,
    post_validation_rules: Vec<Rule>,
    after_all_rules: Vec<Rule>,
    debug: bool,
    verbose: bool,
    parallelism: usize,
}

impl Builder {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            pre_analyze_rules: Vec::new(),
            post_analyze_rules: Vec::new(),
            pre_validation_rules: Vec::new(),
            post_validation_rules: Vec::new(),
            after_all_rules: Vec::new(),
            debug: false,
            verbose: false,
            parallelism: 0,
        }
    }

    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn add_pre_analyze_rule(mut self, name: &'static str, apply: RuleFn) -> Self {
        self.pre_analyze_rules.push(Rule::new(name, apply));
        self
    }

    pub fn add_post_analyze_rule(mut self, name: &'static str, apply: RuleFn) -> Self {
        self.post_analyze_rules.push(Rule::new(name, apply));
        self
    }

    pub fn add_pre_validation_rule(mut self, name: &'static str, apply: RuleFn) -> Self {
        self.pre_validation_rules.push(Rule::new(name, apply));
        self
    }

    pub fn add_post_validation_rule(mut self, name: &'static str, apply: RuleFn) -> Self {
        self.post_validation_rules.push(Rule::new(name, apply));
        self
    }

    pub fn add_after_all_rule(mut self, name: &'static str, apply: RuleFn) -> Self {
        self.after_all_rules.push(Rule::new(name, apply));
        self
    }

    pub fn build(self) -> Analyzer {
        let debug = self.debug || std::env::var_os(DEBUG_ANALYZER_KEY).is_some();
        let batches = vec![
            Batch {
                description: "pre-analyzer",
                max_iterations: MAX_ANALYSIS_ITERATIONS,
                rules: self.pre_analyze_rules,
            },
            Batch {
                description: "once-before",
                max_iterations: 1,
                rules: rules::once_before_default(),
            },
            Batch {
                description: "default-rules",
                max_iterations: MAX_ANALYSIS_ITERATIONS,
                rules: rules::default_rules(),
            },
            Batch {
                description: "once-after",
                max_iterations: 1,
                rules: rules::once_after_default(),
            },
            Batch {
                description: "post-analyzer",
                max_iterations: MAX_ANALYSIS_ITERATIONS,
                rules: self.post_analyze_rules,
            },
            Batch {
                description: "pre-validation",
                max_iterations: 1,
                rules: self.pre_validation_rules,
            },
            Batch {
                description: "validation",
                max_iterations: 1,
                rules: validate::default_validation_rules(),
            },
            Batch {
                description: "post-validation",
                max_iterations: 1,
                rules: self.post_validation_rules,
            },
            Batch {
                description: "after-all",
                max_iterations: 1,
                rules: self.after_all_rules,
            },
        ];
        Analyzer {
            debug,
            verbose: self.verbose,
            parallelism: self.parallelism,
            batches,
            catalog: self.catalog,
            context_stack: Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;
    use crate::types::{DataType, Value};

    fn ctx() -> QueryContext {
        QueryContext::new(1).with_database("mydb")
    }

    fn catalog() -> Arc<Catalog> {
        use crate::catalog::{Database, Table};
        use crate::types::{Column, Schema};
        let mut catalog = Catalog::new();
        catalog.add_database(Database::new("mydb").with_table(Table::new(
            "users",
            Schema::new(vec![
                Column::new("id", DataType::I64).with_table("users"),
                Column::new("name", DataType::Text).with_table("users"),
            ]),
        )));
        Arc::new(catalog)
    }

    fn unresolved_filter() -> Plan {
        Plan::Filter {
            predicate: Expression::Equal(
                Box::new(Expression::column("id")),
                Box::new(Expression::integer(1)),
            ),
            input: Box::new(Plan::UnresolvedTable {
                database: None,
                name: "users".into(),
            }),
        }
    }

    #[test]
    fn test_analyze_resolves_plan() {
        let analyzer = Analyzer::with_default_rules(catalog());
        let plan = analyzer
            .analyze(&ctx(), unresolved_filter(), &Scope::new())
            .unwrap();
        assert!(plan.resolved());
    }

    #[test]
    fn test_analyze_is_idempotent_at_fixed_point() {
        let analyzer = Analyzer::with_default_rules(catalog());
        let once = analyzer
            .analyze(&ctx(), unresolved_filter(), &Scope::new())
            .unwrap();
        let twice = analyzer
            .analyze(&ctx(), once.clone(), &Scope::new())
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_analyze_missing_table_returns_last_plan() {
        let analyzer = Analyzer::with_default_rules(catalog());
        let plan = Plan::UnresolvedTable {
            database: None,
            name: "missing".into(),
        };
        let failure = analyzer
            .analyze(&ctx(), plan.clone(), &Scope::new())
            .unwrap_err();
        assert_eq!(failure.error, Error::TableNotFound("missing".into()));
        assert_eq!(failure.plan, plan);
    }

    fn wrap_in_filter(
        _ctx: &QueryContext,
        _analyzer: &Analyzer,
        plan: Plan,
        _scope: &Scope,
    ) -> Result<Plan> {
        // Never converges: every application grows the tree.
        Ok(Plan::Filter {
            predicate: Expression::literal(Value::Bool(true), DataType::Bool),
            input: Box::new(plan),
        })
    }

    #[test]
    fn test_batch_reports_iteration_exhaustion() {
        let batch = Batch {
            description: "test",
            max_iterations: 3,
            rules: vec![Rule::new("wrap_in_filter", wrap_in_filter)],
        };
        let analyzer = Analyzer::with_default_rules(catalog());
        let scan = Plan::ResolvedTable(catalog().table("mydb", "users").unwrap());
        let failure = batch
            .eval(&ctx(), &analyzer, scan, &Scope::new())
            .unwrap_err();
        assert_eq!(failure.error, Error::MaxAnalysisIters(3));
        // Three passes of the rule ran before the bound tripped.
        let mut depth = 0;
        let mut node = failure.plan;
        while let Plan::Filter { input, .. } = node {
            depth += 1;
            node = *input;
        }
        assert_eq!(depth, 3);
    }

    #[test]
    fn test_single_pass_batch_never_reports_exhaustion() {
        let batch = Batch {
            description: "test",
            max_iterations: 1,
            rules: vec![Rule::new("wrap_in_filter", wrap_in_filter)],
        };
        let analyzer = Analyzer::with_default_rules(catalog());
        let scan = Plan::ResolvedTable(catalog().table("mydb", "users").unwrap());
        let plan = batch.eval(&ctx(), &analyzer, scan, &Scope::new()).unwrap();
        assert!(matches!(plan, Plan::Filter { .. }));
    }

    #[test]
    fn test_driver_absorbs_iteration_exhaustion() {
        // A post-analyzer rule that never converges exhausts its batch,
        // but the driver carries on and completes the run.
        let analyzer = Builder::new(catalog())
            .add_post_analyze_rule("wrap_in_filter", wrap_in_filter)
            .build();
        let plan = analyzer
            .analyze(&ctx(), unresolved_filter(), &Scope::new())
            .unwrap();
        assert!(plan.resolved());
    }

    fn failing_rule(
        _ctx: &QueryContext,
        _analyzer: &Analyzer,
        _plan: Plan,
        _scope: &Scope,
    ) -> Result<Plan> {
        Err(Error::InAnalysis("rule exploded".into()))
    }

    #[test]
    fn test_rule_error_returns_pre_rule_plan() {
        let analyzer = Builder::new(catalog())
            .add_pre_analyze_rule("failing_rule", failing_rule)
            .build();
        let plan = unresolved_filter();
        let failure = analyzer
            .analyze(&ctx(), plan.clone(), &Scope::new())
            .unwrap_err();
        assert_eq!(failure.error, Error::InAnalysis("rule exploded".into()));
        assert_eq!(failure.plan, plan);
    }

    #[test]
    fn test_cancellation_aborts_batches() {
        let analyzer = Analyzer::with_default_rules(catalog());
        let ctx = ctx();
        ctx.cancel();
        let failure = analyzer
            .analyze(&ctx, unresolved_filter(), &Scope::new())
            .unwrap_err();
        assert_eq!(failure.error, Error::Cancelled);
    }
}
