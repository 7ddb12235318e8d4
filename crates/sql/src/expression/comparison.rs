//! The shared comparison kernel and the REGEXP matcher pool
//!
//! All six comparison operators evaluate both operands, screen NULLs with
//! the `NilOperand` sentinel, and coerce mismatched types through a fixed
//! priority ladder before delegating to the common type's ordering. The
//! sentinel becomes the SQL value NULL at exactly one place: the
//! operator's top-level eval.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use regex::Regex;

use crate::coercion;
use crate::context::QueryContext;
use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::types::{DataType, Row, Value};

/// Evaluate a comparison operator: run the kernel, then map the ordering
/// through the operator's predicate. `NilOperand` becomes NULL here.
pub(crate) fn eval_comparison(
    ctx: &QueryContext,
    row: &Row,
    left: &Expression,
    right: &Expression,
    truth: fn(Ordering) -> bool,
) -> Result<Value> {
    match compare(ctx, row, left, right) {
        Ok(ordering) => Ok(Value::Bool(truth(ordering))),
        Err(Error::NilOperand) => Ok(Value::Null),
        Err(e) => Err(e),
    }
}

/// The comparison kernel. Left evaluates strictly before right.
pub(crate) fn compare(
    ctx: &QueryContext,
    row: &Row,
    left: &Expression,
    right: &Expression,
) -> Result<Ordering> {
    let lval = left.eval(ctx, row)?;
    let rval = right.eval(ctx, row)?;

    if lval.is_null() || rval.is_null() {
        return Err(Error::NilOperand);
    }

    let left_type = left.data_type();
    let right_type = right.data_type();
    if left_type == right_type {
        return left_type.compare(&lval, &rval);
    }
    coerced_compare(&lval, &rval, &left_type, &right_type)
}

/// Compare two non-NULL values by their runtime types. Used where no
/// static expression types are available (IN lists, sorting). Tuples
/// compare elementwise with NULLs ordered first.
pub(crate) fn compare_values(left: &Value, right: &Value) -> Result<Ordering> {
    if let (Value::Tuple(a), Value::Tuple(b)) = (left, right) {
        if a.len() != b.len() {
            return Err(Error::InvalidOperandColumns {
                expected: a.len(),
                actual: b.len(),
            });
        }
        for (l, r) in a.iter().zip(b) {
            let ord = match (l.is_null(), r.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => compare_values(l, r)?,
            };
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        return Ok(Ordering::Equal);
    }
    let left_type = left.data_type();
    let right_type = right.data_type();
    if left_type == right_type {
        return left_type.compare(left, right);
    }
    coerced_compare(left, right, &left_type, &right_type)
}

/// The coercion priority ladder. First matching rule wins:
///
/// 1. number vs decimal  -> both to decimal
/// 2. number vs float    -> both to double
/// 3. number vs signed   -> both to signed
/// 4. number vs anything -> both to unsigned
/// 5. no numbers         -> both to text
fn coerced_compare(
    lval: &Value,
    rval: &Value,
    left_type: &DataType,
    right_type: &DataType,
) -> Result<Ordering> {
    if left_type.is_numeric() || right_type.is_numeric() {
        if left_type.is_decimal() || right_type.is_decimal() {
            let l = coercion::to_decimal(lval.clone())?;
            let r = coercion::to_decimal(rval.clone())?;
            return DataType::Decimal.compare(&l, &r);
        }
        if left_type.is_float() || right_type.is_float() {
            let l = coercion::to_double(lval.clone())?;
            let r = coercion::to_double(rval.clone())?;
            return DataType::F64.compare(&l, &r);
        }
        if left_type.is_signed() || right_type.is_signed() {
            let l = coercion::to_signed(lval.clone())?;
            let r = coercion::to_signed(rval.clone())?;
            return DataType::I64.compare(&l, &r);
        }
        let l = coercion::to_unsigned(lval.clone())?;
        let r = coercion::to_unsigned(rval.clone())?;
        return DataType::U64.compare(&l, &r);
    }
    let l = coercion::to_text(lval.clone())?;
    let r = coercion::to_text(rval.clone())?;
    DataType::Text.compare(&l, &r)
}

/// Per-node REGEXP evaluation state. `cached` is decided at construction;
/// the pool is created lazily on first evaluation and shared by clones of
/// the node. Structural equality only considers the cached flag.
#[derive(Clone)]
pub struct RegexpState {
    cached: bool,
    pool: Arc<OnceLock<Arc<MatcherPool>>>,
}

impl RegexpState {
    pub(crate) fn new(cached: bool) -> Self {
        Self {
            cached,
            pool: Arc::new(OnceLock::new()),
        }
    }

    pub fn cached(&self) -> bool {
        self.cached
    }

    #[cfg(test)]
    pub(crate) fn idle_matchers(&self) -> usize {
        self.pool.get().map_or(0, |p| p.idle_len())
    }
}

impl PartialEq for RegexpState {
    fn eq(&self, other: &Self) -> bool {
        self.cached == other.cached
    }
}

impl fmt::Debug for RegexpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexpState")
            .field("cached", &self.cached)
            .finish()
    }
}

/// A thread-safe free-list of compiled matchers for one constant pattern.
struct MatcherPool {
    pattern: String,
    idle: Mutex<Vec<Regex>>,
}

impl MatcherPool {
    fn new(pattern: String) -> Self {
        Self {
            pattern,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Take an idle matcher or compile a fresh one. The guard returns the
    /// matcher to the pool when dropped, on every exit path.
    fn acquire(self: &Arc<Self>) -> Result<PooledMatcher> {
        let existing = self.idle.lock().pop();
        let matcher = match existing {
            Some(matcher) => matcher,
            None => compile(&self.pattern)?,
        };
        Ok(PooledMatcher {
            pool: Arc::clone(self),
            matcher: Some(matcher),
        })
    }

    #[cfg(test)]
    fn idle_len(&self) -> usize {
        self.idle.lock().len()
    }
}

struct PooledMatcher {
    pool: Arc<MatcherPool>,
    matcher: Option<Regex>,
}

impl Deref for PooledMatcher {
    type Target = Regex;

    fn deref(&self) -> &Regex {
        self.matcher.as_ref().expect("matcher present until drop")
    }
}

impl Drop for PooledMatcher {
    fn drop(&mut self) {
        if let Some(matcher) = self.matcher.take() {
            self.pool.idle.lock().push(matcher);
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidRegexp(e.to_string()))
}

/// REGEXP evaluation. When both operands are textual the left value is
/// matched against the compiled pattern; otherwise the operator behaves
/// like equality through the generic kernel.
pub(crate) fn eval_regexp(
    ctx: &QueryContext,
    row: &Row,
    left: &Expression,
    right: &Expression,
    state: &RegexpState,
) -> Result<Value> {
    if left.data_type().is_text() && right.data_type().is_text() {
        return match_pattern(ctx, row, left, right, state);
    }
    eval_comparison(ctx, row, left, right, |o| o == Ordering::Equal)
}

fn match_pattern(
    ctx: &QueryContext,
    row: &Row,
    left: &Expression,
    right: &Expression,
    state: &RegexpState,
) -> Result<Value> {
    let lval = left.eval(ctx, row)?;
    if lval.is_null() {
        return Ok(Value::Null);
    }
    let subject = match coercion::to_text(lval)? {
        Value::Str(s) => s,
        _ => return Ok(Value::Null),
    };

    if !state.cached {
        // Volatile pattern: compile per row and drop the matcher right
        // after the match.
        let pattern = match eval_pattern(ctx, row, right)? {
            Some(p) => p,
            None => return Ok(Value::Null),
        };
        let matcher = compile(&pattern)?;
        return Ok(Value::Bool(matcher.is_match(&subject)));
    }

    let pool = match state.pool.get() {
        Some(pool) => Arc::clone(pool),
        None => {
            let pattern = match eval_pattern(ctx, row, right)? {
                Some(p) => p,
                None => return Ok(Value::Null),
            };
            Arc::clone(state.pool.get_or_init(|| Arc::new(MatcherPool::new(pattern))))
        }
    };

    let matcher = pool.acquire()?;
    Ok(Value::Bool(matcher.is_match(&subject)))
}

fn eval_pattern(
    ctx: &QueryContext,
    row: &Row,
    right: &Expression,
) -> Result<Option<String>> {
    let rval = right.eval(ctx, row)?;
    if rval.is_null() {
        return Ok(None);
    }
    match coercion::to_text(rval)? {
        Value::Str(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}
