//! Per-query execution context
//!
//! Carries session identity, the current database, and the cooperative
//! cancellation flag. Cheap to clone; every clone observes the same
//! cancellation signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{span, Level, Span};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    session_id: u64,
    current_database: Option<String>,
    cancelled: Arc<AtomicBool>,
}

impl QueryContext {
    pub fn new(session_id: u64) -> Self {
        Self {
            session_id,
            current_database: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.current_database = Some(database.into());
        self
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn current_database(&self) -> Option<&str> {
        self.current_database.as_deref()
    }

    /// Request cancellation. Expression evaluation and analyzer rules
    /// observe the flag at their next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Cooperative cancellation check. Returns `Error::Cancelled` once
    /// `cancel` has been called.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Open a tracing span for an operation within this query.
    pub fn span(&self, operation: &'static str) -> Span {
        span!(
            Level::DEBUG,
            "query",
            op = operation,
            session = self.session_id
        )
    }
}
