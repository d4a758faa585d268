//! Graceful degradation for capabilities backed by optional binaries.
//!
//! [`GracefulDegradation`] wraps one handler. A `DependencyMissing` failure
//! is replaced by a labelled mock result; anything else passes through.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::registry::{Arguments, CapabilityHandler, SharedHandler};
use crate::types::{ContentItem, McpError, McpResult};

/// Substitutions remembered per wrapper by default.
pub const DEFAULT_HISTORY: usize = 64;

/// Builds the substitute result from the original arguments.
pub type Fallback = Arc<dyn Fn(&Arguments) -> Vec<ContentItem> + Send + Sync>;

/// Why a result was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradationReason {
    /// The external dependency is absent or could not be launched.
    DependencyMissing(String),
}

impl fmt::Display for DegradationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradationReason::DependencyMissing(detail) => {
                write!(f, "dependency unavailable: {detail}")
            }
        }
    }
}

/// One substituted invocation.
#[derive(Debug, Clone)]
pub struct DegradedInvocation {
    pub capability: String,
    pub reason: DegradationReason,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct History {
    recent: VecDeque<DegradedInvocation>,
    total: u64,
}

/// Handler wrapper that mocks dependency-missing failures.
pub struct GracefulDegradation {
    capability: String,
    inner: SharedHandler,
    fallback: Fallback,
    max_history: usize,
    history: Mutex<History>,
}

impl GracefulDegradation {
    pub fn new(capability: impl Into<String>, inner: SharedHandler, fallback: Fallback) -> Self {
        Self {
            capability: capability.into(),
            inner,
            fallback,
            max_history: DEFAULT_HISTORY,
            history: Mutex::new(History::default()),
        }
    }

    /// Keep at most `max` recent substitutions.
    pub fn with_max_history(mut self, max: usize) -> Self {
        self.max_history = max;
        self
    }

    /// The most recent substitutions, oldest first.
    pub fn degraded(&self) -> Vec<DegradedInvocation> {
        self.history
            .lock()
            .map(|h| h.recent.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Substitutions since the wrapper was built, including evicted ones.
    pub fn degraded_count(&self) -> u64 {
        self.history.lock().map(|h| h.total).unwrap_or_default()
    }

    fn record(&self, reason: DegradationReason) {
        let Ok(mut history) = self.history.lock() else {
            return;
        };
        history.total += 1;
        if self.max_history == 0 {
            return;
        }
        while history.recent.len() >= self.max_history {
            history.recent.pop_front();
        }
        history.recent.push_back(DegradedInvocation {
            capability: self.capability.clone(),
            reason,
            at: Utc::now(),
        });
    }
}

#[async_trait]
impl CapabilityHandler for GracefulDegradation {
    async fn invoke(&self, args: Arguments) -> McpResult<Vec<ContentItem>> {
        match self.inner.invoke(args.clone()).await {
            Err(McpError::DependencyMissing(detail)) => {
                let reason = DegradationReason::DependencyMissing(detail);
                tracing::warn!(capability = %self.capability, "Using mock result: {reason}");
                self.record(reason);
                Ok((self.fallback)(&args))
            }
            other => other,
        }
    }
}
