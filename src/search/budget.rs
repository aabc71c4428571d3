//! Search budget: caps on candidates evaluated and wall-clock time

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Limits for one ordering's search. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBudget {
    pub max_candidates: Option<usize>,
    pub time_limit_ms: Option<u64>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    pub fn is_unlimited(&self) -> bool {
        self.max_candidates.is_none() && self.time_limit_ms.is_none()
    }
}

/// Running account against a [`SearchBudget`]
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    budget: SearchBudget,
    started: Instant,
    evaluated: usize,
}

impl BudgetTracker {
    pub fn start(budget: SearchBudget) -> Self {
        Self {
            budget,
            started: Instant::now(),
            evaluated: 0,
        }
    }

    /// Record `count` more evaluated candidates
    pub fn charge(&mut self, count: usize) {
        self.evaluated += count;
    }

    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Candidates that may still be evaluated before the cap
    pub fn remaining_candidates(&self) -> Option<usize> {
        self.budget
            .max_candidates
            .map(|max| max.saturating_sub(self.evaluated))
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_exhausted(&self) -> bool {
        if let Some(max) = self.budget.max_candidates {
            if self.evaluated >= max {
                return true;
            }
        }
        if let Some(limit) = self.budget.time_limit_ms {
            if self.elapsed() >= Duration::from_millis(limit) {
                return true;
            }
        }
        false
    }
}
