use crate::model::{CriterionResult, Verdict};
use serde::{Deserialize, Serialize};

/// Verdict counts over one validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub checked: usize,
    pub not_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub manual: usize,
}

impl Summary {
    pub fn from_results(results: &[CriterionResult]) -> Self {
        let mut s = Self {
            total: results.len(),
            ..Self::default()
        };
        for r in results {
            match r.verdict() {
                Verdict::Pass => s.passed += 1,
                Verdict::Fail => s.failed += 1,
                Verdict::Manual => s.manual += 1,
                Verdict::NotChecked => s.not_checked += 1,
            }
        }
        s.checked = s.total - s.not_checked;
        s
    }

    /// Unchecked and manual criteria never fail the gate.
    pub fn gate_passed(&self) -> bool {
        self.failed == 0
    }
}
