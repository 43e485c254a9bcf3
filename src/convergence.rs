use crate::constants::*;
use crate::pairing::total_pairs;
use crate::session::SessionState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many comparisons a session is allowed before it stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Budget {
    /// One comparison per unordered pair.
    AllPairs,
    /// `ceil(n * log2(n))`, or every pair for small collections.
    NLogN,
    /// Every pair up to 10 movies, `5n` up to 50, `3n` beyond.
    Tiered,
    Fixed(usize),
}

impl Budget {
    pub fn target(self, n: usize) -> usize {
        match self {
            Budget::AllPairs => total_pairs(n),
            Budget::NLogN if n <= SMALL_COLLECTION => total_pairs(n),
            Budget::NLogN => (n as f64 * (n as f64).log2()).ceil() as usize,
            Budget::Tiered if n <= SMALL_COLLECTION => total_pairs(n),
            Budget::Tiered if n <= 50 => 5 * n,
            Budget::Tiered => 3 * n,
            Budget::Fixed(count) => count,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    /// Minimum mean of `1 - uncertainty` over all movies.
    pub threshold: f64,
    pub min_matches: u32,
}

impl Default for Confidence {
    fn default() -> Self {
        Self {
            threshold: CONFIDENCE_THRESHOLD,
            min_matches: MIN_MATCHES,
        }
    }
}

/// Stopping rules, checked in order; the first one satisfied ends the session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StopRules {
    pub pair_coverage: bool,
    pub budget: Option<Budget>,
    pub confidence: Option<Confidence>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    PairCoverage,
    Budget { target: usize },
    Confidence { mean: f64 },
    /// The selector had no legal pair left.
    Exhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::PairCoverage => f.write_str("every pair compared"),
            StopReason::Budget { target } => write!(f, "comparison budget of {target} reached"),
            StopReason::Confidence { mean } => write!(f, "ratings settled (confidence {mean:.2})"),
            StopReason::Exhausted => f.write_str("no pairs left to compare"),
        }
    }
}

impl StopRules {
    /// Checks the rules against the state after an outcome was applied.
    pub fn evaluate(&self, state: &SessionState) -> Option<StopReason> {
        let n = state.store.len();

        if self.pair_coverage && state.compared.len() >= total_pairs(n) {
            return Some(StopReason::PairCoverage);
        }

        if let Some(budget) = self.budget {
            let target = budget.target(n);
            if state.comparisons >= target {
                return Some(StopReason::Budget { target });
            }
        }

        if let Some(confidence) = self.confidence {
            let entries = state.store.entries();
            if !entries.is_empty() && entries.iter().all(|e| e.matches >= confidence.min_matches)
            {
                let mean = (0..n)
                    .map(|i| 1.0 - state.store.uncertainty(i))
                    .sum::<f64>()
                    / n as f64;
                if mean >= confidence.threshold {
                    return Some(StopReason::Confidence { mean });
                }
            }
        }

        None
    }

    /// Comparisons the session expects to need, used for progress reporting.
    pub fn expected_comparisons(&self, n: usize) -> usize {
        let target = match self.budget {
            Some(budget) if self.pair_coverage => budget.target(n).min(total_pairs(n)),
            Some(budget) => budget.target(n),
            None => total_pairs(n),
        };
        target.max(1)
    }
}
