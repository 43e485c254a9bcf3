use crate::constants::*;
use crate::convergence::{Budget, Confidence, StopRules};
use crate::error::RankResult;
use crate::pairing::Strategy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

/// Settings for a ranking session. Every field is optional in the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    pub strategy: Strategy,
    /// Seed for pair selection; a fresh one is drawn when absent.
    pub seed: Option<u64>,
    /// Fixed number of comparisons, replacing the strategy's own budget.
    pub budget: Option<usize>,
    pub confidence_threshold: f64,
    pub min_matches: u32,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            seed: None,
            budget: None,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            min_matches: MIN_MATCHES,
        }
    }
}

impl RankerConfig {
    /// Reads the config at `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> RankResult<Self> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Loads from `$MOVIE_ELO_CONFIG` when it is set.
    pub fn from_env() -> RankResult<Self> {
        match CONFIG_PATH.as_deref() {
            Some(path) => Self::load(Path::new(path)),
            None => Ok(Self::default()),
        }
    }

    pub fn stop_rules(&self, n: usize) -> StopRules {
        let mut rules = match self.strategy {
            Strategy::Exhaustive => StopRules {
                pair_coverage: true,
                ..Default::default()
            },
            Strategy::Adaptive => StopRules {
                budget: Some(Budget::NLogN),
                confidence: Some(Confidence {
                    threshold: self.confidence_threshold,
                    min_matches: self.min_matches,
                }),
                ..Default::default()
            },
            Strategy::FewestMatches => StopRules {
                budget: Some(Budget::Tiered),
                ..Default::default()
            },
        };
        if let Some(count) = self.budget {
            // A zero budget would stop before the first pick.
            rules.budget = Some(Budget::Fixed(count.max(1)));
        }
        tracing::debug!(strategy = ?self.strategy, movies = n, ?rules, "Stop rules");
        rules
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}
