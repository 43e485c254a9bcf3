use crate::config::RankerConfig;
use crate::convergence::{StopReason, StopRules};
use crate::error::{RankError, RankResult};
use crate::movie::{ItemId, Movie, RankedMovie};
use crate::pairing::{ComparisonLog, PairSelector, Selection};
use crate::store::RatingStore;
use rand::rngs::StdRng;
use rand::{Rng, RngCore};
use tracing::{debug, info, warn};

/// Everything a ranking run has learned so far.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub store: RatingStore,
    pub compared: ComparisonLog,
    pub comparisons: usize,
}

impl SessionState {
    pub fn new(store: RatingStore) -> Self {
        Self {
            store,
            compared: ComparisonLog::default(),
            comparisons: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// Indices of the two movies shown to the user, in display order.
    AwaitingComparison { first: usize, second: usize },
    Complete(StopReason),
}

#[derive(Debug, PartialEq)]
pub enum NextPair<'a> {
    Pair(&'a Movie, &'a Movie),
    Exhausted,
}

#[derive(Debug, PartialEq)]
pub enum Progress {
    /// Another pair is waiting; see [`Session::current_pair`].
    Continue,
    Complete(Vec<RankedMovie>),
}

/// One interactive ranking run: shows a pair, takes the user's pick,
/// updates ratings and decides whether to keep going.
///
/// A session is driven from a single thread, one outcome at a time.
/// Dropping it at any point is safe.
pub struct Session<R = StdRng> {
    state: SessionState,
    selector: Box<dyn PairSelector>,
    rules: StopRules,
    rng: R,
    phase: Phase,
}

impl<R: RngCore> Session<R> {
    /// Starts a session with the strategy and stop rules from `config`.
    pub fn new(movies: Vec<Movie>, config: &RankerConfig, rng: R) -> RankResult<Self> {
        let rules = config.stop_rules(movies.len());
        Self::with_selector(movies, config.strategy.selector(), rules, rng)
    }

    pub fn with_selector(
        movies: Vec<Movie>,
        selector: Box<dyn PairSelector>,
        rules: StopRules,
        rng: R,
    ) -> RankResult<Self> {
        if movies.len() < 2 {
            return Err(RankError::InvalidInput(format!(
                "at least 2 movies are needed to rank, got {}",
                movies.len()
            )));
        }
        let store = RatingStore::new(movies)?;

        let mut session = Self {
            state: SessionState::new(store),
            selector,
            rules,
            rng,
            phase: Phase::Complete(StopReason::Exhausted),
        };
        session.advance();
        Ok(session)
    }

    /// Picks the next pair, or completes when the selector has none left.
    fn advance(&mut self) {
        match self.selector.select_next(&self.state, &mut self.rng) {
            Selection::Pair(a, b) => {
                let (first, second) = if self.rng.random_bool(0.5) {
                    (b, a)
                } else {
                    (a, b)
                };
                let first_id = &self.state.store.entry(first).movie.id;
                let second_id = &self.state.store.entry(second).movie.id;
                self.state.compared.insert(first_id, second_id);
                debug!(first = %first_id, second = %second_id, "Selected pair");
                self.phase = Phase::AwaitingComparison { first, second };
            }
            Selection::Exhausted => self.complete(StopReason::Exhausted),
        }
    }

    fn complete(&mut self, reason: StopReason) {
        info!(
            comparisons = self.state.comparisons,
            movies = self.state.store.len(),
            %reason,
            "Ranking complete"
        );
        self.phase = Phase::Complete(reason);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete(_))
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.phase {
            Phase::Complete(reason) => Some(reason),
            Phase::AwaitingComparison { .. } => None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn comparisons(&self) -> usize {
        self.state.comparisons
    }

    /// The pair waiting for the user's pick, in display order.
    pub fn current_pair(&self) -> Option<(&Movie, &Movie)> {
        match self.phase {
            Phase::AwaitingComparison { first, second } => Some((
                &self.state.store.entry(first).movie,
                &self.state.store.entry(second).movie,
            )),
            Phase::Complete(_) => None,
        }
    }

    pub fn next_pair(&self) -> NextPair<'_> {
        match self.current_pair() {
            Some((first, second)) => NextPair::Pair(first, second),
            None => NextPair::Exhausted,
        }
    }

    /// Records that the user preferred `winner` over `loser`.
    ///
    /// The two ids must be the pair currently on display. Unknown ids fail
    /// with [`RankError::NotFound`] and leave the session untouched.
    pub fn submit_outcome(&mut self, winner: &ItemId, loser: &ItemId) -> RankResult<Progress> {
        let Phase::AwaitingComparison { first, second } = self.phase else {
            warn!(%winner, %loser, "Outcome submitted after ranking completed");
            return Err(RankError::InvalidState(
                "ranking is already complete".to_string(),
            ));
        };

        let w = self.state.store.position(winner)?;
        let l = self.state.store.position(loser)?;
        if !((w == first && l == second) || (w == second && l == first)) {
            warn!(%winner, %loser, "Outcome does not match the pair on display");
            return Err(RankError::InvalidState(format!(
                "{winner} and {loser} are not the pair awaiting comparison"
            )));
        }

        let outcome = self.state.store.apply_outcome(winner, loser)?;
        self.state.comparisons += 1;
        debug!(
            %winner,
            %loser,
            winner_rating = outcome.winner_rating,
            loser_rating = outcome.loser_rating,
            comparisons = self.state.comparisons,
            "Applied outcome"
        );

        if let Some(reason) = self.rules.evaluate(&self.state) {
            self.complete(reason);
        } else {
            self.advance();
        }

        Ok(match self.phase {
            Phase::Complete(_) => Progress::Complete(self.ranking()),
            Phase::AwaitingComparison { .. } => Progress::Continue,
        })
    }

    /// Current standings, highest rating first. Usable at any point.
    pub fn ranking(&self) -> Vec<RankedMovie> {
        self.state.store.sorted_by_rating()
    }

    /// Ends the session and hands back the standings.
    pub fn finish(self) -> Vec<RankedMovie> {
        self.state.store.into_sorted()
    }

    /// Fraction of the expected comparisons done so far, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.is_complete() {
            return 1.0;
        }
        let expected = self.rules.expected_comparisons(self.state.store.len());
        (self.state.comparisons as f64 / expected as f64).min(1.0)
    }
}
