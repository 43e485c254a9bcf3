use crate::constants::*;
use crate::movie::ItemId;
use crate::session::SessionState;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Unordered pair of movie ids, stored smallest id first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(ItemId, ItemId);

impl PairKey {
    pub fn new(a: &ItemId, b: &ItemId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }

    pub fn ids(&self) -> (&ItemId, &ItemId) {
        (&self.0, &self.1)
    }
}

/// Pairs that have already been put in front of the user.
#[derive(Clone, Debug, Default)]
pub struct ComparisonLog {
    seen: HashSet<PairKey>,
}

impl ComparisonLog {
    pub fn contains(&self, a: &ItemId, b: &ItemId) -> bool {
        self.seen.contains(&PairKey::new(a, b))
    }

    /// Returns `false` when the pair was already recorded.
    pub fn insert(&mut self, a: &ItemId, b: &ItemId) -> bool {
        self.seen.insert(PairKey::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Number of unordered pairs among `n` movies.
pub fn total_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// How many of the most uncertain movies compete for the first slot.
pub fn candidate_count(n: usize) -> usize {
    ((n as f64 * CANDIDATE_FRACTION).ceil() as usize).max(1)
}

/// What a selector proposes next. Indices point into the rating store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Pair(usize, usize),
    Exhausted,
}

/// A policy for choosing the next two movies to compare.
pub trait PairSelector {
    fn select_next(&self, state: &SessionState, rng: &mut dyn RngCore) -> Selection;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Every unseen pair, uniformly at random, until none are left.
    #[default]
    Exhaustive,
    /// Most uncertain movies first, against their closest-rated unseen opponent.
    Adaptive,
    /// Movies with the fewest matches first, against anyone.
    FewestMatches,
}

impl Strategy {
    pub fn selector(self) -> Box<dyn PairSelector> {
        match self {
            Strategy::Exhaustive => Box::new(ExhaustiveRandom),
            Strategy::Adaptive => Box::new(UncertaintyDriven),
            Strategy::FewestMatches => Box::new(FewestMatchesFirst),
        }
    }
}

pub struct ExhaustiveRandom;

impl PairSelector for ExhaustiveRandom {
    fn select_next(&self, state: &SessionState, rng: &mut dyn RngCore) -> Selection {
        let entries = state.store.entries();

        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_by(|&a, &b| entries[a].movie.id.cmp(&entries[b].movie.id));

        let mut available = Vec::new();
        for (x, &i) in order.iter().enumerate() {
            for &j in &order[x + 1..] {
                if !state
                    .compared
                    .contains(&entries[i].movie.id, &entries[j].movie.id)
                {
                    available.push((i, j));
                }
            }
        }

        match available.choose(rng) {
            Some(&(i, j)) => Selection::Pair(i, j),
            None => Selection::Exhausted,
        }
    }
}

pub struct UncertaintyDriven;

impl PairSelector for UncertaintyDriven {
    fn select_next(&self, state: &SessionState, rng: &mut dyn RngCore) -> Selection {
        let store = &state.store;
        let n = store.len();
        if n < 2 {
            return Selection::Exhausted;
        }

        // Shuffle first so equally uncertain movies come out in random order.
        let mut candidates: Vec<(usize, f64)> = (0..n).map(|i| (i, store.uncertainty(i))).collect();
        candidates.shuffle(rng);
        candidates.sort_by_key(|&(_, u)| Reverse(OrderedFloat(u)));
        let mut proposals = Vec::new();
        for &(i, _) in candidates.iter().take(candidate_count(n)) {
            let entry = store.entry(i);
            let opponent = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, (store.entry(j).rating - entry.rating).abs()))
                .filter(|&(j, gap)| {
                    gap <= RATING_WINDOW
                        && !state
                            .compared
                            .contains(&entry.movie.id, &store.entry(j).movie.id)
                })
                .min_by_key(|&(_, gap)| gap);
            if let Some((j, _)) = opponent {
                proposals.push((i, j));
            }
        }

        match proposals.choose(rng) {
            Some(&(i, j)) => Selection::Pair(i, j),
            None => Selection::Exhausted,
        }
    }
}

pub struct FewestMatchesFirst;

impl PairSelector for FewestMatchesFirst {
    fn select_next(&self, state: &SessionState, rng: &mut dyn RngCore) -> Selection {
        let entries = state.store.entries();
        if entries.len() < 2 {
            return Selection::Exhausted;
        }

        let Some(fewest) = entries.iter().map(|e| e.matches).min() else {
            return Selection::Exhausted;
        };
        let least_played: Vec<usize> = (0..entries.len())
            .filter(|&i| entries[i].matches == fewest)
            .collect();
        let Some(&first) = least_played.choose(rng) else {
            return Selection::Exhausted;
        };

        let mut second = rng.random_range(0..entries.len() - 1);
        if second >= first {
            second += 1;
        }
        Selection::Pair(first, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movie::Movie;
    use crate::store::RatingStore;
    use rand::rngs::StdRng;

    fn state(n: i64) -> SessionState {
        let movies = (1..=n).map(|i| Movie::new(i, &format!("M{i}"), "")).collect();
        SessionState::new(RatingStore::new(movies).unwrap())
    }

    fn id(n: i64) -> ItemId {
        ItemId::Number(n)
    }

    fn key(state: &SessionState, selection: Selection) -> PairKey {
        let Selection::Pair(i, j) = selection else {
            panic!("expected a pair, got {selection:?}");
        };
        assert_ne!(i, j);
        PairKey::new(
            &state.store.entry(i).movie.id,
            &state.store.entry(j).movie.id,
        )
    }

    #[test]
    fn pair_key_is_unordered() {
        assert_eq!(PairKey::new(&id(2), &id(1)), PairKey::new(&id(1), &id(2)));
        assert_eq!(PairKey::new(&id(2), &id(1)).ids(), (&id(1), &id(2)));

        let mut log = ComparisonLog::default();
        assert!(log.insert(&id(2), &id(1)));
        assert!(!log.insert(&id(1), &id(2)));
        assert!(log.contains(&id(1), &id(2)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn total_pairs_counts() {
        assert_eq!(total_pairs(0), 0);
        assert_eq!(total_pairs(1), 0);
        assert_eq!(total_pairs(2), 1);
        assert_eq!(total_pairs(4), 6);
        assert_eq!(total_pairs(10), 45);
    }

    #[test]
    fn exhaustive_visits_every_pair_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = state(5);
        let mut seen = HashSet::new();
        loop {
            match ExhaustiveRandom.select_next(&state, &mut rng) {
                Selection::Exhausted => break,
                selection => {
                    let key = key(&state, selection);
                    let (a, b) = key.ids();
                    state.compared.insert(a, b);
                    assert!(seen.insert(key));
                }
            }
        }
        assert_eq!(seen.len(), total_pairs(5));
    }

    #[test]
    fn too_few_movies_is_exhausted() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = state(1);
        for strategy in [
            Strategy::Exhaustive,
            Strategy::Adaptive,
            Strategy::FewestMatches,
        ] {
            assert_eq!(
                strategy.selector().select_next(&state, &mut rng),
                Selection::Exhausted
            );
        }
    }

    #[test]
    fn adaptive_picks_closest_unseen_opponent() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = state(3);
        // 1 and 2 stay level while 3 keeps losing, which settles 3's rating.
        for (w, l) in [(1, 3), (2, 3), (1, 3), (2, 3), (1, 3), (2, 3)] {
            state.store.apply_outcome(&id(w), &id(l)).unwrap();
            state.compared.insert(&id(w), &id(l));
        }
        assert!(state.store.uncertainty(2) < 1.0);
        // Only the single most uncertain movie is a candidate, 1 or 2, and
        // its nearest unseen opponent is the other one.
        for _ in 0..20 {
            let key = key(&state, UncertaintyDriven.select_next(&state, &mut rng));
            assert_eq!(key, PairKey::new(&id(1), &id(2)));
        }
    }

    #[test]
    fn candidate_counts() {
        for (n, expected) in [(1, 1), (3, 1), (4, 2), (10, 3), (11, 4)] {
            assert_eq!(candidate_count(n), expected, "n = {n}");
        }
    }

    #[test]
    fn adaptive_breaks_uncertainty_ties_randomly() {
        // Three fresh movies are equally uncertain and only one is a candidate.
        let state = state(3);
        let mut firsts = HashSet::new();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let Selection::Pair(first, _) = UncertaintyDriven.select_next(&state, &mut rng) else {
                panic!("expected a pair");
            };
            firsts.insert(first);
        }
        assert_eq!(firsts, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn adaptive_respects_rating_window() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = state(2);
        for _ in 0..40 {
            state.store.apply_outcome(&id(1), &id(2)).unwrap();
        }
        let gap = state.store.entry(0).rating - state.store.entry(1).rating;
        assert!(gap > RATING_WINDOW);
        assert_eq!(
            UncertaintyDriven.select_next(&state, &mut rng),
            Selection::Exhausted
        );
    }

    #[test]
    fn adaptive_skips_seen_pairs() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = state(2);
        state.compared.insert(&id(1), &id(2));
        assert_eq!(
            UncertaintyDriven.select_next(&state, &mut rng),
            Selection::Exhausted
        );
    }

    #[test]
    fn fewest_matches_starts_with_least_played() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut state = state(4);
        state.store.apply_outcome(&id(1), &id(2)).unwrap();
        state.store.apply_outcome(&id(3), &id(1)).unwrap();
        state.store.apply_outcome(&id(3), &id(2)).unwrap();
        // 4 has no matches; it must always take part.
        for _ in 0..50 {
            let Selection::Pair(first, second) = FewestMatchesFirst.select_next(&state, &mut rng)
            else {
                panic!("expected a pair");
            };
            assert_eq!(first, 3);
            assert_ne!(second, 3);
        }
    }

    #[test]
    fn fewest_matches_ignores_history() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut state = state(2);
        state.compared.insert(&id(1), &id(2));
        assert_eq!(
            key(&state, FewestMatchesFirst.select_next(&state, &mut rng)),
            PairKey::new(&id(1), &id(2))
        );
    }

    #[test]
    fn strategy_names() {
        let strategy: Strategy = serde_json::from_str(r#""fewest-matches""#).unwrap();
        assert_eq!(strategy, Strategy::FewestMatches);
        assert_eq!(Strategy::default(), Strategy::Exhaustive);
    }
}
