use crate::constants::*;
use crate::elo::elo;
use crate::error::{RankError, RankResult};
use crate::movie::{ItemId, Movie, RankedMovie};
use std::cmp::Reverse;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Entry {
    pub movie: Movie,
    pub rating: i32,
    pub matches: u32,
}

impl Entry {
    fn new(mut movie: Movie) -> Self {
        // A re-ranked list carries its previous results; the new ones replace them.
        movie.extra.remove("rating");
        movie.extra.remove("matches");
        Self {
            movie,
            rating: ELO_BASE,
            matches: 0,
        }
    }
}

/// Result of applying one comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub winner_rating: i32,
    pub loser_rating: i32,
}

/// Ratings and match counts of every movie in a session, in input order.
#[derive(Clone, Debug, Default)]
pub struct RatingStore {
    entries: Vec<Entry>,
    index: HashMap<ItemId, usize>,
}

impl RatingStore {
    /// Starts every movie at the base rating with no matches.
    pub fn new(movies: Vec<Movie>) -> RankResult<Self> {
        let mut index = HashMap::with_capacity(movies.len());
        for (i, movie) in movies.iter().enumerate() {
            if index.insert(movie.id.clone(), i).is_some() {
                return Err(RankError::InvalidInput(format!(
                    "duplicate movie id {}",
                    movie.id
                )));
            }
        }
        let entries = movies.into_iter().map(Entry::new).collect();
        Ok(Self { entries, index })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, i: usize) -> &Entry {
        &self.entries[i]
    }

    pub fn position(&self, id: &ItemId) -> RankResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| RankError::NotFound(id.clone()))
    }

    pub fn get(&self, id: &ItemId) -> RankResult<&Entry> {
        Ok(&self.entries[self.position(id)?])
    }

    /// Rates `winner` over `loser` and counts a match for both.
    pub fn apply_outcome(&mut self, winner: &ItemId, loser: &ItemId) -> RankResult<Outcome> {
        let w = self.position(winner)?;
        let l = self.position(loser)?;
        if w == l {
            return Err(RankError::InvalidInput(format!(
                "movie {winner} cannot be compared with itself"
            )));
        }

        let (winner_rating, loser_rating) = elo(self.entries[w].rating, self.entries[l].rating);

        let winner_entry = &mut self.entries[w];
        winner_entry.rating = winner_rating;
        winner_entry.matches += 1;

        let loser_entry = &mut self.entries[l];
        loser_entry.rating = loser_rating;
        loser_entry.matches += 1;

        Ok(Outcome {
            winner_rating,
            loser_rating,
        })
    }

    /// Mean absolute rating gap between movie `i` and every other movie.
    pub fn average_rating_gap(&self, i: usize) -> f64 {
        if self.entries.len() < 2 {
            return 0.0;
        }
        let rating = self.entries[i].rating;
        let total: i64 = self
            .entries
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, e)| i64::from((e.rating - rating).abs()))
            .sum();
        total as f64 / (self.entries.len() - 1) as f64
    }

    /// How unsettled the rating of movie `i` still is, in `[0, 1]`.
    ///
    /// Movies with fewer than [`MIN_MATCHES`] comparisons are maximally
    /// uncertain, and so is a movie whose rating no other movie differs from.
    pub fn uncertainty(&self, i: usize) -> f64 {
        if self.entries[i].matches < MIN_MATCHES {
            return 1.0;
        }
        let gap = self.average_rating_gap(i);
        if gap <= 0.0 {
            return 1.0;
        }
        (UNCERTAINTY_SCALE / gap).min(1.0)
    }

    /// Every movie, highest rating first. Ties keep input order.
    pub fn sorted_by_rating(&self) -> Vec<RankedMovie> {
        let mut ranked: Vec<_> = self
            .entries
            .iter()
            .map(|e| RankedMovie {
                movie: e.movie.clone(),
                rating: e.rating,
                matches: e.matches,
            })
            .collect();
        ranked.sort_by_key(|m| Reverse(m.rating));
        ranked
    }

    pub fn into_sorted(self) -> Vec<RankedMovie> {
        let mut ranked: Vec<_> = self
            .entries
            .into_iter()
            .map(|e| RankedMovie {
                movie: e.movie,
                rating: e.rating,
                matches: e.matches,
            })
            .collect();
        ranked.sort_by_key(|m| Reverse(m.rating));
        ranked
    }
}
