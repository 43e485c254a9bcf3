use crate::error::RankResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Catalog identifier of a movie, either numeric or textual.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{n}"),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::Text(s)
    }
}

/// A movie as supplied by the caller. Only `id` takes part in ranking;
/// everything else is carried through to the output untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub poster: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Movie {
    pub fn new(id: impl Into<ItemId>, title: &str, year: &str) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            year: year.to_string(),
            poster: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// `Title (Year)`, or just the title when the year is unknown.
    pub fn label(&self) -> String {
        if self.year.is_empty() {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.year)
        }
    }
}

/// A movie together with the rating and match count it finished with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub rating: i32,
    pub matches: u32,
}

pub fn parse_movies(reader: impl Read) -> RankResult<Vec<Movie>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Reads a JSON array of movies from `path`.
pub fn load_movies(path: &Path) -> RankResult<Vec<Movie>> {
    let file = File::open(path)?;
    parse_movies(BufReader::new(file))
}
