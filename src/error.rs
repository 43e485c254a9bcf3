use crate::movie::ItemId;

/// Errors surfaced by a ranking session and its helpers.
///
/// Running out of pairs is not an error: selectors report it through
/// [`Selection::Exhausted`](crate::pairing::Selection::Exhausted) and the
/// session completes with the ranking it has.
#[derive(thiserror::Error, Debug)]
pub enum RankError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Movie not found in session: {0}")]
    NotFound(ItemId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RankResult<T> = Result<T, RankError>;
