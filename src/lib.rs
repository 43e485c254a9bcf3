//! Ranks a handful of movies by asking which of two the user prefers,
//! rating each answer Elo-style until the order has settled.

pub mod config;
pub mod constants;
pub mod convergence;
pub mod elo;
pub mod error;
pub mod export;
pub mod movie;
pub mod pairing;
pub mod session;
pub mod store;

pub use config::RankerConfig;
pub use convergence::{Budget, StopReason, StopRules};
pub use error::{RankError, RankResult};
pub use movie::{ItemId, Movie, RankedMovie};
pub use pairing::{PairSelector, Selection, Strategy};
pub use session::{NextPair, Phase, Progress, Session, SessionState};
