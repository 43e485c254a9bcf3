use std::sync::LazyLock;

pub const ELO_BASE: i32 = 1400;
pub const ELO_STEP: f64 = 400.0;
pub const K_FACTOR: f64 = 32.0;

/// Largest rating gap the adaptive selector will bridge in one comparison.
pub const RATING_WINDOW: i32 = 400;
/// Share of the most uncertain movies considered for the first slot.
pub const CANDIDATE_FRACTION: f64 = 0.3;
pub const UNCERTAINTY_SCALE: f64 = 100.0;

pub const MIN_MATCHES: u32 = 3;
pub const CONFIDENCE_THRESHOLD: f64 = 0.85;
/// Collections at or below this size are always compared exhaustively.
pub const SMALL_COLLECTION: usize = 10;

pub const CONFIG_ENV: &str = "MOVIE_ELO_CONFIG";
pub static CONFIG_PATH: LazyLock<Option<String>> =
    LazyLock::new(|| std::env::var(CONFIG_ENV).ok());
