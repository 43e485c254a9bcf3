use crate::constants::*;

/// Probability that a movie rated `a` is preferred over one rated `b`.
pub fn expected_score(a: i32, b: i32) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf(f64::from(b - a) / ELO_STEP))
}

/// New `(winner, loser)` ratings after one decided comparison.
///
/// Results are rounded half away from zero. The rounding is symmetric, so
/// the rating mass of the pair is preserved exactly.
pub fn elo(winner: i32, loser: i32) -> (i32, i32) {
    let delta = K_FACTOR * (1.0 - expected_score(winner, loser));
    (
        (f64::from(winner) + delta).round() as i32,
        (f64::from(loser) - delta).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ratings() {
        assert_eq!(expected_score(1400, 1400), 0.5);
        assert_eq!(elo(1400, 1400), (1416, 1384));
    }

    #[test]
    fn upset_gains_more() {
        assert_eq!(elo(1200, 1600), (1229, 1571));
        assert_eq!(elo(1600, 1200), (1603, 1197));
    }

    #[test]
    fn gain_shrinks_as_winner_rating_grows() {
        let mut last_gain = i32::MAX;
        for winner in (1000..=1800).step_by(50) {
            let (new_winner, _) = elo(winner, 1400);
            let gain = new_winner - winner;
            assert!(gain <= last_gain, "{winner}: {gain} > {last_gain}");
            assert!(gain >= 0);
            last_gain = gain;
        }
    }

    #[test]
    fn zero_sum() {
        for winner in (800..=2000).step_by(37) {
            for loser in (800..=2000).step_by(41) {
                let (w, l) = elo(winner, loser);
                assert!((w + l - winner - loser).abs() <= 1);
            }
        }
    }
}
