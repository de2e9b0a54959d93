//! Points calculation for completed challenges.
//!
//! Threshold bonus/penalty policy: a per-tier base, a flat bonus for
//! finishing under the tier's time threshold, and a flat penalty per
//! attempt beyond the first, floored so a solve is always worth something.

use sensei_common::Difficulty;

/// Minimum points for any completed challenge
pub const MIN_POINTS: i64 = 50;

/// Per-difficulty scoring parameters
#[derive(Debug, Clone, Copy)]
pub struct ScoringPolicy {
    pub base: i64,
    /// Solves faster than this earn the time bonus
    pub time_bonus_threshold_secs: f64,
    pub time_bonus: i64,
    /// Deducted for each attempt beyond the first
    pub attempt_penalty: i64,
}

const BEGINNER: ScoringPolicy = ScoringPolicy {
    base: 100,
    time_bonus_threshold_secs: 300.0,
    time_bonus: 50,
    attempt_penalty: 25,
};

const INTERMEDIATE: ScoringPolicy = ScoringPolicy {
    base: 200,
    time_bonus_threshold_secs: 600.0,
    time_bonus: 100,
    attempt_penalty: 40,
};

const ADVANCED: ScoringPolicy = ScoringPolicy {
    base: 300,
    time_bonus_threshold_secs: 900.0,
    time_bonus: 150,
    attempt_penalty: 60,
};

/// Scoring parameters for a difficulty tier
pub fn policy_for(difficulty: Difficulty) -> &'static ScoringPolicy {
    match difficulty {
        Difficulty::Beginner => &BEGINNER,
        Difficulty::Intermediate => &INTERMEDIATE,
        Difficulty::Advanced => &ADVANCED,
    }
}

/// Compute points for a completed challenge.
///
/// Pure and deterministic. Never returns less than [`MIN_POINTS`];
/// more attempts never yield more points. An unknown `time_taken`
/// simply earns no bonus.
pub fn compute_points(difficulty: Difficulty, attempts: u32, time_taken: Option<f64>) -> i64 {
    let policy = policy_for(difficulty);
    let attempts = attempts.max(1);

    let mut points = policy.base;

    if let Some(secs) = time_taken {
        if secs >= 0.0 && secs < policy.time_bonus_threshold_secs {
            points += policy.time_bonus;
        }
    }

    points -= i64::from(attempts - 1) * policy.attempt_penalty;

    points.max(MIN_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beginner_three_attempts_with_time_bonus() {
        // base 100 + bonus 50 (under 300s) - 2 * 25 penalty
        assert_eq!(
            compute_points(Difficulty::Beginner, 3, Some(100.0)),
            100
        );
    }

    #[test]
    fn test_first_attempt_scores() {
        assert_eq!(compute_points(Difficulty::Beginner, 1, None), 100);
        assert_eq!(compute_points(Difficulty::Intermediate, 1, None), 200);
        assert_eq!(compute_points(Difficulty::Advanced, 1, None), 300);
    }

    #[test]
    fn test_time_bonus_thresholds() {
        assert_eq!(compute_points(Difficulty::Beginner, 1, Some(299.9)), 150);
        assert_eq!(compute_points(Difficulty::Beginner, 1, Some(300.0)), 100);
        assert_eq!(compute_points(Difficulty::Intermediate, 1, Some(599.0)), 300);
        assert_eq!(compute_points(Difficulty::Advanced, 1, Some(899.0)), 450);
    }

    #[test]
    fn test_floor_never_goes_below_minimum() {
        // 100 - 24 * 25 would be deeply negative
        assert_eq!(compute_points(Difficulty::Beginner, 25, None), MIN_POINTS);
        assert!(compute_points(Difficulty::Advanced, 100, Some(5.0)) >= MIN_POINTS);
    }

    #[test]
    fn test_monotone_non_increasing_in_attempts() {
        for difficulty in Difficulty::ALL {
            for time_taken in [None, Some(10.0), Some(10_000.0)] {
                let mut prev = i64::MAX;
                for attempts in 1..=30 {
                    let points = compute_points(difficulty, attempts, time_taken);
                    assert!(points >= 0);
                    assert!(
                        points <= prev,
                        "{difficulty} attempts={attempts}: {points} > {prev}"
                    );
                    prev = points;
                }
            }
        }
    }

    #[test]
    fn test_zero_attempts_treated_as_one() {
        assert_eq!(
            compute_points(Difficulty::Beginner, 0, None),
            compute_points(Difficulty::Beginner, 1, None)
        );
    }

    #[test]
    fn test_negative_time_earns_no_bonus() {
        assert_eq!(compute_points(Difficulty::Beginner, 1, Some(-1.0)), 100);
    }
}
