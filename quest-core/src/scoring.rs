/// Star rating for a completed level attempt, always in 0..=3.
///
/// Score contributes up to 2 stars (>= 90% of max: 2, >= 70%: 1), finishing
/// within 80% of the estimated time adds 1, completing every configured
/// task adds 1. The total is clamped at 3.
pub fn stars(
    score: i32,
    max_score: i32,
    time_seconds: i32,
    estimated_time_minutes: i32,
    tasks_completed: usize,
    tasks_total: usize,
) -> i32 {
    let mut stars = 0;

    if score as f64 >= max_score as f64 * 0.9 {
        stars += 2;
    } else if score as f64 >= max_score as f64 * 0.7 {
        stars += 1;
    }

    let expected_seconds = (estimated_time_minutes as f64) * 60.0;
    if time_seconds as f64 <= expected_seconds * 0.8 {
        stars += 1;
    }

    if tasks_completed >= tasks_total {
        stars += 1;
    }

    stars.min(3)
}

/// Answer accuracy as a percentage rounded to two decimals. Defined as 0
/// when no answers have been given yet.
pub fn accuracy(correct_answers: i32, wrong_answers: i32) -> f64 {
    let total = correct_answers + wrong_answers;
    if total == 0 {
        return 0.0;
    }
    (correct_answers as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_run_is_capped_at_three_stars() {
        // 950/1000 >= 90%, 200s <= 240s (80% of 5 min), all 3 tasks done
        assert_eq!(stars(950, 1000, 200, 5, 3, 3), 3);

        // Even a flawless run cannot exceed three stars
        assert_eq!(stars(1000, 1000, 1, 5, 3, 3), 3);
    }

    #[test]
    fn test_mid_run_earns_single_star() {
        // 750/1000 is >= 70% but < 90%, 290s misses the time bonus,
        // 1 of 3 tasks misses the task bonus
        assert_eq!(stars(750, 1000, 290, 5, 1, 3), 1);
    }

    #[test]
    fn test_low_score_earns_nothing() {
        assert_eq!(stars(500, 1000, 600, 5, 0, 3), 0);
    }

    #[test]
    fn test_score_thresholds_are_inclusive() {
        // Exactly 90% grants both score stars, exactly 70% grants one
        assert_eq!(stars(900, 1000, 600, 5, 0, 3), 2);
        assert_eq!(stars(700, 1000, 600, 5, 0, 3), 1);
        assert_eq!(stars(699, 1000, 600, 5, 0, 3), 0);
    }

    #[test]
    fn test_time_bonus_boundary() {
        // 80% of 5 minutes is exactly 240 seconds, inclusive
        assert_eq!(stars(0, 1000, 240, 5, 0, 3), 1);
        assert_eq!(stars(0, 1000, 241, 5, 0, 3), 0);
    }

    #[test]
    fn test_task_bonus_requires_every_task() {
        assert_eq!(stars(0, 1000, 600, 5, 3, 3), 1);
        assert_eq!(stars(0, 1000, 600, 5, 2, 3), 0);
        // A level without configured tasks always grants the task bonus
        assert_eq!(stars(0, 1000, 600, 5, 0, 0), 1);
    }

    #[test]
    fn test_stars_is_deterministic() {
        for _ in 0..10 {
            assert_eq!(stars(820, 1000, 250, 5, 2, 3), 1);
        }
    }

    #[test]
    fn test_accuracy_rounding_and_bounds() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(1, 2), 33.33);
        assert_eq!(accuracy(2, 1), 66.67);
        assert_eq!(accuracy(10, 0), 100.0);
        assert_eq!(accuracy(0, 10), 0.0);
    }

    #[test]
    fn test_accuracy_always_in_range() {
        for correct in 0..20 {
            for wrong in 0..20 {
                let value = accuracy(correct, wrong);
                assert!((0.0..=100.0).contains(&value));
            }
        }
    }
}
