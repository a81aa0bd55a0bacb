//! Derived-value calculations.
//!
//! Everything here is pure arithmetic over counters: no I/O, no clocks, no
//! error cases. Malformed numeric input is a caller contract violation.

use crate::model::{GOAL_AMOUNT_STEP, SUBTOPIC_REPS_GOAL, Subtopic};

/// Reps per payout group: every full group of 5 completed reps earns the
/// topic's per-group rate, partial groups earn nothing.
pub const REPS_PER_PAYOUT: u32 = 5;

/// Total earnings of a topic given its subtopics and per-group rate.
#[must_use]
pub fn topic_earnings(subtopics: &[Subtopic], money_per_5_reps: f64) -> f64 {
    let total_reps: u32 = subtopics.iter().map(Subtopic::reps_completed).sum();
    f64::from(total_reps / REPS_PER_PAYOUT) * money_per_5_reps
}

/// Completion percentage of a topic across its subtopics.
///
/// Zero when the topic has no subtopics. Deliberately not clamped at 100:
/// reps past the goal push the percentage above it.
#[must_use]
pub fn topic_completion(subtopics: &[Subtopic]) -> f64 {
    let total_goal: u32 = subtopics.iter().map(Subtopic::reps_goal).sum();
    if total_goal == 0 {
        return 0.0;
    }
    let total_reps: u32 = subtopics.iter().map(Subtopic::reps_completed).sum();
    f64::from(total_reps) / f64::from(total_goal) * 100.0
}

/// Monetary credit earned so far by a single subtopic, proportional to its
/// progress toward the fixed reps goal and floored down to the nearest
/// multiple of 1000.
#[must_use]
pub fn subtopic_milestone_earnings(reps_completed: u32, goal_amount: f64) -> f64 {
    let raw = f64::from(reps_completed) / f64::from(SUBTOPIC_REPS_GOAL) * goal_amount;
    (raw / GOAL_AMOUNT_STEP).floor() * GOAL_AMOUNT_STEP
}

/// Overall earnings progress against the global goal, as a percentage.
#[must_use]
pub fn dashboard_progress(current_earnings: f64, global_goal: f64) -> f64 {
    if global_goal <= 0.0 {
        return 0.0;
    }
    current_earnings / global_goal * 100.0
}

/// Progress of a counter against one period's target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodProgress {
    pub current: u32,
    pub target: u32,
    pub percentage: f64,
    pub remaining: u32,
}

/// Compare the current rep count against a period target.
#[must_use]
pub fn period_progress(current: u32, target: u32) -> PeriodProgress {
    let percentage = if target == 0 {
        0.0
    } else {
        f64::from(current) / f64::from(target) * 100.0
    };
    PeriodProgress {
        current,
        target,
        percentage,
        remaining: target.saturating_sub(current),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SubtopicDraft, SubtopicId, TopicId};

    fn subtopic(id: u64, reps: u32) -> Subtopic {
        let mut sub = Subtopic::new(
            SubtopicId::new(id),
            TopicId::new(1),
            SubtopicDraft {
                title: format!("Set {id}"),
                goal_amount: 1000.0,
                ..SubtopicDraft::default()
            },
        )
        .unwrap();
        sub.adjust_reps(i64::from(reps));
        sub
    }

    #[test]
    fn earnings_floor_groups_of_five() {
        let subs = vec![subtopic(1, 7), subtopic(2, 6)];
        // 13 reps -> 2 full groups
        assert!((topic_earnings(&subs, 10.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn earnings_zero_below_five_reps() {
        let subs = vec![subtopic(1, 2), subtopic(2, 2)];
        assert!((topic_earnings(&subs, 999.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn earnings_zero_for_empty_topic() {
        assert!((topic_earnings(&[], 10.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn completion_zero_for_empty_topic() {
        assert!((topic_completion(&[]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn completion_half_of_one_subtopic() {
        let subs = vec![subtopic(1, 9)];
        // 9 of 18
        assert!((topic_completion(&subs) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn completion_can_exceed_100() {
        let subs = vec![subtopic(1, 36)];
        assert!((topic_completion(&subs) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn milestone_full_goal_pays_full_amount() {
        assert!((subtopic_milestone_earnings(18, 1000.0) - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn milestone_half_progress_floors_to_zero() {
        assert!((subtopic_milestone_earnings(9, 1000.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn milestone_floors_to_thousand_steps() {
        // 12/18 * 3000 = 2000 exactly
        assert!((subtopic_milestone_earnings(12, 3000.0) - 2000.0).abs() < f64::EPSILON);
        // 10/18 * 3000 ≈ 1666.67 -> 1000
        assert!((subtopic_milestone_earnings(10, 3000.0) - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dashboard_progress_matches_expected_ratio() {
        assert!((dashboard_progress(1250.5, 5000.0) - 25.01).abs() < 1e-9);
    }

    #[test]
    fn dashboard_progress_zero_goal_is_zero() {
        for earnings in [0.0, 100.0, -3.0] {
            assert!((dashboard_progress(earnings, 0.0) - 0.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn period_progress_with_target() {
        let progress = period_progress(5, 20);
        assert_eq!(progress.remaining, 15);
        assert!((progress.percentage - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn period_progress_zero_target() {
        let progress = period_progress(5, 0);
        assert!((progress.percentage - 0.0).abs() < f64::EPSILON);
        assert_eq!(progress.remaining, 0);
    }

    #[test]
    fn period_progress_past_target_has_no_remaining() {
        let progress = period_progress(30, 20);
        assert_eq!(progress.remaining, 0);
        assert!((progress.percentage - 150.0).abs() < f64::EPSILON);
    }
}
