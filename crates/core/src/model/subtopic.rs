use thiserror::Error;

use crate::model::ids::{SubtopicId, TopicId};

/// Every subtopic carries the same fixed reps goal, regardless of input.
pub const SUBTOPIC_REPS_GOAL: u32 = 18;

/// Goal amounts must be positive exact multiples of this step.
pub const GOAL_AMOUNT_STEP: f64 = 1000.0;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubtopicError {
    #[error("subtopic title cannot be empty")]
    EmptyTitle,

    #[error("goal amount must be a positive multiple of 1000")]
    InvalidGoalAmount,
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for creating a subtopic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtopicDraft {
    pub title: String,
    pub notes: Option<String>,
    pub urls: Vec<String>,
    pub goal_amount: f64,
}

/// Partial update for a subtopic. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtopicPatch {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub urls: Option<Vec<String>>,
    pub goal_amount: Option<f64>,
}

//
// ─── SUBTOPIC ──────────────────────────────────────────────────────────────────
//

/// A unit of work under a topic, converting completed reps into money.
///
/// The reps goal is pinned at [`SUBTOPIC_REPS_GOAL`]; inputs never override it.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtopic {
    id: SubtopicId,
    topic_id: TopicId,
    title: String,
    notes: Option<String>,
    urls: Vec<String>,
    reps_completed: u32,
    reps_goal: u32,
    goal_amount: f64,
}

impl Subtopic {
    /// Creates a new Subtopic from a draft, with zero completed reps.
    ///
    /// # Errors
    ///
    /// Returns `SubtopicError` if the title is empty or the goal amount is not
    /// a positive multiple of 1000.
    pub fn new(
        id: SubtopicId,
        topic_id: TopicId,
        draft: SubtopicDraft,
    ) -> Result<Self, SubtopicError> {
        let title = non_empty(draft.title).ok_or(SubtopicError::EmptyTitle)?;
        let goal_amount = valid_goal_amount(draft.goal_amount)?;

        Ok(Self {
            id,
            topic_id,
            title,
            notes: draft.notes.and_then(non_empty),
            urls: draft.urls.into_iter().filter_map(non_empty).collect(),
            reps_completed: 0,
            reps_goal: SUBTOPIC_REPS_GOAL,
            goal_amount,
        })
    }

    /// Rehydrate a subtopic from persisted storage.
    ///
    /// The persisted reps goal is ignored; the fixed goal always applies.
    ///
    /// # Errors
    ///
    /// Returns `SubtopicError` if persisted fields fail validation.
    pub fn from_persisted(
        id: SubtopicId,
        topic_id: TopicId,
        title: String,
        notes: Option<String>,
        urls: Vec<String>,
        reps_completed: u32,
        goal_amount: f64,
    ) -> Result<Self, SubtopicError> {
        let title = non_empty(title).ok_or(SubtopicError::EmptyTitle)?;
        let goal_amount = valid_goal_amount(goal_amount)?;

        Ok(Self {
            id,
            topic_id,
            title,
            notes,
            urls,
            reps_completed,
            reps_goal: SUBTOPIC_REPS_GOAL,
            goal_amount,
        })
    }

    /// Apply a partial update. Only fields present in the patch change.
    ///
    /// # Errors
    ///
    /// Returns `SubtopicError` if a present field fails validation; the
    /// subtopic is left unchanged on error.
    pub fn apply(&mut self, patch: SubtopicPatch) -> Result<(), SubtopicError> {
        let title = match patch.title {
            Some(t) => Some(non_empty(t).ok_or(SubtopicError::EmptyTitle)?),
            None => None,
        };
        let goal_amount = match patch.goal_amount {
            Some(g) => Some(valid_goal_amount(g)?),
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(notes) = patch.notes {
            self.notes = non_empty(notes);
        }
        if let Some(urls) = patch.urls {
            self.urls = urls.into_iter().filter_map(non_empty).collect();
        }
        if let Some(goal_amount) = goal_amount {
            self.goal_amount = goal_amount;
        }
        Ok(())
    }

    /// Adjust completed reps by a signed delta, clamping the result at zero.
    pub fn adjust_reps(&mut self, delta: i64) {
        let next = i64::from(self.reps_completed).saturating_add(delta).max(0);
        self.reps_completed = u32::try_from(next).unwrap_or(u32::MAX);
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SubtopicId {
        self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    #[must_use]
    pub fn reps_completed(&self) -> u32 {
        self.reps_completed
    }

    #[must_use]
    pub fn reps_goal(&self) -> u32 {
        self.reps_goal
    }

    #[must_use]
    pub fn goal_amount(&self) -> f64 {
        self.goal_amount
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn valid_goal_amount(amount: f64) -> Result<f64, SubtopicError> {
    if !amount.is_finite() || amount <= 0.0 || amount % GOAL_AMOUNT_STEP != 0.0 {
        return Err(SubtopicError::InvalidGoalAmount);
    }
    Ok(amount)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, goal_amount: f64) -> SubtopicDraft {
        SubtopicDraft {
            title: title.to_owned(),
            goal_amount,
            ..SubtopicDraft::default()
        }
    }

    fn build(goal_amount: f64) -> Subtopic {
        Subtopic::new(
            SubtopicId::new(1),
            TopicId::new(1),
            draft("Set A", goal_amount),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_empty_title() {
        let err = Subtopic::new(SubtopicId::new(1), TopicId::new(1), draft(" ", 1000.0))
            .unwrap_err();
        assert_eq!(err, SubtopicError::EmptyTitle);
    }

    #[test]
    fn new_rejects_non_multiple_goal_amount() {
        let err = Subtopic::new(SubtopicId::new(1), TopicId::new(1), draft("Set A", 1500.0))
            .unwrap_err();
        assert_eq!(err, SubtopicError::InvalidGoalAmount);
    }

    #[test]
    fn new_rejects_zero_and_negative_goal_amount() {
        for amount in [0.0, -1000.0] {
            let err = Subtopic::new(SubtopicId::new(1), TopicId::new(1), draft("Set A", amount))
                .unwrap_err();
            assert_eq!(err, SubtopicError::InvalidGoalAmount);
        }
    }

    #[test]
    fn new_accepts_multiple_of_1000() {
        let sub = build(2000.0);
        assert!((sub.goal_amount() - 2000.0).abs() < f64::EPSILON);
        assert_eq!(sub.reps_completed(), 0);
    }

    #[test]
    fn reps_goal_is_always_fixed() {
        let sub = build(1000.0);
        assert_eq!(sub.reps_goal(), SUBTOPIC_REPS_GOAL);

        let persisted = Subtopic::from_persisted(
            SubtopicId::new(2),
            TopicId::new(1),
            "Set B".to_owned(),
            None,
            Vec::new(),
            4,
            1000.0,
        )
        .unwrap();
        assert_eq!(persisted.reps_goal(), SUBTOPIC_REPS_GOAL);
    }

    #[test]
    fn adjust_reps_adds_and_subtracts() {
        let mut sub = build(1000.0);
        sub.adjust_reps(7);
        assert_eq!(sub.reps_completed(), 7);
        sub.adjust_reps(-3);
        assert_eq!(sub.reps_completed(), 4);
    }

    #[test]
    fn adjust_reps_clamps_at_zero() {
        let mut sub = build(1000.0);
        sub.adjust_reps(5);
        sub.adjust_reps(-50);
        assert_eq!(sub.reps_completed(), 0);
    }

    #[test]
    fn apply_updates_goal_amount_only_when_valid() {
        let mut sub = build(1000.0);
        let err = sub
            .apply(SubtopicPatch {
                goal_amount: Some(1500.0),
                ..SubtopicPatch::default()
            })
            .unwrap_err();
        assert_eq!(err, SubtopicError::InvalidGoalAmount);
        assert!((sub.goal_amount() - 1000.0).abs() < f64::EPSILON);

        sub.apply(SubtopicPatch {
            goal_amount: Some(3000.0),
            ..SubtopicPatch::default()
        })
        .unwrap();
        assert!((sub.goal_amount() - 3000.0).abs() < f64::EPSILON);
    }
}
