use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::ActivityId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActivityError {
    #[error("activity name cannot be empty")]
    EmptyName,
}

//
// ─── GOALS ─────────────────────────────────────────────────────────────────────
//

/// Rep targets per tracking period. Omitted goals default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Goals {
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
    pub yearly: u32,
}

/// Partial update for goals. Absent periods are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalsPatch {
    pub daily: Option<u32>,
    pub weekly: Option<u32>,
    pub monthly: Option<u32>,
    pub yearly: Option<u32>,
}

impl Goals {
    fn apply(&mut self, patch: GoalsPatch) {
        if let Some(daily) = patch.daily {
            self.daily = daily;
        }
        if let Some(weekly) = patch.weekly {
            self.weekly = weekly;
        }
        if let Some(monthly) = patch.monthly {
            self.monthly = monthly;
        }
        if let Some(yearly) = patch.yearly {
            self.yearly = yearly;
        }
    }
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for creating an activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityDraft {
    pub name: String,
    pub goals: Goals,
    pub time_based: bool,
}

/// Partial update for an activity. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPatch {
    pub name: Option<String>,
    pub goals: GoalsPatch,
    pub time_based: Option<bool>,
}

//
// ─── ACTIVITY ──────────────────────────────────────────────────────────────────
//

/// A trackable habit with a rep counter and optional timed sessions.
///
/// `time_based` marks activities whose ended sessions feed their duration
/// back into the rep counter and the challenge focus accumulator. It replaces
/// matching on hard-coded activity names.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    id: ActivityId,
    name: String,
    reps: u32,
    goals: Goals,
    time_based: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Activity {
    /// Creates a new Activity with zero reps.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::EmptyName` if the name is empty or
    /// whitespace-only.
    pub fn new(
        id: ActivityId,
        draft: ActivityDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, ActivityError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ActivityError::EmptyName);
        }

        Ok(Self {
            id,
            name: name.to_owned(),
            reps: 0,
            goals: draft.goals,
            time_based: draft.time_based,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate an activity from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError` if persisted fields fail validation.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: ActivityId,
        name: String,
        reps: u32,
        goals: Goals,
        time_based: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ActivityError> {
        if name.trim().is_empty() {
            return Err(ActivityError::EmptyName);
        }

        Ok(Self {
            id,
            name,
            reps,
            goals,
            time_based,
            created_at,
            updated_at,
        })
    }

    /// Apply a partial update. Only fields present in the patch change.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::EmptyName` if a present name is empty; the
    /// activity is left unchanged on error.
    pub fn apply(&mut self, patch: ActivityPatch, now: DateTime<Utc>) -> Result<(), ActivityError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ActivityError::EmptyName);
            }
        }

        if let Some(name) = patch.name {
            self.name = name.trim().to_owned();
        }
        self.goals.apply(patch.goals);
        if let Some(time_based) = patch.time_based {
            self.time_based = time_based;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Increase the rep counter. No ceiling.
    pub fn increment(&mut self, amount: u32, now: DateTime<Utc>) {
        self.reps = self.reps.saturating_add(amount);
        self.updated_at = now;
    }

    /// Decrease the rep counter, clamping the result at zero.
    pub fn decrement(&mut self, amount: u32, now: DateTime<Utc>) {
        self.reps = self.reps.saturating_sub(amount);
        self.updated_at = now;
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ActivityId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn reps(&self) -> u32 {
        self.reps
    }

    #[must_use]
    pub fn goals(&self) -> Goals {
        self.goals
    }

    #[must_use]
    pub fn time_based(&self) -> bool {
        self.time_based
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn build(name: &str) -> Activity {
        Activity::new(
            ActivityId::new(1),
            ActivityDraft {
                name: name.to_owned(),
                ..ActivityDraft::default()
            },
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_empty_name() {
        let err = Activity::new(
            ActivityId::new(1),
            ActivityDraft::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ActivityError::EmptyName);
    }

    #[test]
    fn new_defaults_goals_to_zero() {
        let activity = build("Reading");
        assert_eq!(activity.goals(), Goals::default());
        assert_eq!(activity.reps(), 0);
        assert!(!activity.time_based());
    }

    #[test]
    fn decrement_clamps_at_zero() {
        let mut activity = build("Reading");
        activity.increment(3, fixed_now());
        activity.decrement(10, fixed_now());
        assert_eq!(activity.reps(), 0);
    }

    #[test]
    fn increment_accumulates() {
        let mut activity = build("Reading");
        activity.increment(5, fixed_now());
        activity.increment(2, fixed_now());
        assert_eq!(activity.reps(), 7);
    }

    #[test]
    fn apply_patches_single_goal_period() {
        let mut activity = build("Reading");
        activity
            .apply(
                ActivityPatch {
                    goals: GoalsPatch {
                        daily: Some(10),
                        ..GoalsPatch::default()
                    },
                    ..ActivityPatch::default()
                },
                fixed_now(),
            )
            .unwrap();
        assert_eq!(activity.goals().daily, 10);
        assert_eq!(activity.goals().weekly, 0);
    }

    #[test]
    fn apply_rejects_empty_name() {
        let mut activity = build("Reading");
        let err = activity
            .apply(
                ActivityPatch {
                    name: Some("  ".to_owned()),
                    ..ActivityPatch::default()
                },
                fixed_now(),
            )
            .unwrap_err();
        assert_eq!(err, ActivityError::EmptyName);
        assert_eq!(activity.name(), "Reading");
    }
}
