use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::TopicId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic title cannot be empty")]
    EmptyTitle,

    #[error("topic category cannot be empty")]
    EmptyCategory,

    #[error("money per 5 reps must be a non-negative number")]
    InvalidRate,
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for creating a topic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicDraft {
    pub title: String,
    pub category: String,
    pub notes: Option<String>,
    pub urls: Vec<String>,
    pub money_per_5_reps: f64,
    pub rate_locked: bool,
}

/// Partial update for a topic. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub urls: Option<Vec<String>>,
    pub money_per_5_reps: Option<f64>,
    pub rate_locked: Option<bool>,
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// A money-earning study topic.
///
/// Earnings and completion percentage are derived from the topic's subtopics
/// and recomputed on every read and mutation; the stored values are a cache
/// of the last computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    id: TopicId,
    title: String,
    category: String,
    notes: Option<String>,
    urls: Vec<String>,
    money_per_5_reps: f64,
    rate_locked: bool,
    earnings: f64,
    completion_percentage: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Topic {
    /// Creates a new Topic from a draft. Derived fields start at zero.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if the title or category is empty or the rate is
    /// negative or non-finite.
    pub fn new(id: TopicId, draft: TopicDraft, now: DateTime<Utc>) -> Result<Self, TopicError> {
        let title = non_empty(draft.title).ok_or(TopicError::EmptyTitle)?;
        let category = non_empty(draft.category).ok_or(TopicError::EmptyCategory)?;
        let rate = valid_rate(draft.money_per_5_reps)?;

        Ok(Self {
            id,
            title,
            category,
            notes: draft.notes.and_then(non_empty),
            urls: normalize_urls(draft.urls),
            money_per_5_reps: rate,
            rate_locked: draft.rate_locked,
            earnings: 0.0,
            completion_percentage: 0.0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a topic from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if persisted fields fail validation.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: TopicId,
        title: String,
        category: String,
        notes: Option<String>,
        urls: Vec<String>,
        money_per_5_reps: f64,
        rate_locked: bool,
        earnings: f64,
        completion_percentage: f64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, TopicError> {
        let title = non_empty(title).ok_or(TopicError::EmptyTitle)?;
        let category = non_empty(category).ok_or(TopicError::EmptyCategory)?;
        let rate = valid_rate(money_per_5_reps)?;

        Ok(Self {
            id,
            title,
            category,
            notes,
            urls,
            money_per_5_reps: rate,
            rate_locked,
            earnings,
            completion_percentage,
            created_at,
            updated_at,
        })
    }

    /// Apply a partial update. Only fields present in the patch change.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if a present field fails validation; the topic is
    /// left unchanged on error.
    pub fn apply(&mut self, patch: TopicPatch, now: DateTime<Utc>) -> Result<(), TopicError> {
        let title = match patch.title {
            Some(t) => Some(non_empty(t).ok_or(TopicError::EmptyTitle)?),
            None => None,
        };
        let category = match patch.category {
            Some(c) => Some(non_empty(c).ok_or(TopicError::EmptyCategory)?),
            None => None,
        };
        let rate = match patch.money_per_5_reps {
            Some(r) => Some(valid_rate(r)?),
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(notes) = patch.notes {
            self.notes = non_empty(notes);
        }
        if let Some(urls) = patch.urls {
            self.urls = normalize_urls(urls);
        }
        if let Some(rate) = rate {
            self.money_per_5_reps = rate;
        }
        if let Some(locked) = patch.rate_locked {
            self.rate_locked = locked;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Store freshly computed derived values.
    pub fn set_derived(&mut self, earnings: f64, completion_percentage: f64, now: DateTime<Utc>) {
        self.earnings = earnings;
        self.completion_percentage = completion_percentage;
        self.updated_at = now;
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
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
    pub fn money_per_5_reps(&self) -> f64 {
        self.money_per_5_reps
    }

    #[must_use]
    pub fn rate_locked(&self) -> bool {
        self.rate_locked
    }

    #[must_use]
    pub fn earnings(&self) -> f64 {
        self.earnings
    }

    #[must_use]
    pub fn completion_percentage(&self) -> f64 {
        self.completion_percentage
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

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn valid_rate(rate: f64) -> Result<f64, TopicError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(TopicError::InvalidRate);
    }
    Ok(rate)
}

fn normalize_urls(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .filter_map(non_empty)
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft(title: &str, category: &str) -> TopicDraft {
        TopicDraft {
            title: title.to_owned(),
            category: category.to_owned(),
            ..TopicDraft::default()
        }
    }

    #[test]
    fn new_rejects_empty_title() {
        let err = Topic::new(TopicId::new(1), draft("   ", "Fitness"), fixed_now()).unwrap_err();
        assert_eq!(err, TopicError::EmptyTitle);
    }

    #[test]
    fn new_rejects_empty_category() {
        let err = Topic::new(TopicId::new(1), draft("Pushups", ""), fixed_now()).unwrap_err();
        assert_eq!(err, TopicError::EmptyCategory);
    }

    #[test]
    fn new_rejects_negative_rate() {
        let mut d = draft("Pushups", "Fitness");
        d.money_per_5_reps = -1.0;
        let err = Topic::new(TopicId::new(1), d, fixed_now()).unwrap_err();
        assert_eq!(err, TopicError::InvalidRate);
    }

    #[test]
    fn new_starts_with_zero_derived_values() {
        let topic = Topic::new(TopicId::new(1), draft("Pushups", "Fitness"), fixed_now()).unwrap();
        assert!((topic.earnings() - 0.0).abs() < f64::EPSILON);
        assert!((topic.completion_percentage() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn new_trims_and_filters() {
        let mut d = draft("  Pushups  ", "  Fitness  ");
        d.notes = Some("   ".to_owned());
        d.urls = vec!["  https://a.example  ".to_owned(), "  ".to_owned()];
        let topic = Topic::new(TopicId::new(1), d, fixed_now()).unwrap();
        assert_eq!(topic.title(), "Pushups");
        assert_eq!(topic.category(), "Fitness");
        assert_eq!(topic.notes(), None);
        assert_eq!(topic.urls(), ["https://a.example".to_owned()]);
    }

    #[test]
    fn apply_updates_only_present_fields() {
        let mut topic =
            Topic::new(TopicId::new(1), draft("Pushups", "Fitness"), fixed_now()).unwrap();
        let patch = TopicPatch {
            title: Some("Squats".to_owned()),
            money_per_5_reps: Some(2.5),
            ..TopicPatch::default()
        };
        topic.apply(patch, fixed_now()).unwrap();
        assert_eq!(topic.title(), "Squats");
        assert_eq!(topic.category(), "Fitness");
        assert!((topic.money_per_5_reps() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_rejects_empty_title_without_mutating() {
        let mut topic =
            Topic::new(TopicId::new(1), draft("Pushups", "Fitness"), fixed_now()).unwrap();
        let patch = TopicPatch {
            title: Some("  ".to_owned()),
            category: Some("Strength".to_owned()),
            ..TopicPatch::default()
        };
        let err = topic.apply(patch, fixed_now()).unwrap_err();
        assert_eq!(err, TopicError::EmptyTitle);
        assert_eq!(topic.category(), "Fitness");
    }

    #[test]
    fn set_derived_stores_values() {
        let mut topic =
            Topic::new(TopicId::new(1), draft("Pushups", "Fitness"), fixed_now()).unwrap();
        topic.set_derived(120.0, 55.5, fixed_now());
        assert!((topic.earnings() - 120.0).abs() < f64::EPSILON);
        assert!((topic.completion_percentage() - 55.5).abs() < f64::EPSILON);
    }
}
