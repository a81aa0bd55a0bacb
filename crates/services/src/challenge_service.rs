use std::sync::Arc;

use chrono::NaiveDate;

use momentum_core::countdown;
use momentum_core::model::{
    CHALLENGE_SPAN_DAYS, Challenge, ChallengeId, ChallengeProgress,
};
use storage::repository::{
    ChallengeRepository, NewChallengeRecord, ProgressRepository, StorageError,
};

use crate::Clock;
use crate::error::ChallengeServiceError;
use crate::quotes;

/// Aggregated statistics over all progress rows of the active challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeStats {
    pub total_focus_minutes: u64,
    pub total_focus_hours: f64,
    pub days_active: u32,
    pub days_remaining: i64,
    pub days_total: u64,
    pub goal_percentage: f64,
    pub average_daily_minutes: f64,
}

/// Fresh countdown snapshot for the active challenge, without persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeTimer {
    pub end_date: NaiveDate,
    pub days_remaining: i64,
    pub countdown_seconds: i64,
    pub in_active_window: bool,
}

/// The cached daily quote together with the day it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub quote: String,
}

/// Manages the global 64-day challenge, its daily progress rows, and the
/// countdown arithmetic over the active-hours window.
///
/// "The active challenge" is always resolved by querying for the row flagged
/// active; no in-memory singleton is held anywhere.
#[derive(Clone)]
pub struct ChallengeService {
    clock: Clock,
    challenges: Arc<dyn ChallengeRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ChallengeService {
    #[must_use]
    pub fn new(
        clock: Clock,
        challenges: Arc<dyn ChallengeRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            challenges,
            progress,
        }
    }

    /// Start a new challenge spanning 64 days from today.
    ///
    /// All previously active challenges are deactivated first, then today's
    /// progress row is seeded with the full countdown budget.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeServiceError::Challenge` for validation failures,
    /// `ChallengeServiceError::Storage` if persistence fails.
    pub async fn create(
        &self,
        ultimate_focus_goal_hours: f64,
    ) -> Result<Challenge, ChallengeServiceError> {
        let today = self.clock.today();
        let challenge = Challenge::new(ChallengeId::new(0), today, ultimate_focus_goal_hours)?;

        self.challenges.deactivate_all().await?;
        let id = self
            .challenges
            .insert_challenge(NewChallengeRecord::from_challenge(&challenge))
            .await?;

        let seed = ChallengeProgress::new(
            id,
            today,
            countdown::INITIAL_COUNTDOWN_SECS,
            countdown::in_active_window(self.clock.now_local()),
            self.clock.now(),
        );
        self.progress.upsert_progress(&seed).await?;

        Ok(self
            .challenges
            .active_challenge()
            .await?
            .ok_or(StorageError::NotFound)?)
    }

    /// The currently active challenge, if any.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeServiceError::Storage` if repository access fails.
    pub async fn current(&self) -> Result<Option<Challenge>, ChallengeServiceError> {
        Ok(self.challenges.active_challenge().await?)
    }

    /// Recompute the countdown for today and persist it into today's
    /// progress row (creating the row if needed).
    ///
    /// # Errors
    ///
    /// Returns `ChallengeServiceError::NoActiveChallenge` when no challenge
    /// is active.
    pub async fn sync_countdown(&self) -> Result<ChallengeProgress, ChallengeServiceError> {
        let challenge = self.require_active().await?;
        let now_local = self.clock.now_local();
        let seconds = countdown::countdown_secs(now_local, challenge.end_date());
        let in_window = countdown::in_active_window(now_local);

        let mut row = self.today_row(&challenge).await?;
        row.set_countdown(seconds, in_window, self.clock.now());
        self.progress.upsert_progress(&row).await?;
        Ok(row)
    }

    /// Add focus minutes to today's accumulator of the active challenge.
    ///
    /// A missing progress row is created with a freshly computed countdown
    /// baseline. With no active challenge this is a no-op: session ends must
    /// not fail because nobody started a challenge.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeServiceError::Storage` if persistence fails.
    pub async fn record_focus_minutes(&self, minutes: u32) -> Result<(), ChallengeServiceError> {
        let Some(challenge) = self.challenges.active_challenge().await? else {
            return Ok(());
        };

        let mut row = self.today_row(&challenge).await?;
        row.add_focus_minutes(minutes, self.clock.now());
        self.progress.upsert_progress(&row).await?;
        Ok(())
    }

    /// Today's quote, picked deterministically from the date and cached in
    /// today's progress row so repeated calls return the same text.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeServiceError::NoActiveChallenge` when no challenge
    /// is active.
    pub async fn daily_quote(&self) -> Result<DailyQuote, ChallengeServiceError> {
        let challenge = self.require_active().await?;
        let today = self.clock.today();

        let mut row = self.today_row(&challenge).await?;
        if let Some(cached) = row.quote() {
            return Ok(DailyQuote {
                date: today,
                quote: cached.to_owned(),
            });
        }

        let quote = quotes::quote_for_date(today);
        row.set_quote(quote.to_owned(), self.clock.now());
        self.progress.upsert_progress(&row).await?;
        Ok(DailyQuote {
            date: today,
            quote: quote.to_owned(),
        })
    }

    /// Aggregate all progress rows of the active challenge.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeServiceError::NoActiveChallenge` when no challenge
    /// is active.
    pub async fn stats(&self) -> Result<ChallengeStats, ChallengeServiceError> {
        let challenge = self.require_active().await?;
        let rows = self.progress.progress_for_challenge(challenge.id()).await?;

        let total_focus_minutes: u64 = rows.iter().map(|r| u64::from(r.focus_minutes())).sum();
        let total_focus_hours = total_focus_minutes as f64 / 60.0;
        let days_active =
            u32::try_from(rows.iter().filter(|r| r.focus_minutes() > 0).count())
                .unwrap_or(u32::MAX);

        let goal_hours = challenge.ultimate_focus_goal_hours();
        let goal_percentage = if goal_hours <= 0.0 {
            0.0
        } else {
            total_focus_hours / goal_hours * 100.0
        };
        let average_daily_minutes = if days_active == 0 {
            0.0
        } else {
            total_focus_minutes as f64 / f64::from(days_active)
        };

        Ok(ChallengeStats {
            total_focus_minutes,
            total_focus_hours,
            days_active,
            days_remaining: challenge.days_remaining(self.clock.today()),
            days_total: CHALLENGE_SPAN_DAYS,
            goal_percentage,
            average_daily_minutes,
        })
    }

    /// Fresh countdown snapshot. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeServiceError::NoActiveChallenge` when no challenge
    /// is active.
    pub async fn timer_status(&self) -> Result<ChallengeTimer, ChallengeServiceError> {
        let challenge = self.require_active().await?;
        let now_local = self.clock.now_local();
        Ok(ChallengeTimer {
            end_date: challenge.end_date(),
            days_remaining: challenge.days_remaining(now_local.date()),
            countdown_seconds: countdown::countdown_secs(now_local, challenge.end_date()),
            in_active_window: countdown::in_active_window(now_local),
        })
    }

    async fn require_active(&self) -> Result<Challenge, ChallengeServiceError> {
        self.challenges
            .active_challenge()
            .await?
            .ok_or(ChallengeServiceError::NoActiveChallenge)
    }

    /// Today's progress row, created with a fresh countdown baseline when it
    /// does not exist yet.
    async fn today_row(
        &self,
        challenge: &Challenge,
    ) -> Result<ChallengeProgress, ChallengeServiceError> {
        let today = self.clock.today();
        if let Some(row) = self.progress.get_progress(challenge.id(), today).await? {
            return Ok(row);
        }

        let now_local = self.clock.now_local();
        Ok(ChallengeProgress::new(
            challenge.id(),
            today,
            countdown::countdown_secs(now_local, challenge.end_date()),
            countdown::in_active_window(now_local),
            self.clock.now(),
        ))
    }
}
