use std::sync::Arc;

use futures::future::try_join_all;

use momentum_core::calc;
use momentum_core::model::{
    ActivityId, DEFAULT_GLOBAL_GOAL, GLOBAL_GOAL_KEY, GlobalGoalDraft,
};
use storage::repository::{SessionRepository, SettingsRepository};

use crate::activity_service::{ActivityProgress, ActivityService};
use crate::error::DashboardError;
use crate::topic_service::{TopicService, TopicWithSubtopics};

/// Earnings overview across all topics against the global goal.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicDashboard {
    pub global_goal: f64,
    pub total_earnings: f64,
    pub progress_percentage: f64,
    pub topics: Vec<TopicWithSubtopics>,
}

/// Rep overview across all activities.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDashboard {
    pub total_reps: u64,
    pub completion_rate: f64,
    pub active_sessions: u64,
    pub activities: Vec<ActivityProgress>,
}

/// Minimal per-activity row for compact dashboard views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySummary {
    pub id: ActivityId,
    pub name: String,
    pub reps: u32,
    pub daily_goal: u32,
    pub progress_percent: u32,
}

/// Fan-out reads across the other services to build summary views.
///
/// Aggregation reads run concurrently and are joined before responding;
/// any single failure fails the whole aggregate.
#[derive(Clone)]
pub struct DashboardService {
    settings: Arc<dyn SettingsRepository>,
    sessions: Arc<dyn SessionRepository>,
    topics: TopicService,
    activities: ActivityService,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        sessions: Arc<dyn SessionRepository>,
        topics: TopicService,
        activities: ActivityService,
    ) -> Self {
        Self {
            settings,
            sessions,
            topics,
            activities,
        }
    }

    /// Earnings dashboard: all topics recomputed and persisted, summed
    /// against the global goal (5000 when unset).
    ///
    /// # Errors
    ///
    /// Returns `DashboardError` if any read fails.
    pub async fn topic_dashboard(&self) -> Result<TopicDashboard, DashboardError> {
        let global_goal = self
            .settings
            .get_setting(GLOBAL_GOAL_KEY)
            .await?
            .unwrap_or(DEFAULT_GLOBAL_GOAL);

        let topics = self.topics.list_topics().await?;
        let total_earnings: f64 = topics.iter().map(|t| t.topic.earnings()).sum();
        let progress_percentage = calc::dashboard_progress(total_earnings, global_goal);

        Ok(TopicDashboard {
            global_goal,
            total_earnings,
            progress_percentage,
            topics,
        })
    }

    /// Validate and persist a new global goal, returning the stored value.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Settings` unless the goal is a positive
    /// number.
    pub async fn update_global_goal(&self, draft: GlobalGoalDraft) -> Result<f64, DashboardError> {
        let goal = draft.validate()?;
        self.settings.upsert_setting(GLOBAL_GOAL_KEY, goal).await?;
        Ok(goal)
    }

    /// Activity dashboard: every activity's progress loaded concurrently,
    /// reps summed against the summed daily targets, active sessions counted.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError` if any of the joined reads fails.
    pub async fn activity_dashboard(&self) -> Result<ActivityDashboard, DashboardError> {
        let activities = self.activities.list().await?;

        let progress = try_join_all(
            activities
                .iter()
                .map(|activity| self.activities.progress(activity.id())),
        )
        .await?;

        let total_reps: u64 = activities.iter().map(|a| u64::from(a.reps())).sum();
        let daily_target_total: u64 = activities.iter().map(|a| u64::from(a.goals().daily)).sum();
        let completion_rate = if daily_target_total == 0 {
            0.0
        } else {
            total_reps as f64 / daily_target_total as f64 * 100.0
        };

        let active_sessions = self.sessions.count_active_sessions().await?;

        Ok(ActivityDashboard {
            total_reps,
            completion_rate,
            active_sessions,
            activities: progress,
        })
    }

    /// Minimal per-activity rows with integer progress percentages.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError` if the activity list cannot be loaded.
    pub async fn activity_summaries(&self) -> Result<Vec<ActivitySummary>, DashboardError> {
        let activities = self.activities.list().await?;
        Ok(activities
            .into_iter()
            .map(|activity| {
                let daily_goal = activity.goals().daily;
                let progress_percent = if daily_goal == 0 {
                    0
                } else {
                    let percent = u64::from(activity.reps()) * 100 / u64::from(daily_goal);
                    u32::try_from(percent).unwrap_or(u32::MAX)
                };
                ActivitySummary {
                    id: activity.id(),
                    name: activity.name().to_owned(),
                    reps: activity.reps(),
                    daily_goal,
                    progress_percent,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use momentum_core::Clock;
    use momentum_core::model::{
        ActivityDraft, Goals, SubtopicDraft, TopicDraft,
    };
    use momentum_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn services() -> (DashboardService, TopicService, ActivityService) {
        let repo = InMemoryRepository::new();
        let clock = Clock::Fixed(fixed_now());
        let topics = TopicService::new(clock, Arc::new(repo.clone()), Arc::new(repo.clone()));
        let activities =
            ActivityService::new(clock, Arc::new(repo.clone()), Arc::new(repo.clone()));
        let dashboard = DashboardService::new(
            Arc::new(repo.clone()),
            Arc::new(repo),
            topics.clone(),
            activities.clone(),
        );
        (dashboard, topics, activities)
    }

    #[tokio::test]
    async fn topic_dashboard_defaults_global_goal() {
        let (dashboard, _, _) = services();
        let view = dashboard.topic_dashboard().await.unwrap();
        assert!((view.global_goal - 5000.0).abs() < f64::EPSILON);
        assert!((view.total_earnings - 0.0).abs() < f64::EPSILON);
        assert!(view.topics.is_empty());
    }

    #[tokio::test]
    async fn topic_dashboard_sums_recomputed_earnings() {
        let (dashboard, topics, _) = services();
        let topic = topics
            .create_topic(TopicDraft {
                title: "Pushups".to_owned(),
                category: "Fitness".to_owned(),
                money_per_5_reps: 100.0,
                ..TopicDraft::default()
            })
            .await
            .unwrap();
        let sub = topics
            .create_subtopic(
                topic.topic.id(),
                SubtopicDraft {
                    title: "Set A".to_owned(),
                    goal_amount: 1000.0,
                    ..SubtopicDraft::default()
                },
            )
            .await
            .unwrap();
        topics.adjust_reps(sub.subtopic.id(), 12).await.unwrap();

        let view = dashboard.topic_dashboard().await.unwrap();
        // 12 reps -> 2 payout groups at 100
        assert!((view.total_earnings - 200.0).abs() < f64::EPSILON);
        assert!((view.progress_percentage - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn update_global_goal_validates_positivity() {
        let (dashboard, _, _) = services();
        let err = dashboard
            .update_global_goal(GlobalGoalDraft { global_goal: 0.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Settings(_)));

        let stored = dashboard
            .update_global_goal(GlobalGoalDraft { global_goal: 10_000.0 })
            .await
            .unwrap();
        assert!((stored - 10_000.0).abs() < f64::EPSILON);

        let view = dashboard.topic_dashboard().await.unwrap();
        assert!((view.global_goal - 10_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn activity_dashboard_aggregates_counters() {
        let (dashboard, _, activities) = services();
        let reading = activities
            .create(ActivityDraft {
                name: "Reading".to_owned(),
                goals: Goals {
                    daily: 10,
                    ..Goals::default()
                },
                ..ActivityDraft::default()
            })
            .await
            .unwrap();
        let writing = activities
            .create(ActivityDraft {
                name: "Writing".to_owned(),
                goals: Goals {
                    daily: 10,
                    ..Goals::default()
                },
                ..ActivityDraft::default()
            })
            .await
            .unwrap();
        activities.increment(reading.id(), 5).await.unwrap();
        activities.increment(writing.id(), 10).await.unwrap();

        let view = dashboard.activity_dashboard().await.unwrap();
        assert_eq!(view.total_reps, 15);
        // 15 of 20 daily target
        assert!((view.completion_rate - 75.0).abs() < 1e-9);
        assert_eq!(view.active_sessions, 0);
        assert_eq!(view.activities.len(), 2);
    }

    #[tokio::test]
    async fn activity_dashboard_with_no_targets_is_zero_rate() {
        let (dashboard, _, activities) = services();
        activities
            .create(ActivityDraft {
                name: "Untracked".to_owned(),
                ..ActivityDraft::default()
            })
            .await
            .unwrap();

        let view = dashboard.activity_dashboard().await.unwrap();
        assert!((view.completion_rate - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn summaries_use_integer_percentages() {
        let (dashboard, _, activities) = services();
        let activity = activities
            .create(ActivityDraft {
                name: "Reading".to_owned(),
                goals: Goals {
                    daily: 7,
                    ..Goals::default()
                },
                ..ActivityDraft::default()
            })
            .await
            .unwrap();
        activities.increment(activity.id(), 5).await.unwrap();

        let summaries = dashboard.activity_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        // 5/7 floors to 71
        assert_eq!(summaries[0].progress_percent, 71);
        assert_eq!(summaries[0].daily_goal, 7);
    }
}
