#![forbid(unsafe_code)]

pub mod activity_service;
pub mod app_services;
pub mod challenge_service;
pub mod dashboard_service;
pub mod error;
pub mod quotes;
pub mod session_service;
pub mod topic_service;

pub use momentum_core::Clock;

pub use error::{
    ActivityServiceError, AppServicesError, ChallengeServiceError, DashboardError,
    SessionServiceError, TopicServiceError,
};

pub use activity_service::{ActivityProgress, ActivityService, TimerStatus};
pub use app_services::AppServices;
pub use challenge_service::{
    ChallengeService, ChallengeStats, ChallengeTimer, DailyQuote,
};
pub use dashboard_service::{
    ActivityDashboard, ActivitySummary, DashboardService, TopicDashboard,
};
pub use session_service::{SessionEnded, SessionService};
pub use topic_service::{RepsAdjusted, SubtopicView, TopicService, TopicWithSubtopics};
