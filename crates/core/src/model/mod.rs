mod activity;
mod challenge;
mod ids;
mod session;
mod settings;
mod subtopic;
mod topic;

pub use ids::{ActivityId, ChallengeId, ParseIdError, SessionId, SubtopicId, TopicId};

pub use activity::{Activity, ActivityDraft, ActivityError, ActivityPatch, Goals, GoalsPatch};
pub use challenge::{
    CHALLENGE_SPAN_DAYS, Challenge, ChallengeError, ChallengeProgress,
};
pub use session::{ActivitySession, Elapsed, SessionKind, SessionStateError};
pub use settings::{DEFAULT_GLOBAL_GOAL, GLOBAL_GOAL_KEY, GlobalGoalDraft, SettingsError};
pub use subtopic::{
    GOAL_AMOUNT_STEP, SUBTOPIC_REPS_GOAL, Subtopic, SubtopicDraft, SubtopicError, SubtopicPatch,
};
pub use topic::{Topic, TopicDraft, TopicError, TopicPatch};
