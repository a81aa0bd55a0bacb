use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use momentum_core::calc::PeriodProgress;
use momentum_core::model::{
    Activity, ActivityDraft, ActivityId, ActivityPatch, ActivitySession, Goals, GoalsPatch,
    SessionId, SessionKind,
};
use services::AppServices;
use services::activity_service::{ActivityProgress, TimerStatus};

use crate::error::ApiError;
use crate::routes::{coerce_bool, coerce_bool_opt};

//
// ─── RESPONSE BODIES ───────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsDto {
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
    pub yearly: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: u64,
    pub name: String,
    pub reps: u32,
    pub goals: GoalsDto,
    pub is_time_based: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodProgressDto {
    pub current: u32,
    pub target: u32,
    pub percentage: f64,
    pub remaining: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProgressDto {
    pub activity: ActivityDto,
    pub daily: PeriodProgressDto,
    pub weekly: PeriodProgressDto,
    pub monthly: PeriodProgressDto,
    pub yearly: PeriodProgressDto,
    pub minutes_until_midnight: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: u64,
    pub activity_id: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub is_active: bool,
    pub session_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatusDto {
    pub session_id: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed_minutes: i64,
    pub elapsed_seconds: i64,
    pub elapsed_milliseconds: i64,
}

impl ActivityDto {
    fn from_activity(activity: &Activity) -> Self {
        let goals = activity.goals();
        Self {
            id: activity.id().value(),
            name: activity.name().to_owned(),
            reps: activity.reps(),
            goals: GoalsDto {
                daily: goals.daily,
                weekly: goals.weekly,
                monthly: goals.monthly,
                yearly: goals.yearly,
            },
            is_time_based: activity.time_based(),
            created_at: activity.created_at(),
            updated_at: activity.updated_at(),
        }
    }
}

impl PeriodProgressDto {
    fn from_progress(progress: PeriodProgress) -> Self {
        Self {
            current: progress.current,
            target: progress.target,
            percentage: progress.percentage,
            remaining: progress.remaining,
        }
    }
}

impl ActivityProgressDto {
    pub(crate) fn from_view(view: ActivityProgress) -> Self {
        Self {
            activity: ActivityDto::from_activity(&view.activity),
            daily: PeriodProgressDto::from_progress(view.daily),
            weekly: PeriodProgressDto::from_progress(view.weekly),
            monthly: PeriodProgressDto::from_progress(view.monthly),
            yearly: PeriodProgressDto::from_progress(view.yearly),
            minutes_until_midnight: view.minutes_until_midnight,
        }
    }
}

impl SessionDto {
    fn from_session(session: &ActivitySession) -> Self {
        Self {
            id: session.id().value(),
            activity_id: session.activity_id().value(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
            duration_minutes: session.duration_minutes(),
            is_active: session.is_active(),
            session_type: session.kind().to_string(),
        }
    }
}

impl TimerStatusDto {
    fn from_status(status: &TimerStatus) -> Self {
        Self {
            session_id: status.session_id.value(),
            started_at: status.started_at,
            elapsed_minutes: status.elapsed.minutes,
            elapsed_seconds: status.elapsed.seconds,
            elapsed_milliseconds: status.elapsed.milliseconds,
        }
    }
}

//
// ─── REQUEST BODIES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsRequest {
    #[serde(default)]
    pub daily: Option<u32>,
    #[serde(default)]
    pub weekly: Option<u32>,
    #[serde(default)]
    pub monthly: Option<u32>,
    #[serde(default)]
    pub yearly: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    pub name: String,
    #[serde(default)]
    pub goals: GoalsRequest,
    #[serde(default, deserialize_with = "coerce_bool")]
    pub is_time_based: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub goals: GoalsRequest,
    #[serde(default, deserialize_with = "coerce_bool_opt")]
    pub is_time_based: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub amount: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[serde(default)]
    pub session_type: Option<String>,
}

fn parse_kind(raw: Option<String>) -> Result<SessionKind, ApiError> {
    match raw {
        None => Ok(SessionKind::default()),
        Some(raw) => raw
            .parse::<SessionKind>()
            .map_err(|e| ApiError::Validation(e.to_string())),
    }
}

//
// ─── HANDLERS ──────────────────────────────────────────────────────────────────
//

pub async fn list_activities(
    State(services): State<AppServices>,
) -> Result<Json<Vec<ActivityDto>>, ApiError> {
    let activities = services.activities().list().await?;
    Ok(Json(
        activities.iter().map(ActivityDto::from_activity).collect(),
    ))
}

pub async fn create_activity(
    State(services): State<AppServices>,
    Json(body): Json<CreateActivityRequest>,
) -> Result<Json<ActivityDto>, ApiError> {
    let draft = ActivityDraft {
        name: body.name,
        goals: Goals {
            daily: body.goals.daily.unwrap_or(0),
            weekly: body.goals.weekly.unwrap_or(0),
            monthly: body.goals.monthly.unwrap_or(0),
            yearly: body.goals.yearly.unwrap_or(0),
        },
        time_based: body.is_time_based,
    };
    let activity = services.activities().create(draft).await?;
    Ok(Json(ActivityDto::from_activity(&activity)))
}

pub async fn get_activity(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
) -> Result<Json<ActivityDto>, ApiError> {
    let activity = services.activities().get(ActivityId::new(id)).await?;
    Ok(Json(ActivityDto::from_activity(&activity)))
}

pub async fn update_activity(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
    Json(body): Json<UpdateActivityRequest>,
) -> Result<Json<ActivityDto>, ApiError> {
    let patch = ActivityPatch {
        name: body.name,
        goals: GoalsPatch {
            daily: body.goals.daily,
            weekly: body.goals.weekly,
            monthly: body.goals.monthly,
            yearly: body.goals.yearly,
        },
        time_based: body.is_time_based,
    };
    let activity = services
        .activities()
        .update(ActivityId::new(id), patch)
        .await?;
    Ok(Json(ActivityDto::from_activity(&activity)))
}

pub async fn delete_activity(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    services.activities().delete(ActivityId::new(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn increment(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
    body: Option<Json<AmountRequest>>,
) -> Result<Json<ActivityDto>, ApiError> {
    let amount = body.and_then(|Json(b)| b.amount).unwrap_or(1);
    let activity = services
        .activities()
        .increment(ActivityId::new(id), amount)
        .await?;
    Ok(Json(ActivityDto::from_activity(&activity)))
}

pub async fn decrement(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
    body: Option<Json<AmountRequest>>,
) -> Result<Json<ActivityDto>, ApiError> {
    let amount = body.and_then(|Json(b)| b.amount).unwrap_or(1);
    let activity = services
        .activities()
        .decrement(ActivityId::new(id), amount)
        .await?;
    Ok(Json(ActivityDto::from_activity(&activity)))
}

pub async fn progress(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
) -> Result<Json<ActivityProgressDto>, ApiError> {
    let view = services.activities().progress(ActivityId::new(id)).await?;
    Ok(Json(ActivityProgressDto::from_view(view)))
}

pub async fn timer_status(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
) -> Result<Json<Option<TimerStatusDto>>, ApiError> {
    let status = services
        .activities()
        .timer_status(ActivityId::new(id))
        .await?;
    Ok(Json(status.as_ref().map(TimerStatusDto::from_status)))
}

pub async fn list_sessions(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<SessionDto>>, ApiError> {
    let sessions = services.sessions().list(ActivityId::new(id)).await?;
    Ok(Json(sessions.iter().map(SessionDto::from_session).collect()))
}

pub async fn start_session(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
    body: Option<Json<StartSessionRequest>>,
) -> Result<Json<SessionDto>, ApiError> {
    let kind = parse_kind(body.and_then(|Json(b)| b.session_type))?;
    let session = services
        .sessions()
        .start(ActivityId::new(id), kind)
        .await?;
    Ok(Json(SessionDto::from_session(&session)))
}

pub async fn end_session(
    State(services): State<AppServices>,
    Path((id, sid)): Path<(u64, u64)>,
) -> Result<Json<SessionDto>, ApiError> {
    let ended = services
        .sessions()
        .end(ActivityId::new(id), SessionId::new(sid))
        .await?;
    Ok(Json(SessionDto::from_session(&ended.session)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_goals_to_zero() {
        let body: CreateActivityRequest =
            serde_json::from_str(r#"{"name": "Reading"}"#).unwrap();
        assert!(body.goals.daily.is_none());
        assert!(!body.is_time_based);
    }

    #[test]
    fn session_type_parses_or_defaults() {
        assert_eq!(parse_kind(None).unwrap(), SessionKind::Manual);
        assert_eq!(
            parse_kind(Some("timer".to_owned())).unwrap(),
            SessionKind::Timer
        );
        assert!(parse_kind(Some("pomodoro".to_owned())).is_err());
    }

    #[test]
    fn activity_dto_uses_camel_case() {
        use momentum_core::time::fixed_now;

        let activity = Activity::new(
            ActivityId::new(3),
            ActivityDraft {
                name: "Focus Hour".to_owned(),
                time_based: true,
                ..ActivityDraft::default()
            },
            fixed_now(),
        )
        .unwrap();
        let json = serde_json::to_value(ActivityDto::from_activity(&activity)).unwrap();
        assert_eq!(json["isTimeBased"], true);
        assert!(json.get("createdAt").is_some());
    }
}
