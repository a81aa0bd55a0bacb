use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use momentum_core::model::GlobalGoalDraft;
use services::AppServices;
use services::dashboard_service::{ActivityDashboard, TopicDashboard};

use crate::error::ApiError;
use crate::routes::activities::ActivityProgressDto;
use crate::routes::topics::TopicDto;

//
// ─── RESPONSE BODIES ───────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDashboardDto {
    pub global_goal: f64,
    pub total_earnings: f64,
    pub progress_percentage: f64,
    pub topics: Vec<TopicDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDashboardDto {
    pub total_reps: u64,
    pub completion_rate: f64,
    pub active_sessions: u64,
    pub activities: Vec<ActivityProgressDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummaryDto {
    pub id: u64,
    pub name: String,
    pub reps: u32,
    pub daily_goal: u32,
    pub progress_percent: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalGoalDto {
    pub global_goal: f64,
}

//
// ─── REQUEST BODIES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGlobalGoalRequest {
    pub global_goal: f64,
}

//
// ─── HANDLERS ──────────────────────────────────────────────────────────────────
//

pub async fn topic_dashboard(
    State(services): State<AppServices>,
) -> Result<Json<TopicDashboardDto>, ApiError> {
    let TopicDashboard {
        global_goal,
        total_earnings,
        progress_percentage,
        topics,
    } = services.dashboard().topic_dashboard().await?;

    Ok(Json(TopicDashboardDto {
        global_goal,
        total_earnings,
        progress_percentage,
        topics: topics.into_iter().map(TopicDto::from_view).collect(),
    }))
}

pub async fn update_global_goal(
    State(services): State<AppServices>,
    Json(body): Json<UpdateGlobalGoalRequest>,
) -> Result<Json<GlobalGoalDto>, ApiError> {
    let stored = services
        .dashboard()
        .update_global_goal(GlobalGoalDraft {
            global_goal: body.global_goal,
        })
        .await?;
    Ok(Json(GlobalGoalDto {
        global_goal: stored,
    }))
}

pub async fn activity_dashboard(
    State(services): State<AppServices>,
) -> Result<Json<ActivityDashboardDto>, ApiError> {
    let ActivityDashboard {
        total_reps,
        completion_rate,
        active_sessions,
        activities,
    } = services.dashboard().activity_dashboard().await?;

    Ok(Json(ActivityDashboardDto {
        total_reps,
        completion_rate,
        active_sessions,
        activities: activities
            .into_iter()
            .map(ActivityProgressDto::from_view)
            .collect(),
    }))
}

pub async fn activity_summaries(
    State(services): State<AppServices>,
) -> Result<Json<Vec<ActivitySummaryDto>>, ApiError> {
    let summaries = services.dashboard().activity_summaries().await?;
    Ok(Json(
        summaries
            .into_iter()
            .map(|summary| ActivitySummaryDto {
                id: summary.id.value(),
                name: summary.name,
                reps: summary.reps,
                daily_goal: summary.daily_goal,
                progress_percent: summary.progress_percent,
            })
            .collect(),
    ))
}
