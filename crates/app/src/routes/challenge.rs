use axum::Json;
use axum::extract::State;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use momentum_core::model::{Challenge, ChallengeProgress};
use services::AppServices;
use services::challenge_service::{ChallengeStats, ChallengeTimer};

use crate::error::ApiError;

//
// ─── RESPONSE BODIES ───────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDto {
    pub id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ultimate_focus_goal_hours: f64,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRowDto {
    pub challenge_id: u64,
    pub date: NaiveDate,
    pub daily_focus_minutes: u32,
    pub countdown_seconds_remaining: i64,
    pub daily_quote: Option<String>,
    pub is_active_period: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_focus_minutes: u64,
    pub total_focus_hours: f64,
    pub days_active: u32,
    pub days_remaining: i64,
    pub days_total: u64,
    pub goal_percentage: f64,
    pub average_daily_minutes: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDto {
    pub date: NaiveDate,
    pub quote: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerDto {
    pub end_date: NaiveDate,
    pub days_remaining: i64,
    pub countdown_seconds: i64,
    pub is_active_period: bool,
}

impl ChallengeDto {
    fn from_challenge(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id().value(),
            start_date: challenge.start_date(),
            end_date: challenge.end_date(),
            ultimate_focus_goal_hours: challenge.ultimate_focus_goal_hours(),
            is_active: challenge.is_active(),
        }
    }
}

impl ProgressRowDto {
    fn from_progress(progress: &ChallengeProgress) -> Self {
        Self {
            challenge_id: progress.challenge_id().value(),
            date: progress.date(),
            daily_focus_minutes: progress.focus_minutes(),
            countdown_seconds_remaining: progress.countdown_seconds(),
            daily_quote: progress.quote().map(str::to_owned),
            is_active_period: progress.in_active_window(),
            updated_at: progress.updated_at(),
        }
    }
}

impl StatsDto {
    fn from_stats(stats: &ChallengeStats) -> Self {
        Self {
            total_focus_minutes: stats.total_focus_minutes,
            total_focus_hours: stats.total_focus_hours,
            days_active: stats.days_active,
            days_remaining: stats.days_remaining,
            days_total: stats.days_total,
            goal_percentage: stats.goal_percentage,
            average_daily_minutes: stats.average_daily_minutes,
        }
    }
}

impl TimerDto {
    fn from_timer(timer: ChallengeTimer) -> Self {
        Self {
            end_date: timer.end_date,
            days_remaining: timer.days_remaining,
            countdown_seconds: timer.countdown_seconds,
            is_active_period: timer.in_active_window,
        }
    }
}

//
// ─── REQUEST BODIES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeRequest {
    pub ultimate_focus_goal_hours: f64,
}

//
// ─── HANDLERS ──────────────────────────────────────────────────────────────────
//

pub async fn create_challenge(
    State(services): State<AppServices>,
    Json(body): Json<CreateChallengeRequest>,
) -> Result<Json<ChallengeDto>, ApiError> {
    let challenge = services
        .challenges()
        .create(body.ultimate_focus_goal_hours)
        .await?;
    Ok(Json(ChallengeDto::from_challenge(&challenge)))
}

pub async fn current_challenge(
    State(services): State<AppServices>,
) -> Result<Json<Option<ChallengeDto>>, ApiError> {
    let challenge = services.challenges().current().await?;
    Ok(Json(challenge.as_ref().map(ChallengeDto::from_challenge)))
}

pub async fn sync_countdown(
    State(services): State<AppServices>,
) -> Result<Json<ProgressRowDto>, ApiError> {
    let row = services.challenges().sync_countdown().await?;
    Ok(Json(ProgressRowDto::from_progress(&row)))
}

pub async fn daily_quote(
    State(services): State<AppServices>,
) -> Result<Json<QuoteDto>, ApiError> {
    let quote = services.challenges().daily_quote().await?;
    Ok(Json(QuoteDto {
        date: quote.date,
        quote: quote.quote,
    }))
}

pub async fn stats(State(services): State<AppServices>) -> Result<Json<StatsDto>, ApiError> {
    let stats = services.challenges().stats().await?;
    Ok(Json(StatsDto::from_stats(&stats)))
}

pub async fn timer_status(
    State(services): State<AppServices>,
) -> Result<Json<TimerDto>, ApiError> {
    let timer = services.challenges().timer_status().await?;
    Ok(Json(TimerDto::from_timer(timer)))
}
