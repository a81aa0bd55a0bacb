use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use momentum_core::calc;
use momentum_core::model::{
    Subtopic, SubtopicDraft, SubtopicId, SubtopicPatch, TopicDraft, TopicId, TopicPatch,
};
use services::topic_service::{SubtopicView, TopicWithSubtopics};
use services::AppServices;

use crate::error::ApiError;
use crate::routes::{coerce_bool, coerce_bool_opt, lenient_urls, lenient_urls_opt};

//
// ─── RESPONSE BODIES ───────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDto {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub notes: Option<String>,
    pub urls: Vec<String>,
    pub money_per_5_reps: f64,
    pub is_money_per_5_reps_locked: bool,
    pub earnings: f64,
    pub completion_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sub_topics: Vec<SubtopicDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtopicDto {
    pub id: u64,
    pub topic_id: u64,
    pub title: String,
    pub notes: Option<String>,
    pub urls: Vec<String>,
    pub reps_completed: u32,
    pub reps_goal: u32,
    pub goal_amount: f64,
    pub milestone_earnings: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepsAdjustedDto {
    pub sub_topic: SubtopicDto,
    pub topic: TopicDto,
}

impl TopicDto {
    pub(crate) fn from_view(view: TopicWithSubtopics) -> Self {
        let topic = view.topic;
        Self {
            id: topic.id().value(),
            title: topic.title().to_owned(),
            category: topic.category().to_owned(),
            notes: topic.notes().map(str::to_owned),
            urls: topic.urls().to_vec(),
            money_per_5_reps: topic.money_per_5_reps(),
            is_money_per_5_reps_locked: topic.rate_locked(),
            earnings: topic.earnings(),
            completion_percentage: topic.completion_percentage(),
            created_at: topic.created_at(),
            updated_at: topic.updated_at(),
            sub_topics: view
                .subtopics
                .into_iter()
                .map(SubtopicDto::from_subtopic)
                .collect(),
        }
    }
}

impl SubtopicDto {
    fn from_subtopic(subtopic: Subtopic) -> Self {
        let milestone_earnings =
            calc::subtopic_milestone_earnings(subtopic.reps_completed(), subtopic.goal_amount());
        Self {
            id: subtopic.id().value(),
            topic_id: subtopic.topic_id().value(),
            title: subtopic.title().to_owned(),
            notes: subtopic.notes().map(str::to_owned),
            urls: subtopic.urls().to_vec(),
            reps_completed: subtopic.reps_completed(),
            reps_goal: subtopic.reps_goal(),
            goal_amount: subtopic.goal_amount(),
            milestone_earnings,
        }
    }

    fn from_view(view: SubtopicView) -> Self {
        let mut dto = Self::from_subtopic(view.subtopic);
        dto.milestone_earnings = view.milestone_earnings;
        dto
    }
}

//
// ─── REQUEST BODIES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_urls")]
    pub urls: Vec<String>,
    #[serde(default)]
    pub money_per_5_reps: Option<f64>,
    #[serde(default, deserialize_with = "coerce_bool")]
    pub is_money_per_5_reps_locked: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_urls_opt")]
    pub urls: Option<Vec<String>>,
    #[serde(default)]
    pub money_per_5_reps: Option<f64>,
    #[serde(default, deserialize_with = "coerce_bool_opt")]
    pub is_money_per_5_reps_locked: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubtopicRequest {
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_urls")]
    pub urls: Vec<String>,
    pub goal_amount: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubtopicRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_urls_opt")]
    pub urls: Option<Vec<String>>,
    #[serde(default)]
    pub goal_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustRepsRequest {
    pub reps: i64,
}

//
// ─── HANDLERS ──────────────────────────────────────────────────────────────────
//

pub async fn list_topics(
    State(services): State<AppServices>,
) -> Result<Json<Vec<TopicDto>>, ApiError> {
    let topics = services.topics().list_topics().await?;
    Ok(Json(topics.into_iter().map(TopicDto::from_view).collect()))
}

pub async fn create_topic(
    State(services): State<AppServices>,
    Json(body): Json<CreateTopicRequest>,
) -> Result<Json<TopicDto>, ApiError> {
    let draft = TopicDraft {
        title: body.title,
        category: body.category,
        notes: body.notes,
        urls: body.urls,
        money_per_5_reps: body.money_per_5_reps.unwrap_or(0.0),
        rate_locked: body.is_money_per_5_reps_locked,
    };
    let created = services.topics().create_topic(draft).await?;
    Ok(Json(TopicDto::from_view(created)))
}

pub async fn get_topic(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
) -> Result<Json<TopicDto>, ApiError> {
    let topic = services.topics().get_topic(TopicId::new(id)).await?;
    Ok(Json(TopicDto::from_view(topic)))
}

pub async fn update_topic(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
    Json(body): Json<UpdateTopicRequest>,
) -> Result<Json<TopicDto>, ApiError> {
    let patch = TopicPatch {
        title: body.title,
        category: body.category,
        notes: body.notes,
        urls: body.urls,
        money_per_5_reps: body.money_per_5_reps,
        rate_locked: body.is_money_per_5_reps_locked,
    };
    let updated = services.topics().update_topic(TopicId::new(id), patch).await?;
    Ok(Json(TopicDto::from_view(updated)))
}

pub async fn delete_topic(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    services.topics().delete_topic(TopicId::new(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn categories(
    State(services): State<AppServices>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(services.topics().categories().await?))
}

pub async fn create_subtopic(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
    Json(body): Json<CreateSubtopicRequest>,
) -> Result<Json<SubtopicDto>, ApiError> {
    let draft = SubtopicDraft {
        title: body.title,
        notes: body.notes,
        urls: body.urls,
        goal_amount: body.goal_amount,
    };
    let created = services
        .topics()
        .create_subtopic(TopicId::new(id), draft)
        .await?;
    Ok(Json(SubtopicDto::from_view(created)))
}

pub async fn get_subtopic(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
) -> Result<Json<SubtopicDto>, ApiError> {
    let view = services.topics().get_subtopic(SubtopicId::new(id)).await?;
    Ok(Json(SubtopicDto::from_view(view)))
}

pub async fn update_subtopic(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
    Json(body): Json<UpdateSubtopicRequest>,
) -> Result<Json<SubtopicDto>, ApiError> {
    let patch = SubtopicPatch {
        title: body.title,
        notes: body.notes,
        urls: body.urls,
        goal_amount: body.goal_amount,
    };
    let updated = services
        .topics()
        .update_subtopic(SubtopicId::new(id), patch)
        .await?;
    Ok(Json(SubtopicDto::from_view(updated)))
}

pub async fn delete_subtopic(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
) -> Result<Json<TopicDto>, ApiError> {
    let parent = services
        .topics()
        .delete_subtopic(SubtopicId::new(id))
        .await?;
    Ok(Json(TopicDto::from_view(parent)))
}

pub async fn adjust_reps(
    State(services): State<AppServices>,
    Path(id): Path<u64>,
    Json(body): Json<AdjustRepsRequest>,
) -> Result<Json<RepsAdjustedDto>, ApiError> {
    let adjusted = services
        .topics()
        .adjust_reps(SubtopicId::new(id), body.reps)
        .await?;
    let sub_topic = SubtopicDto::from_subtopic(adjusted.subtopic);
    let topic = services.topics().get_topic(adjusted.topic.id()).await?;
    Ok(Json(RepsAdjustedDto {
        sub_topic,
        topic: TopicDto::from_view(topic),
    }))
}
