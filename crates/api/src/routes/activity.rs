use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use voluntry_db::models::Activity;
use voluntry_services::activity::{CreateActivity, UpdateActivity};
use voluntry_services::dao::{activity::ActivityFilter, base::PaginationParams};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, message = "Title and date are required"))]
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(default)]
    pub slots: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update body. Absent fields stay untouched; an explicit `null` on
/// a nullable field clears it.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateActivityRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    pub slots: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub media_urls: Option<Vec<String>>,
}

/// Distinguishes a missing key (outer None) from an explicit null
/// (Some(None)).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct ListActivitiesQuery {
    pub tag: Option<String>,
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    /// How many people the caller brings, themselves included.
    #[serde(default = "default_participants")]
    pub participants: u32,
}

fn default_participants() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub user_id: String,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStateRequest {
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: String,
    pub owner_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub location: Option<String>,
    pub slots: u32,
    pub tags: Vec<String>,
    pub state: String,
    pub status: String,
    pub occupancy: u64,
    pub participants: Vec<ParticipantResponse>,
    pub media_urls: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub user_id: String,
    pub joined_at: String,
    pub count: u32,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityResponse>), ApiError> {
    body.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let activity = state
        .activities
        .create(
            &auth.actor(),
            CreateActivity {
                title: body.title,
                description: body.description,
                date: bson::DateTime::from_chrono(body.date),
                location: body.location,
                slots: body.slots,
                tags: body.tags,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(activity))))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListActivitiesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = ActivityFilter {
        tag: query.tag,
        search: query.search,
        from: query.from.map(bson::DateTime::from_chrono),
        to: query.to.map(bson::DateTime::from_chrono),
    };
    let params = PaginationParams {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(20),
        sort: query.sort,
    };

    let result = state.activities.list(&filter, &params).await?;
    let items: Vec<ActivityResponse> = result.items.into_iter().map(to_response).collect();

    Ok(Json(serde_json::json!({
        "items": items,
        "total": result.total,
        "page": result.page,
        "limit": result.limit,
        "total_pages": result.total_pages,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let id = parse_id(&activity_id)?;
    let activity = state.activities.get(id).await?;
    Ok(Json(to_response(activity)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<String>,
    Json(body): Json<UpdateActivityRequest>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let id = parse_id(&activity_id)?;

    let activity = state
        .activities
        .update(
            &auth.actor(),
            id,
            UpdateActivity {
                title: body.title,
                description: body.description,
                date: body.date.map(bson::DateTime::from_chrono),
                location: body.location,
                slots: body.slots,
                tags: body.tags,
                media_urls: body.media_urls,
            },
        )
        .await?;

    Ok(Json(to_response(activity)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&activity_id)?;
    state.activities.delete(&auth.actor(), id).await?;
    Ok(Json(serde_json::json!({
        "message": "Activity deleted successfully",
    })))
}

pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<String>,
    Json(body): Json<JoinRequest>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let id = parse_id(&activity_id)?;
    let activity = state
        .activities
        .join(auth.user_id, id, body.participants)
        .await?;
    Ok(Json(to_response(activity)))
}

pub async fn leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<String>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let id = parse_id(&activity_id)?;
    let activity = state.activities.leave(auth.user_id, id).await?;
    Ok(Json(to_response(activity)))
}

pub async fn record_attendance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<String>,
    Json(body): Json<AttendanceRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&activity_id)?;
    let user_id = ObjectId::parse_str(&body.user_id)
        .map_err(|_| ApiError::BadRequest("Invalid user_id".to_string()))?;

    let record = state
        .activities
        .record_attendance(&auth.actor(), id, user_id, &body.status, body.notes)
        .await?;

    Ok(Json(serde_json::json!({
        "id": record.id.map(|i| i.to_hex()),
        "activity_id": record.activity_id.to_hex(),
        "user_id": record.user_id.to_hex(),
        "status": record.status.as_str(),
        "recorded_by": record.recorded_by.map(|i| i.to_hex()),
        "notes": record.notes,
    })))
}

pub async fn change_state(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<String>,
    Json(body): Json<ChangeStateRequest>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let id = parse_id(&activity_id)?;
    let activity = state
        .activities
        .change_state(&auth.actor(), id, &body.state)
        .await?;
    Ok(Json(to_response(activity)))
}

fn parse_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid activity id".to_string()))
}

pub fn to_response(a: Activity) -> ActivityResponse {
    let occupancy = a.occupancy();
    ActivityResponse {
        id: a.id.map(|i| i.to_hex()).unwrap_or_default(),
        owner_id: a.owner_id.map(|i| i.to_hex()),
        title: a.title,
        description: a.description,
        date: a.date.try_to_rfc3339_string().unwrap_or_default(),
        location: a.location,
        slots: a.slots,
        tags: a.tags,
        state: a.state.as_str().to_string(),
        status: a.status.as_str().to_string(),
        occupancy,
        participants: a
            .participants
            .into_iter()
            .map(|p| ParticipantResponse {
                user_id: p.user_id.to_hex(),
                joined_at: p.joined_at.try_to_rfc3339_string().unwrap_or_default(),
                count: p.count,
            })
            .collect(),
        media_urls: a.media_urls,
        created_at: a.created_at.try_to_rfc3339_string().unwrap_or_default(),
        updated_at: a.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
