use axum::{
    Json,
    extract::{Path, Query, State},
};
use bson::oid::ObjectId;
use serde::Deserialize;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use super::activity::{ActivityResponse, to_response};

#[derive(Debug, Deserialize)]
pub struct UserActivitiesQuery {
    /// "owner" or "participant"; anything else returns both.
    pub role: Option<String>,
}

pub async fn activities(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
    Query(query): Query<UserActivitiesQuery>,
) -> Result<Json<Vec<ActivityResponse>>, ApiError> {
    let uid = ObjectId::parse_str(&user_id)
        .map_err(|_| ApiError::BadRequest("Invalid user id".to_string()))?;

    let activities = state
        .activities
        .list_for_user(uid, query.role.as_deref())
        .await?;

    Ok(Json(activities.into_iter().map(to_response).collect()))
}
