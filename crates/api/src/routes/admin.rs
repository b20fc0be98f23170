use axum::{
    Json,
    extract::{Path, Query, State},
};
use bson::oid::ObjectId;
use serde::Deserialize;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use super::auth::{UserResponse, to_user_response};
use voluntry_db::models::UserRole;
use voluntry_services::dao::{base::PaginationParams, user::UserFilter};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth.require_admin()?;

    let filter = UserFilter {
        search: query.search,
        role: query.role.as_deref().and_then(UserRole::parse),
    };
    let params = PaginationParams {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(20),
        sort: None,
    };

    let result = state.users.list(&filter, &params).await?;
    let items: Vec<UserResponse> = result.items.into_iter().map(to_user_response).collect();

    Ok(Json(serde_json::json!({
        "items": items,
        "total": result.total,
        "page": result.page,
        "limit": result.limit,
        "total_pages": result.total_pages,
    })))
}

pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require_admin()?;

    let uid = parse_user_id(&user_id)?;
    let role = UserRole::parse(&body.role).ok_or_else(|| {
        ApiError::BadRequest("Valid role (volunteer/manager/admin) is required".to_string())
    })?;

    if !state.users.set_role(uid, role).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let user = state.users.base.find_by_id(uid).await?;
    Ok(Json(to_user_response(user)))
}

pub async fn remove_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth.require_admin()?;

    let uid = parse_user_id(&user_id)?;
    if uid == auth.user_id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    if !state.users.delete(uid).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state.activities.purge_user(uid).await?;

    Ok(Json(serde_json::json!({
        "message": "User removed successfully",
    })))
}

/// Unauthenticated bootstrap: promotes a user to admin, but only while the
/// instance has no admin at all. Once one exists this endpoint is dead and
/// role changes go through `change_role`.
pub async fn make_first_admin(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    if state.users.count_admins().await? > 0 {
        return Err(ApiError::Forbidden(
            "Admin already exists; use the admin role endpoint".to_string(),
        ));
    }

    let uid = parse_user_id(&user_id)?;
    if !state.users.set_role(uid, UserRole::Admin).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let user = state.users.base.find_by_id(uid).await?;
    Ok(Json(to_user_response(user)))
}

fn parse_user_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid user id".to_string()))
}
