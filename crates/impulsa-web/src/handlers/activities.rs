//! Generic programme schema: activity CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::activities::{
    Activity, ActivityFilter, ActivityRepository, ActivityUpdate, NewActivity,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> ActivityRepository {
    ActivityRepository::new(state.db.clone())
}

/// GET /api/activities - List activities
#[utoipa::path(
    get,
    path = "/api/activities",
    tag = "Activities",
    params(ActivityFilter),
    responses((status = 200, description = "Activity list", body = [Activity]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<ActivityFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let activities = repo(&state).list(&filter).await?;
    Ok(Json(activities))
}

/// GET /api/activities/{id} - One activity
#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    tag = "Activities",
    responses(
        (status = 200, description = "Activity", body = Activity),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;
    Ok(Json(activity))
}

/// POST /api/activities - Create an activity
#[utoipa::path(
    post,
    path = "/api/activities",
    tag = "Activities",
    request_body = NewActivity,
    responses(
        (status = 201, description = "Created", body = Activity),
        (status = 400, description = "Unknown project or objective")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewActivity>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "Activity already exists"))?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// PUT /api/activities/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    tag = "Activities",
    request_body = ActivityUpdate,
    responses(
        (status = 200, description = "Updated", body = Activity),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<ActivityUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = repo(&state)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;
    Ok(Json(activity))
}

/// DELETE /api/activities/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    tag = "Activities",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;
    Ok(Json(json!({
        "message": "Activity deleted successfully",
        "activity": activity,
    })))
}
