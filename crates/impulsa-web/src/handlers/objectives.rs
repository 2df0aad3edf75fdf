//! Generic programme schema: objective CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::objectives::{
    NewObjective, Objective, ObjectiveFilter, ObjectiveRepository, ObjectiveUpdate,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> ObjectiveRepository {
    ObjectiveRepository::new(state.db.clone())
}

/// GET /api/objectives - List objectives
#[utoipa::path(
    get,
    path = "/api/objectives",
    tag = "Objectives",
    params(ObjectiveFilter),
    responses((status = 200, description = "Objective list", body = [Objective]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<ObjectiveFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let objectives = repo(&state).list(&filter).await?;
    Ok(Json(objectives))
}

/// GET /api/objectives/{id} - One objective
#[utoipa::path(
    get,
    path = "/api/objectives/{id}",
    tag = "Objectives",
    responses(
        (status = 200, description = "Objective", body = Objective),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let objective = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Objective not found".to_string()))?;
    Ok(Json(objective))
}

/// POST /api/objectives - Create an objective
#[utoipa::path(
    post,
    path = "/api/objectives",
    tag = "Objectives",
    request_body = NewObjective,
    responses(
        (status = 201, description = "Created", body = Objective),
        (status = 400, description = "Unknown project")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewObjective>,
) -> Result<impl IntoResponse, ApiError> {
    let objective = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "Objective already exists"))?;
    Ok((StatusCode::CREATED, Json(objective)))
}

/// PUT /api/objectives/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/objectives/{id}",
    tag = "Objectives",
    request_body = ObjectiveUpdate,
    responses(
        (status = 200, description = "Updated", body = Objective),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<ObjectiveUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let objective = repo(&state)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Objective not found".to_string()))?;
    Ok(Json(objective))
}

/// DELETE /api/objectives/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/objectives/{id}",
    tag = "Objectives",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let objective = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Objective not found".to_string()))?;
    Ok(Json(json!({
        "message": "Objective deleted successfully",
        "objective": objective,
    })))
}
