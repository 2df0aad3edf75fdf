//! Generic programme schema: result CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::results::{NewResult, ProjectResult, ResultFilter, ResultRepository, ResultUpdate};

use crate::state::SharedState;

fn repo(state: &SharedState) -> ResultRepository {
    ResultRepository::new(state.db.clone())
}

/// GET /api/results - List results
#[utoipa::path(
    get,
    path = "/api/results",
    tag = "Results",
    params(ResultFilter),
    responses((status = 200, description = "Result list", body = [ProjectResult]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<ResultFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let results = repo(&state).list(&filter).await?;
    Ok(Json(results))
}

/// GET /api/results/{id} - One result
#[utoipa::path(
    get,
    path = "/api/results/{id}",
    tag = "Results",
    responses(
        (status = 200, description = "Result", body = ProjectResult),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let result = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Result not found".to_string()))?;
    Ok(Json(result))
}

/// POST /api/results - Create a result
#[utoipa::path(
    post,
    path = "/api/results",
    tag = "Results",
    request_body = NewResult,
    responses(
        (status = 201, description = "Created", body = ProjectResult),
        (status = 400, description = "Unknown project or activity")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewResult>,
) -> Result<impl IntoResponse, ApiError> {
    let result = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "Result already exists"))?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// PUT /api/results/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/results/{id}",
    tag = "Results",
    request_body = ResultUpdate,
    responses(
        (status = 200, description = "Updated", body = ProjectResult),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<ResultUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let result = repo(&state)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Result not found".to_string()))?;
    Ok(Json(result))
}

/// DELETE /api/results/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/results/{id}",
    tag = "Results",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let result = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Result not found".to_string()))?;
    Ok(Json(json!({
        "message": "Result deleted successfully",
        "result": result,
    })))
}
