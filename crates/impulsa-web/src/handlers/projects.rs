//! Generic programme schema: project CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::projects::{NewProject, Project, ProjectFilter, ProjectRepository, ProjectUpdate};

use crate::state::SharedState;

fn repo(state: &SharedState) -> ProjectRepository {
    ProjectRepository::new(state.db.clone())
}

/// GET /api/projects - List projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    params(ProjectFilter),
    responses((status = 200, description = "Project list", body = [Project]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<ProjectFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let projects = repo(&state).list(&filter).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id} - One project
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let project = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(Json(project))
}

/// POST /api/projects - Create a project
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = NewProject,
    responses(
        (status = 201, description = "Created", body = Project),
        (status = 400, description = "Duplicate project code")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewProject>,
) -> Result<impl IntoResponse, ApiError> {
    let project = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "Project code already exists"))?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    request_body = ProjectUpdate,
    responses(
        (status = 200, description = "Updated", body = Project),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<ProjectUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let project = repo(&state)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let project = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(Json(json!({
        "message": "Project deleted successfully",
        "project": project,
    })))
}
