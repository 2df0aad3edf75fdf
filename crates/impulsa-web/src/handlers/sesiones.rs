//! Advisory session CRUD. Reads resolve empresa, contact and catalog names.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::sesiones::{
    NewSesion, SesionAsesoramiento, SesionDetalle, SesionFilter, SesionRepository, SesionUpdate,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> SesionRepository {
    SesionRepository::new(state.db.clone())
}

/// GET /api/asesoramientos - List advisory sessions
#[utoipa::path(
    get,
    path = "/api/asesoramientos",
    tag = "Asesoramientos",
    params(SesionFilter),
    responses((status = 200, description = "Session list", body = [SesionDetalle]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<SesionFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let sesiones = repo(&state).list(&filter).await?;
    Ok(Json(sesiones))
}

/// GET /api/asesoramientos/{id} - One session
#[utoipa::path(
    get,
    path = "/api/asesoramientos/{id}",
    tag = "Asesoramientos",
    responses(
        (status = 200, description = "Session", body = SesionDetalle),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let sesion = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sesión asesoramiento not found".to_string()))?;
    Ok(Json(sesion))
}

/// POST /api/asesoramientos - Create a session
#[utoipa::path(
    post,
    path = "/api/asesoramientos",
    tag = "Asesoramientos",
    request_body = NewSesion,
    responses(
        (status = 201, description = "Created", body = SesionAsesoramiento),
        (status = 400, description = "Duplicate código or unknown empresa")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewSesion>,
) -> Result<impl IntoResponse, ApiError> {
    let sesion = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "Código already exists"))?;
    Ok((StatusCode::CREATED, Json(sesion)))
}

/// PUT /api/asesoramientos/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/asesoramientos/{id}",
    tag = "Asesoramientos",
    request_body = SesionUpdate,
    responses(
        (status = 200, description = "Updated", body = SesionAsesoramiento),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<SesionUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let sesion = repo(&state)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sesión asesoramiento not found".to_string()))?;
    Ok(Json(sesion))
}

/// DELETE /api/asesoramientos/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/asesoramientos/{id}",
    tag = "Asesoramientos",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let sesion = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sesión asesoramiento not found".to_string()))?;
    Ok(Json(json!({
        "message": "Sesión asesoramiento deleted successfully",
        "sesion": sesion,
    })))
}
