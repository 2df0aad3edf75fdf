//! Formación CRUD plus the attendance sub-resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::formaciones::{
    AsistenteFormacion, Formacion, FormacionDetalle, FormacionFilter, FormacionRepository,
    FormacionResumen, FormacionUpdate, NewFormacion,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> FormacionRepository {
    FormacionRepository::new(state.db.clone())
}

/// GET /api/formaciones - List formaciones with catalog names and inscriptions
#[utoipa::path(
    get,
    path = "/api/formaciones",
    tag = "Formaciones",
    params(FormacionFilter),
    responses((status = 200, description = "Formación list", body = [FormacionResumen]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<FormacionFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let formaciones = repo(&state).list(&filter).await?;
    Ok(Json(formaciones))
}

/// GET /api/formaciones/{id} - One formación
#[utoipa::path(
    get,
    path = "/api/formaciones/{id}",
    tag = "Formaciones",
    responses(
        (status = 200, description = "Formación", body = FormacionDetalle),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let formacion = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Formación not found".to_string()))?;
    Ok(Json(formacion))
}

/// GET /api/formaciones/{id}/asistentes - Attendance with persona and empresa names
#[utoipa::path(
    get,
    path = "/api/formaciones/{id}/asistentes",
    tag = "Formaciones",
    responses((status = 200, description = "Attendees", body = [AsistenteFormacion]))
)]
pub async fn asistentes(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let asistentes = repo(&state).asistentes(id).await?;
    Ok(Json(asistentes))
}

/// POST /api/formaciones - Create a formación
#[utoipa::path(
    post,
    path = "/api/formaciones",
    tag = "Formaciones",
    request_body = NewFormacion,
    responses(
        (status = 201, description = "Created", body = Formacion),
        (status = 400, description = "Duplicate código")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewFormacion>,
) -> Result<impl IntoResponse, ApiError> {
    let formacion = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "Código already exists"))?;
    Ok((StatusCode::CREATED, Json(formacion)))
}

/// PUT /api/formaciones/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/formaciones/{id}",
    tag = "Formaciones",
    request_body = FormacionUpdate,
    responses(
        (status = 200, description = "Updated", body = Formacion),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<FormacionUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let formacion = repo(&state)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Formación not found".to_string()))?;
    Ok(Json(formacion))
}

/// DELETE /api/formaciones/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/formaciones/{id}",
    tag = "Formaciones",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let formacion = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Formación not found".to_string()))?;
    Ok(Json(json!({
        "message": "Formación deleted successfully",
        "formacion": formacion,
    })))
}
