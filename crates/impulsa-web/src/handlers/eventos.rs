//! Evento CRUD plus the attendance sub-resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::eventos::{
    AsistenteEvento, Evento, EventoDetalle, EventoFilter, EventoRepository, EventoResumen,
    EventoUpdate, NewEvento,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> EventoRepository {
    EventoRepository::new(state.db.clone())
}

/// GET /api/eventos - List eventos with catalog names and inscriptions
#[utoipa::path(
    get,
    path = "/api/eventos",
    tag = "Eventos",
    params(EventoFilter),
    responses((status = 200, description = "Evento list", body = [EventoResumen]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<EventoFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let eventos = repo(&state).list(&filter).await?;
    Ok(Json(eventos))
}

/// GET /api/eventos/{id} - One evento
#[utoipa::path(
    get,
    path = "/api/eventos/{id}",
    tag = "Eventos",
    responses(
        (status = 200, description = "Evento", body = EventoDetalle),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let evento = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Evento not found".to_string()))?;
    Ok(Json(evento))
}

/// GET /api/eventos/{id}/asistentes - Attendance with persona and empresa names
#[utoipa::path(
    get,
    path = "/api/eventos/{id}/asistentes",
    tag = "Eventos",
    responses((status = 200, description = "Attendees", body = [AsistenteEvento]))
)]
pub async fn asistentes(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let asistentes = repo(&state).asistentes(id).await?;
    Ok(Json(asistentes))
}

/// POST /api/eventos - Create an evento
#[utoipa::path(
    post,
    path = "/api/eventos",
    tag = "Eventos",
    request_body = NewEvento,
    responses(
        (status = 201, description = "Created", body = Evento),
        (status = 400, description = "Duplicate código")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewEvento>,
) -> Result<impl IntoResponse, ApiError> {
    let evento = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "Código already exists"))?;
    Ok((StatusCode::CREATED, Json(evento)))
}

/// PUT /api/eventos/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/eventos/{id}",
    tag = "Eventos",
    request_body = EventoUpdate,
    responses(
        (status = 200, description = "Updated", body = Evento),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<EventoUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let evento = repo(&state)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Evento not found".to_string()))?;
    Ok(Json(evento))
}

/// DELETE /api/eventos/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/eventos/{id}",
    tag = "Eventos",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let evento = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Evento not found".to_string()))?;
    Ok(Json(json!({
        "message": "Evento deleted successfully",
        "evento": evento,
    })))
}
