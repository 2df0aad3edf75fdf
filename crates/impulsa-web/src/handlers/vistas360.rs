//! 360º read models: persona/empresa/formación/evento aggregates, the
//! activity timeline, and global statistics.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use impulsa_common::error::ApiError;
use impulsa_db::vistas::{
    Empresa360Filter, EmpresaRelaciones, Paginacion, Persona360Filter, PersonaRelaciones,
    TimelineActividad, TimelineFilter, Vista360Repository, VistaEmpresa360, VistaEstadisticas,
    VistaEvento360, VistaFormacion360, VistaPersona360,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> Vista360Repository {
    Vista360Repository::new(state.db.clone())
}

#[derive(Serialize)]
struct PersonaConRelaciones {
    persona: VistaPersona360,
    #[serde(flatten)]
    relaciones: PersonaRelaciones,
}

#[derive(Serialize)]
struct EmpresaConRelaciones {
    empresa: VistaEmpresa360,
    #[serde(flatten)]
    relaciones: EmpresaRelaciones,
}

/// GET /api/vistas360/personas - Personas with company link and activity counts
#[utoipa::path(
    get,
    path = "/api/vistas360/personas",
    tag = "Vistas360",
    params(Persona360Filter),
    responses((status = 200, description = "Persona aggregates", body = [VistaPersona360]))
)]
pub async fn personas(
    State(state): State<SharedState>,
    Query(filter): Query<Persona360Filter>,
) -> Result<impl IntoResponse, ApiError> {
    let personas = repo(&state).personas(&filter).await?;
    Ok(Json(personas))
}

/// GET /api/vistas360/personas/{id} - One persona aggregate
#[utoipa::path(
    get,
    path = "/api/vistas360/personas/{id}",
    tag = "Vistas360",
    responses(
        (status = 200, description = "Persona aggregate", body = VistaPersona360),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn persona(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let persona = repo(&state)
        .persona(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Persona no encontrada".to_string()))?;
    Ok(Json(persona))
}

/// GET /api/vistas360/personas/{id}/relaciones - Persona with every related record
#[utoipa::path(
    get,
    path = "/api/vistas360/personas/{id}/relaciones",
    tag = "Vistas360",
    responses(
        (status = 200, description = "Persona with relations"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn persona_relaciones(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let vistas = repo(&state);
    let persona = vistas
        .persona(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Persona no encontrada".to_string()))?;
    let relaciones = vistas.persona_relaciones(id).await?;
    Ok(Json(PersonaConRelaciones {
        persona,
        relaciones,
    }))
}

/// GET /api/vistas360/empresas - Empresas with counts and activity level
#[utoipa::path(
    get,
    path = "/api/vistas360/empresas",
    tag = "Vistas360",
    params(Empresa360Filter),
    responses((status = 200, description = "Empresa aggregates", body = [VistaEmpresa360]))
)]
pub async fn empresas(
    State(state): State<SharedState>,
    Query(filter): Query<Empresa360Filter>,
) -> Result<impl IntoResponse, ApiError> {
    let empresas = repo(&state).empresas(&filter).await?;
    Ok(Json(empresas))
}

/// GET /api/vistas360/empresas/{id} - One empresa aggregate
#[utoipa::path(
    get,
    path = "/api/vistas360/empresas/{id}",
    tag = "Vistas360",
    responses(
        (status = 200, description = "Empresa aggregate", body = VistaEmpresa360),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn empresa(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let empresa = repo(&state)
        .empresa(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Empresa no encontrada".to_string()))?;
    Ok(Json(empresa))
}

/// GET /api/vistas360/empresas/{id}/relaciones - Empresa with every related record
#[utoipa::path(
    get,
    path = "/api/vistas360/empresas/{id}/relaciones",
    tag = "Vistas360",
    responses(
        (status = 200, description = "Empresa with relations"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn empresa_relaciones(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let vistas = repo(&state);
    let empresa = vistas
        .empresa(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Empresa no encontrada".to_string()))?;
    let relaciones = vistas.empresa_relaciones(id).await?;
    Ok(Json(EmpresaConRelaciones {
        empresa,
        relaciones,
    }))
}

/// GET /api/vistas360/formaciones - Formaciones with attendance aggregates
#[utoipa::path(
    get,
    path = "/api/vistas360/formaciones",
    tag = "Vistas360",
    params(Paginacion),
    responses((status = 200, description = "Formación aggregates", body = [VistaFormacion360]))
)]
pub async fn formaciones(
    State(state): State<SharedState>,
    Query(pag): Query<Paginacion>,
) -> Result<impl IntoResponse, ApiError> {
    let formaciones = repo(&state).formaciones(&pag).await?;
    Ok(Json(formaciones))
}

/// GET /api/vistas360/formaciones/{id} - One formación aggregate
#[utoipa::path(
    get,
    path = "/api/vistas360/formaciones/{id}",
    tag = "Vistas360",
    responses(
        (status = 200, description = "Formación aggregate", body = VistaFormacion360),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn formacion(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let formacion = repo(&state)
        .formacion(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Formación no encontrada".to_string()))?;
    Ok(Json(formacion))
}

/// GET /api/vistas360/eventos - Eventos with attendance aggregates
#[utoipa::path(
    get,
    path = "/api/vistas360/eventos",
    tag = "Vistas360",
    params(Paginacion),
    responses((status = 200, description = "Evento aggregates", body = [VistaEvento360]))
)]
pub async fn eventos(
    State(state): State<SharedState>,
    Query(pag): Query<Paginacion>,
) -> Result<impl IntoResponse, ApiError> {
    let eventos = repo(&state).eventos(&pag).await?;
    Ok(Json(eventos))
}

/// GET /api/vistas360/eventos/{id} - One evento aggregate
#[utoipa::path(
    get,
    path = "/api/vistas360/eventos/{id}",
    tag = "Vistas360",
    responses(
        (status = 200, description = "Evento aggregate", body = VistaEvento360),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn evento(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let evento = repo(&state)
        .evento(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Evento no encontrado".to_string()))?;
    Ok(Json(evento))
}

/// GET /api/vistas360/timeline - Recent activity across every entity
#[utoipa::path(
    get,
    path = "/api/vistas360/timeline",
    tag = "Vistas360",
    params(TimelineFilter),
    responses((status = 200, description = "Activity timeline", body = [TimelineActividad]))
)]
pub async fn timeline(
    State(state): State<SharedState>,
    Query(filter): Query<TimelineFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let actividades = repo(&state).timeline(&filter).await?;
    Ok(Json(actividades))
}

/// GET /api/vistas360/estadisticas - Global table totals
#[utoipa::path(
    get,
    path = "/api/vistas360/estadisticas",
    tag = "Vistas360",
    responses((status = 200, description = "Global totals", body = VistaEstadisticas))
)]
pub async fn estadisticas(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let estadisticas = repo(&state).estadisticas().await?;
    Ok(Json(estadisticas))
}
