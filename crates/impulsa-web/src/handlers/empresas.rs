//! Empresa CRUD plus the per-company stats listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::empresas::{
    Empresa, EmpresaFilter, EmpresaRepository, EmpresaStats, EmpresaUpdate, NewEmpresa,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> EmpresaRepository {
    EmpresaRepository::new(state.db.clone())
}

/// GET /api/empresas - List empresas
#[utoipa::path(
    get,
    path = "/api/empresas",
    tag = "Empresas",
    params(EmpresaFilter),
    responses((status = 200, description = "Empresa list", body = [Empresa]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<EmpresaFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let empresas = repo(&state).list(&filter).await?;
    Ok(Json(empresas))
}

/// GET /api/empresas/stats - Every empresa with contact/session/plan counts
#[utoipa::path(
    get,
    path = "/api/empresas/stats",
    tag = "Empresas",
    responses((status = 200, description = "Empresas with counts", body = [EmpresaStats]))
)]
pub async fn stats(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let empresas = repo(&state).list_with_stats().await?;
    Ok(Json(empresas))
}

/// GET /api/empresas/{id} - One empresa
#[utoipa::path(
    get,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    responses(
        (status = 200, description = "Empresa", body = Empresa),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let empresa = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Empresa not found".to_string()))?;
    Ok(Json(empresa))
}

/// POST /api/empresas - Register an empresa
#[utoipa::path(
    post,
    path = "/api/empresas",
    tag = "Empresas",
    request_body = NewEmpresa,
    responses(
        (status = 201, description = "Created", body = Empresa),
        (status = 400, description = "Duplicate CIF")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewEmpresa>,
) -> Result<impl IntoResponse, ApiError> {
    let empresa = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "CIF already exists"))?;
    Ok((StatusCode::CREATED, Json(empresa)))
}

/// PUT /api/empresas/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    request_body = EmpresaUpdate,
    responses(
        (status = 200, description = "Updated", body = Empresa),
        (status = 400, description = "Duplicate CIF"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<EmpresaUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let empresa = repo(&state)
        .update(id, &update)
        .await
        .map_err(|err| ApiError::from_db_write(err, "CIF already exists"))?
        .ok_or_else(|| ApiError::NotFound("Empresa not found".to_string()))?;
    Ok(Json(empresa))
}

/// DELETE /api/empresas/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let empresa = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Empresa not found".to_string()))?;
    Ok(Json(json!({
        "message": "Empresa deleted successfully",
        "empresa": empresa,
    })))
}
