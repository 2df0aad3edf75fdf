//! Generic programme schema: KPI CRUD plus the progress dashboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::kpis::{
    Kpi, KpiDashboardFilter, KpiFilter, KpiProgress, KpiRepository, KpiUpdate, NewKpi,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> KpiRepository {
    KpiRepository::new(state.db.clone())
}

/// GET /api/kpis - List KPIs
#[utoipa::path(
    get,
    path = "/api/kpis",
    tag = "Kpis",
    params(KpiFilter),
    responses((status = 200, description = "KPI list", body = [Kpi]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<KpiFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let kpis = repo(&state).list(&filter).await?;
    Ok(Json(kpis))
}

/// GET /api/kpis/dashboard - KPIs with computed progress percentage
#[utoipa::path(
    get,
    path = "/api/kpis/dashboard",
    tag = "Kpis",
    params(KpiDashboardFilter),
    responses((status = 200, description = "KPIs with progress", body = [KpiProgress]))
)]
pub async fn dashboard(
    State(state): State<SharedState>,
    Query(filter): Query<KpiDashboardFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let kpis = repo(&state).dashboard(&filter).await?;
    Ok(Json(kpis))
}

/// GET /api/kpis/{id} - One KPI
#[utoipa::path(
    get,
    path = "/api/kpis/{id}",
    tag = "Kpis",
    responses(
        (status = 200, description = "KPI", body = Kpi),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let kpi = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("KPI not found".to_string()))?;
    Ok(Json(kpi))
}

/// POST /api/kpis - Create a KPI
#[utoipa::path(
    post,
    path = "/api/kpis",
    tag = "Kpis",
    request_body = NewKpi,
    responses(
        (status = 201, description = "Created", body = Kpi),
        (status = 400, description = "Unknown project")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewKpi>,
) -> Result<impl IntoResponse, ApiError> {
    let kpi = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "KPI already exists"))?;
    Ok((StatusCode::CREATED, Json(kpi)))
}

/// PUT /api/kpis/{id} - Partial update; changing current_value stamps last_updated
#[utoipa::path(
    put,
    path = "/api/kpis/{id}",
    tag = "Kpis",
    request_body = KpiUpdate,
    responses(
        (status = 200, description = "Updated", body = Kpi),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<KpiUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let kpi = repo(&state)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("KPI not found".to_string()))?;
    Ok(Json(kpi))
}

/// DELETE /api/kpis/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/kpis/{id}",
    tag = "Kpis",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let kpi = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("KPI not found".to_string()))?;
    Ok(Json(json!({
        "message": "KPI deleted successfully",
        "kpi": kpi,
    })))
}
