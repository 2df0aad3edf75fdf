//! Programme KPI endpoints: dashboard, history, per-code detail and
//! breakdown, daily snapshots, and the Power BI feed.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::kpi_stars::{
    DashboardKpis, HistoricoFilter, KpiBreakdown, KpiDetalle, KpiHistoricoRow, KpiStarsRepository,
    PowerBiData,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> KpiStarsRepository {
    KpiStarsRepository::new(state.db.clone())
}

/// GET /api/kpi-stars/dashboard - Active programme KPIs with a summary block
#[utoipa::path(
    get,
    path = "/api/kpi-stars/dashboard",
    tag = "KpiStars",
    responses((status = 200, description = "Programme KPI dashboard", body = DashboardKpis))
)]
pub async fn dashboard(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let dashboard = repo(&state).dashboard().await?;
    Ok(Json(dashboard))
}

/// GET /api/kpi-stars/historico - Recorded KPI history
#[utoipa::path(
    get,
    path = "/api/kpi-stars/historico",
    tag = "KpiStars",
    params(HistoricoFilter),
    responses((status = 200, description = "History rows", body = [KpiHistoricoRow]))
)]
pub async fn historico(
    State(state): State<SharedState>,
    Query(filter): Query<HistoricoFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = repo(&state).historico(&filter).await?;
    Ok(Json(rows))
}

/// GET /api/kpi-stars/detalle/{codigo} - One KPI with its recent trend
#[utoipa::path(
    get,
    path = "/api/kpi-stars/detalle/{codigo}",
    tag = "KpiStars",
    responses(
        (status = 200, description = "KPI detail", body = KpiDetalle),
        (status = 404, description = "Unknown codigo")
    )
)]
pub async fn detalle(
    State(state): State<SharedState>,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let detalle = repo(&state)
        .detalle(&codigo)
        .await?
        .ok_or_else(|| ApiError::NotFound("KPI not found".to_string()))?;
    Ok(Json(detalle))
}

/// GET /api/kpi-stars/breakdown/{codigo} - The records behind one KPI value
#[utoipa::path(
    get,
    path = "/api/kpi-stars/breakdown/{codigo}",
    tag = "KpiStars",
    responses(
        (status = 200, description = "KPI breakdown", body = KpiBreakdown),
        (status = 404, description = "Unknown codigo")
    )
)]
pub async fn breakdown(
    State(state): State<SharedState>,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let breakdown = repo(&state)
        .breakdown(&codigo)
        .await?
        .ok_or_else(|| ApiError::NotFound("KPI code not found".to_string()))?;
    Ok(Json(breakdown))
}

/// POST /api/kpi-stars/snapshot - Record a history row for every active KPI
#[utoipa::path(
    post,
    path = "/api/kpi-stars/snapshot",
    tag = "KpiStars",
    responses((status = 200, description = "Snapshot written"))
)]
pub async fn snapshot(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let kpis = repo(&state).snapshot().await?;
    tracing::info!(kpis = kpis.len(), "programme KPI snapshot recorded");
    Ok(Json(json!({
        "message": "KPI snapshot registered successfully",
        "fecha": Utc::now(),
        "kpis_registrados": kpis.len(),
        "kpis": kpis,
    })))
}

/// GET /api/kpi-stars/powerbi - Flat feed for the Power BI connector
#[utoipa::path(
    get,
    path = "/api/kpi-stars/powerbi",
    tag = "KpiStars",
    responses((status = 200, description = "Power BI feed", body = PowerBiData))
)]
pub async fn powerbi(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let data = repo(&state).powerbi().await?;
    Ok(Json(data))
}
