//! Health check, API index, OpenAPI document, and the docs page.

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use utoipa::OpenApi;

use crate::openapi::ApiDoc;
use crate::state::SharedState;

/// GET /health - Service liveness and environment
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "environment": state.config.environment,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api - Index of the endpoint groups
pub async fn api_index() -> impl IntoResponse {
    Json(json!({
        "name": "FEMETE IMPULSA API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Project management and monitoring API for the STARS 2025 innovation programme",
        "documentation": {
            "docs": "/api-docs",
            "openapi": "/api/openapi.json",
        },
        "endpoints": {
            "projects": "/api/projects",
            "objectives": "/api/objectives",
            "activities": "/api/activities",
            "beneficiaries": "/api/beneficiaries",
            "results": "/api/results",
            "kpis": "/api/kpis",
            "empresas": "/api/empresas",
            "formaciones": "/api/formaciones",
            "eventos": "/api/eventos",
            "asesoramientos": "/api/asesoramientos",
            "vistas360": "/api/vistas360",
            "kpiStars": "/api/kpi-stars",
            "export": "/api/export",
            "health": "/health",
        },
        "kpi_endpoints": {
            "dashboard": "/api/kpi-stars/dashboard",
            "powerbi": "/api/kpi-stars/powerbi",
            "historico": "/api/kpi-stars/historico",
            "detalle": "/api/kpi-stars/detalle/{codigo}",
            "breakdown": "/api/kpi-stars/breakdown/{codigo}",
            "snapshot": "/api/kpi-stars/snapshot (POST)",
        },
    }))
}

/// GET /api/openapi.json - OpenAPI document for BI connectors
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// GET /api-docs - Minimal docs page over the OpenAPI document
pub async fn docs_page() -> Html<&'static str> {
    Html(DOCS_HTML)
}

/// Fallback for anything the router does not know.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "path": uri.path(),
        })),
    )
}

const DOCS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>FEMETE IMPULSA API</title>
    <style>
        body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 56rem; color: #1f2933; }
        code, pre { background: #f3f4f6; border-radius: 4px; padding: 0.15rem 0.35rem; }
        pre { padding: 1rem; overflow-x: auto; }
        h1 { border-bottom: 2px solid #e5e7eb; padding-bottom: 0.5rem; }
    </style>
</head>
<body>
    <h1>FEMETE IMPULSA API - STARS 2025</h1>
    <p>The machine-readable contract lives at <a href="/api/openapi.json"><code>/api/openapi.json</code></a>.
       Import it into Power Apps as a custom connector, or point any OpenAPI viewer at it.</p>
    <h2>Quick start</h2>
    <pre>curl http://localhost:3000/health
curl http://localhost:3000/api/kpi-stars/dashboard
curl "http://localhost:3000/api/export/data?entity=empresas&amp;format=csv"</pre>
    <p>Endpoint groups are listed at <a href="/api"><code>/api</code></a>.</p>
</body>
</html>
"#;
