//! Axum router — maps all URL paths to handlers.
//!
//! Everything under `/api` sits behind the API-key and rate-limit gate;
//! `/health`, `/api-docs` and the static dashboard stay open.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use axum::http::{header, HeaderName, Method};

use impulsa_config::CorsConfig;

use crate::auth;
use crate::handlers::{
    activities, beneficiaries, empresas, eventos, export, formaciones, kpi_stars, kpis,
    objectives, projects, results, sesiones, system, vistas360,
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);
    let cors = cors_layer(&shared.config.cors);
    let static_dir = shared.config.server.static_dir.clone();

    let api = Router::new()
        .route("/api", get(system::api_index))
        .route("/api/openapi.json", get(system::openapi_json))
        // Projects
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/{id}",
            get(projects::detail).put(projects::update).delete(projects::remove),
        )
        // Objectives
        .route("/api/objectives", get(objectives::list).post(objectives::create))
        .route(
            "/api/objectives/{id}",
            get(objectives::detail).put(objectives::update).delete(objectives::remove),
        )
        // Activities
        .route("/api/activities", get(activities::list).post(activities::create))
        .route(
            "/api/activities/{id}",
            get(activities::detail).put(activities::update).delete(activities::remove),
        )
        // Beneficiaries
        .route("/api/beneficiaries", get(beneficiaries::list).post(beneficiaries::create))
        .route(
            "/api/beneficiaries/{id}",
            get(beneficiaries::detail)
                .put(beneficiaries::update)
                .delete(beneficiaries::remove),
        )
        // Results
        .route("/api/results", get(results::list).post(results::create))
        .route(
            "/api/results/{id}",
            get(results::detail).put(results::update).delete(results::remove),
        )
        // Project KPIs
        .route("/api/kpis", get(kpis::list).post(kpis::create))
        .route("/api/kpis/dashboard", get(kpis::dashboard))
        .route(
            "/api/kpis/{id}",
            get(kpis::detail).put(kpis::update).delete(kpis::remove),
        )
        // Empresas
        .route("/api/empresas", get(empresas::list).post(empresas::create))
        .route("/api/empresas/stats", get(empresas::stats))
        .route(
            "/api/empresas/{id}",
            get(empresas::detail).put(empresas::update).delete(empresas::remove),
        )
        // Formaciones
        .route("/api/formaciones", get(formaciones::list).post(formaciones::create))
        .route(
            "/api/formaciones/{id}",
            get(formaciones::detail)
                .put(formaciones::update)
                .delete(formaciones::remove),
        )
        .route("/api/formaciones/{id}/asistentes", get(formaciones::asistentes))
        // Eventos
        .route("/api/eventos", get(eventos::list).post(eventos::create))
        .route(
            "/api/eventos/{id}",
            get(eventos::detail).put(eventos::update).delete(eventos::remove),
        )
        .route("/api/eventos/{id}/asistentes", get(eventos::asistentes))
        // Sesiones de asesoramiento
        .route("/api/asesoramientos", get(sesiones::list).post(sesiones::create))
        .route(
            "/api/asesoramientos/{id}",
            get(sesiones::detail).put(sesiones::update).delete(sesiones::remove),
        )
        // Vistas 360
        .route("/api/vistas360/personas", get(vistas360::personas))
        .route("/api/vistas360/personas/{id}", get(vistas360::persona))
        .route("/api/vistas360/personas/{id}/relaciones", get(vistas360::persona_relaciones))
        .route("/api/vistas360/empresas", get(vistas360::empresas))
        .route("/api/vistas360/empresas/{id}", get(vistas360::empresa))
        .route("/api/vistas360/empresas/{id}/relaciones", get(vistas360::empresa_relaciones))
        .route("/api/vistas360/formaciones", get(vistas360::formaciones))
        .route("/api/vistas360/formaciones/{id}", get(vistas360::formacion))
        .route("/api/vistas360/eventos", get(vistas360::eventos))
        .route("/api/vistas360/eventos/{id}", get(vistas360::evento))
        .route("/api/vistas360/timeline", get(vistas360::timeline))
        .route("/api/vistas360/estadisticas", get(vistas360::estadisticas))
        // Programme KPIs
        .route("/api/kpi-stars/dashboard", get(kpi_stars::dashboard))
        .route("/api/kpi-stars/historico", get(kpi_stars::historico))
        .route("/api/kpi-stars/detalle/{codigo}", get(kpi_stars::detalle))
        .route("/api/kpi-stars/breakdown/{codigo}", get(kpi_stars::breakdown))
        .route("/api/kpi-stars/snapshot", post(kpi_stars::snapshot))
        .route("/api/kpi-stars/powerbi", get(kpi_stars::powerbi))
        // Export
        .route("/api/export/data", get(export::data))
        .route("/api/export/comprehensive", get(export::comprehensive))
        .route_layer(middleware::from_fn_with_state(shared.clone(), auth::api_gate));

    Router::new()
        .route("/health", get(system::health))
        .route("/api-docs", get(system::docs_page))
        .merge(api)
        // Static dashboard
        .route_service("/", ServeFile::new(format!("{static_dir}/index.html")))
        .nest_service("/static", ServeDir::new(&static_dir))
        .fallback(system::not_found)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .with_state(shared)
}

/// CORS policy from config. No configured origins means permissive, which is
/// what Power Apps and Power BI embeds expect out of the box.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let patterns = config.allowed_origins.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin
                .to_str()
                .map(|value| origin_allowed(&patterns, value))
                .unwrap_or(false)
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-user-id"),
        ])
}

/// Exact origins match in full; `*.domain` patterns match any subdomain of
/// `domain` but not the apex.
fn origin_allowed(patterns: &[String], origin: &str) -> bool {
    let host = origin
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(origin)
        .split(':')
        .next()
        .unwrap_or_default();
    patterns.iter().any(|pattern| match pattern.strip_prefix("*.") {
        Some(domain) => host
            .strip_suffix(domain)
            .is_some_and(|lead| lead.ends_with('.')),
        None => origin == pattern,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_origin_must_match_in_full() {
        let allowed = patterns(&["https://apps.femete.es"]);
        assert!(origin_allowed(&allowed, "https://apps.femete.es"));
        assert!(!origin_allowed(&allowed, "http://apps.femete.es"));
        assert!(!origin_allowed(&allowed, "https://apps.femete.es.evil.com"));
    }

    #[test]
    fn wildcard_matches_subdomains_only() {
        let allowed = patterns(&["*.powerapps.com"]);
        assert!(origin_allowed(&allowed, "https://make.powerapps.com"));
        assert!(origin_allowed(&allowed, "https://eu.make.powerapps.com:443"));
        assert!(!origin_allowed(&allowed, "https://powerapps.com"));
        assert!(!origin_allowed(&allowed, "https://notpowerapps.com"));
    }

    #[test]
    fn empty_pattern_list_allows_nothing() {
        assert!(!origin_allowed(&[], "https://apps.femete.es"));
    }
}
