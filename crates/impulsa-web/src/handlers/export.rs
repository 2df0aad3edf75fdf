//! CSV/JSON export endpoints with an audit trail.
//!
//! Spreadsheet exports return JSON plus metadata; turning that into a
//! workbook is the caller's job. Audit failures never fail the export.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::IntoParams;

use impulsa_common::error::ApiError;
use impulsa_db::export::{ExportData, ExportFilter, ExportLogEntry, ExportRepository};

use crate::auth::forwarded_client;
use crate::state::SharedState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportParams {
    /// empresas, formaciones, eventos, sesiones, personas or kpis.
    pub entity: Option<String>,
    /// csv, excel or json (the default).
    pub format: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub empresa_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComprehensiveParams {
    pub empresa_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn repo(state: &SharedState) -> ExportRepository {
    ExportRepository::new(state.db.clone())
}

/// GET /api/export/data - Export one entity as csv, excel-style JSON, or JSON
#[utoipa::path(
    get,
    path = "/api/export/data",
    tag = "Export",
    params(ExportParams),
    responses(
        (status = 200, description = "Exported rows"),
        (status = 400, description = "Unknown entity")
    )
)]
pub async fn data(
    State(state): State<SharedState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let entity = params.entity.as_deref().unwrap_or_default();
    let format = params.format.as_deref().unwrap_or("json");

    let filter = ExportFilter {
        start_date: params.start_date,
        end_date: params.end_date,
        empresa_id: params.empresa_id,
    };
    let data = repo(&state)
        .fetch(entity, &filter)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid entity type".to_string()))?;

    audit(
        &state,
        &headers,
        peer,
        entity,
        format,
        data.len(),
        params.start_date,
        params.end_date,
    )
    .await;

    let response = match format {
        "csv" => {
            let body = to_csv(&data)?;
            let headers = [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={entity}_export.csv"),
                ),
            ];
            (headers, body).into_response()
        }
        "excel" => Json(json!({
            "data": data,
            "metadata": {
                "entity": entity,
                "export_date": Utc::now(),
                "total_records": data.len(),
            },
        }))
        .into_response(),
        _ => Json(data).into_response(),
    };
    Ok(response)
}

/// GET /api/export/comprehensive - One report covering empresas and their activity
#[utoipa::path(
    get,
    path = "/api/export/comprehensive",
    tag = "Export",
    params(ComprehensiveParams),
    responses((status = 200, description = "Comprehensive report"))
)]
pub async fn comprehensive(
    State(state): State<SharedState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(params): Query<ComprehensiveParams>,
) -> Result<impl IntoResponse, ApiError> {
    let report = repo(&state)
        .comprehensive(params.empresa_id, params.start_date, params.end_date)
        .await?;

    audit(
        &state,
        &headers,
        peer,
        "comprehensive",
        "json",
        report.empresas.len(),
        params.start_date,
        params.end_date,
    )
    .await;

    Ok(Json(report))
}

/// Writes the audit row and emits the request log. Audit failures are logged
/// and swallowed.
#[allow(clippy::too_many_arguments)]
async fn audit(
    state: &SharedState,
    headers: &HeaderMap,
    peer: SocketAddr,
    entity: &str,
    format: &str,
    records: usize,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) {
    let usuario = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());
    let ip = client_ip(headers, peer);

    tracing::info!(
        entity,
        format,
        records,
        usuario = usuario.as_deref().unwrap_or("anonymous"),
        ip = %ip,
        "export request"
    );

    let entry = ExportLogEntry {
        usuario,
        entidad: entity.to_string(),
        formato: format.to_string(),
        num_registros: records as i32,
        fecha_inicio: start_date,
        fecha_fin: end_date,
        ip_address: Some(ip),
    };
    if let Err(err) = repo(state).log(&entry).await {
        tracing::warn!(error = %err, "export audit write failed");
    }
}

fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(forwarded_client)
        .unwrap_or_else(|| peer.ip().to_string())
}

/// Serializes one export payload to CSV. Headers come from the field names;
/// an empty result set produces an empty body.
fn to_csv(data: &ExportData) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    match data {
        ExportData::Empresas(rows) => write_rows(&mut writer, rows)?,
        ExportData::Formaciones(rows) => write_rows(&mut writer, rows)?,
        ExportData::Eventos(rows) => write_rows(&mut writer, rows)?,
        ExportData::Sesiones(rows) => write_rows(&mut writer, rows)?,
        ExportData::Personas(rows) => write_rows(&mut writer, rows)?,
        ExportData::Kpis(rows) => write_rows(&mut writer, rows)?,
    }
    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

fn write_rows<T: Serialize>(writer: &mut csv::Writer<Vec<u8>>, rows: &[T]) -> anyhow::Result<()> {
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use impulsa_db::kpi_stars::KpiActual;

    fn kpi(codigo: &str, valor: f64) -> KpiActual {
        KpiActual {
            id: 1,
            codigo: codigo.to_string(),
            nombre: "Empresas asesoradas".to_string(),
            descripcion: None,
            valor_objetivo: 50.0,
            valor_actual: valor,
            unidad: Some("empresas".to_string()),
            porcentaje_cumplimiento: valor * 2.0,
            estado: "En Progreso".to_string(),
            orden_visualizacion: 1,
        }
    }

    #[test]
    fn csv_includes_header_and_rows() {
        let data = ExportData::Kpis(vec![kpi("KPI-EMP-001", 12.0), kpi("KPI-EMP-002", 3.0)]);
        let csv = to_csv(&data).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("id,codigo,nombre"));
        assert_eq!(lines.count(), 2);
        assert!(csv.contains("KPI-EMP-001"));
    }

    #[test]
    fn csv_of_nothing_is_empty() {
        let data = ExportData::Kpis(Vec::new());
        assert_eq!(to_csv(&data).unwrap(), "");
    }

    #[test]
    fn client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        let peer: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        assert_eq!(client_ip(&headers, peer), "203.0.113.9");
        assert_eq!(client_ip(&HeaderMap::new(), peer), "127.0.0.1");
    }
}
