//! Data export queries and the export audit log.
//!
//! Serialization to CSV happens at the HTTP layer; this module only selects
//! the rows and keeps each entity fully typed so the column order of an
//! export never depends on runtime data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

use crate::empresas::Empresa;
use crate::eventos::Evento;
use crate::formaciones::Formacion;
use crate::kpi_stars::{KpiActual, KpiStarsRepository};
use crate::sesiones::SesionAsesoramiento;
use crate::vistas::Persona;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub empresa_id: Option<i32>,
}

/// Rows of one exportable entity.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ExportData {
    Empresas(Vec<Empresa>),
    Formaciones(Vec<Formacion>),
    Eventos(Vec<Evento>),
    Sesiones(Vec<SesionAsesoramiento>),
    Personas(Vec<Persona>),
    Kpis(Vec<KpiActual>),
}

impl ExportData {
    pub fn len(&self) -> usize {
        match self {
            ExportData::Empresas(rows) => rows.len(),
            ExportData::Formaciones(rows) => rows.len(),
            ExportData::Eventos(rows) => rows.len(),
            ExportData::Sesiones(rows) => rows.len(),
            ExportData::Personas(rows) => rows.len(),
            ExportData::Kpis(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Periodo {
    /// ISO date, or `N/A` when the report was not bounded.
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResumenComprehensive {
    pub total_empresas: i64,
    pub total_formaciones: i64,
    pub total_eventos: i64,
    pub total_sesiones: i64,
}

/// Everything about one company (or all of them) in a single payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComprehensiveReport {
    pub generated_at: DateTime<Utc>,
    pub period: Periodo,
    pub empresas: Vec<Empresa>,
    pub formaciones: Vec<Formacion>,
    pub eventos: Vec<Evento>,
    pub sesiones_asesoramiento: Vec<SesionAsesoramiento>,
    pub summary: ResumenComprehensive,
}

/// One line of the export audit trail.
#[derive(Debug)]
pub struct ExportLogEntry {
    pub usuario: Option<String>,
    pub entidad: String,
    pub formato: String,
    pub num_registros: i32,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub ip_address: Option<String>,
}

#[derive(Clone)]
pub struct ExportRepository {
    pool: PgPool,
    kpi_stars: KpiStarsRepository,
}

impl ExportRepository {
    pub fn new(pool: PgPool) -> Self {
        let kpi_stars = KpiStarsRepository::new(pool.clone());
        Self { pool, kpi_stars }
    }

    /// Rows for one entity. `None` means the entity name is unknown.
    pub async fn fetch(&self, entity: &str, filter: &ExportFilter) -> Result<Option<ExportData>, sqlx::Error> {
        let data = match entity {
            "empresas" => {
                let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM empresas WHERE 1=1");
                if let Some(start) = filter.start_date {
                    qb.push(" AND fecha_alta >= ").push_bind(start);
                }
                ExportData::Empresas(qb.build_query_as::<Empresa>().fetch_all(&self.pool).await?)
            }
            "formaciones" => {
                let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM formaciones WHERE 1=1");
                if let Some(start) = filter.start_date {
                    qb.push(" AND fecha_inicio >= ").push_bind(start);
                }
                if let Some(end) = filter.end_date {
                    qb.push(" AND fecha_fin <= ").push_bind(end);
                }
                ExportData::Formaciones(qb.build_query_as::<Formacion>().fetch_all(&self.pool).await?)
            }
            "eventos" => {
                let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM eventos WHERE 1=1");
                if let Some(start) = filter.start_date {
                    qb.push(" AND fecha_inicio >= ").push_bind(start);
                }
                if let Some(end) = filter.end_date {
                    qb.push(" AND fecha_fin <= ").push_bind(end);
                }
                ExportData::Eventos(qb.build_query_as::<Evento>().fetch_all(&self.pool).await?)
            }
            "sesiones" => {
                let mut qb =
                    QueryBuilder::<Postgres>::new("SELECT * FROM sesiones_asesoramiento WHERE 1=1");
                if let Some(empresa_id) = filter.empresa_id {
                    qb.push(" AND empresa_id = ").push_bind(empresa_id);
                }
                if let Some(start) = filter.start_date {
                    qb.push(" AND fecha_sesion >= ").push_bind(start);
                }
                ExportData::Sesiones(
                    qb.build_query_as::<SesionAsesoramiento>().fetch_all(&self.pool).await?,
                )
            }
            "personas" => {
                let rows = sqlx::query_as::<_, Persona>("SELECT * FROM personas")
                    .fetch_all(&self.pool)
                    .await?;
                ExportData::Personas(rows)
            }
            "kpis" => ExportData::Kpis(self.kpi_stars.actuales().await?),
            _ => return Ok(None),
        };
        Ok(Some(data))
    }

    pub async fn comprehensive(
        &self,
        empresa_id: Option<i32>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<ComprehensiveReport, sqlx::Error> {
        let empresas = match empresa_id {
            Some(id) => {
                sqlx::query_as::<_, Empresa>("SELECT * FROM empresas WHERE id = $1")
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Empresa>("SELECT * FROM empresas")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        let empresa_ids: Vec<i32> = empresas.iter().map(|e| e.id).collect();

        let (formaciones, eventos, sesiones) = tokio::try_join!(
            sqlx::query_as::<_, Formacion>("SELECT * FROM formaciones").fetch_all(&self.pool),
            sqlx::query_as::<_, Evento>("SELECT * FROM eventos").fetch_all(&self.pool),
            sqlx::query_as::<_, SesionAsesoramiento>(
                "SELECT * FROM sesiones_asesoramiento WHERE empresa_id = ANY($1)",
            )
            .bind(&empresa_ids)
            .fetch_all(&self.pool),
        )?;

        Ok(ComprehensiveReport {
            generated_at: Utc::now(),
            period: Periodo {
                start_date: start_date.map_or_else(|| "N/A".to_owned(), |d| d.to_string()),
                end_date: end_date.map_or_else(|| "N/A".to_owned(), |d| d.to_string()),
            },
            summary: ResumenComprehensive {
                total_empresas: empresas.len() as i64,
                total_formaciones: formaciones.len() as i64,
                total_eventos: eventos.len() as i64,
                total_sesiones: sesiones.len() as i64,
            },
            empresas,
            formaciones,
            eventos,
            sesiones_asesoramiento: sesiones,
        })
    }

    /// Audit trail entry; failures here must not break the export itself, so
    /// callers log and continue on error.
    pub async fn log(&self, entry: &ExportLogEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO log_exportaciones
                (usuario, entidad, formato, num_registros, fecha_inicio, fecha_fin, ip_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&entry.usuario)
        .bind(&entry.entidad)
        .bind(&entry.formato)
        .bind(entry.num_registros)
        .bind(entry.fecha_inicio)
        .bind(entry.fecha_fin)
        .bind(&entry.ip_address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
