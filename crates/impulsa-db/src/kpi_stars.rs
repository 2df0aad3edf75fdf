//! STARS 2025 programme indicators.
//!
//! Each indicator has a fixed code (`KPI-MAT-001`, `KPI-ENT-001`, ...) whose
//! current value is counted live from the operational tables. Snapshots copy
//! the live values into `kpi_historico` so trends survive data edits.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

pub const PROGRAMA: &str = "STARS 2025";
const POWERBI_PROGRAMA: &str = "FEMETE IMPULSA - STARS 2025";
const POWERBI_VERSION: &str = "1.0";

// ── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct KpiConfiguracion {
    pub id: i32,
    pub codigo: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub valor_objetivo: f64,
    pub unidad: Option<String>,
    pub orden_visualizacion: i32,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A configured indicator together with its live value and state.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KpiActual {
    pub id: i32,
    pub codigo: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub valor_objetivo: f64,
    pub valor_actual: f64,
    pub unidad: Option<String>,
    pub porcentaje_cumplimiento: f64,
    /// `Cumplido`, `En Progreso` or `Pendiente`.
    pub estado: String,
    pub orden_visualizacion: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResumenKpis {
    pub total_kpis: i64,
    pub kpis_cumplidos: i64,
    pub kpis_en_progreso: i64,
    pub kpis_pendientes: i64,
    pub porcentaje_cumplimiento_global: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardKpis {
    pub programa: String,
    pub fecha_actualizacion: DateTime<Utc>,
    pub kpis: Vec<KpiActual>,
    pub resumen: ResumenKpis,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct KpiHistoricoRow {
    pub id: i32,
    pub kpi_configuracion_id: i32,
    pub valor: f64,
    pub porcentaje_cumplimiento: f64,
    pub fecha_registro: DateTime<Utc>,
    pub codigo: String,
    pub nombre: String,
    pub valor_objetivo: f64,
    pub unidad: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct TendenciaPunto {
    pub valor: f64,
    pub porcentaje_cumplimiento: f64,
    pub fecha_registro: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KpiDetalle {
    pub kpi: KpiActual,
    pub tendencia: Vec<TendenciaPunto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PowerBiMetadata {
    pub programa: String,
    pub fecha_generacion: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EstadisticasGlobales {
    pub total_empresas: i64,
    pub total_formaciones: i64,
    pub total_eventos: i64,
    pub total_asesoramientos: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct ActividadReciente {
    /// `formacion`, `evento` or `asesoramiento`.
    pub tipo: String,
    pub nombre: String,
    pub fecha: NaiveDate,
}

/// Flat payload for the Power BI connector.
#[derive(Debug, Serialize, ToSchema)]
pub struct PowerBiData {
    pub metadata: PowerBiMetadata,
    pub kpis: Vec<KpiActual>,
    pub estadisticas_globales: EstadisticasGlobales,
    pub actividad_reciente: Vec<ActividadReciente>,
}

// ── Breakdown rows, one shape per indicator ─────────────────────────────────

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct MaterialApoyo {
    pub titulo: String,
    pub categoria: Option<String>,
    pub formato: Option<String>,
    pub fecha_publicacion: Option<NaiveDate>,
    pub descargas: i32,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EntidadContactada {
    pub nombre: String,
    pub tipo: Option<String>,
    pub fecha_colaboracion: Option<NaiveDate>,
    pub activo: bool,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmpresaAsesorada {
    pub razon_social: String,
    pub sector: Option<String>,
    pub num_sesiones: i64,
    pub ultima_sesion: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct InformeEmitido {
    pub titulo: String,
    pub fecha_generacion: DateTime<Utc>,
    pub tipo: String,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct PildoraImpartida {
    pub titulo: String,
    pub fecha_inicio: Option<NaiveDate>,
    pub duracion_horas: Option<f64>,
    pub tipo: Option<String>,
    pub num_asistentes: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EventoCelebrado {
    pub titulo: String,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub modalidad: Option<String>,
    pub estado: String,
    pub aforo_actual: i32,
    pub capacidad_maxima: Option<i32>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct ImpactoDifusion {
    pub titulo: String,
    pub fecha_publicacion: Option<NaiveDate>,
    pub alcance: Option<i32>,
    pub impresiones: Option<i32>,
    pub interacciones: Option<i32>,
    pub canal: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum BreakdownItems {
    Materiales(Vec<MaterialApoyo>),
    Entidades(Vec<EntidadContactada>),
    Empresas(Vec<EmpresaAsesorada>),
    Informes(Vec<InformeEmitido>),
    Pildoras(Vec<PildoraImpartida>),
    Eventos(Vec<EventoCelebrado>),
    Impactos(Vec<ImpactoDifusion>),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KpiBreakdown {
    pub codigo: String,
    pub items: BreakdownItems,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoricoFilter {
    pub kpi_id: Option<i32>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
}

// ── Pure helpers ────────────────────────────────────────────────────────────

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn porcentaje_cumplimiento(valor: f64, objetivo: f64) -> f64 {
    if objetivo > 0.0 {
        round2(valor / objetivo * 100.0)
    } else {
        0.0
    }
}

fn estado_kpi(valor: f64, objetivo: f64) -> &'static str {
    if objetivo > 0.0 && valor >= objetivo {
        "Cumplido"
    } else if valor > 0.0 {
        "En Progreso"
    } else {
        "Pendiente"
    }
}

fn resumen_de(kpis: &[KpiActual]) -> ResumenKpis {
    let cumplidos = kpis.iter().filter(|k| k.estado == "Cumplido").count() as i64;
    let en_progreso = kpis.iter().filter(|k| k.estado == "En Progreso").count() as i64;
    let pendientes = kpis.iter().filter(|k| k.estado == "Pendiente").count() as i64;
    let global = if kpis.is_empty() {
        0.0
    } else {
        round2(kpis.iter().map(|k| k.porcentaje_cumplimiento).sum::<f64>() / kpis.len() as f64)
    };
    ResumenKpis {
        total_kpis: kpis.len() as i64,
        kpis_cumplidos: cumplidos,
        kpis_en_progreso: en_progreso,
        kpis_pendientes: pendientes,
        porcentaje_cumplimiento_global: global,
    }
}

// ── Repository ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct KpiStarsRepository {
    pool: PgPool,
}

impl KpiStarsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current value of one indicator, counted from the operational tables.
    /// Unknown codes count as zero.
    async fn valor_actual(&self, codigo: &str) -> Result<i64, sqlx::Error> {
        let query = match codigo {
            "KPI-MAT-001" => "SELECT COUNT(*) FROM materiales WHERE categoria ILIKE '%apoyo%'",
            "KPI-ENT-001" => "SELECT COUNT(*) FROM entidades_colaboradoras WHERE activo",
            "KPI-EMP-001" => "SELECT COUNT(DISTINCT empresa_id) FROM sesiones_asesoramiento",
            "KPI-INF-001" => {
                "SELECT COUNT(*) FROM informes i \
                 JOIN catalogo_tipo ct ON i.tipo_id = ct.id \
                 WHERE ct.nombre ILIKE '%individualizado%' OR ct.nombre ILIKE '%empresa emergente%'"
            }
            "KPI-FOR-001" => {
                "SELECT COUNT(*) FROM formaciones f \
                 LEFT JOIN catalogo_tipo ct ON f.tipo_id = ct.id \
                 WHERE ct.nombre ILIKE '%píldora%' OR f.titulo ILIKE '%píldora%'"
            }
            "KPI-EVE-001" => {
                "SELECT COUNT(*) FROM eventos e \
                 JOIN catalogo_estado ce ON e.estado_id = ce.id \
                 WHERE ce.nombre IN ('Completado', 'Activo')"
            }
            "KPI-DIF-001" => "SELECT COUNT(*) FROM difusion_impactos",
            _ => return Ok(0),
        };
        sqlx::query_scalar::<_, i64>(query).fetch_one(&self.pool).await
    }

    /// Every active indicator with its live value, in display order.
    pub async fn actuales(&self) -> Result<Vec<KpiActual>, sqlx::Error> {
        let configs = sqlx::query_as::<_, KpiConfiguracion>(
            "SELECT * FROM kpi_configuracion WHERE activo ORDER BY orden_visualizacion",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut kpis = Vec::with_capacity(configs.len());
        for config in configs {
            let valor = self.valor_actual(&config.codigo).await? as f64;
            kpis.push(self.con_valor(config, valor));
        }
        Ok(kpis)
    }

    fn con_valor(&self, config: KpiConfiguracion, valor: f64) -> KpiActual {
        KpiActual {
            porcentaje_cumplimiento: porcentaje_cumplimiento(valor, config.valor_objetivo),
            estado: estado_kpi(valor, config.valor_objetivo).to_owned(),
            id: config.id,
            codigo: config.codigo,
            nombre: config.nombre,
            descripcion: config.descripcion,
            valor_objetivo: config.valor_objetivo,
            valor_actual: valor,
            unidad: config.unidad,
            orden_visualizacion: config.orden_visualizacion,
        }
    }

    pub async fn dashboard(&self) -> Result<DashboardKpis, sqlx::Error> {
        let kpis = self.actuales().await?;
        let resumen = resumen_de(&kpis);
        Ok(DashboardKpis {
            programa: PROGRAMA.to_owned(),
            fecha_actualizacion: Utc::now(),
            kpis,
            resumen,
        })
    }

    pub async fn historico(&self, filter: &HistoricoFilter) -> Result<Vec<KpiHistoricoRow>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT h.*,
                   k.codigo,
                   k.nombre,
                   k.valor_objetivo,
                   k.unidad
            FROM kpi_historico h
            JOIN kpi_configuracion k ON h.kpi_configuracion_id = k.id
            WHERE 1=1
            "#,
        );
        if let Some(kpi_id) = filter.kpi_id {
            qb.push(" AND h.kpi_configuracion_id = ").push_bind(kpi_id);
        }
        if let Some(inicio) = filter.fecha_inicio {
            qb.push(" AND h.fecha_registro >= ").push_bind(inicio);
        }
        if let Some(fin) = filter.fecha_fin {
            qb.push(" AND h.fecha_registro <= ").push_bind(fin);
        }
        qb.push(" ORDER BY h.fecha_registro DESC, k.orden_visualizacion");
        qb.build_query_as::<KpiHistoricoRow>().fetch_all(&self.pool).await
    }

    /// One indicator with its last 30 recorded points.
    pub async fn detalle(&self, codigo: &str) -> Result<Option<KpiDetalle>, sqlx::Error> {
        let config = sqlx::query_as::<_, KpiConfiguracion>(
            "SELECT * FROM kpi_configuracion WHERE activo AND codigo = $1",
        )
        .bind(codigo)
        .fetch_optional(&self.pool)
        .await?;
        let Some(config) = config else {
            return Ok(None);
        };

        let valor = self.valor_actual(&config.codigo).await? as f64;
        let kpi = self.con_valor(config, valor);

        let tendencia = sqlx::query_as::<_, TendenciaPunto>(
            r#"
            SELECT h.valor, h.porcentaje_cumplimiento, h.fecha_registro
            FROM kpi_historico h
            JOIN kpi_configuracion k ON h.kpi_configuracion_id = k.id
            WHERE k.codigo = $1
            ORDER BY h.fecha_registro DESC
            LIMIT 30
            "#,
        )
        .bind(codigo)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(KpiDetalle { kpi, tendencia }))
    }

    /// Records one historic point per active indicator and returns the values
    /// that were written; all inserts share a transaction.
    pub async fn snapshot(&self) -> Result<Vec<KpiActual>, sqlx::Error> {
        let kpis = self.actuales().await?;
        let mut tx = self.pool.begin().await?;
        for kpi in &kpis {
            sqlx::query(
                "INSERT INTO kpi_historico (kpi_configuracion_id, valor, porcentaje_cumplimiento) \
                 VALUES ($1, $2, $3)",
            )
            .bind(kpi.id)
            .bind(kpi.valor_actual)
            .bind(kpi.porcentaje_cumplimiento)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(kpis)
    }

    pub async fn powerbi(&self) -> Result<PowerBiData, sqlx::Error> {
        let kpis = self.actuales().await?;

        let total_empresas =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM empresas WHERE activo")
                .fetch_one(&self.pool)
                .await?;
        let total_formaciones = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM formaciones")
            .fetch_one(&self.pool)
            .await?;
        let total_eventos = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM eventos")
            .fetch_one(&self.pool)
            .await?;
        let total_asesoramientos =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sesiones_asesoramiento")
                .fetch_one(&self.pool)
                .await?;

        let actividad_reciente = sqlx::query_as::<_, ActividadReciente>(
            r#"
            SELECT 'formacion' AS tipo, titulo AS nombre, fecha_inicio AS fecha
            FROM formaciones
            WHERE fecha_inicio >= CURRENT_DATE - INTERVAL '30 days'
            UNION ALL
            SELECT 'evento', titulo, fecha_inicio::date
            FROM eventos
            WHERE fecha_inicio >= CURRENT_DATE - INTERVAL '30 days'
            UNION ALL
            SELECT 'asesoramiento', codigo, fecha_sesion::date
            FROM sesiones_asesoramiento
            WHERE fecha_sesion >= CURRENT_DATE - INTERVAL '30 days'
            ORDER BY fecha DESC
            LIMIT 20
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(PowerBiData {
            metadata: PowerBiMetadata {
                programa: POWERBI_PROGRAMA.to_owned(),
                fecha_generacion: Utc::now(),
                version: POWERBI_VERSION.to_owned(),
            },
            kpis,
            estadisticas_globales: EstadisticasGlobales {
                total_empresas,
                total_formaciones,
                total_eventos,
                total_asesoramientos,
            },
            actividad_reciente,
        })
    }

    /// The records behind one indicator. `None` for unknown codes.
    pub async fn breakdown(&self, codigo: &str) -> Result<Option<KpiBreakdown>, sqlx::Error> {
        let items = match codigo {
            "KPI-MAT-001" => {
                let rows = sqlx::query_as::<_, MaterialApoyo>(
                    r#"
                    SELECT titulo, categoria, formato, fecha_publicacion, descargas
                    FROM materiales
                    WHERE categoria ILIKE '%apoyo%'
                    ORDER BY fecha_publicacion DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?;
                BreakdownItems::Materiales(rows)
            }
            "KPI-ENT-001" => {
                let rows = sqlx::query_as::<_, EntidadContactada>(
                    r#"
                    SELECT nombre, tipo, fecha_colaboracion, activo
                    FROM entidades_colaboradoras
                    WHERE activo
                    ORDER BY fecha_colaboracion DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?;
                BreakdownItems::Entidades(rows)
            }
            "KPI-EMP-001" => {
                let rows = sqlx::query_as::<_, EmpresaAsesorada>(
                    r#"
                    SELECT e.razon_social,
                           e.sector,
                           COUNT(sa.id) AS num_sesiones,
                           MAX(sa.fecha_sesion) AS ultima_sesion
                    FROM sesiones_asesoramiento sa
                    JOIN empresas e ON sa.empresa_id = e.id
                    GROUP BY e.id, e.razon_social, e.sector
                    ORDER BY ultima_sesion DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?;
                BreakdownItems::Empresas(rows)
            }
            "KPI-INF-001" => {
                let rows = sqlx::query_as::<_, InformeEmitido>(
                    r#"
                    SELECT i.titulo, i.fecha_generacion, ct.nombre AS tipo
                    FROM informes i
                    JOIN catalogo_tipo ct ON i.tipo_id = ct.id
                    WHERE ct.nombre ILIKE '%individualizado%'
                       OR ct.nombre ILIKE '%empresa emergente%'
                    ORDER BY i.fecha_generacion DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?;
                BreakdownItems::Informes(rows)
            }
            "KPI-FOR-001" => {
                let rows = sqlx::query_as::<_, PildoraImpartida>(
                    r#"
                    SELECT f.titulo,
                           f.fecha_inicio,
                           f.duracion_horas,
                           ct.nombre AS tipo,
                           COUNT(af.id) AS num_asistentes
                    FROM formaciones f
                    LEFT JOIN catalogo_tipo ct ON f.tipo_id = ct.id
                    LEFT JOIN asistencias_formacion af ON f.id = af.formacion_id
                    WHERE ct.nombre ILIKE '%píldora%' OR f.titulo ILIKE '%píldora%'
                    GROUP BY f.id, f.titulo, f.fecha_inicio, f.duracion_horas, ct.nombre
                    ORDER BY f.fecha_inicio DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?;
                BreakdownItems::Pildoras(rows)
            }
            "KPI-EVE-001" => {
                let rows = sqlx::query_as::<_, EventoCelebrado>(
                    r#"
                    SELECT e.titulo,
                           e.fecha_inicio,
                           e.modalidad,
                           ce.nombre AS estado,
                           e.aforo_actual,
                           e.capacidad_maxima
                    FROM eventos e
                    JOIN catalogo_estado ce ON e.estado_id = ce.id
                    WHERE ce.nombre IN ('Completado', 'Activo')
                    ORDER BY e.fecha_inicio DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?;
                BreakdownItems::Eventos(rows)
            }
            "KPI-DIF-001" => {
                let rows = sqlx::query_as::<_, ImpactoDifusion>(
                    r#"
                    SELECT di.titulo,
                           di.fecha_publicacion,
                           di.alcance,
                           di.impresiones,
                           di.interacciones,
                           cc.nombre AS canal
                    FROM difusion_impactos di
                    LEFT JOIN catalogo_canal cc ON di.canal_id = cc.id
                    ORDER BY di.fecha_publicacion DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?;
                BreakdownItems::Impactos(rows)
            }
            _ => return Ok(None),
        };

        Ok(Some(KpiBreakdown {
            codigo: codigo.to_owned(),
            items,
        }))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn kpi(estado: &str, porcentaje: f64) -> KpiActual {
        KpiActual {
            id: 1,
            codigo: "KPI-TST-001".into(),
            nombre: "Test".into(),
            descripcion: None,
            valor_objetivo: 10.0,
            valor_actual: 5.0,
            unidad: None,
            porcentaje_cumplimiento: porcentaje,
            estado: estado.into(),
            orden_visualizacion: 1,
        }
    }

    #[test]
    fn porcentaje_respects_target() {
        assert_eq!(porcentaje_cumplimiento(5.0, 10.0), 50.0);
        assert_eq!(porcentaje_cumplimiento(15.0, 10.0), 150.0);
        assert_eq!(porcentaje_cumplimiento(1.0, 3.0), 33.33);
    }

    #[test]
    fn porcentaje_is_zero_without_target() {
        assert_eq!(porcentaje_cumplimiento(5.0, 0.0), 0.0);
    }

    #[test]
    fn estado_thresholds() {
        assert_eq!(estado_kpi(10.0, 10.0), "Cumplido");
        assert_eq!(estado_kpi(12.0, 10.0), "Cumplido");
        assert_eq!(estado_kpi(3.0, 10.0), "En Progreso");
        assert_eq!(estado_kpi(0.0, 10.0), "Pendiente");
        // No target means the indicator can never be met
        assert_eq!(estado_kpi(5.0, 0.0), "En Progreso");
    }

    #[test]
    fn resumen_counts_states_and_averages() {
        let kpis = vec![
            kpi("Cumplido", 100.0),
            kpi("En Progreso", 50.0),
            kpi("Pendiente", 0.0),
        ];
        let resumen = resumen_de(&kpis);
        assert_eq!(resumen.total_kpis, 3);
        assert_eq!(resumen.kpis_cumplidos, 1);
        assert_eq!(resumen.kpis_en_progreso, 1);
        assert_eq!(resumen.kpis_pendientes, 1);
        assert_eq!(resumen.porcentaje_cumplimiento_global, 50.0);
    }

    #[test]
    fn resumen_of_nothing_is_zero() {
        let resumen = resumen_de(&[]);
        assert_eq!(resumen.total_kpis, 0);
        assert_eq!(resumen.porcentaje_cumplimiento_global, 0.0);
    }
}
