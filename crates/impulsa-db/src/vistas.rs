//! Denormalized 360º views.
//!
//! The original data model exposed these as SQL views; here each view is a
//! computed query so the schema stays plain tables. Every view query is
//! wrapped in a subselect, which lets the filters below apply to computed
//! columns (`ultima_actividad`, `nivel_actividad`) the same way they apply
//! to stored ones.
//!
//! This module also owns the plain row types that only surface through the
//! views and the export (personas, interacciones, planes de acción,
//! entidades colaboradoras).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

use crate::eventos::Evento;
use crate::formaciones::Formacion;
use crate::sesiones::SesionDetalle;

// ── Shared row types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Persona {
    pub id: i32,
    pub nombre: String,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub cargo: Option<String>,
    pub organizacion: Option<String>,
    pub genero: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub provincia: Option<String>,
    pub municipio: Option<String>,
    pub codigo_postal: Option<String>,
    pub notas: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Interaccion {
    pub id: i32,
    pub entidad_id: Option<i32>,
    pub empresa_id: Option<i32>,
    pub persona_id: Option<i32>,
    pub tipo_interaccion: Option<String>,
    pub canal_id: Option<i32>,
    pub fecha_interaccion: DateTime<Utc>,
    pub duracion_minutos: Option<i32>,
    pub descripcion: Option<String>,
    pub resultado: Option<String>,
    pub seguimiento_requerido: bool,
    pub fecha_seguimiento: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct PlanAccion {
    pub id: i32,
    pub codigo: String,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub empresa_id: i32,
    pub sesion_asesoramiento_id: Option<i32>,
    pub responsable: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin_prevista: Option<NaiveDate>,
    pub fecha_fin_real: Option<NaiveDate>,
    pub prioridad_id: Option<i32>,
    pub estado_id: Option<i32>,
    pub presupuesto: Option<f64>,
    pub coste_real: Option<f64>,
    pub progreso: Option<f64>,
    pub resultados_esperados: Option<String>,
    pub resultados_obtenidos: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct EntidadColaboradora {
    pub id: i32,
    pub nombre: String,
    pub tipo: Option<String>,
    pub ambito: Option<String>,
    pub direccion: Option<String>,
    pub provincia: Option<String>,
    pub municipio: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
    pub persona_contacto: Option<String>,
    pub descripcion: Option<String>,
    pub fecha_colaboracion: Option<NaiveDate>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ContactoEmpresa {
    pub id: i32,
    pub empresa_id: i32,
    pub persona_id: i32,
    pub es_contacto_principal: bool,
    pub departamento: Option<String>,
    pub notas: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── View rows ───────────────────────────────────────────────────────────────

/// One person with their main company link, engagement counters and the
/// timestamp of whatever they did last.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct VistaPersona360 {
    pub persona_id: i32,
    pub nombre: String,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub cargo: Option<String>,
    pub organizacion: Option<String>,
    pub activo: bool,
    pub empresa_id: Option<i32>,
    pub empresa_nombre: Option<String>,
    pub es_contacto_principal: Option<bool>,
    pub interacciones_count: i64,
    pub formaciones_count: i64,
    pub eventos_count: i64,
    pub sesiones_count: i64,
    pub ultima_actividad: Option<DateTime<Utc>>,
}

/// One company with engagement counters and an activity level derived from
/// the date of its last interaction, session or enrolment.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct VistaEmpresa360 {
    pub empresa_id: i32,
    pub razon_social: String,
    pub nombre_comercial: Option<String>,
    pub cif: String,
    pub sector: Option<String>,
    pub provincia: Option<String>,
    pub municipio: Option<String>,
    pub estado: Option<String>,
    pub activo: bool,
    pub fecha_alta: NaiveDate,
    pub contactos_count: i64,
    pub interacciones_count: i64,
    pub sesiones_count: i64,
    pub planes_count: i64,
    pub formaciones_count: i64,
    pub eventos_count: i64,
    pub entidades_count: i64,
    pub ultima_actividad: Option<DateTime<Utc>>,
    /// `Activo` within 30 days, `Regular` within 90, otherwise `Inactivo`.
    pub nivel_actividad: String,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct VistaFormacion360 {
    pub formacion_id: i32,
    pub codigo: String,
    pub titulo: String,
    pub modalidad: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub duracion_horas: Option<f64>,
    pub capacidad_maxima: Option<i32>,
    pub tipo_nombre: Option<String>,
    pub estado_nombre: Option<String>,
    pub inscritos: i64,
    pub asistentes: i64,
    pub porcentaje_asistencia: Option<f64>,
    pub valoracion_media: Option<f64>,
    pub empresas_participantes: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct VistaEvento360 {
    pub evento_id: i32,
    pub codigo: String,
    pub titulo: String,
    pub modalidad: Option<String>,
    pub lugar: Option<String>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub capacidad_maxima: Option<i32>,
    pub aforo_actual: i32,
    pub tipo_nombre: Option<String>,
    pub estado_nombre: Option<String>,
    pub invitados: i64,
    pub inscritos: i64,
    pub asistentes: i64,
    pub porcentaje_asistencia: Option<f64>,
    pub valoracion_media: Option<f64>,
    pub empresas_participantes: i64,
}

/// One activity of any kind, normalized for the chronological feed.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct TimelineActividad {
    /// `interaccion`, `sesion`, `formacion` or `evento`.
    pub tipo_actividad: String,
    pub actividad_id: i32,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub fecha_actividad: DateTime<Utc>,
    pub empresa_id: Option<i32>,
    pub empresa_nombre: Option<String>,
    pub persona_id: Option<i32>,
    pub persona_nombre: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Programme-wide totals, one row.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct VistaEstadisticas {
    pub total_personas: i64,
    pub total_empresas: i64,
    pub total_entidades: i64,
    pub total_formaciones: i64,
    pub total_eventos: i64,
    pub total_sesiones: i64,
    pub total_planes: i64,
    pub total_interacciones: i64,
    pub total_materiales: i64,
    pub total_informes: i64,
    pub total_impactos: i64,
    pub interacciones_ultimo_mes: i64,
}

// ── Relation bundles ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmpresaDePersona {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contacto: ContactoEmpresa,
    pub razon_social: String,
    pub sector: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct InteraccionResumen {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub interaccion: Interaccion,
    pub empresa: Option<String>,
    pub persona: Option<String>,
    pub canal: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct FormacionAsistida {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub formacion: Formacion,
    pub asistio: bool,
    pub empresa: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EventoAsistido {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub evento: Evento,
    pub asistio: bool,
    pub empresa: Option<String>,
}

/// Everything one person is connected to.
#[derive(Debug, Serialize, ToSchema)]
pub struct PersonaRelaciones {
    pub empresas: Vec<EmpresaDePersona>,
    pub interacciones_recientes: Vec<InteraccionResumen>,
    pub formaciones: Vec<FormacionAsistida>,
    pub eventos: Vec<EventoAsistido>,
    pub sesiones_asesoramiento: Vec<SesionDetalle>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct ContactoDeEmpresa {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub persona: Persona,
    pub departamento: Option<String>,
    pub es_contacto_principal: bool,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct PlanAccionDetalle {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub plan: PlanAccion,
    pub estado_nombre: Option<String>,
    pub prioridad_nombre: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct FormacionDeEmpresa {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub formacion: Formacion,
    pub asistentes: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EventoDeEmpresa {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub evento: Evento,
    pub asistentes: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EntidadConectada {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entidad: EntidadColaboradora,
    pub tipo_conexion: Option<String>,
    pub conexion_activa: bool,
}

/// Everything one company is connected to.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmpresaRelaciones {
    pub contactos: Vec<ContactoDeEmpresa>,
    pub interacciones_recientes: Vec<InteraccionResumen>,
    pub sesiones_asesoramiento: Vec<SesionDetalle>,
    pub planes_accion: Vec<PlanAccionDetalle>,
    pub formaciones: Vec<FormacionDeEmpresa>,
    pub eventos: Vec<EventoDeEmpresa>,
    pub entidades_colaboradoras: Vec<EntidadConectada>,
}

// ── Filters ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Persona360Filter {
    pub empresa_id: Option<i32>,
    /// Page size, defaults to 100.
    pub limit: Option<i64>,
    /// Defaults to 0.
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Empresa360Filter {
    pub sector: Option<String>,
    /// `Activo`, `Regular` or `Inactivo`.
    pub nivel_actividad: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Paginacion {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimelineFilter {
    /// `interaccion`, `sesion`, `formacion` or `evento`.
    pub tipo_actividad: Option<String>,
    pub empresa_id: Option<i32>,
    pub persona_id: Option<i32>,
    pub fecha_desde: Option<NaiveDate>,
    pub fecha_hasta: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ── Base queries ────────────────────────────────────────────────────────────

const PERSONA_360_SQL: &str = r#"
SELECT * FROM (
    SELECT p.id AS persona_id,
           p.nombre,
           p.apellidos,
           p.email,
           p.telefono,
           p.cargo,
           p.organizacion,
           p.activo,
           c.empresa_id,
           c.empresa_nombre,
           c.es_contacto_principal,
           (SELECT COUNT(*) FROM interacciones i WHERE i.persona_id = p.id)                     AS interacciones_count,
           (SELECT COUNT(*) FROM asistencias_formacion af WHERE af.persona_id = p.id)           AS formaciones_count,
           (SELECT COUNT(*) FROM asistencias_evento ae WHERE ae.persona_id = p.id)              AS eventos_count,
           (SELECT COUNT(*) FROM sesiones_asesoramiento sa WHERE sa.persona_contacto_id = p.id) AS sesiones_count,
           GREATEST(
               (SELECT MAX(i.fecha_interaccion) FROM interacciones i WHERE i.persona_id = p.id),
               (SELECT MAX(af.fecha_inscripcion) FROM asistencias_formacion af WHERE af.persona_id = p.id),
               (SELECT MAX(ae.fecha_inscripcion) FROM asistencias_evento ae WHERE ae.persona_id = p.id)
           ) AS ultima_actividad
    FROM personas p
    LEFT JOIN LATERAL (
        SELECT ce.empresa_id, e.razon_social AS empresa_nombre, ce.es_contacto_principal
        FROM contactos_empresa ce
        JOIN empresas e ON ce.empresa_id = e.id
        WHERE ce.persona_id = p.id
        ORDER BY ce.es_contacto_principal DESC, ce.created_at
        LIMIT 1
    ) c ON TRUE
) v
WHERE 1=1
"#;

const EMPRESA_360_SQL: &str = r#"
SELECT * FROM (
    SELECT v.*,
           CASE
               WHEN v.ultima_actividad >= now() - INTERVAL '30 days' THEN 'Activo'
               WHEN v.ultima_actividad >= now() - INTERVAL '90 days' THEN 'Regular'
               ELSE 'Inactivo'
           END AS nivel_actividad
    FROM (
        SELECT e.id AS empresa_id,
               e.razon_social,
               e.nombre_comercial,
               e.cif,
               e.sector,
               e.provincia,
               e.municipio,
               ce.nombre AS estado,
               e.activo,
               e.fecha_alta,
               (SELECT COUNT(*) FROM contactos_empresa c WHERE c.empresa_id = e.id)             AS contactos_count,
               (SELECT COUNT(*) FROM interacciones i WHERE i.empresa_id = e.id)                 AS interacciones_count,
               (SELECT COUNT(*) FROM sesiones_asesoramiento s WHERE s.empresa_id = e.id)        AS sesiones_count,
               (SELECT COUNT(*) FROM planes_accion pa WHERE pa.empresa_id = e.id)               AS planes_count,
               (SELECT COUNT(DISTINCT af.formacion_id)
                  FROM asistencias_formacion af WHERE af.empresa_id = e.id)                     AS formaciones_count,
               (SELECT COUNT(DISTINCT ae.evento_id)
                  FROM asistencias_evento ae WHERE ae.empresa_id = e.id)                        AS eventos_count,
               (SELECT COUNT(*) FROM conexiones_empresa_entidad cx
                 WHERE cx.empresa_id = e.id AND cx.activo)                                      AS entidades_count,
               GREATEST(
                   (SELECT MAX(i.fecha_interaccion) FROM interacciones i WHERE i.empresa_id = e.id),
                   (SELECT MAX(s.fecha_sesion) FROM sesiones_asesoramiento s WHERE s.empresa_id = e.id),
                   (SELECT MAX(af.fecha_inscripcion) FROM asistencias_formacion af WHERE af.empresa_id = e.id),
                   (SELECT MAX(ae.fecha_inscripcion) FROM asistencias_evento ae WHERE ae.empresa_id = e.id)
               ) AS ultima_actividad
        FROM empresas e
        LEFT JOIN catalogo_estado ce ON e.estado_id = ce.id
    ) v
) w
WHERE 1=1
"#;

const FORMACION_360_SQL: &str = r#"
SELECT * FROM (
    SELECT f.id AS formacion_id,
           f.codigo,
           f.titulo,
           f.modalidad,
           f.fecha_inicio,
           f.fecha_fin,
           f.duracion_horas,
           f.capacidad_maxima,
           ct.nombre AS tipo_nombre,
           ce.nombre AS estado_nombre,
           COUNT(af.id)                               AS inscritos,
           COUNT(af.id) FILTER (WHERE af.asistio)     AS asistentes,
           ROUND((COUNT(af.id) FILTER (WHERE af.asistio))::numeric * 100
                 / NULLIF(COUNT(af.id), 0), 2)::double precision AS porcentaje_asistencia,
           ROUND(AVG(af.valoracion)::numeric, 2)::double precision AS valoracion_media,
           COUNT(DISTINCT af.empresa_id)              AS empresas_participantes
    FROM formaciones f
    LEFT JOIN catalogo_tipo ct ON f.tipo_id = ct.id
    LEFT JOIN catalogo_estado ce ON f.estado_id = ce.id
    LEFT JOIN asistencias_formacion af ON f.id = af.formacion_id
    GROUP BY f.id, ct.nombre, ce.nombre
) v
WHERE 1=1
"#;

const EVENTO_360_SQL: &str = r#"
SELECT * FROM (
    SELECT e.id AS evento_id,
           e.codigo,
           e.titulo,
           e.modalidad,
           e.lugar,
           e.fecha_inicio,
           e.fecha_fin,
           e.capacidad_maxima,
           e.aforo_actual,
           ct.nombre AS tipo_nombre,
           ce.nombre AS estado_nombre,
           (SELECT COUNT(*) FROM invitaciones_evento iv WHERE iv.evento_id = e.id) AS invitados,
           COUNT(ae.id)                               AS inscritos,
           COUNT(ae.id) FILTER (WHERE ae.asistio)     AS asistentes,
           ROUND((COUNT(ae.id) FILTER (WHERE ae.asistio))::numeric * 100
                 / NULLIF(COUNT(ae.id), 0), 2)::double precision AS porcentaje_asistencia,
           ROUND(AVG(ae.valoracion)::numeric, 2)::double precision AS valoracion_media,
           COUNT(DISTINCT ae.empresa_id)              AS empresas_participantes
    FROM eventos e
    LEFT JOIN catalogo_tipo ct ON e.tipo_id = ct.id
    LEFT JOIN catalogo_estado ce ON e.estado_id = ce.id
    LEFT JOIN asistencias_evento ae ON e.id = ae.evento_id
    GROUP BY e.id, ct.nombre, ce.nombre
) v
WHERE 1=1
"#;

const TIMELINE_SQL: &str = r#"
SELECT * FROM (
    SELECT 'interaccion' AS tipo_actividad,
           i.id AS actividad_id,
           COALESCE(i.tipo_interaccion, 'Interacción') AS titulo,
           i.descripcion,
           i.fecha_interaccion AS fecha_actividad,
           i.empresa_id,
           e.razon_social AS empresa_nombre,
           i.persona_id,
           NULLIF(TRIM(CONCAT(p.nombre, ' ', p.apellidos)), '') AS persona_nombre,
           i.created_at
    FROM interacciones i
    LEFT JOIN empresas e ON i.empresa_id = e.id
    LEFT JOIN personas p ON i.persona_id = p.id
    UNION ALL
    SELECT 'sesion',
           sa.id,
           COALESCE(sa.tematica, sa.codigo),
           sa.descripcion,
           COALESCE(sa.fecha_sesion, sa.created_at),
           sa.empresa_id,
           e.razon_social,
           sa.persona_contacto_id,
           NULLIF(TRIM(CONCAT(p.nombre, ' ', p.apellidos)), ''),
           sa.created_at
    FROM sesiones_asesoramiento sa
    JOIN empresas e ON sa.empresa_id = e.id
    LEFT JOIN personas p ON sa.persona_contacto_id = p.id
    UNION ALL
    SELECT 'formacion',
           f.id,
           f.titulo,
           f.descripcion,
           COALESCE(f.fecha_inicio::timestamptz, f.created_at),
           NULL,
           NULL,
           NULL,
           NULL,
           f.created_at
    FROM formaciones f
    UNION ALL
    SELECT 'evento',
           ev.id,
           ev.titulo,
           ev.descripcion,
           COALESCE(ev.fecha_inicio, ev.created_at),
           NULL,
           NULL,
           NULL,
           NULL,
           ev.created_at
    FROM eventos ev
) t
WHERE 1=1
"#;

const ESTADISTICAS_SQL: &str = r#"
SELECT
    (SELECT COUNT(*) FROM personas WHERE activo)                AS total_personas,
    (SELECT COUNT(*) FROM empresas WHERE activo)                AS total_empresas,
    (SELECT COUNT(*) FROM entidades_colaboradoras WHERE activo) AS total_entidades,
    (SELECT COUNT(*) FROM formaciones)                          AS total_formaciones,
    (SELECT COUNT(*) FROM eventos)                              AS total_eventos,
    (SELECT COUNT(*) FROM sesiones_asesoramiento)               AS total_sesiones,
    (SELECT COUNT(*) FROM planes_accion)                        AS total_planes,
    (SELECT COUNT(*) FROM interacciones)                        AS total_interacciones,
    (SELECT COUNT(*) FROM materiales)                           AS total_materiales,
    (SELECT COUNT(*) FROM informes)                             AS total_informes,
    (SELECT COUNT(*) FROM difusion_impactos)                    AS total_impactos,
    (SELECT COUNT(*) FROM interacciones
      WHERE fecha_interaccion >= now() - INTERVAL '30 days')    AS interacciones_ultimo_mes
"#;

const DEFAULT_LIMIT: i64 = 100;

// ── Repository ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Vista360Repository {
    pool: PgPool,
}

impl Vista360Repository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn personas(&self, filter: &Persona360Filter) -> Result<Vec<VistaPersona360>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(PERSONA_360_SQL);
        if let Some(empresa_id) = filter.empresa_id {
            qb.push(" AND v.empresa_id = ").push_bind(empresa_id);
        }
        qb.push(" ORDER BY v.ultima_actividad DESC NULLS LAST");
        qb.push(" LIMIT ").push_bind(filter.limit.unwrap_or(DEFAULT_LIMIT));
        qb.push(" OFFSET ").push_bind(filter.offset.unwrap_or(0));
        qb.build_query_as::<VistaPersona360>().fetch_all(&self.pool).await
    }

    pub async fn persona(&self, id: i32) -> Result<Option<VistaPersona360>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(PERSONA_360_SQL);
        qb.push(" AND v.persona_id = ").push_bind(id);
        qb.build_query_as::<VistaPersona360>().fetch_optional(&self.pool).await
    }

    pub async fn empresas(&self, filter: &Empresa360Filter) -> Result<Vec<VistaEmpresa360>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(EMPRESA_360_SQL);
        if let Some(sector) = &filter.sector {
            qb.push(" AND w.sector = ").push_bind(sector);
        }
        if let Some(nivel) = &filter.nivel_actividad {
            qb.push(" AND w.nivel_actividad = ").push_bind(nivel);
        }
        qb.push(" ORDER BY w.ultima_actividad DESC NULLS LAST");
        qb.push(" LIMIT ").push_bind(filter.limit.unwrap_or(DEFAULT_LIMIT));
        qb.push(" OFFSET ").push_bind(filter.offset.unwrap_or(0));
        qb.build_query_as::<VistaEmpresa360>().fetch_all(&self.pool).await
    }

    pub async fn empresa(&self, id: i32) -> Result<Option<VistaEmpresa360>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(EMPRESA_360_SQL);
        qb.push(" AND w.empresa_id = ").push_bind(id);
        qb.build_query_as::<VistaEmpresa360>().fetch_optional(&self.pool).await
    }

    pub async fn formaciones(&self, pag: &Paginacion) -> Result<Vec<VistaFormacion360>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(FORMACION_360_SQL);
        qb.push(" ORDER BY v.fecha_inicio DESC");
        qb.push(" LIMIT ").push_bind(pag.limit.unwrap_or(DEFAULT_LIMIT));
        qb.push(" OFFSET ").push_bind(pag.offset.unwrap_or(0));
        qb.build_query_as::<VistaFormacion360>().fetch_all(&self.pool).await
    }

    pub async fn formacion(&self, id: i32) -> Result<Option<VistaFormacion360>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(FORMACION_360_SQL);
        qb.push(" AND v.formacion_id = ").push_bind(id);
        qb.build_query_as::<VistaFormacion360>().fetch_optional(&self.pool).await
    }

    pub async fn eventos(&self, pag: &Paginacion) -> Result<Vec<VistaEvento360>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(EVENTO_360_SQL);
        qb.push(" ORDER BY v.fecha_inicio DESC");
        qb.push(" LIMIT ").push_bind(pag.limit.unwrap_or(DEFAULT_LIMIT));
        qb.push(" OFFSET ").push_bind(pag.offset.unwrap_or(0));
        qb.build_query_as::<VistaEvento360>().fetch_all(&self.pool).await
    }

    pub async fn evento(&self, id: i32) -> Result<Option<VistaEvento360>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(EVENTO_360_SQL);
        qb.push(" AND v.evento_id = ").push_bind(id);
        qb.build_query_as::<VistaEvento360>().fetch_optional(&self.pool).await
    }

    pub async fn timeline(&self, filter: &TimelineFilter) -> Result<Vec<TimelineActividad>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(TIMELINE_SQL);
        if let Some(tipo) = &filter.tipo_actividad {
            qb.push(" AND t.tipo_actividad = ").push_bind(tipo);
        }
        if let Some(empresa_id) = filter.empresa_id {
            qb.push(" AND t.empresa_id = ").push_bind(empresa_id);
        }
        if let Some(persona_id) = filter.persona_id {
            qb.push(" AND t.persona_id = ").push_bind(persona_id);
        }
        if let Some(desde) = filter.fecha_desde {
            qb.push(" AND t.fecha_actividad >= ").push_bind(desde);
        }
        if let Some(hasta) = filter.fecha_hasta {
            qb.push(" AND t.fecha_actividad <= ").push_bind(hasta);
        }
        qb.push(" ORDER BY t.fecha_actividad DESC, t.created_at DESC");
        qb.push(" LIMIT ").push_bind(filter.limit.unwrap_or(DEFAULT_LIMIT));
        qb.push(" OFFSET ").push_bind(filter.offset.unwrap_or(0));
        qb.build_query_as::<TimelineActividad>().fetch_all(&self.pool).await
    }

    pub async fn estadisticas(&self) -> Result<VistaEstadisticas, sqlx::Error> {
        sqlx::query_as::<_, VistaEstadisticas>(ESTADISTICAS_SQL)
            .fetch_one(&self.pool)
            .await
    }

    /// All relationship lists for one person, fetched concurrently.
    pub async fn persona_relaciones(&self, id: i32) -> Result<PersonaRelaciones, sqlx::Error> {
        let (empresas, interacciones_recientes, formaciones, eventos, sesiones_asesoramiento) =
            tokio::try_join!(
                self.persona_empresas(id),
                self.persona_interacciones(id),
                self.persona_formaciones(id),
                self.persona_eventos(id),
                self.persona_sesiones(id),
            )?;
        Ok(PersonaRelaciones {
            empresas,
            interacciones_recientes,
            formaciones,
            eventos,
            sesiones_asesoramiento,
        })
    }

    /// All relationship lists for one company, fetched concurrently.
    pub async fn empresa_relaciones(&self, id: i32) -> Result<EmpresaRelaciones, sqlx::Error> {
        let (
            contactos,
            interacciones_recientes,
            sesiones_asesoramiento,
            planes_accion,
            formaciones,
            eventos,
            entidades_colaboradoras,
        ) = tokio::try_join!(
            self.empresa_contactos(id),
            self.empresa_interacciones(id),
            self.empresa_sesiones(id),
            self.empresa_planes(id),
            self.empresa_formaciones(id),
            self.empresa_eventos(id),
            self.empresa_entidades(id),
        )?;
        Ok(EmpresaRelaciones {
            contactos,
            interacciones_recientes,
            sesiones_asesoramiento,
            planes_accion,
            formaciones,
            eventos,
            entidades_colaboradoras,
        })
    }

    async fn persona_empresas(&self, id: i32) -> Result<Vec<EmpresaDePersona>, sqlx::Error> {
        sqlx::query_as::<_, EmpresaDePersona>(
            r#"
            SELECT ce.*, e.razon_social, e.sector
            FROM contactos_empresa ce
            JOIN empresas e ON ce.empresa_id = e.id
            WHERE ce.persona_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn persona_interacciones(&self, id: i32) -> Result<Vec<InteraccionResumen>, sqlx::Error> {
        sqlx::query_as::<_, InteraccionResumen>(
            r#"
            SELECT i.*,
                   e.razon_social AS empresa,
                   NULLIF(TRIM(CONCAT(p.nombre, ' ', p.apellidos)), '') AS persona,
                   cc.nombre AS canal
            FROM interacciones i
            LEFT JOIN empresas e ON i.empresa_id = e.id
            LEFT JOIN personas p ON i.persona_id = p.id
            LEFT JOIN catalogo_canal cc ON i.canal_id = cc.id
            WHERE i.persona_id = $1
            ORDER BY i.fecha_interaccion DESC
            LIMIT 10
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn persona_formaciones(&self, id: i32) -> Result<Vec<FormacionAsistida>, sqlx::Error> {
        sqlx::query_as::<_, FormacionAsistida>(
            r#"
            SELECT f.*, af.asistio, e.razon_social AS empresa
            FROM asistencias_formacion af
            JOIN formaciones f ON af.formacion_id = f.id
            LEFT JOIN empresas e ON af.empresa_id = e.id
            WHERE af.persona_id = $1
            ORDER BY f.fecha_inicio DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn persona_eventos(&self, id: i32) -> Result<Vec<EventoAsistido>, sqlx::Error> {
        sqlx::query_as::<_, EventoAsistido>(
            r#"
            SELECT ev.*, ae.asistio, e.razon_social AS empresa
            FROM asistencias_evento ae
            JOIN eventos ev ON ae.evento_id = ev.id
            LEFT JOIN empresas e ON ae.empresa_id = e.id
            WHERE ae.persona_id = $1
            ORDER BY ev.fecha_inicio DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn persona_sesiones(&self, id: i32) -> Result<Vec<SesionDetalle>, sqlx::Error> {
        sqlx::query_as::<_, SesionDetalle>(
            r#"
            SELECT sa.*,
                   e.razon_social AS empresa_nombre,
                   p.nombre AS persona_contacto_nombre,
                   ct.nombre AS tipo_nombre,
                   ce.nombre AS estado_nombre
            FROM sesiones_asesoramiento sa
            JOIN empresas e ON sa.empresa_id = e.id
            LEFT JOIN personas p ON sa.persona_contacto_id = p.id
            LEFT JOIN catalogo_tipo ct ON sa.tipo_id = ct.id
            LEFT JOIN catalogo_estado ce ON sa.estado_id = ce.id
            WHERE sa.persona_contacto_id = $1
            ORDER BY sa.fecha_sesion DESC
            LIMIT 10
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn empresa_contactos(&self, id: i32) -> Result<Vec<ContactoDeEmpresa>, sqlx::Error> {
        sqlx::query_as::<_, ContactoDeEmpresa>(
            r#"
            SELECT p.*, ce.departamento, ce.es_contacto_principal
            FROM contactos_empresa ce
            JOIN personas p ON ce.persona_id = p.id
            WHERE ce.empresa_id = $1
            ORDER BY ce.es_contacto_principal DESC, p.nombre
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn empresa_interacciones(&self, id: i32) -> Result<Vec<InteraccionResumen>, sqlx::Error> {
        sqlx::query_as::<_, InteraccionResumen>(
            r#"
            SELECT i.*,
                   e.razon_social AS empresa,
                   NULLIF(TRIM(CONCAT(p.nombre, ' ', p.apellidos)), '') AS persona,
                   cc.nombre AS canal
            FROM interacciones i
            LEFT JOIN empresas e ON i.empresa_id = e.id
            LEFT JOIN personas p ON i.persona_id = p.id
            LEFT JOIN catalogo_canal cc ON i.canal_id = cc.id
            WHERE i.empresa_id = $1
            ORDER BY i.fecha_interaccion DESC
            LIMIT 10
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn empresa_sesiones(&self, id: i32) -> Result<Vec<SesionDetalle>, sqlx::Error> {
        sqlx::query_as::<_, SesionDetalle>(
            r#"
            SELECT sa.*,
                   e.razon_social AS empresa_nombre,
                   p.nombre AS persona_contacto_nombre,
                   ct.nombre AS tipo_nombre,
                   ce.nombre AS estado_nombre
            FROM sesiones_asesoramiento sa
            JOIN empresas e ON sa.empresa_id = e.id
            LEFT JOIN personas p ON sa.persona_contacto_id = p.id
            LEFT JOIN catalogo_tipo ct ON sa.tipo_id = ct.id
            LEFT JOIN catalogo_estado ce ON sa.estado_id = ce.id
            WHERE sa.empresa_id = $1
            ORDER BY sa.fecha_sesion DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn empresa_planes(&self, id: i32) -> Result<Vec<PlanAccionDetalle>, sqlx::Error> {
        sqlx::query_as::<_, PlanAccionDetalle>(
            r#"
            SELECT pa.*,
                   ce.nombre AS estado_nombre,
                   cp.nombre AS prioridad_nombre
            FROM planes_accion pa
            LEFT JOIN catalogo_estado ce ON pa.estado_id = ce.id
            LEFT JOIN catalogo_prioridad cp ON pa.prioridad_id = cp.id
            WHERE pa.empresa_id = $1
            ORDER BY pa.fecha_inicio DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn empresa_formaciones(&self, id: i32) -> Result<Vec<FormacionDeEmpresa>, sqlx::Error> {
        sqlx::query_as::<_, FormacionDeEmpresa>(
            r#"
            SELECT f.*, COUNT(af.id) AS asistentes
            FROM asistencias_formacion af
            JOIN formaciones f ON af.formacion_id = f.id
            WHERE af.empresa_id = $1
            GROUP BY f.id
            ORDER BY f.fecha_inicio DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn empresa_eventos(&self, id: i32) -> Result<Vec<EventoDeEmpresa>, sqlx::Error> {
        sqlx::query_as::<_, EventoDeEmpresa>(
            r#"
            SELECT ev.*, COUNT(ae.id) AS asistentes
            FROM asistencias_evento ae
            JOIN eventos ev ON ae.evento_id = ev.id
            WHERE ae.empresa_id = $1
            GROUP BY ev.id
            ORDER BY ev.fecha_inicio DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    async fn empresa_entidades(&self, id: i32) -> Result<Vec<EntidadConectada>, sqlx::Error> {
        sqlx::query_as::<_, EntidadConectada>(
            r#"
            SELECT ec.*, cee.tipo_conexion, cee.activo AS conexion_activa
            FROM conexiones_empresa_entidad cee
            JOIN entidades_colaboradoras ec ON cee.entidad_id = ec.id
            WHERE cee.empresa_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }
}
