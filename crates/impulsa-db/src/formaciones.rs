//! Training course (formación) repository.
//!
//! Listing resolves catalog names and enrolment counts in one query so the
//! frontend never has to join catalogs client side.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Formacion {
    pub id: i32,
    pub codigo: String,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub tipo_id: Option<i32>,
    pub modalidad: Option<String>,
    pub duracion_horas: Option<f64>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub horario: Option<String>,
    pub lugar: Option<String>,
    pub plataforma_online: Option<String>,
    pub capacidad_maxima: Option<i32>,
    pub formador: Option<String>,
    pub contenido: Option<String>,
    pub objetivos: Option<String>,
    pub estado_id: Option<i32>,
    pub presupuesto: Option<f64>,
    pub coste_real: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row: the course plus catalog names and enrolment count.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct FormacionResumen {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub formacion: Formacion,
    pub tipo_nombre: Option<String>,
    pub estado_nombre: Option<String>,
    pub total_inscritos: i64,
}

/// Detail row: catalog names without the aggregate.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct FormacionDetalle {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub formacion: Formacion,
    pub tipo_nombre: Option<String>,
    pub estado_nombre: Option<String>,
}

/// Enrolment row joined with the attendee and their company.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AsistenteFormacion {
    pub id: i32,
    pub formacion_id: i32,
    pub persona_id: i32,
    pub empresa_id: Option<i32>,
    pub fecha_inscripcion: DateTime<Utc>,
    pub estado: Option<String>,
    pub asistio: bool,
    pub porcentaje_asistencia: Option<f64>,
    pub calificacion: Option<f64>,
    pub certificado_emitido: bool,
    pub fecha_certificado: Option<NaiveDate>,
    pub valoracion: Option<i32>,
    pub comentarios: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub nombre: String,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub empresa: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewFormacion {
    pub codigo: String,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub tipo_id: Option<i32>,
    pub modalidad: Option<String>,
    pub duracion_horas: Option<f64>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub horario: Option<String>,
    pub lugar: Option<String>,
    pub plataforma_online: Option<String>,
    pub capacidad_maxima: Option<i32>,
    pub formador: Option<String>,
    pub contenido: Option<String>,
    pub objetivos: Option<String>,
    pub estado_id: Option<i32>,
    pub presupuesto: Option<f64>,
    pub coste_real: Option<f64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FormacionUpdate {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub tipo_id: Option<i32>,
    pub modalidad: Option<String>,
    pub duracion_horas: Option<f64>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub horario: Option<String>,
    pub lugar: Option<String>,
    pub plataforma_online: Option<String>,
    pub capacidad_maxima: Option<i32>,
    pub formador: Option<String>,
    pub contenido: Option<String>,
    pub objetivos: Option<String>,
    pub estado_id: Option<i32>,
    pub presupuesto: Option<f64>,
    pub coste_real: Option<f64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormacionFilter {
    pub tipo_id: Option<i32>,
    pub estado_id: Option<i32>,
    pub modalidad: Option<String>,
}

#[derive(Clone)]
pub struct FormacionRepository {
    pool: PgPool,
}

impl FormacionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &FormacionFilter) -> Result<Vec<FormacionResumen>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT f.*,
                   ct.nombre AS tipo_nombre,
                   ce.nombre AS estado_nombre,
                   COUNT(DISTINCT af.id) AS total_inscritos
            FROM formaciones f
            LEFT JOIN catalogo_tipo ct ON f.tipo_id = ct.id
            LEFT JOIN catalogo_estado ce ON f.estado_id = ce.id
            LEFT JOIN asistencias_formacion af ON f.id = af.formacion_id
            WHERE 1=1
            "#,
        );
        if let Some(tipo_id) = filter.tipo_id {
            qb.push(" AND f.tipo_id = ").push_bind(tipo_id);
        }
        if let Some(estado_id) = filter.estado_id {
            qb.push(" AND f.estado_id = ").push_bind(estado_id);
        }
        if let Some(modalidad) = &filter.modalidad {
            qb.push(" AND f.modalidad = ").push_bind(modalidad);
        }
        qb.push(" GROUP BY f.id, ct.nombre, ce.nombre ORDER BY f.fecha_inicio DESC");
        qb.build_query_as::<FormacionResumen>().fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<FormacionDetalle>, sqlx::Error> {
        sqlx::query_as::<_, FormacionDetalle>(
            r#"
            SELECT f.*,
                   ct.nombre AS tipo_nombre,
                   ce.nombre AS estado_nombre
            FROM formaciones f
            LEFT JOIN catalogo_tipo ct ON f.tipo_id = ct.id
            LEFT JOIN catalogo_estado ce ON f.estado_id = ce.id
            WHERE f.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Enrolments for one course, newest first.
    pub async fn asistentes(&self, id: i32) -> Result<Vec<AsistenteFormacion>, sqlx::Error> {
        sqlx::query_as::<_, AsistenteFormacion>(
            r#"
            SELECT af.*,
                   p.nombre,
                   p.apellidos,
                   p.email,
                   e.razon_social AS empresa
            FROM asistencias_formacion af
            JOIN personas p ON af.persona_id = p.id
            LEFT JOIN empresas e ON af.empresa_id = e.id
            WHERE af.formacion_id = $1
            ORDER BY af.fecha_inscripcion DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create(&self, new: &NewFormacion) -> Result<Formacion, sqlx::Error> {
        sqlx::query_as::<_, Formacion>(
            r#"
            INSERT INTO formaciones
                (codigo, titulo, descripcion, tipo_id, modalidad, duracion_horas,
                 fecha_inicio, fecha_fin, horario, lugar, plataforma_online,
                 capacidad_maxima, formador, contenido, objetivos, estado_id,
                 presupuesto, coste_real)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(&new.codigo)
        .bind(&new.titulo)
        .bind(&new.descripcion)
        .bind(new.tipo_id)
        .bind(&new.modalidad)
        .bind(new.duracion_horas)
        .bind(new.fecha_inicio)
        .bind(new.fecha_fin)
        .bind(&new.horario)
        .bind(&new.lugar)
        .bind(&new.plataforma_online)
        .bind(new.capacidad_maxima)
        .bind(&new.formador)
        .bind(&new.contenido)
        .bind(&new.objetivos)
        .bind(new.estado_id)
        .bind(new.presupuesto)
        .bind(new.coste_real)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &FormacionUpdate) -> Result<Option<Formacion>, sqlx::Error> {
        sqlx::query_as::<_, Formacion>(
            r#"
            UPDATE formaciones
            SET titulo            = COALESCE($1, titulo),
                descripcion       = COALESCE($2, descripcion),
                tipo_id           = COALESCE($3, tipo_id),
                modalidad         = COALESCE($4, modalidad),
                duracion_horas    = COALESCE($5, duracion_horas),
                fecha_inicio      = COALESCE($6, fecha_inicio),
                fecha_fin         = COALESCE($7, fecha_fin),
                horario           = COALESCE($8, horario),
                lugar             = COALESCE($9, lugar),
                plataforma_online = COALESCE($10, plataforma_online),
                capacidad_maxima  = COALESCE($11, capacidad_maxima),
                formador          = COALESCE($12, formador),
                contenido         = COALESCE($13, contenido),
                objetivos         = COALESCE($14, objetivos),
                estado_id         = COALESCE($15, estado_id),
                presupuesto       = COALESCE($16, presupuesto),
                coste_real        = COALESCE($17, coste_real),
                updated_at        = CURRENT_TIMESTAMP
            WHERE id = $18
            RETURNING *
            "#,
        )
        .bind(&update.titulo)
        .bind(&update.descripcion)
        .bind(update.tipo_id)
        .bind(&update.modalidad)
        .bind(update.duracion_horas)
        .bind(update.fecha_inicio)
        .bind(update.fecha_fin)
        .bind(&update.horario)
        .bind(&update.lugar)
        .bind(&update.plataforma_online)
        .bind(update.capacidad_maxima)
        .bind(&update.formador)
        .bind(&update.contenido)
        .bind(&update.objetivos)
        .bind(update.estado_id)
        .bind(update.presupuesto)
        .bind(update.coste_real)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Formacion>, sqlx::Error> {
        sqlx::query_as::<_, Formacion>("DELETE FROM formaciones WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
