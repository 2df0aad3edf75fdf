//! Event repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Evento {
    pub id: i32,
    pub codigo: String,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub tipo_id: Option<i32>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub lugar: Option<String>,
    pub direccion: Option<String>,
    pub modalidad: Option<String>,
    pub plataforma_online: Option<String>,
    pub capacidad_maxima: Option<i32>,
    pub aforo_actual: i32,
    pub organizador: Option<String>,
    pub ponentes: Option<String>,
    pub agenda: Option<String>,
    pub estado_id: Option<i32>,
    pub presupuesto: Option<f64>,
    pub coste_real: Option<f64>,
    pub publico_objetivo: Option<String>,
    pub requisitos: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EventoResumen {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub evento: Evento,
    pub tipo_nombre: Option<String>,
    pub estado_nombre: Option<String>,
    pub total_inscritos: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EventoDetalle {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub evento: Evento,
    pub tipo_nombre: Option<String>,
    pub estado_nombre: Option<String>,
}

/// Registration row joined with the attendee and their company.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AsistenteEvento {
    pub id: i32,
    pub evento_id: i32,
    pub persona_id: i32,
    pub empresa_id: Option<i32>,
    pub fecha_inscripcion: DateTime<Utc>,
    pub estado: Option<String>,
    pub asistio: bool,
    pub hora_entrada: Option<DateTime<Utc>>,
    pub hora_salida: Option<DateTime<Utc>>,
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
pub struct NewEvento {
    pub codigo: String,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub tipo_id: Option<i32>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub lugar: Option<String>,
    pub direccion: Option<String>,
    pub modalidad: Option<String>,
    pub plataforma_online: Option<String>,
    pub capacidad_maxima: Option<i32>,
    /// Defaults to 0.
    pub aforo_actual: Option<i32>,
    pub organizador: Option<String>,
    pub ponentes: Option<String>,
    pub agenda: Option<String>,
    pub estado_id: Option<i32>,
    pub presupuesto: Option<f64>,
    pub coste_real: Option<f64>,
    pub publico_objetivo: Option<String>,
    pub requisitos: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EventoUpdate {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub tipo_id: Option<i32>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub lugar: Option<String>,
    pub direccion: Option<String>,
    pub modalidad: Option<String>,
    pub plataforma_online: Option<String>,
    pub capacidad_maxima: Option<i32>,
    pub aforo_actual: Option<i32>,
    pub organizador: Option<String>,
    pub ponentes: Option<String>,
    pub agenda: Option<String>,
    pub estado_id: Option<i32>,
    pub presupuesto: Option<f64>,
    pub coste_real: Option<f64>,
    pub publico_objetivo: Option<String>,
    pub requisitos: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventoFilter {
    pub tipo_id: Option<i32>,
    pub estado_id: Option<i32>,
    pub modalidad: Option<String>,
}

#[derive(Clone)]
pub struct EventoRepository {
    pool: PgPool,
}

impl EventoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &EventoFilter) -> Result<Vec<EventoResumen>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT e.*,
                   ct.nombre AS tipo_nombre,
                   ce.nombre AS estado_nombre,
                   COUNT(DISTINCT ae.id) AS total_inscritos
            FROM eventos e
            LEFT JOIN catalogo_tipo ct ON e.tipo_id = ct.id
            LEFT JOIN catalogo_estado ce ON e.estado_id = ce.id
            LEFT JOIN asistencias_evento ae ON e.id = ae.evento_id
            WHERE 1=1
            "#,
        );
        if let Some(tipo_id) = filter.tipo_id {
            qb.push(" AND e.tipo_id = ").push_bind(tipo_id);
        }
        if let Some(estado_id) = filter.estado_id {
            qb.push(" AND e.estado_id = ").push_bind(estado_id);
        }
        if let Some(modalidad) = &filter.modalidad {
            qb.push(" AND e.modalidad = ").push_bind(modalidad);
        }
        qb.push(" GROUP BY e.id, ct.nombre, ce.nombre ORDER BY e.fecha_inicio DESC");
        qb.build_query_as::<EventoResumen>().fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<EventoDetalle>, sqlx::Error> {
        sqlx::query_as::<_, EventoDetalle>(
            r#"
            SELECT e.*,
                   ct.nombre AS tipo_nombre,
                   ce.nombre AS estado_nombre
            FROM eventos e
            LEFT JOIN catalogo_tipo ct ON e.tipo_id = ct.id
            LEFT JOIN catalogo_estado ce ON e.estado_id = ce.id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn asistentes(&self, id: i32) -> Result<Vec<AsistenteEvento>, sqlx::Error> {
        sqlx::query_as::<_, AsistenteEvento>(
            r#"
            SELECT ae.*,
                   p.nombre,
                   p.apellidos,
                   p.email,
                   e.razon_social AS empresa
            FROM asistencias_evento ae
            JOIN personas p ON ae.persona_id = p.id
            LEFT JOIN empresas e ON ae.empresa_id = e.id
            WHERE ae.evento_id = $1
            ORDER BY ae.fecha_inscripcion DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create(&self, new: &NewEvento) -> Result<Evento, sqlx::Error> {
        sqlx::query_as::<_, Evento>(
            r#"
            INSERT INTO eventos
                (codigo, titulo, descripcion, tipo_id, fecha_inicio, fecha_fin,
                 lugar, direccion, modalidad, plataforma_online, capacidad_maxima,
                 aforo_actual, organizador, ponentes, agenda, estado_id,
                 presupuesto, coste_real, publico_objetivo, requisitos)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    COALESCE($12, 0), $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(&new.codigo)
        .bind(&new.titulo)
        .bind(&new.descripcion)
        .bind(new.tipo_id)
        .bind(new.fecha_inicio)
        .bind(new.fecha_fin)
        .bind(&new.lugar)
        .bind(&new.direccion)
        .bind(&new.modalidad)
        .bind(&new.plataforma_online)
        .bind(new.capacidad_maxima)
        .bind(new.aforo_actual)
        .bind(&new.organizador)
        .bind(&new.ponentes)
        .bind(&new.agenda)
        .bind(new.estado_id)
        .bind(new.presupuesto)
        .bind(new.coste_real)
        .bind(&new.publico_objetivo)
        .bind(&new.requisitos)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &EventoUpdate) -> Result<Option<Evento>, sqlx::Error> {
        sqlx::query_as::<_, Evento>(
            r#"
            UPDATE eventos
            SET titulo            = COALESCE($1, titulo),
                descripcion       = COALESCE($2, descripcion),
                tipo_id           = COALESCE($3, tipo_id),
                fecha_inicio      = COALESCE($4, fecha_inicio),
                fecha_fin         = COALESCE($5, fecha_fin),
                lugar             = COALESCE($6, lugar),
                direccion         = COALESCE($7, direccion),
                modalidad         = COALESCE($8, modalidad),
                plataforma_online = COALESCE($9, plataforma_online),
                capacidad_maxima  = COALESCE($10, capacidad_maxima),
                aforo_actual      = COALESCE($11, aforo_actual),
                organizador       = COALESCE($12, organizador),
                ponentes          = COALESCE($13, ponentes),
                agenda            = COALESCE($14, agenda),
                estado_id         = COALESCE($15, estado_id),
                presupuesto       = COALESCE($16, presupuesto),
                coste_real        = COALESCE($17, coste_real),
                publico_objetivo  = COALESCE($18, publico_objetivo),
                requisitos        = COALESCE($19, requisitos),
                updated_at        = CURRENT_TIMESTAMP
            WHERE id = $20
            RETURNING *
            "#,
        )
        .bind(&update.titulo)
        .bind(&update.descripcion)
        .bind(update.tipo_id)
        .bind(update.fecha_inicio)
        .bind(update.fecha_fin)
        .bind(&update.lugar)
        .bind(&update.direccion)
        .bind(&update.modalidad)
        .bind(&update.plataforma_online)
        .bind(update.capacidad_maxima)
        .bind(update.aforo_actual)
        .bind(&update.organizador)
        .bind(&update.ponentes)
        .bind(&update.agenda)
        .bind(update.estado_id)
        .bind(update.presupuesto)
        .bind(update.coste_real)
        .bind(&update.publico_objetivo)
        .bind(&update.requisitos)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Evento>, sqlx::Error> {
        sqlx::query_as::<_, Evento>("DELETE FROM eventos WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
