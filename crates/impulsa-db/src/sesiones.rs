//! Advisory session (sesión de asesoramiento) repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct SesionAsesoramiento {
    pub id: i32,
    pub codigo: String,
    pub empresa_id: i32,
    pub persona_contacto_id: Option<i32>,
    pub tipo_id: Option<i32>,
    pub fecha_sesion: Option<DateTime<Utc>>,
    pub duracion_minutos: Option<i32>,
    pub modalidad: Option<String>,
    pub lugar: Option<String>,
    pub asesor: Option<String>,
    pub tematica: Option<String>,
    pub descripcion: Option<String>,
    pub objetivos: Option<String>,
    pub resultados: Option<String>,
    pub recomendaciones: Option<String>,
    pub seguimiento_requerido: bool,
    pub fecha_seguimiento: Option<NaiveDate>,
    pub estado_id: Option<i32>,
    pub valoracion: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session row with the company, contact and catalog names resolved.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct SesionDetalle {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub sesion: SesionAsesoramiento,
    pub empresa_nombre: String,
    pub persona_contacto_nombre: Option<String>,
    pub tipo_nombre: Option<String>,
    pub estado_nombre: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewSesion {
    pub codigo: String,
    pub empresa_id: i32,
    pub persona_contacto_id: Option<i32>,
    pub tipo_id: Option<i32>,
    pub fecha_sesion: Option<DateTime<Utc>>,
    pub duracion_minutos: Option<i32>,
    pub modalidad: Option<String>,
    pub lugar: Option<String>,
    pub asesor: Option<String>,
    pub tematica: Option<String>,
    pub descripcion: Option<String>,
    pub objetivos: Option<String>,
    pub resultados: Option<String>,
    pub recomendaciones: Option<String>,
    /// Defaults to false.
    pub seguimiento_requerido: Option<bool>,
    pub fecha_seguimiento: Option<NaiveDate>,
    pub estado_id: Option<i32>,
    pub valoracion: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SesionUpdate {
    pub persona_contacto_id: Option<i32>,
    pub tipo_id: Option<i32>,
    pub fecha_sesion: Option<DateTime<Utc>>,
    pub duracion_minutos: Option<i32>,
    pub modalidad: Option<String>,
    pub lugar: Option<String>,
    pub asesor: Option<String>,
    pub tematica: Option<String>,
    pub descripcion: Option<String>,
    pub objetivos: Option<String>,
    pub resultados: Option<String>,
    pub recomendaciones: Option<String>,
    pub seguimiento_requerido: Option<bool>,
    pub fecha_seguimiento: Option<NaiveDate>,
    pub estado_id: Option<i32>,
    pub valoracion: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SesionFilter {
    pub empresa_id: Option<i32>,
    pub estado_id: Option<i32>,
    pub tipo_id: Option<i32>,
}

#[derive(Clone)]
pub struct SesionRepository {
    pool: PgPool,
}

impl SesionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &SesionFilter) -> Result<Vec<SesionDetalle>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
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
            WHERE 1=1
            "#,
        );
        if let Some(empresa_id) = filter.empresa_id {
            qb.push(" AND sa.empresa_id = ").push_bind(empresa_id);
        }
        if let Some(estado_id) = filter.estado_id {
            qb.push(" AND sa.estado_id = ").push_bind(estado_id);
        }
        if let Some(tipo_id) = filter.tipo_id {
            qb.push(" AND sa.tipo_id = ").push_bind(tipo_id);
        }
        qb.push(" ORDER BY sa.fecha_sesion DESC");
        qb.build_query_as::<SesionDetalle>().fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<SesionDetalle>, sqlx::Error> {
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
            WHERE sa.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(&self, new: &NewSesion) -> Result<SesionAsesoramiento, sqlx::Error> {
        sqlx::query_as::<_, SesionAsesoramiento>(
            r#"
            INSERT INTO sesiones_asesoramiento
                (codigo, empresa_id, persona_contacto_id, tipo_id, fecha_sesion,
                 duracion_minutos, modalidad, lugar, asesor, tematica, descripcion,
                 objetivos, resultados, recomendaciones, seguimiento_requerido,
                 fecha_seguimiento, estado_id, valoracion)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    COALESCE($15, FALSE), $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(&new.codigo)
        .bind(new.empresa_id)
        .bind(new.persona_contacto_id)
        .bind(new.tipo_id)
        .bind(new.fecha_sesion)
        .bind(new.duracion_minutos)
        .bind(&new.modalidad)
        .bind(&new.lugar)
        .bind(&new.asesor)
        .bind(&new.tematica)
        .bind(&new.descripcion)
        .bind(&new.objetivos)
        .bind(&new.resultados)
        .bind(&new.recomendaciones)
        .bind(new.seguimiento_requerido)
        .bind(new.fecha_seguimiento)
        .bind(new.estado_id)
        .bind(new.valoracion)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &SesionUpdate) -> Result<Option<SesionAsesoramiento>, sqlx::Error> {
        sqlx::query_as::<_, SesionAsesoramiento>(
            r#"
            UPDATE sesiones_asesoramiento
            SET persona_contacto_id   = COALESCE($1, persona_contacto_id),
                tipo_id               = COALESCE($2, tipo_id),
                fecha_sesion          = COALESCE($3, fecha_sesion),
                duracion_minutos      = COALESCE($4, duracion_minutos),
                modalidad             = COALESCE($5, modalidad),
                lugar                 = COALESCE($6, lugar),
                asesor                = COALESCE($7, asesor),
                tematica              = COALESCE($8, tematica),
                descripcion           = COALESCE($9, descripcion),
                objetivos             = COALESCE($10, objetivos),
                resultados            = COALESCE($11, resultados),
                recomendaciones       = COALESCE($12, recomendaciones),
                seguimiento_requerido = COALESCE($13, seguimiento_requerido),
                fecha_seguimiento     = COALESCE($14, fecha_seguimiento),
                estado_id             = COALESCE($15, estado_id),
                valoracion            = COALESCE($16, valoracion),
                updated_at            = CURRENT_TIMESTAMP
            WHERE id = $17
            RETURNING *
            "#,
        )
        .bind(update.persona_contacto_id)
        .bind(update.tipo_id)
        .bind(update.fecha_sesion)
        .bind(update.duracion_minutos)
        .bind(&update.modalidad)
        .bind(&update.lugar)
        .bind(&update.asesor)
        .bind(&update.tematica)
        .bind(&update.descripcion)
        .bind(&update.objetivos)
        .bind(&update.resultados)
        .bind(&update.recomendaciones)
        .bind(update.seguimiento_requerido)
        .bind(update.fecha_seguimiento)
        .bind(update.estado_id)
        .bind(update.valoracion)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<SesionAsesoramiento>, sqlx::Error> {
        sqlx::query_as::<_, SesionAsesoramiento>(
            "DELETE FROM sesiones_asesoramiento WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
