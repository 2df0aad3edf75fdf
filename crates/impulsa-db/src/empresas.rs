//! Company (empresa) repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Empresa {
    pub id: i32,
    pub razon_social: String,
    pub nombre_comercial: Option<String>,
    pub cif: String,
    pub sector: Option<String>,
    pub tamano: Option<String>,
    pub numero_empleados: Option<i32>,
    pub facturacion_anual: Option<f64>,
    pub direccion: Option<String>,
    pub provincia: Option<String>,
    pub municipio: Option<String>,
    pub codigo_postal: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
    pub descripcion: Option<String>,
    pub estado_id: Option<i32>,
    pub fecha_alta: NaiveDate,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A company together with its engagement counters.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmpresaStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub empresa: Empresa,
    pub contactos_count: i64,
    pub sesiones_count: i64,
    pub planes_count: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewEmpresa {
    pub razon_social: String,
    pub nombre_comercial: Option<String>,
    pub cif: String,
    pub sector: Option<String>,
    pub tamano: Option<String>,
    pub numero_empleados: Option<i32>,
    pub facturacion_anual: Option<f64>,
    pub direccion: Option<String>,
    pub provincia: Option<String>,
    pub municipio: Option<String>,
    pub codigo_postal: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
    pub descripcion: Option<String>,
    pub estado_id: Option<i32>,
    /// Defaults to today.
    pub fecha_alta: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EmpresaUpdate {
    pub razon_social: Option<String>,
    pub nombre_comercial: Option<String>,
    pub cif: Option<String>,
    pub sector: Option<String>,
    pub tamano: Option<String>,
    pub numero_empleados: Option<i32>,
    pub facturacion_anual: Option<f64>,
    pub direccion: Option<String>,
    pub provincia: Option<String>,
    pub municipio: Option<String>,
    pub codigo_postal: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
    pub descripcion: Option<String>,
    pub estado_id: Option<i32>,
    pub activo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmpresaFilter {
    pub sector: Option<String>,
    pub municipio: Option<String>,
    pub activo: Option<bool>,
    /// Page size, defaults to 50.
    pub limit: Option<i64>,
    /// Defaults to 0.
    pub offset: Option<i64>,
}

#[derive(Clone)]
pub struct EmpresaRepository {
    pool: PgPool,
}

impl EmpresaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &EmpresaFilter) -> Result<Vec<Empresa>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM empresas WHERE 1=1");
        if let Some(sector) = &filter.sector {
            qb.push(" AND sector = ").push_bind(sector);
        }
        if let Some(municipio) = &filter.municipio {
            qb.push(" AND municipio = ").push_bind(municipio);
        }
        if let Some(activo) = filter.activo {
            qb.push(" AND activo = ").push_bind(activo);
        }
        qb.push(" ORDER BY razon_social ASC");
        qb.push(" LIMIT ").push_bind(filter.limit.unwrap_or(50));
        qb.push(" OFFSET ").push_bind(filter.offset.unwrap_or(0));
        qb.build_query_as::<Empresa>().fetch_all(&self.pool).await
    }

    /// Every company with contact, advisory session and action plan counts.
    pub async fn list_with_stats(&self) -> Result<Vec<EmpresaStats>, sqlx::Error> {
        sqlx::query_as::<_, EmpresaStats>(
            r#"
            SELECT e.*,
                   (SELECT COUNT(*) FROM contactos_empresa c WHERE c.empresa_id = e.id)      AS contactos_count,
                   (SELECT COUNT(*) FROM sesiones_asesoramiento s WHERE s.empresa_id = e.id) AS sesiones_count,
                   (SELECT COUNT(*) FROM planes_accion p WHERE p.empresa_id = e.id)          AS planes_count
            FROM empresas e
            ORDER BY e.razon_social
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<Empresa>, sqlx::Error> {
        sqlx::query_as::<_, Empresa>("SELECT * FROM empresas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, new: &NewEmpresa) -> Result<Empresa, sqlx::Error> {
        sqlx::query_as::<_, Empresa>(
            r#"
            INSERT INTO empresas
                (razon_social, nombre_comercial, cif, sector, tamano, numero_empleados,
                 facturacion_anual, direccion, provincia, municipio, codigo_postal,
                 telefono, email, web, descripcion, estado_id, fecha_alta)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    COALESCE($17, CURRENT_DATE))
            RETURNING *
            "#,
        )
        .bind(&new.razon_social)
        .bind(&new.nombre_comercial)
        .bind(&new.cif)
        .bind(&new.sector)
        .bind(&new.tamano)
        .bind(new.numero_empleados)
        .bind(new.facturacion_anual)
        .bind(&new.direccion)
        .bind(&new.provincia)
        .bind(&new.municipio)
        .bind(&new.codigo_postal)
        .bind(&new.telefono)
        .bind(&new.email)
        .bind(&new.web)
        .bind(&new.descripcion)
        .bind(new.estado_id)
        .bind(new.fecha_alta)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &EmpresaUpdate) -> Result<Option<Empresa>, sqlx::Error> {
        sqlx::query_as::<_, Empresa>(
            r#"
            UPDATE empresas
            SET razon_social      = COALESCE($1, razon_social),
                nombre_comercial  = COALESCE($2, nombre_comercial),
                cif               = COALESCE($3, cif),
                sector            = COALESCE($4, sector),
                tamano            = COALESCE($5, tamano),
                numero_empleados  = COALESCE($6, numero_empleados),
                facturacion_anual = COALESCE($7, facturacion_anual),
                direccion         = COALESCE($8, direccion),
                provincia         = COALESCE($9, provincia),
                municipio         = COALESCE($10, municipio),
                codigo_postal     = COALESCE($11, codigo_postal),
                telefono          = COALESCE($12, telefono),
                email             = COALESCE($13, email),
                web               = COALESCE($14, web),
                descripcion       = COALESCE($15, descripcion),
                estado_id         = COALESCE($16, estado_id),
                activo            = COALESCE($17, activo),
                updated_at        = CURRENT_TIMESTAMP
            WHERE id = $18
            RETURNING *
            "#,
        )
        .bind(&update.razon_social)
        .bind(&update.nombre_comercial)
        .bind(&update.cif)
        .bind(&update.sector)
        .bind(&update.tamano)
        .bind(update.numero_empleados)
        .bind(update.facturacion_anual)
        .bind(&update.direccion)
        .bind(&update.provincia)
        .bind(&update.municipio)
        .bind(&update.codigo_postal)
        .bind(&update.telefono)
        .bind(&update.email)
        .bind(&update.web)
        .bind(&update.descripcion)
        .bind(update.estado_id)
        .bind(update.activo)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Empresa>, sqlx::Error> {
        sqlx::query_as::<_, Empresa>("DELETE FROM empresas WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
