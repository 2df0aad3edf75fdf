//! Project KPI repository.
//!
//! Besides CRUD, exposes the dashboard query: every KPI with its progress
//! ratio (current over target) computed in SQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Kpi {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub target_value: Option<f64>,
    pub current_value: f64,
    pub unit: Option<String>,
    pub measurement_frequency: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A KPI with its progress percentage, as served to the dashboard.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct KpiProgress {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub kpi: Kpi,
    /// `current_value / target_value * 100`, 0 when no target is set.
    pub progress_percentage: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewKpi {
    pub project_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub target_value: Option<f64>,
    /// Defaults to 0.
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub measurement_frequency: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct KpiUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub measurement_frequency: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KpiFilter {
    pub project_id: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KpiDashboardFilter {
    pub project_id: Option<i32>,
}

#[derive(Clone)]
pub struct KpiRepository {
    pool: PgPool,
}

impl KpiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &KpiFilter) -> Result<Vec<Kpi>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM kpis WHERE 1=1");
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category);
        }
        qb.push(" ORDER BY created_at DESC");
        qb.build_query_as::<Kpi>().fetch_all(&self.pool).await
    }

    /// Every KPI with its completion ratio, grouped for display.
    pub async fn dashboard(&self, filter: &KpiDashboardFilter) -> Result<Vec<KpiProgress>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT k.*,
                   CASE
                       WHEN k.target_value > 0 THEN (k.current_value / k.target_value) * 100
                       ELSE 0
                   END AS progress_percentage
            FROM kpis k
            WHERE 1=1
            "#,
        );
        if let Some(project_id) = filter.project_id {
            qb.push(" AND k.project_id = ").push_bind(project_id);
        }
        qb.push(" ORDER BY k.category, k.name");
        qb.build_query_as::<KpiProgress>().fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<Kpi>, sqlx::Error> {
        sqlx::query_as::<_, Kpi>("SELECT * FROM kpis WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, new: &NewKpi) -> Result<Kpi, sqlx::Error> {
        sqlx::query_as::<_, Kpi>(
            r#"
            INSERT INTO kpis
                (project_id, name, description, category, target_value,
                 current_value, unit, measurement_frequency, last_updated)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), $7, $8, CURRENT_TIMESTAMP)
            RETURNING *
            "#,
        )
        .bind(new.project_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.target_value)
        .bind(new.current_value)
        .bind(&new.unit)
        .bind(&new.measurement_frequency)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &KpiUpdate) -> Result<Option<Kpi>, sqlx::Error> {
        // last_updated moves only when a new measurement comes in.
        sqlx::query_as::<_, Kpi>(
            r#"
            UPDATE kpis
            SET name                  = COALESCE($1, name),
                description           = COALESCE($2, description),
                category              = COALESCE($3, category),
                target_value          = COALESCE($4, target_value),
                current_value         = COALESCE($5, current_value),
                unit                  = COALESCE($6, unit),
                measurement_frequency = COALESCE($7, measurement_frequency),
                last_updated          = CASE WHEN $5 IS NOT NULL THEN CURRENT_TIMESTAMP ELSE last_updated END,
                updated_at            = CURRENT_TIMESTAMP
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.category)
        .bind(update.target_value)
        .bind(update.current_value)
        .bind(&update.unit)
        .bind(&update.measurement_frequency)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Kpi>, sqlx::Error> {
        sqlx::query_as::<_, Kpi>("DELETE FROM kpis WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
