//! Project repository.
//!
//! CRUD over the `projects` table: optional list filters, COALESCE partial
//! updates, duplicate `project_code` detection left to the caller via the
//! unique constraint.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Project {
    pub id: i32,
    pub project_code: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub budget: Option<f64>,
    pub program: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewProject {
    pub project_code: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Defaults to `active`.
    pub status: Option<String>,
    pub budget: Option<f64>,
    /// Defaults to `STARS 2025`.
    pub program: Option<String>,
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub budget: Option<f64>,
    pub program: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectFilter {
    pub status: Option<String>,
    /// Projects starting on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Projects ending on or before this date.
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM projects WHERE 1=1");
        if let Some(status) = &filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(from) = filter.start_date {
            qb.push(" AND start_date >= ").push_bind(from);
        }
        if let Some(to) = filter.end_date {
            qb.push(" AND end_date <= ").push_bind(to);
        }
        qb.push(" ORDER BY created_at DESC");
        qb.build_query_as::<Project>().fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, new: &NewProject) -> Result<Project, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (project_code, name, description, start_date, end_date, status, budget, program)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'active'), $7, COALESCE($8, 'STARS 2025'))
            RETURNING *
            "#,
        )
        .bind(&new.project_code)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(&new.status)
        .bind(new.budget)
        .bind(&new.program)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &ProjectUpdate) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name        = COALESCE($1, name),
                description = COALESCE($2, description),
                start_date  = COALESCE($3, start_date),
                end_date    = COALESCE($4, end_date),
                status      = COALESCE($5, status),
                budget      = COALESCE($6, budget),
                program     = COALESCE($7, program),
                updated_at  = CURRENT_TIMESTAMP
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(&update.status)
        .bind(update.budget)
        .bind(&update.program)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>("DELETE FROM projects WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
