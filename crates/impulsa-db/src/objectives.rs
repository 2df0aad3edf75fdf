//! Objective repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Objective {
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: f64,
    pub unit: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewObjective {
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    /// Defaults to 0.
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub deadline: Option<NaiveDate>,
    /// Defaults to `pending`.
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ObjectiveUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ObjectiveFilter {
    pub project_id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct ObjectiveRepository {
    pool: PgPool,
}

impl ObjectiveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ObjectiveFilter) -> Result<Vec<Objective>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM objectives WHERE 1=1");
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(status) = &filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC");
        qb.build_query_as::<Objective>().fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<Objective>, sqlx::Error> {
        sqlx::query_as::<_, Objective>("SELECT * FROM objectives WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, new: &NewObjective) -> Result<Objective, sqlx::Error> {
        sqlx::query_as::<_, Objective>(
            r#"
            INSERT INTO objectives (project_id, title, description, target_value, current_value, unit, deadline, status)
            VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, $7, COALESCE($8, 'pending'))
            RETURNING *
            "#,
        )
        .bind(new.project_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.target_value)
        .bind(new.current_value)
        .bind(&new.unit)
        .bind(new.deadline)
        .bind(&new.status)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &ObjectiveUpdate) -> Result<Option<Objective>, sqlx::Error> {
        sqlx::query_as::<_, Objective>(
            r#"
            UPDATE objectives
            SET title         = COALESCE($1, title),
                description   = COALESCE($2, description),
                target_value  = COALESCE($3, target_value),
                current_value = COALESCE($4, current_value),
                unit          = COALESCE($5, unit),
                deadline      = COALESCE($6, deadline),
                status        = COALESCE($7, status),
                updated_at    = CURRENT_TIMESTAMP
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.target_value)
        .bind(update.current_value)
        .bind(&update.unit)
        .bind(update.deadline)
        .bind(&update.status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Objective>, sqlx::Error> {
        sqlx::query_as::<_, Objective>("DELETE FROM objectives WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
