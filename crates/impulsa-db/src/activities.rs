//! Activity repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Activity {
    pub id: i32,
    pub project_id: i32,
    pub objective_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub activity_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub responsible: Option<String>,
    pub budget: Option<f64>,
    pub actual_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewActivity {
    pub project_id: i32,
    pub objective_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub activity_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Defaults to `planned`.
    pub status: Option<String>,
    pub responsible: Option<String>,
    pub budget: Option<f64>,
    /// Defaults to 0.
    pub actual_cost: Option<f64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ActivityUpdate {
    pub objective_id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub activity_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub responsible: Option<String>,
    pub budget: Option<f64>,
    pub actual_cost: Option<f64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityFilter {
    pub project_id: Option<i32>,
    pub status: Option<String>,
    /// Activities starting on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Activities ending on or before this date.
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM activities WHERE 1=1");
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(status) = &filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(from) = filter.start_date {
            qb.push(" AND start_date >= ").push_bind(from);
        }
        if let Some(to) = filter.end_date {
            qb.push(" AND end_date <= ").push_bind(to);
        }
        qb.push(" ORDER BY start_date DESC");
        qb.build_query_as::<Activity>().fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<Activity>, sqlx::Error> {
        sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, new: &NewActivity) -> Result<Activity, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities
                (project_id, objective_id, title, description, activity_type,
                 start_date, end_date, status, responsible, budget, actual_cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'planned'), $9, $10, COALESCE($11, 0))
            RETURNING *
            "#,
        )
        .bind(new.project_id)
        .bind(new.objective_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.activity_type)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(&new.status)
        .bind(&new.responsible)
        .bind(new.budget)
        .bind(new.actual_cost)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &ActivityUpdate) -> Result<Option<Activity>, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            r#"
            UPDATE activities
            SET objective_id  = COALESCE($1, objective_id),
                title         = COALESCE($2, title),
                description   = COALESCE($3, description),
                activity_type = COALESCE($4, activity_type),
                start_date    = COALESCE($5, start_date),
                end_date      = COALESCE($6, end_date),
                status        = COALESCE($7, status),
                responsible   = COALESCE($8, responsible),
                budget        = COALESCE($9, budget),
                actual_cost   = COALESCE($10, actual_cost),
                updated_at    = CURRENT_TIMESTAMP
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(update.objective_id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.activity_type)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(&update.status)
        .bind(&update.responsible)
        .bind(update.budget)
        .bind(update.actual_cost)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Activity>, sqlx::Error> {
        sqlx::query_as::<_, Activity>("DELETE FROM activities WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
