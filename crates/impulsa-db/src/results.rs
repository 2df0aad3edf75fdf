//! Result repository.
//!
//! Programme results are achievement records tied to a project and
//! optionally to the activity that produced them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ProjectResult {
    pub id: i32,
    pub project_id: i32,
    pub activity_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub result_type: String,
    pub metric_name: Option<String>,
    pub metric_value: Option<f64>,
    pub metric_unit: Option<String>,
    pub achievement_date: Option<NaiveDate>,
    pub verification_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewResult {
    pub project_id: i32,
    pub activity_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub result_type: String,
    pub metric_name: Option<String>,
    pub metric_value: Option<f64>,
    pub metric_unit: Option<String>,
    pub achievement_date: Option<NaiveDate>,
    pub verification_method: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResultUpdate {
    pub activity_id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub result_type: Option<String>,
    pub metric_name: Option<String>,
    pub metric_value: Option<f64>,
    pub metric_unit: Option<String>,
    pub achievement_date: Option<NaiveDate>,
    pub verification_method: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResultFilter {
    pub project_id: Option<i32>,
    pub result_type: Option<String>,
    /// Achieved on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Achieved on or before this date.
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ResultRepository {
    pool: PgPool,
}

impl ResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ResultFilter) -> Result<Vec<ProjectResult>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM results WHERE 1=1");
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(result_type) = &filter.result_type {
            qb.push(" AND result_type = ").push_bind(result_type);
        }
        if let Some(from) = filter.start_date {
            qb.push(" AND achievement_date >= ").push_bind(from);
        }
        if let Some(to) = filter.end_date {
            qb.push(" AND achievement_date <= ").push_bind(to);
        }
        qb.push(" ORDER BY achievement_date DESC");
        qb.build_query_as::<ProjectResult>().fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<ProjectResult>, sqlx::Error> {
        sqlx::query_as::<_, ProjectResult>("SELECT * FROM results WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, new: &NewResult) -> Result<ProjectResult, sqlx::Error> {
        sqlx::query_as::<_, ProjectResult>(
            r#"
            INSERT INTO results
                (project_id, activity_id, title, description, result_type,
                 metric_name, metric_value, metric_unit, achievement_date, verification_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new.project_id)
        .bind(new.activity_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.result_type)
        .bind(&new.metric_name)
        .bind(new.metric_value)
        .bind(&new.metric_unit)
        .bind(new.achievement_date)
        .bind(&new.verification_method)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &ResultUpdate) -> Result<Option<ProjectResult>, sqlx::Error> {
        sqlx::query_as::<_, ProjectResult>(
            r#"
            UPDATE results
            SET activity_id         = COALESCE($1, activity_id),
                title               = COALESCE($2, title),
                description         = COALESCE($3, description),
                result_type         = COALESCE($4, result_type),
                metric_name         = COALESCE($5, metric_name),
                metric_value        = COALESCE($6, metric_value),
                metric_unit         = COALESCE($7, metric_unit),
                achievement_date    = COALESCE($8, achievement_date),
                verification_method = COALESCE($9, verification_method),
                updated_at          = CURRENT_TIMESTAMP
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(update.activity_id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.result_type)
        .bind(&update.metric_name)
        .bind(update.metric_value)
        .bind(&update.metric_unit)
        .bind(update.achievement_date)
        .bind(&update.verification_method)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<ProjectResult>, sqlx::Error> {
        sqlx::query_as::<_, ProjectResult>("DELETE FROM results WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
