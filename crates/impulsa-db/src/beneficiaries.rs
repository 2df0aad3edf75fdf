//! Beneficiary repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Beneficiary {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub organization: Option<String>,
    pub beneficiary_since: Option<NaiveDate>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewBeneficiary {
    pub project_id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub organization: Option<String>,
    pub beneficiary_since: Option<NaiveDate>,
    /// Defaults to `active`.
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BeneficiaryUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub organization: Option<String>,
    pub beneficiary_since: Option<NaiveDate>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BeneficiaryFilter {
    pub project_id: Option<i32>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Clone)]
pub struct BeneficiaryRepository {
    pool: PgPool,
}

impl BeneficiaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &BeneficiaryFilter) -> Result<Vec<Beneficiary>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM beneficiaries WHERE 1=1");
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(status) = &filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(kind) = &filter.kind {
            qb.push(" AND type = ").push_bind(kind);
        }
        qb.push(" ORDER BY created_at DESC");
        qb.build_query_as::<Beneficiary>().fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<Beneficiary>, sqlx::Error> {
        sqlx::query_as::<_, Beneficiary>("SELECT * FROM beneficiaries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, new: &NewBeneficiary) -> Result<Beneficiary, sqlx::Error> {
        sqlx::query_as::<_, Beneficiary>(
            r#"
            INSERT INTO beneficiaries
                (project_id, name, type, contact_email, contact_phone,
                 organization, beneficiary_since, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'active'), $9)
            RETURNING *
            "#,
        )
        .bind(new.project_id)
        .bind(&new.name)
        .bind(&new.kind)
        .bind(&new.contact_email)
        .bind(&new.contact_phone)
        .bind(&new.organization)
        .bind(new.beneficiary_since)
        .bind(&new.status)
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, update: &BeneficiaryUpdate) -> Result<Option<Beneficiary>, sqlx::Error> {
        sqlx::query_as::<_, Beneficiary>(
            r#"
            UPDATE beneficiaries
            SET name              = COALESCE($1, name),
                type              = COALESCE($2, type),
                contact_email     = COALESCE($3, contact_email),
                contact_phone     = COALESCE($4, contact_phone),
                organization      = COALESCE($5, organization),
                beneficiary_since = COALESCE($6, beneficiary_since),
                status            = COALESCE($7, status),
                notes             = COALESCE($8, notes),
                updated_at        = CURRENT_TIMESTAMP
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(&update.kind)
        .bind(&update.contact_email)
        .bind(&update.contact_phone)
        .bind(&update.organization)
        .bind(update.beneficiary_since)
        .bind(&update.status)
        .bind(&update.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Beneficiary>, sqlx::Error> {
        sqlx::query_as::<_, Beneficiary>("DELETE FROM beneficiaries WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
