//! Generic programme schema: beneficiary CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use impulsa_common::error::ApiError;
use impulsa_db::beneficiaries::{
    Beneficiary, BeneficiaryFilter, BeneficiaryRepository, BeneficiaryUpdate, NewBeneficiary,
};

use crate::state::SharedState;

fn repo(state: &SharedState) -> BeneficiaryRepository {
    BeneficiaryRepository::new(state.db.clone())
}

/// GET /api/beneficiaries - List beneficiaries
#[utoipa::path(
    get,
    path = "/api/beneficiaries",
    tag = "Beneficiaries",
    params(BeneficiaryFilter),
    responses((status = 200, description = "Beneficiary list", body = [Beneficiary]))
)]
pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<BeneficiaryFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let beneficiaries = repo(&state).list(&filter).await?;
    Ok(Json(beneficiaries))
}

/// GET /api/beneficiaries/{id} - One beneficiary
#[utoipa::path(
    get,
    path = "/api/beneficiaries/{id}",
    tag = "Beneficiaries",
    responses(
        (status = 200, description = "Beneficiary", body = Beneficiary),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let beneficiary = repo(&state)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Beneficiary not found".to_string()))?;
    Ok(Json(beneficiary))
}

/// POST /api/beneficiaries - Create a beneficiary
#[utoipa::path(
    post,
    path = "/api/beneficiaries",
    tag = "Beneficiaries",
    request_body = NewBeneficiary,
    responses(
        (status = 201, description = "Created", body = Beneficiary),
        (status = 400, description = "Unknown project")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Json(new): Json<NewBeneficiary>,
) -> Result<impl IntoResponse, ApiError> {
    let beneficiary = repo(&state)
        .create(&new)
        .await
        .map_err(|err| ApiError::from_db_write(err, "Beneficiary already exists"))?;
    Ok((StatusCode::CREATED, Json(beneficiary)))
}

/// PUT /api/beneficiaries/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/beneficiaries/{id}",
    tag = "Beneficiaries",
    request_body = BeneficiaryUpdate,
    responses(
        (status = 200, description = "Updated", body = Beneficiary),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(update): Json<BeneficiaryUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let beneficiary = repo(&state)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Beneficiary not found".to_string()))?;
    Ok(Json(beneficiary))
}

/// DELETE /api/beneficiaries/{id} - Delete and return the row
#[utoipa::path(
    delete,
    path = "/api/beneficiaries/{id}",
    tag = "Beneficiaries",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let beneficiary = repo(&state)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Beneficiary not found".to_string()))?;
    Ok(Json(json!({
        "message": "Beneficiary deleted successfully",
        "beneficiary": beneficiary,
    })))
}
