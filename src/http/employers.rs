//! `/api/employers` handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::domain::{Employer, EmployerInput};
use crate::http::error::ApiError;
use crate::http::server::AppState;

const NOT_FOUND: &str = "Employer not found";

pub async fn list_employers(State(state): State<AppState>) -> Json<Vec<Employer>> {
    Json(state.store.list_employers())
}

pub async fn get_employer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Employer>, ApiError> {
    state
        .store
        .get_employer(&id)
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

pub async fn create_employer(
    State(state): State<AppState>,
    Json(input): Json<EmployerInput>,
) -> Result<impl IntoResponse, ApiError> {
    let employer = state.mutate(move |store| store.insert_employer(input)).await?;
    tracing::info!(id = %employer.id, name = %employer.name, "Employer created");
    Ok((StatusCode::CREATED, Json(employer)))
}

pub async fn update_employer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<EmployerInput>,
) -> Result<Json<Employer>, ApiError> {
    state
        .mutate(move |store| store.replace_employer(&id, input))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

/// Deletes the employer and all of its jobs.
pub async fn delete_employer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let target = id.clone();
    let removed_jobs = state
        .mutate(move |store| store.remove_employer(&target))
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    tracing::info!(id = %id, removed_jobs, "Employer deleted");
    Ok(StatusCode::NO_CONTENT)
}
