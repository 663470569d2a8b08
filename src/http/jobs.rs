//! `/api/jobs` handlers.
//!
//! Listing accepts optional filters, a sort key and 1-based pagination:
//! `GET /api/jobs?status=applied&commute=remote&employerId=..&sort=salary&order=desc&page=2&perPage=10`

use std::cmp::Ordering;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::domain::{Commute, Job, JobInput, JobStatus};
use crate::http::error::ApiError;
use crate::http::server::AppState;

const NOT_FOUND: &str = "Job not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSort {
    Title,
    Salary,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query string for `GET /api/jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    pub status: Option<JobStatus>,
    pub commute: Option<Commute>,
    pub employer_id: Option<String>,
    pub sort: Option<JobSort>,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl JobQuery {
    /// Filter, sort and paginate `jobs` (given in creation order).
    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        let mut jobs: Vec<Job> = jobs
            .into_iter()
            .filter(|j| self.status.map_or(true, |s| j.status == s))
            .filter(|j| self.commute.map_or(true, |c| j.commute == c))
            .filter(|j| self.employer_id.as_ref().map_or(true, |e| &j.employer_id == e))
            .collect();

        if let Some(sort) = self.sort {
            jobs.sort_by(|a, b| {
                let ord = compare(sort, a, b);
                match self.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        match self.per_page {
            Some(per_page) if per_page > 0 => {
                let page = self.page.unwrap_or(1).max(1);
                jobs.into_iter()
                    .skip((page - 1).saturating_mul(per_page))
                    .take(per_page)
                    .collect()
            }
            _ => jobs,
        }
    }
}

fn compare(sort: JobSort, a: &Job, b: &Job) -> Ordering {
    match sort {
        JobSort::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        JobSort::Salary => a.salary.total_cmp(&b.salary),
        JobSort::Status => a.status.cmp(&b.status),
    }
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Json<Vec<Job>> {
    Json(query.apply(state.store.list_jobs()))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    state
        .store
        .get_job(&id)
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

pub async fn create_job(
    State(state): State<AppState>,
    Json(input): Json<JobInput>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.mutate(move |store| store.insert_job(input)).await??;
    tracing::info!(id = %job.id, title = %job.title, "Job created");
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<JobInput>,
) -> Result<Json<Job>, ApiError> {
    state
        .mutate(move |store| store.replace_job(&id, input))
        .await??
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let target = id.clone();
    if state.mutate(move |store| store.remove_job(&target)).await? {
        tracing::info!(id = %id, "Job deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(NOT_FOUND))
    }
}
