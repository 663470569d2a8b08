//! `/api/analytics`: average salary pivot by status and commute type.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::domain::{Commute, Job, JobStatus};
use crate::http::server::AppState;

/// Average salary per commute type for one status. `None` when no jobs match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPivotRow {
    pub status: JobStatus,
    pub remote: Option<f64>,
    pub hybrid: Option<f64>,
    pub on_site: Option<f64>,
}

fn average(jobs: &[Job], status: JobStatus, commute: Commute) -> Option<f64> {
    let (sum, count) = jobs
        .iter()
        .filter(|j| j.status == status && j.commute == commute)
        .fold((0.0, 0usize), |(sum, count), j| (sum + j.salary, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// One row per status, in pipeline order.
pub fn salary_pivot(jobs: &[Job]) -> Vec<SalaryPivotRow> {
    JobStatus::ALL
        .into_iter()
        .map(|status| SalaryPivotRow {
            status,
            remote: average(jobs, status, Commute::Remote),
            hybrid: average(jobs, status, Commute::Hybrid),
            on_site: average(jobs, status, Commute::OnSite),
        })
        .collect()
}

pub async fn get_salary_pivot(State(state): State<AppState>) -> Json<Vec<SalaryPivotRow>> {
    Json(salary_pivot(&state.store.list_jobs()))
}
