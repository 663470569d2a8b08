use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where an application stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Lead,
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Lead,
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Lead => "lead",
            JobStatus::Applied => "applied",
            JobStatus::Interview => "interview",
            JobStatus::Offer => "offer",
            JobStatus::Rejected => "rejected",
        }
    }
}

/// How the job is worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commute {
    Remote,
    Hybrid,
    OnSite,
}

impl Commute {
    pub const ALL: [Commute; 3] = [Commute::Remote, Commute::Hybrid, Commute::OnSite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Commute::Remote => "remote",
            Commute::Hybrid => "hybrid",
            Commute::OnSite => "on-site",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Commute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown job status '{}'", s))
    }
}

impl FromStr for Commute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Commute::ALL
            .into_iter()
            .find(|commute| commute.as_str() == s)
            .ok_or_else(|| format!("unknown commute type '{}'", s))
    }
}

/// A job lead or application at one employer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub employer_id: String,
    pub title: String,
    pub salary: f64,
    pub status: JobStatus,
    pub commute: Commute,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description_link: Option<String>,
}

impl Job {
    pub fn from_input(id: String, input: JobInput) -> Self {
        Self {
            id,
            employer_id: input.employer_id,
            title: input.title,
            salary: input.salary,
            status: input.status,
            commute: input.commute,
            description: input.description,
            notes: input.notes,
            job_description_link: input.job_description_link,
        }
    }
}

/// Create/replace payload for a job. Any `id` in the body is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub employer_id: String,
    pub title: String,
    pub salary: f64,
    pub status: JobStatus,
    pub commute: Commute,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description_link: Option<String>,
}

impl From<Job> for JobInput {
    fn from(j: Job) -> Self {
        Self {
            employer_id: j.employer_id,
            title: j.title,
            salary: j.salary,
            status: j.status,
            commute: j.commute,
            description: j.description,
            notes: j.notes,
            job_description_link: j.job_description_link,
        }
    }
}
