//! Demo data for a fresh store.

use crate::domain::{Commute, Employer, Job, JobStatus};
use crate::store::{Snapshot, Store};

fn employer(id: &str, name: &str, lat: f64, lon: f64, contact: &str, domain: &str) -> Employer {
    let first = contact.split(' ').next().unwrap_or(contact).to_lowercase();
    Employer {
        id: id.to_string(),
        name: name.to_string(),
        latitude: lat,
        longitude: lon,
        contact_name: contact.to_string(),
        contact_phone: "555-0100".to_string(),
        contact_email: format!("{}@{}", first, domain),
        website: Some(format!("https://{}", domain)),
    }
}

#[allow(clippy::too_many_arguments)]
fn job(
    id: &str,
    employer_id: &str,
    title: &str,
    salary: f64,
    status: JobStatus,
    commute: Commute,
    description: &str,
    notes: &str,
) -> Job {
    Job {
        id: id.to_string(),
        employer_id: employer_id.to_string(),
        title: title.to_string(),
        salary,
        status,
        commute,
        description: description.to_string(),
        notes: notes.to_string(),
        job_description_link: None,
    }
}

/// A handful of employers around the US with jobs in every status.
pub fn demo_snapshot() -> Snapshot {
    use Commute::*;
    use JobStatus::*;

    Snapshot {
        employers: vec![
            employer("emp-1", "Tech Solutions Inc.", 40.7128, -74.0060, "Alice Smith", "techsolutions.example"),
            employer("emp-2", "Global Innovations", 37.7749, -122.4194, "Bob Johnson", "globalinnovations.example"),
            employer("emp-3", "Apex Dynamics", 41.8781, -87.6298, "Carol Williams", "apexdynamics.example"),
            employer("emp-4", "Quantum Corp.", 47.6062, -122.3321, "David Brown", "quantum.example"),
            employer("emp-5", "Synergy Labs", 30.2672, -97.7431, "Eve Davis", "synergylabs.example"),
        ],
        jobs: vec![
            job("job-1", "emp-1", "Software Engineer", 120_000.0, Lead, Remote, "Build backend services.", ""),
            job("job-2", "emp-1", "Senior Software Engineer", 155_000.0, Applied, Hybrid, "Lead a platform team.", "Referral from Alice."),
            job("job-3", "emp-2", "Data Scientist", 140_000.0, Interview, OnSite, "Model customer churn.", "Second round next week."),
            job("job-4", "emp-3", "DevOps Engineer", 130_000.0, Offer, Remote, "Own the CI/CD pipeline.", "Offer expires Friday."),
            job("job-5", "emp-3", "Frontend Developer", 110_000.0, Rejected, Hybrid, "React and TypeScript.", ""),
            job("job-6", "emp-4", "Product Manager", 145_000.0, Lead, OnSite, "Drive the analytics roadmap.", ""),
            job("job-7", "emp-5", "QA Engineer", 95_000.0, Applied, Remote, "Automate regression suites.", ""),
            job("job-8", "emp-5", "Site Reliability Engineer", 150_000.0, Interview, Hybrid, "Keep the lights on.", "Take-home due Monday."),
        ],
    }
}

impl Store {
    /// Load the demo data set. With `wipe`, everything else is removed first.
    pub fn seed_demo(&self, wipe: bool) -> (usize, usize) {
        let (employers, jobs) = self.import(demo_snapshot(), wipe);
        tracing::info!(employers, jobs, wipe, "Seeded demo data");
        (employers, jobs)
    }
}
