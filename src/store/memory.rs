use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Employer, EmployerInput, Job, JobInput};
use crate::observability::metrics;
use crate::store::StoreError;

/// On-disk layout of a store snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub employers: Vec<Employer>,
    pub jobs: Vec<Job>,
}

/// A thread-safe store of employers and jobs.
///
/// Reads go straight to the maps. Mutations hold `writes` for their whole
/// check-modify-persist sequence, so a job can never land under an employer
/// that is being deleted and snapshots are written one at a time.
#[derive(Clone, Default)]
pub struct Store {
    employers: Arc<DashMap<String, Employer>>,
    jobs: Arc<DashMap<String, Job>>,
    writes: Arc<Mutex<()>>,
    persistence_path: Option<PathBuf>,
}

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

impl Store {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            employers: Arc::new(DashMap::new()),
            jobs: Arc::new(DashMap::new()),
            writes: Arc::new(Mutex::new(())),
            persistence_path,
        }
    }

    /// Load from file if it exists; the file becomes the persistence target.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let snapshot: Snapshot = serde_json::from_reader(reader)?;
            store.restore(snapshot);
            tracing::info!(
                employers = store.employers.len(),
                jobs = store.jobs.len(),
                path = %path.display(),
                "Loaded store snapshot"
            );
        }
        Ok(store)
    }

    /// Write a snapshot if a persistence path is configured.
    pub fn save_to_file(&self) -> Result<(), StoreError> {
        let _writes = self.lock_writes();
        self.write_snapshot()
    }

    /// Serialize to `<path>.tmp`, then rename over `path`. Caller holds `writes`.
    fn write_snapshot(&self) -> Result<(), StoreError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, &self.snapshot())?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, path)?;

        tracing::debug!(path = %path.display(), "Saved store snapshot");
        Ok(())
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock is still usable.
        self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            employers: self.list_employers(),
            jobs: self.list_jobs(),
        }
    }

    fn restore(&self, snapshot: Snapshot) {
        for employer in snapshot.employers {
            self.employers.insert(employer.id.clone(), employer);
        }
        for job in snapshot.jobs {
            self.jobs.insert(job.id.clone(), job);
        }
        self.record_size();
    }

    /// Caller holds `writes`.
    fn persist(&self) {
        self.record_size();
        if let Err(e) = self.write_snapshot() {
            tracing::error!(error = %e, "Failed to persist store snapshot");
        }
    }

    fn record_size(&self) {
        metrics::record_store_size(self.jobs.len(), self.employers.len());
    }

    // --- Employers ---

    /// All employers in creation order.
    pub fn list_employers(&self) -> Vec<Employer> {
        let mut employers: Vec<Employer> = self.employers.iter().map(|r| r.value().clone()).collect();
        employers.sort_by(|a, b| a.id.cmp(&b.id));
        employers
    }

    pub fn get_employer(&self, id: &str) -> Option<Employer> {
        self.employers.get(id).map(|r| r.value().clone())
    }

    pub fn insert_employer(&self, input: EmployerInput) -> Employer {
        let _writes = self.lock_writes();
        let employer = Employer::from_input(new_id(), input);
        self.employers.insert(employer.id.clone(), employer.clone());
        self.persist();
        employer
    }

    /// Replace an employer in place. `None` if it does not exist.
    pub fn replace_employer(&self, id: &str, input: EmployerInput) -> Option<Employer> {
        let _writes = self.lock_writes();
        let replaced = {
            let mut entry = self.employers.get_mut(id)?;
            *entry = Employer::from_input(id.to_string(), input);
            entry.clone()
        };
        self.persist();
        Some(replaced)
    }

    /// Remove an employer and every job it owns.
    ///
    /// Returns the number of jobs removed, or `None` if the employer did not exist.
    pub fn remove_employer(&self, id: &str) -> Option<usize> {
        let _writes = self.lock_writes();
        self.employers.remove(id)?;
        let before = self.jobs.len();
        self.jobs.retain(|_, job| job.employer_id != id);
        let removed_jobs = before - self.jobs.len();
        self.persist();
        Some(removed_jobs)
    }

    // --- Jobs ---

    /// All jobs in creation order.
    pub fn list_jobs(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|r| r.value().clone()).collect();
        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        jobs
    }

    pub fn get_job(&self, id: &str) -> Option<Job> {
        self.jobs.get(id).map(|r| r.value().clone())
    }

    pub fn insert_job(&self, input: JobInput) -> Result<Job, StoreError> {
        let _writes = self.lock_writes();
        self.check_employer(&input.employer_id)?;
        let job = Job::from_input(new_id(), input);
        self.jobs.insert(job.id.clone(), job.clone());
        self.persist();
        Ok(job)
    }

    /// Replace a job in place. `Ok(None)` if it does not exist.
    pub fn replace_job(&self, id: &str, input: JobInput) -> Result<Option<Job>, StoreError> {
        let _writes = self.lock_writes();
        self.check_employer(&input.employer_id)?;
        let replaced = match self.jobs.get_mut(id) {
            Some(mut entry) => {
                *entry = Job::from_input(id.to_string(), input);
                entry.clone()
            }
            None => return Ok(None),
        };
        self.persist();
        Ok(Some(replaced))
    }

    pub fn remove_job(&self, id: &str) -> bool {
        let _writes = self.lock_writes();
        let removed = self.jobs.remove(id).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    fn check_employer(&self, employer_id: &str) -> Result<(), StoreError> {
        if self.employers.contains_key(employer_id) {
            Ok(())
        } else {
            Err(StoreError::UnknownEmployer(employer_id.to_string()))
        }
    }

    // --- Seeding ---

    /// Insert records with fixed ids, skipping ids that already exist.
    ///
    /// Returns how many employers and jobs were inserted.
    pub fn import(&self, snapshot: Snapshot, wipe: bool) -> (usize, usize) {
        let _writes = self.lock_writes();
        if wipe {
            self.jobs.clear();
            self.employers.clear();
            tracing::info!("Store wiped");
        }

        let mut employers = 0;
        for employer in snapshot.employers {
            if !self.employers.contains_key(&employer.id) {
                self.employers.insert(employer.id.clone(), employer);
                employers += 1;
            }
        }

        let mut jobs = 0;
        for job in snapshot.jobs {
            if self.jobs.contains_key(&job.id) {
                continue;
            }
            if !self.employers.contains_key(&job.employer_id) {
                tracing::warn!(job = %job.id, employer = %job.employer_id, "Skipping job with unknown employer");
                continue;
            }
            self.jobs.insert(job.id.clone(), job);
            jobs += 1;
        }

        self.persist();
        (employers, jobs)
    }

    pub fn counts(&self) -> (usize, usize) {
        (self.employers.len(), self.jobs.len())
    }
}
