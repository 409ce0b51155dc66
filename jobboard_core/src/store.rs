//! Entity Store
//!
//! Canonical in-memory collections of jobs and applications. All mutation
//! goes through `JobStore`; each successful mutation re-serializes the whole
//! affected collection and hands it to the injected storage. A failed save
//! undoes the in-memory change, so memory never runs ahead of storage.
//!
//! Known gaps:
//! - absent ids are a logged no-op, reported to the caller as `None`
//! - `apply_to_job` does not check the job exists, is active, or that the
//!   applicant has not applied already
//! - `delete_job` leaves the job's applications in place
//! - status transitions are unconstrained

use crate::error::{StoreError, StoreResult};
use crate::ids::{IdGenerator, TimestampIdGenerator};
use crate::persistence::{KeyValueStorage, APPLICATIONS_KEY, JOBS_KEY};
use crate::seed;
use crate::types::{Application, ApplicationStatus, Job, JobPatch, NewApplication, NewJob};
use crate::views::{self, ApplicationStats, ApplicationWithJob, BoardSummary, JobSearch};
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Options for `JobStore::open`.
pub struct StoreOptions {
    /// Write the sample postings when no jobs blob exists yet
    pub seed_sample_jobs: bool,
    pub ids: Box<dyn IdGenerator>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            seed_sample_jobs: true,
            ids: Box::new(TimestampIdGenerator::new()),
        }
    }
}

impl StoreOptions {
    pub fn unseeded() -> Self {
        Self {
            seed_sample_jobs: false,
            ..Default::default()
        }
    }
}

pub struct JobStore {
    jobs: Vec<Job>,
    applications: Vec<Application>,
    storage: Box<dyn KeyValueStorage>,
    ids: Box<dyn IdGenerator>,
}

fn decode<T: DeserializeOwned>(key: &str, blob: Option<String>) -> StoreResult<Option<Vec<T>>> {
    blob.map(|b| {
        serde_json::from_str(&b).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })
    })
    .transpose()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl JobStore {
    /// Load both collections from `storage`.
    pub fn open(storage: Box<dyn KeyValueStorage>, options: StoreOptions) -> StoreResult<Self> {
        let saved_jobs = decode::<Job>(JOBS_KEY, storage.load(JOBS_KEY)?)?;
        let applications = decode::<Application>(APPLICATIONS_KEY, storage.load(APPLICATIONS_KEY)?)?
            .unwrap_or_default();

        let mut store = Self {
            jobs: Vec::new(),
            applications,
            storage,
            ids: options.ids,
        };

        match saved_jobs {
            Some(jobs) => store.jobs = jobs,
            None if options.seed_sample_jobs => {
                log::info!("[store] No saved jobs, seeding sample postings");
                store.jobs = seed::sample_jobs();
                store.persist_jobs()?;
            }
            None => {}
        }

        for id in store.jobs.iter().map(|j| &j.id).chain(store.applications.iter().map(|a| &a.id)) {
            store.ids.observe(id);
        }

        log::info!(
            "[store] Loaded {} jobs and {} applications",
            store.jobs.len(),
            store.applications.len()
        );
        Ok(store)
    }

    fn persist<T: Serialize>(&self, key: &str, items: &[T]) -> StoreResult<()> {
        let blob = serde_json::to_string(items).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.storage.save(key, &blob)?;
        Ok(())
    }

    fn persist_jobs(&self) -> StoreResult<()> {
        self.persist(JOBS_KEY, &self.jobs)
    }

    fn persist_applications(&self) -> StoreResult<()> {
        self.persist(APPLICATIONS_KEY, &self.applications)
    }

    // ============================================================
    // MUTATIONS
    // ============================================================

    /// Append a job with a fresh id and today's date.
    pub fn add_job(&mut self, data: NewJob) -> StoreResult<Job> {
        let job = data.into_job(self.ids.next_id(), today());
        self.jobs.push(job.clone());
        if let Err(e) = self.persist_jobs() {
            self.jobs.pop();
            return Err(e);
        }
        log::info!("[store] Added job {} ({}) for {}", job.id, job.title, job.posted_by);
        Ok(job)
    }

    /// Merge `patch` into the matching job. `Ok(None)` when no job has `id`.
    pub fn update_job(&mut self, id: &str, patch: JobPatch) -> StoreResult<Option<Job>> {
        let Some(pos) = self.jobs.iter().position(|j| j.id == id) else {
            log::warn!("[store] update_job: no job with id {}, ignoring", id);
            return Ok(None);
        };
        let previous = self.jobs[pos].clone();
        patch.apply_to(&mut self.jobs[pos]);
        if let Err(e) = self.persist_jobs() {
            self.jobs[pos] = previous;
            return Err(e);
        }
        log::info!("[store] Updated job {}", id);
        Ok(Some(self.jobs[pos].clone()))
    }

    /// Remove the matching job. Its applications stay behind.
    pub fn delete_job(&mut self, id: &str) -> StoreResult<Option<Job>> {
        let Some(pos) = self.jobs.iter().position(|j| j.id == id) else {
            log::warn!("[store] delete_job: no job with id {}, ignoring", id);
            return Ok(None);
        };
        let removed = self.jobs.remove(pos);
        if let Err(e) = self.persist_jobs() {
            self.jobs.insert(pos, removed);
            return Err(e);
        }

        let orphaned = views::applications_by_job(&self.applications, id).len();
        if orphaned > 0 {
            log::debug!("[store] Job {} deleted with {} orphaned applications", id, orphaned);
        }
        log::info!("[store] Deleted job {}", id);
        Ok(Some(removed))
    }

    /// Append a pending application for `job_id`. The job is not looked up.
    pub fn apply_to_job(&mut self, job_id: &str, data: NewApplication) -> StoreResult<Application> {
        let application = data.into_application(self.ids.next_id(), job_id, today());
        self.applications.push(application.clone());
        if let Err(e) = self.persist_applications() {
            self.applications.pop();
            return Err(e);
        }
        log::info!(
            "[store] {} applied to job {} (application {})",
            application.applicant_id,
            job_id,
            application.id
        );
        Ok(application)
    }

    /// Set the status of the matching application. `Ok(None)` when absent.
    pub fn update_application_status(
        &mut self,
        id: &str,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>> {
        let Some(pos) = self.applications.iter().position(|a| a.id == id) else {
            log::warn!("[store] update_application_status: no application with id {}, ignoring", id);
            return Ok(None);
        };
        let previous = std::mem::replace(&mut self.applications[pos].status, status);
        if let Err(e) = self.persist_applications() {
            self.applications[pos].status = previous;
            return Err(e);
        }
        log::info!("[store] Application {} is now {}", id, status.as_str());
        Ok(Some(self.applications[pos].clone()))
    }

    // ============================================================
    // READS
    // ============================================================

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn application(&self, id: &str) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == id)
    }

    pub fn jobs_by_employer(&self, employer_id: &str) -> Vec<&Job> {
        views::jobs_by_employer(&self.jobs, employer_id)
    }

    pub fn applications_by_job(&self, job_id: &str) -> Vec<&Application> {
        views::applications_by_job(&self.applications, job_id)
    }

    pub fn applications_by_applicant(&self, applicant_id: &str) -> Vec<&Application> {
        views::applications_by_applicant(&self.applications, applicant_id)
    }

    pub fn applications_for_employer(&self, employer_id: &str) -> Vec<ApplicationWithJob> {
        views::applications_for_employer(&self.jobs, &self.applications, employer_id)
    }

    pub fn has_applied(&self, job_id: &str, applicant_id: &str) -> bool {
        views::has_applied(&self.applications, job_id, applicant_id)
    }

    pub fn search_jobs(&self, search: &JobSearch) -> Vec<&Job> {
        views::search_jobs(&self.jobs, search)
    }

    pub fn employer_stats(&self, employer_id: &str) -> ApplicationStats {
        let joined = self.applications_for_employer(employer_id);
        views::application_stats(joined.iter().map(|a| &a.application))
    }

    pub fn applicant_stats(&self, applicant_id: &str) -> ApplicationStats {
        views::application_stats(self.applications_by_applicant(applicant_id))
    }

    pub fn board_summary(&self) -> BoardSummary {
        views::board_summary(&self.jobs)
    }

    pub fn distinct_locations(&self) -> Vec<String> {
        views::distinct_locations(&self.jobs)
    }
}
