//! Derived views over the job and application collections.
//!
//! Every function here is a linear scan recomputed per call. Nothing is
//! cached or indexed; results keep insertion order.

use crate::types::{Application, ApplicationStatus, EmploymentType, Job, JobStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub fn jobs_by_employer<'a>(jobs: &'a [Job], employer_id: &str) -> Vec<&'a Job> {
    jobs.iter().filter(|j| j.posted_by == employer_id).collect()
}

pub fn applications_by_job<'a>(applications: &'a [Application], job_id: &str) -> Vec<&'a Application> {
    applications.iter().filter(|a| a.job_id == job_id).collect()
}

pub fn applications_by_applicant<'a>(
    applications: &'a [Application],
    applicant_id: &str,
) -> Vec<&'a Application> {
    applications
        .iter()
        .filter(|a| a.applicant_id == applicant_id)
        .collect()
}

pub fn has_applied(applications: &[Application], job_id: &str, applicant_id: &str) -> bool {
    applications
        .iter()
        .any(|a| a.job_id == job_id && a.applicant_id == applicant_id)
}

// ============================================================
// SEARCH
// ============================================================

/// Job search filters. Empty / `None` fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSearch {
    /// Matched against title, company and description
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
}

impl JobSearch {
    pub fn matches(&self, job: &Job) -> bool {
        let term = self.query.to_lowercase();
        let matches_search = job.title.to_lowercase().contains(&term)
            || job.company.to_lowercase().contains(&term)
            || job.description.to_lowercase().contains(&term);

        let matches_location = self.location.is_empty()
            || job.location.to_lowercase().contains(&self.location.to_lowercase());

        let matches_type = self
            .employment_type
            .map_or(true, |t| job.employment_type == t);

        matches_search && matches_location && matches_type && job.status == JobStatus::Active
    }
}

/// Active jobs matching every filter.
pub fn search_jobs<'a>(jobs: &'a [Job], search: &JobSearch) -> Vec<&'a Job> {
    jobs.iter().filter(|j| search.matches(j)).collect()
}

// ============================================================
// JOINS AND AGGREGATES
// ============================================================

/// An application joined with the title of the job it targets.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
}

/// All applications to an employer's jobs, in job order then application order.
pub fn applications_for_employer(
    jobs: &[Job],
    applications: &[Application],
    employer_id: &str,
) -> Vec<ApplicationWithJob> {
    jobs_by_employer(jobs, employer_id)
        .into_iter()
        .flat_map(|job| {
            applications_by_job(applications, &job.id)
                .into_iter()
                .map(move |a| ApplicationWithJob {
                    application: a.clone(),
                    job_title: job.title.clone(),
                })
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub reviewed: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl ApplicationStats {
    pub fn count(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Pending => self.pending,
            ApplicationStatus::Reviewed => self.reviewed,
            ApplicationStatus::Accepted => self.accepted,
            ApplicationStatus::Rejected => self.rejected,
        }
    }
}

pub fn application_stats<'a>(applications: impl IntoIterator<Item = &'a Application>) -> ApplicationStats {
    let mut stats = ApplicationStats::default();
    for app in applications {
        stats.total += 1;
        match app.status {
            ApplicationStatus::Pending => stats.pending += 1,
            ApplicationStatus::Reviewed => stats.reviewed += 1,
            ApplicationStatus::Accepted => stats.accepted += 1,
            ApplicationStatus::Rejected => stats.rejected += 1,
        }
    }
    stats
}

/// Landing-page counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub companies: usize,
}

pub fn board_summary(jobs: &[Job]) -> BoardSummary {
    let companies: HashSet<&str> = jobs.iter().map(|j| j.company.as_str()).collect();
    BoardSummary {
        total_jobs: jobs.len(),
        active_jobs: jobs.iter().filter(|j| j.status == JobStatus::Active).count(),
        companies: companies.len(),
    }
}

/// Unique locations in first-seen order.
pub fn distinct_locations(jobs: &[Job]) -> Vec<String> {
    let mut seen = HashSet::new();
    jobs.iter()
        .filter(|j| seen.insert(j.location.as_str()))
        .map(|j| j.location.clone())
        .collect()
}
