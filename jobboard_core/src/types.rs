//! Job Board Types
//!
//! Core records owned by the entity store. Field names serialize in
//! camelCase so persisted blobs keep the layout the web client reads.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reads an optional `YYYY-MM-DD` date, treating `null` and blank strings as
/// no date. The web client posts `""` when the deadline input is left empty.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Patch form of a deadline: field absent keeps the stored value (outer `None`),
/// `null` or `""` clears it, a date replaces it.
fn deserialize_deadline_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_date(deserializer).map(Some)
}

// ============================================================
// ENUMS
// ============================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Remote,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full-time",
            EmploymentType::PartTime => "part-time",
            EmploymentType::Contract => "contract",
            EmploymentType::Remote => "remote",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full-time" => Some(EmploymentType::FullTime),
            "part-time" => Some(EmploymentType::PartTime),
            "contract" => Some(EmploymentType::Contract),
            "remote" => Some(EmploymentType::Remote),
            _ => None,
        }
    }
}

/// Job lifecycle. Starts `Active`; the deadline never moves it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Closed,
    Filled,
}

/// Application lifecycle. Starts `Pending`; any state may be assigned from any other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "job_seeker")]
    Jobseeker,
    Employer,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jobseeker" | "job_seeker" => Some(Role::Jobseeker),
            "employer" => Some(Role::Employer),
            _ => None,
        }
    }
}

// ============================================================
// JOB
// ============================================================

/// A posting created by an employer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: EmploymentType,
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
    /// Employer (user) id
    pub posted_by: String,
    pub posted_date: NaiveDate,
    /// Descriptive only
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_date"
    )]
    pub deadline: Option<NaiveDate>,
    pub status: JobStatus,
}

/// Everything a caller supplies for `JobStore::add_job`; the store fills `id` and `posted_date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub posted_by: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub status: JobStatus,
}

impl NewJob {
    pub fn new(title: &str, posted_by: &str) -> Self {
        Self {
            title: title.to_string(),
            company: String::new(),
            location: String::new(),
            employment_type: EmploymentType::FullTime,
            salary: String::new(),
            description: String::new(),
            requirements: Vec::new(),
            posted_by: posted_by.to_string(),
            deadline: None,
            status: JobStatus::Active,
        }
    }

    pub fn into_job(self, id: String, posted_date: NaiveDate) -> Job {
        Job {
            id,
            title: self.title,
            company: self.company,
            location: self.location,
            employment_type: self.employment_type,
            salary: self.salary,
            description: self.description,
            requirements: self.requirements,
            posted_by: self.posted_by,
            posted_date,
            deadline: self.deadline,
            status: self.status,
        }
    }
}

/// Field-level update for a job. `None` keeps the stored value.
/// `deadline` is doubly optional so it can be cleared with `Some(None)`.
///
/// `id`, `posted_by` and `posted_date` are not patchable.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub employment_type: Option<EmploymentType>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_deadline_patch"
    )]
    pub deadline: Option<Option<NaiveDate>>,
    pub status: Option<JobStatus>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, job: &mut Job) {
        if let Some(t) = self.title { job.title = t; }
        if let Some(c) = self.company { job.company = c; }
        if let Some(l) = self.location { job.location = l; }
        if let Some(e) = self.employment_type { job.employment_type = e; }
        if let Some(s) = self.salary { job.salary = s; }
        if let Some(d) = self.description { job.description = d; }
        if let Some(r) = self.requirements { job.requirements = r; }
        if let Some(d) = self.deadline { job.deadline = d; }
        if let Some(s) = self.status { job.status = s; }
    }
}

// ============================================================
// APPLICATION
// ============================================================

/// A jobseeker's submission against a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub applicant_id: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub cover_letter: String,
    pub applied_date: NaiveDate,
    pub status: ApplicationStatus,
}

/// Applicant identity plus cover letter for `JobStore::apply_to_job`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub applicant_id: String,
    pub applicant_name: String,
    pub applicant_email: String,
    #[serde(default)]
    pub cover_letter: String,
}

impl NewApplication {
    pub fn from_user(user: &CurrentUser, cover_letter: &str) -> Self {
        Self {
            applicant_id: user.id.clone(),
            applicant_name: user.name.clone(),
            applicant_email: user.email.clone(),
            cover_letter: cover_letter.trim().to_string(),
        }
    }

    pub fn into_application(self, id: String, job_id: &str, applied_date: NaiveDate) -> Application {
        Application {
            id,
            job_id: job_id.to_string(),
            applicant_id: self.applicant_id,
            applicant_name: self.applicant_name,
            applicant_email: self.applicant_email,
            cover_letter: self.cover_letter,
            applied_date,
            status: ApplicationStatus::Pending,
        }
    }
}

// ============================================================
// IDENTITY
// ============================================================

/// The signed-in user as reported by the session collaborator. Trusted as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> Job {
        NewJob {
            company: "TechCorp Inc.".to_string(),
            requirements: vec!["React".to_string()],
            ..NewJob::new("Senior React Developer", "emp1")
        }
        .into_job("1".to_string(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }

    #[test]
    fn test_job_serializes_with_client_field_names() {
        let value = serde_json::to_value(sample_job()).unwrap();
        assert_eq!(value["postedBy"], "emp1");
        assert_eq!(value["postedDate"], "2024-01-15");
        assert_eq!(value["type"], "full-time");
        assert_eq!(value["status"], "active");
        assert!(value.get("deadline").is_none());
    }

    #[test]
    fn test_job_parses_client_blob() {
        let raw = r#"{
            "id": "2", "title": "UX/UI Designer", "company": "DesignStudio",
            "location": "New York, NY", "type": "contract", "salary": "",
            "description": "", "requirements": ["Figma"], "postedBy": "emp2",
            "postedDate": "2024-01-10", "deadline": "2024-02-10", "status": "filled"
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.employment_type, EmploymentType::Contract);
        assert_eq!(job.status, JobStatus::Filled);
        assert_eq!(job.deadline, NaiveDate::from_ymd_opt(2024, 2, 10));
    }

    #[test]
    fn test_blank_deadline_reads_as_none() {
        let raw = r#"{
            "id": "3", "title": "QA Engineer", "company": "TestCo",
            "location": "Remote", "type": "remote", "salary": "",
            "description": "", "requirements": [], "postedBy": "emp3",
            "postedDate": "2024-01-12", "deadline": "", "status": "active"
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.deadline, None);

        let new_job: NewJob = serde_json::from_str(
            r#"{"title": "QA", "company": "TestCo", "location": "Remote",
                "type": "remote", "postedBy": "emp3", "deadline": null}"#,
        )
        .unwrap();
        assert_eq!(new_job.deadline, None);

        let bad: Result<Job, _> = serde_json::from_str(&raw.replace(r#""deadline": """#, r#""deadline": "soon""#));
        assert!(bad.is_err());
    }

    #[test]
    fn test_patch_deadline_absent_keeps_blank_clears() {
        let mut job = sample_job();
        job.deadline = NaiveDate::from_ymd_opt(2024, 3, 1);

        let untouched: JobPatch = serde_json::from_str(r#"{"title": "Lead"}"#).unwrap();
        assert_eq!(untouched.deadline, None);
        untouched.apply_to(&mut job);
        assert_eq!(job.deadline, NaiveDate::from_ymd_opt(2024, 3, 1));

        let moved: JobPatch = serde_json::from_str(r#"{"deadline": "2024-04-01"}"#).unwrap();
        moved.apply_to(&mut job);
        assert_eq!(job.deadline, NaiveDate::from_ymd_opt(2024, 4, 1));

        for body in [r#"{"deadline": ""}"#, r#"{"deadline": null}"#] {
            job.deadline = NaiveDate::from_ymd_opt(2024, 4, 1);
            let cleared: JobPatch = serde_json::from_str(body).unwrap();
            assert_eq!(cleared.deadline, Some(None));
            assert!(!cleared.is_empty());
            cleared.apply_to(&mut job);
            assert_eq!(job.deadline, None);
        }
    }

    #[test]
    fn test_patch_overwrites_only_present_fields() {
        let mut job = sample_job();
        let patch = JobPatch {
            title: Some("Staff React Developer".to_string()),
            status: Some(JobStatus::Closed),
            ..Default::default()
        };
        patch.apply_to(&mut job);
        assert_eq!(job.title, "Staff React Developer");
        assert_eq!(job.status, JobStatus::Closed);
        assert_eq!(job.company, "TechCorp Inc.");
        assert_eq!(job.posted_by, "emp1");
    }

    #[test]
    fn test_new_application_always_starts_pending() {
        let user = CurrentUser {
            id: "seeker1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::Jobseeker,
        };
        let app = NewApplication::from_user(&user, "  Hello  ")
            .into_application("10".to_string(), "1", NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.cover_letter, "Hello");
        assert_eq!(app.job_id, "1");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Employer"), Some(Role::Employer));
        assert_eq!(Role::parse("jobseeker"), Some(Role::Jobseeker));
        assert_eq!(Role::parse("admin"), None);
    }
}
