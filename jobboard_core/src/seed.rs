//! Sample postings written on first start when no jobs blob exists.

use crate::types::{EmploymentType, Job, JobStatus};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn sample_jobs() -> Vec<Job> {
    vec![
        Job {
            id: "1".to_string(),
            title: "Senior React Developer".to_string(),
            company: "TechCorp Inc.".to_string(),
            location: "San Francisco, CA".to_string(),
            employment_type: EmploymentType::FullTime,
            salary: "₹100,000 - ₹150,000".to_string(),
            description: "We are looking for a senior React developer to join our team...".to_string(),
            requirements: strings(&["React", "TypeScript", "Node.js", "5+ years experience"]),
            posted_by: "emp1".to_string(),
            posted_date: date(2024, 1, 15),
            deadline: Some(date(2024, 2, 15)),
            status: JobStatus::Active,
        },
        Job {
            id: "2".to_string(),
            title: "UX/UI Designer".to_string(),
            company: "DesignStudio".to_string(),
            location: "New York, NY".to_string(),
            employment_type: EmploymentType::Contract,
            salary: "₹75,000 - ₹90,000".to_string(),
            description: "Join our creative team as a UX/UI designer...".to_string(),
            requirements: strings(&["Figma", "Adobe Creative Suite", "User Research", "3+ years experience"]),
            posted_by: "emp2".to_string(),
            posted_date: date(2024, 1, 10),
            deadline: Some(date(2024, 2, 10)),
            status: JobStatus::Active,
        },
    ]
}
