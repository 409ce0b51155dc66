use jobboard_core::persistence::{APPLICATIONS_KEY, JOBS_KEY};
use jobboard_core::{
    ApplicationStatus, EmploymentType, FileStorage, IdStrategy, JobPatch, JobStatus, JobStore,
    KeyValueStorage, NewApplication, NewJob, SqliteStorage, StoreOptions,
};
use tempfile::TempDir;

fn new_job(title: &str, employer: &str) -> NewJob {
    NewJob {
        company: format!("{} Co", employer),
        location: "Lisbon".to_string(),
        employment_type: EmploymentType::PartTime,
        requirements: vec!["Rust".to_string(), "SQL".to_string()],
        ..NewJob::new(title, employer)
    }
}

fn application(applicant: &str) -> NewApplication {
    NewApplication {
        applicant_id: applicant.to_string(),
        applicant_name: applicant.to_string(),
        applicant_email: format!("{}@example.com", applicant),
        cover_letter: "Hello".to_string(),
    }
}

fn file_store(dir: &TempDir) -> JobStore {
    let storage = FileStorage::new(dir.path()).unwrap();
    JobStore::open(Box::new(storage), StoreOptions::unseeded()).unwrap()
}

#[test]
fn test_file_backed_jobs_reload_in_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();

    let mut store = file_store(&dir);
    for (title, employer) in [("First", "e1"), ("Second", "e2"), ("Third", "e1")] {
        store.add_job(new_job(title, employer)).unwrap();
    }
    let second_id = store.jobs()[1].id.clone();
    store
        .update_job(&second_id, JobPatch::status(JobStatus::Filled))
        .unwrap();
    let expected = store.jobs().to_vec();
    drop(store);

    let reloaded = file_store(&dir);
    assert_eq!(reloaded.jobs(), expected.as_slice());
    assert_eq!(reloaded.jobs()[1].status, JobStatus::Filled);
}

#[test]
fn test_orphaned_applications_survive_reload() {
    let dir = tempfile::tempdir().unwrap();

    let mut store = file_store(&dir);
    let job = store.add_job(new_job("Doomed", "e1")).unwrap();
    let app = store.apply_to_job(&job.id, application("s1")).unwrap();
    store
        .update_application_status(&app.id, ApplicationStatus::Reviewed)
        .unwrap();
    store.delete_job(&job.id).unwrap();
    drop(store);

    let reloaded = file_store(&dir);
    assert!(reloaded.job(&job.id).is_none());
    let orphans = reloaded.applications_by_job(&job.id);
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].status, ApplicationStatus::Reviewed);
}

#[test]
fn test_sqlite_file_round_trip_with_uuid_ids() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("board.db");

    let open = || {
        let storage = SqliteStorage::new(Some(db_path.clone())).unwrap();
        let options = StoreOptions {
            seed_sample_jobs: true,
            ids: IdStrategy::Uuid.generator(),
        };
        JobStore::open(Box::new(storage), options).unwrap()
    };

    let mut store = open();
    assert_eq!(store.jobs().len(), 2);
    let added = store.add_job(new_job("Platform Engineer", "emp1")).unwrap();
    store.apply_to_job(&added.id, application("s9")).unwrap();
    store.apply_to_job(&added.id, application("s9")).unwrap();
    drop(store);

    let reloaded = open();
    assert_eq!(reloaded.jobs().len(), 3);
    assert_eq!(reloaded.jobs_by_employer("emp1").len(), 2);
    assert_eq!(reloaded.applications_by_applicant("s9").len(), 2);
}

#[test]
fn test_collections_are_saved_under_fixed_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = file_store(&dir);
    let job = store.add_job(new_job("Keyed", "e1")).unwrap();
    store.apply_to_job(&job.id, application("s1")).unwrap();

    let raw = FileStorage::new(dir.path()).unwrap();
    let jobs: serde_json::Value = serde_json::from_str(&raw.load(JOBS_KEY).unwrap().unwrap()).unwrap();
    let apps: serde_json::Value =
        serde_json::from_str(&raw.load(APPLICATIONS_KEY).unwrap().unwrap()).unwrap();

    assert_eq!(jobs[0]["postedBy"], "e1");
    assert_eq!(jobs[0]["type"], "part-time");
    assert_eq!(apps[0]["jobId"], job.id.as_str());
    assert_eq!(apps[0]["status"], "pending");
}
