//! Web API Module
//!
//! RESTful endpoints for the Job Board frontend. All endpoints return the
//! `ApiResponse` JSON envelope. Caller identity comes from trusted headers
//! (see `identity`); there is no authentication here.

use crate::config::ServerConfig;
use crate::identity::{self, IdentityError};
use actix_cors::Cors;
use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use chrono::NaiveDate;
use jobboard_core::{
    ApplicationStatus, EmploymentType, JobPatch, JobSearch, JobStore, NewApplication, NewJob, Role,
    StoreError,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

// ============================================================
// APPLICATION STATE
// ============================================================

/// Shared application state
pub struct AppState {
    pub store: Mutex<JobStore>,
}

impl AppState {
    pub fn new(store: JobStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, JobStore>, HttpResponse> {
        self.store.lock().map_err(|_| {
            log::error!("[api] Job store lock poisoned");
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error("Job store unavailable"))
        })
    }
}

// ============================================================
// API REQUEST/RESPONSE TYPES
// ============================================================

#[derive(Deserialize)]
pub struct JobsQuery {
    pub q: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub employment_type: Option<String>,
    /// Return every job regardless of status and filters
    pub all: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    /// Defaults to the employer's display name
    pub company: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default = "default_employment_type")]
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default, deserialize_with = "jobboard_core::deserialize_optional_date")]
    pub deadline: Option<NaiveDate>,
}

fn default_employment_type() -> EmploymentType {
    EmploymentType::FullTime
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[serde(default)]
    pub cover_letter: String,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerStatsResponse {
    pub job_count: usize,
    pub applications: jobboard_core::ApplicationStats,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: jobboard_core::BoardSummary,
    pub locations: Vec<String>,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: &str) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
        }
    }
}

fn store_failure(e: StoreError) -> HttpResponse {
    log::error!("[api] Store operation failed: {}", e);
    HttpResponse::InternalServerError().json(ApiResponse::<()>::error(&e.to_string()))
}

fn identity_failure(e: IdentityError) -> HttpResponse {
    let body = ApiResponse::<()>::error(&e.to_string());
    match e {
        IdentityError::WrongRole(_) => HttpResponse::Forbidden().json(body),
        _ => HttpResponse::Unauthorized().json(body),
    }
}

fn not_found(what: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(&format!("{} not found", what)))
}

fn json_body_failure(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("[api] Rejected body for {}: {}", req.path(), err);
    let resp = HttpResponse::BadRequest().json(ApiResponse::<()>::error(&format!("Invalid request body: {}", err)));
    InternalError::from_response(err, resp).into()
}

fn query_failure(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("[api] Rejected query for {}: {}", req.path(), err);
    let resp = HttpResponse::BadRequest().json(ApiResponse::<()>::error(&format!("Invalid query string: {}", err)));
    InternalError::from_response(err, resp).into()
}

// ============================================================
// API HANDLERS
// ============================================================

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "Job Board API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List jobs: active ones matching the filters, or everything with `all=true`
async fn list_jobs(data: web::Data<Arc<AppState>>, query: web::Query<JobsQuery>) -> HttpResponse {
    let query = query.into_inner();

    let employment_type = match query.employment_type.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => match EmploymentType::parse(raw) {
            Some(t) => Some(t),
            None => {
                return HttpResponse::BadRequest()
                    .json(ApiResponse::<()>::error(&format!("Unknown job type: {}", raw)));
            }
        },
        None => None,
    };

    let store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    if query.all.unwrap_or(false) {
        return HttpResponse::Ok().json(ApiResponse::success(store.jobs()));
    }

    let search = JobSearch {
        query: query.q.unwrap_or_default(),
        location: query.location.unwrap_or_default(),
        employment_type,
    };
    HttpResponse::Ok().json(ApiResponse::success(store.search_jobs(&search)))
}

/// Post a new job as the calling employer
async fn create_job(
    data: web::Data<Arc<AppState>>,
    http: HttpRequest,
    req: web::Json<CreateJobRequest>,
) -> HttpResponse {
    let user = match identity::require_role(&http, Role::Employer) {
        Ok(u) => u,
        Err(e) => return identity_failure(e),
    };
    let req = req.into_inner();

    let new_job = NewJob {
        title: req.title,
        company: req.company.unwrap_or_else(|| user.name.clone()),
        location: req.location,
        employment_type: req.employment_type,
        salary: req.salary,
        description: req.description,
        requirements: req.requirements,
        posted_by: user.id,
        deadline: req.deadline,
        status: Default::default(),
    };

    let mut store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.add_job(new_job) {
        Ok(job) => HttpResponse::Created().json(ApiResponse::success(job)),
        Err(e) => store_failure(e),
    }
}

async fn get_job(data: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let job_id = path.into_inner();
    let store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.job(&job_id) {
        Some(job) => HttpResponse::Ok().json(ApiResponse::success(job)),
        None => not_found("Job"),
    }
}

async fn update_job(
    data: web::Data<Arc<AppState>>,
    http: HttpRequest,
    path: web::Path<String>,
    req: web::Json<JobPatch>,
) -> HttpResponse {
    if let Err(e) = identity::require_role(&http, Role::Employer) {
        return identity_failure(e);
    }
    let job_id = path.into_inner();

    let mut store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.update_job(&job_id, req.into_inner()) {
        Ok(Some(job)) => HttpResponse::Ok().json(ApiResponse::success(job)),
        Ok(None) => not_found("Job"),
        Err(e) => store_failure(e),
    }
}

/// Delete a job. Applications to it are left in place.
async fn delete_job(
    data: web::Data<Arc<AppState>>,
    http: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    if let Err(e) = identity::require_role(&http, Role::Employer) {
        return identity_failure(e);
    }
    let job_id = path.into_inner();

    let mut store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.delete_job(&job_id) {
        Ok(Some(job)) => HttpResponse::Ok().json(ApiResponse::success(job)),
        Ok(None) => not_found("Job"),
        Err(e) => store_failure(e),
    }
}

/// Apply to a job as the calling jobseeker. Repeat applications are accepted.
async fn apply_to_job(
    data: web::Data<Arc<AppState>>,
    http: HttpRequest,
    path: web::Path<String>,
    req: web::Json<ApplyRequest>,
) -> HttpResponse {
    let user = match identity::require_role(&http, Role::Jobseeker) {
        Ok(u) => u,
        Err(e) => return identity_failure(e),
    };
    let job_id = path.into_inner();

    let mut store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    if store.job(&job_id).is_none() {
        return not_found("Job");
    }
    if store.has_applied(&job_id, &user.id) {
        log::info!("[api] {} is applying to job {} again", user.id, job_id);
    }

    match store.apply_to_job(&job_id, NewApplication::from_user(&user, &req.cover_letter)) {
        Ok(application) => HttpResponse::Created().json(ApiResponse::success(application)),
        Err(e) => store_failure(e),
    }
}

async fn job_applications(data: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let job_id = path.into_inner();
    let store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(ApiResponse::success(store.applications_by_job(&job_id)))
}

async fn employer_jobs(data: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let employer_id = path.into_inner();
    let store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(ApiResponse::success(store.jobs_by_employer(&employer_id)))
}

async fn employer_applications(data: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let employer_id = path.into_inner();
    let store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(ApiResponse::success(store.applications_for_employer(&employer_id)))
}

async fn employer_stats(data: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let employer_id = path.into_inner();
    let store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(ApiResponse::success(EmployerStatsResponse {
        job_count: store.jobs_by_employer(&employer_id).len(),
        applications: store.employer_stats(&employer_id),
    }))
}

async fn applicant_applications(data: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let applicant_id = path.into_inner();
    let store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(ApiResponse::success(store.applications_by_applicant(&applicant_id)))
}

async fn applicant_stats(data: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let applicant_id = path.into_inner();
    let store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(ApiResponse::success(store.applicant_stats(&applicant_id)))
}

/// Set an application's status. Any status may follow any other.
async fn update_application_status(
    data: web::Data<Arc<AppState>>,
    http: HttpRequest,
    path: web::Path<String>,
    req: web::Json<StatusRequest>,
) -> HttpResponse {
    if let Err(e) = identity::require_role(&http, Role::Employer) {
        return identity_failure(e);
    }
    let application_id = path.into_inner();

    let mut store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.update_application_status(&application_id, req.status) {
        Ok(Some(application)) => HttpResponse::Ok().json(ApiResponse::success(application)),
        Ok(None) => not_found("Application"),
        Err(e) => store_failure(e),
    }
}

async fn board_summary(data: web::Data<Arc<AppState>>) -> HttpResponse {
    let store = match data.lock_store() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(ApiResponse::success(SummaryResponse {
        summary: store.board_summary(),
        locations: store.distinct_locations(),
    }))
}

// ============================================================
// SERVER CONFIGURATION
// ============================================================

/// Register every route on an app or test service. Malformed bodies and
/// query strings are answered with the `ApiResponse` envelope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_body_failure))
        .app_data(web::QueryConfig::default().error_handler(query_failure))
        .route("/health", web::get().to(health_check))
        .route("/api/jobs", web::get().to(list_jobs))
        .route("/api/jobs", web::post().to(create_job))
        .route("/api/jobs/apply/{job_id}", web::post().to(apply_to_job))
        .route("/api/jobs/{job_id}", web::get().to(get_job))
        .route("/api/jobs/{job_id}", web::put().to(update_job))
        .route("/api/jobs/{job_id}", web::delete().to(delete_job))
        .route("/api/jobs/{job_id}/applications", web::get().to(job_applications))
        .route("/api/employers/{employer_id}/jobs", web::get().to(employer_jobs))
        .route("/api/employers/{employer_id}/applications", web::get().to(employer_applications))
        .route("/api/employers/{employer_id}/stats", web::get().to(employer_stats))
        .route("/api/applicants/{applicant_id}/applications", web::get().to(applicant_applications))
        .route("/api/applicants/{applicant_id}/stats", web::get().to(applicant_stats))
        .route("/api/applications/{application_id}/status", web::put().to(update_application_status))
        .route("/api/summary", web::get().to(board_summary));
}

/// Configure and run the API server
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let store = config
        .open_store()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let state = Arc::new(AppState::new(store));

    log::info!("Job Board API starting at http://{}:{}", config.host, config.port);
    log::info!("Storage: {:?}, ids: {:?}", config.storage, config.id_strategy);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
