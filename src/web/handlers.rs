//! HTTP request handlers module
//!
//! Thin translation layer between Actix extractors and `web::repository::AppState`
//! (spec §6's REST surface). Auth handlers are unchanged from the teacher
//! besides the user store source; the job/schedule/reschedule handlers are
//! new.

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, HttpMessage};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use chrono::Utc;
use tracing::{error, info};

use crate::domain::entities::{Job, JobId, ResourceId, UnavailabilityId};
use crate::presentation::dto::job_dto::{
    CreateJobRequest, DragScheduleRequest, JobIdResponse, ListJobsQuery, ManualScheduleRequest,
    ScheduleAllQuery, SchedulingFailureBody, UpdateJobRequest,
};
use crate::presentation::dto::reschedule_dto::{
    BulkUnavailableRequest, MarkResourceUnavailableRequest, RescheduleResultResponse,
    RescheduleUnavailabilityRequest,
};
use crate::presentation::dto::schedule_dto::{BatchScheduleResponse, JobScheduledResponse, ScheduleEntryResponse};
use crate::web::auth::{AuthService, Claims, LoginAttemptTracker, UserStore};
use crate::web::config::WebConfig;
use crate::web::models::{ApiResponse, AuthType, EntraIdAuthRequest, LoginRequest, LoginResponse, UserInfo};
use crate::web::repository::AppState;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success("OK"))
}

pub async fn login(
    request: web::Json<LoginRequest>,
    config: web::Data<WebConfig>,
    user_store: web::Data<Arc<UserStore>>,
    login_tracker: web::Data<Arc<LoginAttemptTracker>>,
) -> HttpResponse {
    if login_tracker.is_locked_out(&request.username) {
        let remaining_minutes = login_tracker
            .get_lockout_remaining_minutes(&request.username)
            .unwrap_or(config.lockout_duration_minutes as i64);

        return HttpResponse::TooManyRequests().json(ApiResponse::<()>::error(format!(
            "Account locked due to too many failed login attempts. Please try again in {} minutes.",
            remaining_minutes
        )));
    }

    if !user_store.verify_user(&request.username, &request.password) {
        let remaining_attempts = login_tracker.record_failed_attempt(&request.username);

        return if remaining_attempts == 0 {
            HttpResponse::TooManyRequests().json(ApiResponse::<()>::error(format!(
                "Account locked due to too many failed login attempts. Please try again in {} minutes.",
                config.lockout_duration_minutes
            )))
        } else {
            HttpResponse::Unauthorized().json(ApiResponse::<()>::error(format!(
                "Invalid username or password. {} attempts remaining.",
                remaining_attempts
            )))
        };
    }

    login_tracker.reset_attempts(&request.username);

    let user = UserInfo {
        username: request.username.clone(),
        display_name: request.username.clone(),
        auth_type: AuthType::Local,
    };

    let auth_service = AuthService::new(config.jwt_secret.clone());
    match auth_service.generate_token(&user) {
        Ok(token) => HttpResponse::Ok().json(ApiResponse::success(LoginResponse { token, user })),
        Err(_) => HttpResponse::InternalServerError().json(ApiResponse::<()>::error("Failed to generate token".to_string())),
    }
}

pub async fn entra_id_callback(request: web::Json<EntraIdAuthRequest>, config: web::Data<WebConfig>) -> HttpResponse {
    if !config.enable_entra_id {
        return HttpResponse::BadRequest().json(ApiResponse::<()>::error("Entra ID authentication is not enabled".to_string()));
    }

    let user = UserInfo {
        username: format!("entra_user_{}", &request.code[..8.min(request.code.len())]),
        display_name: "Entra ID User".to_string(),
        auth_type: AuthType::EntraId,
    };

    let auth_service = AuthService::new(config.jwt_secret.clone());
    match auth_service.generate_token(&user) {
        Ok(token) => HttpResponse::Ok().json(ApiResponse::success(LoginResponse { token, user })),
        Err(_) => HttpResponse::InternalServerError().json(ApiResponse::<()>::error("Failed to generate token".to_string())),
    }
}

pub async fn get_current_user(req: HttpRequest) -> HttpResponse {
    if let Some(claims) = req.extensions().get::<Claims>() {
        let user = UserInfo {
            username: claims.username.clone(),
            display_name: claims.display_name.clone(),
            auth_type: claims.auth_type.clone(),
        };
        HttpResponse::Ok().json(ApiResponse::success(user))
    } else {
        HttpResponse::Unauthorized().json(ApiResponse::<()>::error("Unauthorized".to_string()))
    }
}

fn job_not_found(id: JobId) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(format!("job {id} not found")))
}

fn internal_error(err: anyhow::Error) -> HttpResponse {
    error!("scheduler storage error: {err:#}");
    HttpResponse::InternalServerError().json(ApiResponse::<()>::error(err.to_string()))
}

fn scheduling_failure(err: &crate::application::errors::SchedulingError) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ApiResponse::success(SchedulingFailureBody {
        failure_reason: err.to_string(),
        failure_details: err.failure_details(),
    }))
}

/// `GET /api/jobs[?includeCompleted]`
pub async fn list_jobs(state: web::Data<Arc<AppState>>, query: web::Query<ListJobsQuery>, _auth: BearerAuth) -> HttpResponse {
    match state.list_jobs(query.include_completed) {
        Ok(jobs) => HttpResponse::Ok().json(ApiResponse::success(jobs)),
        Err(e) => internal_error(e),
    }
}

/// `POST /api/jobs`
pub async fn create_job(state: web::Data<Arc<AppState>>, body: web::Json<CreateJobRequest>, _auth: BearerAuth) -> HttpResponse {
    let req = body.into_inner();
    let now = Utc::now();
    let mut job = Job::new(req.job_number, req.part_number, req.customer, now);
    job.quantity = req.quantity;
    job.promised_date = req.promised_date;
    job.due_date = req.due_date;
    job.order_date = req.order_date;
    job.lead_days = req.lead_days;
    job.requires_material = req.requires_material;
    job.outsource_vendor = req.outsource_vendor;
    job.priority = req.priority;
    job.routing = req.routing;

    match state.create_job(job.clone()) {
        Ok(()) => HttpResponse::Created().json(ApiResponse::success(JobIdResponse { job_id: job.id })),
        Err(e) => internal_error(e),
    }
}

/// `PUT /api/jobs/:id`
pub async fn update_job(
    state: web::Data<Arc<AppState>>,
    path: web::Path<JobId>,
    body: web::Json<UpdateJobRequest>,
    _auth: BearerAuth,
) -> HttpResponse {
    let job_id = path.into_inner();
    let existing = match state.get_job(job_id) {
        Ok(Some(job)) => job,
        Ok(None) => return job_not_found(job_id),
        Err(e) => return internal_error(e),
    };

    let req = body.into_inner();
    let mut job = existing;
    if let Some(v) = req.part_number {
        job.part_number = v;
    }
    if let Some(v) = req.customer {
        job.customer = v;
    }
    if let Some(v) = req.quantity {
        job.quantity = v;
    }
    if let Some(v) = req.promised_date {
        job.promised_date = v;
    }
    if let Some(v) = req.due_date {
        job.due_date = v;
    }
    if let Some(v) = req.lead_days {
        job.lead_days = v;
    }
    if let Some(v) = req.requires_material {
        job.requires_material = v;
    }
    if req.outsource_vendor.is_some() {
        job.outsource_vendor = req.outsource_vendor;
    }
    if req.priority.is_some() {
        job.priority = req.priority;
    }
    if let Some(v) = req.routing {
        job.routing = v;
    }

    match state.update_job(job) {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::success(JobIdResponse { job_id })),
        Err(e) => internal_error(e),
    }
}

/// `DELETE /api/jobs/:id`
pub async fn delete_job(state: web::Data<Arc<AppState>>, path: web::Path<JobId>, _auth: BearerAuth) -> HttpResponse {
    match state.delete_job(path.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => internal_error(e),
    }
}

/// `DELETE /api/jobs` (bulk)
pub async fn delete_all_jobs(state: web::Data<Arc<AppState>>, _auth: BearerAuth) -> HttpResponse {
    match state.delete_all_jobs() {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => internal_error(e),
    }
}

/// `POST /api/jobs/import`
pub async fn import_jobs(state: web::Data<Arc<AppState>>, body: web::Bytes, _auth: BearerAuth) -> HttpResponse {
    let jobs = match crate::infrastructure::csv_import::import_jobs(body.as_ref()) {
        Ok(jobs) => jobs,
        Err(e) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(format!("invalid CSV: {e:#}")));
        }
    };
    match state.import_jobs(jobs) {
        Ok(count) => {
            info!("imported {count} jobs from CSV");
            HttpResponse::Ok().json(ApiResponse::success(count))
        }
        Err(e) => internal_error(e),
    }
}

/// `POST /api/jobs/:id/auto-schedule`
pub async fn auto_schedule_job(state: web::Data<Arc<AppState>>, path: web::Path<JobId>, _auth: BearerAuth) -> HttpResponse {
    let job_id = path.into_inner();
    match state.auto_schedule_job(job_id, Utc::now(), &state.progress_sink()) {
        Ok(Ok(entries)) => HttpResponse::Ok().json(ApiResponse::success(JobScheduledResponse {
            job_id,
            entries: entries.iter().map(ScheduleEntryResponse::from).collect(),
        })),
        Ok(Err(err)) => scheduling_failure(&err),
        Err(e) => internal_error(e),
    }
}

/// `POST /api/jobs/:id/manual-schedule`
pub async fn manual_schedule_job(
    state: web::Data<Arc<AppState>>,
    path: web::Path<JobId>,
    body: web::Json<ManualScheduleRequest>,
    _auth: BearerAuth,
) -> HttpResponse {
    let job_id = path.into_inner();
    match state.manual_schedule_job(job_id, body.start_date, Utc::now(), &state.progress_sink()) {
        Ok(Ok(entries)) => HttpResponse::Ok().json(ApiResponse::success(JobScheduledResponse {
            job_id,
            entries: entries.iter().map(ScheduleEntryResponse::from).collect(),
        })),
        Ok(Err(err)) => scheduling_failure(&err),
        Err(e) => internal_error(e),
    }
}

/// `POST /api/jobs/:id/drag-schedule`
pub async fn drag_schedule_job(
    state: web::Data<Arc<AppState>>,
    path: web::Path<JobId>,
    body: web::Json<DragScheduleRequest>,
    _auth: BearerAuth,
) -> HttpResponse {
    let job_id = path.into_inner();
    let req = body.into_inner();
    match state.drag_schedule_job(job_id, req.machine_id, req.start_date, req.shift, Utc::now(), &state.progress_sink()) {
        Ok(Ok(entries)) => HttpResponse::Ok().json(ApiResponse::success(JobScheduledResponse {
            job_id,
            entries: entries.iter().map(ScheduleEntryResponse::from).collect(),
        })),
        Ok(Err(err)) => scheduling_failure(&err),
        Err(e) => internal_error(e),
    }
}

/// `POST /api/jobs/schedule-all[?maxJobs=N]`
pub async fn schedule_all(state: web::Data<Arc<AppState>>, query: web::Query<ScheduleAllQuery>, _auth: BearerAuth) -> HttpResponse {
    match state.schedule_all(query.max_jobs, Utc::now(), &state.progress_sink()) {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::success(BatchScheduleResponse::from(&result))),
        Err(e) => internal_error(e),
    }
}

/// `DELETE /api/schedule/all`
pub async fn clear_all_schedule_entries(state: web::Data<Arc<AppState>>, _auth: BearerAuth) -> HttpResponse {
    match state.clear_all_schedule_entries() {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => internal_error(e),
    }
}

/// `POST /api/reschedule/unavailability`
pub async fn reschedule_unavailability(
    state: web::Data<Arc<AppState>>,
    body: web::Json<RescheduleUnavailabilityRequest>,
    _auth: BearerAuth,
) -> HttpResponse {
    let request = body.into_inner().into();
    match state.reschedule_unavailability(request, Utc::now()) {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::success(RescheduleResultResponse::from(&result))),
        Err(e) => internal_error(e),
    }
}

/// `POST /api/resources/:id/mark-unavailable`
pub async fn mark_resource_unavailable(
    state: web::Data<Arc<AppState>>,
    path: web::Path<ResourceId>,
    body: web::Json<MarkResourceUnavailableRequest>,
    _auth: BearerAuth,
) -> HttpResponse {
    let resource_id = path.into_inner();
    let unavailability = body.into_inner().into_domain(resource_id);
    match state.mark_resource_unavailable(unavailability) {
        Ok(()) => HttpResponse::Created().finish(),
        Err(e) => internal_error(e),
    }
}

/// `POST /api/resources/bulk-unavailable`
pub async fn bulk_mark_unavailable(
    state: web::Data<Arc<AppState>>,
    body: web::Json<BulkUnavailableRequest>,
    _auth: BearerAuth,
) -> HttpResponse {
    let req = body.into_inner();
    for resource_id in &req.resource_ids {
        let unavailability = req.unavailability.clone().into_domain(*resource_id);
        if let Err(e) = state.mark_resource_unavailable(unavailability) {
            return internal_error(e);
        }
    }
    HttpResponse::Created().finish()
}

/// `DELETE /api/resources/unavailable/:id`
pub async fn delete_unavailability(state: web::Data<Arc<AppState>>, path: web::Path<UnavailabilityId>, _auth: BearerAuth) -> HttpResponse {
    match state.delete_unavailability(path.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => internal_error(e),
    }
}
