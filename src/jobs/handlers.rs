use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    jobs::{
        dto::{ApplyRequest, CreateJobRequest, JobFilters, JobPage},
        repo_types::{Application, Job},
        services,
    },
    response::ApiResponse,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/applications", get(my_applications))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs/create", post(create_job))
        .route("/jobs/apply", post(apply))
}

#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    ApiQuery(filters): ApiQuery<JobFilters>,
) -> Result<Json<ApiResponse<JobPage>>, AppError> {
    let page = services::list(&state, &filters)?;
    Ok(Json(ApiResponse::success(page)))
}

#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    Ok(Json(ApiResponse::success(services::get(&state, id)?)))
}

#[instrument(skip(state, payload), fields(title = %payload.title))]
pub async fn create_job(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateJobRequest>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let job = services::create(&state, payload)?;
    Ok(Json(ApiResponse::success(job)))
}

#[instrument(skip(state))]
pub async fn apply(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ApplyRequest>,
) -> Result<Json<ApiResponse<Application>>, AppError> {
    let application = services::apply(&state, payload.job_id)?;
    Ok(Json(ApiResponse::success(application)))
}

#[instrument(skip(state))]
pub async fn my_applications(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Application>>>, AppError> {
    Ok(Json(ApiResponse::success(services::my_applications(&state)?)))
}
