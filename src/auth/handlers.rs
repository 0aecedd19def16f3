use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, DemoLoginRequest, LoginRequest, SessionStatus, SignupRequest},
        services,
    },
    error::AppError,
    extract::ApiJson,
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/auth/demo", post(demo_login))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let res = services::login(&state, &payload.email, &payload.password)?;
    Ok(Json(ApiResponse::success(res)))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let res = services::signup(&state, payload)?;
    Ok(Json(ApiResponse::success(res)))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Result<Json<ApiResponse<()>>, AppError> {
    services::logout(&state)?;
    Ok(Json(ApiResponse::success(())))
}

#[instrument(skip(state, payload))]
pub async fn demo_login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DemoLoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let res = services::demo_login(&state, payload.role)?;
    Ok(Json(ApiResponse::success(res)))
}

#[instrument(skip(state))]
pub async fn me(State(state): State<AppState>) -> Result<Json<ApiResponse<SessionStatus>>, AppError> {
    let user = services::current_user(&state)?;
    Ok(Json(ApiResponse::success(SessionStatus {
        logged_in: user.is_some(),
        user,
    })))
}
