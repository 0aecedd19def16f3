use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::repo_types::PublicUser,
    error::AppError,
    extract::ApiJson,
    response::ApiResponse,
    state::AppState,
    users::{dto::ProfilePatch, services},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/profile", get(get_profile))
        .route("/users/update", post(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Result<Json<ApiResponse<PublicUser>>, AppError> {
    Ok(Json(ApiResponse::success(services::profile(&state)?)))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ProfilePatch>,
) -> Result<Json<ApiResponse<PublicUser>>, AppError> {
    Ok(Json(ApiResponse::success(services::update_profile(&state, payload)?)))
}
