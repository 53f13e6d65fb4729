use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, ChangePasswordRequest, LoginRequest, MeResponse},
        extract::JsonBody,
        jwt::{AuthUser, JwtKeys},
    },
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
    users::{
        credentials::to_public_view, service::UserService, validation::NewUserInput,
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/password", put(change_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

fn sign(state: &AppState, user_id: i64) -> AppResult<String> {
    JwtKeys::from_ref(state).sign_access(user_id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        AppError::Internal(e)
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewUserInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let user = UserService::from_ref(&state).register(payload).await?;
    let token = sign(&state, user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            AuthResponse { token, user },
            "User registered successfully",
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let user = UserService::from_ref(&state)
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = sign(&state, user.id)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(ApiResponse::with_message(
        AuthResponse {
            token,
            user: to_public_view(&user),
        },
        "Login successful",
    )))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ApiResponse<MeResponse>>> {
    let user = match UserService::from_ref(&state).find(user_id).await {
        Ok(u) => u,
        Err(AppError::NotFound) => return Err(AppError::Unauthorized("User not found")),
        Err(e) => return Err(e),
    };
    Ok(Json(ApiResponse::success(MeResponse {
        user: to_public_view(&user),
    })))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    UserService::from_ref(&state)
        .change_password(user_id, &payload.current_password, payload.new_password)
        .await?;
    Ok(Json(ApiResponse::message("Password updated successfully")))
}
