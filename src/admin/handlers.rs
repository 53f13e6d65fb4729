use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    admin::service::{AdminService, DashboardStatistics},
    auth::jwt::AdminUser,
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
    users::model::PublicUser,
};

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub statistics: DashboardStatistics,
}

#[derive(Debug, Serialize)]
pub struct UsersData {
    pub users: Vec<PublicUser>,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(get_dashboard))
        .route("/admin/users", get(get_all_users))
        .route("/admin/users/:user_id", delete(delete_user))
}

#[instrument(skip(admin, _acting))]
pub async fn get_dashboard(
    State(admin): State<AdminService>,
    _acting: AdminUser,
) -> AppResult<Json<ApiResponse<DashboardData>>> {
    let statistics = admin.dashboard_statistics().await?;
    Ok(Json(ApiResponse::with_message(
        DashboardData { statistics },
        "Dashboard data retrieved successfully",
    )))
}

#[instrument(skip(admin, _acting))]
pub async fn get_all_users(
    State(admin): State<AdminService>,
    _acting: AdminUser,
) -> AppResult<Json<ApiResponse<UsersData>>> {
    let users = admin.list_all_users().await?;
    Ok(Json(ApiResponse::success(UsersData { users })))
}

/// A non-numeric id can't name a user, so it is a 404 like any other miss.
#[instrument(skip(admin, acting), fields(acting_user_id = acting.0.id))]
pub async fn delete_user(
    State(admin): State<AdminService>,
    acting: AdminUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let target: i64 = user_id.trim().parse().map_err(|_| AppError::NotFound)?;
    admin.delete_user(acting.0.id, target).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}
