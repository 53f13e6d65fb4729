use std::sync::Arc;

use axum::extract::FromRef;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{
        credentials::to_public_view,
        model::{PublicUser, RoleCounts},
        store::UserStore,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    pub total_users: i64,
    pub admin_count: i64,
    pub manager_count: i64,
    pub staff_count: i64,
}

impl From<RoleCounts> for DashboardStatistics {
    fn from(c: RoleCounts) -> Self {
        Self {
            total_users: c.total_users,
            admin_count: c.admin_count,
            manager_count: c.manager_count,
            staff_count: c.staff_count,
        }
    }
}

/// Admin-only operations. Callers must already have checked the admin role.
#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn UserStore>,
}

impl FromRef<AppState> for AdminService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.store.clone())
    }
}

impl AdminService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn dashboard_statistics(&self) -> AppResult<DashboardStatistics> {
        Ok(self.store.count_by_role().await?.into())
    }

    /// Every user, newest first, password stripped.
    #[instrument(skip(self))]
    pub async fn list_all_users(&self) -> AppResult<Vec<PublicUser>> {
        let users = self.store.list_newest_first().await?;
        Ok(users.iter().map(to_public_view).collect())
    }

    /// Hard delete. An admin can never remove their own account here.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, acting_user_id: i64, target_user_id: i64) -> AppResult<()> {
        if acting_user_id == target_user_id {
            return Err(AppError::SelfDeletionForbidden);
        }
        if self.store.find_by_id(target_user_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        // Lost a race with another delete.
        if !self.store.delete(target_user_id).await? {
            return Err(AppError::NotFound);
        }
        info!(acting_user_id, target_user_id, "user deleted");
        Ok(())
    }
}
