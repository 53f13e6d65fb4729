use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};

use super::{
    credentials::{to_public_view, CredentialManager},
    model::{PublicUser, User},
    store::UserStore,
    validation::{NewUserInput, UserChangesInput},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Account flows. Every write runs `validate -> hash -> persist` explicitly.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    credentials: CredentialManager,
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.store.clone(), state.credentials.clone())
    }
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, credentials: CredentialManager) -> Self {
        Self { store, credentials }
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: NewUserInput) -> AppResult<PublicUser> {
        let valid = self.credentials.validate_new_user(input)?;
        let creds = self.credentials.clone();
        let new_user = tokio::task::spawn_blocking(move || creds.before_create(valid)).await??;
        let user = self.store.insert(new_user).await?;
        info!(user_id = user.id, role = %user.role, "user registered");
        Ok(to_public_view(&user))
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.store.find_by_email(&email).await? else {
            let creds = self.credentials.clone();
            let candidate = password.to_string();
            tokio::task::spawn_blocking(move || creds.verify_absent(&candidate)).await?;
            warn!(%email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        };
        self.check_password(user, password).await
    }

    pub async fn find(&self, id: i64) -> AppResult<User> {
        self.store.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: UserChangesInput) -> AppResult<PublicUser> {
        let valid = self.credentials.validate_changes(input)?;
        let creds = self.credentials.clone();
        let changes = tokio::task::spawn_blocking(move || creds.before_update(valid)).await??;
        if changes.is_empty() {
            return Ok(to_public_view(&self.find(id).await?));
        }
        let password_changed = changes.password_hash.is_some();
        let user = self
            .store
            .update(id, changes)
            .await?
            .ok_or(AppError::NotFound)?;
        info!(user_id = id, role = %user.role, password_changed, "user updated");
        Ok(to_public_view(&user))
    }

    /// Requires the current password before setting a new one.
    #[instrument(skip(self, current, new))]
    pub async fn change_password(&self, id: i64, current: &str, new: String) -> AppResult<PublicUser> {
        let user = self.find(id).await?;
        self.check_password(user, current).await?;
        self.update(
            id,
            UserChangesInput {
                role: None,
                password: Some(new),
            },
        )
        .await
    }

    async fn check_password(&self, user: User, candidate: &str) -> AppResult<User> {
        let creds = self.credentials.clone();
        let candidate = candidate.to_string();
        let (user, ok) = tokio::task::spawn_blocking(move || {
            let ok = creds.verify_password(&user, &candidate);
            (user, ok)
        })
        .await?;
        if !ok? {
            warn!(user_id = user.id, "invalid password");
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }
}
