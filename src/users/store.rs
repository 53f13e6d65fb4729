use async_trait::async_trait;
use thiserror::Error;

use super::model::{NewUser, RoleCounts, User, UserChanges};

/// Which unique column a write collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueField::Username => f.write_str("username"),
            UniqueField::Email => f.write_str("email"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(UniqueField),
    #[error("storage unavailable: {0:#}")]
    Unavailable(#[source] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                match db.constraint() {
                    Some("users_username_key") => return StoreError::Duplicate(UniqueField::Username),
                    Some("users_email_key") => return StoreError::Duplicate(UniqueField::Email),
                    _ => {}
                }
            }
        }
        StoreError::Unavailable(e.into())
    }
}

/// Persistence seam for users. Uniqueness must be enforced here, atomically.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    /// `Ok(None)` when no user has this id.
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Newest first.
    async fn list_newest_first(&self) -> Result<Vec<User>, StoreError>;
    async fn count_by_role(&self) -> Result<RoleCounts, StoreError>;
    /// `Ok(false)` when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}
