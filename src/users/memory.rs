use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{
    model::{NewUser, Role, RoleCounts, User, UserChanges},
    store::{StoreError, UniqueField, UserStore},
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
}

/// `UserStore` backed by a `Vec`, with the same uniqueness rules as the table.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }
        inner.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: inner.next_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(row) = inner.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(role) = changes.role {
            row.role = role;
        }
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash;
        }
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows = inner.users.clone();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn count_by_role(&self) -> Result<RoleCounts, StoreError> {
        let inner = self.inner.read().await;
        let count = |role: Role| inner.users.iter().filter(|u| u.role == role).count() as i64;
        Ok(RoleCounts {
            total_users: inner.users.len() as i64,
            admin_count: count(Role::Admin),
            manager_count: count(Role::Manager),
            staff_count: count(Role::Staff),
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() < before)
    }
}

/// Store whose every call fails, for exercising the 500 paths.
pub struct BrokenUserStore;

impl BrokenUserStore {
    fn err() -> StoreError {
        StoreError::Unavailable(anyhow::anyhow!("connection refused (test)"))
    }
}

#[async_trait]
impl UserStore for BrokenUserStore {
    async fn insert(&self, _user: NewUser) -> Result<User, StoreError> {
        Err(Self::err())
    }
    async fn update(&self, _id: i64, _changes: UserChanges) -> Result<Option<User>, StoreError> {
        Err(Self::err())
    }
    async fn find_by_id(&self, _id: i64) -> Result<Option<User>, StoreError> {
        Err(Self::err())
    }
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(Self::err())
    }
    async fn list_newest_first(&self) -> Result<Vec<User>, StoreError> {
        Err(Self::err())
    }
    async fn count_by_role(&self) -> Result<RoleCounts, StoreError> {
        Err(Self::err())
    }
    async fn delete(&self, _id: i64) -> Result<bool, StoreError> {
        Err(Self::err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, role: Role) -> NewUser {
        NewUser {
            username: name.into(),
            email: format!("{name}@example.com"),
            password_hash: "$argon2id$fake".into(),
            role,
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_username_and_email() {
        let store = MemoryUserStore::new();
        store.insert(new_user("gina", Role::Staff)).await.unwrap();

        let mut dup_name = new_user("gina", Role::Staff);
        dup_name.email = "other@example.com".into();
        assert!(matches!(
            store.insert(dup_name).await,
            Err(StoreError::Duplicate(UniqueField::Username))
        ));

        let mut dup_email = new_user("gina2", Role::Staff);
        dup_email.email = "gina@example.com".into();
        assert!(matches!(
            store.insert(dup_email).await,
            Err(StoreError::Duplicate(UniqueField::Email))
        ));
        assert_eq!(store.count_by_role().await.unwrap().total_users, 1);
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryUserStore::new();
        for name in ["one", "two", "three"] {
            store.insert(new_user(name, Role::Staff)).await.unwrap();
        }
        let names: Vec<_> = store
            .list_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, ["three", "two", "one"]);
    }

    #[tokio::test]
    async fn update_missing_user_is_none() {
        let store = MemoryUserStore::new();
        let out = store
            .update(42, UserChanges { role: Some(Role::Admin), password_hash: None })
            .await
            .unwrap();
        assert!(out.is_none());
    }
}
