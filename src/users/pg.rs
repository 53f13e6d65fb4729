use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::{
    model::{NewUser, RoleCounts, User, UserChanges},
    store::{StoreError, UserStore},
};

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    /// Create a new user; the unique constraints reject duplicates.
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET role = COALESCE($2, role),
                   password_hash = COALESCE($3, password_hash),
                   updated_at = now()
             WHERE id = $1
            RETURNING id, username, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.password_hash.as_deref())
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_newest_first(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count_by_role(&self) -> Result<RoleCounts, StoreError> {
        let counts = sqlx::query_as::<_, RoleCounts>(
            r#"
            SELECT COUNT(*)                                   AS total_users,
                   COUNT(*) FILTER (WHERE role = 'admin')     AS admin_count,
                   COUNT(*) FILTER (WHERE role = 'manager')   AS manager_count,
                   COUNT(*) FILTER (WHERE role = 'staff')     AS staff_count
            FROM users
            "#,
        )
        .fetch_one(&self.db)
        .await?;
        Ok(counts)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
