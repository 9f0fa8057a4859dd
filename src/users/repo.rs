use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::users::repo_types::User;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated on {field}")]
    Conflict { field: &'static str },

    #[error(transparent)]
    Store(sqlx::Error),
}

/// Column behind a UNIQUE constraint of the `users` table, if the constraint is one of ours.
fn conflict_field(constraint: Option<&str>) -> Option<&'static str> {
    match constraint? {
        "users_username_key" => Some("username"),
        "users_email_key" => Some("email"),
        _ => None,
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                if let Some(field) = conflict_field(db.constraint()) {
                    return RepoError::Conflict { field };
                }
            }
        }
        RepoError::Store(e)
    }
}

/// CRUD primitives over [`User`], keyed by id.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new row or overwrites every column of the row with the same id.
    async fn save(&self, user: User) -> Result<User, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    async fn find_all(&self) -> Result<Vec<User>, RepoError>;
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepoError>;
    /// Missing rows are ignored.
    async fn delete_by_id(&self, id: Uuid) -> Result<(), RepoError>;
}

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn save(&self, user: User) -> Result<User, RepoError> {
        let saved = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET username = EXCLUDED.username,
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                updated_at = EXCLUDED.updated_at
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await?;
        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepoError> {
        let exists: bool = sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)"#)
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(exists)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
