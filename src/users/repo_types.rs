use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: Uuid,                            // assigned by the service, never changes
    pub username: String,                    // unique
    pub email: String,                       // unique
    pub password_hash: String,               // Argon2 PHC string
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,  // None until the first update
}
