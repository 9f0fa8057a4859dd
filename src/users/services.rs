use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::{
    dto::{CreateUserRequest, UpdateUserRequest},
    password::hash_password,
    repo::UserRepository,
    repo_types::User,
};

pub type Result<T> = std::result::Result<T, ApiError>;

fn parse_user_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| ApiError::InvalidId(id.to_string()))
}

/// Business rules over the user store. Ids and timestamps are assigned here, not by the store.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> Result<Uuid> {
        let user = User {
            id: Uuid::new_v4(),
            username: req.username,
            email: req.email,
            password_hash: hash_password(&req.password)?,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        let saved = self.repo.save(user).await?;
        info!(user_id = %saved.id, username = %saved.username, "user created");
        Ok(saved.id)
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let id = parse_user_id(id)?;
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.repo.find_all().await?)
    }

    /// Returns `false` when no user has this id; nothing is written in that case.
    pub async fn update_user_by_id(&self, id: &str, req: UpdateUserRequest) -> Result<bool> {
        let id = parse_user_id(id)?;
        let Some(mut user) = self.repo.find_by_id(id).await? else {
            debug!(user_id = %id, "update skipped, user not found");
            return Ok(false);
        };

        if let Some(username) = req.username {
            user.username = username;
        }
        if let Some(password) = req.password {
            user.password_hash = hash_password(&password)?;
        }
        user.updated_at = Some(OffsetDateTime::now_utc().max(user.created_at));

        self.repo.save(user).await?;
        info!(user_id = %id, "user updated");
        Ok(true)
    }

    /// Returns `false` when no user has this id.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let id = parse_user_id(id)?;
        if !self.repo.exists_by_id(id).await? {
            debug!(user_id = %id, "delete skipped, user not found");
            return Ok(false);
        }
        self.repo.delete_by_id(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::{memory::InMemoryUserRepository, password::verify_password};

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn create_request() -> CreateUserRequest {
        CreateUserRequest {
            username: "u".into(),
            email: "e@x.com".into(),
            password: "p".into(),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let svc = service();
        let id = svc.create_user(create_request()).await.unwrap();

        let user = svc.get_user_by_id(&id.to_string()).await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "u");
        assert_eq!(user.email, "e@x.com");
        assert_ne!(user.password_hash, "p");
        assert!(verify_password("p", &user.password_hash).unwrap());
        assert!(user.updated_at.is_none());
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let svc = service();
        let found = svc.get_user_by_id(&Uuid::new_v4().to_string()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_everywhere() {
        let svc = service();
        assert!(matches!(
            svc.get_user_by_id("not-a-uuid").await,
            Err(ApiError::InvalidId(_))
        ));
        assert!(matches!(
            svc.update_user_by_id("42", UpdateUserRequest::default()).await,
            Err(ApiError::InvalidId(_))
        ));
        assert!(matches!(
            svc.delete_by_id("").await,
            Err(ApiError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn list_empty_store() {
        assert!(service().list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_returns_users_in_creation_order() {
        let svc = service();
        svc.create_user(create_request()).await.unwrap();
        svc.create_user(CreateUserRequest {
            username: "v".into(),
            email: "v@x.com".into(),
            password: "p".into(),
        })
        .await
        .unwrap();

        let names: Vec<String> = svc
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, ["u", "v"]);
    }

    #[tokio::test]
    async fn update_username_only() {
        let svc = service();
        let id = svc.create_user(create_request()).await.unwrap().to_string();
        let before = svc.get_user_by_id(&id).await.unwrap().unwrap();

        let updated = svc
            .update_user_by_id(
                &id,
                UpdateUserRequest {
                    username: Some("new".into()),
                    password: None,
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let after = svc.get_user_by_id(&id).await.unwrap().unwrap();
        assert_eq!(after.username, "new");
        assert_eq!(after.email, before.email);
        assert_eq!(after.password_hash, before.password_hash);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at.unwrap() >= after.created_at);
    }

    #[tokio::test]
    async fn update_password_only() {
        let svc = service();
        let id = svc.create_user(create_request()).await.unwrap().to_string();

        svc.update_user_by_id(
            &id,
            UpdateUserRequest {
                username: None,
                password: Some("new".into()),
            },
        )
        .await
        .unwrap();

        let after = svc.get_user_by_id(&id).await.unwrap().unwrap();
        assert_eq!(after.username, "u");
        assert_eq!(after.email, "e@x.com");
        assert!(verify_password("new", &after.password_hash).unwrap());
        assert!(!verify_password("p", &after.password_hash).unwrap());
    }

    #[tokio::test]
    async fn update_unknown_id_is_a_noop() {
        let svc = service();
        let updated = svc
            .update_user_by_id(
                &Uuid::new_v4().to_string(),
                UpdateUserRequest {
                    username: Some("ghost".into()),
                    password: None,
                },
            )
            .await
            .unwrap();
        assert!(!updated);
        assert!(svc.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_existing_and_unknown() {
        let svc = service();
        let id = svc.create_user(create_request()).await.unwrap().to_string();

        assert!(svc.delete_by_id(&id).await.unwrap());
        assert!(svc.get_user_by_id(&id).await.unwrap().is_none());
        assert!(!svc.delete_by_id(&id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let svc = service();
        svc.create_user(create_request()).await.unwrap();
        let err = svc
            .create_user(CreateUserRequest {
                username: "other".into(),
                ..create_request()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(field) if field == "email"));
    }
}
