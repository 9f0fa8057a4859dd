//! In-memory user store for tests and `STORAGE=memory` runs.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::repo::{RepoError, UserRepository};
use super::repo_types::User;

/// Mirrors the `users` table, including its unique constraints on username and email.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<Uuid, User>,
    // serializes writers so the uniqueness check and the insert are one step
    write_lock: Mutex<()>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(&self, user: &User) -> Result<(), RepoError> {
        for entry in self.users.iter() {
            let other = entry.value();
            if other.id == user.id {
                continue;
            }
            if other.username == user.username {
                return Err(RepoError::Conflict { field: "username" });
            }
            if other.email == user.email {
                return Err(RepoError::Conflict { field: "email" });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: User) -> Result<User, RepoError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.check_unique(&user)?;
        // created_at is never rewritten, same as the ON CONFLICT clause in postgres
        let stored = match self.users.get(&user.id) {
            Some(existing) => User {
                created_at: existing.created_at,
                ..user
            },
            None => user,
        };
        self.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let mut all: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|u| u.created_at);
        Ok(all)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.users.contains_key(&id))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), RepoError> {
        self.users.remove(&id);
        Ok(())
    }
}
