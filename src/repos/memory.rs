use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::repos::user_repo::{NewUser, User, UserStore};

/// In-process user store keyed by username. Used when no `DATABASE_URL` is set and in tests.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn exists_by_username(&self, username: &str) -> Result<bool, RepoError> {
        Ok(self.users.read().await.contains_key(username))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn save(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(RepoError::Conflict);
        }

        let saved = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            nickname: user.nickname,
            role: user.role,
        };
        users.insert(saved.username.clone(), saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::user_repo::UserRole;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            password_hash: "hash".to_string(),
            nickname: "nick".to_string(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn save_then_find() {
        let store = MemoryUserStore::new();
        let saved = store.save(new_user("alice")).await.unwrap();

        assert!(store.exists_by_username("alice").await.unwrap());
        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryUserStore::new();
        store.save(new_user("alice")).await.unwrap();

        assert!(matches!(
            store.save(new_user("alice")).await,
            Err(RepoError::Conflict)
        ));
    }
}
