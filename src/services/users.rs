use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::AppError;
use crate::repos::{NewUser, User, UserRole, UserStore};
use crate::services::password::PasswordEncoder;

const INVALID_CREDENTIALS: &str = "username or password does not match";

/// Account operations backed by a [`UserStore`] and a [`PasswordEncoder`].
///
/// Hashing and verification run on the blocking pool so a slow hash never stalls
/// unrelated requests.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self { store, encoder }
    }

    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        nickname: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        info!(username, nickname, "signup attempt");

        if self.store.exists_by_username(username).await? {
            warn!(username, "signup rejected: username already taken");
            return Err(AppError::bad_request(
                "BAD_REQUEST_001",
                "username is already taken",
            ));
        }

        let encoder = self.encoder.clone();
        let plaintext = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || encoder.encode(&plaintext))
            .await
            .map_err(|e| {
                error!(error = %e, "password hashing task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                error!(error = %e, "failed to hash password");
                AppError::Internal
            })?;

        // a concurrent signup can still win the race; save() reports it as Conflict
        let user = self
            .store
            .save(NewUser {
                username: username.to_owned(),
                password_hash,
                nickname: nickname.to_owned(),
                role,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "signup completed");
        Ok(user)
    }

    /// Look up `username` and check `password` against the stored hash. Unknown user and
    /// wrong password produce the same error.
    pub async fn validate_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        let Some(user) = self.store.find_by_username(username).await? else {
            warn!(username, "credential check failed");
            return Err(AppError::bad_request("BAD_REQUEST_001", INVALID_CREDENTIALS));
        };

        let encoder = self.encoder.clone();
        let plaintext = password.to_owned();
        let hash = user.password_hash.clone();
        let matched = tokio::task::spawn_blocking(move || encoder.matches(&plaintext, &hash))
            .await
            .map_err(|e| {
                error!(error = %e, "password verification task failed");
                AppError::Internal
            })?;

        if !matched {
            warn!(username, "credential check failed");
            return Err(AppError::bad_request("BAD_REQUEST_001", INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, role = %user.role, "credential check passed");
        Ok(user)
    }

    pub async fn get_profile(&self, username: &str) -> Result<User, AppError> {
        self.store.find_by_username(username).await?.ok_or_else(|| {
            warn!(username, "profile lookup failed: no such user");
            AppError::bad_request("BAD_REQUEST_001", "user not found")
        })
    }
}
