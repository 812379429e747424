use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppError;
use crate::repos::User;
use crate::services::auth::cookie::TokenCookie;
use crate::services::auth::jwt::{IssuedToken, TokenClass, TokenCodec};
use crate::services::users::UserService;

/// Access + refresh token minted together.
#[derive(Clone, Debug)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

impl TokenPair {
    pub fn cookies(&self) -> [TokenCookie; 2] {
        [
            TokenCookie::access(self.access.token.clone(), self.access.ttl_seconds),
            TokenCookie::refresh(self.refresh.token.clone(), self.refresh.ttl_seconds),
        ]
    }
}

#[derive(Clone, Debug)]
pub struct LoginResult {
    pub user: User,
    pub tokens: TokenPair,
}

/// Orchestrates login, refresh and logout.
///
/// Stateless: nothing about issued tokens is stored, so a still-valid refresh token can be
/// presented again and again to mint new pairs until it expires.
#[derive(Clone, Debug)]
pub struct TokenService {
    codec: Arc<TokenCodec>,
    users: Arc<UserService>,
}

impl TokenService {
    pub fn new(codec: Arc<TokenCodec>, users: Arc<UserService>) -> Self {
        Self { codec, users }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AppError> {
        info!(username, "login attempt");

        let user = self.users.validate_user(username, password).await?;
        let tokens = self.issue_pair(&user.username, user.role.as_str())?;

        info!(username = %user.username, "login succeeded");
        Ok(LoginResult { user, tokens })
    }

    /// Exchange the refresh cookie value for a brand-new pair carrying the same subject
    /// and role. Expirations are computed from now, not copied from the old token.
    pub fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenPair, AppError> {
        let refresh_token = refresh_token.ok_or_else(|| {
            warn!("refresh rejected: no refresh token cookie");
            AppError::MissingRefreshToken
        })?;

        let verified = self.codec.validate(refresh_token).map_err(|e| {
            warn!(error = %e, "refresh rejected");
            AppError::from(e)
        })?;

        let tokens = self.issue_pair(&verified.subject, &verified.role)?;

        info!(username = %verified.subject, "token pair refreshed");
        Ok(tokens)
    }

    /// Nothing to invalidate server side; the caller overwrites both cookies.
    pub fn logout(&self) -> [TokenCookie; 2] {
        [TokenCookie::clear_access(), TokenCookie::clear_refresh()]
    }

    fn issue_pair(&self, subject: &str, role: &str) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.codec.issue(subject, role, TokenClass::Access)?,
            refresh: self.codec.issue(subject, role, TokenClass::Refresh)?,
        })
    }
}
