/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - gate / policy / token service / user service / cookie 設定
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 署名鍵は起動時に一度だけ読み込み、以降は read-only で共有する
 */
use std::sync::Arc;

use crate::config::{Config, CookieSettings};
use crate::middleware::auth::{AuthenticationGate, AuthorizationPolicy};
use crate::repos::UserStore;
use crate::services::auth::{TokenCodec, TokenService};
use crate::services::password::PasswordEncoder;
use crate::services::users::UserService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<AuthenticationGate>,
    pub policy: Arc<AuthorizationPolicy>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<UserService>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(
        config: &Config,
        codec: Arc<TokenCodec>,
        store: Arc<dyn UserStore>,
        encoder: Arc<dyn PasswordEncoder>,
    ) -> Self {
        let users = Arc::new(UserService::new(store, encoder));
        let tokens = Arc::new(TokenService::new(codec.clone(), users.clone()));
        let gate = Arc::new(AuthenticationGate::new(&config.public_paths, codec));

        Self {
            gate,
            policy: Arc::new(AuthorizationPolicy::default()),
            tokens,
            users,
            cookies: config.cookies.clone(),
        }
    }

    pub fn with_policy(mut self, policy: AuthorizationPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }
}
