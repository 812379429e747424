#![allow(dead_code)]

use std::sync::Arc;

use argon2::Params;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use cookie_auth::{
    app::build_router,
    config::Config,
    middleware::auth::AuthorizationPolicy,
    repos::MemoryUserStore,
    services::auth::{TokenCodec, clock::ManualClock},
    services::password::Argon2PasswordEncoder,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const NOW: i64 = 1_700_000_000;
pub const ACCESS_TTL: i64 = 60;
pub const REFRESH_TTL: i64 = 600;

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub codec: Arc<TokenCodec>,
}

pub fn secret() -> String {
    URL_SAFE_NO_PAD.encode([42u8; 32])
}

pub fn test_config() -> Config {
    let secret = secret();
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(secret.clone()),
        "ACCESS_TOKEN_TTL_SECONDS" => Some(ACCESS_TTL.to_string()),
        "REFRESH_TOKEN_TTL_SECONDS" => Some(REFRESH_TTL.to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_policy(AuthorizationPolicy::default())
}

pub fn create_test_app_with_policy(policy: AuthorizationPolicy) -> TestApp {
    let config = test_config();
    let clock = Arc::new(ManualClock::new(NOW));
    let codec = Arc::new(
        TokenCodec::new(
            &config.jwt_secret,
            config.access_token_ttl_seconds,
            config.refresh_token_ttl_seconds,
        )
        .expect("codec")
        .with_clock(clock.clone()),
    );
    // cheap hashing parameters keep the tests fast
    let encoder = Argon2PasswordEncoder::with_params(Params::new(8, 1, 1, None).unwrap());

    let state = AppState::new(
        &config,
        codec.clone(),
        Arc::new(MemoryUserStore::new()),
        Arc::new(encoder),
    )
    .with_policy(policy);

    TestApp {
        router: build_router(state),
        clock,
        codec,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        self.post_json(
            "/api/v1/auth/login",
            json!({"username": username, "password": password}),
        )
        .await
    }

    pub async fn signup(&self, username: &str, password: &str, is_admin: bool) {
        let res = self
            .post_json(
                "/api/v1/auth/signup",
                json!({
                    "username": username,
                    "password": password,
                    "nickname": format!("{username}-nick"),
                    "isAdmin": is_admin,
                }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK, "signup {username}");
    }

    /// Sign up + log in, returning (access, refresh) token values.
    pub async fn login_new_user(&self, username: &str) -> (String, String) {
        self.signup(username, "pw-123", false).await;
        let res = self
            .post_json(
                "/api/v1/auth/login",
                json!({"username": username, "password": "pw-123"}),
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK, "login {username}");

        let cookies = set_cookies(&res);
        (
            cookie_value(&cookies, "accessToken").expect("access cookie"),
            cookie_value(&cookies, "refreshToken").expect("refresh cookie"),
        )
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            req = req.header("cookie", cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_with_cookie(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder().method("POST").uri(uri);
        if let Some(cookie) = cookie {
            req = req.header("cookie", cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }
}

/// Extract Set-Cookie headers from response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

pub fn find_cookie<'a>(cookies: &'a [String], name: &str) -> Option<&'a String> {
    let prefix = format!("{name}=");
    cookies.iter().find(|c| c.starts_with(&prefix))
}

pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let cookie = find_cookie(cookies, name)?;
    let (pair, _) = cookie.split_once(';')?;
    pair.split_once('=').map(|(_, v)| v.to_string())
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
