/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証の要否は middleware::auth (gate + policy) 側で決める
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::auth::{login, logout, profile, refresh, signup};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
}
