/*
 * Responsibility
 * - /auth 系 handler (signup / login / refresh / logout / profile)
 * - token 発行・検証は TokenService、ユーザー操作は UserService に委譲
 * - Set-Cookie の組み立てだけをここで行う
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{AppendHeaders, IntoResponse},
};
use tracing::info;

use crate::api::v1::dto::users::{LoginRequest, SignupRequest, UserResponse};
use crate::api::v1::extractors::AuthIdentity;
use crate::config::CookieSettings;
use crate::error::AppError;
use crate::services::auth::cookie::{REFRESH_COOKIE_NAME, TokenCookie, get_cookie};
use crate::state::AppState;

type SetCookies = AppendHeaders<Vec<(HeaderName, String)>>;

fn set_cookies(cookies: &[TokenCookie], settings: &CookieSettings) -> SetCookies {
    AppendHeaders(
        cookies
            .iter()
            .map(|c| (header::SET_COOKIE, c.to_header_value(settings)))
            .collect(),
    )
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::validation(e.body_text()))
}

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let req = json_body(payload)?;
    req.validate().map_err(AppError::validation)?;

    let user = state
        .users
        .signup(&req.username, &req.password, &req.nickname, req.role())
        .await?;

    Ok(Json(user.into()))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(SetCookies, Json<UserResponse>), AppError> {
    let req = json_body(payload)?;
    req.validate().map_err(AppError::validation)?;

    let result = state.tokens.login(&req.username, &req.password).await?;
    let cookies = set_cookies(&result.tokens.cookies(), &state.cookies);

    Ok((cookies, Json(result.user.into())))
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let pair = state
        .tokens
        .refresh(get_cookie(&headers, REFRESH_COOKIE_NAME))?;

    Ok((
        StatusCode::NO_CONTENT,
        set_cookies(&pair.cookies(), &state.cookies),
        (),
    ))
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!("logout: clearing token cookies");

    (
        StatusCode::NO_CONTENT,
        set_cookies(&state.tokens.logout(), &state.cookies),
        (),
    )
}

pub async fn profile(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get_profile(&identity.username).await?;
    Ok(Json(user.into()))
}
