//! access token (cookie) 検証 → authorization → Identity を extensions に入れる
//!
//! - gate: allow-list 判定 + cookie の token 検証。失敗しても request は止めない
//! - policy: gate の結果 (Identity の有無) で 401 / 403 / 通過 を決める
//! - Identity は request extensions にだけ置く (request 終了で破棄)

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use tracing::warn;

use crate::error::AppError;
use crate::middleware::auth::policy::Denial;
use crate::state::AppState;

/// Router 全体に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let router = Router::new().nest("/api/v1", api::v1::routes());
/// let router = middleware::auth::access::apply(router, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = original_uri.path();

    let outcome = state.gate.inspect(path, req.headers());

    if let Err(denial) = state.policy.evaluate(path, outcome.identity.as_ref()) {
        match denial {
            Denial::Unauthenticated => {
                warn!(method = %req.method(), path, "authentication failed")
            }
            Denial::Forbidden => {
                warn!(method = %req.method(), path, "authorization failed")
            }
        }
        return Err(denial.into());
    }

    // middleware → extractor への受け渡し
    if let Some(identity) = outcome.identity {
        req.extensions_mut().insert(identity);
    }

    Ok(next.run(req).await)
}
