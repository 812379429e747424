//! Per-request token inspection.
//!
//! Two outcomes per request:
//! - `Bypassed`: path is on the allow-list, the cookie is not even read
//! - `Inspected`: the access-token cookie is validated; success yields an identity
//!
//! A missing or bad token never fails the request here. The identity is simply
//! absent and the authorization policy decides what that means for the route.

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{debug, info};

use crate::api::v1::extractors::Identity;
use crate::services::auth::TokenCodec;
use crate::services::auth::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use crate::services::auth::path_pattern::PathMatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Bypassed,
    Inspected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub state: GateState,
    pub identity: Option<Identity>,
}

#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    public_paths: PathMatcher,
    codec: Arc<TokenCodec>,
}

impl AuthenticationGate {
    pub fn new<I, S>(public_paths: I, codec: Arc<TokenCodec>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            public_paths: PathMatcher::new(public_paths),
            codec,
        }
    }

    pub fn inspect(&self, path: &str, headers: &HeaderMap) -> GateOutcome {
        if let Some(pattern) = self.public_paths.first_match(path) {
            debug!(path, pattern = pattern.as_str(), "token inspection bypassed");
            return GateOutcome {
                state: GateState::Bypassed,
                identity: None,
            };
        }

        let identity = match get_cookie(headers, ACCESS_COOKIE_NAME) {
            None => {
                debug!(path, "no access token cookie");
                None
            }
            Some(token) => match self.codec.validate(token) {
                Ok(verified) => {
                    debug!(path, username = %verified.subject, authority = %verified.role, "access token accepted");
                    Some(Identity::new(verified.subject, verified.role))
                }
                Err(err) => {
                    info!(path, error = %err, "access token rejected, continuing anonymously");
                    None
                }
            },
        };

        GateOutcome {
            state: GateState::Inspected,
            identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PUBLIC_PATHS;
    use crate::services::auth::clock::ManualClock;
    use crate::services::auth::jwt::TokenClass;
    use axum::http::{HeaderValue, header};
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const NOW: i64 = 1_700_000_000;

    fn setup() -> (AuthenticationGate, Arc<TokenCodec>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = Arc::new(
            TokenCodec::new(&URL_SAFE_NO_PAD.encode([1u8; 32]), 60, 600)
                .unwrap()
                .with_clock(clock.clone()),
        );
        (
            AuthenticationGate::new(DEFAULT_PUBLIC_PATHS.iter(), codec.clone()),
            codec,
            clock,
        )
    }

    fn with_access_cookie(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("accessToken={token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn every_allow_listed_path_is_bypassed() {
        let (gate, codec, _) = setup();
        let token = codec
            .issue("alice", "ROLE_USER", TokenClass::Access)
            .unwrap()
            .token;

        for path in DEFAULT_PUBLIC_PATHS {
            let outcome = gate.inspect(path, &with_access_cookie(&token));
            assert_eq!(outcome.state, GateState::Bypassed, "{path}");
            // even a valid cookie is ignored on bypassed paths
            assert_eq!(outcome.identity, None, "{path}");
        }
    }

    #[test]
    fn valid_cookie_yields_identity_with_verbatim_authority() {
        let (gate, codec, _) = setup();
        let token = codec
            .issue("alice", "ROLE_SOMETHING_ODD", TokenClass::Access)
            .unwrap()
            .token;

        let outcome = gate.inspect("/api/v1/auth/profile", &with_access_cookie(&token));
        assert_eq!(outcome.state, GateState::Inspected);
        assert_eq!(
            outcome.identity,
            Some(Identity::new("alice", "ROLE_SOMETHING_ODD"))
        );
    }

    #[test]
    fn missing_cookie_is_anonymous() {
        let (gate, _, _) = setup();
        let outcome = gate.inspect("/api/v1/auth/profile", &HeaderMap::new());
        assert_eq!(outcome.state, GateState::Inspected);
        assert_eq!(outcome.identity, None);
    }

    #[test]
    fn expired_or_broken_tokens_are_anonymous() {
        let (gate, codec, clock) = setup();
        let token = codec
            .issue("alice", "ROLE_USER", TokenClass::Access)
            .unwrap()
            .token;

        clock.advance(60);
        let outcome = gate.inspect("/api/v1/auth/profile", &with_access_cookie(&token));
        assert_eq!(outcome.identity, None);

        let outcome = gate.inspect("/api/v1/auth/profile", &with_access_cookie("garbage"));
        assert_eq!(outcome.state, GateState::Inspected);
        assert_eq!(outcome.identity, None);
    }

    #[test]
    fn profile_is_not_bypassed() {
        let (gate, _, _) = setup();
        let headers = HeaderMap::new();
        assert_eq!(
            gate.inspect("/api/v1/auth/profile", &headers).state,
            GateState::Inspected
        );
        assert_eq!(
            gate.inspect("/api/v1/auth/login", &headers).state,
            GateState::Bypassed
        );
    }
}
