//! Signed token codec (HS256).
//!
//! Access and refresh tokens carry the same claims (`sub`, `role`, `iat`, `exp`)
//! and differ only in lifetime. Verification is stateless: one symmetric key,
//! loaded once at startup, shared read-only by every request.

use std::sync::Arc;

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::services::auth::clock::{Clock, SystemClock};

/// HS256 requires a key of at least 256 bits.
pub const MIN_SECRET_BYTES: usize = 32;

// Accepts base64url with or without padding.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Access,
    Refresh,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("token signature invalid")]
    SignatureInvalid,
    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),
    #[error("failed to sign token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    #[error("token lifetime of {0}s is out of range")]
    LifetimeOutOfRange(u64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningKeyError {
    #[error("signing secret is not valid base64url")]
    NotBase64Url,
    #[error("signing secret is {len} bytes, at least {MIN_SECRET_BYTES} required")]
    TooShort { len: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// A freshly minted token together with the instants baked into it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub ttl_seconds: u64,
}

/// Claims of a token whose signature and expiry have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub role: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    /// `secret` is the base64url encoded HMAC key. Fails when it decodes to fewer than
    /// [`MIN_SECRET_BYTES`] bytes.
    pub fn new(
        secret: &str,
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
    ) -> Result<Self, SigningKeyError> {
        let key = decode_secret(secret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked against our own clock in `validate`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
            validation,
            access_ttl_seconds,
            refresh_ttl_seconds,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl_seconds(&self, class: TokenClass) -> u64 {
        match class {
            TokenClass::Access => self.access_ttl_seconds,
            TokenClass::Refresh => self.refresh_ttl_seconds,
        }
    }

    pub fn issue(
        &self,
        subject: &str,
        role: &str,
        class: TokenClass,
    ) -> Result<IssuedToken, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::EmptyClaim("sub"));
        }

        let ttl_seconds = self.ttl_seconds(class);
        let now = self.clock.now();
        let exp = i64::try_from(ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(TokenError::LifetimeOutOfRange(ttl_seconds))?;

        let claims = TokenClaims {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now,
            exp,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            TokenError::Encoding(e)
        })?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: exp,
            ttl_seconds,
        })
    }

    /// Verify signature and expiry. A token is expired once `exp <= now`.
    pub fn validate(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::Base64(_) if signature_segment_is_at_fault(token) => {
                    TokenError::SignatureInvalid
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(TokenError::EmptyClaim("sub"));
        }
        if claims.exp <= self.clock.now() {
            return Err(TokenError::Expired);
        }

        Ok(VerifiedToken {
            subject: claims.sub,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.validate(token).map(|v| v.subject)
    }

    pub fn extract_role(&self, token: &str) -> Result<String, TokenError> {
        self.validate(token).map(|v| v.role)
    }
}

// Header and payload decode cleanly, so a base64 failure came from the signature.
fn signature_segment_is_at_fault(token: &str) -> bool {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(_), None) => {
            URL_SAFE_NO_PAD.decode(header).is_ok() && URL_SAFE_NO_PAD.decode(payload).is_ok()
        }
        _ => false,
    }
}

fn decode_secret(secret: &str) -> Result<Vec<u8>, SigningKeyError> {
    let key = SECRET_ENGINE
        .decode(secret.trim())
        .map_err(|_| SigningKeyError::NotBase64Url)?;
    if key.len() < MIN_SECRET_BYTES {
        return Err(SigningKeyError::TooShort { len: key.len() });
    }
    Ok(key)
}
