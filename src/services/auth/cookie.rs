//! Token cookies: reading them from requests and rendering `Set-Cookie` values.

use axum::http::{HeaderMap, header};

use crate::config::CookieSettings;

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

pub const ACCESS_COOKIE_PATH: &str = "/";
/// The refresh cookie is only sent to the refresh endpoint.
pub const REFRESH_COOKIE_PATH: &str = "/api/v1/auth/refresh";

/// Extract a cookie value from the Cookie header(s). Empty values count as absent.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// One `Set-Cookie` instruction for a token cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCookie {
    pub name: &'static str,
    pub value: String,
    pub path: &'static str,
    pub max_age: u64,
}

impl TokenCookie {
    pub fn access(token: String, max_age: u64) -> Self {
        Self {
            name: ACCESS_COOKIE_NAME,
            value: token,
            path: ACCESS_COOKIE_PATH,
            max_age,
        }
    }

    pub fn refresh(token: String, max_age: u64) -> Self {
        Self {
            name: REFRESH_COOKIE_NAME,
            value: token,
            path: REFRESH_COOKIE_PATH,
            max_age,
        }
    }

    /// Empty value with zero lifetime: tells the browser to drop the cookie.
    pub fn clear_access() -> Self {
        Self::access(String::new(), 0)
    }

    pub fn clear_refresh() -> Self {
        Self::refresh(String::new(), 0)
    }

    pub fn to_header_value(&self, settings: &CookieSettings) -> String {
        let secure = if settings.secure { "; Secure" } else { "" };
        format!(
            "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite={}{}",
            self.name,
            self.value,
            self.path,
            self.max_age,
            settings.same_site.as_str(),
            secure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SameSite;
    use axum::http::HeaderValue;

    #[test]
    fn get_cookie_finds_named_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; accessToken=abc.def.ghi; refreshToken=xyz"),
        );

        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), Some("abc.def.ghi"));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE_NAME), Some("xyz"));
        assert_eq!(get_cookie(&headers, "foo"), Some("bar"));
        assert_eq!(get_cookie(&headers, "missing"), None);
    }

    #[test]
    fn get_cookie_reads_every_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("foo=bar"));
        headers.append(header::COOKIE, HeaderValue::from_static("accessToken=tok"));

        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), Some("tok"));
    }

    #[test]
    fn empty_cookie_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("accessToken="));

        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), None);
        assert_eq!(get_cookie(&HeaderMap::new(), ACCESS_COOKIE_NAME), None);
    }

    #[test]
    fn renders_set_cookie_attributes() {
        let settings = CookieSettings {
            secure: true,
            same_site: SameSite::Strict,
        };

        assert_eq!(
            TokenCookie::refresh("r".into(), 600).to_header_value(&settings),
            "refreshToken=r; Path=/api/v1/auth/refresh; Max-Age=600; HttpOnly; SameSite=Strict; Secure"
        );

        let settings = CookieSettings {
            secure: false,
            same_site: SameSite::Lax,
        };
        assert_eq!(
            TokenCookie::clear_access().to_header_value(&settings),
            "accessToken=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"
        );
    }
}
