//! Auth cookie construction and parsing.
//!
//! Tokens travel in HttpOnly SameSite=Lax cookies so page scripts can
//! never read them; Max-Age mirrors the token lifetime and `Secure` is
//! added behind HTTPS.

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use photoshare_auth::AuthTokens;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Build one Set-Cookie value.
fn auth_cookie(name: &str, value: &str, max_age_secs: u64, secure: bool) -> HeaderValue {
    let mut cookie =
        format!("{name}={value}; Max-Age={max_age_secs}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).expect("cookie value is ASCII")
}

/// A Set-Cookie value that clears the named cookie.
fn expired_cookie(name: &str, secure: bool) -> HeaderValue {
    auth_cookie(name, "", 0, secure)
}

/// Attach both auth cookies to a response.
pub fn set_auth_cookies(response: &mut Response, tokens: &AuthTokens, secure: bool) {
    response.headers_mut().append(
        header::SET_COOKIE,
        auth_cookie(ACCESS_COOKIE, &tokens.access_token, tokens.expires_in, secure),
    );
    response.headers_mut().append(
        header::SET_COOKIE,
        auth_cookie(
            REFRESH_COOKIE,
            &tokens.refresh_token,
            tokens.refresh_expires_in,
            secure,
        ),
    );
}

/// Clear both auth cookies on a response.
pub fn clear_auth_cookies(response: &mut Response, secure: bool) {
    response
        .headers_mut()
        .append(header::SET_COOKIE, expired_cookie(ACCESS_COOKIE, secure));
    response
        .headers_mut()
        .append(header::SET_COOKIE, expired_cookie(REFRESH_COOKIE, secure));
}

/// Extract a named cookie from the request's Cookie header(s).
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|raw| raw.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| {
            let (k, v) = pair.trim().split_once('=')?;
            (k == name).then(|| v.to_string())
        })
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        let value = auth_cookie(ACCESS_COOKIE, "tok", 3_600, false);
        let s = value.to_str().unwrap();
        assert!(s.starts_with("access_token=tok; "));
        assert!(s.contains("Max-Age=3600"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("SameSite=Lax"));
        assert!(!s.contains("Secure"));

        let secure = auth_cookie(REFRESH_COOKIE, "tok", 10, true);
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn parse_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=abc; refresh_token=def"),
        );
        assert_eq!(cookie_value(&headers, ACCESS_COOKIE).as_deref(), Some("abc"));
        assert_eq!(
            cookie_value(&headers, REFRESH_COOKIE).as_deref(),
            Some("def")
        );
        assert_eq!(cookie_value(&headers, "other"), None);
    }

    #[test]
    fn missing_cookie_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(cookie_value(&headers, ACCESS_COOKIE), None);
    }
}
