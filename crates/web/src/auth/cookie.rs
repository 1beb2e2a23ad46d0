//! Credential extraction from the `Cookie` request header.
//!
//! Absence is a normal, silent outcome. Malformed pairs are skipped, never
//! an error; the authorization guard turns absence into a 401 downstream.

use axum::http::{header, HeaderMap};

/// Reserved cookie name carrying the signed credential.
pub const TOKEN_COOKIE: &str = "token";

/// Extract the `token` cookie value from a raw `Cookie` header.
///
/// Parses `;`-separated `name=value` pairs with surrounding whitespace
/// trimmed from both names and values. Total over any input string.
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    for pair in header.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        if name.trim() == TOKEN_COOKIE {
            return Some(value.trim().to_string());
        }
    }
    None
}

/// Extract the credential from request headers, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_single_cookie() {
        assert_eq!(token_from_cookie_header("token=abc"), Some("abc".into()));
    }

    #[test]
    fn test_multiple_cookies_with_whitespace() {
        assert_eq!(
            token_from_cookie_header("theme=dark;  token = eyJ.abc.def ; lang=en"),
            Some("eyJ.abc.def".into())
        );
    }

    #[test]
    fn test_value_containing_equals() {
        // JWT padding and similar values keep everything after the first '='
        assert_eq!(
            token_from_cookie_header("token=a=b=c"),
            Some("a=b=c".into())
        );
    }

    #[test]
    fn test_absent_is_silent() {
        assert_eq!(token_from_cookie_header(""), None);
        assert_eq!(token_from_cookie_header("session=xyz"), None);
        assert_eq!(token_from_cookie_header(";;;"), None);
        assert_eq!(token_from_cookie_header("garbage no pairs"), None);
        // name must match exactly after trimming
        assert_eq!(token_from_cookie_header("mytoken=abc"), None);
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn test_header_round_trip() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("token=abc123; theme=dark"),
        );
        assert_eq!(token_from_headers(&headers), Some("abc123".into()));
    }
}
