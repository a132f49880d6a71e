//! Token cookies: `access_token` and `refresh_token`, both httpOnly and `SameSite=Lax`.

use ntex::http::header::COOKIE;
use ntex::web::{HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::ApiError;

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";

/// Token triple returned by the backend's login, register and refresh calls.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenAttributes {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub fn read_cookie(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get_all(COOKIE)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

pub fn access_token(req: &HttpRequest) -> Option<String> {
    read_cookie(req, ACCESS_TOKEN)
}

/// Bearer token for proxied calls, or the 401 every proxy route answers with.
pub fn require_access_token(req: &HttpRequest) -> Result<String, ApiError> {
    access_token(req).ok_or(ApiError::Unauthorized)
}

fn cookie(name: &str, value: &str, max_age: Option<i64>, secure: bool) -> String {
    let mut buf = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);
    if let Some(max_age) = max_age {
        buf.push_str(&format!("; Max-Age={}", max_age.max(0)));
    }
    if secure {
        buf.push_str("; Secure");
    }
    buf
}

pub fn token_cookies(tokens: &TokenAttributes, secure: bool) -> [String; 2] {
    [
        cookie(ACCESS_TOKEN, &tokens.access_token, Some(tokens.expires_in), secure),
        cookie(REFRESH_TOKEN, &tokens.refresh_token, None, secure),
    ]
}

pub fn expired_cookies(secure: bool) -> [String; 2] {
    [
        cookie(ACCESS_TOKEN, "", Some(0), secure),
        cookie(REFRESH_TOKEN, "", Some(0), secure),
    ]
}

pub fn with_cookies(mut response: HttpResponse, cookies: &[String]) -> HttpResponse {
    for value in cookies {
        if let Ok(value) = value.parse() {
            response.headers_mut().append(ntex::http::header::SET_COOKIE, value);
        }
    }
    response
}
