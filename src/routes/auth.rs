use std::sync::Arc;

use ntex::web;
use ntex::web::types::{Json, State};
use ntex::web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spdlog::{info, warn};

use crate::backend::{BackendError, BackendRequest};
use crate::error::ApiError;
use crate::model::{envelope, Document};
use crate::server::AppState;
use crate::session::{expired_cookies, read_cookie, token_cookies, with_cookies, TokenAttributes, REFRESH_TOKEN};

#[derive(Deserialize)]
struct TokenResource {
    attributes: TokenAttributes,
}

type TokenDocument = Document<TokenResource>;

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub name: String,
    pub account_name: String,
}

#[derive(Serialize, Deserialize)]
struct RefreshAttributes {
    refresh_token: String,
}

fn message(text: &str) -> HttpResponse {
    HttpResponse::Ok().json(&json!({ "message": text }))
}

async fn issue_tokens(state: &AppState, path: &str, body: serde_json::Value) -> Result<TokenAttributes, BackendError> {
    let doc: TokenDocument = state.backend.fetch(BackendRequest::post(path).json(body)).await?;
    Ok(doc.data.attributes)
}

#[web::post("/api/auth/login")]
pub async fn login(body: Json<LoginRequest>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let payload = serde_json::to_value(envelope("token", &body)).map_err(|e| ApiError::Internal(e.to_string()))?;

    let tokens = match issue_tokens(&state, "/api/v1/auth/login", payload).await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!("Login failed for {}: {}", body.email, e);
            return Err(ApiError::auth_failed(e));
        }
    };

    info!("User {} logged in", body.email);
    Ok(with_cookies(message("Login successful"), &token_cookies(&tokens, state.config.cookies.secure)))
}

#[web::post("/api/auth/signup")]
pub async fn signup(body: Json<SignupRequest>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let payload = serde_json::to_value(envelope("user", &body)).map_err(|e| ApiError::Internal(e.to_string()))?;

    let tokens = match issue_tokens(&state, "/api/v1/auth/register", payload).await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!("Signup failed for {}: {}", body.email, e);
            return Err(ApiError::unprocessable(e));
        }
    };

    info!("User {} signed up", body.email);
    Ok(with_cookies(message("Signup successful"), &token_cookies(&tokens, state.config.cookies.secure)))
}

#[web::post("/api/auth/refresh")]
pub async fn refresh(req: HttpRequest, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let Some(refresh_token) = read_cookie(&req, REFRESH_TOKEN) else {
        return Err(ApiError::AuthFailed("Refresh token not found".to_string()));
    };

    let payload = serde_json::to_value(envelope("token", RefreshAttributes { refresh_token }))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let tokens = issue_tokens(&state, "/api/v1/auth/refresh", payload).await
        .map_err(ApiError::auth_failed)?;

    Ok(with_cookies(message("Token refreshed"), &token_cookies(&tokens, state.config.cookies.secure)))
}

#[web::post("/api/auth/logout")]
pub async fn logout(state: State<Arc<AppState>>) -> HttpResponse {
    with_cookies(message("Logout successful"), &expired_cookies(state.config.cookies.secure))
}
