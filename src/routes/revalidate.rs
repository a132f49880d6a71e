use std::sync::Arc;

use chrono::Utc;
use ntex::util::Bytes;
use ntex::web;
use ntex::web::types::State;
use ntex::web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use spdlog::{info, warn};
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::page_cache::PageCache;
use crate::revalidation::RevalidateTargets;
use crate::routes::parse_json;
use crate::server::AppState;
use crate::session::require_access_token;

pub const REVALIDATE_TOKEN_HEADER: &str = "x-revalidate-token";

#[derive(Deserialize, Default)]
struct RevalidateBody {
    #[serde(flatten)]
    targets: RevalidateTargets,
    secret: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RevalidateResponse {
    pub revalidated: bool,
    pub tags: Vec<String>,
    pub paths: Vec<String>,
    pub timestamp: i64,
}

fn secret_matches(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

fn header_secret(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(REVALIDATE_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|v| !v.is_empty())
}

/// Drops every cached page matching the targets. Absent tags and paths are a no-op.
pub fn invalidate(pages: &PageCache<String>, targets: RevalidateTargets) -> Result<RevalidateResponse, ApiError> {
    let targets = targets.cleaned();
    if targets.is_empty() {
        return Err(ApiError::BadRequest("Provide at least one tag or path".to_string()));
    }

    let removed: usize = targets.tags.iter().map(|tag| pages.invalidate_tag(tag)).sum::<usize>()
        + targets.paths.iter().map(|path| pages.invalidate_path(path)).sum::<usize>();
    info!("Revalidated tags {:?} and paths {:?}, {} cached pages dropped", targets.tags, targets.paths, removed);

    Ok(RevalidateResponse {
        revalidated: true,
        tags: targets.tags,
        paths: targets.paths,
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// Called by the backend or a deploy hook. The secret comes from `X-Revalidate-Token` or the body.
#[web::post("/api/revalidate")]
pub async fn revalidate(req: HttpRequest, body: Bytes, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let Some(ref expected) = state.config.revalidate.secret else {
        warn!("Revalidation requested but no secret is configured");
        return Err(ApiError::Internal("Revalidation not configured".to_string()));
    };

    let body: RevalidateBody = parse_json(&body)?;
    let provided = header_secret(&req).or(body.secret).unwrap_or_default();
    if !secret_matches(expected, &provided) {
        warn!("Rejected revalidation with an invalid secret");
        return Err(ApiError::AuthFailed("Invalid revalidation secret".to_string()));
    }

    let response = invalidate(&state.pages, body.targets)?;
    Ok(HttpResponse::Ok().json(&response))
}

/// Same as `/api/revalidate`, authenticated with the session cookie.
#[web::post("/api/dashboard/revalidate")]
pub async fn dashboard_revalidate(req: HttpRequest, body: Bytes, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    require_access_token(&req)?;
    let targets: RevalidateTargets = parse_json(&body)?;
    let response = invalidate(&state.pages, targets)?;
    Ok(HttpResponse::Ok().json(&response))
}
