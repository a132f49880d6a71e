use std::sync::Arc;

use ntex::web;
use ntex::web::types::{Json, Path, State};
use ntex::web::{HttpRequest, HttpResponse};
use serde_json::json;
use spdlog::info;

use crate::backend::BackendRequest;
use crate::error::ApiError;
use crate::model::envelope;
use crate::model::post::NewPost;
use crate::query_string::QueryString;
use crate::routes::passthrough;
use crate::server::AppState;
use crate::session::require_access_token;

fn post_path(id: &str) -> String {
    format!("/api/v1/posts/{}", id)
}

/// Version the dashboard saw, from `If-Match`, without the quotes.
fn if_match_version(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("if-match")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().trim_start_matches("W/").trim_matches('"').to_string())
        .filter(|v| !v.is_empty() && v != "*")
}

#[web::get("/api/posts")]
pub async fn list_posts(req: HttpRequest, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let filters = QueryString::from(req.uri().query().unwrap_or_default()).post_filters();

    let path = match filters.is_empty() {
        true => "/api/v1/posts".to_string(),
        false => format!("/api/v1/posts?{}", filters),
    };
    let value = state.backend.send(BackendRequest::get(path).token(Some(&token))).await?;
    Ok(passthrough(value))
}

#[web::post("/api/posts")]
pub async fn create_post(req: HttpRequest, body: Json<NewPost>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let post = body.into_inner().with_defaults();
    info!("Creating post {}", post.slug);

    let payload = serde_json::to_value(envelope("post", post)).map_err(|e| ApiError::Internal(e.to_string()))?;
    let value = state.backend.send(BackendRequest::post("/api/v1/posts").token(Some(&token)).json(payload)).await?;
    Ok(passthrough(value))
}

#[web::get("/api/posts/{id}")]
pub async fn get_post(req: HttpRequest, id: Path<String>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let value = state.backend.send(BackendRequest::get(post_path(&id)).token(Some(&token))).await?;
    Ok(passthrough(value))
}

/// Flat attributes in, JSON:API envelope out. A stale `If-Match` comes back as 409.
#[web::patch("/api/posts/{id}")]
pub async fn update_post(req: HttpRequest, id: Path<String>, body: Json<serde_json::Value>,
                         state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let version = if_match_version(&req);

    let payload = serde_json::to_value(envelope("post", body.into_inner())).map_err(|e| ApiError::Internal(e.to_string()))?;
    let request = BackendRequest::patch(post_path(&id))
        .token(Some(&token))
        .if_match(version.as_deref())
        .json(payload);
    let value = state.backend.send(request).await?;
    Ok(passthrough(value))
}

#[web::delete("/api/posts/{id}")]
pub async fn delete_post(req: HttpRequest, id: Path<String>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    state.backend.send(BackendRequest::delete(post_path(&id)).token(Some(&token))).await?;
    info!("Deleted post {}", id.as_str());
    Ok(HttpResponse::Ok().json(&json!({ "success": true })))
}

#[web::post("/api/posts/{id}/publish")]
pub async fn publish_post(req: HttpRequest, id: Path<String>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let value = state.backend.send(BackendRequest::post(format!("{}/publish", post_path(&id))).token(Some(&token))).await?;
    info!("Published post {}", id.as_str());
    Ok(passthrough(value))
}

#[web::post("/api/posts/{id}/unpublish")]
pub async fn unpublish_post(req: HttpRequest, id: Path<String>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let value = state.backend.send(BackendRequest::post(format!("{}/unpublish", post_path(&id))).token(Some(&token))).await?;
    info!("Unpublished post {}", id.as_str());
    Ok(passthrough(value))
}

#[cfg(test)]
mod tests {
    use ntex::http::StatusCode;
    use ntex::web::test::{call_service, init_service, read_body, TestRequest};
    use ntex::web::App;
    use serde_json::Value;

    use crate::routes::tests::{test_state, FakeBackend};

    use super::*;

    fn post_doc() -> Value {
        json!({"data": {"id": "7", "type": "post", "attributes": {"title": "Hello", "slug": "hello", "status": "draft"}}})
    }

    async fn json_body(resp: ntex::web::WebResponse) -> Value {
        serde_json::from_slice(&read_body(resp).await).unwrap()
    }

    #[test]
    fn test_if_match_version() {
        let req = TestRequest::default()
            .header("if-match", "\"2024-03-02T11:30:00+00:00\"")
            .to_http_request();
        assert_eq!(if_match_version(&req).as_deref(), Some("2024-03-02T11:30:00+00:00"));

        let req = TestRequest::default().header("if-match", "*").to_http_request();
        assert!(if_match_version(&req).is_none());
        assert!(if_match_version(&TestRequest::default().to_http_request()).is_none());
    }

    #[ntex::test]
    async fn test_routes_require_cookie() {
        let app = init_service(
            App::new()
                .state(test_state())
                .service(list_posts)
                .service(get_post)
                .service(delete_post)
                .service(publish_post)
                .service(unpublish_post)
        ).await;

        let requests = vec![
            TestRequest::get().uri("/api/posts?status=all"),
            TestRequest::get().uri("/api/posts/1"),
            TestRequest::delete().uri("/api/posts/1"),
            TestRequest::post().uri("/api/posts/1/publish"),
            TestRequest::post().uri("/api/posts/1/unpublish"),
        ];
        for req in requests {
            let resp = call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
            assert_eq!(body, json!({"error": "Unauthorized"}));
        }
    }

    #[ntex::test]
    async fn test_backend_failure_is_500() {
        let app = init_service(App::new().state(test_state()).service(get_post)).await;
        let req = TestRequest::get()
            .uri("/api/posts/1")
            .header("cookie", "access_token=abc")
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("BaaS API request failed"));
    }

    #[ntex::test]
    async fn test_create_wraps_envelope_with_defaults() {
        let backend = FakeBackend::start(201, post_doc());
        let app = init_service(App::new().state(backend.state()).service(create_post)).await;

        let req = TestRequest::post()
            .uri("/api/posts")
            .header("cookie", "access_token=abc")
            .set_json(&json!({"title": "Hello", "slug": "hello", "content": "Hi **there**", "blog_id": "1"}))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, post_doc());

        let seen = backend.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].uri, "/api/v1/posts");
        assert_eq!(seen[0].authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(seen[0].body, json!({"data": {"type": "post", "attributes": {
            "title": "Hello", "slug": "hello", "content": "Hi **there**", "blog_id": "1",
            "status": "draft", "featured": false
        }}}));
    }

    #[ntex::test]
    async fn test_update_forwards_version() {
        let backend = FakeBackend::start(200, post_doc());
        let app = init_service(App::new().state(backend.state()).service(update_post)).await;

        let req = TestRequest::patch()
            .uri("/api/posts/7")
            .header("cookie", "access_token=abc")
            .header("if-match", "W/\"2024-03-02T11:30:00+00:00\"")
            .set_json(&json!({"title": "Renamed"}))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let seen = backend.requests();
        assert_eq!(seen[0].method, "PATCH");
        assert_eq!(seen[0].uri, "/api/v1/posts/7");
        assert_eq!(seen[0].if_match.as_deref(), Some("\"2024-03-02T11:30:00+00:00\""));
        assert_eq!(seen[0].body, json!({"data": {"type": "post", "attributes": {"title": "Renamed"}}}));
    }

    #[ntex::test]
    async fn test_stale_version_is_409() {
        for status in [409, 412] {
            let backend = FakeBackend::start(status, json!({"errors": [{"detail": "Post was modified"}]}));
            let app = init_service(App::new().state(backend.state()).service(update_post)).await;

            let req = TestRequest::patch()
                .uri("/api/posts/7")
                .header("cookie", "access_token=abc")
                .header("if-match", "\"v1\"")
                .set_json(&json!({"title": "Renamed"}))
                .to_request();
            let resp = call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CONFLICT);
            assert_eq!(json_body(resp).await, json!({"error": "Post was modified"}));
        }
    }

    #[ntex::test]
    async fn test_delete_answers_success() {
        let backend = FakeBackend::start(204, Value::Null);
        let app = init_service(App::new().state(backend.state()).service(delete_post)).await;

        let req = TestRequest::delete().uri("/api/posts/7").header("cookie", "access_token=abc").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!({"success": true}));
        assert_eq!(backend.requests()[0].method, "DELETE");
    }

    #[ntex::test]
    async fn test_no_content_becomes_empty_object() {
        let backend = FakeBackend::start(204, Value::Null);
        let app = init_service(App::new().state(backend.state()).service(publish_post).service(list_posts)).await;

        let req = TestRequest::post().uri("/api/posts/7/publish").header("cookie", "access_token=abc").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!({}));

        let req = TestRequest::get().uri("/api/posts?status=all&blog_id=1").header("cookie", "access_token=abc").to_request();
        call_service(&app, req).await;

        let seen = backend.requests();
        assert_eq!(seen[0].uri, "/api/v1/posts/7/publish");
        assert!(!seen[1].uri.contains("status"));
        assert!(seen[1].uri.contains("blog_id"));
    }
}
