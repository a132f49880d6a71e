use std::sync::Arc;

use ntex::web;
use ntex::web::types::{Json, Path, State};
use ntex::web::{HttpRequest, HttpResponse};
use serde_json::json;
use spdlog::info;

use crate::backend::BackendRequest;
use crate::error::ApiError;
use crate::model::blog::NewBlog;
use crate::model::envelope;
use crate::routes::passthrough;
use crate::server::AppState;
use crate::session::require_access_token;

fn blog_path(id: &str) -> String {
    format!("/api/v1/blogs/{}", id)
}

#[web::get("/api/blogs")]
pub async fn list_blogs(req: HttpRequest, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let value = state.backend.send(BackendRequest::get("/api/v1/blogs").token(Some(&token))).await?;
    Ok(passthrough(value))
}

/// Missing name, slug or description come from `[default_blog]`.
#[web::post("/api/blogs")]
pub async fn create_blog(req: HttpRequest, body: Json<NewBlog>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let attributes = body.into_inner().into_attributes(&state.config.default_blog);
    info!("Creating blog {}", attributes.slug);

    let payload = serde_json::to_value(envelope("blog", attributes)).map_err(|e| ApiError::Internal(e.to_string()))?;
    let value = state.backend.send(BackendRequest::post("/api/v1/blogs").token(Some(&token)).json(payload)).await?;
    Ok(passthrough(value))
}

#[web::get("/api/blogs/{id}")]
pub async fn get_blog(req: HttpRequest, id: Path<String>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let value = state.backend.send(BackendRequest::get(blog_path(&id)).token(Some(&token))).await?;
    Ok(passthrough(value))
}

#[web::patch("/api/blogs/{id}")]
pub async fn update_blog(req: HttpRequest, id: Path<String>, body: Json<serde_json::Value>,
                         state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    let payload = serde_json::to_value(envelope("blog", body.into_inner())).map_err(|e| ApiError::Internal(e.to_string()))?;
    let value = state.backend.send(BackendRequest::patch(blog_path(&id)).token(Some(&token)).json(payload)).await?;
    Ok(passthrough(value))
}

#[web::delete("/api/blogs/{id}")]
pub async fn delete_blog(req: HttpRequest, id: Path<String>, state: State<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let token = require_access_token(&req)?;
    state.backend.send(BackendRequest::delete(blog_path(&id)).token(Some(&token))).await?;
    info!("Deleted blog {}", id.as_str());
    Ok(HttpResponse::Ok().json(&json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use ntex::http::StatusCode;
    use ntex::web::test::{call_service, init_service, read_body, TestRequest};
    use ntex::web::App;
    use serde_json::Value;

    use crate::routes::tests::{test_state, FakeBackend};

    use super::*;

    #[ntex::test]
    async fn test_routes_require_cookie() {
        let app = init_service(
            App::new()
                .state(test_state())
                .service(list_blogs)
                .service(create_blog)
                .service(update_blog)
        ).await;

        let requests = vec![
            TestRequest::get().uri("/api/blogs"),
            TestRequest::post().uri("/api/blogs").set_json(&json!({})),
            TestRequest::patch().uri("/api/blogs/1").set_json(&json!({"name": "n"})),
        ];
        for req in requests {
            let resp = call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[ntex::test]
    async fn test_create_fills_defaults() {
        let created = json!({"data": {"id": "1", "type": "blog", "attributes": {"name": "Engineering notes", "slug": "notes", "status": "active"}}});
        let backend = FakeBackend::start(201, created.clone());
        let app = init_service(App::new().state(backend.state()).service(create_blog)).await;

        let req = TestRequest::post()
            .uri("/api/blogs")
            .header("cookie", "access_token=abc")
            .set_json(&json!({"name": "Mine"}))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert_eq!(body, created);

        let seen = backend.requests();
        assert_eq!(seen[0].uri, "/api/v1/blogs");
        assert_eq!(seen[0].body, json!({"data": {"type": "blog", "attributes": {
            "name": "Mine", "slug": "notes", "description": "A blog about software engineering", "status": "active"
        }}}));
    }

    #[ntex::test]
    async fn test_delete_blog() {
        let backend = FakeBackend::start(204, Value::Null);
        let app = init_service(App::new().state(backend.state()).service(delete_blog)).await;

        let req = TestRequest::delete().uri("/api/blogs/1").header("cookie", "access_token=abc").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert_eq!(body, json!({"success": true}));
        assert_eq!(backend.requests()[0].uri, "/api/v1/blogs/1");
    }
}
