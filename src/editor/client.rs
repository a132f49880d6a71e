//! HTTP client for the dashboard API, authenticated with the session cookie.

use std::time::Duration;

use reqwest::header::{COOKIE, IF_MATCH};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use spdlog::debug;

use crate::editor::api::{BlogApi, ClientError, PostApi};
use crate::model::blog::{Blog, BlogDocument, BlogListDocument, NewBlog};
use crate::model::post::{Post, PostChanges, PostDocument};
use crate::revalidation::RevalidateTargets;
use crate::session::ACCESS_TOKEN;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

#[derive(Clone)]
pub struct DashboardClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl DashboardClient {
    pub fn new(base_url: &str, access_token: &str, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(DashboardClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("Dashboard API request: {} {}", method, url);
        self.http.request(method, url)
            .header(COOKIE, format!("{}={}", ACCESS_TOKEN, self.access_token))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Api {
            status: status.as_u16(),
            message: format!("Invalid response: {}", e),
        })
    }
}

fn status_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<Value>(body).ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => ClientError::Conflict(message),
        _ => ClientError::Api { status: status.as_u16(), message },
    }
}

impl PostApi for DashboardClient {
    async fn get_post(&self, id: &str) -> Result<Post, ClientError> {
        let doc: PostDocument = self.send(self.request(reqwest::Method::GET, &format!("/api/posts/{}", id))).await?;
        Ok(doc.data)
    }

    async fn update_post(&self, id: &str, changes: &PostChanges, version: Option<&str>) -> Result<Post, ClientError> {
        let mut builder = self.request(reqwest::Method::PATCH, &format!("/api/posts/{}", id)).json(changes);
        if let Some(version) = version {
            builder = builder.header(IF_MATCH, format!("\"{}\"", version));
        }
        let doc: PostDocument = self.send(builder).await?;
        Ok(doc.data)
    }

    async fn publish_post(&self, id: &str) -> Result<Post, ClientError> {
        let doc: PostDocument = self.send(self.request(reqwest::Method::POST, &format!("/api/posts/{}/publish", id))).await?;
        Ok(doc.data)
    }

    async fn unpublish_post(&self, id: &str) -> Result<Post, ClientError> {
        let doc: PostDocument = self.send(self.request(reqwest::Method::POST, &format!("/api/posts/{}/unpublish", id))).await?;
        Ok(doc.data)
    }

    async fn revalidate(&self, targets: &RevalidateTargets) -> Result<(), ClientError> {
        let _: Value = self.send(self.request(reqwest::Method::POST, "/api/dashboard/revalidate").json(targets)).await?;
        Ok(())
    }
}

impl BlogApi for DashboardClient {
    async fn list_blogs(&self) -> Result<Vec<Blog>, ClientError> {
        let doc: BlogListDocument = self.send(self.request(reqwest::Method::GET, "/api/blogs")).await?;
        Ok(doc.data)
    }

    async fn create_blog(&self, blog: &NewBlog) -> Result<Blog, ClientError> {
        let doc: BlogDocument = self.send(self.request(reqwest::Method::POST, "/api/blogs").json(blog)).await?;
        Ok(doc.data)
    }
}
