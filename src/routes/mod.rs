//! HTTP surface: JSON proxy routes under `/api`, dashboard pages and public pages.

use ntex::web;
use serde_json::Value;

use crate::error::ApiError;

pub mod auth;
pub mod blogs;
pub mod dashboard;
pub mod posts;
pub mod public;
pub mod revalidate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
       .service(auth::signup)
       .service(auth::refresh)
       .service(auth::logout)
       .service(posts::list_posts)
       .service(posts::create_post)
       .service(posts::get_post)
       .service(posts::update_post)
       .service(posts::delete_post)
       .service(posts::publish_post)
       .service(posts::unpublish_post)
       .service(blogs::list_blogs)
       .service(blogs::create_blog)
       .service(blogs::get_blog)
       .service(blogs::update_blog)
       .service(blogs::delete_blog)
       .service(revalidate::revalidate)
       .service(revalidate::dashboard_revalidate)
       .service(dashboard::dashboard_home)
       .service(dashboard::dashboard_posts)
       .service(dashboard::dashboard_new_post)
       .service(dashboard::dashboard_edit_post)
       .service(dashboard::login_page)
       .service(dashboard::signup_page)
       .service(public::index)
       .service(public::view_post)
       .service(public::rss)
       .service(public::sitemap)
       .service(public::robots)
       .service(public::public_files);
}

/// Backend answer as sent to the dashboard. A 204 upstream becomes `{}`.
fn passthrough(value: Option<Value>) -> web::HttpResponse {
    web::HttpResponse::Ok().json(&value.unwrap_or_else(|| Value::Object(Default::default())))
}

/// Parses a raw body, answering 400 `Invalid JSON` when it is not.
fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))
}
