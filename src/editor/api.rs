use std::future::Future;

use crate::model::blog::{Blog, NewBlog};
use crate::model::post::{Post, PostChanges};
use crate::revalidation::RevalidateTargets;

/// Failure of a dashboard API call, as seen by the editing session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Post was changed elsewhere: {0}")]
    Conflict(String),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
}

/// Post operations of the dashboard API.
pub trait PostApi: Clone + Send + Sync + 'static {
    fn get_post(&self, id: &str) -> impl Future<Output=Result<Post, ClientError>> + Send;

    /// `version` is sent as `If-Match` so a stale save comes back as `Conflict`.
    fn update_post(&self, id: &str, changes: &PostChanges, version: Option<&str>)
                   -> impl Future<Output=Result<Post, ClientError>> + Send;

    fn publish_post(&self, id: &str) -> impl Future<Output=Result<Post, ClientError>> + Send;

    fn unpublish_post(&self, id: &str) -> impl Future<Output=Result<Post, ClientError>> + Send;

    fn revalidate(&self, targets: &RevalidateTargets) -> impl Future<Output=Result<(), ClientError>> + Send;
}

pub trait BlogApi: Send + Sync {
    fn list_blogs(&self) -> impl Future<Output=Result<Vec<Blog>, ClientError>> + Send;

    fn create_blog(&self, blog: &NewBlog) -> impl Future<Output=Result<Blog, ClientError>> + Send;
}
