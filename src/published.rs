//! Reads of published posts for the public pages.

use crate::backend::{BackendClient, BackendError, BackendRequest};
use crate::model::post::{Post, PostListDocument, PostStatus};

fn list_path(blog_slug: &str, post_slug: Option<&str>, page: Option<u32>, page_size: u32) -> String {
    let page_size = page_size.to_string();
    let page = page.map(|p| p.to_string());
    let mut params = vec![
        ("filter[blog_slug]", blog_slug),
        ("filter[status]", "published"),
        ("sort", "-published_at"),
        ("page[size]", page_size.as_str()),
    ];
    if let Some(ref page) = page {
        params.push(("page[number]", page.as_str()));
    }
    if let Some(post_slug) = post_slug {
        params.push(("filter[slug]", post_slug));
    }
    format!("/api/v1/posts?{}", serde_urlencoded::to_string(params).unwrap_or_default())
}

/// One backend page of published posts and the size of the whole listing.
pub struct PublishedPage {
    pub posts: Vec<Post>,
    pub total: u64,
}

/// Newest first by publish date. Drafts leaking through the filter are dropped.
pub fn sort_published(mut posts: Vec<Post>) -> Vec<Post> {
    posts.retain(|p| p.attributes.status == PostStatus::Published);
    posts.sort_by(|a, b| b.attributes.published_at.cmp(&a.attributes.published_at));
    posts
}

pub async fn list_published(backend: &BackendClient, blog_slug: &str, limit: u32) -> Result<Vec<Post>, BackendError> {
    let req = BackendRequest::get(list_path(blog_slug, None, None, limit)).token(backend.public_token());
    let doc: PostListDocument = backend.fetch(req).await?;
    let mut posts = sort_published(doc.data);
    posts.truncate(limit as usize);
    Ok(posts)
}

/// Page `page` (1-based) of the published listing. Without list meta the total is
/// estimated, counting one more item when the page came back full.
pub async fn published_page(backend: &BackendClient, blog_slug: &str, page: u32, page_size: u32) -> Result<PublishedPage, BackendError> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let req = BackendRequest::get(list_path(blog_slug, None, Some(page), page_size)).token(backend.public_token());
    let doc: PostListDocument = backend.fetch(req).await?;

    let fetched = doc.data.len() as u64;
    let total = match doc.meta {
        Some(meta) => meta.total,
        None => {
            let offset = (page as u64 - 1) * page_size as u64;
            match fetched {
                0 => 0,
                n => offset + n + u64::from(n >= page_size as u64),
            }
        }
    };

    let mut posts = sort_published(doc.data);
    posts.truncate(page_size as usize);
    Ok(PublishedPage { posts, total })
}

pub async fn find_published(backend: &BackendClient, blog_slug: &str, post_slug: &str) -> Result<Option<Post>, BackendError> {
    let req = BackendRequest::get(list_path(blog_slug, Some(post_slug), None, 1)).token(backend.public_token());
    let doc: PostListDocument = match backend.fetch(req).await {
        Ok(doc) => doc,
        Err(BackendError::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    Ok(sort_published(doc.data).into_iter().find(|p| p.attributes.slug == post_slug))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn post(slug: &str, status: &str, published_at: Option<&str>) -> Post {
        serde_json::from_value(json!({
            "id": slug, "type": "post",
            "attributes": {"title": slug, "slug": slug, "status": status, "published_at": published_at}
        })).unwrap()
    }

    #[test]
    fn test_list_path() {
        assert_eq!(
            list_path("notes", Some("hello"), None, 1),
            "/api/v1/posts?filter%5Bblog_slug%5D=notes&filter%5Bstatus%5D=published&sort=-published_at&page%5Bsize%5D=1&filter%5Bslug%5D=hello"
        );
        assert_eq!(
            list_path("notes", None, Some(3), 10),
            "/api/v1/posts?filter%5Bblog_slug%5D=notes&filter%5Bstatus%5D=published&sort=-published_at&page%5Bsize%5D=10&page%5Bnumber%5D=3"
        );
    }

    #[test]
    fn test_sort_published() {
        let posts = sort_published(vec![
            post("old", "published", Some("2023-01-01T00:00:00Z")),
            post("draft", "draft", None),
            post("new", "published", Some("2024-01-01T00:00:00Z")),
        ]);
        let slugs: Vec<_> = posts.iter().map(|p| p.attributes.slug.as_str()).collect();
        assert_eq!(slugs, ["new", "old"]);
    }
}
