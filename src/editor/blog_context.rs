use spdlog::info;

use crate::editor::api::{BlogApi, ClientError};
use crate::model::blog::{Blog, NewBlog};

/// Returns the blog posts are written to, creating it from `defaults` when the account has none.
/// A blog whose slug matches the default wins over the first one listed.
pub async fn ensure_default_blog<A: BlogApi>(api: &A, defaults: &NewBlog) -> Result<Blog, ClientError> {
    let blogs = api.list_blogs().await?;

    let wanted = defaults.slug.as_deref();
    let existing = match blogs.iter().position(|b| Some(b.attributes.slug.as_str()) == wanted) {
        Some(pos) => blogs.into_iter().nth(pos),
        None => blogs.into_iter().next(),
    };
    if let Some(blog) = existing {
        return Ok(blog);
    }

    info!("No blog found, creating {}", wanted.unwrap_or("the default blog"));
    api.create_blog(defaults).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Blogs {
        blogs: Mutex<Vec<Blog>>,
        created: Mutex<u32>,
    }

    fn blog(slug: &str) -> Blog {
        serde_json::from_value(json!({
            "id": slug, "type": "blog", "attributes": {"name": slug, "slug": slug, "status": "active"}
        })).unwrap()
    }

    impl BlogApi for Blogs {
        async fn list_blogs(&self) -> Result<Vec<Blog>, ClientError> {
            Ok(self.blogs.lock().unwrap().clone())
        }

        async fn create_blog(&self, new_blog: &NewBlog) -> Result<Blog, ClientError> {
            *self.created.lock().unwrap() += 1;
            let created = blog(new_blog.slug.as_deref().unwrap_or("default"));
            self.blogs.lock().unwrap().push(created.clone());
            Ok(created)
        }
    }

    fn defaults() -> NewBlog {
        NewBlog { slug: Some("notes".to_string()), ..Default::default() }
    }

    #[tokio::test]
    async fn test_creates_once() {
        let api = Blogs::default();
        assert_eq!(ensure_default_blog(&api, &defaults()).await.unwrap().attributes.slug, "notes");
        assert_eq!(ensure_default_blog(&api, &defaults()).await.unwrap().attributes.slug, "notes");
        assert_eq!(*api.created.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_prefers_matching_slug() {
        let api = Blogs::default();
        *api.blogs.lock().unwrap() = vec![blog("other"), blog("notes")];
        assert_eq!(ensure_default_blog(&api, &defaults()).await.unwrap().attributes.slug, "notes");

        *api.blogs.lock().unwrap() = vec![blog("other")];
        assert_eq!(ensure_default_blog(&api, &defaults()).await.unwrap().attributes.slug, "other");
        assert_eq!(*api.created.lock().unwrap(), 0);
    }
}
