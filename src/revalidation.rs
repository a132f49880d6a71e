//! Cache tags and paths touched when a post changes visibility.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevalidateTargets {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub paths: Vec<String>,
}

impl RevalidateTargets {
    /// Public pages showing the given post: its own page, the blog listing, sitemap and RSS.
    pub fn for_post(blog_slug: &str, post_slug: &str) -> Self {
        RevalidateTargets {
            tags: vec![list_tag(blog_slug), post_tag(blog_slug, post_slug)],
            paths: vec![
                "/".to_string(),
                post_path(blog_slug, post_slug),
                "/sitemap.xml".to_string(),
                "/rss.xml".to_string(),
            ],
        }
    }

    /// Drops empty entries.
    pub fn cleaned(self) -> Self {
        RevalidateTargets {
            tags: self.tags.into_iter().filter(|t| !t.is_empty()).collect(),
            paths: self.paths.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.paths.is_empty()
    }
}

pub fn list_tag(blog_slug: &str) -> String {
    format!("posts:list:{}", blog_slug)
}

pub fn post_tag(blog_slug: &str, post_slug: &str) -> String {
    format!("post:{}/{}", blog_slug, post_slug)
}

pub fn post_path(blog_slug: &str, post_slug: &str) -> String {
    format!("/blog/{}/{}", blog_slug, post_slug)
}
