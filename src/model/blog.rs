use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DefaultBlog;
use crate::model::{Document, Resource};

pub type Blog = Resource<BlogAttributes>;
pub type BlogDocument = Document<Blog>;
pub type BlogListDocument = Document<Vec<Blog>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogAttributes {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    pub status: BlogStatus,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Flat body accepted by `POST /api/blogs`. Missing fields come from `[default_blog]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBlog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateBlogAttributes {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub status: BlogStatus,
}

impl NewBlog {
    pub fn from_defaults(defaults: &DefaultBlog) -> Self {
        NewBlog {
            name: Some(defaults.name.clone()),
            slug: Some(defaults.slug.clone()),
            description: Some(defaults.description.clone()),
        }
    }

    pub fn into_attributes(self, defaults: &DefaultBlog) -> CreateBlogAttributes {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        CreateBlogAttributes {
            name: non_empty(self.name).unwrap_or_else(|| defaults.name.clone()),
            slug: non_empty(self.slug).unwrap_or_else(|| defaults.slug.clone()),
            description: non_empty(self.description).unwrap_or_else(|| defaults.description.clone()),
            status: BlogStatus::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> DefaultBlog {
        DefaultBlog {
            name: "Default".to_string(),
            slug: "default".to_string(),
            description: "Default blog".to_string(),
        }
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let blog = NewBlog {
            name: Some("Mine".to_string()),
            slug: Some("".to_string()),
            description: None,
        };
        let attrs = blog.into_attributes(&defaults());
        assert_eq!(attrs.name, "Mine");
        assert_eq!(attrs.slug, "default");
        assert_eq!(attrs.description, "Default blog");
        assert_eq!(attrs.status, BlogStatus::Active);
    }
}
