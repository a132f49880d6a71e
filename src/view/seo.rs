use crate::config::Site;
use crate::model::post::Post;
use crate::revalidation::post_path;
use crate::text_utils::truncate_words;

const DESCRIPTION_MAX_CHARS: usize = 160;

/// Head metadata of a public page.
#[derive(ramhorns::Content, Debug, PartialEq)]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub og_type: &'static str,
    pub has_published_time: bool,
    /// RFC 3339, empty when unpublished
    pub published_time: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl SeoMeta {
    pub fn for_home(site: &Site, page: u32) -> Self {
        let canonical_url = match page {
            0 | 1 => format!("{}/", site.url),
            n => format!("{}/?page={}", site.url, n),
        };

        SeoMeta {
            title: site.title.clone(),
            description: site.description.clone(),
            canonical_url,
            og_type: "website",
            has_published_time: false,
            published_time: String::new(),
        }
    }

    /// `text` is the plain text body, used when no description was written.
    pub fn for_post(site: &Site, blog_slug: &str, post: &Post, text: &str) -> Self {
        let attrs = &post.attributes;

        let title = non_empty(attrs.seo_title.as_deref())
            .unwrap_or(attrs.title.as_str())
            .to_string();

        let description = match non_empty(attrs.seo_description.as_deref()).or(non_empty(attrs.excerpt.as_deref())) {
            Some(d) => d.to_string(),
            None => truncate_words(text, DESCRIPTION_MAX_CHARS),
        };

        let published_time = attrs.published_at.map(|dt| dt.to_rfc3339()).unwrap_or_default();
        SeoMeta {
            title,
            description,
            canonical_url: format!("{}{}", site.url, post_path(blog_slug, &attrs.slug)),
            og_type: "article",
            has_published_time: !published_time.is_empty(),
            published_time,
        }
    }
}
