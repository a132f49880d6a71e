use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::model::post::Post;
use crate::revalidation::post_path;
use crate::view::rss_renderer::push_text;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub struct Sitemap<'a> {
    pub site_url: &'a str,
    pub blog_slug: &'a str,
}

impl Sitemap<'_> {
    /// Home page first, then one entry per post.
    pub fn render(&self, posts: &[Post]) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut urlset = BytesStart::new("urlset");
        urlset.push_attribute(("xmlns", SITEMAP_NS));
        writer.write_event(Event::Start(urlset))?;

        let home_modified = posts.iter().filter_map(|p| p.attributes.published_at).max();
        self.push_url(&mut writer, &format!("{}/", self.site_url), home_modified.map(|d| d.to_rfc3339()), "daily", "1.0")?;

        for post in posts {
            let attrs = &post.attributes;
            let loc = format!("{}{}", self.site_url, post_path(self.blog_slug, &attrs.slug));
            let last_modified = attrs.updated_at.or(attrs.published_at).map(|d| d.to_rfc3339());
            self.push_url(&mut writer, &loc, last_modified, "weekly", "0.8")?;
        }

        writer.write_event(Event::End(BytesEnd::new("urlset")))?;
        Ok(writer.into_inner().into_inner())
    }

    fn push_url(&self, writer: &mut Writer<Cursor<Vec<u8>>>, loc: &str, last_modified: Option<String>,
                change_freq: &str, priority: &str) -> quick_xml::Result<()> {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        push_text(writer, "loc", loc)?;
        if let Some(last_modified) = last_modified {
            push_text(writer, "lastmod", &last_modified)?;
        }
        push_text(writer, "changefreq", change_freq)?;
        push_text(writer, "priority", priority)?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str;

    use serde_json::json;

    use super::*;

    #[test]
    fn render_sitemap() {
        let post: Post = serde_json::from_value(json!({
            "id": "1", "type": "post",
            "attributes": {"title": "t", "slug": "hello", "status": "published", "published_at": "2024-01-02T05:06:07Z"}
        })).unwrap();

        let sitemap = Sitemap { site_url: "https://blog.example.com", blog_slug: "notes" };
        let xml = sitemap.render(&[post]).unwrap();
        assert_eq!(
            str::from_utf8(&xml).unwrap(),
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
                r#"<url><loc>https://blog.example.com/</loc><lastmod>2024-01-02T05:06:07+00:00</lastmod><changefreq>daily</changefreq><priority>1.0</priority></url>"#,
                r#"<url><loc>https://blog.example.com/blog/notes/hello</loc><lastmod>2024-01-02T05:06:07+00:00</lastmod><changefreq>weekly</changefreq><priority>0.8</priority></url>"#,
                "</urlset>"
            )
        );
    }

    #[test]
    fn render_empty_sitemap() {
        let sitemap = Sitemap { site_url: "https://blog.example.com", blog_slug: "notes" };
        let xml = sitemap.render(&[]).unwrap();
        assert!(str::from_utf8(&xml).unwrap().contains("<loc>https://blog.example.com/</loc><changefreq>daily</changefreq>"));
    }
}
