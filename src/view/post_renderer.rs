use std::io;

use ramhorns::Template;

use crate::content::RenderedBody;
use crate::model::post::Post;
use crate::text_utils::{format_date, reading_time_minutes};
use crate::view::parse_template;
use crate::view::seo::SeoMeta;

#[derive(ramhorns::Content)]
struct PostPage<'a> {
    site_title: &'a str,
    seo: SeoMeta,
    post_title: &'a str,
    date: String,
    reading_time: u32,
    featured: bool,
    post_content: &'a str,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        Ok(PostRenderer {
            template: parse_template(view_tpl_src, "post view")?,
        })
    }

    pub fn render(&self, site_title: &str, seo: SeoMeta, post: &Post, body: &RenderedBody) -> String {
        let attrs = &post.attributes;
        let reading_time = attrs.reading_time_minutes
            .filter(|m| *m > 0)
            .unwrap_or_else(|| reading_time_minutes(&body.text));

        self.template.render(&PostPage {
            site_title,
            seo,
            post_title: attrs.title.as_str(),
            date: attrs.published_at.as_ref().map(format_date).unwrap_or_default(),
            reading_time,
            featured: attrs.featured,
            post_content: body.html.as_str(),
        })
    }
}
