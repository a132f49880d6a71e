use std::io;

use ramhorns::Template;

use crate::model::post::Post;
use crate::revalidation::post_path;
use crate::text_utils::{format_date, truncate_words};
use crate::view::parse_template;
use crate::view::seo::SeoMeta;

const SUMMARY_MAX_CHARS: usize = 240;

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    site_title: &'a str,
    site_description: &'a str,
    seo: SeoMeta,
    post_list: Vec<PostItem>,
    page_list: Vec<ViewPagination>,
    show_pagination: bool,
    has_posts: bool,
}

#[derive(ramhorns::Content)]
struct PostItem {
    date: String,
    link: String,
    title: String,
    summary: String,
    featured: bool,
}

#[derive(ramhorns::Content)]
struct ViewPagination {
    current: bool,
    number: u32,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
    pub page_count: u32,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str, page_count: u32) -> io::Result<ListRenderer> {
        Ok(ListRenderer {
            template: parse_template(list_tpl_src, "list")?,
            page_count,
        })
    }

    pub fn render(&self, site_title: &str, site_description: &str, seo: SeoMeta,
                  blog_slug: &str, posts: &[Post], cur_page: u32) -> String {
        let post_list = posts.iter()
            .map(|post| {
                let attrs = &post.attributes;
                let summary = attrs.excerpt.as_deref()
                    .or(attrs.content_text.as_deref())
                    .map(|s| truncate_words(s, SUMMARY_MAX_CHARS))
                    .unwrap_or_default();
                PostItem {
                    date: attrs.published_at.as_ref().map(format_date).unwrap_or_default(),
                    link: post_path(blog_slug, &attrs.slug),
                    title: attrs.title.clone(),
                    summary,
                    featured: attrs.featured,
                }
            })
            .collect();

        let page_list = (1..=self.page_count)
            .map(|number| ViewPagination { current: number == cur_page, number })
            .collect();

        self.template.render(&ListPage {
            site_title,
            site_description,
            seo,
            post_list,
            page_list,
            show_pagination: self.page_count > 1,
            has_posts: !posts.is_empty(),
        })
    }
}
