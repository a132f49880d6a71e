use std::io;

use ramhorns::Template;

use crate::view::parse_template;

/// Pages with no backend data: auth forms, the dashboard shell and the not found page.
#[derive(ramhorns::Content, Default)]
pub struct ShellPage<'a> {
    pub site_title: &'a str,
    pub page_title: &'a str,
    /// Dashboard section: `overview`, `posts`, `new` or `edit`
    pub section: &'a str,
    pub post_id: &'a str,
    pub blog_slug: &'a str,
    pub autosave_debounce_ms: u64,
}

pub struct PageRenderer<'a> {
    pub template: Template<'a>,
}

impl PageRenderer<'_> {
    pub fn new(tpl_src: &str) -> io::Result<PageRenderer> {
        Ok(PageRenderer {
            template: parse_template(tpl_src, "page")?,
        })
    }

    pub fn render(&self, page: &ShellPage) -> String {
        self.template.render(page)
    }
}
