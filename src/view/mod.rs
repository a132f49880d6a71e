use std::io::ErrorKind;
use std::path::Path;
use std::{fs, io};

use ramhorns::Template;

pub mod list_renderer;
pub mod page_renderer;
pub mod post_renderer;
pub mod rss_renderer;
pub mod seo;
pub mod sitemap_renderer;

fn parse_template<'a>(tpl_src: &'a str, kind: &str) -> io::Result<Template<'a>> {
    match Template::new(tpl_src) {
        Ok(template) => Ok(template),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing {} template: {}", kind, e))),
    }
}

/// Templates are read on every render so edits show up without a restart.
pub fn load_template(template_dir: &Path, name: &str) -> io::Result<String> {
    let template_path = template_dir.join(name);
    match fs::read_to_string(&template_path) {
        Ok(src) => Ok(src),
        Err(e) => Err(io::Error::new(e.kind(), format!("Error reading template {}: {}", template_path.display(), e))),
    }
}
