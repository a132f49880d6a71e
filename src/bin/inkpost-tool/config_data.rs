use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;

const CONFIG_SAMPLE: &str = r#"[server]
address = "0.0.0.0"
port = 3000

# JSON:API backend the dashboard proxies to
[backend]
base_url = "https://api.example.com"
timeout_secs = 10
# public_token = "read-only token for the public pages"

[site]
url = "https://blog.example.com"
title = "My blog"
description = "Things I write about"
# Blog rendered on /, /rss.xml and /sitemap.xml
blog_slug = "my-blog"

# Used when a blog is created without name, slug or description
[default_blog]
name = "My blog"
slug = "my-blog"
description = "Things I write about"

# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
[paths]
template_dir = "res/template"
public_dir = "res/public"

[cookies]
secure = false

# Leave empty to read REVALIDATE_SECRET from the environment
[revalidate]
secret = "{{SECRET}}"

[cache]
enabled = true
ttl_secs = 3600

[feed]
page_size = 50
home_page_size = 10

[editor]
autosave_debounce_ms = 1000

[log]
level = "Info"
log_to_console = true
# location = "/var/log/inkpost/server.log"
"#;

fn get_sample_cfg() -> String {
    let secret = format!("{:x}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());
    CONFIG_SAMPLE.replace("{{SECRET}}", &secret)
}

pub(crate) fn write_sample_cfg(file_path: Option<&Path>) -> io::Result<()> {
    let sample = get_sample_cfg();
    match file_path {
        Some(path) => File::create(path)?.write_all(sample.as_bytes()),
        None => io::stdout().write_all(sample.as_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use inkpost::config::parse_config;

    use super::*;

    #[test]
    fn test_sample_parses() {
        let cfg = parse_config(&get_sample_cfg()).unwrap();
        assert_eq!(cfg.site.blog_slug, "my-blog");
        assert_eq!(cfg.editor.autosave_debounce_ms, 1000);
        assert!(cfg.revalidate.secret.is_some_and(|s| !s.is_empty()));
        assert!(cfg.log.is_some());
    }
}
