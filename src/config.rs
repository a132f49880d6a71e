use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Backend {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Token used for public (unauthenticated) reads, if the backend wants one
    pub public_token: Option<String>,
}

#[derive(Deserialize)]
pub struct Site {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Blog rendered on the public pages
    pub blog_slug: String,
}

#[derive(Deserialize, Clone)]
pub struct DefaultBlog {
    pub name: String,
    pub slug: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Deserialize, Default)]
pub struct Cookies {
    #[serde(default)]
    pub secure: bool,
}

#[derive(Deserialize, Default)]
pub struct Revalidate {
    pub secret: Option<String>,
}

#[derive(Deserialize)]
pub struct Cache {
    pub enabled: bool,
    pub ttl_secs: i64,
}

#[derive(Deserialize)]
pub struct Feed {
    pub page_size: u32,
    pub home_page_size: u32,
}

#[derive(Deserialize)]
pub struct Editor {
    pub autosave_debounce_ms: u64,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub server: Server,
    pub backend: Backend,
    pub site: Site,
    pub default_blog: DefaultBlog,
    pub paths: Paths,
    #[serde(default)]
    pub cookies: Cookies,
    #[serde(default)]
    pub revalidate: Revalidate,
    #[serde(default = "default_cache")]
    pub cache: Cache,
    #[serde(default = "default_feed")]
    pub feed: Feed,
    #[serde(default = "default_editor")]
    pub editor: Editor,
    pub log: Option<Log>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cache() -> Cache {
    Cache {
        enabled: true,
        ttl_secs: 3600,
    }
}

fn default_feed() -> Feed {
    Feed {
        page_size: 50,
        home_page_size: 10,
    }
}

fn default_editor() -> Editor {
    Editor {
        autosave_debounce_ms: 1000,
    }
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if !path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe.parent().unwrap_or(Path::new("."));
    let str_path = path.to_string_lossy();
    Ok(PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.site.url = cfg.site.url.trim_end_matches('/').to_string();
    cfg.backend.base_url = cfg.backend.base_url.trim_end_matches('/').to_string();

    if cfg.revalidate.secret.is_none() {
        cfg.revalidate.secret = env::var("REVALIDATE_SECRET").ok().filter(|s| !s.is_empty());
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let mut cfg = parse_config(&cfg_content)?;
    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir)?,
        public_dir: parse_path(cfg.paths.public_dir)?,
    };

    Ok(cfg)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r##"
[server]
address = "127.0.0.1"
port = 3000

[backend]
base_url = "https://baas.example.com/"

[site]
url = "https://blog.example.com/"
title = "Engineering notes"
description = "Notes on systems"
blog_slug = "notes"

[default_blog]
name = "Engineering notes"
slug = "notes"
description = "A blog about software engineering"

[paths]
template_dir = "res/template"
public_dir = "res/public"

[revalidate]
secret = "s3cret"
"##;

    pub(crate) fn sample_config() -> Config {
        parse_config(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let cfg = sample_config();
        assert_eq!(cfg.site.url, "https://blog.example.com");
        assert_eq!(cfg.backend.base_url, "https://baas.example.com");
        assert_eq!(cfg.backend.timeout_secs, 10);
        assert_eq!(cfg.feed.page_size, 50);
        assert_eq!(cfg.editor.autosave_debounce_ms, 1000);
        assert!(cfg.cache.enabled);
        assert!(!cfg.cookies.secure);
        assert_eq!(cfg.revalidate.secret.as_deref(), Some("s3cret"));
        assert!(cfg.log.is_none());
    }

    #[test]
    fn test_parse_invalid() {
        let err = parse_config("[server]\nport = \"x\"").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_exe_dir_untouched_without_marker() {
        let path = parse_path(PathBuf::from("res/template")).unwrap();
        assert_eq!(path, PathBuf::from("res/template"));
    }
}
