use std::path::PathBuf;
use std::{env, io};

use inkpost::config::{read_config, Config};
use inkpost::view::load_template;

use crate::CFG_FILE_NAME;

/// Looks next to the executable, then in the current dir, then in the user config dir.
fn get_config_path() -> Option<PathBuf> {
    let mut candidates = vec![];
    if let Some(exe_dir) = env::current_exe().ok().and_then(|p| p.parent().map(PathBuf::from)) {
        candidates.push(exe_dir);
    }
    if let Ok(cur_dir) = env::current_dir() {
        candidates.push(cur_dir);
    }
    if let Some(cfg_dir) = dirs::config_dir() {
        candidates.push(cfg_dir.join("inkpost"));
        candidates.push(cfg_dir);
    }

    candidates.into_iter()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(get_config_path) {
        Some(path) => path,
        None => return Err(format!("Could not find Inkpost configuration ({})", CFG_FILE_NAME)),
    };

    println!("Reading config from {}", config_path.display());
    let config = match read_config(&config_path) {
        Ok(config) => config,
        Err(e) => return Err(e.to_string()),
    };

    match config.log {
        Some(ref log) => match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled. Files will be written in the user cache dir"),
        },
        None => println!("Log disabled. Using stdout"),
    }

    if config.revalidate.secret.is_none() {
        println!("Revalidation secret not set. Set [revalidate] secret or REVALIDATE_SECRET to enable /api/revalidate");
    }

    Ok(config)
}

const TEMPLATES: [&str; 6] = ["index.tpl", "post.tpl", "not_found.tpl", "login.tpl", "signup.tpl", "dashboard.tpl"];

/// Every page template has to be readable before the server starts answering.
pub(crate) fn check_templates(config: &Config) -> io::Result<()> {
    for name in TEMPLATES {
        load_template(&config.paths.template_dir, name)?;
    }
    if !config.paths.public_dir.is_dir() {
        return Err(io::Error::new(io::ErrorKind::NotFound,
                                  format!("Public dir {} not found", config.paths.public_dir.display())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use inkpost::config::parse_config;

    use super::*;

    fn config_with(template_dir: &str) -> Config {
        parse_config(&format!(r#"
[server]
address = "127.0.0.1"
port = 3000

[backend]
base_url = "http://127.0.0.1:4000"

[site]
url = "http://127.0.0.1:3000"
title = "t"
description = "d"
blog_slug = "notes"

[default_blog]
name = "n"
slug = "notes"
description = "d"

[paths]
template_dir = "{}"
public_dir = "res/public"
"#, template_dir)).unwrap()
    }

    #[test]
    fn test_check_templates() {
        assert!(check_templates(&config_with("res/template")).is_ok());

        let err = check_templates(&config_with("res/missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("index.tpl"));
    }
}
