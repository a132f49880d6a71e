use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use spdlog::{info, warn};

use inkpost::logger::configure_logger;
use inkpost::server::server_run;

use crate::config::{check_templates, open_config};

mod config;

const CFG_FILE_NAME: &str = "inkpost.toml";

/// Dashboard proxy and public pages for a JSON:API blog backend
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// inkpost.toml to use instead of searching the default locations
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Validates the configuration and templates, then exits
    #[arg(long)]
    check: bool,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = open_config(args.config_path)
        .map_err(|err| anyhow!("{}. Create one with `inkpost-tool sample-config`", err))?;
    check_templates(&config)?;
    if args.check {
        println!("Configuration OK");
        return Ok(());
    }

    if let Err(err) = configure_logger(config.log.as_ref()) {
        warn!("Log sinks unavailable, logging to console: {}", err);
    }

    info!("inkpost {} serving {} for blog '{}'", env!("CARGO_PKG_VERSION"), config.site.url, config.site.blog_slug);
    server_run(config).await?;
    Ok(())
}
