use std::io;
use std::sync::Arc;

use chrono::Duration;
use ntex::web;
use spdlog::info;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::page_cache::{Expire, PageCache};
use crate::routes;

pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
    /// Rendered public pages (HTML, RSS, sitemap) keyed by request path
    pub pages: PageCache<String>,
}

impl AppState {
    pub fn new(config: Config) -> io::Result<Self> {
        let backend = match BackendClient::new(&config.backend) {
            Ok(backend) => backend,
            Err(e) => return Err(io::Error::new(io::ErrorKind::Other, format!("Error creating backend client: {}", e))),
        };

        let pages = if config.cache.enabled {
            PageCache::new()
        } else {
            PageCache::non_caching()
        };

        Ok(AppState {
            config,
            backend,
            pages,
        })
    }

    pub fn page_expiry(&self) -> Expire {
        match self.config.cache.ttl_secs {
            ttl if ttl > 0 => Expire::After(Duration::seconds(ttl)),
            _ => Expire::Never,
        }
    }
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;

    info!("Backend: {}", config.backend.base_url);
    info!("Public blog: {} at {}", config.site.blog_slug, config.site.url);
    if config.revalidate.secret.is_none() {
        info!("No revalidation secret configured, POST /api/revalidate is disabled");
    }

    let app_state = Arc::new(AppState::new(config)?);

    info!("Listening on {}:{}", bind_addr, bind_port);
    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .configure(routes::configure)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
