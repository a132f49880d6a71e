use std::fmt::Display;
use std::io;
use std::sync::Arc;

use ntex::web;
use ntex::web::types::{Path, State};
use ntex::web::{HttpRequest, HttpResponse};
use ntex_files::NamedFile;
use spdlog::{debug, error};

use crate::content::render_body;
use crate::paginator::Paginator;
use crate::published::{find_published, list_published, published_page};
use crate::query_string::QueryString;
use crate::revalidation::{list_tag, post_path, post_tag};
use crate::server::AppState;
use crate::view::list_renderer::ListRenderer;
use crate::view::load_template;
use crate::view::page_renderer::{PageRenderer, ShellPage};
use crate::view::post_renderer::PostRenderer;
use crate::view::rss_renderer::RssChannel;
use crate::view::seo::SeoMeta;
use crate::view::sitemap_renderer::Sitemap;

const HTML: &str = "text/html; charset=utf-8";
const RSS: &str = "application/rss+xml; charset=utf-8";
const XML: &str = "application/xml; charset=utf-8";

fn server_error(what: &str, e: impl Display) -> HttpResponse {
    error!("Error {}: {}", what, e);
    HttpResponse::InternalServerError()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Error {}", what))
}

fn home_key(page: u32) -> String {
    match page {
        0 | 1 => "/".to_string(),
        n => format!("/?page={}", n),
    }
}

fn cached(state: &AppState, key: &str, content_type: &str) -> Option<HttpResponse> {
    let page = state.pages.get(key)?;
    debug!("Cache hit for {}", key);
    Some(HttpResponse::Ok().content_type(content_type).body(page.as_str().to_string()))
}

fn store(state: &AppState, key: &str, tags: &[String], content_type: &str, body: String) -> HttpResponse {
    let page = state.pages.insert(key, tags, body, state.page_expiry());
    HttpResponse::Ok().content_type(content_type).body(page.as_str().to_string())
}

/// Renders a home page, returning the page actually rendered with its HTML.
/// Pages past the end render the first one.
async fn render_home(state: &AppState, page: u32) -> io::Result<(u32, String)> {
    let config = &state.config;
    let page_size = config.feed.home_page_size;
    let blog_slug = &config.site.blog_slug;

    let mut listing = published_page(&state.backend, blog_slug, page, page_size).await
        .map_err(io::Error::other)?;
    let mut paginator = Paginator::new(listing.total, page_size);
    let cur_page = paginator.clamp(page);
    if cur_page != page {
        debug!("Home page {} is out of range, rendering page {}", page, cur_page);
        listing = published_page(&state.backend, blog_slug, cur_page, page_size).await
            .map_err(io::Error::other)?;
        paginator = Paginator::new(listing.total, page_size);
    }

    let template_src = load_template(&config.paths.template_dir, "index.tpl")?;
    let renderer = ListRenderer::new(&template_src, paginator.page_count())?;
    let body = renderer.render(
        &config.site.title,
        &config.site.description,
        SeoMeta::for_home(&config.site, cur_page),
        blog_slug,
        &listing.posts,
        cur_page,
    );
    Ok((cur_page, body))
}

/// `Ok(None)` when the post does not exist or is not published.
async fn render_post(state: &AppState, blog_slug: &str, post_slug: &str) -> io::Result<Option<String>> {
    let config = &state.config;
    let Some(post) = find_published(&state.backend, blog_slug, post_slug).await.map_err(io::Error::other)? else {
        return Ok(None);
    };

    let body = render_body(&post.attributes)?;
    let seo = SeoMeta::for_post(&config.site, blog_slug, &post, &body.text);

    let template_src = load_template(&config.paths.template_dir, "post.tpl")?;
    let renderer = PostRenderer::new(&template_src)?;
    Ok(Some(renderer.render(&config.site.title, seo, &post, &body)))
}

fn not_found(state: &AppState) -> HttpResponse {
    let rendered = load_template(&state.config.paths.template_dir, "not_found.tpl")
        .and_then(|src| {
            let renderer = PageRenderer::new(&src)?;
            Ok(renderer.render(&ShellPage {
                site_title: &state.config.site.title,
                page_title: "Page not found",
                ..Default::default()
            }))
        })
        .unwrap_or_else(|e| {
            error!("Error rendering not found page: {}", e);
            "Not found".to_string()
        });

    HttpResponse::NotFound().content_type(HTML).body(rendered)
}

#[web::get("/")]
pub async fn index(req: HttpRequest, state: State<Arc<AppState>>) -> HttpResponse {
    let page = QueryString::from(req.uri().query().unwrap_or_default()).get_page();
    if let Some(resp) = cached(&state, &home_key(page), HTML) {
        return resp;
    }

    // Only pages that exist are stored; out of range requests land on page 1's key.
    match render_home(&state, page).await {
        Ok((cur_page, body)) => store(&state, &home_key(cur_page), &[list_tag(&state.config.site.blog_slug)], HTML, body),
        Err(e) => server_error("listing posts", e),
    }
}

#[web::get("/blog/{blog}/{post}")]
pub async fn view_post(path: Path<(String, String)>, state: State<Arc<AppState>>) -> HttpResponse {
    let (blog_slug, post_slug) = path.into_inner();
    let key = post_path(&blog_slug, &post_slug);
    if let Some(resp) = cached(&state, &key, HTML) {
        return resp;
    }

    match render_post(&state, &blog_slug, &post_slug).await {
        Ok(Some(body)) => store(&state, &key, &[post_tag(&blog_slug, &post_slug)], HTML, body),
        Ok(None) => not_found(&state),
        Err(e) => server_error(&format!("loading post {}", key), e),
    }
}

#[web::get("/rss.xml")]
pub async fn rss(state: State<Arc<AppState>>) -> HttpResponse {
    const KEY: &str = "/rss.xml";
    if let Some(resp) = cached(&state, KEY, RSS) {
        return resp;
    }

    let config = &state.config;
    let posts = match list_published(&state.backend, &config.site.blog_slug, config.feed.page_size).await {
        Ok(posts) => posts,
        Err(e) => return server_error("building RSS feed", e),
    };

    let channel = RssChannel {
        ch_title: &config.site.title,
        ch_link: &config.site.url,
        ch_desc: &config.site.description,
        blog_slug: &config.site.blog_slug,
    };
    match channel.render(&posts).map(String::from_utf8) {
        Ok(Ok(xml)) => store(&state, KEY, &[list_tag(&config.site.blog_slug)], RSS, xml),
        Ok(Err(e)) => server_error("building RSS feed", e),
        Err(e) => server_error("building RSS feed", e),
    }
}

#[web::get("/sitemap.xml")]
pub async fn sitemap(state: State<Arc<AppState>>) -> HttpResponse {
    const KEY: &str = "/sitemap.xml";
    if let Some(resp) = cached(&state, KEY, XML) {
        return resp;
    }

    let config = &state.config;
    let posts = match list_published(&state.backend, &config.site.blog_slug, config.feed.page_size).await {
        Ok(posts) => posts,
        Err(e) => return server_error("building sitemap", e),
    };

    let sitemap = Sitemap {
        site_url: &config.site.url,
        blog_slug: &config.site.blog_slug,
    };
    match sitemap.render(&posts).map(String::from_utf8) {
        Ok(Ok(xml)) => store(&state, KEY, &[list_tag(&config.site.blog_slug)], XML, xml),
        Ok(Err(e)) => server_error("building sitemap", e),
        Err(e) => server_error("building sitemap", e),
    }
}

#[web::get("/robots.txt")]
pub async fn robots(state: State<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n", state.config.site.url))
}

#[web::get("/public/{file_name}")]
pub async fn public_files(path: Path<String>, state: State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    if path.contains("..") {
        return Err(web::error::ErrorForbidden("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}
