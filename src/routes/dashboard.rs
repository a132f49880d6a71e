//! Server-rendered shells for the dashboard and the auth forms.

use std::sync::Arc;

use ntex::web;
use ntex::web::types::{Path, State};
use ntex::web::{HttpRequest, HttpResponse};
use spdlog::error;

use crate::server::AppState;
use crate::session::access_token;
use crate::view::load_template;
use crate::view::page_renderer::{PageRenderer, ShellPage};

const LOGIN_PATH: &str = "/login";

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .header("Location", location)
        .content_type("text/html; charset=utf-8")
        .finish()
}

fn render_page(state: &AppState, template: &str, page: &ShellPage) -> HttpResponse {
    let rendered = load_template(&state.config.paths.template_dir, template)
        .and_then(|src| Ok(PageRenderer::new(&src)?.render(page)));

    match rendered {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .header("Cache-Control", "no-store, no-cache, must-revalidate, proxy-revalidate")
            .header("Pragma", "no-cache")
            .header("Expires", "0")
            .body(body),
        Err(e) => {
            error!("Error rendering {}: {}", template, e);
            HttpResponse::InternalServerError().body(format!("Error rendering {}", template))
        }
    }
}

/// Dashboard pages need a session; without one the browser goes to the login form.
fn dashboard_page(req: &HttpRequest, state: &AppState, page_title: &str, section: &str, post_id: &str) -> HttpResponse {
    if access_token(req).is_none() {
        return redirect(LOGIN_PATH);
    }

    render_page(state, "dashboard.tpl", &ShellPage {
        site_title: &state.config.site.title,
        page_title,
        section,
        post_id,
        blog_slug: &state.config.site.blog_slug,
        autosave_debounce_ms: state.config.editor.autosave_debounce_ms,
    })
}

#[web::get("/dashboard")]
pub async fn dashboard_home(req: HttpRequest, state: State<Arc<AppState>>) -> HttpResponse {
    dashboard_page(&req, &state, "Dashboard", "overview", "")
}

#[web::get("/dashboard/posts")]
pub async fn dashboard_posts(req: HttpRequest, state: State<Arc<AppState>>) -> HttpResponse {
    dashboard_page(&req, &state, "Posts", "posts", "")
}

#[web::get("/dashboard/posts/new")]
pub async fn dashboard_new_post(req: HttpRequest, state: State<Arc<AppState>>) -> HttpResponse {
    dashboard_page(&req, &state, "New post", "new", "")
}

#[web::get("/dashboard/posts/{id}/edit")]
pub async fn dashboard_edit_post(req: HttpRequest, id: Path<String>, state: State<Arc<AppState>>) -> HttpResponse {
    dashboard_page(&req, &state, "Edit post", "edit", &id)
}

#[web::get("/login")]
pub async fn login_page(state: State<Arc<AppState>>) -> HttpResponse {
    render_page(&state, "login.tpl", &ShellPage {
        site_title: &state.config.site.title,
        page_title: "Log in",
        ..Default::default()
    })
}

#[web::get("/signup")]
pub async fn signup_page(state: State<Arc<AppState>>) -> HttpResponse {
    render_page(&state, "signup.tpl", &ShellPage {
        site_title: &state.config.site.title,
        page_title: "Sign up",
        ..Default::default()
    })
}
