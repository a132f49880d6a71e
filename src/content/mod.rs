//! Post bodies: the editor's document tree and the legacy markdown string.

use std::io;

use spdlog::warn;

use crate::content::document::Node;
use crate::content::html_renderer::HtmlRenderer;
use crate::content::markdown::{remove_comments, render_markdown};
use crate::model::post::PostAttributes;

pub mod document;
pub mod html_renderer;
pub mod markdown;

pub struct RenderedBody {
    pub html: String,
    pub text: String,
}

/// Picks the best available representation: stored HTML, then the document tree, then markdown.
/// A tree without children counts as missing.
pub fn render_body(attrs: &PostAttributes) -> io::Result<RenderedBody> {
    let doc = attrs.content_json.as_ref().and_then(|value| match Node::from_value(value) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!("Ignoring invalid content_json for post {}: {}", attrs.slug, e);
            None
        }
    }).filter(|doc| !doc.content.is_empty());

    let stored_html = attrs.content_html.as_deref().filter(|html| !html.trim().is_empty());
    let markdown = attrs.content.as_deref().filter(|md| !md.trim().is_empty());

    let html = match (stored_html, &doc, markdown) {
        (Some(html), _, _) => html.to_string(),
        (None, Some(doc), _) => HtmlRenderer::render(doc),
        (None, None, Some(md)) => render_markdown(md)?,
        (None, None, None) => String::new(),
    };

    let text = match (attrs.content_text.as_deref(), &doc, markdown) {
        (Some(text), _, _) if !text.trim().is_empty() => text.to_string(),
        (_, Some(doc), _) => doc.plain_text(),
        (_, None, Some(md)) => remove_comments(md)?,
        _ => String::new(),
    };

    Ok(RenderedBody { html, text })
}
