use lazy_static::lazy_static;
use quick_xml::escape::escape;
use regex::Regex;

use crate::content::document::{Mark, Node};

lazy_static! {
    static ref COLOR_REGEX: Regex = Regex::new(
        r"^(#[0-9a-fA-F]{3,8}|rgba?\([0-9.,\s%]+\)|[a-zA-Z]+)$"
    ).unwrap();
}

const ALIGNMENTS: &[&str] = &["left", "center", "right", "justify"];

/// Renders an editor document to HTML. Unknown nodes render their children only.
pub struct HtmlRenderer {
    buf: String,
}

impl HtmlRenderer {
    pub fn render(doc: &Node) -> String {
        let mut renderer = HtmlRenderer { buf: String::new() };
        renderer.node(doc);
        renderer.buf
    }

    fn node(&mut self, node: &Node) {
        match node.kind.as_str() {
            "doc" => self.children(node),
            "text" => self.text(node),
            "paragraph" => {
                let style = align_style(node);
                self.wrap("p", &style, node);
            }
            "heading" => {
                let level = node.attr_u64("level").unwrap_or(1).clamp(1, 6);
                let style = align_style(node);
                self.wrap(&format!("h{}", level), &style, node);
            }
            "blockquote" => self.wrap("blockquote", "", node),
            "bulletList" => self.wrap("ul", "", node),
            "orderedList" => {
                let start = match node.attr_u64("start") {
                    Some(start) if start != 1 => format!(r#" start="{}""#, start),
                    _ => String::new(),
                };
                self.wrap("ol", &start, node);
            }
            "listItem" => self.wrap("li", "", node),
            "codeBlock" => {
                let class = node.attr_str("language")
                    .filter(|lang| lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '+'))
                    .map(|lang| format!(r#" class="language-{}""#, lang))
                    .unwrap_or_default();
                self.buf.push_str("<pre><code");
                self.buf.push_str(&class);
                self.buf.push('>');
                self.children(node);
                self.buf.push_str("</code></pre>");
            }
            "horizontalRule" => self.buf.push_str("<hr>"),
            "hardBreak" => self.buf.push_str("<br>"),
            "image" => self.image(node),
            _ => self.children(node),
        }
    }

    fn children(&mut self, node: &Node) {
        for child in &node.content {
            self.node(child);
        }
    }

    fn wrap(&mut self, tag: &str, attrs: &str, node: &Node) {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push_str(attrs);
        self.buf.push('>');
        self.children(node);
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    fn image(&mut self, node: &Node) {
        let Some(src) = node.attr_str("src").filter(|src| is_safe_image_src(src)) else {
            return;
        };
        self.buf.push_str(&format!(r#"<img src="{}""#, escape(src)));
        if let Some(alt) = node.attr_str("alt") {
            self.buf.push_str(&format!(r#" alt="{}""#, escape(alt)));
        }
        if let Some(title) = node.attr_str("title") {
            self.buf.push_str(&format!(r#" title="{}""#, escape(title)));
        }
        self.buf.push('>');
    }

    fn text(&mut self, node: &Node) {
        let text = node.text.as_deref().unwrap_or_default();
        let opened: Vec<(&'static str, String)> = node.marks.iter().filter_map(open_mark).collect();
        for (tag, attrs) in &opened {
            self.buf.push('<');
            self.buf.push_str(tag);
            self.buf.push_str(attrs);
            self.buf.push('>');
        }
        self.buf.push_str(&escape(text));
        for (tag, _) in opened.iter().rev() {
            self.buf.push_str("</");
            self.buf.push_str(tag);
            self.buf.push('>');
        }
    }
}

fn align_style(node: &Node) -> String {
    match node.attr_str("textAlign") {
        Some(align) if align != "left" && ALIGNMENTS.contains(&align) => {
            format!(r#" style="text-align: {}""#, align)
        }
        _ => String::new(),
    }
}

fn open_mark(mark: &Mark) -> Option<(&'static str, String)> {
    let plain = |tag: &'static str| Some((tag, String::new()));
    match mark.kind.as_str() {
        "bold" => plain("strong"),
        "italic" => plain("em"),
        "underline" => plain("u"),
        "strike" => plain("s"),
        "code" => plain("code"),
        "link" => {
            let href = mark.attr_str("href").filter(|href| is_safe_href(href))?;
            Some(("a", format!(r#" href="{}" rel="noopener noreferrer nofollow""#, escape(href))))
        }
        "textStyle" => {
            let color = mark.attr_str("color").filter(|c| COLOR_REGEX.is_match(c))?;
            Some(("span", format!(r#" style="color: {}""#, escape(color))))
        }
        _ => None,
    }
}

fn is_safe_href(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with('/')
        || lower.starts_with('#')
}

fn is_safe_image_src(src: &str) -> bool {
    let lower = src.trim().to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with('/')
        || lower.starts_with("data:image/")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn render(value: serde_json::Value) -> String {
        HtmlRenderer::render(&Node::from_value(&value).unwrap())
    }

    #[test]
    fn test_blocks_and_marks() {
        let html = render(json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2, "textAlign": "center"}, "content": [{"type": "text", "text": "Title"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "a < b "},
                    {"type": "text", "text": "bold it", "marks": [{"type": "bold"}, {"type": "italic"}]},
                    {"type": "hardBreak"},
                    {"type": "text", "text": "link", "marks": [{"type": "link", "attrs": {"href": "https://example.com/?a=1&b=2"}}]}
                ]},
                {"type": "horizontalRule"}
            ]
        }));
        assert_eq!(html, concat!(
            r#"<h2 style="text-align: center">Title</h2>"#,
            r#"<p>a &lt; b <strong><em>bold it</em></strong><br>"#,
            r#"<a href="https://example.com/?a=1&amp;b=2" rel="noopener noreferrer nofollow">link</a></p>"#,
            "<hr>"
        ));
    }

    #[test]
    fn test_lists_and_code() {
        let html = render(json!({
            "type": "doc",
            "content": [
                {"type": "orderedList", "attrs": {"start": 3}, "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "three"}]}]}
                ]},
                {"type": "codeBlock", "attrs": {"language": "rust"}, "content": [{"type": "text", "text": "fn main() {}"}]},
                {"type": "blockquote", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "q"}]}]}
            ]
        }));
        assert_eq!(html, concat!(
            r#"<ol start="3"><li><p>three</p></li></ol>"#,
            r#"<pre><code class="language-rust">fn main() {}</code></pre>"#,
            "<blockquote><p>q</p></blockquote>"
        ));
    }

    #[test]
    fn test_unsafe_links_and_images_are_dropped() {
        let html = render(json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "x", "marks": [{"type": "link", "attrs": {"href": "javascript:alert(1)"}}]},
                    {"type": "text", "text": "y", "marks": [{"type": "textStyle", "attrs": {"color": "red;background:url(x)"}}]}
                ]},
                {"type": "image", "attrs": {"src": "javascript:alert(1)"}},
                {"type": "image", "attrs": {"src": "/img/a.png", "alt": "\"A\""}}
            ]
        }));
        assert_eq!(html, r#"<p>xy</p><img src="/img/a.png" alt="&quot;A&quot;">"#);
    }

    #[test]
    fn test_color_and_unknown_nodes() {
        let html = render(json!({
            "type": "doc",
            "content": [
                {"type": "customWidget", "content": [
                    {"type": "text", "text": "c", "marks": [{"type": "textStyle", "attrs": {"color": "#ff0000"}}]}
                ]}
            ]
        }));
        assert_eq!(html, r#"<span style="color: #ff0000">c</span>"#);
    }
}
