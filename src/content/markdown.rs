use std::io;
use std::io::ErrorKind;

use markdown::Options;

/// Strips `<!-- ... -->` blocks, `<!-- more -->` markers included.
pub fn remove_comments(md_text: &str) -> io::Result<String> {
    const START: &str = "<!--";
    const END: &str = "-->";

    let mut res = String::with_capacity(md_text.len());
    let mut rest = md_text;
    while let Some(start) = rest.find(START) {
        res.push_str(&rest[..start]);
        let after = &rest[start + START.len()..];
        let Some(end) = after.find(END) else {
            return Err(io::Error::new(ErrorKind::InvalidData, "Error finding end of comment"));
        };
        rest = &after[end + END.len()..];
    }
    res.push_str(rest);

    Ok(res)
}

/// Renders legacy string content (markdown) to HTML, for posts without a document tree.
pub fn render_markdown(md_text: &str) -> io::Result<String> {
    let buf = remove_comments(md_text)?;
    markdown::to_html_with_options(&buf, &Options::gfm())
        .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_comments() {
        assert_eq!(remove_comments("Some text.<!-- more -->Wo<!-- xyz -->rd").unwrap(), "Some text.Word");
        assert_eq!(remove_comments("").unwrap(), "");
        assert_eq!(remove_comments("<!-- more --><!-- xyz -->").unwrap(), "");
        assert!(remove_comments("open <!-- never closed").is_err());
    }

    #[test]
    fn test_render_markdown() {
        let html = render_markdown("# Title\n\nSome *text*<!-- more -->").unwrap();
        assert_eq!(html, "<h1>Title</h1>\n<p>Some <em>text</em></p>");
    }
}
