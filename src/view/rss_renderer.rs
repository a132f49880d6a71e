use std::io::Cursor;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::model::post::Post;
use crate::revalidation::post_path;

pub struct RssChannel<'a> {
    pub ch_title: &'a str,
    pub ch_link: &'a str,
    pub ch_desc: &'a str,
    pub blog_slug: &'a str,
}

impl RssChannel<'_> {
    pub fn render(&self, posts: &[Post]) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.ch_title)?;
        push_text(&mut writer, "link", self.ch_link)?;
        push_text(&mut writer, "description", self.ch_desc)?;

        for post in posts {
            let attrs = &post.attributes;
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            push_text(&mut writer, "title", &attrs.title)?;

            let link = format!("{}{}", self.ch_link, post_path(self.blog_slug, &attrs.slug));
            push_text(&mut writer, "link", &link)?;

            let mut guid = BytesStart::new("guid");
            guid.push_attribute(("isPermaLink", "false"));
            writer.write_event(Event::Start(guid))?;
            writer.write_event(Event::Text(BytesText::new(&post.id)))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;

            let description = attrs.seo_description.as_deref()
                .or(attrs.excerpt.as_deref())
                .unwrap_or_default();
            push_cdata(&mut writer, "description", description)?;

            if let Some(published_at) = attrs.published_at {
                push_text(&mut writer, "pubDate", &published_at.to_rfc2822())?;
            }

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

pub(crate) fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    let text = text.replace("]]>", "]] >");
    writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str;

    use serde_json::json;

    use super::*;

    fn create_post(id: &str) -> Post {
        serde_json::from_value(json!({
            "id": id,
            "type": "post",
            "attributes": {
                "title": format!("title-of-post-{}", id),
                "slug": format!("post-{}", id),
                "excerpt": format!("summary-of-post-{}", id),
                "status": "published",
                "published_at": "2024-01-02T05:06:07Z"
            }
        })).unwrap()
    }

    #[test]
    fn render_xml() {
        let posts = vec![create_post("1"), create_post("2")];
        let rss = RssChannel {
            ch_title: "my feed",
            ch_link: "https://blog.example.com",
            ch_desc: "My blog feed",
            blog_slug: "notes",
        };
        let xml = rss.render(&posts).unwrap();
        assert_eq!(str::from_utf8(&xml).unwrap(), EXPECTED);
    }

    #[test]
    fn render_empty_channel() {
        let rss = RssChannel {
            ch_title: "t & co",
            ch_link: "https://blog.example.com",
            ch_desc: "d",
            blog_slug: "notes",
        };
        let xml = rss.render(&[]).unwrap();
        assert_eq!(
            str::from_utf8(&xml).unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>t &amp; co</title><link>https://blog.example.com</link><description>d</description></channel></rss>"#
        );
    }

    const EXPECTED: &str = r##"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>my feed</title><link>https://blog.example.com</link><description>My blog feed</description><item><title>title-of-post-1</title><link>https://blog.example.com/blog/notes/post-1</link><guid isPermaLink="false">1</guid><description><![CDATA[summary-of-post-1]]></description><pubDate>Tue, 2 Jan 2024 05:06:07 +0000</pubDate></item><item><title>title-of-post-2</title><link>https://blog.example.com/blog/notes/post-2</link><guid isPermaLink="false">2</guid><description><![CDATA[summary-of-post-2]]></description><pubDate>Tue, 2 Jan 2024 05:06:07 +0000</pubDate></item></channel></rss>"##;
}
