use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node of the editor's document tree (`{"type": "doc", "content": [...]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
}

const BLOCK_NODES: &[&str] = &[
    "paragraph", "heading", "blockquote", "codeBlock", "listItem", "bulletList", "orderedList",
    "horizontalRule", "image",
];

fn attr<'a>(attrs: &'a Option<Map<String, Value>>, name: &str) -> Option<&'a Value> {
    attrs.as_ref().and_then(|a| a.get(name)).filter(|v| !v.is_null())
}

impl Node {
    pub fn empty_doc() -> Self {
        Node {
            kind: "doc".to_string(),
            attrs: None,
            content: vec![],
            text: None,
            marks: vec![],
        }
    }

    /// Parses a stored `content_json` value. `null` and `{}` give an empty document.
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        match value {
            Value::Null => Ok(Self::empty_doc()),
            Value::Object(map) if map.is_empty() => Ok(Self::empty_doc()),
            other => Node::deserialize(other),
        }
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        attr(&self.attrs, name).and_then(Value::as_str)
    }

    pub fn attr_u64(&self, name: &str) -> Option<u64> {
        attr(&self.attrs, name).and_then(|v| v.as_u64().or_else(|| v.as_str()?.parse().ok()))
    }

    pub fn is_block(&self) -> bool {
        BLOCK_NODES.contains(&self.kind.as_str())
    }

    /// Text content with one line per block.
    pub fn plain_text(&self) -> String {
        let mut buf = String::new();
        self.collect_text(&mut buf);
        buf.trim().to_string()
    }

    fn collect_text(&self, buf: &mut String) {
        match self.kind.as_str() {
            "text" => buf.push_str(self.text.as_deref().unwrap_or_default()),
            "hardBreak" => buf.push('\n'),
            _ => {
                for child in &self.content {
                    child.collect_text(buf);
                }
                if self.is_block() && !buf.ends_with('\n') {
                    buf.push('\n');
                }
            }
        }
    }
}

impl Mark {
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        attr(&self.attrs, name).and_then(Value::as_str)
    }
}
