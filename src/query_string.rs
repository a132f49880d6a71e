use std::collections::HashMap;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn get_page(&self) -> u32 {
        self.get("page")
            .and_then(|v| v.parse().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1)
    }

    /// Query forwarded to the backend post listing. A `status` of `all` means no filter.
    pub fn post_filters(&self) -> String {
        let mut params: Vec<(&str, &str)> = vec![];
        if let Some(status) = self.get("status").filter(|s| *s != "all") {
            params.push(("status", status));
        }
        if let Some(blog_id) = self.get("blog_id") {
            params.push(("blog_id", blog_id));
        }
        serde_urlencoded::to_string(params).unwrap_or_default()
    }
}
