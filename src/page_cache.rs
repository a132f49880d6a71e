use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

/// Rendered public pages keyed by request path, each carrying the cache tags it depends on.
pub struct PageCache<T> {
    entries: Option<RwLock<HashMap<String, CacheValue<T>>>>,
}

pub enum Expire {
    Never,
    After(Duration),
}

struct CacheValue<T> {
    expire_date: DateTime<Utc>,
    tags: HashSet<String>,
    value: Arc<T>,
}

impl<T> PageCache<T> {
    pub fn new() -> Self {
        PageCache {
            entries: Some(RwLock::new(HashMap::new())),
        }
    }

    pub fn non_caching() -> Self {
        PageCache { entries: None }
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let entries = self.entries.as_ref()?.read().ok()?;
        let cache_value = entries.get(key)?;
        if Utc::now() > cache_value.expire_date {
            return None;
        }
        Some(cache_value.value.clone())
    }

    pub fn insert(&self, key: &str, tags: &[String], content: T, expire_after: Expire) -> Arc<T> {
        let value = Arc::new(content);
        let Some(ref entries) = self.entries else {
            return value;
        };

        let expire_date = match expire_after {
            Expire::Never => DateTime::<Utc>::MAX_UTC,
            Expire::After(duration) => Utc::now() + duration,
        };

        if let Ok(mut entries) = entries.write() {
            entries.insert(key.to_string(), CacheValue {
                expire_date,
                tags: tags.iter().cloned().collect(),
                value: value.clone(),
            });
        }
        value
    }

    /// Drops every entry tagged with `tag`. Returns how many entries were removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        self.retain(|key_tags, _| !key_tags.contains(tag))
    }

    /// Drops the entry for `path` along with its query-string variants (`/?page=2`).
    pub fn invalidate_path(&self, path: &str) -> usize {
        let with_query = format!("{}?", path);
        self.retain(|_, key| key != path && !key.starts_with(&with_query))
    }

    pub fn len(&self) -> usize {
        match self.entries {
            Some(ref entries) => entries.read().map(|e| e.len()).unwrap_or(0),
            None => 0,
        }
    }

    fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&HashSet<String>, &str) -> bool,
    {
        let Some(ref entries) = self.entries else {
            return 0;
        };
        let Ok(mut entries) = entries.write() else {
            return 0;
        };

        let before = entries.len();
        entries.retain(|key, value| keep(&value.tags, key));
        before - entries.len()
    }
}

impl<T> Default for PageCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
