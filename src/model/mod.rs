//! JSON:API shapes exchanged with the backend and the dashboard proxy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod blog;
pub mod post;

/// `{data: ...}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

impl<T> Document<T> {
    pub fn new(data: T) -> Self {
        Document { data, meta: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMeta {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource<A> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: A,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Value>,
}

/// Outgoing resource without an id, as used by create and update calls.
#[derive(Debug, Clone, Serialize)]
pub struct NewResource<A> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: A,
}

pub fn envelope<A: Serialize>(kind: &'static str, attributes: A) -> Document<NewResource<A>> {
    Document::new(NewResource { kind, attributes })
}
