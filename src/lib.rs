pub mod backend;
pub mod config;
pub mod content;
pub mod editor;
pub mod error;
pub mod logger;
pub mod model;
pub mod page_cache;
pub mod paginator;
pub mod published;
pub mod query_string;
pub mod revalidation;
pub mod routes;
pub mod server;
pub mod session;
pub mod text_utils;
pub mod view;
