//! Post editing: local draft state, debounced autosave and publish transitions,
//! talking to the dashboard API through [`PostApi`].

pub mod api;
pub mod autosave;
pub mod blog_context;
pub mod client;
pub mod driver;
pub mod session;

pub use api::{BlogApi, ClientError, PostApi};
pub use blog_context::ensure_default_blog;
pub use client::DashboardClient;
pub use driver::{spawn_session, SessionHandle, SessionStatus};
pub use session::{EditingSession, FieldEdit, Phase, SessionError};
