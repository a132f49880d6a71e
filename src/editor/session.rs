use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use spdlog::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::editor::api::{ClientError, PostApi};
use crate::editor::autosave::Debounce;
use crate::model::post::{Post, PostAttributes, PostChanges, PostStatus};
use crate::revalidation::RevalidateTargets;

pub const LOGIN_PATH: &str = "/login";

/// Editable fields of a post, compared structurally to detect unsaved changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    /// `None` until the post has a document tree
    pub content: Option<Value>,
}

impl Draft {
    pub fn from_post(attrs: &PostAttributes) -> Self {
        Draft {
            title: attrs.title.clone(),
            slug: attrs.slug.clone(),
            excerpt: attrs.excerpt.clone().unwrap_or_default(),
            content: attrs.content_json.clone(),
        }
    }

    pub fn to_changes(&self) -> PostChanges {
        PostChanges {
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt.clone(),
            content_json: self.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Title(String),
    Slug(String),
    Excerpt(String),
    Content(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Saving,
    /// Terminal. The session was rejected and the user has to log in again.
    Redirected(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Login required")]
    LoginRequired,
    #[error("Editing session is closed")]
    Closed,
    #[error("Error loading post: {0}")]
    Load(ClientError),
    #[error("Error saving post: {0}")]
    Save(ClientError),
    #[error("Error changing publish state: {0}")]
    Publish(ClientError),
    #[error("Post was changed elsewhere, reload before saving: {0}")]
    Conflict(String),
}

impl SessionError {
    fn from_save(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => SessionError::LoginRequired,
            ClientError::Conflict(msg) => SessionError::Conflict(msg),
            other => SessionError::Save(other),
        }
    }
}

/// Local editing state of one post: the draft, the last persisted snapshot and the autosave timer.
pub struct EditingSession<A: PostApi> {
    api: A,
    post_id: String,
    blog_slug: String,
    snapshot: Draft,
    draft: Draft,
    status: PostStatus,
    version: Option<String>,
    phase: Phase,
    last_saved: Option<DateTime<Utc>>,
    autosave: Debounce,
    revalidations: Vec<JoinHandle<()>>,
}

impl<A: PostApi> EditingSession<A> {
    pub async fn open(api: A, post_id: &str, blog_slug: &str, autosave_delay: Duration) -> Result<Self, SessionError> {
        let post = match api.get_post(post_id).await {
            Ok(post) => post,
            Err(ClientError::Unauthorized) => return Err(SessionError::LoginRequired),
            Err(e) => return Err(SessionError::Load(e)),
        };
        debug!("Opened post {} ({}) for editing", post.id, post.attributes.slug);

        let snapshot = Draft::from_post(&post.attributes);
        Ok(EditingSession {
            api,
            post_id: post.id,
            blog_slug: blog_slug.to_string(),
            draft: snapshot.clone(),
            snapshot,
            status: post.attributes.status,
            version: post.attributes.version(),
            phase: Phase::Idle,
            last_saved: None,
            autosave: Debounce::new(autosave_delay),
            revalidations: vec![],
        })
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn status(&self) -> PostStatus {
        self.status
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.snapshot
    }

    /// Navigation guard: leaving would lose unsaved changes.
    pub fn can_leave(&self) -> bool {
        matches!(self.phase, Phase::Redirected(_)) || !self.is_dirty()
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Redirected(_) => Err(SessionError::Closed),
            _ => Ok(()),
        }
    }

    fn redirect_to_login(&mut self) {
        info!("Session for post {} is no longer authorized, redirecting to {}", self.post_id, LOGIN_PATH);
        self.autosave.cancel();
        self.phase = Phase::Redirected(LOGIN_PATH.to_string());
    }

    pub fn edit(&mut self, edit: FieldEdit) -> Result<(), SessionError> {
        self.ensure_open()?;
        match edit {
            FieldEdit::Title(title) => self.draft.title = title,
            FieldEdit::Slug(slug) => self.draft.slug = slug,
            FieldEdit::Excerpt(excerpt) => self.draft.excerpt = excerpt,
            FieldEdit::Content(content) => self.draft.content = Some(content),
        }
        self.autosave.touch();
        Ok(())
    }

    /// PATCHes the current draft. On success the sent draft becomes the snapshot.
    async fn persist(&mut self) -> Result<DateTime<Utc>, ClientError> {
        let sent = self.draft.clone();
        self.phase = Phase::Saving;
        let result = self.api.update_post(&self.post_id, &sent.to_changes(), self.version.as_deref()).await;
        self.phase = Phase::Idle;

        match result {
            Ok(post) => {
                let saved_at = Utc::now();
                self.snapshot = sent;
                self.version = post.attributes.version();
                self.status = post.attributes.status;
                self.last_saved = Some(saved_at);
                if !self.is_dirty() {
                    self.autosave.cancel();
                }
                Ok(saved_at)
            }
            Err(ClientError::Unauthorized) => {
                self.redirect_to_login();
                Err(ClientError::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }

    /// Debounce expiry. Failures stay dirty and are only logged; the next edit or timer retries.
    pub async fn on_autosave_timer(&mut self) {
        self.autosave.cancel();
        if self.ensure_open().is_err() || !self.is_dirty() || self.phase == Phase::Saving {
            return;
        }

        match self.persist().await {
            Ok(_) => debug!("Autosaved post {}", self.post_id),
            Err(e) => warn!("Autosave of post {} failed: {}", self.post_id, e),
        }
    }

    pub async fn save(&mut self) -> Result<DateTime<Utc>, SessionError> {
        self.ensure_open()?;
        self.persist().await.map_err(SessionError::from_save)
    }

    /// Saves pending changes first; a failed save aborts the publish.
    pub async fn publish(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.is_dirty() {
            self.persist().await.map_err(SessionError::from_save)?;
        }

        let result = self.api.publish_post(&self.post_id).await;
        self.apply_transition(result)?;
        info!("Published post {}", self.post_id);
        Ok(())
    }

    pub async fn unpublish(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let result = self.api.unpublish_post(&self.post_id).await;
        self.apply_transition(result)?;
        info!("Unpublished post {}", self.post_id);
        Ok(())
    }

    fn apply_transition(&mut self, result: Result<Post, ClientError>) -> Result<(), SessionError> {
        match result {
            Ok(post) => {
                self.status = post.attributes.status;
                self.version = post.attributes.version();
                self.spawn_revalidation();
                Ok(())
            }
            Err(ClientError::Unauthorized) => {
                self.redirect_to_login();
                Err(SessionError::LoginRequired)
            }
            Err(e) => Err(SessionError::Publish(e)),
        }
    }

    /// Best effort: the public pages showing this post are invalidated in the background.
    fn spawn_revalidation(&mut self) {
        self.revalidations.retain(|handle| !handle.is_finished());

        let targets = RevalidateTargets::for_post(&self.blog_slug, &self.snapshot.slug);
        let api = self.api.clone();
        let handle = tokio::spawn(async move {
            match api.revalidate(&targets).await {
                Ok(()) => debug!("Revalidated {:?}", targets.paths),
                Err(e) => warn!("Revalidation of {:?} failed: {}", targets.paths, e),
            }
        });
        self.revalidations.push(handle);
    }

    /// Stops the autosave timer and waits for pending revalidations.
    pub async fn close(mut self) {
        self.autosave.cancel();
        for handle in self.revalidations.drain(..) {
            if let Err(e) = handle.await {
                warn!("Revalidation task failed: {}", e);
            }
        }
        debug!("Closed editing session for post {}", self.post_id);
    }
}
