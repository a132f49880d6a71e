//! Runs an editing session as a single task fed by a command channel and the autosave deadline.

use chrono::{DateTime, Utc};
use spdlog::{debug, info};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::editor::api::PostApi;
use crate::editor::session::{EditingSession, FieldEdit, Phase, SessionError};
use crate::model::post::PostStatus;

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

enum Command {
    Edit(FieldEdit, Reply<()>),
    Save(Reply<DateTime<Utc>>),
    Publish(Reply<()>),
    Unpublish(Reply<()>),
    Status(oneshot::Sender<SessionStatus>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub dirty: bool,
    pub can_leave: bool,
    pub phase: Phase,
    pub status: PostStatus,
    pub last_saved: Option<DateTime<Utc>>,
}

pub struct SessionHandle {
    sender: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

pub fn spawn_session<A: PostApi>(mut session: EditingSession<A>) -> SessionHandle {
    let (tx, mut rx) = mpsc::channel::<Command>(32);

    let task = tokio::spawn(async move {
        info!("Starting editing session for post {}", session.post_id());
        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(cmd) => handle(&mut session, cmd).await,
                    None => break,
                },
                _ = until(session.autosave_deadline()) => {
                    debug!("Autosave timer fired for post {}", session.post_id());
                    session.on_autosave_timer().await;
                }
            }
        }
        session.close().await;
    });

    SessionHandle {
        sender: tx,
        task,
    }
}

async fn handle<A: PostApi>(session: &mut EditingSession<A>, cmd: Command) {
    // A dropped receiver means the caller stopped waiting. Nothing to do about it.
    match cmd {
        Command::Edit(edit, reply) => {
            let _ = reply.send(session.edit(edit));
        }
        Command::Save(reply) => {
            let _ = reply.send(session.save().await);
        }
        Command::Publish(reply) => {
            let _ = reply.send(session.publish().await);
        }
        Command::Unpublish(reply) => {
            let _ = reply.send(session.unpublish().await);
        }
        Command::Status(reply) => {
            let _ = reply.send(SessionStatus {
                dirty: session.is_dirty(),
                can_leave: session.can_leave(),
                phase: session.phase().clone(),
                status: session.status(),
                last_saved: session.last_saved(),
            });
        }
    }
}

impl SessionHandle {
    async fn request<T>(&self, cmd: impl FnOnce(Reply<T>) -> Command) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.sender.send(cmd(tx)).await.map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn edit(&self, edit: FieldEdit) -> Result<(), SessionError> {
        self.request(|reply| Command::Edit(edit, reply)).await
    }

    pub async fn save(&self) -> Result<DateTime<Utc>, SessionError> {
        self.request(Command::Save).await
    }

    pub async fn publish(&self) -> Result<(), SessionError> {
        self.request(Command::Publish).await
    }

    pub async fn unpublish(&self) -> Result<(), SessionError> {
        self.request(Command::Unpublish).await
    }

    pub async fn status(&self) -> Result<SessionStatus, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.sender.send(Command::Status(tx)).await.map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Drops the channel and waits for the session to wind down, pending revalidations included.
    /// Unsaved changes are not flushed.
    pub async fn close(self) {
        drop(self.sender);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::editor::mock::MockApi;

    async fn start(api: &MockApi) -> SessionHandle {
        let session = EditingSession::open(api.clone(), "42", "notes", Duration::from_millis(1000)).await.unwrap();
        spawn_session(session)
    }

    fn updates(api: &MockApi) -> usize {
        api.calls().iter().filter(|c| c.starts_with("update")).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_in_window_autosave_once() {
        let api = MockApi::new();
        let handle = start(&api).await;

        for i in 0..5 {
            handle.edit(FieldEdit::Title(format!("Title {}", i))).await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        assert_eq!(updates(&api), 0);
        assert!(handle.status().await.unwrap().dirty);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(updates(&api), 1);
        assert!(api.calls().contains(&"update 42 Title 4 original".to_string()));

        let status = handle.status().await.unwrap();
        assert!(!status.dirty);
        assert!(status.can_leave);
        assert!(status.last_saved.is_some());

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(updates(&api), 1);
        handle.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_autosave_twice() {
        let api = MockApi::new();
        let handle = start(&api).await;

        handle.edit(FieldEdit::Title("A".to_string())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        handle.edit(FieldEdit::Title("B".to_string())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(updates(&api), 2);
        handle.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_cancels_timer() {
        let api = MockApi::new();
        let handle = start(&api).await;

        handle.edit(FieldEdit::Slug("a".to_string())).await.unwrap();
        handle.save().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2000)).await;

        assert_eq!(updates(&api), 1);
        handle.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_through_handle() {
        let api = MockApi::new();
        let handle = start(&api).await;

        handle.edit(FieldEdit::Title("A".to_string())).await.unwrap();
        handle.publish().await.unwrap();
        assert_eq!(handle.status().await.unwrap().status, PostStatus::Published);
        handle.close().await;

        let calls = api.calls();
        assert_eq!(&calls[1..3], ["update 42 A original", "publish 42"]);
        assert!(calls[3].starts_with("revalidate"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_autosave_redirects() {
        let api = MockApi::new();
        let handle = start(&api).await;
        api.fail("update", crate::editor::api::ClientError::Unauthorized);

        handle.edit(FieldEdit::Title("A".to_string())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let status = handle.status().await.unwrap();
        assert_eq!(status.phase, Phase::Redirected("/login".to_string()));
        assert_eq!(handle.edit(FieldEdit::Title("B".to_string())).await, Err(SessionError::Closed));
        assert_eq!(handle.publish().await, Err(SessionError::Closed));
        handle.close().await;
        assert_eq!(updates(&api), 1);
    }
}
