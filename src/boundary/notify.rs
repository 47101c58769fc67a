//! Notification surface boundary

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Handle for a posted notice
pub type NoticeId = u64;

/// How prominently a notice should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A user-facing notice
#[derive(Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub severity: Severity,
    /// Auto-dismiss after this long unless dismissed explicitly first
    pub duration: Option<Duration>,
}

/// Notification surface the idle monitor posts through
pub trait Notifier: Send + Sync {
    /// Surface a notice, returning a handle usable with `dismiss`
    fn show(&self, notice: Notice) -> NoticeId;

    /// Remove a notice; unknown or already-dismissed handles are ignored
    fn dismiss(&self, id: NoticeId);
}

/// A currently visible notice, as exposed to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedNotice {
    pub id: NoticeId,
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub posted_at: DateTime<Utc>,
}

/// In-memory notification board
///
/// Duration-bounded notices are auto-dismissed by a spawned timer; explicit
/// dismissal always wins over the timer.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Arc<Mutex<HashMap<NoticeId, PostedNotice>>>,
    next_id: AtomicU64,
}

impl NoticeBoard {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently visible notices, oldest first
    pub fn snapshot(&self) -> Vec<PostedNotice> {
        match self.notices.lock() {
            Ok(board) => {
                let mut notices: Vec<PostedNotice> = board.values().cloned().collect();
                notices.sort_by_key(|n| n.id);
                notices
            }
            Err(e) => {
                warn!("Failed to lock notice board: {}", e);
                Vec::new()
            }
        }
    }
}

impl Notifier for NoticeBoard {
    fn show(&self, notice: Notice) -> NoticeId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;

        info!(
            "Notice {} [{:?}]: {} - {}",
            id, notice.severity, notice.title, notice.body
        );

        let posted = PostedNotice {
            id,
            title: notice.title,
            body: notice.body,
            severity: notice.severity,
            posted_at: Utc::now(),
        };

        match self.notices.lock() {
            Ok(mut board) => {
                board.insert(id, posted);
            }
            Err(e) => warn!("Failed to lock notice board: {}", e),
        }

        if let Some(duration) = notice.duration {
            let notices = Arc::clone(&self.notices);
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                if let Ok(mut board) = notices.lock() {
                    if board.remove(&id).is_some() {
                        debug!("Notice {} auto-dismissed after {:?}", id, duration);
                    }
                }
            });
        }

        id
    }

    fn dismiss(&self, id: NoticeId) {
        match self.notices.lock() {
            Ok(mut board) => {
                if board.remove(&id).is_some() {
                    debug!("Notice {} dismissed", id);
                }
            }
            Err(e) => warn!("Failed to lock notice board: {}", e),
        }
    }
}
