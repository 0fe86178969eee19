//! User-facing notices.
//!
//! The planner decides what to say (a level and a message); how it is
//! shown is up to the [`Notifier`] implementation.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for notices. Fire-and-forget: delivery failures are the
/// implementation's concern.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(message = %notice.message, "Notice"),
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "Notice"),
        }
    }
}

/// Keeps every notice in memory until drained.
#[derive(Debug, Default)]
pub struct NoticeBuffer {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all buffered notices, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        let mut notices = self.notices.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *notices)
    }
}

impl Notifier for NoticeBuffer {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice);
    }
}
