//! Notification surface the session controller talks to.
//!
//! The front end owns rendering; the core only decides when each call is made
//! and with what arguments. Implementations are invoked while the controller
//! holds its state lock and must not call back into the controller.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::session::SessionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

pub trait Notifier: Send + Sync {
    fn set_announcement(&self, text: &str);
    /// Show or hide the "did you finish the task?" yes/no buttons.
    fn set_button_visibility(&self, visibility: Visibility);
    fn open_summary(&self, summary: &SessionSummary);
    /// Ask the user to confirm ending the running session.
    fn open_confirmation(&self);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn set_announcement(&self, _text: &str) {}
    fn set_button_visibility(&self, _visibility: Visibility) {}
    fn open_summary(&self, _summary: &SessionSummary) {}
    fn open_confirmation(&self) {}
}

/// One recorded call on a [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Announcement { text: String },
    Buttons { visibility: Visibility },
    Summary { summary: SessionSummary },
    Confirmation,
}

/// Keeps every call in order, for tests and headless front ends.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Announcement { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Summary { summary } => Some(summary.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_button_visibility(&self) -> Option<Visibility> {
        self.lock().iter().rev().find_map(|n| match n {
            Notification::Buttons { visibility } => Some(*visibility),
            _ => None,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn push(&self, notification: Notification) {
        self.lock().push(notification);
    }
}

impl Notifier for RecordingNotifier {
    fn set_announcement(&self, text: &str) {
        self.push(Notification::Announcement {
            text: text.to_string(),
        });
    }

    fn set_button_visibility(&self, visibility: Visibility) {
        self.push(Notification::Buttons { visibility });
    }

    fn open_summary(&self, summary: &SessionSummary) {
        self.push(Notification::Summary {
            summary: summary.clone(),
        });
    }

    fn open_confirmation(&self) {
        self.push(Notification::Confirmation);
    }
}
