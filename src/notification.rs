//! Transient toast notifications
//!
//! Outcome reporting side channel for the lead store. A toast stays current
//! for five seconds unless dismissed earlier.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// How long a toast stays visible.
pub const TOAST_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Toasts kept for diagnostics.
const MAX_TOAST_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub kind: ToastKind,
    pub raised_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(title: &str, subtitle: &str, kind: ToastKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            kind,
            raised_at: Utc::now(),
        }
    }

    pub fn success(title: &str, subtitle: &str) -> Self {
        Self::new(title, subtitle, ToastKind::Success)
    }

    pub fn error(title: &str, subtitle: &str) -> Self {
        Self::new(title, subtitle, ToastKind::Error)
    }
}

/// Receives outcome notifications from the store.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

struct Shown {
    toast: Toast,
    at: Instant,
}

/// In-memory toast surface: one current toast plus bounded history.
pub struct ToastCenter {
    current: Mutex<Option<Shown>>,
    history: Mutex<VecDeque<Toast>>,
    dismiss_after: Duration,
}

impl ToastCenter {
    pub fn new() -> Self {
        Self::with_dismiss_after(TOAST_DISMISS_AFTER)
    }

    pub fn with_dismiss_after(dismiss_after: Duration) -> Self {
        Self {
            current: Mutex::new(None),
            history: Mutex::new(VecDeque::new()),
            dismiss_after,
        }
    }

    /// The visible toast, if one was raised within the dismiss interval.
    pub fn current(&self) -> Option<Toast> {
        let mut guard = self.current.lock();
        match guard.as_ref() {
            Some(shown) if shown.at.elapsed() < self.dismiss_after => Some(shown.toast.clone()),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }

    /// Hide the toast early. Ignored if `id` is no longer current.
    pub fn dismiss(&self, id: &str) {
        let mut guard = self.current.lock();
        if guard.as_ref().is_some_and(|s| s.toast.id == id) {
            *guard = None;
        }
    }

    /// Most recent first.
    pub fn history(&self) -> Vec<Toast> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn last(&self) -> Option<Toast> {
        self.history.lock().front().cloned()
    }
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ToastCenter {
    fn notify(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Success => log::info!("Toast: {}: {}", toast.title, toast.subtitle),
            ToastKind::Error => log::warn!("Toast: {}: {}", toast.title, toast.subtitle),
        }

        {
            let mut history = self.history.lock();
            history.push_front(toast.clone());
            history.truncate(MAX_TOAST_HISTORY);
        }

        *self.current.lock() = Some(Shown {
            toast,
            at: Instant::now(),
        });
    }
}
