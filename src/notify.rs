// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Transient user notifications (toasts).

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// How long a toast stays visible.
pub const TOAST_LIFETIME_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub created_at: DateTime<Utc>,
}

/// Notification service injected into page flows.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: ToastKind);

    fn success(&self, message: &str) {
        self.notify(message, ToastKind::Success);
    }

    fn error(&self, message: &str) {
        self.notify(message, ToastKind::Error);
    }
}

/// In-memory toast stack with expiry, backing a toaster widget.
#[derive(Debug, Default)]
pub struct ToastQueue {
    next_id: AtomicU64,
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn prune(toasts: &mut Vec<Toast>, now: DateTime<Utc>) {
        let lifetime = Duration::seconds(TOAST_LIFETIME_SECS);
        toasts.retain(|t| now < t.created_at + lifetime);
    }

    /// Toasts still visible at `now`, oldest first. Expired toasts are dropped.
    pub fn active_at(&self, now: DateTime<Utc>) -> Vec<Toast> {
        let mut toasts = self.lock();
        Self::prune(&mut toasts, now);
        toasts.clone()
    }

    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Utc::now())
    }

    /// Close a toast before it expires.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|t| t.id != id);
        toasts.len() != before
    }

    /// Most recent toast not yet pruned.
    pub fn last(&self) -> Option<Toast> {
        self.lock().last().cloned()
    }

    /// Number of toasts currently held, expired ones included until pruned.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push_at(&self, message: &str, kind: ToastKind, now: DateTime<Utc>) {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.to_string(),
            kind,
            created_at: now,
        };
        let mut toasts = self.lock();
        Self::prune(&mut toasts, now);
        toasts.push(toast);
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, message: &str, kind: ToastKind) {
        self.push_at(message, kind, Utc::now());
    }
}

/// Notifier that writes toasts to the log, for the CLI shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, kind: ToastKind) {
        match kind {
            ToastKind::Success => tracing::info!(toast = %message, "Success"),
            ToastKind::Error => tracing::error!(toast = %message, "Error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_after_lifetime() {
        let queue = ToastQueue::new();
        queue.success("Welcome back!");

        let created = queue.last().unwrap().created_at;
        assert_eq!(queue.active_at(created).len(), 1);
        assert_eq!(
            queue
                .active_at(created + Duration::seconds(TOAST_LIFETIME_SECS))
                .len(),
            0
        );
    }

    #[test]
    fn test_dismiss_removes_toast() {
        let queue = ToastQueue::new();
        queue.error("first");
        queue.success("second");

        let first = queue.active()[0].id;
        assert!(queue.dismiss(first));
        assert!(!queue.dismiss(first));

        let remaining = queue.active();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "second");
        assert_eq!(remaining[0].kind, ToastKind::Success);
    }

    #[test]
    fn test_notify_prunes_expired_toasts() {
        let queue = ToastQueue::new();
        let start = Utc::now();
        queue.push_at("old", ToastKind::Success, start);
        queue.push_at("older", ToastKind::Error, start);
        assert_eq!(queue.len(), 2);

        let later = start + Duration::seconds(TOAST_LIFETIME_SECS + 1);
        queue.push_at("new", ToastKind::Success, later);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.last().unwrap().message, "new");
    }

    #[test]
    fn test_poisoned_queue_still_accepts_toasts() {
        let queue = std::sync::Arc::new(ToastQueue::new());
        let poisoner = queue.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.toasts.lock().unwrap();
            panic!("poison the toast lock");
        })
        .join();
        assert!(queue.toasts.is_poisoned());

        queue.error("still shown");
        assert_eq!(queue.active().len(), 1);
        assert!(queue.dismiss(queue.last().unwrap().id));
    }
}
