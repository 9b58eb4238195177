//! UI side effects produced by the handlers.
//!
//! The front end owns rendering; handlers only describe what should be shown
//! through a `UiSink`. `UiEventLog` queues those descriptions for a front end
//! to drain and keeps the current badge counters.

use crate::LibmanError;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Maximum number of undrained events kept by `UiEventLog`.
const MAX_PENDING_EVENTS: usize = 256;

/// Notifications, badges and navigation requested by handlers.
pub trait UiSink: Send + Sync {
    fn notify_success(&self, title: &str, message: &str);

    fn notify_error(&self, title: &str, error: &LibmanError);

    fn set_route_badge(&self, route: &str, count: u64);

    /// Navigate to `route`. Returns `false` when no router is attached.
    fn navigate(&self, route: &str, replace: bool) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

/// A UI side effect, serialized for the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    Toast {
        level: ToastLevel,
        title: String,
        message: String,
    },
    RouteBadge {
        route: String,
        count: u64,
    },
    Navigate {
        route: String,
        replace: bool,
    },
}

/// Queue-backed `UiSink`.
#[derive(Debug, Default)]
pub struct UiEventLog {
    pending: Mutex<VecDeque<UiEvent>>,
    badges: Mutex<HashMap<String, u64>>,
    router_attached: AtomicBool,
}

impl UiEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log whose `navigate` reports an attached router.
    pub fn with_router() -> Self {
        let log = Self::default();
        log.attach_router(true);
        log
    }

    pub fn attach_router(&self, attached: bool) {
        self.router_attached.store(attached, Ordering::SeqCst);
    }

    /// Take all undrained events, oldest first.
    pub fn drain(&self) -> Vec<UiEvent> {
        self.pending().drain(..).collect()
    }

    /// Copy of the undrained events.
    pub fn events(&self) -> Vec<UiEvent> {
        self.pending().iter().cloned().collect()
    }

    /// Current badge count for `route`, if one was ever set.
    pub fn badge(&self, route: &str) -> Option<u64> {
        self.badges().get(route).copied()
    }

    fn push(&self, event: UiEvent) {
        let mut pending = self.pending();
        if pending.len() >= MAX_PENDING_EVENTS {
            pending.pop_front();
        }
        pending.push_back(event);
    }

    // Queued events stay valid after a panicking writer.
    fn pending(&self) -> MutexGuard<'_, VecDeque<UiEvent>> {
        self.pending.lock().unwrap_or_else(|err| {
            warn!("UI event queue lock poisoned, recovering");
            err.into_inner()
        })
    }

    fn badges(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.badges.lock().unwrap_or_else(|err| {
            warn!("Route badge lock poisoned, recovering");
            err.into_inner()
        })
    }
}

impl UiSink for UiEventLog {
    fn notify_success(&self, title: &str, message: &str) {
        info!("{}: {}", title, message);
        self.push(UiEvent::Toast {
            level: ToastLevel::Success,
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn notify_error(&self, title: &str, error: &LibmanError) {
        warn!("{}: {}", title, error);
        self.push(UiEvent::Toast {
            level: ToastLevel::Error,
            title: title.to_string(),
            message: error.detail(),
        });
    }

    fn set_route_badge(&self, route: &str, count: u64) {
        debug!("Badge {} = {}", route, count);
        self.badges().insert(route.to_string(), count);
        self.push(UiEvent::RouteBadge {
            route: route.to_string(),
            count,
        });
    }

    fn navigate(&self, route: &str, replace: bool) -> bool {
        if !self.router_attached.load(Ordering::SeqCst) {
            debug!("No router attached, skipping navigation to {}", route);
            return false;
        }
        self.push(UiEvent::Navigate {
            route: route.to_string(),
            replace,
        });
        true
    }
}
