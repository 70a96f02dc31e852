//! Cross-component UI signals.
//!
//! # Responsibility
//! - Carry broadcast notifications that are not state (announcements for
//!   assistive technology, logout, cart badge refresh).
//!
//! # Invariants
//! - The topic set is closed; every payload is typed.
//! - Listeners for one topic run in registration order.
//! - Publishing with no listeners is a no-op.

use crate::reactive::{ListenerSet, Subscription};
use log::debug;
use std::sync::Arc;

/// Broadcast channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    /// Text to be read out by a screen reader live region.
    Announcement,
    /// The user session ended.
    Logout,
    /// Cart contents changed.
    CartChanged,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
            Self::Logout => "logout",
            Self::CartChanged => "cart_changed",
        }
    }
}

/// Event payloads, one variant per topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Announcement { text: String },
    Logout,
    CartChanged { item_count: u32 },
}

impl UiEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::Announcement { .. } => Topic::Announcement,
            Self::Logout => Topic::Logout,
            Self::CartChanged { .. } => Topic::CartChanged,
        }
    }
}

/// Publish/subscribe hub shared by every store and UI adapter.
///
/// Cloning yields another handle to the same hub.
#[derive(Clone)]
pub struct EventBus {
    announcement: Arc<ListenerSet<UiEvent>>,
    logout: Arc<ListenerSet<UiEvent>>,
    cart_changed: Arc<ListenerSet<UiEvent>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            announcement: ListenerSet::new(),
            logout: ListenerSet::new(),
            cart_changed: ListenerSet::new(),
        }
    }

    pub fn subscribe(
        &self,
        topic: Topic,
        listener: impl Fn(&UiEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.listeners(topic).add(Arc::new(listener))
    }

    /// Subscribes to announcement text.
    pub fn on_announcement(
        &self,
        listener: impl Fn(&str) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe(Topic::Announcement, move |event| {
            if let UiEvent::Announcement { text } = event {
                listener(text);
            }
        })
    }

    pub fn on_logout(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.subscribe(Topic::Logout, move |event| {
            if matches!(event, UiEvent::Logout) {
                listener();
            }
        })
    }

    pub fn publish(&self, event: UiEvent) {
        let topic = event.topic();
        let listeners = self.listeners(topic);
        debug!(
            "event=bus_publish module=events status=ok topic={} listeners={}",
            topic.as_str(),
            listeners.len()
        );
        listeners.notify(&event);
    }

    /// Convenience for `publish(UiEvent::Announcement { .. })`.
    pub fn announce(&self, text: impl Into<String>) {
        self.publish(UiEvent::Announcement { text: text.into() });
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.listeners(topic).len()
    }

    fn listeners(&self, topic: Topic) -> &Arc<ListenerSet<UiEvent>> {
        match topic {
            Topic::Announcement => &self.announcement,
            Topic::Logout => &self.logout,
            Topic::CartChanged => &self.cart_changed,
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("announcement", &self.announcement.len())
            .field("logout", &self.logout.len())
            .field("cart_changed", &self.cart_changed.len())
            .finish()
    }
}
