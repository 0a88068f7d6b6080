//! User-facing notifications and the selection change channel

use crate::item::{EntityKind, Item};
use serde::Serialize;
use std::fmt;

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Positive confirmation
    Success,
    /// Something the user should act on
    Error,
}

/// Message emitted by the selector
///
/// `Display` gives the default English rendering; callers that localise
/// should match on the variant instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Item added to the selection
    Added {
        /// Entity kind of the item
        kind: EntityKind,
        /// Display name of the item
        name: String,
    },
    /// Item removed from the selection
    Removed {
        /// Entity kind of the item
        kind: EntityKind,
        /// Display name of the item
        name: String,
    },
    /// Selection cleared
    AllRemoved {
        /// Entity kind that was cleared
        kind: EntityKind,
    },
    /// Custom item created and selected
    CustomAdded {
        /// Entity kind of the item
        kind: EntityKind,
        /// Name given to the custom item
        name: String,
    },
    /// Custom item draft has a blank field
    FillAllFields,
    /// Catalog or preferred-subset request failed
    SearchFailed {
        /// Entity kind being searched
        kind: EntityKind,
        /// Client-visible failure message
        message: String,
    },
}

impl Notification {
    /// Severity
    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::FillAllFields | Self::SearchFailed { .. } => NotificationKind::Error,
            _ => NotificationKind::Success,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { kind, name } => write!(f, "Added {kind} \"{name}\""),
            Self::Removed { kind, name } => write!(f, "Removed {kind} \"{name}\""),
            Self::AllRemoved { kind } => write!(f, "Removed all {}", kind.plural()),
            Self::CustomAdded { kind, name } => write!(f, "Added custom {kind} \"{name}\""),
            Self::FillAllFields => f.write_str("Please fill in all fields"),
            Self::SearchFailed { kind, message } => {
                write!(f, "Could not load {}: {message}", kind.plural())
            }
        }
    }
}

/// Fire-and-forget notification delivery
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification
    fn notify(&self, notification: &Notification);
}

/// Sink that writes notifications to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.kind() {
            NotificationKind::Success => tracing::info!(target: "selector::notify", "{notification}"),
            NotificationKind::Error => tracing::warn!(target: "selector::notify", "{notification}"),
        }
    }
}

/// Receives the full ordered selection list after every mutation
pub trait SelectionListener: Send + Sync {
    /// Selection changed
    fn on_change(&self, items: &[Item]);
}

impl<F> SelectionListener for F
where
    F: Fn(&[Item]) + Send + Sync,
{
    fn on_change(&self, items: &[Item]) {
        self(items);
    }
}
