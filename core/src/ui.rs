//! Presentation collaborators.
//!
//! `BookCatalogClient` never draws anything itself; it reports state changes
//! to a `Renderer`, asks a `Confirm` before destructive calls, and pushes
//! transient messages to a `Notifier`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::types::{Book, HealthState, Pagination, Stats};

/// Receives every state change the user should see.
pub trait Renderer: Send + Sync {
    fn health(&self, state: &HealthState);

    /// A list request is in flight.
    fn books_loading(&self) {}

    /// An empty `books` slice is the empty-state path.
    fn books(&self, books: &[Book], pagination: &Pagination);

    /// The inline failure shown in place of the table, with a retry affordance.
    fn list_error(&self, message: &str);

    /// `None` renders the static placeholder.
    fn stats(&self, stats: Option<&Stats>);

    fn book_detail(&self, book: &Book);
}

/// Out-of-band yes/no question. Answering may take as long as the user
/// likes, so implementations must not block the executor.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Sink for transient messages. Sinks that can take a message back down do
/// so after `dismiss_after`; append-only sinks may ignore it.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => f.write_str("info"),
            Level::Success => f.write_str("success"),
            Level::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: Level,
    /// The sink removes the notification after this long.
    pub dismiss_after: Duration,
}
