//! API client core for the book catalog service.
//!
//! # Overview
//! `BookApi` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). `BookCatalogClient`
//! layers the user-facing workflow on top: it executes requests through a
//! host-supplied `Transport`, keeps the current page in an explicit
//! `SessionState`, and reports to `Renderer`, `Confirm` and `Notifier`
//! collaborators instead of drawing anything itself.
//!
//! # Design
//! - `BookApi` is stateless; it holds only `base_url`.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O boundary
//!   is explicit and testable with canned responses.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;
pub mod ui;

pub use catalog::{BookCatalogClient, FormMode, Outcome};
pub use client::{Acknowledged, BookApi, BookPage};
pub use config::ClientConfig;
pub use error::CatalogError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::SessionState;
pub use transport::Transport;
pub use types::{
    Book, BookFields, BookForm, BookId, CreatedBook, HealthState, InitSummary, Pagination, Stats,
};
pub use ui::{Confirm, Level, Notification, Notifier, Renderer};
