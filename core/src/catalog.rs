//! The orchestrator that turns user intents into API calls.
//!
//! # Design
//! `BookCatalogClient` pairs a stateless `BookApi` with a host-provided
//! `Transport` and drives the presentation collaborators from `ui`. All
//! operations take `&self`; the only mutable state is the `SessionState`
//! behind a mutex that is never held across an `.await`, so independent
//! requests can overlap. Every failure is reported to the `Notifier` with the
//! envelope's message, except statistics, which fall back to a placeholder.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::client::{Acknowledged, BookApi, BookPage};
use crate::config::ClientConfig;
use crate::error::CatalogError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::SessionState;
use crate::transport::Transport;
use crate::types::{Book, BookForm, BookId, CreatedBook, HealthState, InitSummary, Stats};
use crate::ui::{Confirm, Level, Notification, Notifier, Renderer};

pub const CONFIRM_DELETE: &str = "Delete this book? This cannot be undone.";
pub const CONFIRM_INITIALIZE: &str = "Initialize the database? This adds sample data.";

/// Result of an operation guarded by a confirmation prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Declined,
}

/// What a submitted form should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(BookId),
}

pub struct BookCatalogClient<T> {
    api: BookApi,
    config: ClientConfig,
    transport: T,
    renderer: Arc<dyn Renderer>,
    confirm: Arc<dyn Confirm>,
    notifier: Arc<dyn Notifier>,
    session: Mutex<SessionState>,
}

impl<T: Transport> BookCatalogClient<T> {
    pub fn new(
        config: ClientConfig,
        transport: T,
        renderer: Arc<dyn Renderer>,
        confirm: Arc<dyn Confirm>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api: BookApi::new(&config.base_url),
            config,
            transport,
            renderer,
            confirm,
            notifier,
            session: Mutex::new(SessionState::default()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Snapshot of the session state.
    pub fn session(&self) -> SessionState {
        self.lock().clone()
    }

    /// Page-load sequence: health, first page, statistics.
    pub async fn start(&self) {
        self.check_health().await;
        if let Err(err) = self.list_books(1).await {
            debug!(error = %err, "initial list failed");
        }
        self.get_stats().await;
    }

    /// Never fails: anything other than a readable `healthy` report is
    /// rendered as unhealthy.
    pub async fn check_health(&self) -> HealthState {
        self.renderer.health(&HealthState::Checking);
        let request = self.api.build_health();
        let state = match self.round_trip(request).await {
            Ok(response) => self
                .api
                .parse_health(response)
                .unwrap_or_else(|err| unhealthy(&err)),
            Err(err) => unhealthy(&err),
        };
        self.renderer.health(&state);
        state
    }

    /// Fetch `page` with the configured page size and make it the current page.
    ///
    /// A response overtaken by a newer list request is returned to the caller
    /// but neither applied nor rendered.
    pub async fn list_books(&self, page: u32) -> Result<BookPage, CatalogError> {
        let token = self.lock().issue_token();
        self.renderer.books_loading();

        let request = self.api.build_list_books(page, self.config.page_size);
        let result = match self.round_trip(request).await {
            Ok(response) => self.api.parse_list_books(response),
            Err(err) => Err(err),
        };

        match result {
            Ok(book_page) => {
                let applied = self.lock().apply(token, page, &book_page);
                if applied {
                    self.renderer.books(&book_page.books, &book_page.pagination);
                    self.notify(
                        Level::Success,
                        format!("Loaded {} books", book_page.books.len()),
                    );
                } else {
                    debug!(page, token, "dropping stale list response");
                }
                Ok(book_page)
            }
            Err(err) => {
                let stale = self.lock().is_stale(token);
                if stale {
                    debug!(page, token, error = %err, "dropping stale list failure");
                    return Err(err);
                }
                self.renderer.list_error(err.user_message());
                Err(self.fail(err))
            }
        }
    }

    /// Move `delta` pages from the current one. Returns `Ok(None)` without
    /// issuing a request when the target would be before page one.
    pub async fn change_page(&self, delta: i64) -> Result<Option<BookPage>, CatalogError> {
        let current = self.lock().current_page();
        let target = i64::from(current) + delta;
        if target < 1 {
            debug!(current, delta, "ignoring page change before first page");
            return Ok(None);
        }
        let target = u32::try_from(target).unwrap_or(u32::MAX);
        self.list_books(target).await.map(Some)
    }

    /// Start over from the first page and reload the statistics.
    pub async fn refresh(&self) -> Result<BookPage, CatalogError> {
        self.notify(Level::Info, "Refreshing data...".to_string());
        let result = self.list_books(1).await;
        self.get_stats().await;
        result
    }

    pub async fn get_book(&self, id: BookId) -> Result<Book, CatalogError> {
        let request = self.api.build_get_book(id);
        let response = self.round_trip(request).await.map_err(|err| self.fail(err))?;
        self.api.parse_get_book(response).map_err(|err| self.fail(err))
    }

    /// Fetch a book and hand it to the renderer's detail view.
    pub async fn view_book(&self, id: BookId) -> Result<Book, CatalogError> {
        let book = self.get_book(id).await?;
        self.renderer.book_detail(&book);
        Ok(book)
    }

    /// Fetch a book and turn it into a pre-filled edit form.
    pub async fn load_for_edit(&self, id: BookId) -> Result<BookForm, CatalogError> {
        let book = self.get_book(id).await?;
        Ok(BookForm::from(&book))
    }

    /// Validate and POST a new book. The list is not refreshed here.
    pub async fn create_book(
        &self,
        form: &BookForm,
    ) -> Result<Acknowledged<CreatedBook>, CatalogError> {
        let fields = form.validate().map_err(|err| self.fail(err))?;
        let request = self.api.build_create_book(&fields).map_err(|err| self.fail(err))?;
        let response = self.round_trip(request).await.map_err(|err| self.fail(err))?;
        self.api.parse_create_book(response).map_err(|err| self.fail(err))
    }

    /// Validate and PUT the full field set of book `id`.
    pub async fn update_book(
        &self,
        id: BookId,
        form: &BookForm,
    ) -> Result<Acknowledged<CreatedBook>, CatalogError> {
        let fields = form.validate().map_err(|err| self.fail(err))?;
        let request = self
            .api
            .build_update_book(id, &fields)
            .map_err(|err| self.fail(err))?;
        let response = self.round_trip(request).await.map_err(|err| self.fail(err))?;
        self.api.parse_update_book(response).map_err(|err| self.fail(err))
    }

    /// The form-submit flow: create or update, then reload the current page
    /// and the statistics.
    pub async fn submit_form(
        &self,
        mode: FormMode,
        form: &BookForm,
    ) -> Result<Acknowledged<CreatedBook>, CatalogError> {
        let ack = match mode {
            FormMode::Add => self.create_book(form).await?,
            FormMode::Edit(id) => self.update_book(id, form).await?,
        };
        let message = match mode {
            FormMode::Add => "Book added",
            FormMode::Edit(_) => "Book updated",
        };
        self.notify(Level::Success, message.to_string());
        self.reload_current_page().await;
        Ok(ack)
    }

    /// Ask for confirmation, delete, then reload the page that was current
    /// before the delete was issued.
    pub async fn delete_book(&self, id: BookId) -> Result<Outcome<()>, CatalogError> {
        if !self.confirm.confirm(CONFIRM_DELETE).await {
            debug!(id, "delete declined");
            return Ok(Outcome::Declined);
        }
        let page = self.lock().current_page();

        let request = self.api.build_delete_book(id);
        let response = self.round_trip(request).await.map_err(|err| self.fail(err))?;
        self.api.parse_delete_book(response).map_err(|err| self.fail(err))?;

        info!(id, "book deleted");
        self.notify(Level::Success, "Book deleted".to_string());
        if let Err(err) = self.list_books(page).await {
            debug!(page, error = %err, "reload after delete failed");
        }
        self.get_stats().await;
        Ok(Outcome::Done(()))
    }

    /// Statistics failures never propagate; the renderer gets `None` and
    /// shows its placeholder.
    pub async fn get_stats(&self) -> Option<Stats> {
        let request = self.api.build_stats();
        let result = match self.round_trip(request).await {
            Ok(response) => self.api.parse_stats(response),
            Err(err) => Err(err),
        };
        match result {
            Ok(stats) => {
                self.renderer.stats(Some(&stats));
                Some(stats)
            }
            Err(err) => {
                warn!(error = %err, "failed to load statistics");
                self.renderer.stats(None);
                None
            }
        }
    }

    /// Ask for confirmation, seed the server with sample books, then show
    /// the first page and fresh statistics.
    pub async fn initialize_sample_data(
        &self,
    ) -> Result<Outcome<Option<InitSummary>>, CatalogError> {
        if !self.confirm.confirm(CONFIRM_INITIALIZE).await {
            debug!("initialization declined");
            return Ok(Outcome::Declined);
        }

        let request = self.api.build_initialize();
        let response = self.round_trip(request).await.map_err(|err| self.fail(err))?;
        let ack = self.api.parse_initialize(response).map_err(|err| self.fail(err))?;

        let message = ack
            .message
            .unwrap_or_else(|| "Sample data initialized".to_string());
        info!(added = ?ack.data.map(|d| d.books_added), "sample data initialized");
        self.notify(Level::Success, message);
        if let Err(err) = self.list_books(1).await {
            debug!(error = %err, "reload after initialization failed");
        }
        self.get_stats().await;
        Ok(Outcome::Done(ack.data))
    }

    async fn reload_current_page(&self) {
        let page = self.lock().current_page();
        if let Err(err) = self.list_books(page).await {
            debug!(page, error = %err, "reload failed");
        }
        self.get_stats().await;
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, CatalogError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Report a failure to the user and hand the error back.
    fn fail(&self, err: CatalogError) -> CatalogError {
        warn!(error = %err, "operation failed");
        self.notify(Level::Error, err.user_message().to_string());
        err
    }

    fn notify(&self, level: Level, message: String) {
        debug!(%level, %message, "notify");
        self.notifier.notify(Notification {
            message,
            level,
            dismiss_after: self.config.notification_timeout,
        });
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn unhealthy(err: &CatalogError) -> HealthState {
    warn!(error = %err, "health check failed");
    HealthState::Unhealthy {
        reason: err.to_string(),
    }
}
