//! Test doubles shared by the integration suites.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use catalog_core::{
    Book, BookCatalogClient, CatalogError, ClientConfig, Confirm, HealthState, HttpRequest,
    HttpResponse, Level, Notification, Notifier, Pagination, Renderer, Stats, Transport,
};

/// Everything the client asked the presentation layer to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Health(HealthState),
    Loading,
    Books { titles: Vec<String>, pagination: Pagination },
    EmptyState(Pagination),
    ListError(String),
    Stats(Option<Stats>),
    Detail(i64),
}

#[derive(Default)]
pub struct RecordingUi {
    pub rendered: Mutex<Vec<Rendered>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub prompts: Mutex<Vec<String>>,
    pub answer: Mutex<bool>,
}

impl RecordingUi {
    pub fn answering(answer: bool) -> Arc<Self> {
        let ui = Self::default();
        *ui.answer.lock().unwrap() = answer;
        Arc::new(ui)
    }

    pub fn rendered(&self) -> Vec<Rendered> {
        self.rendered.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == Level::Error)
            .map(|n| n.message)
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn push(&self, item: Rendered) {
        self.rendered.lock().unwrap().push(item);
    }
}

impl Renderer for RecordingUi {
    fn health(&self, state: &HealthState) {
        self.push(Rendered::Health(state.clone()));
    }

    fn books_loading(&self) {
        self.push(Rendered::Loading);
    }

    fn books(&self, books: &[Book], pagination: &Pagination) {
        if books.is_empty() {
            self.push(Rendered::EmptyState(*pagination));
        } else {
            self.push(Rendered::Books {
                titles: books.iter().map(|b| b.title.clone()).collect(),
                pagination: *pagination,
            });
        }
    }

    fn list_error(&self, message: &str) {
        self.push(Rendered::ListError(message.to_string()));
    }

    fn stats(&self, stats: Option<&Stats>) {
        self.push(Rendered::Stats(stats.cloned()));
    }

    fn book_detail(&self, book: &Book) {
        self.push(Rendered::Detail(book.id));
    }
}

#[async_trait]
impl Confirm for RecordingUi {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        *self.answer.lock().unwrap()
    }
}

impl Notifier for RecordingUi {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Replies with queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, CatalogError>>>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::json(status, body)));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(CatalogError::Transport(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, CatalogError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for {} {}", request.method, request.path))
    }
}

pub type TestClient<T> = BookCatalogClient<Arc<T>>;

pub fn client_with<T: Transport>(base_url: &str, transport: Arc<T>, ui: &Arc<RecordingUi>) -> TestClient<T> {
    BookCatalogClient::new(
        ClientConfig::new(base_url),
        transport,
        ui.clone(),
        ui.clone(),
        ui.clone(),
    )
}

pub fn book_json(id: i64, title: &str) -> String {
    format!(
        r#"{{"id":{id},"isbn":"isbn-{id}","title":"{title}","author":"Author {id}","publisher":null,"price":10.0,"description":null}}"#
    )
}

pub fn list_body(page: u32, total_pages: u32, books: &[(i64, &str)]) -> String {
    let data: Vec<String> = books.iter().map(|(id, title)| book_json(*id, title)).collect();
    format!(
        r#"{{"success":true,"data":[{}],"pagination":{{"page":{page},"per_page":10,"total_pages":{total_pages}}}}}"#,
        data.join(",")
    )
}

pub const STATS_BODY: &str =
    r#"{"success":true,"data":{"total_books":2,"total_authors":2,"average_price":10.0}}"#;
