//! Stateless HTTP request builder and response parser for the book API.
//!
//! # Design
//! `BookApi` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Failure is decided by the envelope's `success` flag, not by the status
//! code; the status is only used to tell a missing book from other failures.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{CatalogError, GENERIC_FAILURE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Book, BookFields, BookId, CreatedBook, Envelope, HealthReport, HealthState, InitSummary,
    Pagination, Stats,
};

pub const HEALTH_PATH: &str = "/api/health";
pub const BOOKS_PATH: &str = "/api/books";
pub const STATS_PATH: &str = "/api/stats";
pub const INIT_PATH: &str = "/api/init";

/// One page of books together with its pagination block.
#[derive(Debug, Clone, PartialEq)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub pagination: Pagination,
}

/// Successful answer to a mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledged<T> {
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Synchronous, stateless client for the book API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct BookApi {
    base_url: String,
}

impl BookApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_health(&self) -> HttpRequest {
        self.request(HttpMethod::Get, HEALTH_PATH.to_string())
    }

    pub fn build_list_books(&self, page: u32, per_page: u32) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("{BOOKS_PATH}?page={page}&per_page={per_page}"),
        )
    }

    pub fn build_get_book(&self, id: BookId) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{BOOKS_PATH}/{id}"))
    }

    pub fn build_create_book(&self, fields: &BookFields) -> Result<HttpRequest, CatalogError> {
        self.json_request(HttpMethod::Post, BOOKS_PATH.to_string(), fields)
    }

    pub fn build_update_book(
        &self,
        id: BookId,
        fields: &BookFields,
    ) -> Result<HttpRequest, CatalogError> {
        self.json_request(HttpMethod::Put, format!("{BOOKS_PATH}/{id}"), fields)
    }

    pub fn build_delete_book(&self, id: BookId) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("{BOOKS_PATH}/{id}"))
    }

    pub fn build_stats(&self) -> HttpRequest {
        self.request(HttpMethod::Get, STATS_PATH.to_string())
    }

    pub fn build_initialize(&self) -> HttpRequest {
        let mut req = self.request(HttpMethod::Post, INIT_PATH.to_string());
        req.headers.push(json_content_type());
        req
    }

    /// The health endpoint has no envelope. A 500 still carries a readable
    /// `{status: "unhealthy"}` body, so the status code is ignored.
    pub fn parse_health(&self, response: HttpResponse) -> Result<HealthState, CatalogError> {
        let report: HealthReport = decode(&response)?;
        Ok(report.into())
    }

    pub fn parse_list_books(&self, response: HttpResponse) -> Result<BookPage, CatalogError> {
        let envelope: Envelope<Vec<Book>> = open_envelope(&response)?;
        let pagination = envelope
            .pagination
            .ok_or_else(|| CatalogError::Deserialization("missing pagination".to_string()))?;
        let books = require_data(envelope.data)?;
        Ok(BookPage { books, pagination })
    }

    pub fn parse_get_book(&self, response: HttpResponse) -> Result<Book, CatalogError> {
        let envelope: Envelope<Book> = open_envelope(&response)?;
        require_data(envelope.data)
    }

    pub fn parse_create_book(
        &self,
        response: HttpResponse,
    ) -> Result<Acknowledged<CreatedBook>, CatalogError> {
        acknowledge(&response)
    }

    pub fn parse_update_book(
        &self,
        response: HttpResponse,
    ) -> Result<Acknowledged<CreatedBook>, CatalogError> {
        acknowledge_loosely(&response)
    }

    pub fn parse_delete_book(
        &self,
        response: HttpResponse,
    ) -> Result<Acknowledged<CreatedBook>, CatalogError> {
        acknowledge_loosely(&response)
    }

    pub fn parse_stats(&self, response: HttpResponse) -> Result<Stats, CatalogError> {
        let envelope: Envelope<Stats> = open_envelope(&response)?;
        require_data(envelope.data)
    }

    pub fn parse_initialize(
        &self,
        response: HttpResponse,
    ) -> Result<Acknowledged<InitSummary>, CatalogError> {
        acknowledge(&response)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request(
        &self,
        method: HttpMethod,
        path: String,
        fields: &BookFields,
    ) -> Result<HttpRequest, CatalogError> {
        let body =
            serde_json::to_string(fields).map_err(|e| CatalogError::Serialization(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers.push(json_content_type());
        req.body = Some(body);
        Ok(req)
    }
}

fn json_content_type() -> (String, String) {
    ("content-type".to_string(), "application/json".to_string())
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, CatalogError> {
    serde_json::from_str(&response.body).map_err(|e| {
        CatalogError::Deserialization(format!("HTTP {}: {e}", response.status))
    })
}

/// Decode the envelope and turn `success: false` into an error carrying the
/// server's message.
fn open_envelope<T: DeserializeOwned>(response: &HttpResponse) -> Result<Envelope<T>, CatalogError> {
    let envelope: Envelope<T> = decode(response)?;
    if envelope.success {
        return Ok(envelope);
    }
    let message = envelope
        .message
        .or(envelope.error)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
    if response.status == 404 {
        return Err(CatalogError::NotFound { message });
    }
    Err(CatalogError::Application {
        status: response.status,
        message,
    })
}

fn require_data<T>(data: Option<T>) -> Result<T, CatalogError> {
    data.ok_or_else(|| CatalogError::Deserialization("missing data".to_string()))
}

fn acknowledge<T: DeserializeOwned>(
    response: &HttpResponse,
) -> Result<Acknowledged<T>, CatalogError> {
    let envelope: Envelope<T> = open_envelope(response)?;
    Ok(Acknowledged {
        message: envelope.message,
        data: envelope.data,
    })
}

/// Like `acknowledge`, but success hinges on `success` alone: a `data`
/// payload that is not `T` is dropped instead of failing the call.
fn acknowledge_loosely<T: DeserializeOwned>(
    response: &HttpResponse,
) -> Result<Acknowledged<T>, CatalogError> {
    let envelope: Envelope<serde_json::Value> = open_envelope(response)?;
    let data = envelope.data.and_then(|value| {
        serde_json::from_value(value)
            .map_err(|e| debug!(error = %e, "ignoring unexpected acknowledgement data"))
            .ok()
    });
    Ok(Acknowledged {
        message: envelope.message,
        data,
    })
}
