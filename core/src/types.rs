//! Domain DTOs for the book catalog API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any schema drift between the two crates. Every
//! response is wrapped in an `Envelope`, and fields the backend may omit are
//! optional or defaulted so a partial record still deserializes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::CatalogError;

/// Server-assigned book identifier.
pub type BookId = i64;

/// A single book record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Page metadata attached to list responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub per_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl Pagination {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Request payload for creating or replacing a book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub price: f64,
    pub description: String,
}

/// Raw, unvalidated form input. Every field is the text the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub price: String,
    pub description: String,
}

impl BookForm {
    /// Trim every field, require title/author/isbn and coerce the price.
    ///
    /// A price that does not parse becomes `0` rather than an error.
    pub fn validate(&self) -> Result<BookFields, CatalogError> {
        let title = self.title.trim();
        let author = self.author.trim();
        let isbn = self.isbn.trim();
        if title.is_empty() || author.is_empty() || isbn.is_empty() {
            return Err(CatalogError::Validation(
                "title, author and ISBN are required".to_string(),
            ));
        }

        let raw_price = self.price.trim();
        let price = parse_price(raw_price);
        if !raw_price.is_empty() && raw_price.parse::<f64>().map_or(true, |v| !v.is_finite()) {
            warn!(input = %raw_price, coerced = price, "price is not a plain number");
        }

        Ok(BookFields {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            publisher: self.publisher.trim().to_string(),
            price,
            description: self.description.trim().to_string(),
        })
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            publisher: book.publisher.clone().unwrap_or_default(),
            price: book.price.to_string(),
            description: book.description.clone().unwrap_or_default(),
        }
    }
}

/// Parse the longest numeric prefix of `input`, falling back to `0`.
///
/// `"12.5"` and `"12.5 CNY"` both give `12.5`; `"abc"`, `""` and
/// non-finite values give `0`.
pub fn parse_price(input: &str) -> f64 {
    let trimmed = input.trim();
    let mut ends: Vec<usize> = trimmed.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
    ends.reverse();
    ends.into_iter()
        .filter_map(|end| trimmed[..end].parse::<f64>().ok())
        .find(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Aggregate numbers shown in the header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub total_books: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub average_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_authors: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_expensive_book: Option<MostExpensiveBook>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MostExpensiveBook {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub price: f64,
}

/// `data` of a successful create response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedBook {
    pub id: BookId,
}

/// `data` of a successful sample-data initialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitSummary {
    pub books_added: u32,
}

/// The `{success, data, message, pagination}` wrapper every endpoint returns.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub pagination: Option<Pagination>,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Presentation state of the health indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthState {
    Checking,
    Healthy,
    Unhealthy { reason: String },
}

impl HealthState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthState::Healthy)
    }
}

impl From<HealthReport> for HealthState {
    fn from(report: HealthReport) -> Self {
        if report.status == "healthy" {
            HealthState::Healthy
        } else {
            let reason = report
                .error
                .or(report.database.map(|db| format!("database {db}")))
                .unwrap_or(report.status);
            HealthState::Unhealthy { reason }
        }
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    /// Accepts RFC 3339 as well as the `YYYY-MM-DD HH:MM:SS[.ffffff][+zz:zz]`
    /// form produced by stringified database timestamps. Naive values are
    /// taken as UTC.
    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&raw).map(Some).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
