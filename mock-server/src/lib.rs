use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Seed records inserted by `POST /api/init`: isbn, title, author, publisher, price.
pub const SAMPLE_BOOKS: [(&str, &str, &str, &str, f64); 5] = [
    ("9787115470669", "Flask Web Development in Practice", "Li Hui", "Posts & Telecom Press", 79.0),
    ("9787111554905", "Docker: From Basics to Practice", "Yang Baohua", "China Machine Press", 89.0),
    ("9787121411152", "Cloud Computing Architecture", "Wang Li", "Publishing House of Electronics Industry", 69.0),
    ("9787302513015", "Introduction to Artificial Intelligence", "Li Hang", "Tsinghua University Press", 75.0),
    ("9787111641247", "Spring Boot in Action", "Wang Fuqiang", "China Machine Press", 99.0),
];

const DEFAULT_PER_PAGE: i64 = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publish_date: Option<String>,
    pub price: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct NewBook {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publish_date: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    books: BTreeMap<i64, Book>,
    next_id: i64,
}

impl Store {
    fn insert(&mut self, input: NewBook, isbn: String, title: String, author: String) -> i64 {
        self.next_id += 1;
        let now = Utc::now();
        let book = Book {
            id: self.next_id,
            isbn,
            title,
            author,
            publisher: input.publisher,
            publish_date: input.publish_date,
            price: input.price.unwrap_or(0.0),
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        self.books.insert(book.id, book);
        self.next_id
    }

    fn has_isbn(&self, isbn: &str) -> bool {
        self.books.values().any(|b| b.isbn == isbn)
    }

    /// Newest first; ties broken by id so freshly seeded rows keep a stable order.
    fn newest_first(&self) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.values().collect();
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        books
    }
}

pub type Db = Arc<RwLock<Store>>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/books", get(list_books).post(create_book))
        .route(
            "/api/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/stats", get(stats))
        .route("/api/init", post(init_database))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

fn failure(status: StatusCode, message: impl Into<String>) -> Reply {
    (
        status,
        Json(json!({ "success": false, "message": message.into() })),
    )
}

fn success(status: StatusCode, message: &str, data: Value) -> Reply {
    (
        status,
        Json(json!({
            "success": true,
            "message": message,
            "data": data,
            "timestamp": timestamp(),
        })),
    )
}

async fn index() -> Json<Value> {
    Json(json!({
        "service": "Book catalog API",
        "version": "1.0.0",
        "timestamp": timestamp(),
        "status": "running",
        "endpoints": {
            "health": "/api/health",
            "list books": "/api/books (GET)",
            "create book": "/api/books (POST)",
            "book details": "/api/books/{id} (GET)",
            "update book": "/api/books/{id} (PUT)",
            "delete book": "/api/books/{id} (DELETE)",
            "statistics": "/api/stats",
            "seed sample data": "/api/init (POST)",
        },
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "database": "connected",
        "timestamp": timestamp(),
        "service": "book catalog backend",
    }))
}

fn parse_positive(raw: Option<&str>, default: i64) -> Option<i64> {
    match raw {
        None => Some(default),
        Some(s) => s.trim().parse::<i64>().ok().filter(|n| *n >= 1),
    }
}

async fn list_books(State(db): State<Db>, Query(params): Query<ListParams>) -> Reply {
    let (Some(page), Some(per_page)) = (
        parse_positive(params.page.as_deref(), 1),
        parse_positive(params.per_page.as_deref(), DEFAULT_PER_PAGE),
    ) else {
        return failure(StatusCode::BAD_REQUEST, "invalid pagination parameters");
    };

    let store = db.read().await;
    let total = store.books.len() as i64;
    let offset = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);
    let limit = usize::try_from(per_page).unwrap_or(usize::MAX);
    let data: Vec<&Book> = store
        .newest_first()
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": data,
            "pagination": {
                "page": page,
                "per_page": per_page,
                "total": total,
                "total_pages": (total + per_page - 1) / per_page,
            },
            "timestamp": timestamp(),
        })),
    )
}

async fn get_book(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let store = db.read().await;
    match store.books.get(&id) {
        Some(book) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": book, "timestamp": timestamp() })),
        ),
        None => failure(StatusCode::NOT_FOUND, "book not found"),
    }
}

fn required(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

async fn create_book(
    State(db): State<Db>,
    body: Result<Json<NewBook>, JsonRejection>,
) -> Reply {
    let Ok(Json(input)) = body else {
        return failure(StatusCode::BAD_REQUEST, "request body must be a JSON object");
    };

    let (isbn, title, author) = match (
        required(&input.isbn),
        required(&input.title),
        required(&input.author),
    ) {
        (Some(isbn), Some(title), Some(author)) => (isbn, title, author),
        (None, _, _) => return failure(StatusCode::BAD_REQUEST, "missing required field: isbn"),
        (_, None, _) => return failure(StatusCode::BAD_REQUEST, "missing required field: title"),
        (_, _, None) => return failure(StatusCode::BAD_REQUEST, "missing required field: author"),
    };

    let mut store = db.write().await;
    if store.has_isbn(&isbn) {
        warn!(%isbn, "duplicate isbn rejected");
        return failure(StatusCode::BAD_REQUEST, "ISBN may already exist");
    }
    let id = store.insert(input, isbn, title, author);
    info!(id, "book created");
    success(StatusCode::CREATED, "book created", json!({ "id": id }))
}

fn string_field(field: &str, value: &Value) -> Result<Option<String>, Reply> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(failure(
            StatusCode::BAD_REQUEST,
            format!("invalid value for field: {field}"),
        )),
    }
}

/// Only the fields present in the body change; `isbn` is not updatable.
async fn update_book(
    State(db): State<Db>,
    Path(id): Path<i64>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Reply {
    let input = match body {
        Ok(Json(map)) if !map.is_empty() => map,
        _ => return failure(StatusCode::BAD_REQUEST, "request body must not be empty"),
    };

    const UPDATABLE: [&str; 6] = ["title", "author", "publisher", "publish_date", "price", "description"];
    if !UPDATABLE.iter().any(|f| input.contains_key(*f)) {
        return failure(StatusCode::BAD_REQUEST, "no updatable fields");
    }

    let mut store = db.write().await;
    let Some(book) = store.books.get_mut(&id) else {
        return failure(StatusCode::NOT_FOUND, "book not found");
    };

    let mut updated = book.clone();
    for (field, value) in &input {
        let applied = match field.as_str() {
            "title" | "author" => match string_field(field, value) {
                Ok(Some(s)) if !s.is_empty() => {
                    if field == "title" {
                        updated.title = s;
                    } else {
                        updated.author = s;
                    }
                    Ok(())
                }
                Ok(_) => Err(failure(
                    StatusCode::BAD_REQUEST,
                    format!("missing required field: {field}"),
                )),
                Err(reply) => Err(reply),
            },
            "publisher" => string_field(field, value).map(|v| updated.publisher = v),
            "publish_date" => string_field(field, value).map(|v| updated.publish_date = v),
            "description" => string_field(field, value).map(|v| updated.description = v),
            "price" => match value {
                Value::Null => {
                    updated.price = 0.0;
                    Ok(())
                }
                Value::Number(n) => {
                    updated.price = n.as_f64().unwrap_or(0.0);
                    Ok(())
                }
                _ => Err(failure(StatusCode::BAD_REQUEST, "invalid value for field: price")),
            },
            _ => Ok(()),
        };
        if let Err(reply) = applied {
            return reply;
        }
    }
    updated.updated_at = Utc::now();
    *book = updated;

    info!(id, "book updated");
    success(StatusCode::OK, "book updated", json!({ "id": id }))
}

async fn delete_book(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let mut store = db.write().await;
    match store.books.remove(&id) {
        Some(_) => {
            info!(id, "book deleted");
            success(StatusCode::OK, "book deleted", json!({ "id": id }))
        }
        None => failure(StatusCode::NOT_FOUND, "book not found"),
    }
}

async fn stats(State(db): State<Db>) -> Reply {
    let store = db.read().await;
    let total_books = store.books.len();
    let total_authors = store
        .books
        .values()
        .map(|b| b.author.as_str())
        .collect::<HashSet<_>>()
        .len();

    let priced: Vec<&Book> = store.books.values().filter(|b| b.price > 0.0).collect();
    let average_price = if priced.is_empty() {
        0.0
    } else {
        let avg = priced.iter().map(|b| b.price).sum::<f64>() / priced.len() as f64;
        (avg * 100.0).round() / 100.0
    };
    let most_expensive = priced
        .iter()
        .max_by(|a, b| a.price.total_cmp(&b.price))
        .map(|b| json!({ "title": b.title, "author": b.author, "price": b.price }))
        .unwrap_or_else(|| json!({ "title": null, "author": null, "price": 0 }));

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "total_books": total_books,
                "total_authors": total_authors,
                "average_price": average_price,
                "most_expensive_book": most_expensive,
            },
            "timestamp": timestamp(),
        })),
    )
}

/// Inserts the sample books whose ISBN is not taken yet.
async fn init_database(State(db): State<Db>) -> Reply {
    let mut store = db.write().await;
    let mut added = 0u32;
    for (isbn, title, author, publisher, price) in SAMPLE_BOOKS {
        if store.has_isbn(isbn) {
            continue;
        }
        let input = NewBook {
            isbn: None,
            title: None,
            author: None,
            publisher: Some(publisher.to_string()),
            publish_date: None,
            price: Some(price),
            description: None,
        };
        store.insert(input, isbn.to_string(), title.to_string(), author.to_string());
        added += 1;
    }
    info!(added, "sample data initialized");
    success(
        StatusCode::OK,
        &format!("database initialized, added {added} new books"),
        json!({ "books_added": added }),
    )
}
