//! Full CRUD lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every endpoint
//! over real HTTP using ureq: first through the sans-IO `BookApi` directly,
//! then through `BookCatalogClient` with a ureq-backed `Transport`.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use catalog_core::{
    BookApi, BookForm, CatalogError, FormMode, HealthState, HttpMethod, HttpRequest, HttpResponse,
    Outcome, Transport,
};
use common::{client_with, RecordingUi, Rendered};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> Result<HttpResponse, CatalogError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
    }
    .map_err(|e| CatalogError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body,
    })
}

/// Runs the blocking ureq call off the async executor.
struct UreqTransport;

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, CatalogError> {
        tokio::task::spawn_blocking(move || execute(request))
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?
    }
}

/// Start the mock server on a random port in a background thread.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn form(title: &str, isbn: &str, price: &str) -> BookForm {
    BookForm {
        title: title.to_string(),
        author: "Integration Author".to_string(),
        isbn: isbn.to_string(),
        publisher: "Test Press".to_string(),
        price: price.to_string(),
        description: String::new(),
    }
}

#[test]
fn crud_lifecycle() {
    let api = BookApi::new(&start_server());

    // Step 1: health.
    let health = api.parse_health(execute(api.build_health()).unwrap()).unwrap();
    assert_eq!(health, HealthState::Healthy);

    // Step 2: list should be empty.
    let page = api.parse_list_books(execute(api.build_list_books(1, 10)).unwrap()).unwrap();
    assert!(page.books.is_empty(), "expected empty list");
    assert_eq!(page.pagination.total_pages, 0);

    // Step 3: create a book.
    let fields = form("Integration test", "978-int", "19.90").validate().unwrap();
    let req = api.build_create_book(&fields).unwrap();
    let created = api.parse_create_book(execute(req).unwrap()).unwrap();
    let id = created.data.unwrap().id;

    // Step 4: get the created book.
    let fetched = api.parse_get_book(execute(api.build_get_book(id)).unwrap()).unwrap();
    assert_eq!(fetched.title, "Integration test");
    assert_eq!(fetched.price, 19.9);
    assert!(fetched.created_at.is_some());

    // Step 5: duplicate ISBN is rejected with the server's message.
    let req = api.build_create_book(&fields).unwrap();
    let err = api.parse_create_book(execute(req).unwrap()).unwrap_err();
    assert_eq!(err.user_message(), "ISBN may already exist");

    // Step 6: update.
    let fields = form("Updated title", "978-int", "not a price").validate().unwrap();
    let req = api.build_update_book(id, &fields).unwrap();
    api.parse_update_book(execute(req).unwrap()).unwrap();
    let fetched = api.parse_get_book(execute(api.build_get_book(id)).unwrap()).unwrap();
    assert_eq!(fetched.title, "Updated title");
    assert_eq!(fetched.price, 0.0);

    // Step 7: stats reflect the single zero-priced book.
    let stats = api.parse_stats(execute(api.build_stats()).unwrap()).unwrap();
    assert_eq!(stats.total_books, 1);
    assert_eq!(stats.average_price, 0.0);

    // Step 8: delete.
    api.parse_delete_book(execute(api.build_delete_book(id)).unwrap()).unwrap();

    // Step 9: get after delete should be NotFound.
    let err = api.parse_get_book(execute(api.build_get_book(id)).unwrap()).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));

    // Step 10: delete again should be NotFound.
    let err = api.parse_delete_book(execute(api.build_delete_book(id)).unwrap()).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));

    // Step 11: seed sample data and page through it.
    let ack = api.parse_initialize(execute(api.build_initialize()).unwrap()).unwrap();
    assert_eq!(ack.data.unwrap().books_added, 5);
    let page = api.parse_list_books(execute(api.build_list_books(2, 2)).unwrap()).unwrap();
    assert_eq!(page.books.len(), 2);
    assert_eq!(page.pagination.total_pages, 3);
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let api = BookApi::new("http://127.0.0.1:9");
    let err = execute(api.build_health()).unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test(flavor = "multi_thread")]
async fn catalog_client_against_live_server() {
    let base = start_server();
    let ui = RecordingUi::answering(true);
    let client = client_with(&base, Arc::new(UreqTransport), &ui);

    client.start().await;
    assert!(ui.rendered().contains(&Rendered::Health(HealthState::Healthy)));
    assert!(ui
        .rendered()
        .iter()
        .any(|r| matches!(r, Rendered::EmptyState(p) if p.total_pages == 0)));

    let outcome = client.initialize_sample_data().await.unwrap();
    assert!(matches!(outcome, Outcome::Done(Some(s)) if s.books_added == 5));
    assert_eq!(client.session().current_books().len(), 5);

    client
        .submit_form(FormMode::Add, &form("Client-made", "978-client", "42"))
        .await
        .unwrap();
    let newest = client.session().current_books()[0].clone();
    assert_eq!(newest.title, "Client-made");

    let err = client
        .submit_form(FormMode::Add, &form("  ", "978-x", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));

    assert_eq!(client.delete_book(newest.id).await.unwrap(), Outcome::Done(()));
    assert!(client
        .session()
        .current_books()
        .iter()
        .all(|b| b.id != newest.id));

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.total_books, 5);
}
