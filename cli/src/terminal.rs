//! Terminal presentation: tables and status lines on stdout, notifications
//! on stderr, confirmation through inquire.

use async_trait::async_trait;
use catalog_core::{
    Book, Confirm, HealthState, Level, Notification, Notifier, Pagination, Renderer, Stats,
};
use tracing::warn;

pub const STATS_PLACEHOLDER: &str = "Statistics unavailable";

pub fn format_health(state: &HealthState) -> String {
    match state {
        HealthState::Checking => "Checking service...".to_string(),
        HealthState::Healthy => "Service OK | database connected".to_string(),
        HealthState::Unhealthy { reason } => format!("Service unavailable | {reason}"),
    }
}

pub fn format_price(price: f64) -> String {
    format!("¥{price:.2}")
}

pub fn format_stats(stats: Option<&Stats>) -> String {
    match stats {
        Some(stats) => format!(
            "Total books: {} | Average price: {}",
            stats.total_books,
            format_price(stats.average_price)
        ),
        None => STATS_PLACEHOLDER.to_string(),
    }
}

pub fn format_page_line(pagination: &Pagination) -> String {
    let mut line = format!("Page {} of {}", pagination.page, pagination.total_pages);
    if pagination.has_previous() {
        line.push_str("  [p]revious");
    }
    if pagination.has_next() {
        line.push_str("  [n]ext");
    }
    line
}

/// Render a page of books as an aligned table; an empty page gets the
/// empty-state hint instead.
pub fn format_books(books: &[Book], pagination: &Pagination) -> String {
    if books.is_empty() {
        return format!(
            "No books yet. Run `catalog init` to add sample data.\n{}",
            format_page_line(pagination)
        );
    }

    let header = ["ID", "Title", "Author", "ISBN", "Publisher", "Price"];
    let rows: Vec<[String; 6]> = books
        .iter()
        .map(|b| {
            [
                b.id.to_string(),
                b.title.clone(),
                b.author.clone(),
                b.isbn.clone(),
                b.publisher
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
                format_price(b.price),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(header.map(str::to_string).as_slice()));
    out.extend(rows.iter().map(|row| line(row.as_slice())));
    out.push(format_page_line(pagination));
    out.join("\n")
}

pub fn format_detail(book: &Book) -> String {
    let mut out = vec![
        book.title.clone(),
        format!("Author: {}", book.author),
        format!("ISBN: {}", book.isbn),
        format!("Publisher: {}", book.publisher.as_deref().unwrap_or("Unknown")),
        format!("Price: {}", format_price(book.price)),
    ];
    if let Some(description) = book.description.as_deref().filter(|d| !d.is_empty()) {
        out.push(String::new());
        out.push(description.to_string());
    }
    if let Some(created) = book.created_at {
        out.push(format!("Created: {}", created.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    out.join("\n")
}

pub fn format_notification(notification: &Notification) -> String {
    let tag = match notification.level {
        Level::Info => "info",
        Level::Success => "ok",
        Level::Error => "error",
    };
    format!("[{tag}] {}", notification.message)
}

/// Prints everything the client reports.
#[derive(Debug, Default)]
pub struct TerminalUi;

impl Renderer for TerminalUi {
    fn health(&self, state: &HealthState) {
        if *state != HealthState::Checking {
            println!("{}", format_health(state));
        }
    }

    fn books(&self, books: &[Book], pagination: &Pagination) {
        println!("{}", format_books(books, pagination));
    }

    fn list_error(&self, message: &str) {
        println!("Failed to load books: {message} (press r to retry)");
    }

    fn stats(&self, stats: Option<&Stats>) {
        println!("{}", format_stats(stats));
    }

    fn book_detail(&self, book: &Book) {
        println!("{}", format_detail(book));
    }
}

// stderr is append-only, so `dismiss_after` has nothing to act on.
impl Notifier for TerminalUi {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", format_notification(&notification));
    }
}

/// Asks on the terminal unless `assume_yes` is set.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfirm {
    pub assume_yes: bool,
}

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let message = prompt.to_owned();
        let answer = tokio::task::spawn_blocking(move || {
            inquire::Confirm::new(&message).with_default(false).prompt()
        })
        .await;
        match answer {
            Ok(Ok(answer)) => answer,
            Ok(Err(err)) => {
                warn!(error = %err, "confirmation prompt failed, treating as no");
                false
            }
            Err(err) => {
                warn!(error = %err, "confirmation prompt task failed, treating as no");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn book(id: i64, title: &str, publisher: Option<&str>, price: f64) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: "Li Hang".to_string(),
            isbn: format!("97873025130{id}"),
            publisher: publisher.map(str::to_string),
            price,
            description: None,
            publish_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn table_aligns_columns() {
        let books = [
            book(1, "AI", Some("Tsinghua"), 75.0),
            book(12, "Cloud Computing", None, 69.5),
        ];
        let pagination = Pagination { page: 1, total_pages: 2, per_page: 10, total: Some(12) };
        let table = format_books(&books, &pagination);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].find("Title"), lines[1].find("AI"));
        assert!(lines[2].contains("Unknown"));
        assert!(lines[2].ends_with("¥69.50"));
        assert_eq!(lines[3], "Page 1 of 2  [n]ext");
    }

    #[test]
    fn empty_page_shows_hint() {
        let pagination = Pagination { page: 1, total_pages: 0, per_page: 10, total: None };
        let text = format_books(&[], &pagination);
        assert!(text.starts_with("No books yet."));
        assert!(text.ends_with("Page 1 of 0"));
    }

    #[test]
    fn page_line_offers_both_directions_in_the_middle() {
        let pagination = Pagination { page: 2, total_pages: 3, per_page: 10, total: None };
        assert_eq!(format_page_line(&pagination), "Page 2 of 3  [p]revious  [n]ext");
    }

    #[test]
    fn stats_and_placeholder() {
        let stats = Stats {
            total_books: 5,
            average_price: 82.2,
            total_authors: Some(5),
            most_expensive_book: None,
        };
        assert_eq!(format_stats(Some(&stats)), "Total books: 5 | Average price: ¥82.20");
        assert_eq!(format_stats(None), STATS_PLACEHOLDER);
    }

    #[test]
    fn health_lines() {
        assert_eq!(format_health(&HealthState::Healthy), "Service OK | database connected");
        assert_eq!(
            format_health(&HealthState::Unhealthy { reason: "timeout".to_string() }),
            "Service unavailable | timeout"
        );
    }

    #[test]
    fn detail_includes_description_when_present() {
        let mut b = book(3, "Dune", Some("Ace"), 9.99);
        assert!(!format_detail(&b).contains("\n\n"));
        b.description = Some("Spice".to_string());
        let text = format_detail(&b);
        assert!(text.starts_with("Dune\nAuthor: Li Hang"));
        assert!(text.ends_with("\n\nSpice"));
    }

    #[test]
    fn notification_tags() {
        let n = Notification {
            message: "Book deleted".to_string(),
            level: Level::Success,
            dismiss_after: Duration::from_secs(5),
        };
        assert_eq!(format_notification(&n), "[ok] Book deleted");
    }

    #[tokio::test]
    async fn assume_yes_skips_prompt() {
        assert!(TerminalConfirm { assume_yes: true }.confirm("Delete?").await);
    }
}
