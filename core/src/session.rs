//! Per-client view of the most recently fetched page.
//!
//! # Design
//! Each list request takes a token from a counter before it is sent. A
//! response is applied only if its token is not older than the newest one
//! already applied, so when two list requests overlap the one issued last
//! always decides the final state regardless of arrival order.

use crate::client::BookPage;
use crate::types::{Book, Pagination};

/// Identifies one list request.
pub type RequestToken = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    current_books: Vec<Book>,
    current_page: u32,
    pagination: Option<Pagination>,
    issued: RequestToken,
    applied: RequestToken,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_books: Vec::new(),
            current_page: 1,
            pagination: None,
            issued: 0,
            applied: 0,
        }
    }
}

impl SessionState {
    pub fn current_books(&self) -> &[Book] {
        &self.current_books
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub(crate) fn issue_token(&mut self) -> RequestToken {
        self.issued += 1;
        self.issued
    }

    pub(crate) fn is_stale(&self, token: RequestToken) -> bool {
        token < self.applied
    }

    /// Replace the page contents. Returns `false` and leaves the state alone
    /// when a newer response was applied first.
    pub(crate) fn apply(&mut self, token: RequestToken, page: u32, result: &BookPage) -> bool {
        if self.is_stale(token) {
            return false;
        }
        self.applied = token;
        self.current_page = page;
        self.current_books = result.books.clone();
        self.pagination = Some(result.pagination);
        true
    }
}
