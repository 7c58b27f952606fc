//! The I/O seam between `BookCatalogClient` and the network.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Implementations return non-2xx responses as `Ok` and reserve `Err` for
/// requests that produced no response at all (`CatalogError::Transport`).
/// No timeout or retry is expected; whatever the underlying client does by
/// default applies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, CatalogError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, CatalogError> {
        (**self).execute(request).await
    }
}
