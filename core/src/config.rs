//! Client configuration.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings fixed for the lifetime of a `BookCatalogClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as `per_page` on every list request.
    pub page_size: u32,
    /// How long a notification stays visible before the sink drops it.
    pub notification_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// A page size of zero is bumped to one.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.notification_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_page_size_is_clamped() {
        assert_eq!(ClientConfig::new("http://x").with_page_size(0).page_size, 1);
    }
}
