use std::sync::Arc;

use jiff::SignedDuration;
use portal_core::UrlStorage;

#[derive(Clone)]
pub struct AppState {
    storage: Arc<dyn UrlStorage>,
    ttl: SignedDuration,
    host_name: String,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn UrlStorage>,
        ttl: SignedDuration,
        host_name: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            ttl,
            host_name: host_name.into(),
        }
    }

    pub fn storage(&self) -> &dyn UrlStorage {
        self.storage.as_ref()
    }

    pub fn ttl(&self) -> SignedDuration {
        self.ttl
    }

    /// Host used for short URLs when the request names none.
    pub fn host_name(&self) -> &str {
        &self.host_name
    }
}
