use crate::store::ContentStore;
use std::sync::Arc;

/// Shared state handed to every request handler. The store is the only
/// long-lived resource; analyzers are built per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContentStore>,
}

impl AppState {
    pub fn new(store: ContentStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
