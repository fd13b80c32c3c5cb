use crate::storage::ClipStore;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Where uploaded clips are written
    pub store: Arc<ClipStore>,

    /// Multipart field carrying the clip
    pub field_name: Arc<str>,
}

impl AppState {
    pub fn new(store: ClipStore, field_name: impl Into<Arc<str>>) -> Self {
        Self {
            store: Arc::new(store),
            field_name: field_name.into(),
        }
    }
}
