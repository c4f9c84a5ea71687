//! Application state for the web layer.

use std::sync::Arc;

use crate::store::DataStore;

/// Shared application state.
///
/// Created once at startup; the station collection inside the store is
/// replaced wholesale on every refresh.
#[derive(Clone)]
pub struct AppState {
    /// Station collection and its loader
    pub store: Arc<DataStore>,

    /// Brand shown on the map, for page titles
    pub brand: Arc<str>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: Arc<DataStore>, brand: &str) -> Self {
        Self {
            store,
            brand: Arc::from(brand),
        }
    }
}
