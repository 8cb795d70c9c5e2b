//! Application state for the web layer.

use crate::refresh::SharedSystem;

/// Shared application state.
///
/// Handlers only ever take the read lock; the refresh task is the sole
/// writer.
#[derive(Clone)]
pub struct AppState {
    /// The live train system
    pub system: SharedSystem,
}

impl AppState {
    /// Create a new app state.
    pub fn new(system: SharedSystem) -> Self {
        Self { system }
    }
}
