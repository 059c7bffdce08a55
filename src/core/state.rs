// Application state (AppState)

use crate::core::config::Config;
use crate::session::store::SessionStore;
use crate::store::AccountStore;
use std::sync::Arc;

/// Shared application state
///
/// Contains all shared components that are accessed by request handlers.
/// All fields are wrapped in Arc for efficient cloning across threads.
#[derive(Clone)]
pub struct AppState {
    /// Account store capability; CLI-backed in production, in-memory in tests
    pub store: Arc<dyn AccountStore>,

    /// Panel sessions and their flash messages
    pub sessions: Arc<SessionStore>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn AccountStore>) -> Self {
        Self {
            store,
            sessions: Arc::new(SessionStore::new()),
            config: Arc::new(config),
        }
    }
}
