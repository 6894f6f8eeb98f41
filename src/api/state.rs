//! Application state for the Efficiency Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::orchestrator::SiteLocks;

/// Shared application state.
///
/// Holds the loaded configuration and the per-site locks every request
/// computes under.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<ConfigLoader>,
    /// Locks serializing work per site across requests.
    site_locks: Arc<SiteLocks>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
            site_locks: Arc::new(SiteLocks::new()),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a handle to the shared site locks.
    pub fn site_locks(&self) -> Arc<SiteLocks> {
        Arc::clone(&self.site_locks)
    }
}
