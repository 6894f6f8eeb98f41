//! Per-site serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A registry of one mutex per site code.
///
/// Work for the same site runs one at a time; different sites never wait on
/// each other. Site codes are compared case-insensitively. Entries are
/// created on first use and kept for the life of the registry.
///
/// # Example
///
/// ```
/// use efficiency_engine::orchestrator::SiteLocks;
///
/// let locks = SiteLocks::new();
/// let total = locks.with_lock("DC01", || 2 + 2);
/// assert_eq!(total, 4);
/// assert_eq!(locks.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SiteLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SiteLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mutex for `site_code`, creating it if needed.
    pub fn lock_for(&self, site_code: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            locks
                .entry(site_code.to_ascii_uppercase())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Runs `work` while holding the lock for `site_code`.
    ///
    /// A lock poisoned by a panicking holder is taken over; the guarded
    /// data is empty so there is nothing to repair.
    pub fn with_lock<T>(&self, site_code: &str, work: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(site_code);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        work()
    }

    /// Returns the number of sites seen so far.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns true if no site has been locked yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
