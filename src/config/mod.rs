//! Configuration loading and management for the Efficiency Engine.
//!
//! This module loads engine settings and per-site reference data (labor
//! rates, transaction types, work centers, employees and shift supervisors)
//! from YAML files, and serves the reference data through the provider
//! traits.
//!
//! # Example
//!
//! ```no_run
//! use efficiency_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Configured sites: {:?}", config.catalog().site_codes());
//! ```

mod catalog;
mod loader;
mod types;

pub use catalog::ReferenceCatalog;
pub use loader::ConfigLoader;
pub use types::{EngineSettings, SiteReference};
