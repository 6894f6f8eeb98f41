//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine settings
//! and site reference data from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::catalog::ReferenceCatalog;
use super::types::{EngineSettings, SiteReference};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── engine.yaml     # Engine settings
/// └── sites/
///     ├── DC01.yaml   # Reference data for site DC01
///     └── LT01.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use efficiency_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Interval width: {} minutes", loader.settings().breakdown_interval_minutes);
/// # Ok::<(), efficiency_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: EngineSettings,
    catalog: ReferenceCatalog,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `engine.yaml` or the `sites` directory is missing
    /// - the `sites` directory holds no `.yaml` files
    /// - any file contains invalid YAML
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let sites = Self::load_sites(&path.join("sites"))?;

        info!(
            config_dir = %path.display(),
            sites = sites.len(),
            breakdown_interval_minutes = settings.breakdown_interval_minutes,
            "Loaded efficiency engine configuration"
        );

        Ok(Self {
            settings,
            catalog: ReferenceCatalog::new(sites),
        })
    }

    /// Creates a loader from already-built parts.
    pub fn from_parts(settings: EngineSettings, sites: Vec<SiteReference>) -> Self {
        Self {
            settings,
            catalog: ReferenceCatalog::new(sites),
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every site file, in file-name order.
    fn load_sites(sites_dir: &Path) -> EngineResult<Vec<SiteReference>> {
        let sites_dir_str = sites_dir.display().to_string();

        let entries = fs::read_dir(sites_dir).map_err(|_| EngineError::ConfigNotFound {
            path: sites_dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: sites_dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no site files found)", sites_dir_str),
            });
        }

        paths
            .iter()
            .map(|path| Self::load_yaml::<SiteReference>(path))
            .collect()
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the site reference catalog.
    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    /// Gets the reference data for a site.
    pub fn site(&self, site_code: &str) -> EngineResult<&SiteReference> {
        self.catalog.site(site_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessUnit, WorkcenterType};
    use crate::providers::{EmployeeDirectory, LaborRateSource, ReferenceLookup};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.settings().breakdown_interval_minutes, 60);
        assert_eq!(loader.settings().rework_transaction_type, "LOAD");
        assert_eq!(
            loader.catalog().site_codes(),
            vec!["DC01".to_string(), "LT01".to_string()]
        );
    }

    #[test]
    fn test_site_labor_rates_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let rates = loader.catalog().labor_rates("DC01").unwrap();

        let pick = rates
            .iter()
            .find(|r| r.transaction_type_code == "PICK")
            .unwrap();
        assert_eq!(pick.units_per_hour, dec("120"));
        assert_eq!(pick.seconds_per_unit(), dec("30"));
    }

    #[test]
    fn test_site_employees_and_workcenters_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let employees = loader.catalog().employees("DC01").unwrap();
        assert!(employees.iter().any(|e| e.tna_employee_code == "T1001"));

        let workcenters = loader.catalog().workcenters("DC01").unwrap();
        let office = workcenters.iter().find(|w| w.code == "WC-OFFICE").unwrap();
        assert!(!office.is_transactional);
        assert_eq!(office.workcenter_type, WorkcenterType::NonTransactional);
    }

    #[test]
    fn test_ltl_site_business_unit() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(
            loader.catalog().business_unit("LT01").unwrap(),
            BusinessUnit::Ltl
        );
        assert_eq!(loader.site("lt01").unwrap().site_code, "LT01");
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");
        assert!(result.is_err());

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_from_parts_uses_given_settings() {
        let settings = EngineSettings {
            breakdown_interval_minutes: 15,
            ..EngineSettings::default()
        };
        let loader = ConfigLoader::from_parts(settings, vec![]);
        assert_eq!(loader.settings().breakdown_interval_minutes, 15);
        assert!(loader.site("DC01").is_err());
    }
}
