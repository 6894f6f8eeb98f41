//! YAML-backed reference catalog.
//!
//! The catalog answers every reference lookup the engine makes from the site
//! files loaded by [`ConfigLoader`](super::ConfigLoader). An unknown site is
//! an error for every lookup.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BusinessUnit, Employee, EmployeeShiftSupervisor, LaborRate, TransactionTypeInfo, Workcenter,
};
use crate::providers::{EmployeeDirectory, LaborRateSource, ReferenceLookup};

use super::types::SiteReference;

/// Reference data for every configured site.
///
/// Cloning is cheap; clones share the loaded site data.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    sites: Arc<HashMap<String, SiteReference>>,
    fixed_now: Option<NaiveDateTime>,
}

impl ReferenceCatalog {
    /// Creates a catalog over the given sites, keyed by upper-cased site code.
    pub fn new(sites: Vec<SiteReference>) -> Self {
        let sites = sites
            .into_iter()
            .map(|site| (site.site_code.to_ascii_uppercase(), site))
            .collect();
        Self {
            sites: Arc::new(sites),
            fixed_now: None,
        }
    }

    /// Returns a catalog that reports `now` as the site time of every site.
    pub fn with_fixed_now(&self, now: NaiveDateTime) -> Self {
        Self {
            sites: Arc::clone(&self.sites),
            fixed_now: Some(now),
        }
    }

    /// Returns the reference data for a site.
    pub fn site(&self, site_code: &str) -> EngineResult<&SiteReference> {
        self.sites
            .get(&site_code.to_ascii_uppercase())
            .ok_or_else(|| EngineError::ReferenceDataMissing {
                site_code: site_code.to_string(),
                kind: "site".to_string(),
            })
    }

    /// Returns the configured site codes, sorted.
    pub fn site_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.sites.values().map(|s| s.site_code.clone()).collect();
        codes.sort();
        codes
    }
}

impl LaborRateSource for ReferenceCatalog {
    fn labor_rates(&self, site_code: &str) -> EngineResult<Vec<LaborRate>> {
        Ok(self.site(site_code)?.labor_rates.clone())
    }
}

impl EmployeeDirectory for ReferenceCatalog {
    fn employees(&self, site_code: &str) -> EngineResult<Vec<Employee>> {
        Ok(self.site(site_code)?.employees.clone())
    }
}

impl ReferenceLookup for ReferenceCatalog {
    fn business_unit(&self, site_code: &str) -> EngineResult<BusinessUnit> {
        Ok(self.site(site_code)?.business_unit)
    }

    fn transaction_types(&self, site_code: &str) -> EngineResult<Vec<TransactionTypeInfo>> {
        Ok(self.site(site_code)?.transaction_types.clone())
    }

    fn workcenters(&self, site_code: &str) -> EngineResult<Vec<Workcenter>> {
        Ok(self.site(site_code)?.workcenters.clone())
    }

    fn shift_supervisors(&self, site_code: &str) -> EngineResult<Vec<EmployeeShiftSupervisor>> {
        Ok(self.site(site_code)?.shift_supervisors.clone())
    }

    fn site_now(&self, site_code: &str) -> EngineResult<NaiveDateTime> {
        let site = self.site(site_code)?;
        Ok(self.fixed_now.unwrap_or_else(|| {
            Utc::now().naive_utc() + Duration::minutes(site.utc_offset_minutes)
        }))
    }
}
