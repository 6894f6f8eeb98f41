//! Configuration types for the efficiency engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::models::{
    BusinessUnit, DEFAULT_REWORK_TRANSACTION_TYPE, Employee, EmployeeShiftSupervisor, LaborRate,
    TransactionTypeInfo, Workcenter,
};

/// Tunable parameters of the engine, loaded from `engine.yaml`.
///
/// Every field has a default, so an empty file yields the standard settings.
///
/// # Example
///
/// ```
/// use efficiency_engine::config::EngineSettings;
/// use chrono::Duration;
///
/// let settings: EngineSettings = serde_yaml::from_str("breakdown_interval_minutes: 30").unwrap();
/// assert_eq!(settings.breakdown_interval(), Duration::minutes(30));
/// assert_eq!(settings.max_transaction_gap(), Duration::hours(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Width of the sub-intervals a shift is sliced into.
    pub breakdown_interval_minutes: i64,
    /// Padding before the first transaction of an orphan shift.
    pub orphan_start_padding_minutes: i64,
    /// Padding after the last transaction of an orphan shift.
    pub orphan_end_padding_minutes: i64,
    /// Gap between transactions that ends an orphan shift.
    pub max_transaction_gap_hours: i64,
    /// How far outside the requested window transactions are searched for orphans.
    pub orphan_search_padding_hours: i64,
    /// Longest orphan shift kept whole before it is split at midnight.
    pub max_orphan_shift_hours: i64,
    /// The transaction type whose zero-earning scans count as rework.
    pub rework_transaction_type: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            breakdown_interval_minutes: 60,
            orphan_start_padding_minutes: 30,
            orphan_end_padding_minutes: 30,
            max_transaction_gap_hours: 8,
            orphan_search_padding_hours: 12,
            max_orphan_shift_hours: 24,
            rework_transaction_type: DEFAULT_REWORK_TRANSACTION_TYPE.to_string(),
        }
    }
}

impl EngineSettings {
    /// Returns the sub-interval width.
    pub fn breakdown_interval(&self) -> Duration {
        Duration::minutes(self.breakdown_interval_minutes)
    }

    /// Returns the orphan start padding.
    pub fn orphan_start_padding(&self) -> Duration {
        Duration::minutes(self.orphan_start_padding_minutes)
    }

    /// Returns the orphan end padding.
    pub fn orphan_end_padding(&self) -> Duration {
        Duration::minutes(self.orphan_end_padding_minutes)
    }

    /// Returns the gap that ends an orphan shift.
    pub fn max_transaction_gap(&self) -> Duration {
        Duration::hours(self.max_transaction_gap_hours)
    }

    /// Returns the orphan search padding.
    pub fn orphan_search_padding(&self) -> Duration {
        Duration::hours(self.orphan_search_padding_hours)
    }

    /// Returns the longest orphan shift kept whole.
    pub fn max_orphan_shift(&self) -> Duration {
        Duration::hours(self.max_orphan_shift_hours)
    }
}

/// Reference data for one site, loaded from `sites/<code>.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteReference {
    /// The site code.
    pub site_code: String,
    /// The site's business unit.
    #[serde(default)]
    pub business_unit: BusinessUnit,
    /// Offset of site-local time from UTC.
    #[serde(default)]
    pub utc_offset_minutes: i64,
    /// Target rates by transaction type.
    #[serde(default)]
    pub labor_rates: Vec<LaborRate>,
    /// The transaction-type catalog.
    #[serde(default)]
    pub transaction_types: Vec<TransactionTypeInfo>,
    /// Work centers at the site.
    #[serde(default)]
    pub workcenters: Vec<Workcenter>,
    /// Employees working at the site.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Shift supervisor assignments.
    #[serde(default)]
    pub shift_supervisors: Vec<EmployeeShiftSupervisor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings: EngineSettings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.breakdown_interval(), Duration::hours(1));
        assert_eq!(settings.orphan_start_padding(), Duration::minutes(30));
        assert_eq!(settings.orphan_search_padding(), Duration::hours(12));
        assert_eq!(settings.max_orphan_shift(), Duration::hours(24));
        assert_eq!(settings.rework_transaction_type, "LOAD");
    }

    #[test]
    fn test_site_reference_deserialization() {
        let yaml = r#"
site_code: LT01
business_unit: ltl
utc_offset_minutes: -300
labor_rates:
  - transaction_type_code: LOAD
    units_per_hour: "60"
transaction_types:
  - code: LOAD
    measured: true
"#;

        let site: SiteReference = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(site.site_code, "LT01");
        assert_eq!(site.business_unit, BusinessUnit::Ltl);
        assert_eq!(site.utc_offset_minutes, -300);
        assert_eq!(site.labor_rates.len(), 1);
        assert!(site.employees.is_empty());
    }
}
