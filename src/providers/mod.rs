//! Data sources and sinks the engine depends on.
//!
//! The engine never stores or fetches anything itself. Transactions, time
//! sheets and reference data arrive through these traits, and computed
//! records leave through [`RecordSink`]. Every method is synchronous and
//! every implementation must be shareable across the threads the
//! orchestrator fans sites out on.
//!
//! A lookup with no data for a site fails with
//! [`EngineError::ReferenceDataMissing`](crate::error::EngineError::ReferenceDataMissing)
//! rather than returning an empty set, so integration problems surface
//! instead of producing silently wrong numbers.

mod memory;
mod shift_provider;

pub use memory::{ActivityStore, MemorySink};
pub use shift_provider::ShiftProvider;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::EngineResult;
use crate::models::{
    BusinessUnit, EfficiencyRecord, Employee, EmployeeShiftSupervisor, LaborRate, TimeRange,
    TimeSheetPunch, Transaction, TransactionTypeInfo, Workcenter,
};

/// Supplies transaction scans.
pub trait TransactionSource: Send + Sync {
    /// Returns the transactions for `site_employee_codes` with `start <= date <= end`,
    /// ordered by transaction time.
    fn find_transactions(
        &self,
        site_code: &str,
        site_employee_codes: &[String],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> EngineResult<Vec<Transaction>>;

    /// Returns every site employee code with transactions at the site.
    fn site_employee_codes(&self, site_code: &str) -> EngineResult<Vec<String>>;
}

/// Supplies time sheet punches.
pub trait TimeSheetSource: Send + Sync {
    /// Returns the punches whose operational date is in `[start_date, end_date]`,
    /// ordered by punch-in.
    fn time_sheets(
        &self,
        site_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Vec<TimeSheetPunch>>;
}

/// Supplies target labor rates.
pub trait LaborRateSource: Send + Sync {
    /// Returns the site's labor rates.
    fn labor_rates(&self, site_code: &str) -> EngineResult<Vec<LaborRate>>;
}

/// Supplies the employees known at a site.
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the site's employees.
    fn employees(&self, site_code: &str) -> EngineResult<Vec<Employee>>;
}

/// Supplies site reference data.
pub trait ReferenceLookup: Send + Sync {
    /// Returns the site's business unit.
    fn business_unit(&self, site_code: &str) -> EngineResult<BusinessUnit>;

    /// Returns the site's transaction-type catalog.
    fn transaction_types(&self, site_code: &str) -> EngineResult<Vec<TransactionTypeInfo>>;

    /// Returns the site's work centers.
    fn workcenters(&self, site_code: &str) -> EngineResult<Vec<Workcenter>>;

    /// Returns the site's shift supervisor assignments.
    fn shift_supervisors(&self, site_code: &str) -> EngineResult<Vec<EmployeeShiftSupervisor>>;

    /// Returns the current site-local wall-clock time.
    fn site_now(&self, site_code: &str) -> EngineResult<NaiveDateTime>;
}

/// Receives computed records.
pub trait RecordSink: Send + Sync {
    /// Stores the records computed for a site over `window`.
    fn store(
        &self,
        site_code: &str,
        window: &TimeRange,
        records: &[EfficiencyRecord],
    ) -> EngineResult<()>;
}

/// The full set of sources the engine reads from.
#[derive(Clone)]
pub struct EngineSources {
    /// Transaction scans.
    pub transactions: Arc<dyn TransactionSource>,
    /// Time sheet punches.
    pub time_sheets: Arc<dyn TimeSheetSource>,
    /// Target labor rates.
    pub labor_rates: Arc<dyn LaborRateSource>,
    /// Employees by site.
    pub employees: Arc<dyn EmployeeDirectory>,
    /// Remaining reference data and the site clock.
    pub reference: Arc<dyn ReferenceLookup>,
}

impl EngineSources {
    /// Builds the sources from one activity source and one reference source.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use efficiency_engine::config::ReferenceCatalog;
    /// use efficiency_engine::providers::{ActivityStore, EngineSources};
    ///
    /// let sources = EngineSources::new(
    ///     Arc::new(ActivityStore::default()),
    ///     Arc::new(ReferenceCatalog::default()),
    /// );
    /// assert!(sources.employees.employees("DC01").is_err());
    /// ```
    pub fn new<A, R>(activity: Arc<A>, reference: Arc<R>) -> Self
    where
        A: TransactionSource + TimeSheetSource + 'static,
        R: LaborRateSource + EmployeeDirectory + ReferenceLookup + 'static,
    {
        Self {
            transactions: activity.clone(),
            time_sheets: activity,
            labor_rates: reference.clone(),
            employees: reference.clone(),
            reference,
        }
    }
}
