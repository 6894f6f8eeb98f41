//! Core data models for the Efficiency Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod efficiency_record;
mod employee;
mod reference;
mod shift;
mod time_range;
mod time_sheet;
mod transaction;

pub use efficiency_record::{EfficiencyRecord, classify_record_type};
pub use employee::{DOCKWORKER_JOB_CODE, DRIVER_JOB_CODE, Employee, SiteEmployee};
pub(crate) use reference::round_seconds;
pub use reference::{
    BusinessUnit, EmployeeShiftSupervisor, LaborRate, RecordType, TransactionTypeInfo,
    Workcenter, WorkcenterType, target_seconds_per_unit,
};
pub use shift::{Shift, ShiftProfile};
pub use time_range::TimeRange;
pub use time_sheet::TimeSheetPunch;
pub(crate) use transaction::codes_match;
pub use transaction::{DEFAULT_REWORK_TRANSACTION_TYPE, MAX_TRANSACTION_SECONDS, Transaction};
