//! Reference data consumed by the engine.
//!
//! These types are supplied by the lookup layer: labor rates, the
//! transaction-type catalog, work centers, shift supervisors and the site's
//! business unit. Missing entries are never errors inside the engine; they
//! fall back to a zero target rate or an unmeasured transaction type.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// The business unit a site belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessUnit {
    /// Warehousing and distribution sites.
    #[default]
    SupplyChain,
    /// Less-than-truckload freight terminals.
    Ltl,
}

/// Classification of a work center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkcenterType {
    /// Work is measured against labor rates.
    #[default]
    Transactional,
    /// Work is not measured.
    NonTransactional,
    /// Work is tracked but not measured against targets.
    Monitored,
}

/// How an efficiency record should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// Time that does not count towards efficiency.
    NonTransactional,
    /// Time that is tracked but not measured.
    Monitored,
    /// Time measured against labor rates.
    Transactional,
}

/// Target rate for a transaction type.
///
/// # Example
///
/// ```
/// use efficiency_engine::models::LaborRate;
/// use rust_decimal::Decimal;
///
/// let rate = LaborRate {
///     transaction_type_code: "PICK".to_string(),
///     units_per_hour: Decimal::new(120, 0),
/// };
/// assert_eq!(rate.seconds_per_unit(), Decimal::new(30, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborRate {
    /// The transaction type this rate applies to.
    pub transaction_type_code: String,
    /// The target number of units per hour.
    pub units_per_hour: Decimal,
}

impl LaborRate {
    /// Returns the target seconds for a single unit, or zero for a non-positive rate.
    pub fn seconds_per_unit(&self) -> Decimal {
        if self.units_per_hour <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        Decimal::new(3600, 0) / self.units_per_hour
    }
}

/// Looks up the target seconds per unit for a transaction type.
///
/// The match is case-insensitive; unknown types have a zero target.
pub fn target_seconds_per_unit(labor_rates: &[LaborRate], transaction_type: Option<&str>) -> Decimal {
    let Some(transaction_type) = transaction_type else {
        return Decimal::ZERO;
    };
    labor_rates
        .iter()
        .find(|r| r.transaction_type_code.eq_ignore_ascii_case(transaction_type))
        .map(LaborRate::seconds_per_unit)
        .unwrap_or(Decimal::ZERO)
}

/// Rounds a decimal number of seconds to whole seconds, half to even.
///
/// Values beyond `i64` saturate.
pub(crate) fn round_seconds(seconds: Decimal) -> i64 {
    seconds.round().to_i64().unwrap_or(if seconds.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// An entry in a site's transaction-type catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTypeInfo {
    /// The transaction type code.
    pub code: String,
    /// Whether this type is measured against labor rates.
    pub measured: bool,
}

/// A work center at a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workcenter {
    /// The work center code.
    pub code: String,
    /// The display name.
    pub name: String,
    /// Whether time spent here counts as transactional.
    pub is_transactional: bool,
    /// The work center classification.
    #[serde(default)]
    pub workcenter_type: WorkcenterType,
}

/// The shift supervisor assigned to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeShiftSupervisor {
    /// The supervised employee's time-and-attendance code.
    pub tna_employee_code: String,
    /// The supervisor's full name.
    pub supervisor_full_name: String,
}
