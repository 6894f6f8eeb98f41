//! Transaction scan model.
//!
//! A [`Transaction`] is one immutable work scan produced by the transaction
//! source. The engine only ever reads transactions.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The transaction type whose zero-earning scans count as rework.
pub const DEFAULT_REWORK_TRANSACTION_TYPE: &str = "LOAD";

/// The largest `seconds_earned` or `transition_seconds` a scan may carry.
pub const MAX_TRANSACTION_SECONDS: i64 = i32::MAX as i64;

/// Represents a single work-transaction scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for the transaction.
    #[serde(default)]
    pub transaction_id: i64,
    /// The ID of the employee's previous transaction, if known.
    #[serde(default)]
    pub previous_transaction_id: Option<i64>,
    /// The site the scan happened at.
    pub site_code: String,
    /// The site-local employee code that performed the scan.
    pub site_employee_code: String,
    /// The transaction type (e.g. "PICK", "LOAD").
    #[serde(default)]
    pub transaction_type_code: Option<String>,
    /// The segment of the site, when the site is split into segments.
    #[serde(default)]
    pub segment_code: Option<String>,
    /// The requested quantity.
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// The quantity that earned standard time.
    #[serde(default)]
    pub quantity_earned: Option<Decimal>,
    /// The quantity that was physically processed.
    #[serde(default)]
    pub quantity_processed: Option<Decimal>,
    /// The operational day the scan belongs to.
    pub operational_date: NaiveDate,
    /// When the scan happened.
    pub transaction_date: NaiveDateTime,
    /// Standard time credited for this scan.
    #[serde(default)]
    pub seconds_earned: i64,
    /// Seconds since the same employee's previous transaction.
    #[serde(default)]
    pub transition_seconds: i64,
    /// The type of the same employee's previous transaction.
    #[serde(default)]
    pub previous_transaction_type_code: Option<String>,
}

impl Transaction {
    /// Returns the first seconds field outside `0..=MAX_TRANSACTION_SECONDS`.
    pub fn out_of_range_seconds(&self) -> Option<(&'static str, i64)> {
        [
            ("seconds_earned", self.seconds_earned),
            ("transition_seconds", self.transition_seconds),
        ]
        .into_iter()
        .find(|(_, value)| !(0..=MAX_TRANSACTION_SECONDS).contains(value))
    }

    /// Returns true if the type changed since the employee's previous transaction.
    ///
    /// Transactions without a known previous type are never functional transitions.
    ///
    /// # Examples
    ///
    /// ```
    /// use efficiency_engine::models::Transaction;
    /// use chrono::NaiveDateTime;
    ///
    /// let at = NaiveDateTime::parse_from_str("2026-03-02 09:03:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let mut transaction = Transaction::new("DC01", "E100", "PICK", at);
    /// assert!(!transaction.is_functional_transition());
    ///
    /// transaction.previous_transaction_type_code = Some("VERIFY".to_string());
    /// assert!(transaction.is_functional_transition());
    /// ```
    pub fn is_functional_transition(&self) -> bool {
        match (
            non_blank(self.transaction_type_code.as_deref()),
            non_blank(self.previous_transaction_type_code.as_deref()),
        ) {
            (Some(current), Some(previous)) => current != previous,
            _ => false,
        }
    }

    /// Returns the processed quantity in excess of the earned quantity.
    ///
    /// Zero when either quantity is missing; never negative.
    pub fn duplicate_quantity(&self) -> Decimal {
        match (self.quantity_processed, self.quantity_earned) {
            (Some(processed), Some(earned)) => (processed - earned).max(Decimal::ZERO),
            _ => Decimal::ZERO,
        }
    }

    /// Returns true if this is a zero-earning scan of the rework transaction type.
    pub fn is_rework(&self, rework_type: &str) -> bool {
        codes_match(self.transaction_type_code.as_deref(), Some(rework_type))
            && self.quantity_earned == Some(Decimal::ZERO)
    }

    /// Creates a transaction with zeroed metrics, for tests and fixtures.
    pub fn new(
        site_code: &str,
        site_employee_code: &str,
        transaction_type_code: &str,
        transaction_date: NaiveDateTime,
    ) -> Self {
        Self {
            transaction_id: 0,
            previous_transaction_id: None,
            site_code: site_code.to_string(),
            site_employee_code: site_employee_code.to_string(),
            transaction_type_code: Some(transaction_type_code.to_string()),
            segment_code: None,
            quantity: None,
            quantity_earned: None,
            quantity_processed: None,
            operational_date: transaction_date.date(),
            transaction_date,
            seconds_earned: 0,
            transition_seconds: 0,
            previous_transaction_type_code: None,
        }
    }
}

/// Case-insensitive code comparison where two missing codes are equal.
pub(crate) fn codes_match(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
