//! Error types for the Efficiency Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while reconciling shifts and
//! attributing transactions to intervals.

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

/// The main error type for the Efficiency Engine.
///
/// All operations in the engine return this error type. Errors are local to
/// the site or employee being computed and are always surfaced to the caller.
///
/// # Example
///
/// ```
/// use efficiency_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An interval step was zero or negative.
    #[error("Interval step of {}s is not valid", .step.num_seconds())]
    InvalidStep {
        /// The rejected step.
        step: Duration,
    },

    /// A time range ended before it started.
    #[error("Invalid time range: {start} is after {end}")]
    InvalidRange {
        /// The start of the rejected range.
        start: NaiveDateTime,
        /// The end of the rejected range.
        end: NaiveDateTime,
    },

    /// A stream was not supplied in the required chronological order.
    #[error("{stream} must be ordered: {message}")]
    OrderingViolation {
        /// The stream that was out of order (e.g. "transactions").
        stream: String,
        /// A description of the offending pair.
        message: String,
    },

    /// A time sheet punched out before it punched in.
    #[error("Invalid time sheet {time_sheet_id}: punch in {punch_in} is after punch out {punch_out}")]
    InvalidTimeSheet {
        /// The ID of the invalid time sheet.
        time_sheet_id: i64,
        /// The punch-in time.
        punch_in: NaiveDateTime,
        /// The punch-out time.
        punch_out: NaiveDateTime,
    },

    /// A transaction carried a value the engine cannot attribute.
    #[error("Invalid transaction for '{site_employee_code}' at {transaction_date}: {message}")]
    InvalidTransaction {
        /// The site employee code on the transaction.
        site_employee_code: String,
        /// When the transaction happened.
        transaction_date: NaiveDateTime,
        /// A description of the rejected value.
        message: String,
    },

    /// The lookup layer has no reference data for a site.
    #[error("No {kind} reference data for site '{site_code}'")]
    ReferenceDataMissing {
        /// The site code that was looked up.
        site_code: String,
        /// The kind of reference data (e.g. "employees", "labor rates").
        kind: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
