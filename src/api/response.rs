//! Response types for the Efficiency Engine API.
//!
//! This module defines the success and error response structures and the
//! mapping from engine errors to HTTP statuses.

use std::collections::HashSet;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{EfficiencyRecord, MAX_TRANSACTION_SECONDS};

/// Response body for a successful `/efficiency/compute` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeEfficiencyResponse {
    /// Every computed record, each once.
    pub records: Vec<RecordResponse>,
    /// The number of records per computed site.
    pub sites: Vec<SiteSummary>,
}

/// A computed record together with its hash key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    /// The record's hash key.
    pub hash_key: String,
    /// The record.
    #[serde(flatten)]
    pub record: EfficiencyRecord,
}

/// Per-site summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSummary {
    /// The site code.
    pub site_code: String,
    /// The number of records returned for the site.
    pub record_count: usize,
}

impl ComputeEfficiencyResponse {
    /// Builds a response from per-site record batches.
    ///
    /// A shift reached through both a site employee code and a
    /// time-and-attendance code is computed twice, so records are kept
    /// once per hash key, first occurrence wins.
    pub fn from_sites(sites: Vec<(String, Vec<EfficiencyRecord>)>) -> Self {
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let mut summaries = Vec::with_capacity(sites.len());

        for (site_code, batch) in sites {
            let mut record_count = 0;
            for record in batch {
                let hash_key = record.hash_key();
                if seen.insert(hash_key.clone()) {
                    record_count += 1;
                    records.push(RecordResponse { hash_key, record });
                }
            }
            summaries.push(SiteSummary {
                site_code,
                record_count,
            });
        }

        Self {
            records,
            sites: summaries,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an internal error response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            EngineError::InvalidStep { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_STEP",
                    message,
                    "Interval steps must be positive",
                ),
            },
            EngineError::InvalidRange { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_RANGE",
                    message,
                    "The window must not end before it starts",
                ),
            },
            EngineError::OrderingViolation { stream, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "ORDERING_VIOLATION",
                    message,
                    format!("Supply {} in chronological order", stream),
                ),
            },
            EngineError::InvalidTimeSheet { time_sheet_id, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_TIME_SHEET",
                    message,
                    format!("Time sheet {} punches out before it punches in", time_sheet_id),
                ),
            },
            EngineError::InvalidTransaction { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_TRANSACTION",
                    message,
                    format!(
                        "seconds_earned and transition_seconds must be between 0 and {}",
                        MAX_TRANSACTION_SECONDS
                    ),
                ),
            },
            EngineError::ReferenceDataMissing { site_code, .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "REFERENCE_DATA_MISSING",
                    message,
                    format!("Site '{}' is not configured", site_code),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessUnit, Shift, ShiftProfile};
    use chrono::{Duration, NaiveDateTime};

    fn make_datetime(time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2026-03-02 {}", time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn create_record(start: &str) -> EfficiencyRecord {
        let profile = ShiftProfile::orphan(
            "DC01",
            None,
            &["E100".to_string()],
            None,
            &[],
            BusinessUnit::SupplyChain,
        );
        let start = make_datetime(start);
        let shift = Shift::new(start, start + Duration::hours(1), start.date(), profile);
        EfficiencyRecord::new(&shift, shift.range(), None)
    }

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_ordering_violation_is_bad_request() {
        let api_error: ApiErrorResponse = EngineError::OrderingViolation {
            stream: "transactions".to_string(),
            message: "out of order".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "ORDERING_VIOLATION");
        assert_eq!(
            api_error.error.details.as_deref(),
            Some("Supply transactions in chronological order")
        );
    }

    #[test]
    fn test_invalid_step_is_bad_request() {
        let api_error: ApiErrorResponse = EngineError::InvalidStep {
            step: Duration::zero(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "INVALID_STEP");
    }

    #[test]
    fn test_invalid_transaction_is_bad_request() {
        let api_error: ApiErrorResponse = EngineError::InvalidTransaction {
            site_employee_code: "E100".to_string(),
            transaction_date: make_datetime("09:03:00"),
            message: "seconds_earned -5 is out of range".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "INVALID_TRANSACTION");
    }

    #[test]
    fn test_reference_data_missing_is_server_error() {
        let api_error: ApiErrorResponse = EngineError::ReferenceDataMissing {
            site_code: "ZZ99".to_string(),
            kind: "site".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "REFERENCE_DATA_MISSING");
        assert!(api_error.error.message.contains("ZZ99"));
    }

    #[test]
    fn test_config_errors_are_server_errors() {
        let api_error: ApiErrorResponse = EngineError::ConfigNotFound {
            path: "/missing".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "CONFIG_ERROR");
    }

    #[test]
    fn test_duplicate_records_are_returned_once() {
        let response = ComputeEfficiencyResponse::from_sites(vec![(
            "DC01".to_string(),
            vec![create_record("08:00:00"), create_record("08:00:00"), create_record("09:00:00")],
        )]);

        assert_eq!(response.records.len(), 2);
        assert_eq!(response.sites[0].record_count, 2);
        assert_ne!(response.records[0].hash_key, response.records[1].hash_key);
    }

    #[test]
    fn test_record_response_flattens_record() {
        let response = ComputeEfficiencyResponse::from_sites(vec![(
            "DC01".to_string(),
            vec![create_record("08:00:00")],
        )]);
        let json = serde_json::to_value(&response).unwrap();

        let record = &json["records"][0];
        assert_eq!(record["hash_key"], response.records[0].hash_key.as_str());
        assert_eq!(record["site_code"], "DC01");
        assert_eq!(json["sites"][0]["site_code"], "DC01");
    }
}
