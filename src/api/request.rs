//! Request types for the Efficiency Engine API.
//!
//! This module defines the JSON request structure for the
//! `/efficiency/compute` endpoint.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{TimeRange, TimeSheetPunch, Transaction};
use crate::orchestrator::ComputeRequest;

/// Request body for the `/efficiency/compute` endpoint.
///
/// Carries the window to compute and the batch of activity to compute it
/// over. Every site named by a transaction or time sheet is computed, for
/// the employees the batch names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeEfficiencyRequest {
    /// The window whose records are wanted.
    pub window: WindowRequest,
    /// Site-local time to compute as of. Defaults to each site's current time.
    #[serde(default)]
    pub as_of: Option<NaiveDateTime>,
    /// Transaction scans, ordered by transaction time.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Time sheet punches, ordered by punch-in.
    #[serde(default)]
    pub time_sheets: Vec<TimeSheetPunch>,
    /// Sites to recompute for every employee in the batch.
    #[serde(default)]
    pub whole_sites: Vec<String>,
}

/// The window in a compute request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowRequest {
    /// Start of the window.
    pub start: NaiveDateTime,
    /// End of the window.
    pub end: NaiveDateTime,
}

impl ComputeEfficiencyRequest {
    /// Builds the orchestrator request for this batch.
    ///
    /// Site employee codes are taken from the transactions and
    /// time-and-attendance codes from the time sheets, grouped by
    /// upper-cased site code. Whole sites are upper-cased as well.
    pub fn compute_request(&self) -> EngineResult<ComputeRequest> {
        let window = TimeRange::new(self.window.start, self.window.end)?;
        let mut request = ComputeRequest::new(window);

        for transaction in &self.transactions {
            push_code(
                &mut request.site_employee_codes,
                &transaction.site_code,
                &transaction.site_employee_code,
            );
        }
        for punch in &self.time_sheets {
            push_code(
                &mut request.tna_employee_codes,
                &punch.site_code,
                &punch.employee_code,
            );
        }

        for site in &self.whole_sites {
            let site = site.to_ascii_uppercase();
            if !site.trim().is_empty() && !request.whole_sites.contains(&site) {
                request.whole_sites.push(site);
            }
        }

        Ok(request)
    }
}

fn push_code(codes: &mut BTreeMap<String, Vec<String>>, site_code: &str, code: &str) {
    if code.trim().is_empty() {
        return;
    }
    let site = codes.entry(site_code.to_ascii_uppercase()).or_default();
    if !site.iter().any(|c| c.eq_ignore_ascii_case(code)) {
        site.push(code.to_string());
    }
}
