//! Site-level orchestration.
//!
//! The [`LiveEfficiencyEngine`] recomputes efficiency for the employees a
//! request names, site by site. Sites run in parallel on the rayon pool;
//! work for one site is serialized through [`SiteLocks`] so two requests for
//! the same site never interleave their reads with their writes to a sink.

mod site_locks;

pub use site_locks::SiteLocks;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, NaiveDateTime};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{compute_efficiency, floor_to_step, latest_transaction_date};
use crate::config::EngineSettings;
use crate::error::EngineResult;
use crate::models::{EfficiencyRecord, LaborRate, Shift, TimeRange};
use crate::providers::{EngineSources, RecordSink, ShiftProvider};

/// What to recompute.
///
/// Both maps are keyed by site code. A site named in either map is
/// computed; a site with no codes in either is skipped. Sites in
/// `whole_sites` are computed for every employee instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeRequest {
    /// The window whose records are wanted.
    pub window: TimeRange,
    /// Site employee codes to recompute, by site.
    #[serde(default)]
    pub site_employee_codes: BTreeMap<String, Vec<String>>,
    /// Time-and-attendance codes to recompute, by site.
    #[serde(default)]
    pub tna_employee_codes: BTreeMap<String, Vec<String>>,
    /// Sites to recompute for every employee with activity.
    #[serde(default)]
    pub whole_sites: Vec<String>,
}

impl ComputeRequest {
    /// Creates a request for `window` with no codes.
    pub fn new(window: TimeRange) -> Self {
        Self {
            window,
            site_employee_codes: BTreeMap::new(),
            tna_employee_codes: BTreeMap::new(),
            whole_sites: Vec::new(),
        }
    }

    /// Returns the sites with at least one code, sorted.
    pub fn site_codes(&self) -> Vec<String> {
        let mut sites: Vec<String> = self
            .site_employee_codes
            .keys()
            .chain(self.tna_employee_codes.keys())
            .filter(|site| !self.codes_for(&self.site_employee_codes, site).is_empty()
                || !self.codes_for(&self.tna_employee_codes, site).is_empty())
            .chain(self.whole_sites.iter())
            .cloned()
            .collect();
        sites.sort();
        sites.dedup();
        sites
    }

    /// Returns true if `site_code` is recomputed for every employee.
    pub fn is_whole_site(&self, site_code: &str) -> bool {
        self.whole_sites.iter().any(|site| site == site_code)
    }

    fn codes_for<'a>(&self, map: &'a BTreeMap<String, Vec<String>>, site_code: &str) -> &'a [String] {
        map.get(site_code).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The result of recomputing one site.
#[derive(Debug)]
pub struct SiteOutcome {
    /// The site code.
    pub site_code: String,
    /// Every record computed for the site, or the error that stopped it.
    pub result: EngineResult<Vec<EfficiencyRecord>>,
}

/// Recomputes efficiency records for a set of sites.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use efficiency_engine::config::ConfigLoader;
/// use efficiency_engine::models::TimeRange;
/// use efficiency_engine::orchestrator::{ComputeRequest, LiveEfficiencyEngine, SiteLocks};
/// use efficiency_engine::providers::{ActivityStore, EngineSources};
/// use chrono::NaiveDateTime;
///
/// let config = ConfigLoader::load("./config/default")?;
/// let sources = EngineSources::new(
///     Arc::new(ActivityStore::default()),
///     Arc::new(config.catalog().clone()),
/// );
/// let engine = LiveEfficiencyEngine::new(sources, config.settings().clone(), Arc::new(SiteLocks::new()));
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let mut request = ComputeRequest::new(TimeRange::new(at("2026-03-02 00:00:00"), at("2026-03-02 23:59:00"))?);
/// request.site_employee_codes.insert("DC01".to_string(), vec!["E100".to_string()]);
///
/// for outcome in engine.compute(&request) {
///     println!("{}: {:?}", outcome.site_code, outcome.result.map(|r| r.len()));
/// }
/// # Ok::<(), efficiency_engine::error::EngineError>(())
/// ```
#[derive(Clone)]
pub struct LiveEfficiencyEngine {
    sources: EngineSources,
    settings: EngineSettings,
    site_locks: Arc<SiteLocks>,
}

impl LiveEfficiencyEngine {
    /// Creates an engine over `sources`.
    ///
    /// `site_locks` should be shared by every engine that writes to the
    /// same sink.
    pub fn new(sources: EngineSources, settings: EngineSettings, site_locks: Arc<SiteLocks>) -> Self {
        Self {
            sources,
            settings,
            site_locks,
        }
    }

    /// Computes the records for every site in `request`.
    pub fn compute(&self, request: &ComputeRequest) -> Vec<SiteOutcome> {
        self.run(request, None)
    }

    /// Computes the records for every site in `request`, storing each batch in `sink`.
    ///
    /// Batches are stored while the site's lock is held.
    pub fn compute_and_execute(
        &self,
        request: &ComputeRequest,
        sink: &dyn RecordSink,
    ) -> Vec<SiteOutcome> {
        self.run(request, Some(sink))
    }

    fn run(&self, request: &ComputeRequest, sink: Option<&dyn RecordSink>) -> Vec<SiteOutcome> {
        request
            .site_codes()
            .par_iter()
            .map(|site_code| {
                let result = self
                    .site_locks
                    .with_lock(site_code, || self.compute_site(site_code, request, sink));

                if let Err(e) = &result {
                    warn!(site_code = %site_code, error = %e, "Efficiency computation failed");
                }

                SiteOutcome {
                    site_code: site_code.clone(),
                    result,
                }
            })
            .collect()
    }

    fn compute_site(
        &self,
        site_code: &str,
        request: &ComputeRequest,
        sink: Option<&dyn RecordSink>,
    ) -> EngineResult<Vec<EfficiencyRecord>> {
        let started = Instant::now();
        let window = request.window;
        let labor_rates = self.sources.labor_rates.labor_rates(site_code)?;
        let now = truncate_to_minute(self.sources.reference.site_now(site_code)?);
        let provider = ShiftProvider::new(&self.sources, self.settings.clone());

        let site_employee_codes = request.codes_for(&request.site_employee_codes, site_code);
        let tna_employee_codes = request.codes_for(&request.tna_employee_codes, site_code);

        let mut records = Vec::new();
        let mut shift_count = 0;

        if request.is_whole_site(site_code) {
            let shifts = provider.shifts_for_site(site_code, now, window.start, window.end)?;
            shift_count += shifts.len();
            records.extend(self.execute(site_code, &shifts, &labor_rates, &window, sink)?);
            return Ok(self.finish_site(site_code, now, shift_count, records, started));
        }

        if !site_employee_codes.is_empty() {
            let shifts = provider.shifts_for_site_employee_codes(
                site_code,
                now,
                site_employee_codes,
                window.start,
                window.end,
            )?;
            shift_count += shifts.len();
            records.extend(self.execute(site_code, &shifts, &labor_rates, &window, sink)?);
        }

        if !tna_employee_codes.is_empty() {
            let shifts = provider.shifts_for_tna_employee_codes(
                site_code,
                now,
                tna_employee_codes,
                window.start,
                window.end,
            )?;
            shift_count += shifts.len();
            records.extend(self.execute(site_code, &shifts, &labor_rates, &window, sink)?);
        }

        Ok(self.finish_site(site_code, now, shift_count, records, started))
    }

    fn finish_site(
        &self,
        site_code: &str,
        now: NaiveDateTime,
        shift_count: usize,
        records: Vec<EfficiencyRecord>,
        started: Instant,
    ) -> Vec<EfficiencyRecord> {
        info!(
            site_code = %site_code,
            site_now = %now,
            shifts = shift_count,
            records = records.len(),
            last_transaction = ?latest_transaction_date(&records),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Computed site efficiency"
        );
        records
    }

    /// Attributes one batch of shifts and hands the records to the sink.
    ///
    /// An empty batch is neither computed nor stored.
    fn execute(
        &self,
        site_code: &str,
        shifts: &[Shift],
        labor_rates: &[LaborRate],
        window: &TimeRange,
        sink: Option<&dyn RecordSink>,
    ) -> EngineResult<Vec<EfficiencyRecord>> {
        if shifts.is_empty() {
            return Ok(Vec::new());
        }

        let records = compute_efficiency(
            shifts,
            self.sources.transactions.as_ref(),
            labor_rates,
            window,
            &self.settings,
        )?;

        if let Some(sink) = sink {
            sink.store(site_code, window, &records)?;
        }

        Ok(records)
    }
}

/// Drops seconds and sub-second precision.
fn truncate_to_minute(instant: NaiveDateTime) -> NaiveDateTime {
    floor_to_step(instant, Duration::minutes(1))
}
