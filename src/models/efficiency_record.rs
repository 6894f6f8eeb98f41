//! Efficiency record model.
//!
//! An [`EfficiencyRecord`] describes how one shift's time inside one
//! sub-interval was used for one transaction-type grouping. Records are
//! created by interval attribution, completed by the shift-level backfill and
//! the cross-shift pass, and never mutated after that.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::employee::{DOCKWORKER_JOB_CODE, DRIVER_JOB_CODE};
use super::reference::{BusinessUnit, RecordType, WorkcenterType};
use super::shift::{Shift, ShiftProfile};
use super::time_range::{TimeRange, duration_seconds};

/// One row of efficiency output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyRecord {
    /// The site the time was worked at.
    pub site_code: String,
    /// The site segment, or the site code for unsegmented sites.
    pub segment_code: String,
    /// The first of the shift's site employee codes, sorted.
    pub site_employee_code: Option<String>,
    /// The grouping's transaction type; placeholders have none.
    pub transaction_type_code: Option<String>,
    /// The start of the shift.
    pub clock_in_start_time: NaiveDateTime,
    /// The end of the shift.
    pub clock_in_end_time: NaiveDateTime,
    /// The start of the sub-interval.
    pub interval_start_time: NaiveDateTime,
    /// The exclusive end of the sub-interval.
    pub interval_end_time: NaiveDateTime,
    /// The operational day of the shift.
    pub operational_day: NaiveDate,
    /// Units physically processed.
    pub quantity_processed: Decimal,
    /// Units that earned standard time.
    pub quantity_earned: Decimal,
    /// Processed units in excess of earned units on rework scans.
    pub duplicate_transaction_count: Decimal,
    /// The worked work center.
    pub work_center_code: Option<String>,
    /// The scheduled shift code.
    pub shift_code: Option<String>,
    /// The employee's full name.
    pub employee_full_name: Option<String>,
    /// The employee number.
    pub employee_number: Option<String>,
    /// The shift supervisor.
    pub shift_supervisor: Option<String>,
    /// The line supervisor.
    pub supervisor: Option<String>,
    /// The reported job code.
    pub employee_job_code: Option<String>,
    /// Whether the employee is still clocked in.
    pub is_clocked_in: bool,
    /// Whether the shift is measured.
    pub is_transactional: bool,
    /// The salary class code.
    pub salary_class_code: Option<String>,
    /// Whether the employee works part time.
    pub is_part_time_employee: bool,
    /// Whether the employee is measured regardless of work center.
    pub is_employee_transactional: bool,
    /// The worked work center's classification.
    pub workcenter_type: WorkcenterType,
    /// Standard time earned.
    #[serde(with = "duration_seconds")]
    pub time_earned: Duration,
    /// Time spent switching between transaction types.
    #[serde(with = "duration_seconds")]
    pub functional_transition_time: Duration,
    /// Time from the interval start to its first transaction.
    #[serde(with = "duration_seconds")]
    pub interval_start_to_first_transaction: Duration,
    /// Time from the interval's last transaction to the interval end.
    #[serde(with = "duration_seconds")]
    pub last_transaction_to_interval_end: Duration,
    /// Time between transactions, excluding functional transitions.
    #[serde(with = "duration_seconds")]
    pub transition_time: Duration,
    /// Transition time in excess of the earned time.
    #[serde(with = "duration_seconds")]
    pub time_over_target: Duration,
    /// The longest gap before a single transaction.
    #[serde(with = "duration_seconds")]
    pub max_transaction_interval: Duration,
    /// Time from the shift start to its first transaction.
    #[serde(with = "duration_seconds")]
    pub shift_time_to_first_transaction: Duration,
    /// Start-of-day time for the first productive shift of the operational day.
    #[serde(with = "duration_seconds")]
    pub start_shift_time: Duration,
    /// Start-of-shift time for the first productive shift of the shift code.
    #[serde(with = "duration_seconds")]
    pub start_shift_time_per_shift: Duration,
    /// Time from the shift's last transaction to its end.
    #[serde(with = "duration_seconds")]
    pub shift_time_after_last_transaction: Duration,
    /// End-of-day time for the last shift of the operational day.
    #[serde(with = "duration_seconds")]
    pub end_shift_time: Duration,
    /// End-of-shift time for the last shift of the shift code.
    #[serde(with = "duration_seconds")]
    pub end_shift_time_per_shift: Duration,
    /// Target time spent on zero-earning rework scans.
    #[serde(with = "duration_seconds")]
    pub time_lost_to_rework: Duration,
    /// Time clocked in attributed to this record.
    #[serde(with = "duration_seconds")]
    pub time_clocked_in: Duration,
    /// Transition time within target.
    #[serde(with = "duration_seconds")]
    pub time_on_task: Duration,
    /// The shift's last transaction, if it had any.
    pub last_transaction_date: Option<NaiveDateTime>,
    /// Whether the shift was clocked in without any productive work.
    pub is_non_productive_clock_in: bool,
    /// How the record is reported.
    pub record_type: RecordType,
}

impl EfficiencyRecord {
    /// Creates an empty record for `shift` over `interval`.
    ///
    /// LTL sites report every job code other than `DRIVER` as `DOCKWORKER`.
    pub fn new(shift: &Shift, interval: TimeRange, transaction_type_code: Option<String>) -> Self {
        let profile = &shift.profile;
        let record_type = classify_record_type(profile, transaction_type_code.as_deref());
        let employee_job_code = match profile.business_unit {
            BusinessUnit::Ltl if profile.employee_job_code.as_deref() != Some(DRIVER_JOB_CODE) => {
                Some(DOCKWORKER_JOB_CODE.to_string())
            }
            _ => profile.employee_job_code.clone(),
        };

        Self {
            site_code: profile.site_code.clone(),
            segment_code: profile.site_code.clone(),
            site_employee_code: profile.site_employee_codes.iter().min().cloned(),
            transaction_type_code,
            clock_in_start_time: shift.start_time,
            clock_in_end_time: shift.end_time,
            interval_start_time: interval.start,
            interval_end_time: interval.end,
            operational_day: shift.operational_date,
            quantity_processed: Decimal::ZERO,
            quantity_earned: Decimal::ZERO,
            duplicate_transaction_count: Decimal::ZERO,
            work_center_code: profile.work_center_code.clone(),
            shift_code: profile.shift_code.clone(),
            employee_full_name: profile.employee_full_name.clone(),
            employee_number: profile.employee_number.clone(),
            shift_supervisor: profile.shift_supervisor.clone(),
            supervisor: profile.supervisor.clone(),
            employee_job_code,
            is_clocked_in: profile.is_clocked_in,
            is_transactional: profile.is_transactional,
            salary_class_code: profile.salary_class_code.clone(),
            is_part_time_employee: profile.is_part_time_employee,
            is_employee_transactional: profile.is_employee_transactional,
            workcenter_type: profile.workcenter_type,
            time_earned: Duration::zero(),
            functional_transition_time: Duration::zero(),
            interval_start_to_first_transaction: Duration::zero(),
            last_transaction_to_interval_end: Duration::zero(),
            transition_time: Duration::zero(),
            time_over_target: Duration::zero(),
            max_transaction_interval: Duration::zero(),
            shift_time_to_first_transaction: Duration::zero(),
            start_shift_time: Duration::zero(),
            start_shift_time_per_shift: Duration::zero(),
            shift_time_after_last_transaction: Duration::zero(),
            end_shift_time: Duration::zero(),
            end_shift_time_per_shift: Duration::zero(),
            time_lost_to_rework: Duration::zero(),
            time_clocked_in: Duration::zero(),
            time_on_task: Duration::zero(),
            last_transaction_date: None,
            is_non_productive_clock_in: false,
            record_type,
        }
    }

    /// Returns the sub-interval as a range.
    pub fn interval(&self) -> TimeRange {
        TimeRange {
            start: self.interval_start_time,
            end: self.interval_end_time,
        }
    }

    /// Returns the longest idle stretch in the record.
    pub fn max_interval(&self) -> Duration {
        self.max_transaction_interval
            .max(self.interval_start_to_first_transaction)
            .max(self.last_transaction_to_interval_end)
    }

    /// Returns the time clocked in when both the work center and the employee are measured.
    pub fn time_clocked_in_in_transactional_work_center(&self) -> Duration {
        if self.workcenter_type == WorkcenterType::Transactional && self.is_employee_transactional {
            self.time_clocked_in
        } else {
            Duration::zero()
        }
    }

    /// Returns a SHA-256 digest of the persisted fields, upper-case hex encoded.
    ///
    /// Two computations over the same input produce the same key, so
    /// consumers can skip rewriting unchanged records.
    pub fn hash_key(&self) -> String {
        let fields = [
            self.site_code.clone(),
            self.segment_code.clone(),
            optional(&self.site_employee_code),
            optional(&self.transaction_type_code),
            self.clock_in_start_time.to_string(),
            self.clock_in_end_time.to_string(),
            self.interval_start_time.to_string(),
            self.interval_end_time.to_string(),
            optional(&self.work_center_code),
            optional(&self.shift_code),
            self.quantity_processed.normalize().to_string(),
            self.quantity_earned.normalize().to_string(),
            self.time_clocked_in.num_seconds().to_string(),
            self.time_earned.num_seconds().to_string(),
            self.max_transaction_interval.num_seconds().to_string(),
            self.operational_day.to_string(),
            self.is_transactional.to_string(),
            self.shift_time_to_first_transaction.num_seconds().to_string(),
            self.shift_time_after_last_transaction.num_seconds().to_string(),
            self.time_lost_to_rework.num_seconds().to_string(),
            self.duplicate_transaction_count.normalize().to_string(),
            self.start_shift_time.num_seconds().to_string(),
            self.start_shift_time_per_shift.num_seconds().to_string(),
            self.end_shift_time.num_seconds().to_string(),
            self.end_shift_time_per_shift.num_seconds().to_string(),
            format!("{:?}", self.record_type),
            self.is_clocked_in.to_string(),
            self.is_non_productive_clock_in.to_string(),
        ];

        let mut hasher = Sha256::new();
        hasher.update(fields.join("|").as_bytes());
        hex::encode_upper(hasher.finalize())
    }
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Decides how a record for `transaction_type_code` on a shift is reported.
///
/// A blank type counts as measured. A type missing from the catalog counts
/// as not measured.
pub fn classify_record_type(profile: &ShiftProfile, transaction_type_code: Option<&str>) -> RecordType {
    let measured = match transaction_type_code.filter(|t| !t.trim().is_empty()) {
        None => true,
        Some(code) => profile
            .transaction_types
            .iter()
            .find(|t| t.code.eq_ignore_ascii_case(code))
            .is_some_and(|t| t.measured),
    };

    if profile.is_orphan() && profile.business_unit == BusinessUnit::Ltl {
        return RecordType::NonTransactional;
    }
    if !profile.is_employee_transactional {
        return RecordType::NonTransactional;
    }
    match profile.workcenter_type {
        WorkcenterType::NonTransactional => RecordType::NonTransactional,
        WorkcenterType::Monitored => RecordType::Monitored,
        WorkcenterType::Transactional if !measured => RecordType::Monitored,
        WorkcenterType::Transactional => RecordType::Transactional,
    }
}
