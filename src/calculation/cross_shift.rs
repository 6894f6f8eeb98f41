//! Cross-shift start and end of productivity.
//!
//! After every shift in a window has been attributed, this pass looks at
//! each employee's operational day as a whole. The records of the day's
//! clock-ins up to the first productive one report their time to first
//! transaction as start-of-day time, and the records of the day's last
//! clock-in report their time after last transaction as end-of-day time.
//! The same rule is applied again within each shift code.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::models::EfficiencyRecord;

/// Which pair of boundary fields a pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Day,
    Shift,
}

/// Sets the start and end shift times of `records` in place.
///
/// Only transactional records whose operational day falls within the dates
/// of `window_start` and `window_end` are considered. Records are grouped by
/// employee number (or site employee code when unmapped) and operational
/// day, and within that by the start of their clock-in.
///
/// # Example
///
/// ```
/// use efficiency_engine::calculation::aggregate_shift_boundaries;
/// use efficiency_engine::models::{BusinessUnit, EfficiencyRecord, Shift, ShiftProfile, TimeRange};
/// use chrono::{Duration, NaiveDateTime};
/// use rust_decimal::Decimal;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let profile = ShiftProfile::orphan(
///     "DC01", None, &["E100".to_string()], None, &[], BusinessUnit::SupplyChain,
/// );
/// let shift = Shift::new(at("2026-03-02 08:00:00"), at("2026-03-02 09:00:00"), at("2026-03-02 08:00:00").date(), profile);
/// let mut record = EfficiencyRecord::new(&shift, shift.range(), Some("PICK".to_string()));
/// record.quantity_processed = Decimal::new(4, 0);
/// record.shift_time_to_first_transaction = Duration::minutes(12);
///
/// let mut records = vec![record];
/// aggregate_shift_boundaries(&mut records, at("2026-03-02 00:00:00"), at("2026-03-02 23:59:00"));
/// assert_eq!(records[0].start_shift_time, Duration::minutes(12));
/// assert_eq!(records[0].start_shift_time_per_shift, Duration::minutes(12));
/// ```
pub fn aggregate_shift_boundaries(
    records: &mut [EfficiencyRecord],
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) {
    let first_day = window_start.date();
    let last_day = window_end.date();

    let mut days: Vec<((Option<String>, NaiveDate), Vec<usize>)> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if !record.is_transactional
            || record.operational_day < first_day
            || record.operational_day > last_day
        {
            continue;
        }

        let key = (
            record
                .employee_number
                .clone()
                .or_else(|| record.site_employee_code.clone()),
            record.operational_day,
        );
        match days.iter_mut().find(|(k, _)| *k == key) {
            Some((_, indices)) => indices.push(index),
            None => days.push((key, vec![index])),
        }
    }

    for (_, day) in &days {
        mark_boundaries(records, day, Scope::Day);

        let mut shifts: Vec<(Option<String>, Vec<usize>)> = Vec::new();
        for &index in day {
            let shift_code = records[index].shift_code.clone();
            match shifts.iter_mut().find(|(code, _)| *code == shift_code) {
                Some((_, indices)) => indices.push(index),
                None => shifts.push((shift_code, vec![index])),
            }
        }

        for (_, shift) in &shifts {
            mark_boundaries(records, shift, Scope::Shift);
        }
    }
}

fn mark_boundaries(records: &mut [EfficiencyRecord], indices: &[usize], scope: Scope) {
    let mut clock_ins: BTreeMap<NaiveDateTime, Vec<usize>> = BTreeMap::new();
    for &index in indices {
        clock_ins
            .entry(records[index].clock_in_start_time)
            .or_default()
            .push(index);
    }

    for group in clock_ins.values() {
        for &index in group {
            let record = &mut records[index];
            let start = record.shift_time_to_first_transaction;
            match scope {
                Scope::Day => record.start_shift_time = start,
                Scope::Shift => record.start_shift_time_per_shift = start,
            }
        }

        let processed: Decimal = group.iter().map(|&i| records[i].quantity_processed).sum();
        if processed > Decimal::ZERO {
            break;
        }
    }

    if let Some(group) = clock_ins.values().next_back() {
        for &index in group {
            let record = &mut records[index];
            let end = record.shift_time_after_last_transaction;
            match scope {
                Scope::Day => record.end_shift_time = end,
                Scope::Shift => record.end_shift_time_per_shift = end,
            }
        }
    }
}
