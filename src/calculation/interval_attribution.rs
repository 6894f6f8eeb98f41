//! Interval attribution.
//!
//! A shift is sliced into sub-intervals aligned to the breakdown step. Each
//! sub-interval's transactions are grouped by segment and transaction type,
//! and every group becomes one [`EfficiencyRecord`] carrying earned,
//! transition, rework and idle time. Once every interval of the shift is
//! built, the time before the shift's first transaction and after its last
//! one is backfilled onto the records at the shift's edges.
//!
//! # Example
//!
//! ```
//! use efficiency_engine::calculation::attribute_shift;
//! use efficiency_engine::config::EngineSettings;
//! use efficiency_engine::models::{BusinessUnit, Shift, ShiftProfile};
//! use efficiency_engine::providers::ActivityStore;
//! use chrono::{Duration, NaiveDateTime};
//!
//! let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
//! let profile = ShiftProfile::orphan(
//!     "DC01", None, &["E100".to_string()], None, &[], BusinessUnit::SupplyChain,
//! );
//! let shift = Shift::new(
//!     at("2026-03-02 08:00:00"),
//!     at("2026-03-02 10:00:00"),
//!     at("2026-03-02 08:00:00").date(),
//!     profile,
//! );
//!
//! let store = ActivityStore::default();
//! let records = attribute_shift(&shift, &store, &[], &EngineSettings::default()).unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert!(records.iter().all(|r| r.time_clocked_in == Duration::hours(1)));
//! assert!(records.iter().all(|r| r.is_non_productive_clock_in));
//! ```

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::EngineSettings;
use crate::error::EngineResult;
use crate::models::{
    EfficiencyRecord, LaborRate, Shift, TimeRange, Transaction, classify_record_type,
    codes_match, round_seconds, target_seconds_per_unit,
};
use crate::providers::TransactionSource;

use super::cross_shift::aggregate_shift_boundaries;
use super::interval_sequencer::{Direction, IntervalSequence};
use super::shift_reconciler::validate_transactions;

/// Attributes one shift's transactions to its sub-intervals.
///
/// Transactions are fetched per sub-interval over `[start, end - 1ms]`, so a
/// transaction on a boundary belongs to the later interval only. The first
/// transaction of the shift has its transition time ignored; the time
/// before it is reported as time to first transaction instead.
///
/// # Errors
///
/// Returns [`EngineError::InvalidStep`](crate::error::EngineError::InvalidStep)
/// for a non-positive breakdown interval,
/// [`EngineError::OrderingViolation`](crate::error::EngineError::OrderingViolation)
/// when the source returns transactions out of order,
/// [`EngineError::InvalidTransaction`](crate::error::EngineError::InvalidTransaction)
/// for seconds out of range, and any error raised by the source.
pub fn attribute_shift(
    shift: &Shift,
    source: &dyn TransactionSource,
    labor_rates: &[LaborRate],
    settings: &EngineSettings,
) -> EngineResult<Vec<EfficiencyRecord>> {
    let bounds = shift.range();
    let intervals = IntervalSequence::new(
        bounds.start,
        bounds.end,
        settings.breakdown_interval(),
        true,
        Direction::Ascending,
    )?;

    let mut first: Option<Transaction> = None;
    let mut last: Option<Transaction> = None;
    let mut records = Vec::new();

    for interval in &intervals {
        let mut transactions = source.find_transactions(
            &shift.profile.site_code,
            &shift.profile.site_employee_codes,
            interval.start,
            interval.end - Duration::milliseconds(1),
        )?;
        validate_transactions(&transactions)?;

        if let Some(head) = transactions.first_mut() {
            if first.is_none() {
                head.transition_seconds = 0;
                first = Some(head.clone());
            }
        }
        if let Some(tail) = transactions.last() {
            last = Some(tail.clone());
        }

        records.extend(attribute_interval(
            shift,
            interval,
            &transactions,
            labor_rates,
            &settings.rework_transaction_type,
        ));
    }

    backfill_shift_edges(&mut records, shift, first.as_ref(), last.as_ref());

    let last_transaction_date = last.as_ref().map(|t| t.transaction_date);
    let records: Vec<EfficiencyRecord> = records
        .into_iter()
        .filter(|r| r.transaction_type_code.is_some() || !r.time_clocked_in.is_zero())
        .map(|mut record| {
            record.last_transaction_date = last_transaction_date;
            record.record_type =
                classify_record_type(&shift.profile, record.transaction_type_code.as_deref());
            record
        })
        .collect();

    debug!(
        site_code = %shift.profile.site_code,
        employee_number = ?shift.profile.employee_number,
        start = %shift.start_time,
        end = %shift.end_time,
        records = records.len(),
        "Attributed shift"
    );

    Ok(records)
}

/// Builds the records for one sub-interval.
///
/// An interval with no transactions yields a single placeholder with no
/// transaction type. Otherwise there is one record per upper-cased
/// `(segment or site, transaction type)` group, in the order each group is
/// first seen. Earned, transition, over-target, functional transition and
/// on-task time are only reported on transactional shifts.
pub fn attribute_interval(
    shift: &Shift,
    interval: TimeRange,
    transactions: &[Transaction],
    labor_rates: &[LaborRate],
    rework_transaction_type: &str,
) -> Vec<EfficiencyRecord> {
    let (Some(first), Some(last)) = (transactions.first(), transactions.last()) else {
        return vec![EfficiencyRecord::new(shift, interval, None)];
    };

    group_transactions(transactions)
        .into_iter()
        .map(|(key, items)| {
            let mut record = EfficiencyRecord::new(shift, interval, key.transaction_type_code.clone());
            record.segment_code = key.segment_code;

            let totals = GroupTotals::accumulate(
                &items,
                target_seconds_per_unit(labor_rates, key.transaction_type_code.as_deref()),
                rework_transaction_type,
            );

            if shift.profile.is_transactional {
                record.time_earned = whole_seconds(totals.seconds_earned);
                record.transition_time = whole_seconds(totals.transition_seconds);
                record.time_over_target = whole_seconds(totals.seconds_over_target);
                record.functional_transition_time =
                    whole_seconds(totals.functional_transition_seconds);
                record.time_on_task =
                    whole_seconds(totals.transition_seconds - totals.seconds_over_target);
            }

            let group_type = key.transaction_type_code.as_deref();
            if codes_match(group_type, first.transaction_type_code.as_deref()) {
                record.interval_start_to_first_transaction =
                    first.transaction_date - interval.start;
            }
            if codes_match(group_type, last.transaction_type_code.as_deref()) {
                record.last_transaction_to_interval_end = interval.end - last.transaction_date;
            }

            record.max_transaction_interval = whole_seconds(totals.max_transaction_interval);
            record.time_clocked_in = whole_seconds(
                totals.transition_seconds + totals.functional_transition_seconds,
            );
            record.quantity_processed = totals.quantity_processed;
            record.quantity_earned = totals.quantity_earned;
            record.duplicate_transaction_count = totals.duplicate_count;
            record.time_lost_to_rework = whole_seconds(totals.rework_seconds);
            record
        })
        .collect()
}

/// Whole seconds as a duration, saturating at the largest span chrono holds.
fn whole_seconds(seconds: i64) -> Duration {
    Duration::try_seconds(seconds).unwrap_or(if seconds < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupKey {
    segment_code: String,
    transaction_type_code: Option<String>,
}

fn group_transactions(transactions: &[Transaction]) -> Vec<(GroupKey, Vec<&Transaction>)> {
    let mut groups: Vec<(GroupKey, Vec<&Transaction>)> = Vec::new();

    for transaction in transactions {
        let key = GroupKey {
            segment_code: transaction
                .segment_code
                .as_deref()
                .unwrap_or(&transaction.site_code)
                .to_uppercase(),
            transaction_type_code: transaction
                .transaction_type_code
                .as_deref()
                .map(str::to_uppercase),
        };

        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, items)) => items.push(transaction),
            None => groups.push((key, vec![transaction])),
        }
    }

    groups
}

/// Running sums over one transaction group, in whole seconds.
#[derive(Debug, Default)]
struct GroupTotals {
    seconds_earned: i64,
    transition_seconds: i64,
    functional_transition_seconds: i64,
    seconds_over_target: i64,
    rework_seconds: i64,
    max_transaction_interval: i64,
    quantity_processed: Decimal,
    quantity_earned: Decimal,
    duplicate_count: Decimal,
}

impl GroupTotals {
    fn accumulate(
        items: &[&Transaction],
        target_seconds_per_unit: Decimal,
        rework_transaction_type: &str,
    ) -> Self {
        let mut totals = Self::default();

        for item in items {
            totals.seconds_earned += item.seconds_earned;

            if item.is_functional_transition() {
                totals.transition_seconds += item.transition_seconds.min(item.seconds_earned);
                totals.functional_transition_seconds +=
                    (item.transition_seconds - item.seconds_earned).max(0);
            } else {
                totals.transition_seconds += item.transition_seconds;
                totals.seconds_over_target += (item.transition_seconds - item.seconds_earned).max(0);
            }

            if item.is_rework(rework_transaction_type) {
                let processed = item.quantity_processed.unwrap_or(Decimal::ZERO);
                let rework = round_seconds(processed.saturating_mul(target_seconds_per_unit));
                totals.rework_seconds = totals.rework_seconds.saturating_add(rework);
                totals.duplicate_count += item.duplicate_quantity();
            }

            totals.max_transaction_interval =
                totals.max_transaction_interval.max(item.transition_seconds);
            totals.quantity_processed += item.quantity_processed.unwrap_or(Decimal::ZERO);
            totals.quantity_earned += item.quantity_earned.unwrap_or(Decimal::ZERO);
        }

        totals
    }
}

/// Backfills clock-in time at the shift's edges.
///
/// A shift with nothing processed gets every interval fully clocked in, and
/// when nothing was earned either it is flagged as a non-productive
/// clock-in. Otherwise the time before the first transaction and after the
/// last one is added to the records of the matching type (or placeholders)
/// at those edges.
fn backfill_shift_edges(
    records: &mut [EfficiencyRecord],
    shift: &Shift,
    first: Option<&Transaction>,
    last: Option<&Transaction>,
) {
    let profile = &shift.profile;

    if records.iter().all(|r| r.quantity_processed.is_zero()) {
        for record in records.iter_mut() {
            record.time_clocked_in = record.interval().whole_seconds();
        }

        if records.iter().all(|r| r.time_earned.is_zero()) {
            for record in records.iter_mut() {
                record.shift_time_to_first_transaction = record.time_clocked_in;
                record.is_non_productive_clock_in = profile.is_transactional;
            }
        }
    }

    if !records.iter().any(|r| r.quantity_processed > Decimal::ZERO) {
        return;
    }

    if let Some(first) = first {
        for record in records
            .iter_mut()
            .filter(|r| matches_edge(r, first) && r.interval_start_time <= first.transaction_date)
        {
            let delta = edge_delta(record, record.interval_start_to_first_transaction);
            record.shift_time_to_first_transaction = if profile.is_transactional {
                delta
            } else {
                Duration::zero()
            };
            record.time_clocked_in += delta;
            backfill_type(record, first);
        }
    }

    if let Some(last) = last {
        for record in records
            .iter_mut()
            .filter(|r| matches_edge(r, last) && r.interval_end_time >= last.transaction_date)
        {
            let delta = edge_delta(record, record.last_transaction_to_interval_end);
            record.shift_time_after_last_transaction =
                if profile.is_transactional && !profile.is_clocked_in {
                    delta
                } else {
                    Duration::zero()
                };
            record.time_clocked_in += delta;
            backfill_type(record, last);
        }
    }
}

fn matches_edge(record: &EfficiencyRecord, edge: &Transaction) -> bool {
    record.transaction_type_code.is_none()
        || codes_match(
            record.transaction_type_code.as_deref(),
            edge.transaction_type_code.as_deref(),
        )
}

/// A record with nothing processed counts its whole interval.
fn edge_delta(record: &EfficiencyRecord, boundary_gap: Duration) -> Duration {
    if record.quantity_processed.is_zero() {
        record.interval().whole_seconds()
    } else {
        boundary_gap
    }
}

fn backfill_type(record: &mut EfficiencyRecord, edge: &Transaction) {
    if record.transaction_type_code.is_none() {
        record.transaction_type_code = edge.transaction_type_code.clone();
    }
}

/// Attributes every shift and then runs the cross-shift pass over `window`.
///
/// Records are returned shift by shift, in the order the shifts were given.
pub fn compute_efficiency(
    shifts: &[Shift],
    source: &dyn TransactionSource,
    labor_rates: &[LaborRate],
    window: &TimeRange,
    settings: &EngineSettings,
) -> EngineResult<Vec<EfficiencyRecord>> {
    let mut records = Vec::new();
    for shift in shifts {
        records.extend(attribute_shift(shift, source, labor_rates, settings)?);
    }

    aggregate_shift_boundaries(&mut records, window.start, window.end);
    Ok(records)
}

/// Returns the last transaction time observed across `records`, if any.
pub fn latest_transaction_date(records: &[EfficiencyRecord]) -> Option<NaiveDateTime> {
    records.iter().filter_map(|r| r.last_transaction_date).max()
}
