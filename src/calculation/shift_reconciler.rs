//! Orphan shift reconciliation.
//!
//! Transactions that happen outside every known time sheet still represent
//! work. This module walks an employee's ordered transactions alongside their
//! ordered time sheets and synthesizes "orphan" shifts that cover that
//! activity without overlapping the adjoining time sheets.
//!
//! The walk is a small state machine: the reconciler is either idle or has
//! one open shift. Each transaction is an observation that may close the open
//! shift, open a new one, or both.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::calculation::interval_sequencer::{ceil_to_step, floor_to_step};
use crate::calculation::time_sheet_cursor::TimeSheetCursor;
use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{Shift, ShiftProfile, TimeSheetPunch, Transaction};

/// Default padding before the first transaction of an orphan shift.
pub const DEFAULT_START_PADDING_MINUTES: i64 = 30;

/// Default padding after the last transaction of an orphan shift.
pub const DEFAULT_END_PADDING_MINUTES: i64 = 30;

/// Default gap between transactions that ends an orphan shift.
pub const DEFAULT_MAX_TRANSACTION_GAP_HOURS: i64 = 8;

/// An orphan shift that has been opened but not yet closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenShift {
    /// The padded start of the shift.
    pub start: NaiveDateTime,
    /// The operational day of the transaction that opened the shift.
    pub operational_date: NaiveDate,
    /// The time of the most recent transaction in the shift.
    pub last_seen: NaiveDateTime,
}

/// A finished orphan shift, before it is given a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedShift {
    /// The start of the shift.
    pub start: NaiveDateTime,
    /// The exclusive end of the shift.
    pub end: NaiveDateTime,
    /// The operational day of the shift.
    pub operational_date: NaiveDate,
}

/// Where the reconciler is in its walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilerState {
    /// No orphan shift is open.
    #[default]
    Idle,
    /// An orphan shift is open.
    Open(OpenShift),
}

/// What the reconciler sees when it reaches a transaction.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    /// The transaction's time.
    pub at: NaiveDateTime,
    /// The transaction's operational day.
    pub operational_date: NaiveDate,
    /// The time sheet the cursor settled on, if any remain.
    pub current: Option<&'a TimeSheetPunch>,
    /// The time sheet the cursor passed last.
    pub previous: Option<&'a TimeSheetPunch>,
    /// Whether the current time sheet differs from the one seen at the previous transaction.
    pub sheet_changed: bool,
}

/// Synthesizes orphan shifts from transactions and time sheets.
///
/// # Example
///
/// ```
/// use efficiency_engine::calculation::ShiftReconciler;
/// use efficiency_engine::models::{BusinessUnit, ShiftProfile, Transaction};
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let profile = ShiftProfile::orphan("DC01", None, &["E100".to_string()], None, &[], BusinessUnit::SupplyChain);
/// let transactions = vec![
///     Transaction::new("DC01", "E100", "PICK", at("2026-03-02 09:03:00")),
///     Transaction::new("DC01", "E100", "PICK", at("2026-03-02 09:47:00")),
/// ];
///
/// let shifts = ShiftReconciler::default().reconcile(&profile, &[], &transactions).unwrap();
/// assert_eq!(shifts.len(), 1);
/// assert_eq!(shifts[0].start_time, at("2026-03-02 08:30:00"));
/// assert_eq!(shifts[0].end_time, at("2026-03-02 10:00:00"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftReconciler {
    start_pad: Duration,
    end_pad: Duration,
    max_gap: Duration,
}

impl Default for ShiftReconciler {
    fn default() -> Self {
        Self::new(
            Duration::minutes(DEFAULT_START_PADDING_MINUTES),
            Duration::minutes(DEFAULT_END_PADDING_MINUTES),
            Duration::hours(DEFAULT_MAX_TRANSACTION_GAP_HOURS),
        )
    }
}

impl ShiftReconciler {
    /// Creates a reconciler with explicit paddings and gap tolerance.
    pub fn new(start_pad: Duration, end_pad: Duration, max_gap: Duration) -> Self {
        Self {
            start_pad,
            end_pad,
            max_gap,
        }
    }

    /// Creates a reconciler from engine settings.
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(
            settings.orphan_start_padding(),
            settings.orphan_end_padding(),
            settings.max_transaction_gap(),
        )
    }

    /// Produces the orphan shifts for one employee.
    ///
    /// `time_sheets` must be ordered by punch-in and `transactions` by
    /// transaction time; both are validated before the walk starts.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OrderingViolation`] for out-of-order input,
    /// [`EngineError::InvalidTimeSheet`] for a punch-out before its punch-in and
    /// [`EngineError::InvalidTransaction`] for seconds out of range.
    pub fn reconcile(
        &self,
        profile: &ShiftProfile,
        time_sheets: &[TimeSheetPunch],
        transactions: &[Transaction],
    ) -> EngineResult<Vec<Shift>> {
        validate_time_sheets(time_sheets)?;
        validate_transactions(transactions)?;

        let mut cursor = TimeSheetCursor::new(time_sheets);
        let mut tracked: Option<usize> = None;
        let mut state = ReconcilerState::Idle;
        let mut closed = Vec::new();

        for transaction in transactions {
            let at = transaction.transaction_date;
            advance_cursor(&mut cursor, at);

            let position = cursor.current().map(|_| cursor.position());
            let observation = Observation {
                at,
                operational_date: transaction.operational_date,
                current: cursor.current(),
                previous: cursor.previous(),
                sheet_changed: position != tracked,
            };
            tracked = position;

            let (next, finished) = self.observe(state, &observation);
            closed.extend(finished);
            state = next;
        }

        closed.extend(self.finish(state, cursor.current()));

        let shifts: Vec<Shift> = closed
            .into_iter()
            .map(|c| Shift::new(c.start, c.end, c.operational_date, profile.clone()))
            .collect();

        debug!(
            site_code = %profile.site_code,
            employee_number = ?profile.employee_number,
            transactions = transactions.len(),
            time_sheets = time_sheets.len(),
            orphan_shifts = shifts.len(),
            "Reconciled orphan shifts"
        );

        Ok(shifts)
    }

    /// Applies one observation to the state.
    ///
    /// Returns the next state and the shift closed by this observation, if any.
    pub fn observe(
        &self,
        state: ReconcilerState,
        observation: &Observation<'_>,
    ) -> (ReconcilerState, Option<ClosedShift>) {
        let mut finished = None;
        let mut state = state;

        if let ReconcilerState::Open(open) = state {
            let gap_exceeded = observation.at - open.last_seen > self.max_gap;
            let punch_in_reached = observation
                .current
                .is_some_and(|sheet| sheet.punch_in <= observation.at);

            if observation.sheet_changed || gap_exceeded || punch_in_reached {
                finished = Some(self.close(open, observation.current));
                state = ReconcilerState::Idle;
            }
        }

        state = match state {
            ReconcilerState::Open(open) => ReconcilerState::Open(OpenShift {
                last_seen: observation.at,
                ..open
            }),
            ReconcilerState::Idle if precedes_current(observation) => {
                ReconcilerState::Open(self.open(observation))
            }
            ReconcilerState::Idle => ReconcilerState::Idle,
        };

        (state, finished)
    }

    /// Closes any shift still open when the transactions run out.
    pub fn finish(
        &self,
        state: ReconcilerState,
        current: Option<&TimeSheetPunch>,
    ) -> Option<ClosedShift> {
        match state {
            ReconcilerState::Open(open) => Some(self.close(open, current)),
            ReconcilerState::Idle => None,
        }
    }

    fn open(&self, observation: &Observation<'_>) -> OpenShift {
        let mut start = floor_to_step(observation.at, self.start_pad) - self.start_pad;
        if let Some(punch_out) = observation.previous.and_then(|sheet| sheet.punch_out) {
            start = start.max(punch_out);
        }

        OpenShift {
            start,
            operational_date: observation.operational_date,
            last_seen: observation.at,
        }
    }

    fn close(&self, open: OpenShift, current: Option<&TimeSheetPunch>) -> ClosedShift {
        let mut end = ceil_to_step(open.last_seen, self.end_pad);
        if let Some(sheet) = current {
            end = end.min(sheet.punch_in);
        }

        ClosedShift {
            start: open.start,
            end: end.max(open.start),
            operational_date: open.operational_date,
        }
    }
}

fn precedes_current(observation: &Observation<'_>) -> bool {
    observation
        .current
        .is_none_or(|sheet| observation.at < sheet.punch_in)
}

/// Moves the cursor to the first time sheet still open at `at`.
fn advance_cursor(cursor: &mut TimeSheetCursor<'_, TimeSheetPunch>, at: NaiveDateTime) {
    while let Some(current) = cursor.current() {
        if current.is_open_at(at) {
            break;
        }
        cursor.advance();
    }
}

fn validate_time_sheets(time_sheets: &[TimeSheetPunch]) -> EngineResult<()> {
    for sheet in time_sheets {
        if let Some(punch_out) = sheet.punch_out {
            if sheet.punch_in > punch_out {
                return Err(EngineError::InvalidTimeSheet {
                    time_sheet_id: sheet.time_sheet_id,
                    punch_in: sheet.punch_in,
                    punch_out,
                });
            }
        }
    }

    if let Some(pair) = time_sheets
        .windows(2)
        .find(|pair| pair[0].punch_in > pair[1].punch_in)
    {
        return Err(EngineError::OrderingViolation {
            stream: "time sheets".to_string(),
            message: format!(
                "punch in {} of time sheet {} follows {}",
                pair[1].punch_in, pair[1].time_sheet_id, pair[0].punch_in
            ),
        });
    }

    Ok(())
}

/// Fails unless `transactions` are non-decreasing by transaction time and
/// carry seconds the engine can attribute.
pub(crate) fn validate_transactions(transactions: &[Transaction]) -> EngineResult<()> {
    for transaction in transactions {
        if let Some((field, value)) = transaction.out_of_range_seconds() {
            return Err(EngineError::InvalidTransaction {
                site_employee_code: transaction.site_employee_code.clone(),
                transaction_date: transaction.transaction_date,
                message: format!("{} {} is out of range", field, value),
            });
        }
    }

    match transactions
        .windows(2)
        .find(|pair| pair[0].transaction_date > pair[1].transaction_date)
    {
        Some(pair) => Err(EngineError::OrderingViolation {
            stream: "transactions".to_string(),
            message: format!(
                "{} follows {}",
                pair[1].transaction_date, pair[0].transaction_date
            ),
        }),
        None => Ok(()),
    }
}

/// Splits shifts longer than `max_span` at each midnight inside them.
///
/// Each piece is reported under the date it starts on. Shifts within the
/// limit are returned unchanged.
pub fn split_multi_day(shifts: Vec<Shift>, max_span: Duration) -> Vec<Shift> {
    let mut result = Vec::with_capacity(shifts.len());

    for shift in shifts {
        if shift.end_time - shift.start_time <= max_span {
            result.push(shift);
            continue;
        }

        let mut piece_start = shift.start_time;
        while piece_start < shift.end_time {
            let next_midnight = (piece_start.date() + Duration::days(1))
                .and_hms_opt(0, 0, 0)
                .map_or(shift.end_time, |midnight| midnight.min(shift.end_time));

            result.push(shift.with_bounds(piece_start, next_midnight, piece_start.date()));
            piece_start = next_midnight;
        }

        debug!(
            site_code = %shift.profile.site_code,
            start = %shift.start_time,
            end = %shift.end_time,
            "Split multi-day orphan shift at midnight"
        );
    }

    result
}
