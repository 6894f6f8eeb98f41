//! Calculation logic for the Efficiency Engine.
//!
//! This module contains the pure parts of the engine: interval sequencing,
//! reconciliation of time sheets and transactions into shifts, mapping of
//! time sheets into shifts, attribution of transactions to shift
//! sub-intervals, and the cross-shift start/end of productivity pass.

mod cross_shift;
mod interval_attribution;
mod interval_sequencer;
mod shift_reconciler;
mod time_sheet_cursor;
mod time_sheet_shifts;

pub use cross_shift::aggregate_shift_boundaries;
pub use interval_attribution::{
    attribute_interval, attribute_shift, compute_efficiency, latest_transaction_date,
};
pub use interval_sequencer::{Direction, IntervalSequence, Intervals, ceil_to_step, floor_to_step};
pub use shift_reconciler::{
    ClosedShift, DEFAULT_END_PADDING_MINUTES, DEFAULT_MAX_TRANSACTION_GAP_HOURS,
    DEFAULT_START_PADDING_MINUTES, Observation, OpenShift, ReconcilerState, ShiftReconciler,
    split_multi_day,
};
pub use time_sheet_cursor::TimeSheetCursor;
pub use time_sheet_shifts::{SiteShiftContext, enrich_time_sheets, map_time_sheet_shifts};
