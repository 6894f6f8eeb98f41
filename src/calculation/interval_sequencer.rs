//! Interval sequencing.
//!
//! This module tiles a time span with consecutive half-open ranges of a fixed
//! step. With "nearest" alignment the first range is shortened so that every
//! later boundary falls on a multiple of the step, so hourly intervals start
//! on the hour regardless of when a shift began.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::TimeRange;

/// The direction an [`IntervalSequence`] walks its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// From the start of the span towards the end.
    #[default]
    Ascending,
    /// From the end of the span towards the start.
    Descending,
}

/// A lazily generated tiling of `[start, end)` by ranges of `step`.
///
/// The ranges are contiguous, never overlap and exactly cover the span. The
/// last range in the walk is clipped to the span.
///
/// # Example
///
/// ```
/// use efficiency_engine::calculation::{Direction, IntervalSequence};
/// use chrono::{Duration, NaiveDateTime};
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let sequence = IntervalSequence::new(
///     at("2026-03-02 09:17:00"),
///     at("2026-03-02 11:30:00"),
///     Duration::hours(1),
///     true,
///     Direction::Ascending,
/// )
/// .unwrap();
///
/// let ranges: Vec<_> = sequence.iter().collect();
/// assert_eq!(ranges.len(), 3);
/// assert_eq!(ranges[0].end, at("2026-03-02 10:00:00"));
/// assert_eq!(ranges[2].end, at("2026-03-02 11:30:00"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSequence {
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: Duration,
    nearest: bool,
    direction: Direction,
}

impl IntervalSequence {
    /// Creates a sequence over `[start, end)`.
    ///
    /// Fails with [`EngineError::InvalidStep`] when `step` is zero or negative.
    /// A span whose end is not after its start yields no ranges.
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        step: Duration,
        nearest: bool,
        direction: Direction,
    ) -> EngineResult<Self> {
        if step <= Duration::zero() {
            return Err(EngineError::InvalidStep { step });
        }
        Ok(Self {
            start,
            end,
            step,
            nearest,
            direction,
        })
    }

    /// Returns a fresh walk over the sequence.
    pub fn iter(&self) -> Intervals {
        Intervals {
            sequence: *self,
            accumulated: Duration::zero(),
        }
    }

    fn first_step(&self) -> Duration {
        if !self.nearest {
            return self.step;
        }
        let delta = match self.direction {
            Direction::Ascending => ceil_to_step(self.start, self.step) - self.start,
            Direction::Descending => self.end - floor_to_step(self.end, self.step),
        };
        if delta.is_zero() { self.step } else { delta }
    }
}

impl IntoIterator for &IntervalSequence {
    type Item = TimeRange;
    type IntoIter = Intervals;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the ranges of an [`IntervalSequence`].
#[derive(Debug, Clone)]
pub struct Intervals {
    sequence: IntervalSequence,
    accumulated: Duration,
}

impl Iterator for Intervals {
    type Item = TimeRange;

    fn next(&mut self) -> Option<TimeRange> {
        let s = &self.sequence;
        if self.accumulated >= s.end - s.start {
            return None;
        }

        let step = if self.accumulated.is_zero() {
            s.first_step()
        } else {
            s.step
        };

        let range = match s.direction {
            Direction::Ascending => TimeRange {
                start: s.start + self.accumulated,
                end: (s.start + self.accumulated + step).min(s.end),
            },
            Direction::Descending => TimeRange {
                start: (s.end - self.accumulated - step).max(s.start),
                end: s.end - self.accumulated,
            },
        };

        self.accumulated += step;
        Some(range)
    }
}

/// Rounds `instant` down to a multiple of `step` counted from the Unix epoch.
///
/// Steps that evenly divide a day therefore align to midnight. A
/// non-positive step leaves `instant` unchanged.
pub fn floor_to_step(instant: NaiveDateTime, step: Duration) -> NaiveDateTime {
    let step_ms = step.num_milliseconds();
    if step_ms <= 0 {
        return instant;
    }
    let remainder = instant.and_utc().timestamp_millis().rem_euclid(step_ms);
    instant - Duration::milliseconds(remainder)
}

/// Rounds `instant` up to a multiple of `step` counted from the Unix epoch.
///
/// An instant already on a multiple is returned unchanged.
pub fn ceil_to_step(instant: NaiveDateTime, step: Duration) -> NaiveDateTime {
    let step_ms = step.num_milliseconds();
    if step_ms <= 0 {
        return instant;
    }
    let remainder = instant.and_utc().timestamp_millis().rem_euclid(step_ms);
    if remainder == 0 {
        instant
    } else {
        instant + Duration::milliseconds(step_ms - remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2026-03-02 {}", time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn collect(
        start: &str,
        end: &str,
        step: Duration,
        nearest: bool,
        direction: Direction,
    ) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        IntervalSequence::new(make_datetime(start), make_datetime(end), step, nearest, direction)
            .unwrap()
            .iter()
            .map(|r| (r.start, r.end))
            .collect()
    }

    // ==========================================================================
    // Ascending
    // ==========================================================================

    #[test]
    fn test_plain_ascending_steps_from_start() {
        let ranges = collect("09:17:00", "11:30:00", Duration::hours(1), false, Direction::Ascending);
        assert_eq!(
            ranges,
            vec![
                (make_datetime("09:17:00"), make_datetime("10:17:00")),
                (make_datetime("10:17:00"), make_datetime("11:17:00")),
                (make_datetime("11:17:00"), make_datetime("11:30:00")),
            ]
        );
    }

    #[test]
    fn test_nearest_ascending_aligns_first_boundary() {
        let ranges = collect("09:17:00", "12:00:00", Duration::hours(1), true, Direction::Ascending);
        assert_eq!(
            ranges,
            vec![
                (make_datetime("09:17:00"), make_datetime("10:00:00")),
                (make_datetime("10:00:00"), make_datetime("11:00:00")),
                (make_datetime("11:00:00"), make_datetime("12:00:00")),
            ]
        );
    }

    #[test]
    fn test_nearest_ascending_already_aligned_uses_full_step() {
        let ranges = collect("08:00:00", "10:00:00", Duration::hours(1), true, Direction::Ascending);
        assert_eq!(
            ranges,
            vec![
                (make_datetime("08:00:00"), make_datetime("09:00:00")),
                (make_datetime("09:00:00"), make_datetime("10:00:00")),
            ]
        );
    }

    #[test]
    fn test_span_shorter_than_alignment_is_single_range() {
        let ranges = collect("09:17:00", "09:40:00", Duration::hours(1), true, Direction::Ascending);
        assert_eq!(
            ranges,
            vec![(make_datetime("09:17:00"), make_datetime("09:40:00"))]
        );
    }

    // ==========================================================================
    // Descending
    // ==========================================================================

    #[test]
    fn test_nearest_descending_aligns_from_end() {
        let ranges = collect("08:00:00", "10:45:00", Duration::hours(1), true, Direction::Descending);
        assert_eq!(
            ranges,
            vec![
                (make_datetime("10:00:00"), make_datetime("10:45:00")),
                (make_datetime("09:00:00"), make_datetime("10:00:00")),
                (make_datetime("08:00:00"), make_datetime("09:00:00")),
            ]
        );
    }

    #[test]
    fn test_plain_descending_clips_at_start() {
        let ranges = collect("08:30:00", "10:00:00", Duration::hours(1), false, Direction::Descending);
        assert_eq!(
            ranges,
            vec![
                (make_datetime("09:00:00"), make_datetime("10:00:00")),
                (make_datetime("08:30:00"), make_datetime("09:00:00")),
            ]
        );
    }

    // ==========================================================================
    // Edge cases
    // ==========================================================================

    #[test]
    fn test_zero_step_is_rejected() {
        let result = IntervalSequence::new(
            make_datetime("08:00:00"),
            make_datetime("09:00:00"),
            Duration::zero(),
            false,
            Direction::Ascending,
        );
        assert!(matches!(result, Err(EngineError::InvalidStep { .. })));
    }

    #[test]
    fn test_negative_step_is_rejected() {
        let result = IntervalSequence::new(
            make_datetime("08:00:00"),
            make_datetime("09:00:00"),
            Duration::minutes(-15),
            true,
            Direction::Descending,
        );
        assert!(matches!(result, Err(EngineError::InvalidStep { .. })));
    }

    #[test]
    fn test_empty_span_yields_nothing() {
        assert!(collect("08:00:00", "08:00:00", Duration::hours(1), true, Direction::Ascending).is_empty());
        assert!(collect("09:00:00", "08:00:00", Duration::hours(1), false, Direction::Descending).is_empty());
    }

    #[test]
    fn test_sequence_is_restartable() {
        let sequence = IntervalSequence::new(
            make_datetime("09:17:00"),
            make_datetime("12:00:00"),
            Duration::hours(1),
            true,
            Direction::Ascending,
        )
        .unwrap();

        let first: Vec<_> = sequence.iter().collect();
        let second: Vec<_> = (&sequence).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rounding_helpers() {
        let step = Duration::minutes(30);
        assert_eq!(floor_to_step(make_datetime("09:03:00"), step), make_datetime("09:00:00"));
        assert_eq!(ceil_to_step(make_datetime("09:47:00"), step), make_datetime("10:00:00"));
        assert_eq!(ceil_to_step(make_datetime("09:30:00"), step), make_datetime("09:30:00"));
        assert_eq!(floor_to_step(make_datetime("09:30:00"), step), make_datetime("09:30:00"));
    }

    #[test]
    fn test_rounding_helpers_ignore_non_positive_step() {
        let instant = make_datetime("09:03:00");
        assert_eq!(floor_to_step(instant, Duration::zero()), instant);
        assert_eq!(ceil_to_step(instant, Duration::minutes(-5)), instant);
    }
}
