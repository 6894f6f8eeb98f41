//! Half-open time ranges.
//!
//! This module defines [`TimeRange`], the `[start, end)` pair used for shift
//! bounds and sub-intervals.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A half-open `[start, end)` range of site-local wall-clock instants.
///
/// # Example
///
/// ```
/// use efficiency_engine::models::TimeRange;
/// use chrono::{Duration, NaiveDateTime};
///
/// let start = NaiveDateTime::parse_from_str("2026-03-02 09:17:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let end = NaiveDateTime::parse_from_str("2026-03-02 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let range = TimeRange::new(start, end).unwrap();
///
/// assert_eq!(range.duration(), Duration::minutes(43));
/// assert!(range.contains(start));
/// assert!(!range.contains(end));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// The inclusive start of the range.
    pub start: NaiveDateTime,
    /// The exclusive end of the range.
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Creates a range, failing with [`EngineError::InvalidRange`] when `start > end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the length of the range.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns the length of the range truncated to whole seconds.
    pub fn whole_seconds(&self) -> Duration {
        Duration::seconds(self.duration().num_seconds())
    }

    /// Returns true if `instant` lies inside `[start, end)`.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Returns true if the range has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Serializes a [`Duration`] as a whole number of seconds.
pub(crate) mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        Duration::try_seconds(seconds)
            .ok_or_else(|| D::Error::custom(format!("{} seconds is out of range", seconds)))
    }
}
