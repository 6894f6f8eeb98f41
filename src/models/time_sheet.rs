//! Time sheet punch model.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::reference::WorkcenterType;

/// A single clock-in/clock-out record for an employee.
///
/// A missing `punch_out` means the employee is still clocked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSheetPunch {
    /// Unique identifier for the time sheet.
    pub time_sheet_id: i64,
    /// The time-and-attendance employee code.
    pub employee_code: String,
    /// The site the employee punched in at.
    pub site_code: String,
    /// The scheduled shift code (e.g. "1ST").
    #[serde(default)]
    pub shift_code: Option<String>,
    /// The work center the employee worked in.
    #[serde(default)]
    pub work_center_code: Option<String>,
    /// The operational day of the punch.
    pub operational_date: NaiveDate,
    /// When the employee punched in.
    pub punch_in: NaiveDateTime,
    /// When the employee punched out, if they have.
    #[serde(default)]
    pub punch_out: Option<NaiveDateTime>,
    /// Name of the worked work center, filled from reference data.
    #[serde(default)]
    pub work_center_name: Option<String>,
    /// Whether the worked work center is transactional, filled from reference data.
    #[serde(default)]
    pub is_transactional_work_center: Option<bool>,
    /// Classification of the worked work center, filled from reference data.
    #[serde(default)]
    pub workcenter_type: Option<WorkcenterType>,
}

impl TimeSheetPunch {
    /// Returns true if the punch-out is unknown or later than `instant`.
    pub fn is_open_at(&self, instant: NaiveDateTime) -> bool {
        self.punch_out.is_none_or(|punch_out| punch_out > instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_punch(punch_out: Option<&str>) -> TimeSheetPunch {
        let parse = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        TimeSheetPunch {
            time_sheet_id: 1,
            employee_code: "T100".to_string(),
            site_code: "DC01".to_string(),
            shift_code: Some("1ST".to_string()),
            work_center_code: None,
            operational_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            punch_in: parse("2026-03-02 08:00:00"),
            punch_out: punch_out.map(parse),
            work_center_name: None,
            is_transactional_work_center: None,
            workcenter_type: None,
        }
    }

    #[test]
    fn test_open_punch_is_open_forever() {
        let punch = make_punch(None);
        let late = NaiveDateTime::parse_from_str("2026-03-09 08:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert!(punch.is_open_at(late));
    }

    #[test]
    fn test_closed_punch_is_not_open_at_punch_out() {
        let punch = make_punch(Some("2026-03-02 16:00:00"));
        assert!(!punch.is_open_at(punch.punch_out.unwrap()));
        assert!(punch.is_open_at(punch.punch_in));
    }

    #[test]
    fn test_punch_deserialization() {
        let json = r#"{
            "time_sheet_id": 7,
            "employee_code": "T100",
            "site_code": "DC01",
            "operational_date": "2026-03-02",
            "punch_in": "2026-03-02T08:00:00"
        }"#;

        let punch: TimeSheetPunch = serde_json::from_str(json).unwrap();
        assert_eq!(punch.time_sheet_id, 7);
        assert!(punch.punch_out.is_none());
        assert!(punch.shift_code.is_none());
    }
}
