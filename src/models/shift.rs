//! Shift model and related types.
//!
//! A [`Shift`] is a contiguous span of time attributed to one employee, or to
//! one raw site employee code when the code is not mapped to any employee.
//! Shifts come from time sheets or are synthesized from transactions that
//! fall outside every known time sheet.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::employee::Employee;
use super::reference::{BusinessUnit, EmployeeShiftSupervisor, TransactionTypeInfo, WorkcenterType};
use super::time_range::TimeRange;
use super::time_sheet::TimeSheetPunch;

/// The attributes a shift carries besides its bounds.
///
/// Profiles are shared unchanged by every piece a shift is split into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftProfile {
    /// The site the shift was worked at.
    pub site_code: String,
    /// Distinct site employee codes whose transactions belong to the shift.
    pub site_employee_codes: Vec<String>,
    /// The employee number, when the codes are mapped to an employee.
    pub employee_number: Option<String>,
    /// The employee's full name.
    pub employee_full_name: Option<String>,
    /// The employee's job code.
    pub employee_job_code: Option<String>,
    /// The employee's salary class code.
    pub salary_class_code: Option<String>,
    /// The employee's line supervisor.
    pub supervisor: Option<String>,
    /// The supervisor assigned to the employee's shift.
    pub shift_supervisor: Option<String>,
    /// Whether the employee works part time.
    pub is_part_time_employee: bool,
    /// The scheduled shift code; orphan shifts have none.
    pub shift_code: Option<String>,
    /// The worked work center code; orphan shifts have none.
    pub work_center_code: Option<String>,
    /// The backing time sheet; orphan shifts have none.
    pub time_sheet_id: Option<i64>,
    /// Whether the employee is still clocked in.
    pub is_clocked_in: bool,
    /// Whether time in the shift is measured.
    pub is_transactional: bool,
    /// Whether the employee is measured regardless of work center.
    pub is_employee_transactional: bool,
    /// The worked work center's classification.
    pub workcenter_type: WorkcenterType,
    /// The site's business unit.
    pub business_unit: BusinessUnit,
    /// The site's transaction-type catalog.
    pub transaction_types: Vec<TransactionTypeInfo>,
}

impl ShiftProfile {
    fn base(
        site_code: &str,
        employee: Option<&Employee>,
        site_employee_codes: &[String],
        supervisor: Option<&EmployeeShiftSupervisor>,
        transaction_types: &[TransactionTypeInfo],
        business_unit: BusinessUnit,
    ) -> Self {
        Self {
            site_code: site_code.to_string(),
            site_employee_codes: distinct_codes(site_employee_codes),
            employee_number: employee.map(|e| e.number.clone()),
            employee_full_name: employee.and_then(|e| e.full_name.clone()),
            employee_job_code: employee.and_then(|e| e.job_code.clone()),
            salary_class_code: employee.and_then(|e| e.salary_class_code.clone()),
            supervisor: employee.and_then(|e| e.supervisor_full_name.clone()),
            shift_supervisor: supervisor.map(|s| s.supervisor_full_name.clone()),
            is_part_time_employee: employee.is_some_and(|e| e.is_part_time),
            shift_code: None,
            work_center_code: None,
            time_sheet_id: None,
            is_clocked_in: false,
            is_transactional: false,
            is_employee_transactional: false,
            workcenter_type: WorkcenterType::Transactional,
            business_unit,
            transaction_types: transaction_types.to_vec(),
        }
    }

    /// Creates the profile of a shift synthesized from transactions.
    ///
    /// Orphan shifts are never transactional on LTL sites. Elsewhere they
    /// follow the employee, and unmapped codes count as transactional.
    pub fn orphan(
        site_code: &str,
        employee: Option<&Employee>,
        site_employee_codes: &[String],
        supervisor: Option<&EmployeeShiftSupervisor>,
        transaction_types: &[TransactionTypeInfo],
        business_unit: BusinessUnit,
    ) -> Self {
        let is_ltl = business_unit == BusinessUnit::Ltl;
        let transactional = !is_ltl && employee.is_none_or(|e| e.is_transactional);
        Self {
            is_transactional: transactional,
            is_employee_transactional: transactional,
            ..Self::base(
                site_code,
                employee,
                site_employee_codes,
                supervisor,
                transaction_types,
                business_unit,
            )
        }
    }

    /// Returns true if the shift has no backing time sheet.
    pub fn is_orphan(&self) -> bool {
        self.time_sheet_id.is_none()
    }
}

/// A reconciled span of work for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// The start of the shift.
    pub start_time: NaiveDateTime,
    /// The exclusive end of the shift.
    pub end_time: NaiveDateTime,
    /// The operational day the shift is reported under.
    pub operational_date: NaiveDate,
    /// The shift's attributes.
    pub profile: ShiftProfile,
}

impl Shift {
    /// Creates a shift from its bounds and profile.
    pub fn new(
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        operational_date: NaiveDate,
        profile: ShiftProfile,
    ) -> Self {
        Self {
            start_time,
            end_time,
            operational_date,
            profile,
        }
    }

    /// Creates a shift backed by a time sheet punch.
    ///
    /// A punch with no punch-out, or one after `now`, is still clocked in and
    /// ends at `now` (or at the punch-out when that comes first).
    ///
    /// # Examples
    ///
    /// ```
    /// use efficiency_engine::models::{BusinessUnit, Shift, TimeSheetPunch};
    /// use chrono::{NaiveDate, NaiveDateTime};
    ///
    /// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    /// let punch = TimeSheetPunch {
    ///     time_sheet_id: 1,
    ///     employee_code: "T1001".to_string(),
    ///     site_code: "DC01".to_string(),
    ///     shift_code: Some("1ST".to_string()),
    ///     work_center_code: None,
    ///     operational_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
    ///     punch_in: at("2026-03-02 08:00:00"),
    ///     punch_out: None,
    ///     work_center_name: None,
    ///     is_transactional_work_center: None,
    ///     workcenter_type: None,
    /// };
    ///
    /// let shift = Shift::from_time_sheet(
    ///     &punch,
    ///     None,
    ///     at("2026-03-02 11:30:00"),
    ///     &["E100".to_string()],
    ///     None,
    ///     &[],
    ///     BusinessUnit::SupplyChain,
    /// );
    /// assert!(shift.profile.is_clocked_in);
    /// assert_eq!(shift.end_time, at("2026-03-02 11:30:00"));
    /// ```
    pub fn from_time_sheet(
        punch: &TimeSheetPunch,
        employee: Option<&Employee>,
        now: NaiveDateTime,
        site_employee_codes: &[String],
        supervisor: Option<&EmployeeShiftSupervisor>,
        transaction_types: &[TransactionTypeInfo],
        business_unit: BusinessUnit,
    ) -> Self {
        let is_clocked_in = punch.is_open_at(now);
        let end_time = match punch.punch_out {
            Some(punch_out) if !is_clocked_in => punch_out,
            Some(punch_out) => punch_out.min(now),
            None => now,
        };

        let profile = ShiftProfile {
            shift_code: punch.shift_code.clone(),
            work_center_code: punch.work_center_code.clone(),
            time_sheet_id: Some(punch.time_sheet_id),
            is_clocked_in,
            is_transactional: employee.is_some_and(|e| e.is_transactional)
                && punch.is_transactional_work_center != Some(false),
            is_employee_transactional: employee.is_none_or(|e| e.is_transactional),
            workcenter_type: punch.workcenter_type.unwrap_or_default(),
            ..ShiftProfile::base(
                &punch.site_code,
                employee,
                site_employee_codes,
                supervisor,
                transaction_types,
                business_unit,
            )
        };

        Self::new(punch.punch_in, end_time, punch.operational_date, profile)
    }

    /// Returns a copy of this shift with new bounds and operational date.
    pub fn with_bounds(
        &self,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        operational_date: NaiveDate,
    ) -> Self {
        Self::new(start_time, end_time, operational_date, self.profile.clone())
    }

    /// Returns the shift's bounds as a range.
    ///
    /// A shift whose end precedes its start is treated as empty.
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time.max(self.start_time),
        }
    }
}

/// Removes case-insensitive duplicates, keeping the first spelling seen.
fn distinct_codes(codes: &[String]) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes {
        if !distinct.iter().any(|d| d.eq_ignore_ascii_case(code)) {
            distinct.push(code.clone());
        }
    }
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteEmployee;

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn create_employee(is_transactional: bool) -> Employee {
        Employee {
            number: "1001".to_string(),
            tna_employee_code: "T1001".to_string(),
            full_name: Some("Avery Stone".to_string()),
            job_code: Some("PICKER".to_string()),
            salary_class_code: Some("H".to_string()),
            supervisor_full_name: Some("Jordan Lake".to_string()),
            is_transactional,
            is_part_time: true,
            site_employees: vec![SiteEmployee {
                site_code: "DC01".to_string(),
                site_employee_code: "E100".to_string(),
            }],
        }
    }

    fn create_punch(punch_out: Option<&str>) -> TimeSheetPunch {
        TimeSheetPunch {
            time_sheet_id: 11,
            employee_code: "T1001".to_string(),
            site_code: "DC01".to_string(),
            shift_code: Some("1ST".to_string()),
            work_center_code: Some("WC1".to_string()),
            operational_date: make_date("2026-03-02"),
            punch_in: make_datetime("2026-03-02", "08:00:00"),
            punch_out: punch_out.map(|t| make_datetime("2026-03-02", t)),
            work_center_name: None,
            is_transactional_work_center: None,
            workcenter_type: None,
        }
    }

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_closed_time_sheet_shift_uses_punches() {
        let employee = create_employee(true);
        let shift = Shift::from_time_sheet(
            &create_punch(Some("16:00:00")),
            Some(&employee),
            make_datetime("2026-03-02", "18:00:00"),
            &codes(&["E100"]),
            None,
            &[],
            BusinessUnit::SupplyChain,
        );

        assert!(!shift.profile.is_clocked_in);
        assert_eq!(shift.start_time, make_datetime("2026-03-02", "08:00:00"));
        assert_eq!(shift.end_time, make_datetime("2026-03-02", "16:00:00"));
        assert_eq!(shift.profile.time_sheet_id, Some(11));
        assert_eq!(shift.profile.shift_code.as_deref(), Some("1ST"));
        assert_eq!(shift.profile.employee_number.as_deref(), Some("1001"));
        assert!(shift.profile.is_part_time_employee);
        assert!(shift.profile.is_transactional);
    }

    #[test]
    fn test_future_punch_out_is_clocked_in_until_now() {
        let shift = Shift::from_time_sheet(
            &create_punch(Some("16:00:00")),
            Some(&create_employee(true)),
            make_datetime("2026-03-02", "12:00:00"),
            &codes(&["E100"]),
            None,
            &[],
            BusinessUnit::SupplyChain,
        );

        assert!(shift.profile.is_clocked_in);
        assert_eq!(shift.end_time, make_datetime("2026-03-02", "12:00:00"));
    }

    #[test]
    fn test_non_transactional_work_center_is_not_transactional() {
        let mut punch = create_punch(Some("16:00:00"));
        punch.is_transactional_work_center = Some(false);
        punch.workcenter_type = Some(WorkcenterType::NonTransactional);

        let shift = Shift::from_time_sheet(
            &punch,
            Some(&create_employee(true)),
            make_datetime("2026-03-02", "18:00:00"),
            &codes(&["E100"]),
            None,
            &[],
            BusinessUnit::SupplyChain,
        );

        assert!(!shift.profile.is_transactional);
        assert!(shift.profile.is_employee_transactional);
        assert_eq!(shift.profile.workcenter_type, WorkcenterType::NonTransactional);
    }

    #[test]
    fn test_unmapped_time_sheet_shift_is_not_transactional() {
        let shift = Shift::from_time_sheet(
            &create_punch(Some("16:00:00")),
            None,
            make_datetime("2026-03-02", "18:00:00"),
            &codes(&["E100"]),
            None,
            &[],
            BusinessUnit::SupplyChain,
        );

        assert!(!shift.profile.is_transactional);
        assert!(shift.profile.is_employee_transactional);
    }

    #[test]
    fn test_orphan_profile_on_ltl_is_never_transactional() {
        let employee = create_employee(true);
        let profile = ShiftProfile::orphan(
            "LT01",
            Some(&employee),
            &codes(&["D7"]),
            None,
            &[],
            BusinessUnit::Ltl,
        );

        assert!(!profile.is_transactional);
        assert!(!profile.is_employee_transactional);
        assert!(profile.is_orphan());
        assert!(profile.shift_code.is_none());
    }

    #[test]
    fn test_unmapped_orphan_profile_is_transactional() {
        let profile =
            ShiftProfile::orphan("DC01", None, &codes(&["E900"]), None, &[], BusinessUnit::SupplyChain);

        assert!(profile.is_transactional);
        assert!(profile.employee_number.is_none());
    }

    #[test]
    fn test_profile_codes_are_distinct_ignoring_case() {
        let profile = ShiftProfile::orphan(
            "DC01",
            None,
            &codes(&["E100", "e100", "E101"]),
            None,
            &[],
            BusinessUnit::SupplyChain,
        );

        assert_eq!(profile.site_employee_codes, codes(&["E100", "E101"]));
    }

    #[test]
    fn test_shift_supervisor_is_copied() {
        let supervisor = EmployeeShiftSupervisor {
            tna_employee_code: "T1001".to_string(),
            supervisor_full_name: "Morgan Reyes".to_string(),
        };
        let profile = ShiftProfile::orphan(
            "DC01",
            None,
            &codes(&["E100"]),
            Some(&supervisor),
            &[],
            BusinessUnit::SupplyChain,
        );

        assert_eq!(profile.shift_supervisor.as_deref(), Some("Morgan Reyes"));
    }

    #[test]
    fn test_with_bounds_keeps_profile() {
        let shift = Shift::from_time_sheet(
            &create_punch(Some("16:00:00")),
            Some(&create_employee(true)),
            make_datetime("2026-03-02", "18:00:00"),
            &codes(&["E100"]),
            None,
            &[],
            BusinessUnit::SupplyChain,
        );

        let moved = shift.with_bounds(
            make_datetime("2026-03-03", "00:00:00"),
            make_datetime("2026-03-03", "04:00:00"),
            make_date("2026-03-03"),
        );

        assert_eq!(moved.profile, shift.profile);
        assert_eq!(moved.operational_date, make_date("2026-03-03"));
        assert_eq!(moved.range().duration(), chrono::Duration::hours(4));
    }
}
