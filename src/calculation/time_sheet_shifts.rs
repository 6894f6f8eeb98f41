//! Time-sheet-backed shifts.
//!
//! Every punch that has started by the site's current time becomes one shift,
//! as long as the punching employee owns a site employee code at the site
//! that the caller asked about.

use chrono::NaiveDateTime;

use crate::models::{
    BusinessUnit, Employee, EmployeeShiftSupervisor, Shift, TimeSheetPunch, TransactionTypeInfo,
    Workcenter,
};

/// Site reference data shared by every shift built for one site.
#[derive(Debug, Clone)]
pub struct SiteShiftContext {
    /// The site code.
    pub site_code: String,
    /// The site-local time shifts are evaluated at.
    pub now: NaiveDateTime,
    /// The site's business unit.
    pub business_unit: BusinessUnit,
    /// Employees known at the site.
    pub employees: Vec<Employee>,
    /// Shift supervisor assignments.
    pub shift_supervisors: Vec<EmployeeShiftSupervisor>,
    /// The site's transaction-type catalog.
    pub transaction_types: Vec<TransactionTypeInfo>,
}

impl SiteShiftContext {
    /// Finds the employee with the given time-and-attendance code.
    pub fn employee_by_tna(&self, tna_employee_code: &str) -> Option<&Employee> {
        self.employees
            .iter()
            .find(|e| e.has_tna_code(tna_employee_code))
    }

    /// Finds the shift supervisor assigned to the given employee.
    pub fn supervisor_for(&self, tna_employee_code: &str) -> Option<&EmployeeShiftSupervisor> {
        self.shift_supervisors
            .iter()
            .find(|s| s.tna_employee_code.eq_ignore_ascii_case(tna_employee_code))
    }
}

/// Copies work center name, transactional flag and type onto each punch.
///
/// Punches at an unknown work center get no enrichment.
pub fn enrich_time_sheets(time_sheets: &mut [TimeSheetPunch], workcenters: &[Workcenter]) {
    for punch in time_sheets.iter_mut() {
        let workcenter = punch.work_center_code.as_deref().and_then(|code| {
            workcenters
                .iter()
                .find(|w| w.code.eq_ignore_ascii_case(code))
        });

        punch.work_center_name = workcenter.map(|w| w.name.clone());
        punch.is_transactional_work_center = workcenter.map(|w| w.is_transactional);
        punch.workcenter_type = workcenter.map(|w| w.workcenter_type);
    }
}

/// Maps punches 1:1 into shifts.
///
/// A punch is skipped when it starts at or after `context.now`, when its
/// employee is unknown or owns no code at the site, or when none of the
/// employee's codes is in `site_employee_filter`. A filter of `None` accepts
/// every employee.
///
/// # Example
///
/// ```
/// use efficiency_engine::calculation::{SiteShiftContext, map_time_sheet_shifts};
/// use efficiency_engine::models::{BusinessUnit, Employee, SiteEmployee, TimeSheetPunch};
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let context = SiteShiftContext {
///     site_code: "DC01".to_string(),
///     now: at("2026-03-02 18:00:00"),
///     business_unit: BusinessUnit::SupplyChain,
///     employees: vec![Employee {
///         number: "1001".to_string(),
///         tna_employee_code: "T1001".to_string(),
///         full_name: None,
///         job_code: None,
///         salary_class_code: None,
///         supervisor_full_name: None,
///         is_transactional: true,
///         is_part_time: false,
///         site_employees: vec![SiteEmployee {
///             site_code: "DC01".to_string(),
///             site_employee_code: "E100".to_string(),
///         }],
///     }],
///     shift_supervisors: vec![],
///     transaction_types: vec![],
/// };
/// let punch = TimeSheetPunch {
///     time_sheet_id: 1,
///     employee_code: "T1001".to_string(),
///     site_code: "DC01".to_string(),
///     shift_code: None,
///     work_center_code: None,
///     operational_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     punch_in: at("2026-03-02 08:00:00"),
///     punch_out: Some(at("2026-03-02 16:00:00")),
///     work_center_name: None,
///     is_transactional_work_center: None,
///     workcenter_type: None,
/// };
///
/// let shifts = map_time_sheet_shifts(&[punch], &context, Some(&["E100".to_string()]));
/// assert_eq!(shifts.len(), 1);
/// assert_eq!(shifts[0].profile.time_sheet_id, Some(1));
/// ```
pub fn map_time_sheet_shifts(
    time_sheets: &[TimeSheetPunch],
    context: &SiteShiftContext,
    site_employee_filter: Option<&[String]>,
) -> Vec<Shift> {
    time_sheets
        .iter()
        .filter(|punch| punch.punch_in < context.now)
        .filter_map(|punch| {
            let employee = context.employee_by_tna(&punch.employee_code)?;
            let codes = employee.site_employee_codes(&context.site_code);
            if codes.is_empty() {
                return None;
            }
            if let Some(filter) = site_employee_filter {
                if !employee.owns_any_code(&context.site_code, filter) {
                    return None;
                }
            }

            Some(Shift::from_time_sheet(
                punch,
                Some(employee),
                context.now,
                &codes,
                context.supervisor_for(&punch.employee_code),
                &context.transaction_types,
                context.business_unit,
            ))
        })
        .collect()
}
