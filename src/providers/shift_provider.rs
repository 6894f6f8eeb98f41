//! Shift lookup for a site.
//!
//! The [`ShiftProvider`] turns the raw sources into the shifts the engine
//! attributes: one shift per time sheet punch, plus orphan shifts for
//! transactions that no punch explains.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::calculation::{
    ShiftReconciler, SiteShiftContext, enrich_time_sheets, map_time_sheet_shifts,
    split_multi_day,
};
use crate::config::EngineSettings;
use crate::error::EngineResult;
use crate::models::{Employee, Shift, ShiftProfile, TimeSheetPunch};

use super::{EmployeeDirectory, EngineSources, ReferenceLookup, TimeSheetSource, TransactionSource};

/// Obtains the shifts for a site from the engine's sources.
#[derive(Clone)]
pub struct ShiftProvider {
    transactions: Arc<dyn TransactionSource>,
    time_sheets: Arc<dyn TimeSheetSource>,
    employees: Arc<dyn EmployeeDirectory>,
    reference: Arc<dyn ReferenceLookup>,
    settings: EngineSettings,
}

impl ShiftProvider {
    /// Creates a provider over `sources`.
    pub fn new(sources: &EngineSources, settings: EngineSettings) -> Self {
        Self {
            transactions: Arc::clone(&sources.transactions),
            time_sheets: Arc::clone(&sources.time_sheets),
            employees: Arc::clone(&sources.employees),
            reference: Arc::clone(&sources.reference),
            settings,
        }
    }

    /// Returns the shifts touching `[start, end]` for the given site employee codes.
    ///
    /// Time sheet shifts are returned first, then orphan shifts.
    ///
    /// # Errors
    ///
    /// Fails with
    /// [`EngineError::ReferenceDataMissing`](crate::error::EngineError::ReferenceDataMissing)
    /// when the site has no reference data, and with ordering or time sheet
    /// errors from reconciliation.
    pub fn shifts_for_site_employee_codes(
        &self,
        site_code: &str,
        now: NaiveDateTime,
        site_employee_codes: &[String],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> EngineResult<Vec<Shift>> {
        let employees = self.employees.employees(site_code)?;
        self.shifts(site_code, now, employees, Some(site_employee_codes), start, end)
    }

    /// Returns the shifts touching `[start, end]` for the given time-and-attendance codes.
    ///
    /// The codes select employees; their site employee codes at the site
    /// then filter shifts exactly as for
    /// [`shifts_for_site_employee_codes`](Self::shifts_for_site_employee_codes).
    pub fn shifts_for_tna_employee_codes(
        &self,
        site_code: &str,
        now: NaiveDateTime,
        tna_employee_codes: &[String],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> EngineResult<Vec<Shift>> {
        let employees = self.employees.employees(site_code)?;
        let mut site_employee_codes: Vec<String> = Vec::new();
        for employee in employees
            .iter()
            .filter(|e| tna_employee_codes.iter().any(|code| e.has_tna_code(code)))
        {
            for code in employee.site_employee_codes(site_code) {
                push_distinct(&mut site_employee_codes, &code);
            }
        }

        self.shifts(site_code, now, employees, Some(&site_employee_codes), start, end)
    }

    /// Returns the shifts touching `[start, end]` for every employee at the site.
    ///
    /// Orphan shifts cover every site employee code with transactions.
    pub fn shifts_for_site(
        &self,
        site_code: &str,
        now: NaiveDateTime,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> EngineResult<Vec<Shift>> {
        let employees = self.employees.employees(site_code)?;
        self.shifts(site_code, now, employees, None, start, end)
    }

    fn shifts(
        &self,
        site_code: &str,
        now: NaiveDateTime,
        employees: Vec<Employee>,
        filter: Option<&[String]>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> EngineResult<Vec<Shift>> {
        let context = SiteShiftContext {
            site_code: site_code.to_string(),
            now,
            business_unit: self.reference.business_unit(site_code)?,
            employees,
            shift_supervisors: self.reference.shift_supervisors(site_code)?,
            transaction_types: self.reference.transaction_types(site_code)?,
        };
        let workcenters = self.reference.workcenters(site_code)?;

        let padding = self.settings.orphan_search_padding();
        let search_start = start - padding;
        let search_end = end + padding;

        let mut time_sheets = self
            .time_sheets
            .time_sheets(site_code, search_start.date(), search_end.date())?;
        time_sheets.retain(|s| context.employee_by_tna(&s.employee_code).is_some());
        enrich_time_sheets(&mut time_sheets, &workcenters);

        let window_sheets: Vec<TimeSheetPunch> = time_sheets
            .iter()
            .filter(|s| start.date() <= s.operational_date && s.operational_date <= end.date())
            .cloned()
            .collect();

        let mut shifts = map_time_sheet_shifts(&window_sheets, &context, filter);
        let time_sheet_shift_count = shifts.len();

        let orphan_filter = match filter {
            Some(codes) => codes.to_vec(),
            None => self.transactions.site_employee_codes(site_code)?,
        };
        shifts.extend(self.orphan_shifts(
            &context,
            &time_sheets,
            &orphan_filter,
            search_start,
            search_end,
        )?);

        debug!(
            site_code = %site_code,
            time_sheet_shifts = time_sheet_shift_count,
            orphan_shifts = shifts.len() - time_sheet_shift_count,
            "Loaded shifts"
        );

        Ok(shifts)
    }

    /// Reconciles each employee's transactions against their time sheets.
    ///
    /// Mapped employees are reconciled under all their site employee codes;
    /// codes no employee owns are reconciled one by one with no time sheets.
    fn orphan_shifts(
        &self,
        context: &SiteShiftContext,
        time_sheets: &[TimeSheetPunch],
        filter: &[String],
        search_start: NaiveDateTime,
        search_end: NaiveDateTime,
    ) -> EngineResult<Vec<Shift>> {
        let site_code = context.site_code.as_str();
        let reconciler = ShiftReconciler::from_settings(&self.settings);

        let mut filter_codes: Vec<String> = Vec::new();
        for code in filter {
            push_distinct(&mut filter_codes, code);
        }

        let mut mapped: Vec<String> = Vec::new();
        let mut shifts = Vec::new();

        for employee in &context.employees {
            let codes = employee.site_employee_codes(site_code);
            let owned: Vec<&String> = filter_codes
                .iter()
                .filter(|code| codes.iter().any(|c| c.eq_ignore_ascii_case(code)))
                .collect();
            if owned.is_empty() {
                continue;
            }
            for code in owned {
                push_distinct(&mut mapped, code);
            }

            let employee_sheets: Vec<TimeSheetPunch> = time_sheets
                .iter()
                .filter(|s| employee.has_tna_code(&s.employee_code))
                .cloned()
                .collect();
            let transactions =
                self.transactions
                    .find_transactions(site_code, &codes, search_start, search_end)?;
            let profile = ShiftProfile::orphan(
                site_code,
                Some(employee),
                &codes,
                context.supervisor_for(&employee.tna_employee_code),
                &context.transaction_types,
                context.business_unit,
            );

            shifts.extend(reconciler.reconcile(&profile, &employee_sheets, &transactions)?);
        }

        for code in filter_codes
            .iter()
            .filter(|code| !mapped.iter().any(|m| m.eq_ignore_ascii_case(code)))
        {
            let codes = vec![code.clone()];
            let transactions =
                self.transactions
                    .find_transactions(site_code, &codes, search_start, search_end)?;
            let profile = ShiftProfile::orphan(
                site_code,
                None,
                &codes,
                None,
                &context.transaction_types,
                context.business_unit,
            );

            shifts.extend(reconciler.reconcile(&profile, &[], &transactions)?);
        }

        Ok(split_multi_day(shifts, self.settings.max_orphan_shift()))
    }
}

fn push_distinct(codes: &mut Vec<String>, code: &str) {
    if !codes.iter().any(|c| c.eq_ignore_ascii_case(code)) {
        codes.push(code.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReferenceCatalog, SiteReference};
    use crate::error::EngineError;
    use crate::models::{
        BusinessUnit, EmployeeShiftSupervisor, SiteEmployee, Transaction, Workcenter,
        WorkcenterType,
    };
    use crate::providers::ActivityStore;
    use chrono::NaiveDate;

    // ==========================================================================
    // Test Helpers
    // ==========================================================================

    fn make_datetime(time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2026-03-02 {}", time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn create_site() -> SiteReference {
        SiteReference {
            site_code: "DC01".to_string(),
            business_unit: BusinessUnit::SupplyChain,
            utc_offset_minutes: 0,
            labor_rates: vec![],
            transaction_types: vec![],
            workcenters: vec![Workcenter {
                code: "WC-OFFICE".to_string(),
                name: "Office".to_string(),
                is_transactional: false,
                workcenter_type: WorkcenterType::NonTransactional,
            }],
            employees: vec![Employee {
                number: "1001".to_string(),
                tna_employee_code: "T1001".to_string(),
                full_name: Some("Avery Stone".to_string()),
                job_code: None,
                salary_class_code: None,
                supervisor_full_name: None,
                is_transactional: true,
                is_part_time: false,
                site_employees: vec![SiteEmployee {
                    site_code: "DC01".to_string(),
                    site_employee_code: "E100".to_string(),
                }],
            }],
            shift_supervisors: vec![EmployeeShiftSupervisor {
                tna_employee_code: "T1001".to_string(),
                supervisor_full_name: "Morgan Reyes".to_string(),
            }],
        }
    }

    fn create_punch(work_center: Option<&str>) -> TimeSheetPunch {
        TimeSheetPunch {
            time_sheet_id: 7,
            employee_code: "T1001".to_string(),
            site_code: "DC01".to_string(),
            shift_code: Some("1ST".to_string()),
            work_center_code: work_center.map(str::to_string),
            operational_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            punch_in: make_datetime("10:00:00"),
            punch_out: Some(make_datetime("14:00:00")),
            work_center_name: None,
            is_transactional_work_center: None,
            workcenter_type: None,
        }
    }

    fn create_provider(transactions: Vec<Transaction>, punches: Vec<TimeSheetPunch>) -> ShiftProvider {
        let sources = EngineSources::new(
            Arc::new(ActivityStore::new(transactions, punches)),
            Arc::new(ReferenceCatalog::new(vec![create_site()])),
        );
        ShiftProvider::new(&sources, EngineSettings::default())
    }

    fn bounds(shifts: &[Shift]) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        shifts.iter().map(|s| (s.start_time, s.end_time)).collect()
    }

    // ==========================================================================
    // Shift Lookup Tests
    // ==========================================================================

    #[test]
    fn test_time_sheet_and_orphan_shifts_for_mapped_employee() {
        let provider = create_provider(
            vec![
                Transaction::new("DC01", "E100", "PICK", make_datetime("09:03:00")),
                Transaction::new("DC01", "E100", "PICK", make_datetime("09:47:00")),
                Transaction::new("DC01", "E100", "PICK", make_datetime("11:00:00")),
            ],
            vec![create_punch(None)],
        );

        let shifts = provider
            .shifts_for_site_employee_codes(
                "DC01",
                make_datetime("18:00:00"),
                &codes(&["E100"]),
                make_datetime("00:00:00"),
                make_datetime("23:59:00"),
            )
            .unwrap();

        assert_eq!(
            bounds(&shifts),
            vec![
                (make_datetime("10:00:00"), make_datetime("14:00:00")),
                (make_datetime("08:30:00"), make_datetime("10:00:00")),
            ]
        );
        assert_eq!(shifts[0].profile.time_sheet_id, Some(7));
        assert!(shifts[1].profile.is_orphan());
        assert_eq!(shifts[1].profile.employee_number.as_deref(), Some("1001"));
        assert_eq!(
            shifts[1].profile.shift_supervisor.as_deref(),
            Some("Morgan Reyes")
        );
    }

    #[test]
    fn test_unmapped_code_gets_its_own_orphan_shift() {
        let provider = create_provider(
            vec![Transaction::new("DC01", "E999", "PICK", make_datetime("09:03:00"))],
            vec![],
        );

        let shifts = provider
            .shifts_for_site_employee_codes(
                "DC01",
                make_datetime("18:00:00"),
                &codes(&["E999", "e999"]),
                make_datetime("00:00:00"),
                make_datetime("23:59:00"),
            )
            .unwrap();

        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].profile.employee_number, None);
        assert_eq!(shifts[0].profile.site_employee_codes, codes(&["E999"]));
        assert!(shifts[0].profile.is_transactional);
    }

    #[test]
    fn test_tna_codes_select_employee_shifts() {
        let provider = create_provider(vec![], vec![create_punch(Some("wc-office"))]);

        let shifts = provider
            .shifts_for_tna_employee_codes(
                "DC01",
                make_datetime("18:00:00"),
                &codes(&["t1001"]),
                make_datetime("00:00:00"),
                make_datetime("23:59:00"),
            )
            .unwrap();

        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].profile.workcenter_type, WorkcenterType::NonTransactional);
        assert!(!shifts[0].profile.is_transactional);
    }

    #[test]
    fn test_site_lookup_uses_transaction_codes() {
        let provider = create_provider(
            vec![
                Transaction::new("DC01", "E100", "PICK", make_datetime("07:10:00")),
                Transaction::new("DC01", "E555", "PICK", make_datetime("07:20:00")),
            ],
            vec![],
        );

        let shifts = provider
            .shifts_for_site(
                "DC01",
                make_datetime("18:00:00"),
                make_datetime("00:00:00"),
                make_datetime("23:59:00"),
            )
            .unwrap();

        assert_eq!(shifts.len(), 2);
        assert_eq!(shifts[0].profile.employee_number.as_deref(), Some("1001"));
        assert_eq!(shifts[1].profile.site_employee_codes, codes(&["E555"]));
    }

    #[test]
    fn test_punch_after_now_is_not_a_shift() {
        let provider = create_provider(vec![], vec![create_punch(None)]);

        let shifts = provider
            .shifts_for_site_employee_codes(
                "DC01",
                make_datetime("09:00:00"),
                &codes(&["E100"]),
                make_datetime("00:00:00"),
                make_datetime("23:59:00"),
            )
            .unwrap();

        assert!(shifts.is_empty());
    }

    #[test]
    fn test_unknown_site_fails_fast() {
        let provider = create_provider(vec![], vec![]);

        let result = provider.shifts_for_site_employee_codes(
            "DC99",
            make_datetime("18:00:00"),
            &codes(&["E100"]),
            make_datetime("00:00:00"),
            make_datetime("23:59:00"),
        );

        match result {
            Err(EngineError::ReferenceDataMissing { site_code, .. }) => {
                assert_eq!(site_code, "DC99");
            }
            _ => panic!("Expected ReferenceDataMissing error"),
        }
    }
}
